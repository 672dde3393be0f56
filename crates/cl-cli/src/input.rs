//! Analysis input files.
//!
//! One JSON document describes a batch of hypotheses. Either the top level
//! carries the shared `background` and `data` histograms, or every hypothesis
//! carries its own pair (mass-dependent selections). Mixing both is rejected.

use anyhow::{Result, bail};
use cl_core::AnyHistogram;
use cl_inference::{
    AnalysisConfig, HypothesisInput, HypothesisOutcome, ObservedLlr, SignalHypothesis,
    observed_llrs_per_hypothesis, observed_llrs_shared_background, run_per_hypothesis,
    run_shared_background,
};
use cl_viz::YieldsInput;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisFile {
    #[serde(default)]
    background: Option<AnyHistogram>,
    #[serde(default)]
    data: Option<AnyHistogram>,
    hypotheses: Vec<HypothesisEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HypothesisEntry {
    label: String,
    #[serde(default)]
    mass_gev: Option<f64>,
    #[serde(default)]
    background: Option<AnyHistogram>,
    signal: AnyHistogram,
    #[serde(default)]
    data: Option<AnyHistogram>,
}

/// A validated batch of hypotheses.
#[derive(Debug, Clone)]
pub enum Analysis {
    /// One background and dataset for every signal.
    Shared {
        background: AnyHistogram,
        data: AnyHistogram,
        hypotheses: Vec<SignalHypothesis<AnyHistogram>>,
    },
    /// Separate background and dataset per hypothesis.
    PerHypothesis(Vec<HypothesisInput<AnyHistogram>>),
}

impl AnalysisFile {
    fn validate(self) -> Result<Analysis> {
        if self.hypotheses.is_empty() {
            bail!("analysis input has no hypotheses");
        }
        let own = self.hypotheses.iter().filter(|h| h.background.is_some() || h.data.is_some());
        let own_labels: Vec<&str> = own.map(|h| h.label.as_str()).collect();

        match (self.background, self.data) {
            (Some(background), Some(data)) => {
                if !own_labels.is_empty() {
                    bail!(
                        "shared background/data given, but hypotheses [{}] carry their own; \
                         use one mode or the other",
                        own_labels.join(", ")
                    );
                }
                let hypotheses = self
                    .hypotheses
                    .into_iter()
                    .map(|h| SignalHypothesis { label: h.label, mass_gev: h.mass_gev, signal: h.signal })
                    .collect();
                Ok(Analysis::Shared { background, data, hypotheses })
            }
            (None, None) => {
                let mut inputs = Vec::with_capacity(self.hypotheses.len());
                for h in self.hypotheses {
                    let (Some(background), Some(data)) = (h.background, h.data) else {
                        bail!(
                            "hypothesis '{}' needs its own background and data \
                             (no shared histograms at top level)",
                            h.label
                        );
                    };
                    inputs.push(HypothesisInput {
                        label: h.label,
                        mass_gev: h.mass_gev,
                        background,
                        signal: h.signal,
                        data,
                    });
                }
                Ok(Analysis::PerHypothesis(inputs))
            }
            (Some(_), None) => bail!("top-level background given without data"),
            (None, Some(_)) => bail!("top-level data given without background"),
        }
    }
}

impl Analysis {
    /// Parse and validate an analysis document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: AnalysisFile = serde_json::from_str(json)?;
        file.validate()
    }

    /// Read, parse and validate an analysis file.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading analysis");
        let json = std::fs::read_to_string(path)?;
        let analysis = Self::from_json(&json)?;
        tracing::info!(mode = analysis.mode(), hypotheses = analysis.len(), "analysis loaded");
        Ok(analysis)
    }

    /// `shared_background` or `per_hypothesis`.
    pub fn mode(&self) -> &'static str {
        match self {
            Analysis::Shared { .. } => "shared_background",
            Analysis::PerHypothesis(_) => "per_hypothesis",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Analysis::Shared { hypotheses, .. } => hypotheses.len(),
            Analysis::PerHypothesis(inputs) => inputs.len(),
        }
    }

    /// Histograms of hypothesis `index`.
    pub fn hypothesis(&self, index: usize) -> Result<YieldsInput<'_>> {
        let n = self.len();
        let view = match self {
            Analysis::Shared { background, data, hypotheses } => hypotheses.get(index).map(|h| YieldsInput {
                label: &h.label,
                mass_gev: h.mass_gev,
                background,
                signal: &h.signal,
                data,
            }),
            Analysis::PerHypothesis(inputs) => inputs.get(index).map(|h| YieldsInput {
                label: &h.label,
                mass_gev: h.mass_gev,
                background: &h.background,
                signal: &h.signal,
                data: &h.data,
            }),
        };
        match view {
            Some(v) => Ok(v),
            None => bail!("hypothesis index {index} out of range (0..{n})"),
        }
    }

    /// Histograms of every hypothesis, in input order.
    pub fn hypotheses(&self) -> Vec<YieldsInput<'_>> {
        (0..self.len()).filter_map(|i| self.hypothesis(i).ok()).collect()
    }

    /// Full batch: samples, PDFs, quantiles and confidence levels.
    pub fn run(&self, config: &AnalysisConfig) -> Vec<HypothesisOutcome> {
        match self {
            Analysis::Shared { background, data, hypotheses } => {
                run_shared_background(background, data, hypotheses, config)
            }
            Analysis::PerHypothesis(inputs) => run_per_hypothesis(inputs, config),
        }
    }

    /// Observed `-2 ln Q` per hypothesis; a bad hypothesis does not affect the others.
    pub fn observed(&self) -> Result<Vec<cl_core::Result<ObservedLlr>>> {
        match self {
            Analysis::Shared { background, data, hypotheses } => {
                let signals: Vec<AnyHistogram> = hypotheses.iter().map(|h| h.signal.clone()).collect();
                Ok(observed_llrs_shared_background(background, &signals, data))
            }
            Analysis::PerHypothesis(inputs) => {
                let backgrounds: Vec<AnyHistogram> = inputs.iter().map(|h| h.background.clone()).collect();
                let signals: Vec<AnyHistogram> = inputs.iter().map(|h| h.signal.clone()).collect();
                let data: Vec<AnyHistogram> = inputs.iter().map(|h| h.data.clone()).collect();
                Ok(observed_llrs_per_hypothesis(&backgrounds, &signals, &data)?)
            }
        }
    }
}
