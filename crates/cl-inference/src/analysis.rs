//! Per-hypothesis batch driver.
//!
//! For every hypothesis: generate both LLR sample sets, evaluate the observed LLR,
//! bin the samples on a common axis, and summarise each PDF (quantiles) together
//! with the confidence levels of the observed value.
//!
//! Hypotheses are independent. An error in one is reported as
//! [`HypothesisOutcome::Failed`] and the batch carries on.

use cl_core::{Binned, Error, Result};
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceLevels;
use crate::generator::{GeneratorConfig, GeneratorDiagnostics, generate_llr};
use crate::observed::{ObservedLlr, observed_llr};
use crate::pdf::{DEFAULT_N_EDGES, EmpiricalPdf, llr_binning};
use crate::quantiles::QuantileSummary;

/// A signal model evaluated against a shared background and dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalHypothesis<H> {
    /// Name used in logs and outputs.
    pub label: String,
    /// Signal mass, if the hypothesis is a mass point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_gev: Option<f64>,
    /// Expected signal yields.
    pub signal: H,
}

/// A hypothesis with its own background and dataset (e.g. mass-dependent cuts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisInput<H> {
    /// Name used in logs and outputs.
    pub label: String,
    /// Signal mass, if the hypothesis is a mass point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_gev: Option<f64>,
    /// Expected background yields.
    pub background: H,
    /// Expected signal yields.
    pub signal: H,
    /// Observed counts.
    pub data: H,
}

/// Batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pseudo-experiment generation.
    pub generator: GeneratorConfig,
    /// Number of edges of the common LLR binning.
    pub n_edges: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { generator: GeneratorConfig::default(), n_edges: DEFAULT_N_EDGES }
    }
}

/// Everything computed for one hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisResult {
    /// Hypothesis label.
    pub label: String,
    /// Signal mass, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_gev: Option<f64>,
    /// Seed used for this hypothesis' pseudo-experiments.
    pub seed: u64,
    /// Observed `-2 ln Q`.
    pub observed: ObservedLlr,
    /// Common LLR bin edges.
    pub edges: Vec<f64>,
    /// Background-like PDF on `edges`.
    pub b_like_pdf: Vec<f64>,
    /// Signal-plus-background-like PDF on `edges`.
    pub sb_like_pdf: Vec<f64>,
    /// Quantiles of the background-like PDF.
    pub b_like_quantiles: QuantileSummary,
    /// Quantiles of the signal-plus-background-like PDF.
    pub sb_like_quantiles: QuantileSummary,
    /// Confidence levels of the observed value.
    pub confidence: ConfidenceLevels,
    /// Generator diagnostics.
    pub diagnostics: GeneratorDiagnostics,
    /// Raw background-like samples (empty once dropped).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub b_like: Vec<f64>,
    /// Raw signal-plus-background-like samples (empty once dropped).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sb_like: Vec<f64>,
}

impl HypothesisResult {
    /// Drop the raw samples, keeping only the summaries.
    pub fn without_samples(mut self) -> Self {
        self.b_like = Vec::new();
        self.sb_like = Vec::new();
        self
    }
}

/// Outcome of one hypothesis in a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HypothesisOutcome {
    /// All quantities were computed.
    Completed(Box<HypothesisResult>),
    /// The hypothesis was aborted; other hypotheses are unaffected.
    Failed {
        /// Hypothesis label.
        label: String,
        /// Why it failed.
        #[serde(serialize_with = "serialize_display")]
        error: Error,
    },
}

fn serialize_display<S: serde::Serializer>(e: &Error, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(e)
}

impl HypothesisOutcome {
    /// Hypothesis label.
    pub fn label(&self) -> &str {
        match self {
            HypothesisOutcome::Completed(r) => &r.label,
            HypothesisOutcome::Failed { label, .. } => label,
        }
    }

    /// The result, if completed.
    pub fn result(&self) -> Option<&HypothesisResult> {
        match self {
            HypothesisOutcome::Completed(r) => Some(r),
            HypothesisOutcome::Failed { .. } => None,
        }
    }

    /// Apply `f` to a completed result.
    pub fn map_result(self, f: impl FnOnce(HypothesisResult) -> HypothesisResult) -> Self {
        match self {
            HypothesisOutcome::Completed(r) => HypothesisOutcome::Completed(Box::new(f(*r))),
            failed => failed,
        }
    }
}

/// Seed of hypothesis `index` in a batch started from `base`.
#[inline]
pub fn hypothesis_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64) << 32)
}

fn analyse<H: Binned + ?Sized>(
    label: &str,
    mass_gev: Option<f64>,
    background: &H,
    signal: &H,
    data: &H,
    generator: GeneratorConfig,
    n_edges: usize,
) -> Result<HypothesisResult> {
    let samples = generate_llr(background, signal, &generator)?;
    let observed = observed_llr(background, signal, data)?;

    let edges = llr_binning(&samples.b_like, &samples.sb_like, n_edges)?;
    let b_pdf = EmpiricalPdf::from_samples(&samples.b_like, &edges)?;
    let sb_pdf = EmpiricalPdf::from_samples(&samples.sb_like, &edges)?;

    let b_like_quantiles = b_pdf.quantiles()?;
    let sb_like_quantiles = sb_pdf.quantiles()?;
    let confidence = b_pdf.confidence_levels(&sb_pdf, label, observed.value)?;

    log::debug!(
        "{label}: -2lnQ_obs = {:.4}, 1-CLb = {:.4}, CLs+b = {:.4}",
        observed.value,
        confidence.one_minus_clb,
        confidence.clsb
    );

    Ok(HypothesisResult {
        label: label.to_string(),
        mass_gev,
        seed: samples.seed,
        observed,
        edges,
        b_like_pdf: b_pdf.density,
        sb_like_pdf: sb_pdf.density,
        b_like_quantiles,
        sb_like_quantiles,
        confidence,
        diagnostics: samples.diagnostics,
        b_like: samples.b_like,
        sb_like: samples.sb_like,
    })
}

fn outcome(label: &str, result: Result<HypothesisResult>) -> HypothesisOutcome {
    match result {
        Ok(r) => HypothesisOutcome::Completed(Box::new(r)),
        Err(error) => {
            log::error!("{label}: {error}");
            HypothesisOutcome::Failed { label: label.to_string(), error }
        }
    }
}

/// Generator settings for hypothesis `index`, with a base seed fixed for the whole batch.
fn generator_for(config: &AnalysisConfig, base_seed: u64, index: usize) -> GeneratorConfig {
    GeneratorConfig { seed: Some(hypothesis_seed(base_seed, index)), ..config.generator.clone() }
}

/// Run every signal hypothesis against one background and one dataset.
pub fn run_shared_background<H: Binned>(
    background: &H,
    data: &H,
    hypotheses: &[SignalHypothesis<H>],
    config: &AnalysisConfig,
) -> Vec<HypothesisOutcome> {
    let base_seed = config.generator.seed.unwrap_or_else(rand::random);
    hypotheses
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let generator = generator_for(config, base_seed, i);
            outcome(
                &h.label,
                analyse(&h.label, h.mass_gev, background, &h.signal, data, generator, config.n_edges),
            )
        })
        .collect()
}

/// Run every hypothesis with its own background and dataset.
pub fn run_per_hypothesis<H: Binned>(
    hypotheses: &[HypothesisInput<H>],
    config: &AnalysisConfig,
) -> Vec<HypothesisOutcome> {
    let base_seed = config.generator.seed.unwrap_or_else(rand::random);
    hypotheses
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let generator = generator_for(config, base_seed, i);
            outcome(
                &h.label,
                analyse(
                    &h.label,
                    h.mass_gev,
                    &h.background,
                    &h.signal,
                    &h.data,
                    generator,
                    config.n_edges,
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cl_core::Histogram1D;

    fn hist(contents: &[f64]) -> Histogram1D {
        Histogram1D::with_unit_bins(contents.to_vec()).unwrap()
    }

    fn config(seed: u64) -> AnalysisConfig {
        AnalysisConfig {
            generator: GeneratorConfig::default().with_experiments(2000).with_seed(seed),
            ..Default::default()
        }
    }

    fn background() -> Histogram1D {
        hist(&[60.0, 55.0, 48.0, 40.0, 33.0, 27.0, 21.0, 16.0])
    }

    fn signal() -> Histogram1D {
        hist(&[1.0, 2.0, 4.0, 7.0, 9.0, 7.0, 4.0, 2.0])
    }

    #[test]
    fn test_shared_background_completes() {
        let b = background();
        let hyps = vec![SignalHypothesis { label: "m90".into(), mass_gev: Some(90.0), signal: signal() }];
        let out = run_shared_background(&b, &b, &hyps, &config(1));
        assert_eq!(out.len(), 1);
        let r = out[0].result().expect("completed");
        assert_eq!(r.label, "m90");
        assert_eq!(r.edges.len(), DEFAULT_N_EDGES);
        assert_eq!(r.b_like.len(), 2000);
        assert!(r.b_like_quantiles.is_ordered());
        assert!(r.sb_like_quantiles.is_ordered());
        assert!((0.0..=1.0).contains(&r.confidence.one_minus_clb));
        assert!((0.0..=1.0).contains(&r.confidence.clsb));
        // Data equal to the background sits in the bulk of the background-like PDF.
        assert!(r.confidence.one_minus_clb > 0.02 && r.confidence.one_minus_clb < 0.98);
    }

    #[test]
    fn test_failure_is_isolated() {
        let b = background();
        let hyps = vec![
            SignalHypothesis { label: "good".into(), mass_gev: None, signal: signal() },
            SignalHypothesis { label: "bad".into(), mass_gev: None, signal: hist(&[1.0]) },
            SignalHypothesis { label: "good2".into(), mass_gev: None, signal: signal() },
        ];
        let out = run_shared_background(&b, &b, &hyps, &config(2));
        assert!(out[0].result().is_some());
        assert!(matches!(&out[1], HypothesisOutcome::Failed { label, error: Error::Validation(_) } if label == "bad"));
        assert!(out[2].result().is_some());
    }

    #[test]
    fn test_zero_signal_is_degenerate() {
        // s = 0 makes every pseudo-experiment evaluate to 0: no spread to bin.
        let b = background();
        let hyps = vec![SignalHypothesis { label: "none".into(), mass_gev: None, signal: hist(&[0.0; 8]) }];
        let out = run_shared_background(&b, &b, &hyps, &config(3));
        assert!(matches!(&out[0], HypothesisOutcome::Failed { error: Error::Degenerate(_), .. }));
    }

    #[test]
    fn test_per_hypothesis_seeds_differ() {
        let input = |label: &str| HypothesisInput {
            label: label.into(),
            mass_gev: None,
            background: background(),
            signal: signal(),
            data: background(),
        };
        let out = run_per_hypothesis(&[input("a"), input("b")], &config(7));
        let a = out[0].result().unwrap();
        let b = out[1].result().unwrap();
        assert_eq!(a.seed, 7);
        assert_eq!(b.seed, hypothesis_seed(7, 1));
        assert_ne!(a.b_like, b.b_like);
        assert_eq!(a.observed, b.observed);
    }

    #[test]
    fn test_without_samples_and_serialization() {
        let b = background();
        let hyps = vec![SignalHypothesis { label: "m95".into(), mass_gev: Some(95.0), signal: signal() }];
        let out = run_shared_background(&b, &b, &hyps, &config(4));
        let out: Vec<_> = out.into_iter().map(|o| o.map_result(HypothesisResult::without_samples)).collect();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v[0]["status"], "completed");
        assert_eq!(v[0]["label"], "m95");
        assert!(v[0].get("b_like").is_none());
        assert!(v[0]["confidence"]["clsb"].is_number());
    }

    #[test]
    fn test_failed_serializes_message() {
        let o = HypothesisOutcome::Failed {
            label: "x".into(),
            error: Error::Degenerate("no bin satisfies the condition".into()),
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["error"], "Degenerate input: no bin satisfies the condition");
    }
}
