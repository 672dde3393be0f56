//! LLR distribution artifact: one panel per hypothesis.
//!
//! Each panel carries both PDFs on their common binning, the observed `-2 ln Q`,
//! the quantile bands of each PDF and the confidence levels, so a renderer can
//! draw the classic "background-like vs signal-like" figure without recomputing
//! anything.

use cl_core::{Error, Result};
use cl_inference::{HypothesisOutcome, QuantileSummary};
use serde::{Deserialize, Serialize};

use crate::{ArtifactMeta, bin_centers};

/// Schema tag of [`LlrDistributionArtifact`].
pub const LLR_SCHEMA_VERSION: &str = "countllr_llr_distribution_v1";

/// One hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlrPanel {
    /// Hypothesis label.
    pub label: String,
    /// Signal mass, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_gev: Option<f64>,
    /// Common LLR bin edges.
    pub bin_edges: Vec<f64>,
    /// Bin centres (convenience for step/marker plots).
    pub bin_centers: Vec<f64>,
    /// Background-like PDF.
    pub b_like: Vec<f64>,
    /// Signal-plus-background-like PDF.
    pub sb_like: Vec<f64>,
    /// Observed `-2 ln Q`.
    pub observed: f64,
    /// False if the observed value lay left of the generated range.
    pub observed_in_range: bool,
    /// Quantiles of the background-like PDF.
    pub b_like_quantiles: QuantileSummary,
    /// Quantiles of the signal-plus-background-like PDF.
    pub sb_like_quantiles: QuantileSummary,
    /// `1 - CLb`.
    pub one_minus_clb: f64,
    /// `CLs+b`.
    pub clsb: f64,
    /// `CLs`.
    pub cls: f64,
}

/// A hypothesis that produced no panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedHypothesis {
    /// Hypothesis label.
    pub label: String,
    /// Error message.
    pub error: String,
}

/// Plot-friendly LLR distributions for a batch of hypotheses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlrDistributionArtifact {
    /// Always [`LLR_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Completed hypotheses, in input order.
    pub panels: Vec<LlrPanel>,
    /// Failed hypotheses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedHypothesis>,
}

/// Build the artifact from a batch; failed hypotheses are listed under `skipped`.
///
/// Fails only if no hypothesis completed.
pub fn llr_distribution_artifact(outcomes: &[HypothesisOutcome]) -> Result<LlrDistributionArtifact> {
    let mut panels = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();

    for outcome in outcomes {
        match outcome {
            HypothesisOutcome::Completed(r) => panels.push(LlrPanel {
                label: r.label.clone(),
                mass_gev: r.mass_gev,
                bin_centers: bin_centers(&r.edges),
                bin_edges: r.edges.clone(),
                b_like: r.b_like_pdf.clone(),
                sb_like: r.sb_like_pdf.clone(),
                observed: r.observed.value,
                observed_in_range: !r.confidence.out_of_range,
                b_like_quantiles: r.b_like_quantiles,
                sb_like_quantiles: r.sb_like_quantiles,
                one_minus_clb: r.confidence.one_minus_clb,
                clsb: r.confidence.clsb,
                cls: r.confidence.cls,
            }),
            HypothesisOutcome::Failed { label, error } => {
                skipped.push(SkippedHypothesis { label: label.clone(), error: error.to_string() })
            }
        }
    }

    if panels.is_empty() {
        return Err(Error::Validation(format!(
            "no hypothesis completed ({} failed)",
            skipped.len()
        )));
    }

    Ok(LlrDistributionArtifact {
        schema_version: LLR_SCHEMA_VERSION.to_string(),
        meta: ArtifactMeta::now()?,
        panels,
        skipped,
    })
}
