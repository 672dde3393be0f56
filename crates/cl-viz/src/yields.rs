//! Stacked yields artifact (1D only): background, signal on top, data with `sqrt(N)` errors.

use cl_core::{AnyHistogram, Error, Histogram1D, Result};
use serde::{Deserialize, Serialize};

use crate::{ArtifactMeta, bin_centers};

/// Schema tag of [`YieldsArtifact`].
pub const YIELDS_SCHEMA_VERSION: &str = "countllr_yields_v1";

/// Histograms of one hypothesis.
#[derive(Debug, Clone, Copy)]
pub struct YieldsInput<'a> {
    /// Hypothesis label.
    pub label: &'a str,
    /// Signal mass, if known.
    pub mass_gev: Option<f64>,
    /// Expected background.
    pub background: &'a AnyHistogram,
    /// Expected signal.
    pub signal: &'a AnyHistogram,
    /// Observed counts.
    pub data: &'a AnyHistogram,
}

/// One hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldsPanel {
    /// Hypothesis label.
    pub label: String,
    /// Signal mass, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_gev: Option<f64>,
    /// Bin edges.
    pub bin_edges: Vec<f64>,
    /// Bin centres.
    pub bin_centers: Vec<f64>,
    /// Expected background.
    pub background: Vec<f64>,
    /// Expected signal.
    pub signal: Vec<f64>,
    /// Background + signal (top of the stack).
    pub total: Vec<f64>,
    /// Observed counts.
    pub data: Vec<f64>,
    /// `sqrt(N)` per data bin.
    pub data_err: Vec<f64>,
}

/// Plot-friendly stacked yields, one panel per hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldsArtifact {
    /// Always [`YIELDS_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Panels, in input order.
    pub panels: Vec<YieldsPanel>,
}

fn one_d<'a>(label: &str, what: &str, h: &'a AnyHistogram) -> Result<&'a Histogram1D> {
    h.as_one_d().ok_or_else(|| {
        Error::Validation(format!("{label}: yields plots need 1D histograms, {what} is 2D"))
    })
}

fn panel(input: &YieldsInput<'_>) -> Result<YieldsPanel> {
    let b = one_d(input.label, "background", input.background)?;
    let s = one_d(input.label, "signal", input.signal)?;
    let d = one_d(input.label, "data", input.data)?;
    if s.edges() != b.edges() || d.edges() != b.edges() {
        return Err(Error::Validation(format!(
            "{}: background, signal and data must share bin edges",
            input.label
        )));
    }

    let total = b.contents().iter().zip(s.contents()).map(|(b, s)| b + s).collect();
    let data_err = d.contents().iter().map(|n| n.sqrt()).collect();

    Ok(YieldsPanel {
        label: input.label.to_string(),
        mass_gev: input.mass_gev,
        bin_edges: b.edges().to_vec(),
        bin_centers: bin_centers(b.edges()),
        background: b.contents().to_vec(),
        signal: s.contents().to_vec(),
        total,
        data: d.contents().to_vec(),
        data_err,
    })
}

/// Build the yields artifact. 2D inputs are rejected.
pub fn yields_artifact(inputs: &[YieldsInput<'_>]) -> Result<YieldsArtifact> {
    if inputs.is_empty() {
        return Err(Error::Validation("yields artifact needs at least one hypothesis".to_string()));
    }
    let panels = inputs.iter().map(panel).collect::<Result<Vec<_>>>()?;
    Ok(YieldsArtifact {
        schema_version: YIELDS_SCHEMA_VERSION.to_string(),
        meta: ArtifactMeta::now()?,
        panels,
    })
}
