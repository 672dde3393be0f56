//! # cl-viz
//!
//! Visualization data artifacts for countllr.
//!
//! Artifacts are plain, plot-friendly JSON structures (flat arrays per panel)
//! computed purely from histograms and engine outputs. Nothing here feeds back
//! into the statistics.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::{SystemTime, UNIX_EPOCH};

use cl_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// 2D histogram heat maps.
pub mod heatmap;
/// LLR distributions with observed value, quantile bands and confidence levels.
pub mod llr;
/// Stacked background/signal yields with data.
pub mod yields;

pub use heatmap::{HeatmapArtifact, heatmap_artifact};
pub use llr::{LlrDistributionArtifact, LlrPanel, SkippedHypothesis, llr_distribution_artifact};
pub use yields::{YieldsArtifact, YieldsInput, YieldsPanel, yields_artifact};

/// Provenance shared by every artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Producing tool.
    pub tool: String,
    /// Tool version.
    pub tool_version: String,
    /// Creation time (ms since the Unix epoch).
    pub created_unix_ms: u128,
}

impl ArtifactMeta {
    pub(crate) fn now() -> Result<Self> {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Computation(format!("system time error: {}", e)))?;
        Ok(Self {
            tool: "countllr".to_string(),
            tool_version: cl_core::VERSION.to_string(),
            created_unix_ms: d.as_millis(),
        })
    }
}

pub(crate) fn bin_centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}
