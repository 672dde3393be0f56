//! Heat map artifact for a 2D histogram.

use cl_core::{Histogram2D, Result};
use serde::{Deserialize, Serialize};

use crate::{ArtifactMeta, bin_centers};

/// Schema tag of [`HeatmapArtifact`].
pub const HEATMAP_SCHEMA_VERSION: &str = "countllr_heatmap_v1";

/// Plot-friendly 2D histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapArtifact {
    /// Always [`HEATMAP_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Title drawn above the map.
    pub title: String,
    /// Edges along x.
    pub x_edges: Vec<f64>,
    /// Edges along y.
    pub y_edges: Vec<f64>,
    /// Bin centres along x.
    pub x_centers: Vec<f64>,
    /// Bin centres along y.
    pub y_centers: Vec<f64>,
    /// `z[i][j]` is bin `(i, j)`, `i` along x.
    pub z: Vec<Vec<f64>>,
    /// Smallest content.
    pub z_min: f64,
    /// Largest content.
    pub z_max: f64,
    /// Bins with zero content.
    pub n_zero_bins: usize,
}

/// Build a heat map of `h`.
pub fn heatmap_artifact(title: &str, h: &Histogram2D) -> Result<HeatmapArtifact> {
    let contents = h.contents();
    let (z_min, z_max) = contents
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    Ok(HeatmapArtifact {
        schema_version: HEATMAP_SCHEMA_VERSION.to_string(),
        meta: ArtifactMeta::now()?,
        title: title.to_string(),
        x_edges: h.x_edges().to_vec(),
        y_edges: h.y_edges().to_vec(),
        x_centers: bin_centers(h.x_edges()),
        y_centers: bin_centers(h.y_edges()),
        z: (0..h.nx()).map(|i| h.row(i).to_vec()).collect(),
        z_min,
        z_max,
        n_zero_bins: contents.iter().filter(|&&v| v == 0.0).count(),
    })
}
