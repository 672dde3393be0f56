//! # cl-viz-render
//!
//! SVG rendering of the plot artifacts produced by `cl-viz`: stacked LLR
//! distributions, stacked yields and 2D heat maps.
//!
//! Rendering is pure string building on an immediate-mode [`canvas::Canvas`];
//! text extents are estimated (see [`text`]) so no font files are needed.

pub mod canvas;
pub mod color;
pub mod config;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use config::VizConfig;
use thiserror::Error;

/// Artifact kinds accepted by [`render_svg`].
pub const KINDS: &[&str] = &["llr", "yields", "heatmap"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render an artifact JSON to an SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &VizConfig) -> Result<String> {
    let svg = match kind {
        "llr" | "llr_distribution" => {
            let art: cl_viz::LlrDistributionArtifact = serde_json::from_str(artifact_json)?;
            plots::llr_distribution::render(&art, config)?
        }
        "yields" => {
            let art: cl_viz::YieldsArtifact = serde_json::from_str(artifact_json)?;
            plots::yields::render(&art, config)?
        }
        "heatmap" => {
            let art: cl_viz::HeatmapArtifact = serde_json::from_str(artifact_json)?;
            plots::heatmap::render(&art, config)?
        }
        other => return Err(RenderError::UnknownKind(other.to_string())),
    };
    Ok(svg)
}

/// Render an artifact JSON to a file. Only `.svg` (or no extension) is supported.
pub fn render_to_file(
    artifact_json: &str,
    kind: &str,
    path: &std::path::Path,
    config: &VizConfig,
) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("svg");
    if !ext.eq_ignore_ascii_case("svg") {
        return Err(RenderError::UnknownKind(format!("format: {ext}")));
    }
    let svg = render_svg(artifact_json, kind, config)?;
    output::svg::save_svg(&svg, path)
}
