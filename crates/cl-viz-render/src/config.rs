use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level rendering configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub experiment: ExperimentConfig,
    pub colors: ColorsConfig,
    pub palette: String,
    pub llr: LlrPlotConfig,
    pub yields: YieldsPlotConfig,
    pub heatmap: HeatmapPlotConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::default().base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> &'static [Color] {
        crate::color::palette_colors(&self.palette)
    }

    /// Space above the first panel: header line or a small pad.
    pub fn header_height(&self) -> f64 {
        if self.experiment.name.is_empty() { 12.0 } else { self.font.label_size * 1.3 + 18.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    /// Height of one stacked panel; figures grow with the number of hypotheses.
    pub panel_height: f64,
    /// Height of a single-panel figure (heat maps).
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self { width: 518.4, panel_height: 220.0, height: 432.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 10.0, label_size: 11.0, tick_size: 8.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 5.0,
            minor_tick_length: 3.0,
        }
    }
}

impl AxesConfig {
    pub fn ticks_inward(&self) -> bool {
        self.tick_direction != "out"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::rgb(0xCB, 0xD5, 0xE1), alpha: 0.55 }
    }
}

/// Header drawn above the first panel, e.g. **LEP** *Higgs search*, √s = 206 GeV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub status: String,
    pub sqrt_s_gev: f64,
    pub lumi_pb_inv: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { name: "COUNTLLR".into(), status: "Pseudo-experiments".into(), sqrt_s_gev: 0.0, lumi_pb_inv: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Stacked expected background.
    pub background: Color,
    /// Stacked expected signal.
    pub signal: Color,
    /// Data markers.
    pub data: Color,
    /// Background-like LLR distribution.
    pub b_like: Color,
    /// Signal-plus-background-like LLR distribution.
    pub sb_like: Color,
    /// Observed LLR line.
    pub observed: Color,
    pub band_1sigma: Color,
    pub band_2sigma: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xF5, 0xD7, 0x3B),
            signal: Color::rgb(0xD6, 0x27, 0x28),
            data: Color::rgb(0x11, 0x18, 0x27),
            b_like: Color::rgb(0x1D, 0x4E, 0xD8),
            sb_like: Color::rgb(0xDC, 0x26, 0x26),
            observed: Color::rgb(0x11, 0x18, 0x27),
            band_1sigma: Color::rgb(0x7B, 0xD3, 0x89),
            band_2sigma: Color::rgb(0xF2, 0xD9, 0x5C),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlrPlotConfig {
    pub x_label: String,
    pub y_label: String,
    /// Shade the ±1σ/±2σ quantile bands of the background-like distribution.
    pub show_bands: bool,
    /// Shade the 1-CLb and CLs+b tails on either side of the observed value.
    pub shade_tails: bool,
    /// Print 1-CLb, CLs+b and CLs inside each panel.
    pub show_cl_text: bool,
}

impl Default for LlrPlotConfig {
    fn default() -> Self {
        Self {
            x_label: "\u{2212}2 ln(Q)".into(),
            y_label: "p.d.f.".into(),
            show_bands: true,
            shade_tails: true,
            show_cl_text: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldsPlotConfig {
    pub x_label: String,
    pub x_unit: String,
}

impl Default for YieldsPlotConfig {
    fn default() -> Self {
        Self { x_label: "Reconstructed Higgs mass".into(), x_unit: "GeV".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapPlotConfig {
    pub x_label: String,
    pub y_label: String,
    pub colormap: String,
    /// Write each bin's content into its cell (only for small grids).
    pub annotate: bool,
    pub max_annotated_cells: usize,
}

impl Default for HeatmapPlotConfig {
    fn default() -> Self {
        Self {
            x_label: String::new(),
            y_label: String::new(),
            colormap: "viridis".into(),
            annotate: true,
            max_annotated_cells: 100,
        }
    }
}

fn config_error(e: impl std::fmt::Display) -> crate::RenderError {
    crate::RenderError::Config(e.to_string())
}

/// Overlay `user` onto `base`, mapping by mapping; scalars and sequences replace.
fn merge(base: &mut Value, user: Value) {
    match (base, user) {
        (Value::Mapping(base), Value::Mapping(user)) => {
            for (key, value) in user {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Resolve a [`VizConfig`] from an optional YAML document.
///
/// The document's `theme` key (or `fallback` when absent) selects the base
/// preset; every other key overrides that preset field by field.
pub fn resolve_config_with_theme(
    user_yaml: Option<&str>,
    fallback: BuiltinTheme,
) -> crate::Result<VizConfig> {
    let user: Value = match user_yaml {
        Some(yaml) => serde_yaml_ng::from_str(yaml).map_err(config_error)?,
        None => Value::Null,
    };
    if !(user.is_null() || user.is_mapping()) {
        return Err(config_error("top level of the config must be a mapping"));
    }

    let theme = user
        .get("theme")
        .and_then(Value::as_str)
        .map(BuiltinTheme::parse)
        .transpose()
        .map_err(config_error)?
        .unwrap_or(fallback);
    if user.is_null() {
        return Ok(theme.base_config());
    }

    let mut merged = serde_yaml_ng::to_value(theme.base_config()).map_err(config_error)?;
    merge(&mut merged, user);
    serde_yaml_ng::from_value(merged).map_err(config_error)
}

/// [`resolve_config_with_theme`] on the default theme.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    resolve_config_with_theme(user_yaml, BuiltinTheme::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_yaml_is_default_theme() {
        let cfg = resolve_config(None).unwrap();
        assert_eq!(cfg.theme, "countllr");
        assert_eq!(cfg.font.size, 10.0);
    }

    #[test]
    fn yaml_overrides_single_fields() {
        let cfg = resolve_config(Some("font:\n  size: 14\ncolors:\n  b_like: '#000000'\n")).unwrap();
        assert_eq!(cfg.font.size, 14.0);
        assert_eq!(cfg.font.tick_size, 8.5);
        assert_eq!(cfg.colors.b_like, Color::BLACK);
        assert_eq!(cfg.colors.sb_like, ColorsConfig::default().sb_like);
    }

    #[test]
    fn theme_key_selects_base() {
        let cfg = resolve_config(Some("theme: lep\nfigure:\n  width: 300\n")).unwrap();
        assert_eq!(cfg.experiment.name, "LEP");
        assert_eq!(cfg.figure.width, 300.0);
        assert_eq!(cfg.figure.panel_height, BuiltinTheme::Lep.base_config().figure.panel_height);
    }

    #[test]
    fn fallback_theme_used_without_key() {
        let cfg = resolve_config_with_theme(Some("grid:\n  show: true\n"), BuiltinTheme::Minimal).unwrap();
        assert_eq!(cfg.theme, "minimal");
        assert!(cfg.grid.show);
    }

    #[test]
    fn bad_yaml_is_config_error() {
        assert!(matches!(resolve_config(Some("- 1\n- 2\n")), Err(crate::RenderError::Config(_))));
        assert!(matches!(
            resolve_config(Some("colors:\n  signal: crimson\n")),
            Err(crate::RenderError::Config(_))
        ));
        assert!(matches!(resolve_config(Some("theme: atlas\n")), Err(crate::RenderError::Config(_))));
    }
}
