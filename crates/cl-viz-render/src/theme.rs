use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinTheme {
    #[default]
    Countllr,
    Lep,
    Minimal,
}

impl BuiltinTheme {
    pub const ALL: [BuiltinTheme; 3] = [Self::Countllr, Self::Lep, Self::Minimal];

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "countllr" | "default" => Ok(Self::Countllr),
            "lep" => Ok(Self::Lep),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!("unknown theme '{other}' (expected countllr, lep or minimal)")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Countllr => "countllr",
            Self::Lep => "lep",
            Self::Minimal => "minimal",
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Countllr => countllr(),
            Self::Lep => lep(),
            Self::Minimal => minimal(),
        }
    }
}

fn countllr() -> VizConfig {
    VizConfig {
        theme: BuiltinTheme::Countllr.name().into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        experiment: ExperimentConfig::default(),
        colors: ColorsConfig::default(),
        palette: "lep".into(),
        llr: LlrPlotConfig::default(),
        yields: YieldsPlotConfig::default(),
        heatmap: HeatmapPlotConfig::default(),
    }
}

/// Combined LEP Higgs search look: yellow/red stacks, blue/red LLR curves.
fn lep() -> VizConfig {
    VizConfig {
        theme: BuiltinTheme::Lep.name().into(),
        figure: FigureConfig { width: 576.0, panel_height: 240.0, height: 432.0 },
        font: FontConfig { size: 11.0, label_size: 12.0, tick_size: 9.5 },
        axes: AxesConfig { tick_length: 6.0, ..AxesConfig::default() },
        experiment: ExperimentConfig {
            name: "LEP".into(),
            status: "Higgs search".into(),
            sqrt_s_gev: 206.0,
            lumi_pb_inv: 0.0,
        },
        colors: ColorsConfig {
            background: Color::rgb(0xFF, 0xFF, 0x00),
            signal: Color::rgb(0xFF, 0x00, 0x00),
            data: Color::BLACK,
            b_like: Color::rgb(0x00, 0x00, 0xFF),
            sb_like: Color::rgb(0xFF, 0x00, 0x00),
            observed: Color::BLACK,
            band_1sigma: Color::rgb(0x00, 0xCC, 0x00),
            band_2sigma: Color::rgb(0xFF, 0xFF, 0x00),
        },
        ..countllr()
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: BuiltinTheme::Minimal.name().into(),
        figure: FigureConfig { width: 432.0, panel_height: 190.0, height: 360.0 },
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0 },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
        },
        experiment: ExperimentConfig {
            name: String::new(),
            status: String::new(),
            sqrt_s_gev: 0.0,
            lumi_pb_inv: 0.0,
        },
        palette: "tableau10".into(),
        llr: LlrPlotConfig { shade_tails: false, ..LlrPlotConfig::default() },
        ..countllr()
    }
}
