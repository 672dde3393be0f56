use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Centre-of-mass energy and luminosity, e.g. `√s = 206 GeV, 536 pb⁻¹`.
pub fn run_conditions(config: &VizConfig) -> Option<String> {
    let mut parts = Vec::new();
    if config.experiment.sqrt_s_gev > 0.0 {
        parts.push(format!("\u{221A}s = {} GeV", config.experiment.sqrt_s_gev));
    }
    if config.experiment.lumi_pb_inv > 0.0 {
        parts.push(format!("{} pb\u{207B}\u{00B9}", config.experiment.lumi_pb_inv));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Draw the experiment label above `area`: bold name, italic status, run conditions right-aligned.
pub fn draw_experiment_header(canvas: &mut Canvas, area: &PlotArea, config: &VizConfig) {
    if config.experiment.name.is_empty() {
        return;
    }

    let size = config.font.label_size * 1.3;
    let x = area.left;
    let y = area.top - 6.0;

    let name_style = TextStyle::sized(size).bold();
    canvas.text(x, y, &config.experiment.name, &name_style);

    if !config.experiment.status.is_empty() {
        let name_w = canvas.measure_text(&config.experiment.name, &name_style).width;
        canvas.text(
            x + name_w + 5.0,
            y,
            &config.experiment.status,
            &TextStyle::sized(size * 0.85).italic(),
        );
    }

    if let Some(info) = run_conditions(config) {
        let style = TextStyle::sized(config.font.tick_size)
            .colored(Color::rgb(80, 80, 80))
            .anchored(TextAnchor::End, TextBaseline::Alphabetic);
        canvas.text(area.right(), y, &info, &style);
    }
}
