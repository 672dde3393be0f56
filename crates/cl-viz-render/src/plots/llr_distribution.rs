use cl_inference::QuantileSummary;
use cl_viz::{LlrDistributionArtifact, LlrPanel};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::header::draw_experiment_header;
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendCorner, LegendEntry, LegendKind};
use crate::layout::margins::{Margins, PlotArea};
use crate::layout::multi_panel::StackedLayout;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;
use crate::RenderError;

const Y_HEADROOM: f64 = 1.5;

/// Panel title, e.g. `signal model (mH = 90 GeV)`.
fn panel_title(panel: &LlrPanel) -> String {
    match panel.mass_gev {
        Some(m) => format!("signal model (m\u{2095} = {m} GeV)"),
        None => format!("signal model ({})", panel.label),
    }
}

/// Probability with enough digits to stay readable in the tails.
fn format_probability(p: f64) -> String {
    if p > 0.0 && p < 1e-3 { format!("{p:.2e}") } else { format!("{p:.4}") }
}

/// Frame spans the LLR binning, widened just enough to show an observed value outside it.
fn x_axis_for(panel: &LlrPanel, config: &VizConfig) -> crate::Result<Axis> {
    let (Some(&first), Some(&last)) = (panel.bin_edges.first(), panel.bin_edges.last()) else {
        return Err(RenderError::Layout(format!("{}: LLR panel has no bin edges", panel.label)));
    };
    let span = (last - first).abs().max(1e-9);
    let lo = if panel.observed < first { panel.observed - 0.03 * span } else { first };
    let hi = if panel.observed > last { panel.observed + 0.03 * span } else { last };
    Ok(Axis::exact(lo, hi, 7).with_label(config.llr.x_label.clone()))
}

fn y_axis_for(panel: &LlrPanel, config: &VizConfig) -> Axis {
    let peak = panel.b_like.iter().chain(&panel.sb_like).copied().fold(0.0_f64, f64::max);
    Axis::nice(0.0, peak.max(1e-6) * Y_HEADROOM, 5).with_label(config.llr.y_label.clone())
}

/// Outline of bins `range` of a density histogram, closed down to zero at both ends.
fn step_outline(
    edges: &[f64],
    density: &[f64],
    range: std::ops::Range<usize>,
    x: &Axis,
    y: &Axis,
    area: &PlotArea,
) -> Vec<(f64, f64)> {
    let px = |v: f64| x.data_to_pixel(v, area.left, area.right());
    let py = |v: f64| y.data_to_pixel_clamped(v, area.bottom(), area.top);
    let mut points = Vec::with_capacity(2 * range.len() + 2);
    if range.is_empty() {
        return points;
    }
    points.push((px(edges[range.start]), py(0.0)));
    for i in range.clone() {
        points.push((px(edges[i]), py(density[i])));
        points.push((px(edges[i + 1]), py(density[i])));
    }
    points.push((px(edges[range.end]), py(0.0)));
    points
}

/// Vertical band between two LLR values across the full panel height.
fn span(canvas: &mut Canvas, area: &PlotArea, x: &Axis, lo: f64, hi: f64, color: Color, alpha: f64) {
    let l = x.data_to_pixel_clamped(lo, area.left, area.right());
    let r = x.data_to_pixel_clamped(hi, area.left, area.right());
    canvas.rect(l, area.top, r - l, area.height, &Style::filled(color.with_alpha(alpha)));
}

fn draw_bands(canvas: &mut Canvas, area: &PlotArea, x: &Axis, q: &QuantileSummary, config: &VizConfig) {
    span(canvas, area, x, q.two_sigma.0, q.two_sigma.1, config.colors.band_2sigma, 0.35);
    span(canvas, area, x, q.one_sigma.0, q.one_sigma.1, config.colors.band_1sigma, 0.45);
    let median = x.data_to_pixel(q.median, area.left, area.right());
    canvas.line(median, area.top, median, area.bottom(), &LineStyle::dotted(config.colors.b_like, 1.0));
}

fn draw_cl_text(canvas: &mut Canvas, area: &PlotArea, panel: &LlrPanel, config: &VizConfig) {
    let style = TextStyle::sized(config.font.size * 0.85).anchored(TextAnchor::Start, TextBaseline::Hanging);
    let lines = [
        format!("1\u{2212}CLb = {}", format_probability(panel.one_minus_clb)),
        format!("CLs+b = {}", format_probability(panel.clsb)),
        format!("CLs = {}", format_probability(panel.cls)),
    ];
    for (i, line) in lines.iter().enumerate() {
        canvas.text(area.left + 6.0, area.top + 6.0 + i as f64 * (style.size + 3.0), line, &style);
    }
}

fn draw_panel(canvas: &mut Canvas, area: &PlotArea, panel: &LlrPanel, x: &Axis, y: &Axis, config: &VizConfig) {
    let edges = &panel.bin_edges;
    let n_bins = edges.len().saturating_sub(1).min(panel.b_like.len()).min(panel.sb_like.len());

    canvas.push_clip(area.left, area.top, area.width, area.height);

    if config.llr.show_bands {
        draw_bands(canvas, area, x, &panel.b_like_quantiles, config);
    }

    if config.llr.shade_tails {
        // Same split as the confidence levels: bins left of the last edge <= observed
        // make up 1-CLb, the rest CLs+b.
        let pos = edges.iter().rposition(|&e| e <= panel.observed).unwrap_or(0).min(n_bins);
        let left = step_outline(edges, &panel.b_like, 0..pos, x, y, area);
        canvas.polygon(&left, &Style::filled(config.colors.b_like.with_alpha(0.3)));
        let right = step_outline(edges, &panel.sb_like, pos..n_bins, x, y, area);
        canvas.polygon(&right, &Style::filled(config.colors.sb_like.with_alpha(0.3)));
    }

    let b_line = step_outline(edges, &panel.b_like, 0..n_bins, x, y, area);
    canvas.polyline(&b_line, &LineStyle::solid(config.colors.b_like, 1.4));
    let sb_line = step_outline(edges, &panel.sb_like, 0..n_bins, x, y, area);
    canvas.polyline(&sb_line, &LineStyle::dashed(config.colors.sb_like, 1.4));

    let obs_px = x.data_to_pixel_clamped(panel.observed, area.left, area.right());
    let obs_style = LineStyle {
        color: config.colors.observed,
        width: 1.6,
        dash: if panel.observed_in_range { Dash::Solid } else { Dash::DashDot },
    };
    canvas.line(obs_px, area.top, obs_px, area.bottom(), &obs_style);

    canvas.pop_clip();

    draw_axes(canvas, area, x, y, config, true);

    let title_style = TextStyle::sized(config.font.size).anchored(TextAnchor::Start, TextBaseline::Alphabetic);
    canvas.text(area.left, area.top - 5.0, &panel_title(panel), &title_style);

    if config.llr.show_cl_text {
        draw_cl_text(canvas, area, panel, config);
    }

    let mut entries = vec![
        LegendEntry::new("bkg-like", config.colors.b_like, LegendKind::Line(Dash::Solid)),
        LegendEntry::new("sig+bkg-like", config.colors.sb_like, LegendKind::Line(Dash::Dashed)),
        LegendEntry::new("observed", config.colors.observed, LegendKind::Line(obs_style.dash)),
    ];
    if config.llr.show_bands {
        entries.push(LegendEntry::new("\u{00B1}1\u{03C3} bkg-like", config.colors.band_1sigma, LegendKind::Band));
        entries.push(LegendEntry::new("\u{00B1}2\u{03C3} bkg-like", config.colors.band_2sigma, LegendKind::Band));
    }
    legend::draw_legend(canvas, area, &entries, config.font.size, LegendCorner::TopRight);
}

/// One panel per completed hypothesis, stacked vertically; failed hypotheses
/// are listed under the last panel.
pub fn render(artifact: &LlrDistributionArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.panels.is_empty() {
        return Err(RenderError::Layout("LLR artifact has no panels".into()));
    }

    let x_axes = artifact.panels.iter().map(|p| x_axis_for(p, config)).collect::<crate::Result<Vec<_>>>()?;
    let y_axes: Vec<Axis> = artifact.panels.iter().map(|p| y_axis_for(p, config)).collect();

    let margins = Margins::for_axes(&y_axes, x_axes.first(), config);
    let title_h = config.font.size + 8.0;
    let gap = margins.bottom + title_h;
    let n = artifact.panels.len();
    let stack_h = StackedLayout::height_for(n, config.figure.panel_height, gap);
    let footnote_line = config.font.tick_size + 4.0;
    let footnote_h = artifact.skipped.len() as f64 * footnote_line;

    let top = margins.top + title_h;
    let fig_w = config.figure.width;
    let fig_h = top + stack_h + margins.bottom + footnote_h;
    let mut canvas = Canvas::new(fig_w, fig_h)?;

    let layout = StackedLayout::new(margins.left, top, fig_w - margins.left - margins.right, stack_h, n, gap);

    let first = layout.panels[0];
    let header_area = PlotArea::manual(first.left, margins.top, first.width, first.height);
    draw_experiment_header(&mut canvas, &header_area, config);

    for (i, panel) in artifact.panels.iter().enumerate() {
        draw_panel(&mut canvas, &layout.panels[i], panel, &x_axes[i], &y_axes[i], config);
    }

    if !artifact.skipped.is_empty() {
        log::warn!("{} hypotheses have no LLR panel", artifact.skipped.len());
        let style = TextStyle::sized(config.font.tick_size).colored(Color::rgb(110, 110, 110));
        let base = fig_h - footnote_h;
        for (i, s) in artifact.skipped.iter().enumerate() {
            let y = base + (i as f64 + 0.8) * footnote_line;
            canvas.text(margins.left, y, &format!("skipped {}: {}", s.label, s.error), &style);
        }
    }

    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_switch_to_scientific_in_tails() {
        assert_eq!(format_probability(0.25), "0.2500");
        assert_eq!(format_probability(0.0), "0.0000");
        assert_eq!(format_probability(1.5e-5), "1.50e-5");
    }
}
