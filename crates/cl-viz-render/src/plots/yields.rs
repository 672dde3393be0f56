use cl_viz::{YieldsArtifact, YieldsPanel};

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

/// `Events / 5 GeV` for uniform binning, plain `Events` otherwise.
fn y_label(edges: &[f64], unit: &str) -> String {
    let widths: Vec<f64> = edges.windows(2).map(|w| w[1] - w[0]).collect();
    let Some(&first) = widths.first() else {
        return "Events".into();
    };
    let uniform = widths.iter().all(|w| (w - first).abs() <= 1e-9 * first.abs().max(1.0));
    if uniform {
        let w = (first * 10.0).round() / 10.0;
        format!("Events / {w} {unit}").trim_end().to_string()
    } else {
        "Events".into()
    }
}

fn signal_label(panel: &YieldsPanel) -> String {
    match panel.mass_gev {
        Some(m) => format!("H signal (m\u{2095} = {m} GeV)"),
        None => format!("signal ({})", panel.label),
    }
}

fn check_panel(panel: &YieldsPanel) -> crate::Result<()> {
    let n = panel.bin_edges.len().saturating_sub(1);
    let lens = [panel.background.len(), panel.signal.len(), panel.total.len(), panel.data.len(), panel.data_err.len()];
    if n == 0 || lens.iter().any(|&l| l != n) {
        return Err(RenderError::Layout(format!(
            "{}: yields panel arrays do not match {} bins",
            panel.label, n
        )));
    }
    Ok(())
}

fn draw_panel(
    canvas: &mut Canvas,
    area: &PlotArea,
    panel: &YieldsPanel,
    x: &Axis,
    y: &Axis,
    config: &VizConfig,
    last: bool,
) {
    let px = |v: f64| x.data_to_pixel(v, area.left, area.right());
    let py = |v: f64| y.data_to_pixel_clamped(v, area.bottom(), area.top);
    let edges = &panel.bin_edges;

    canvas.push_clip(area.left, area.top, area.width, area.height);

    let bkg_style = Style::outlined(config.colors.background, Color::BLACK, 0.3);
    let sig_style = Style::outlined(config.colors.signal, Color::BLACK, 0.3);
    for i in 0..panel.background.len() {
        let (l, r) = (px(edges[i]), px(edges[i + 1]));
        let b = panel.background[i];
        canvas.rect(l, py(b), r - l, py(0.0) - py(b), &bkg_style);
        if panel.signal[i] > 0.0 {
            canvas.rect(l, py(panel.total[i]), r - l, py(b) - py(panel.total[i]), &sig_style);
        }
    }

    let err_style = LineStyle::solid(config.colors.data, 1.0);
    let marker = MarkerStyle { color: config.colors.data, ..Default::default() };
    for i in 0..panel.data.len() {
        let (l, r) = (px(edges[i]), px(edges[i + 1]));
        let n = panel.data[i];
        let cy = py(n);
        canvas.error_bar(0.5 * (l + r), py(n - panel.data_err[i]), py(n + panel.data_err[i]), 0.0, &err_style);
        canvas.error_bar_h(l, r, cy, &err_style);
        canvas.marker(0.5 * (l + r), cy, &marker);
    }

    canvas.pop_clip();

    draw_axes(canvas, area, x, y, config, last);

    let entries = [
        LegendEntry::new("data", config.colors.data, LegendKind::Marker),
        LegendEntry::new(signal_label(panel), config.colors.signal, LegendKind::Bar),
        LegendEntry::new("background", config.colors.background, LegendKind::Bar),
    ];
    legend::draw_legend(canvas, area, &entries, config.font.size, LegendCorner::TopRight);
}

/// Stacked background and signal bars with data points, one panel per
/// hypothesis, panels touching and sharing the x axis.
pub fn render(artifact: &YieldsArtifact, config: &VizConfig) -> crate::Result<String> {
    let Some(first) = artifact.panels.first() else {
        return Err(RenderError::Layout("yields artifact has no panels".into()));
    };
    for panel in &artifact.panels {
        check_panel(panel)?;
    }

    let x_min = first.bin_edges[0];
    let x_max = first.bin_edges[first.bin_edges.len() - 1];
    let x_title = if config.yields.x_unit.is_empty() {
        config.yields.x_label.clone()
    } else {
        format!("{} [{}]", config.yields.x_label, config.yields.x_unit)
    };
    let x_axis = Axis::exact(x_min, x_max, 6).with_label(x_title);

    let y_axes: Vec<Axis> = artifact
        .panels
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let peak = p
                .total
                .iter()
                .zip(&p.data_err)
                .zip(&p.data)
                .map(|((t, e), d)| t.max(d + e))
                .fold(0.0_f64, f64::max);
            let axis = Axis::nice(0.0, peak.max(1.0) * 1.35, 5)
                .with_label(y_label(&p.bin_edges, &config.yields.x_unit));
            if i > 0 { axis.without_top_label() } else { axis }
        })
        .collect();

    let margins = Margins::for_axes(&y_axes, Some(&x_axis), config);
    let n = artifact.panels.len();
    let stack_h = StackedLayout::height_for(n, config.figure.panel_height, 0.0);
    let fig_w = config.figure.width;
    let fig_h = margins.top + stack_h + margins.bottom;
    let mut canvas = Canvas::new(fig_w, fig_h)?;

    let layout = StackedLayout::new(margins.left, margins.top, fig_w - margins.left - margins.right, stack_h, n, 0.0);
    draw_experiment_header(&mut canvas, &layout.panels[0], config);

    for (i, panel) in artifact.panels.iter().enumerate() {
        if panel.bin_edges != first.bin_edges {
            log::warn!("{}: bin edges differ from the first panel, drawn on its x axis", panel.label);
        }
        draw_panel(&mut canvas, &layout.panels[i], panel, &x_axis, &y_axes[i], config, layout.is_last(i));
    }

    Ok(canvas.finish_svg())
}
