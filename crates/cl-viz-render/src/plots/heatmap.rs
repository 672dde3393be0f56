use cl_viz::HeatmapArtifact;

use crate::canvas::Canvas;
use crate::color::{self, Color};
use crate::config::VizConfig;
use crate::header::draw_experiment_header;
use crate::layout::axes::Axis;
use crate::layout::margins::{Margins, PlotArea};
use crate::plots::axes_draw::{draw_axes, draw_frame};
use crate::primitives::*;
use crate::RenderError;

const COLORBAR_W: f64 = 14.0;
const COLORBAR_GAP: f64 = 12.0;
const COLORBAR_STEPS: usize = 64;

/// Position of `z` within `[z_min, z_max]`; a flat map sits mid-scale.
fn normalise(z: f64, z_min: f64, z_max: f64) -> f64 {
    if z_max > z_min { (z - z_min) / (z_max - z_min) } else { 0.5 }
}

fn cell_label(z: f64) -> String {
    if z.fract() == 0.0 { format!("{z:.0}") } else { format!("{z:.2}") }
}

fn check_shape(art: &HeatmapArtifact) -> crate::Result<(usize, usize)> {
    let nx = art.x_edges.len().saturating_sub(1);
    let ny = art.y_edges.len().saturating_sub(1);
    if nx == 0 || ny == 0 || art.z.len() != nx || art.z.iter().any(|row| row.len() != ny) {
        return Err(RenderError::Layout(format!(
            "heat map '{}': z is not {nx} x {ny}",
            art.title
        )));
    }
    Ok((nx, ny))
}

fn draw_colorbar(canvas: &mut Canvas, area: &PlotArea, art: &HeatmapArtifact, config: &VizConfig) {
    let bar = PlotArea::manual(area.right() + COLORBAR_GAP, area.top, COLORBAR_W, area.height);
    let step_h = bar.height / COLORBAR_STEPS as f64;
    for i in 0..COLORBAR_STEPS {
        let t = 1.0 - (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let c = color::colormap(&config.heatmap.colormap, t);
        // Overlap slightly so no hairline gaps show between steps.
        canvas.rect(bar.left, bar.top + i as f64 * step_h, bar.width, step_h + 0.3, &Style::filled(c));
    }
    draw_frame(canvas, &bar);

    let scale = Axis::exact(art.z_min, art.z_max, 5);
    let style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::Start, TextBaseline::Central);
    let tick = LineStyle::solid(Color::BLACK, 0.6);
    for (v, label) in scale.tick_positions.iter().zip(&scale.tick_labels) {
        let py = scale.data_to_pixel(*v, bar.bottom(), bar.top);
        canvas.line(bar.right() - 3.0, py, bar.right(), py, &tick);
        canvas.text(bar.right() + 3.0, py, label, &style);
    }
}

/// Colour map of a 2D histogram with a colour bar; small grids get their
/// contents written into the cells.
pub fn render(art: &HeatmapArtifact, config: &VizConfig) -> crate::Result<String> {
    let (nx, ny) = check_shape(art)?;

    let x_axis = Axis::exact(art.x_edges[0], art.x_edges[nx], 6).with_label(config.heatmap.x_label.clone());
    let y_axis = Axis::exact(art.y_edges[0], art.y_edges[ny], 6).with_label(config.heatmap.y_label.clone());

    let title_h = config.font.label_size + 8.0;
    let mut margins = Margins::for_axes([&y_axis], Some(&x_axis), config);
    margins.top += title_h;
    margins.right += COLORBAR_GAP + COLORBAR_W + 40.0;
    let (fig_w, fig_h) = (config.figure.width, config.figure.height);
    let mut canvas = Canvas::new(fig_w, fig_h)?;
    let area = PlotArea::inside(fig_w, fig_h, &margins);

    let header_area = PlotArea::manual(area.left, area.top - title_h, area.width, area.height);
    draw_experiment_header(&mut canvas, &header_area, config);

    let annotate = config.heatmap.annotate && nx * ny <= config.heatmap.max_annotated_cells;
    for i in 0..nx {
        let l = x_axis.data_to_pixel(art.x_edges[i], area.left, area.right());
        let r = x_axis.data_to_pixel(art.x_edges[i + 1], area.left, area.right());
        for j in 0..ny {
            let top = y_axis.data_to_pixel(art.y_edges[j + 1], area.bottom(), area.top);
            let bottom = y_axis.data_to_pixel(art.y_edges[j], area.bottom(), area.top);
            let z = art.z[i][j];
            let fill = color::colormap(&config.heatmap.colormap, normalise(z, art.z_min, art.z_max));
            canvas.rect(l, top, r - l, bottom - top, &Style::filled(fill));

            if annotate {
                let ink = if fill.luminance() < 0.5 { Color::WHITE } else { Color::BLACK };
                let style = TextStyle::sized(config.font.tick_size * 0.85)
                    .colored(ink)
                    .anchored(TextAnchor::Middle, TextBaseline::Central);
                canvas.text(0.5 * (l + r), 0.5 * (top + bottom), &cell_label(z), &style);
            }
        }
    }

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config, true);
    let title_style =
        TextStyle::sized(config.font.label_size).bold().anchored(TextAnchor::Middle, TextBaseline::Alphabetic);
    canvas.text(area.center_x(), area.top - 5.0, &art.title, &title_style);
    draw_colorbar(&mut canvas, &area, art, config);

    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_handles_flat_maps() {
        assert_eq!(normalise(3.0, 1.0, 5.0), 0.5);
        assert_eq!(normalise(1.0, 1.0, 5.0), 0.0);
        assert_eq!(normalise(2.0, 2.0, 2.0), 0.5);
    }

    #[test]
    fn cell_labels() {
        assert_eq!(cell_label(42.0), "42");
        assert_eq!(cell_label(2.5), "2.50");
    }
}
