use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::{PlotArea, max_tick_label_width};
use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Bottom,
    Top,
    Left,
    Right,
}

/// One tick mark on `side`, at pixel `pos` along that side.
fn tick(canvas: &mut Canvas, area: &PlotArea, side: Side, pos: f64, len: f64, inward: bool, style: &LineStyle) {
    let len = if inward { len } else { -len };
    match side {
        Side::Bottom => canvas.line(pos, area.bottom(), pos, area.bottom() - len, style),
        Side::Top => canvas.line(pos, area.top, pos, area.top + len, style),
        Side::Left => canvas.line(area.left, pos, area.left + len, pos, style),
        Side::Right => canvas.line(area.right(), pos, area.right() - len, pos, style),
    }
}

/// Box frame with ticks, optional grid and labels.
///
/// With `x_labels == false` the x tick labels and title are omitted, for
/// panels stacked above another one that shares the x axis.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
    x_labels: bool,
) {
    let major = LineStyle::solid(Color::BLACK, 0.6);
    let minor = LineStyle::solid(Color::BLACK, 0.4);
    let inward = config.axes.ticks_inward();
    let tl = config.axes.tick_length;
    let mtl = config.axes.minor_tick_length;
    let label_gap = if inward { 3.0 } else { tl + 3.0 };
    let grid = LineStyle::dashed(config.grid.color.with_alpha(config.grid.alpha), 0.5);

    draw_frame(canvas, area);

    let x_tick_style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::Middle, TextBaseline::Hanging);
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        if !x_axis.contains(val) {
            continue;
        }
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if config.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid);
        }
        tick(canvas, area, Side::Bottom, px, tl, inward, &major);
        if config.axes.show_top_ticks {
            tick(canvas, area, Side::Top, px, tl, inward, &major);
        }
        if x_labels && let Some(label) = x_axis.tick_labels.get(i) {
            canvas.text(px, area.bottom() + label_gap, label, &x_tick_style);
        }
    }
    for &val in x_axis.minor_ticks.iter().filter(|&&v| x_axis.contains(v)) {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        tick(canvas, area, Side::Bottom, px, mtl, inward, &minor);
        if config.axes.show_top_ticks {
            tick(canvas, area, Side::Top, px, mtl, inward, &minor);
        }
    }

    let y_tick_style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::End, TextBaseline::Central);
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        if !y_axis.contains(val) {
            continue;
        }
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if config.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid);
        }
        tick(canvas, area, Side::Left, py, tl, inward, &major);
        if config.axes.show_right_ticks {
            tick(canvas, area, Side::Right, py, tl, inward, &major);
        }
        if let Some(label) = y_axis.tick_labels.get(i).filter(|l| !l.is_empty()) {
            canvas.text(area.left - label_gap - 1.0, py, label, &y_tick_style);
        }
    }
    for &val in y_axis.minor_ticks.iter().filter(|&&v| y_axis.contains(v)) {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        tick(canvas, area, Side::Left, py, mtl, inward, &minor);
        if config.axes.show_right_ticks {
            tick(canvas, area, Side::Right, py, mtl, inward, &minor);
        }
    }

    // Axis titles sit at the far end of their axis, HEP style.
    if x_labels && !x_axis.label.is_empty() {
        let style = TextStyle::sized(config.font.label_size).anchored(TextAnchor::End, TextBaseline::Hanging);
        let y = area.bottom() + label_gap + config.font.tick_size + 6.0;
        canvas.text(area.right(), y, &x_axis.label, &style);
    }
    if !y_axis.label.is_empty() {
        let style = TextStyle::sized(config.font.label_size).anchored(TextAnchor::End, TextBaseline::Alphabetic);
        let x = area.left - label_gap - max_tick_label_width(y_axis, config) - 6.0;
        canvas.text_rotated(x, area.top, &y_axis.label, &style, -90.0);
    }
}

pub fn draw_frame(canvas: &mut Canvas, area: &PlotArea) {
    let style = Style::stroked(Color::BLACK, 0.8);
    canvas.rect(area.left, area.top, area.width, area.height, &style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(x_labels: bool) -> String {
        let cfg = VizConfig::default();
        let mut c = Canvas::new(300.0, 200.0).unwrap();
        let area = PlotArea::manual(50.0, 20.0, 230.0, 150.0);
        let x = Axis::exact(60.0, 110.0, 6).with_label("m [GeV]");
        let y = Axis::nice(0.0, 45.0, 5).with_label("Events");
        draw_axes(&mut c, &area, &x, &y, &cfg, x_labels);
        c.finish_svg()
    }

    #[test]
    fn labels_drawn() {
        let svg = render(true);
        assert!(svg.contains(">m [GeV]</text>"));
        assert!(svg.contains(">Events</text>"));
        assert!(svg.contains(">100</text>"));
        assert!(svg.contains("rotate(-90.0"));
    }

    #[test]
    fn shared_x_hides_x_labels() {
        let svg = render(false);
        assert!(!svg.contains(">m [GeV]</text>"));
        assert!(!svg.contains(">100</text>"));
        assert!(svg.contains(">Events</text>"));
    }
}
