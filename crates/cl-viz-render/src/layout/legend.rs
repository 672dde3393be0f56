use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color, kind: LegendKind) -> Self {
        Self { label: label.into(), color, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendKind {
    /// Histogram bar: filled swatch with a dark outline.
    Bar,
    /// Translucent band.
    Band,
    Line(Dash),
    /// Data point with error bar.
    Marker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendCorner {
    #[default]
    TopRight,
    TopLeft,
}

/// Draw a legend box inside `area`. Returns the box as drawn.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    corner: LegendCorner,
) -> Option<PlotArea> {
    if entries.is_empty() {
        return None;
    }

    let row_height = font_size + 3.0;
    let swatch_w = 16.0;
    let swatch_h = font_size - 2.0;
    let gap = 5.0;
    let padding = 5.0;
    let text_style = TextStyle::sized(font_size * 0.85).anchored(TextAnchor::Start, TextBaseline::Central);

    let max_w = entries
        .iter()
        .map(|e| canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);
    let legend_w = padding + swatch_w + gap + max_w + padding;
    let legend_h = 2.0 * padding + entries.len() as f64 * row_height;

    let lx = match corner {
        LegendCorner::TopRight => area.right() - legend_w - 4.0,
        LegendCorner::TopLeft => area.left + 4.0,
    };
    let ly = area.top + 4.0;
    canvas.rect(lx, ly, legend_w, legend_h, &Style::filled(Color::WHITE.with_alpha(0.85)));

    for (i, entry) in entries.iter().enumerate() {
        let cy = ly + padding + (i as f64 + 0.5) * row_height;
        let sx = lx + padding;
        match entry.kind {
            LegendKind::Bar => canvas.rect(
                sx,
                cy - swatch_h / 2.0,
                swatch_w,
                swatch_h,
                &Style::outlined(entry.color, Color::BLACK, 0.4),
            ),
            LegendKind::Band => canvas.rect(
                sx,
                cy - swatch_h / 2.0,
                swatch_w,
                swatch_h,
                &Style::filled(entry.color.with_alpha(0.45)),
            ),
            LegendKind::Line(dash) => {
                let ls = LineStyle { color: entry.color, width: 1.5, dash };
                canvas.line(sx, cy, sx + swatch_w, cy, &ls);
            }
            LegendKind::Marker => {
                let mid = sx + swatch_w / 2.0;
                let bar = LineStyle::solid(entry.color, 1.0);
                canvas.error_bar(mid, cy - swatch_h / 2.0, cy + swatch_h / 2.0, 0.0, &bar);
                canvas.marker(mid, cy, &MarkerStyle { color: entry.color, ..Default::default() });
            }
        }
        canvas.text(sx + swatch_w + gap, cy, &entry.label, &text_style);
    }

    Some(PlotArea::manual(lx, ly, legend_w, legend_h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_sits_in_requested_corner() {
        let area = PlotArea::manual(50.0, 20.0, 300.0, 200.0);
        let entries = vec![
            LegendEntry::new("bkg-like", Color::BLACK, LegendKind::Line(Dash::Solid)),
            LegendEntry::new("data", Color::BLACK, LegendKind::Marker),
        ];
        let mut c = Canvas::new(400.0, 300.0).unwrap();
        let right = draw_legend(&mut c, &area, &entries, 10.0, LegendCorner::TopRight).unwrap();
        let left = draw_legend(&mut c, &area, &entries, 10.0, LegendCorner::TopLeft).unwrap();
        assert!((right.right() - (area.right() - 4.0)).abs() < 1e-9);
        assert_eq!(left.left, 54.0);
        assert_eq!(left.height, 10.0 + 2.0 * 13.0);
        let svg = c.finish_svg();
        assert_eq!(svg.matches("bkg-like").count(), 2);
    }

    #[test]
    fn empty_legend_draws_nothing() {
        let mut c = Canvas::new(10.0, 10.0).unwrap();
        let area = PlotArea::manual(0.0, 0.0, 10.0, 10.0);
        assert!(draw_legend(&mut c, &area, &[], 10.0, LegendCorner::TopLeft).is_none());
    }
}
