use std::fmt::Write as FmtWrite;

use crate::color::Color;
use crate::primitives::*;
use crate::text::{TextMetrics, measure_text};

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

#[derive(Debug, Clone)]
enum SvgElement {
    Rect { x: f64, y: f64, w: f64, h: f64, style: Style },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle },
    Polyline { points: Vec<(f64, f64)>, style: LineStyle },
    Polygon { points: Vec<(f64, f64)>, style: Style },
    Text { x: f64, y: f64, content: String, style: TextStyle, rotate: Option<f64> },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
    Group { clip_id: String, children: Vec<SvgElement> },
}

/// Immediate-mode SVG canvas. Coordinates in points, origin top-left.
///
/// Everything drawn between [`Canvas::push_clip`] and [`Canvas::pop_clip`] is
/// emitted inside one `<g clip-path=...>` group.
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    open_clips: Vec<(String, Vec<SvgElement>)>,
    next_clip_id: usize,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> crate::Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(crate::RenderError::Layout(format!(
                "canvas size must be positive, got {width} x {height}"
            )));
        }
        Ok(Self {
            width,
            height,
            elements: Vec::new(),
            defs: Vec::new(),
            open_clips: Vec::new(),
            next_clip_id: 0,
        })
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        // Normalise so that negative extents (inverted axes) still render.
        let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
        let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        if points.len() < 3 {
            return;
        }
        self.push(SvgElement::Polygon { points: points.to_vec(), style: style.clone() });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Vertical error bar with optional caps.
    pub fn error_bar(&mut self, x: f64, y_lo: f64, y_hi: f64, cap_width: f64, style: &LineStyle) {
        self.line(x, y_lo, x, y_hi, style);
        if cap_width > 0.0 {
            let half = cap_width / 2.0;
            self.line(x - half, y_lo, x + half, y_lo, style);
            self.line(x - half, y_hi, x + half, y_hi, style);
        }
    }

    /// Horizontal error bar (bin width of a data point).
    pub fn error_bar_h(&mut self, x_lo: f64, x_hi: f64, y: f64, style: &LineStyle) {
        self.line(x_lo, y, x_hi, y, style);
    }

    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let style = if marker.filled {
            Style::outlined(marker.color, marker.color, 0.5)
        } else {
            Style::outlined(Color::WHITE, marker.color, 1.0)
        };
        self.circle(x, y, marker.radius, &style);
    }

    // --- Clip paths ---

    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.open_clips.push((id.clone(), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if let Some((clip_id, children)) = self.open_clips.pop() {
            self.push(SvgElement::Group { clip_id, children });
        }
    }

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        measure_text(content, style)
    }

    fn push(&mut self, elem: SvgElement) {
        match self.open_clips.last_mut() {
            Some((_, children)) => children.push(elem),
            None => self.elements.push(elem),
        }
    }

    /// Serialise the canvas. Clip groups still open are closed first.
    pub fn finish_svg(mut self) -> String {
        while !self.open_clips.is_empty() {
            self.pop_clip();
        }

        let mut out = String::with_capacity(32 * 1024);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }
        let _ = writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height);
        for elem in &self.elements {
            render_element(&mut out, elem);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn write_points(out: &mut String, points: &[(f64, f64)]) {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x:.2},{y:.2}");
    }
}

fn write_escaped(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn render_element(out: &mut String, elem: &SvgElement) {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            let _ = write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            let _ = write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polyline { points, style } => {
            out.push_str(r#"<polyline points=""#);
            write_points(out, points);
            out.push_str(r#"" fill="none""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polygon { points, style } => {
            out.push_str(r#"<polygon points=""#);
            write_points(out, points);
            out.push('"');
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            let _ = write!(
                out,
                r#"<text x="{x:.2}" y="{y:.2}" font-family="{FONT_FAMILY}" font-size="{:.1}" fill="{}" text-anchor="{}" dominant-baseline="{}""#,
                style.size,
                style.color.to_svg_fill(),
                style.anchor.as_str(),
                style.baseline.as_str(),
            );
            if style.weight == FontWeight::Bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if style.style == FontStyle::Italic {
                out.push_str(r#" font-style="italic""#);
            }
            if let Some(angle) = rotate {
                let _ = write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#);
            }
            out.push('>');
            write_escaped(out, content);
            out.push_str("</text>\n");
        }
        SvgElement::Circle { cx, cy, r, style } => {
            let _ = write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Group { clip_id, children } => {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(out, child);
            }
            out.push_str("</g>\n");
        }
    }
}

fn write_style_attrs(out: &mut String, style: &Style) {
    match &style.fill {
        Some(fill) => {
            let _ = write!(out, r#" fill="{}""#, fill.to_svg_fill());
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(
            out,
            r#" stroke="{}" stroke-width="{:.2}""#,
            stroke.to_svg_fill(),
            style.stroke_width
        );
    }
    if (style.opacity - 1.0).abs() > 1e-4 {
        let _ = write!(out, r#" opacity="{:.3}""#, style.opacity);
    }
}

fn write_line_attrs(out: &mut String, style: &LineStyle) {
    let _ = write!(out, r#" stroke="{}" stroke-width="{:.2}""#, style.color.to_svg_fill(), style.width);
    if let Some(dash) = style.dash.dasharray() {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
}
