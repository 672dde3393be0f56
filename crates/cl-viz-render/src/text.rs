//! Text extents without font files.
//!
//! SVG text is laid out by the viewer, so we only need widths good enough to
//! size margins and legends. Widths are estimated from per-character advances
//! of a generic proportional sans-serif face, in units of the font size.

use crate::primitives::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

const ASCENT: f64 = 0.93;
const LINE_HEIGHT: f64 = 1.2;
const BOLD_WIDENING: f64 = 1.07;

fn advance(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.26,
        ' ' | 'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | '/' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.86,
        '\u{2070}'..='\u{209F}' | '\u{00B2}' | '\u{00B3}' | '\u{00B9}' => 0.36,
        c if c.is_ascii_uppercase() => 0.67,
        c if c.is_ascii_digit() => 0.56,
        c if c.is_ascii() => 0.52,
        // Greek, math symbols
        _ => 0.6,
    }
}

/// Estimated extents of `text` in points.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let em: f64 = text.chars().map(advance).sum();
    let widening = if style.weight == FontWeight::Bold { BOLD_WIDENING } else { 1.0 };
    TextMetrics {
        width: em * style.size * widening,
        height: style.size * LINE_HEIGHT,
        ascent: style.size * ASCENT,
    }
}
