use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() || !(s.len() == 6 || s.len() == 8) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        let a = if s.len() == 8 { byte(6)? as f64 / 255.0 } else { 1.0 };
        Some(Self { r: byte(0)?, g: byte(2)?, b: byte(4)?, a })
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn is_opaque(&self) -> bool {
        (self.a - 1.0).abs() < 1e-6
    }

    pub fn to_svg_fill(&self) -> String {
        if self.is_opaque() {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in `[0, 1]`, used to pick legible text on a fill.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }

    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg_fill())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s).ok_or_else(|| format!("invalid colour '{s}', expected #rrggbb or #rrggbbaa"))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_opaque() {
            serializer.serialize_str(&self.to_hex())
        } else {
            let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            serializer.collect_str(&format_args!("{}{a:02x}", self.to_hex()))
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// --- Palettes ---

/// Colours of the classic LEP Higgs figures: yellow background, red signal.
pub const LEP: &[Color] = &[
    Color::rgb(0xF5, 0xD7, 0x3B),
    Color::rgb(0xD6, 0x27, 0x28),
    Color::rgb(0x1F, 0x4E, 0xB4),
    Color::rgb(0x2C, 0xA0, 0x2C),
    Color::rgb(0x94, 0x67, 0xBD),
    Color::rgb(0x8C, 0x56, 0x4B),
];

pub const OKABE_ITO: &[Color] = &[
    Color::rgb(0xE6, 0x9F, 0x00),
    Color::rgb(0xD5, 0x5E, 0x00),
    Color::rgb(0x00, 0x72, 0xB2),
    Color::rgb(0x00, 0x9E, 0x73),
    Color::rgb(0xCC, 0x79, 0xA7),
    Color::rgb(0x56, 0xB4, 0xE9),
    Color::rgb(0xF0, 0xE4, 0x42),
];

pub const TABLEAU10: &[Color] = &[
    Color::rgb(0x4E, 0x79, 0xA7),
    Color::rgb(0xF2, 0x8E, 0x2B),
    Color::rgb(0xE1, 0x57, 0x59),
    Color::rgb(0x76, 0xB7, 0xB2),
    Color::rgb(0x59, 0xA1, 0x4F),
    Color::rgb(0xED, 0xC9, 0x48),
    Color::rgb(0xB0, 0x7A, 0xA1),
    Color::rgb(0xFF, 0x9D, 0xA7),
    Color::rgb(0x9C, 0x75, 0x5F),
    Color::rgb(0xBA, 0xB0, 0xAB),
];

pub fn palette_colors(name: &str) -> &'static [Color] {
    match name {
        "okabe_ito" => OKABE_ITO,
        "tableau10" => TABLEAU10,
        _ => LEP,
    }
}

// --- Sequential colormaps for heat maps ---

const VIRIDIS_STOPS: &[Color] = &[
    Color::rgb(0x44, 0x01, 0x54),
    Color::rgb(0x3B, 0x52, 0x8B),
    Color::rgb(0x21, 0x90, 0x8C),
    Color::rgb(0x5D, 0xC8, 0x63),
    Color::rgb(0xFD, 0xE7, 0x25),
];

const GREYS_STOPS: &[Color] = &[Color::WHITE, Color::rgb(0x25, 0x25, 0x25)];

const YELLOW_RED_STOPS: &[Color] = &[
    Color::rgb(0xFF, 0xFF, 0xCC),
    Color::rgb(0xFE, 0xB2, 0x4C),
    Color::rgb(0xF0, 0x3B, 0x20),
    Color::rgb(0x80, 0x00, 0x26),
];

fn piecewise(stops: &[Color], t: f64) -> Color {
    let Some(&first) = stops.first() else {
        return Color::BLACK;
    };
    if stops.len() == 1 || !t.is_finite() {
        return first;
    }
    let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    Color::lerp(stops[i], stops[i + 1], pos - i as f64)
}

/// Colour at fraction `t` in `[0, 1]` of a named sequential map (default viridis).
pub fn colormap(name: &str, t: f64) -> Color {
    match name {
        "greys" => piecewise(GREYS_STOPS, t),
        "ylorrd" => piecewise(YELLOW_RED_STOPS, t),
        _ => piecewise(VIRIDIS_STOPS, t),
    }
}
