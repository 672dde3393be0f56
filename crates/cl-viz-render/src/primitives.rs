use crate::color::Color;

/// Fill and outline of closed shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: None, stroke: None, stroke_width: 1.0, opacity: 1.0 }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self { fill: Some(color), ..Default::default() }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self { stroke: Some(color), stroke_width: width, ..Default::default() }
    }

    /// Filled shape with a thin outline, as used for histogram bars.
    pub fn outlined(fill: Color, stroke: Color, width: f64) -> Self {
        Self { fill: Some(fill), stroke: Some(stroke), stroke_width: width, opacity: 1.0 }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dash {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl Dash {
    /// `stroke-dasharray` value, `None` for solid lines.
    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            Dash::Solid => None,
            Dash::Dashed => Some("6 3"),
            Dash::Dotted => Some("1.5 2"),
            Dash::DashDot => Some("6 2 1.5 2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Dash,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Color::BLACK, width: 1.0, dash: Dash::Solid }
    }
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: Dash::Solid }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self { color, width, dash: Dash::Dashed }
    }

    pub fn dotted(color: Color, width: f64) -> Self {
        Self { color, width, dash: Dash::Dotted }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color::BLACK,
            weight: FontWeight::Regular,
            style: FontStyle::Normal,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

impl TextStyle {
    pub fn sized(size: f64) -> Self {
        Self { size, ..Default::default() }
    }

    pub fn anchored(mut self, anchor: TextAnchor, baseline: TextBaseline) -> Self {
        self.anchor = anchor;
        self.baseline = baseline;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Central,
    Hanging,
}

impl TextBaseline {
    pub fn as_str(self) -> &'static str {
        match self {
            TextBaseline::Alphabetic => "auto",
            TextBaseline::Central => "central",
            TextBaseline::Hanging => "hanging",
        }
    }
}

/// Round data marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub color: Color,
    pub filled: bool,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self { radius: 2.8, color: Color::BLACK, filled: true }
    }
}
