use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;
use crate::text::measure_text;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// The canvas minus `margins`, never smaller than 50pt per side.
    pub fn inside(canvas_w: f64, canvas_h: f64, margins: &Margins) -> Self {
        Self {
            left: margins.left,
            top: margins.top,
            width: (canvas_w - margins.left - margins.right).max(50.0),
            height: (canvas_h - margins.top - margins.bottom).max(50.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Widest tick label of `axis` at the configured tick size.
pub fn max_tick_label_width(axis: &Axis, config: &VizConfig) -> f64 {
    let style = TextStyle::sized(config.font.tick_size);
    axis.tick_labels.iter().map(|l| measure_text(l, &style).width).fold(0.0_f64, f64::max)
}

impl Margins {
    /// Room for the y tick labels of every panel in `y_axes` (they share the
    /// left edge), an x axis with tick labels and title, and the header.
    pub fn for_axes<'a>(
        y_axes: impl IntoIterator<Item = &'a Axis>,
        x_axis: Option<&Axis>,
        config: &VizConfig,
    ) -> Self {
        let tick_gap = if config.axes.ticks_inward() { 6.0 } else { config.axes.tick_length + 6.0 };

        let mut widest = 0.0_f64;
        let mut labelled = false;
        for y in y_axes {
            widest = widest.max(max_tick_label_width(y, config));
            labelled |= !y.label.is_empty();
        }
        let mut left = 12.0 + widest + tick_gap;
        if labelled {
            left += config.font.label_size + 6.0;
        }

        let mut bottom = 12.0;
        if let Some(x) = x_axis {
            bottom += config.font.tick_size + tick_gap;
            if !x.label.is_empty() {
                bottom += config.font.label_size + 6.0;
            }
        }

        Self { left, right: 15.0, top: config.header_height(), bottom }
    }
}
