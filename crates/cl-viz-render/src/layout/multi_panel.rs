use crate::layout::margins::PlotArea;

/// Panels of equal height stacked top to bottom, sharing left and right edges.
///
/// A zero `gap` gives the shared-x look of stacked yields; a positive gap
/// leaves room for a per-panel title and x axis.
#[derive(Debug, Clone)]
pub struct StackedLayout {
    pub panels: Vec<PlotArea>,
}

impl StackedLayout {
    pub fn new(left: f64, top: f64, width: f64, total_height: f64, n: usize, gap: f64) -> Self {
        if n == 0 {
            return Self { panels: Vec::new() };
        }
        let panel_h = ((total_height - gap * (n - 1) as f64) / n as f64).max(1.0);
        let panels = (0..n)
            .map(|i| PlotArea::manual(left, top + i as f64 * (panel_h + gap), width, panel_h))
            .collect();
        Self { panels }
    }

    /// Total height needed for `n` panels of `panel_h` separated by `gap`.
    pub fn height_for(n: usize, panel_h: f64, gap: f64) -> f64 {
        n as f64 * panel_h + n.saturating_sub(1) as f64 * gap
    }

    pub fn is_last(&self, i: usize) -> bool {
        i + 1 == self.panels.len()
    }
}
