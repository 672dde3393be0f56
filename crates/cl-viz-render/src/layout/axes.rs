/// Linear axis: limits, "nice number" ticks and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

const MINOR_PER_MAJOR: i64 = 5;

impl Axis {
    /// Limits widened outward to whole tick steps.
    pub fn nice(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = ordered(data_min, data_max);
        let step = nice_step((hi - lo) / (target_ticks.max(2) - 1) as f64);
        Self::with_ticks((lo / step).floor() * step, (hi / step).ceil() * step, step)
    }

    /// Limits kept exactly, ticks placed at nice values inside them.
    ///
    /// Used where the frame must coincide with bin edges.
    pub fn exact(min: f64, max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = ordered(min, max);
        let step = nice_step((hi - lo) / (target_ticks.max(2) - 1) as f64);
        Self::with_ticks(lo, hi, step)
    }

    fn with_ticks(min: f64, max: f64, step: f64) -> Self {
        let first = (min / step - 1e-9).ceil() as i64;
        let last = (max / step + 1e-9).floor() as i64;
        let tick_positions: Vec<f64> = (first..=last).map(|k| k as f64 * step).collect();
        let tick_labels = tick_positions.iter().map(|&v| format_tick(v, step)).collect();

        let minor_step = step / MINOR_PER_MAJOR as f64;
        let minor_ticks = ((min / minor_step - 1e-9).ceil() as i64..=(max / minor_step + 1e-9).floor() as i64)
            .filter(|k| k % MINOR_PER_MAJOR != 0)
            .map(|k| k as f64 * minor_step)
            .collect();

        Self { min, max, label: String::new(), tick_positions, tick_labels, minor_ticks }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Blank the label of the topmost tick (stacked panels without gaps).
    pub fn without_top_label(mut self) -> Self {
        if let (Some(&top), Some(label)) = (self.tick_positions.last(), self.tick_labels.last_mut())
            && (top - self.max).abs() <= (self.max - self.min) * 1e-6
        {
            label.clear();
        }
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Map a data value onto `[px_min, px_max]` (pass them reversed for y).
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }

    /// `data_to_pixel` with the result clamped to the pixel range.
    pub fn data_to_pixel_clamped(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let (lo, hi) = ordered(px_min, px_max);
        self.data_to_pixel(value, px_min, px_max).clamp(lo, hi)
    }
}

/// Sorted limits with a non-zero span.
fn ordered(a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if (hi - lo).abs() < 1e-12 {
        let pad = if lo.abs() > 1e-12 { lo.abs() * 0.5 } else { 1.0 };
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    }
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough.abs() / 10.0_f64.powf(exp);
    let nice_frac = match frac {
        f if f <= 1.5 => 1.0,
        f if f <= 3.5 => 2.0,
        f if f <= 7.5 => 5.0,
        _ => 10.0,
    };
    nice_frac * 10.0_f64.powf(exp)
}

/// Tick label with as many decimals as the step needs and a typographic minus.
fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    let s = format!("{:.prec$}", value, prec = decimals);
    match s.strip_prefix('-') {
        Some(rest) => format!("\u{2212}{rest}"),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_widens_to_steps() {
        let ax = Axis::nice(0.3, 9.6, 6);
        assert_eq!(ax.min, 0.0);
        assert_eq!(ax.max, 10.0);
        assert_eq!(ax.tick_labels, vec!["0", "2", "4", "6", "8", "10"]);
        assert_eq!(ax.minor_ticks.len(), 5 * 4);
    }

    #[test]
    fn exact_keeps_limits() {
        let ax = Axis::exact(-3.7, 12.2, 6);
        assert_eq!(ax.min, -3.7);
        assert_eq!(ax.max, 12.2);
        assert_eq!(ax.tick_positions.first().copied(), Some(-2.0));
        assert_eq!(ax.tick_positions.last().copied(), Some(12.0));
        assert_eq!(ax.tick_labels[0], "\u{2212}2");
        assert!(ax.tick_positions.iter().all(|&t| ax.contains(t)));
    }

    #[test]
    fn degenerate_range_is_padded() {
        let ax = Axis::nice(5.0, 5.0, 5);
        assert!(ax.min < 5.0 && ax.max > 5.0);
        let ax = Axis::exact(0.0, 0.0, 5);
        assert_eq!((ax.min, ax.max), (-1.0, 1.0));
    }

    #[test]
    fn data_to_pixel_linear_and_inverted() {
        let ax = Axis::nice(0.0, 100.0, 5);
        assert!((ax.data_to_pixel(50.0, 0.0, 500.0) - 250.0).abs() < 1e-9);
        assert!((ax.data_to_pixel(25.0, 400.0, 0.0) - 300.0).abs() < 1e-9);
        assert_eq!(ax.data_to_pixel_clamped(250.0, 400.0, 0.0), 0.0);
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
        assert!((nice_step(0.012) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(0.1 + 0.2, 0.1), "0.3");
        assert_eq!(format_tick(-1e-17, 0.05), "0.00");
        assert_eq!(format_tick(-20.0, 10.0), "\u{2212}20");
    }

    #[test]
    fn top_label_blanked() {
        let ax = Axis::nice(0.0, 10.0, 6).without_top_label();
        assert_eq!(ax.tick_labels.last().map(String::as_str), Some(""));
        assert_eq!(ax.tick_labels[0], "0");
    }
}
