//! One-sided confidence levels of an observed LLR.
//!
//! With `pos` the last edge index at or below the observed value:
//! - `1 - CLb` = background-like mass in bins `[0, pos)`
//! - `CLs+b`   = signal-plus-background-like mass in bins `[pos, n)`
//!
//! An observed value below every edge is placed at `pos = 0` with a warning.

use cl_core::{Error, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::pdf::EmpiricalPdf;

const CLB_MIN: f64 = 1e-300;

/// `CLb` is kept this far from 0 and 1 before inverting the normal CDF.
const CLB_EPS: f64 = f64::EPSILON;

#[inline]
fn safe_cls(clsb: f64, clb: f64) -> f64 {
    if !(clsb.is_finite() && clb.is_finite()) {
        return 0.0;
    }
    if clb <= CLB_MIN {
        return if clsb <= CLB_MIN { 0.0 } else { 1.0 };
    }
    (clsb / clb).clamp(0.0, 1.0)
}

/// Confidence levels of one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceLevels {
    /// Observed `-2 ln Q`.
    pub observed: f64,
    /// Edge index the observed value was placed at.
    pub position: usize,
    /// True if the observed value lay left of every edge.
    pub out_of_range: bool,
    /// `1 - CLb`: background-like mass below the observed value.
    pub one_minus_clb: f64,
    /// `CLs+b`: signal-plus-background-like mass at or above the observed value.
    pub clsb: f64,
    /// `CLb`.
    pub clb: f64,
    /// `CLs = CLs+b / CLb`, guarded for vanishing `CLb`.
    pub cls: f64,
    /// One-sided Gaussian significance of the background-only p-value, `Φ⁻¹(CLb)`.
    /// Finite: `CLb` is clamped away from 0 and 1 first.
    pub significance: f64,
}

impl ConfidenceLevels {
    /// `[1 - CLb, CLs+b]`.
    pub fn pair(&self) -> [f64; 2] {
        [self.one_minus_clb, self.clsb]
    }
}

/// Locate `observed` on `edges` and integrate both PDF tails.
///
/// `label` names the hypothesis in the out-of-range warning.
pub fn confidence_levels(
    label: &str,
    observed: f64,
    edges: &[f64],
    b_density: &[f64],
    sb_density: &[f64],
) -> Result<ConfidenceLevels> {
    if edges.len() < 2 {
        return Err(Error::Validation(format!("need at least 2 edges, got {}", edges.len())));
    }
    let n_bins = edges.len() - 1;
    if b_density.len() != n_bins || sb_density.len() != n_bins {
        return Err(Error::Validation(format!(
            "PDFs have {} and {} bins, edges imply {n_bins}",
            b_density.len(),
            sb_density.len()
        )));
    }
    if !observed.is_finite() {
        return Err(Error::Validation(format!("{label}: observed LLR is not finite ({observed})")));
    }

    let (position, out_of_range) = match edges.iter().rposition(|&e| e <= observed) {
        Some(pos) => (pos, false),
        None => {
            log::warn!(
                "{label}: observed -2lnQ = {observed} is below the generated range (first edge {}); \
                 using position 0",
                edges[0]
            );
            (0, true)
        }
    };
    if observed > edges[n_bins] {
        log::debug!("{label}: observed -2lnQ = {observed} is above the generated range");
    }

    let one_minus_clb = b_density[..position].iter().fold(0.0, |acc, p| acc + p);
    let clsb = sb_density[position..].iter().fold(0.0, |acc, p| acc + p);
    let clb = 1.0 - one_minus_clb;

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| Error::Computation(format!("standard normal: {e}")))?;
    let significance = normal.inverse_cdf(clb.clamp(CLB_EPS, 1.0 - CLB_EPS));

    Ok(ConfidenceLevels {
        observed,
        position,
        out_of_range,
        one_minus_clb,
        clsb,
        clb,
        cls: safe_cls(clsb, clb),
        significance,
    })
}

impl EmpiricalPdf {
    /// Confidence levels of `observed`, with `self` as the background-like PDF.
    pub fn confidence_levels(
        &self,
        sb_like: &EmpiricalPdf,
        label: &str,
        observed: f64,
    ) -> Result<ConfidenceLevels> {
        if sb_like.edges != self.edges {
            return Err(Error::Validation(
                "background-like and signal+background-like PDFs use different edges".to_string(),
            ));
        }
        confidence_levels(label, observed, &self.edges, &self.density, &sb_like.density)
    }
}
