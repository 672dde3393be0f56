//! Empirical PDFs of LLR sample sets.
//!
//! Both sample sets of a hypothesis are binned on one common axis spanning the
//! union of their values, so the background-like and signal-plus-background-like
//! densities (and the observed statistic) can be compared bin by bin.

use cl_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of bin edges for LLR PDFs (29 bins).
pub const DEFAULT_N_EDGES: usize = 30;

/// `n_edges` equally spaced edges from the smallest to the largest value in either set.
///
/// The last edge is exactly the maximum. Fails with [`Error::Degenerate`] when every
/// sample has the same value.
pub fn llr_binning(b_like: &[f64], sb_like: &[f64], n_edges: usize) -> Result<Vec<f64>> {
    if n_edges < 2 {
        return Err(Error::Validation(format!("n_edges must be >= 2, got {n_edges}")));
    }
    if b_like.is_empty() && sb_like.is_empty() {
        return Err(Error::Validation("cannot bin empty LLR sample sets".to_string()));
    }
    let (lo, hi) = b_like
        .iter()
        .chain(sb_like)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(Error::Computation(format!("non-finite LLR sample range [{lo}, {hi}]")));
    }
    if hi <= lo {
        return Err(Error::Degenerate(format!(
            "all LLR samples equal {lo}; cannot build a binning with nonzero width"
        )));
    }

    let step = (hi - lo) / (n_edges - 1) as f64;
    let mut edges: Vec<f64> = (0..n_edges).map(|i| lo + step * i as f64).collect();
    edges[n_edges - 1] = hi;
    Ok(edges)
}

/// Histogram of a sample set normalised by the number of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalPdf {
    /// Bin edges.
    pub edges: Vec<f64>,
    /// Probability mass per bin.
    pub density: Vec<f64>,
}

impl EmpiricalPdf {
    /// Bin `samples` on `edges` and divide each count by `samples.len()`.
    ///
    /// Bins are `[e_i, e_{i+1})` except the last, which also includes its right edge.
    /// Samples outside the edges are dropped (they still count in the normalisation).
    pub fn from_samples(samples: &[f64], edges: &[f64]) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation(format!("need at least 2 edges, got {}", edges.len())));
        }
        if edges.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::Validation("PDF edges must be strictly increasing".to_string()));
        }
        if samples.is_empty() {
            return Err(Error::Validation("cannot build a PDF from zero samples".to_string()));
        }

        let n_bins = edges.len() - 1;
        let (first, last) = (edges[0], edges[n_bins]);
        let mut counts = vec![0usize; n_bins];
        for &x in samples {
            if !(x >= first && x <= last) {
                continue;
            }
            let bin = if x == last { n_bins - 1 } else { edges.partition_point(|&e| e <= x) - 1 };
            counts[bin] += 1;
        }

        let norm = samples.len() as f64;
        let density = counts.into_iter().map(|c| c as f64 / norm).collect();
        Ok(Self { edges: edges.to_vec(), density })
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.density.len()
    }

    /// Total mass (1 when no sample fell outside the edges).
    pub fn total(&self) -> f64 {
        self.density.iter().sum()
    }

    /// Running sum of the density: entry `i` is the mass of bins `0..=i`.
    pub fn cumulative(&self) -> Vec<f64> {
        self.density
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binning_spans_union() {
        let edges = llr_binning(&[1.0, 3.0], &[-2.0, 0.5], 4).unwrap();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], -2.0);
        assert_eq!(edges[3], 3.0);
        assert_relative_eq!(edges[1], -2.0 + 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_binning_last_edge_is_exact_max() {
        let b: Vec<f64> = (0..97).map(|i| 0.1 * i as f64).collect();
        let max = b.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let edges = llr_binning(&b, &[], DEFAULT_N_EDGES).unwrap();
        assert_eq!(edges.len(), DEFAULT_N_EDGES);
        assert_eq!(*edges.last().unwrap(), max);
    }

    #[test]
    fn test_binning_zero_spread_is_degenerate() {
        assert!(matches!(llr_binning(&[2.0, 2.0], &[2.0], 30), Err(Error::Degenerate(_))));
    }

    #[test]
    fn test_binning_rejects_too_few_edges() {
        assert!(matches!(llr_binning(&[0.0, 1.0], &[], 1), Err(Error::Validation(_))));
    }

    #[test]
    fn test_pdf_last_bin_closed() {
        let pdf = EmpiricalPdf::from_samples(&[0.0, 0.5, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(pdf.density, vec![0.5, 0.5]);
        assert_relative_eq!(pdf.total(), 1.0);
    }

    #[test]
    fn test_pdf_inner_edge_goes_right() {
        let pdf = EmpiricalPdf::from_samples(&[1.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(pdf.density, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_pdf_out_of_range_reduces_mass() {
        let pdf = EmpiricalPdf::from_samples(&[-1.0, 0.5, 0.5, 5.0], &[0.0, 1.0]).unwrap();
        assert_relative_eq!(pdf.total(), 0.5);
    }

    #[test]
    fn test_cumulative() {
        let pdf = EmpiricalPdf { edges: vec![0.0, 1.0, 2.0, 3.0], density: vec![0.25, 0.5, 0.25] };
        assert_eq!(pdf.cumulative(), vec![0.25, 0.75, 1.0]);
    }
}
