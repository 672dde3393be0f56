//! Median and ±1σ/±2σ bands of a normalised PDF.
//!
//! Each value is the left edge of a bin found on the cumulative mass `C[i]` (mass of
//! bins `0..=i`):
//!
//! | target | rule                          |
//! |--------|-------------------------------|
//! | 0.023  | last `i` with `C[i] <= 0.023` |
//! | 0.16   | last `i` with `C[i] <= 0.16`  |
//! | 0.5    | last `i` with `C[i] <= 0.5`   |
//! | 0.84   | last `i` with `C[i] < 0.84`   |
//! | 0.977  | last `i` with `C[i] < 0.977`  |
//!
//! The lower targets compare inclusively and the upper ones strictly. The result
//! is `edges[i]`. A target that no bin satisfies is [`Error::Degenerate`].

use cl_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::pdf::EmpiricalPdf;

/// Cumulative mass for the lower 2σ edge.
pub const TWO_SIGMA_LOW: f64 = 0.023;
/// Cumulative mass for the lower 1σ edge.
pub const ONE_SIGMA_LOW: f64 = 0.16;
/// Cumulative mass for the median.
pub const MEDIAN: f64 = 0.5;
/// Cumulative mass for the upper 1σ edge.
pub const ONE_SIGMA_HIGH: f64 = 0.84;
/// Cumulative mass for the upper 2σ edge.
pub const TWO_SIGMA_HIGH: f64 = 0.977;

/// Median with central 68% and 95% brackets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileSummary {
    /// Median.
    pub median: f64,
    /// `(low, high)` at 16% / 84%.
    pub one_sigma: (f64, f64),
    /// `(low, high)` at 2.3% / 97.7%.
    pub two_sigma: (f64, f64),
}

impl QuantileSummary {
    /// `[median, [1σ low, 1σ high], [2σ low, 2σ high]]`.
    pub fn as_nested(&self) -> (f64, [f64; 2], [f64; 2]) {
        (
            self.median,
            [self.one_sigma.0, self.one_sigma.1],
            [self.two_sigma.0, self.two_sigma.1],
        )
    }

    /// `2σ low <= 1σ low <= median <= 1σ high <= 2σ high`.
    pub fn is_ordered(&self) -> bool {
        self.two_sigma.0 <= self.one_sigma.0
            && self.one_sigma.0 <= self.median
            && self.median <= self.one_sigma.1
            && self.one_sigma.1 <= self.two_sigma.1
    }
}

#[derive(Clone, Copy)]
enum Rule {
    AtMost,
    Below,
}

fn edge_for(cumulative: &[f64], edges: &[f64], target: f64, rule: Rule) -> Result<f64> {
    let hit = |c: f64| match rule {
        Rule::AtMost => c <= target,
        Rule::Below => c < target,
    };
    let i = cumulative.iter().rposition(|&c| hit(c)).ok_or_else(|| {
        let op = match rule {
            Rule::AtMost => "<=",
            Rule::Below => "<",
        };
        Error::Degenerate(format!(
            "no bin satisfies the condition cumulative {op} {target} (first bin already holds {})",
            cumulative.first().copied().unwrap_or(f64::NAN)
        ))
    })?;
    Ok(edges[i])
}

/// Quantile summary of a normalised PDF given as bin masses and edges.
pub fn quantiles(density: &[f64], edges: &[f64]) -> Result<QuantileSummary> {
    if density.is_empty() {
        return Err(Error::Validation("cannot take quantiles of an empty PDF".to_string()));
    }
    if edges.len() != density.len() + 1 {
        return Err(Error::Validation(format!(
            "PDF has {} bins but {} edges",
            density.len(),
            edges.len()
        )));
    }

    let cumulative: Vec<f64> = density
        .iter()
        .scan(0.0, |acc, &p| {
            *acc += p;
            Some(*acc)
        })
        .collect();

    Ok(QuantileSummary {
        median: edge_for(&cumulative, edges, MEDIAN, Rule::AtMost)?,
        one_sigma: (
            edge_for(&cumulative, edges, ONE_SIGMA_LOW, Rule::AtMost)?,
            edge_for(&cumulative, edges, ONE_SIGMA_HIGH, Rule::Below)?,
        ),
        two_sigma: (
            edge_for(&cumulative, edges, TWO_SIGMA_LOW, Rule::AtMost)?,
            edge_for(&cumulative, edges, TWO_SIGMA_HIGH, Rule::Below)?,
        ),
    })
}

impl EmpiricalPdf {
    /// Quantile summary of this PDF.
    pub fn quantiles(&self) -> Result<QuantileSummary> {
        quantiles(&self.density, &self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(n: usize) -> Vec<f64> {
        (0..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_delta_pdf_gives_single_edge() {
        let mut density = vec![0.0; 6];
        density[3] = 1.0;
        let q = quantiles(&density, &edges(6)).unwrap();
        assert_eq!(q.median, 2.0);
        assert_eq!(q.one_sigma, (2.0, 2.0));
        assert_eq!(q.two_sigma, (2.0, 2.0));
    }

    #[test]
    fn test_delta_in_first_bin_is_degenerate() {
        let density = vec![1.0, 0.0, 0.0];
        let err = quantiles(&density, &edges(3)).unwrap_err();
        assert!(matches!(err, Error::Degenerate(ref m) if m.contains("no bin satisfies")));
    }

    #[test]
    fn test_dyadic_pdf() {
        // Masses in 64ths so the running sum is exact:
        // C = 1, 9, 25, 41, 49, 57, 63, 64 (/64).
        let density: Vec<f64> = [1.0, 8.0, 16.0, 16.0, 8.0, 8.0, 6.0, 1.0]
            .iter()
            .map(|m| m / 64.0)
            .collect();
        let q = quantiles(&density, &edges(8)).unwrap();
        assert_eq!(q.two_sigma.0, 0.0);
        assert_eq!(q.one_sigma.0, 1.0);
        assert_eq!(q.median, 2.0);
        assert_eq!(q.one_sigma.1, 4.0);
        assert_eq!(q.two_sigma.1, 5.0);
        assert!(q.is_ordered());
    }

    #[test]
    fn test_boundary_rule_is_asymmetric() {
        // Lower targets include a bin whose cumulative mass equals the target, upper
        // targets exclude it. Suspicious, but this is the established behaviour.
        let density = [1.0 / 64.0, 31.0 / 64.0, 0.25, 0.25];
        let e = edges(4);
        let q = quantiles(&density, &e).unwrap();
        assert_eq!(q.median, 1.0);

        let cumulative = [1.0 / 64.0, 0.5, 0.75, 1.0];
        assert_eq!(edge_for(&cumulative, &e, 0.5, Rule::AtMost).unwrap(), 1.0);
        assert_eq!(edge_for(&cumulative, &e, 0.5, Rule::Below).unwrap(), 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(quantiles(&[], &[0.0]), Err(Error::Validation(_))));
        assert!(matches!(quantiles(&[1.0], &[0.0]), Err(Error::Validation(_))));
    }

    #[test]
    fn test_nested_form() {
        let q = QuantileSummary { median: 1.0, one_sigma: (0.5, 1.5), two_sigma: (0.0, 2.0) };
        assert_eq!(q.as_nested(), (1.0, [0.5, 1.5], [0.0, 2.0]));
    }
}
