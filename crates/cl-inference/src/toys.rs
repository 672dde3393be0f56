//! Poisson toy-count generation.
//!
//! Each bin is fluctuated independently around its expectation. Randomness is
//! deterministic via per-experiment seeding (`seed + experiment_idx`), independent
//! of threading.

use cl_core::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

/// Seed for pseudo-experiment `idx` of a generation started from `seed`.
#[inline]
pub fn experiment_seed(seed: u64, idx: usize) -> u64 {
    seed.wrapping_add(idx as u64)
}

/// RNG for pseudo-experiment `idx`.
pub fn experiment_rng(seed: u64, idx: usize) -> rand::rngs::StdRng {
    rand::rngs::StdRng::seed_from_u64(experiment_seed(seed, idx))
}

/// Draw one Poisson count per bin from `expected`, continuing the given stream.
///
/// A mean of exactly zero draws zero.
pub fn poisson_counts<R: Rng + ?Sized>(expected: &[f64], rng: &mut R) -> Result<Vec<f64>> {
    expected
        .iter()
        .map(|&lam| {
            if lam == 0.0 {
                return Ok(0.0);
            }
            let pois = Poisson::new(lam).map_err(|e| {
                Error::Computation(format!("cannot sample Poisson with mean {lam}: {e}"))
            })?;
            Ok(pois.sample(rng))
        })
        .collect()
}

/// Sample one Poisson-fluctuated dataset from a vector of expectations.
pub fn poisson_from_expected(expected: &[f64], seed: u64) -> Result<Vec<f64>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    poisson_counts(expected, &mut rng)
}

/// Bin-wise `b + s`.
pub fn signal_plus_background(background: &[f64], signal: &[f64]) -> Vec<f64> {
    background.iter().zip(signal).map(|(b, s)| b + s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poisson_reproducible() {
        let expected = [0.5, 3.0, 10.0, 0.0];
        let a = poisson_from_expected(&expected, 123).unwrap();
        let b = poisson_from_expected(&expected, 123).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[3], 0.0);
        assert!(a.iter().all(|&n| n >= 0.0 && n.fract() == 0.0));
    }

    #[test]
    fn test_poisson_mean_is_close() {
        let expected = vec![4.0; 20_000];
        let draws = poisson_from_expected(&expected, 7).unwrap();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 4.0).abs() < 0.1, "mean={mean}");
    }

    #[test]
    fn test_experiment_seeds_differ() {
        assert_ne!(experiment_seed(10, 0), experiment_seed(10, 1));
        assert_eq!(experiment_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn test_signal_plus_background() {
        assert_eq!(signal_plus_background(&[1.0, 0.0], &[0.5, 2.0]), vec![1.5, 2.0]);
    }
}
