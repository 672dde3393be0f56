//! Observed LLR: the same fold as the generator, applied to real counts.

use cl_core::{Binned, Error, Result};
use serde::{Deserialize, Serialize};

use crate::contribution::{IgnoredCountBin, ensure_same_layout, ensure_yields, fold_llr};

/// `-2 ln Q` of an observed dataset, with its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedLlr {
    /// `-2 ln Q`.
    pub value: f64,
    /// Bins with neither background nor signal.
    pub n_empty_bins: usize,
    /// Zero-background bins whose observed count is not reflected in `value`.
    pub ignored_counts: Vec<IgnoredCountBin>,
}

/// Observed `-2 ln Q` for one hypothesis.
///
/// `data` holds the observed counts; all three histograms must share a layout.
pub fn observed_llr<H: Binned + ?Sized>(background: &H, signal: &H, data: &H) -> Result<ObservedLlr> {
    ensure_yields("background", background)?;
    ensure_yields("signal", signal)?;
    ensure_yields("data", data)?;
    ensure_same_layout("signal", background, signal)?;
    ensure_same_layout("data", background, data)?;

    let fold = fold_llr(background.layout(), background.contents(), signal.contents(), data.contents());
    for ign in &fold.ignored {
        log::warn!(
            "{} has {} signal and {} observed events but no background; \
             the observed events are not reflected in -2lnQ",
            ign.bin,
            ign.signal,
            ign.count
        );
    }

    Ok(ObservedLlr { value: fold.value, n_empty_bins: fold.n_empty, ignored_counts: fold.ignored })
}

/// Observed `-2 ln Q` for each signal hypothesis against one shared background and dataset.
///
/// One result per signal, in order; a bad signal does not affect the others.
pub fn observed_llrs_shared_background<H: Binned>(
    background: &H,
    signals: &[H],
    data: &H,
) -> Vec<Result<ObservedLlr>> {
    signals.iter().map(|signal| observed_llr(background, signal, data)).collect()
}

/// Observed `-2 ln Q` with a separate background and dataset for every hypothesis.
///
/// Fails as a whole only when the three slices differ in length.
pub fn observed_llrs_per_hypothesis<H: Binned>(
    backgrounds: &[H],
    signals: &[H],
    data: &[H],
) -> Result<Vec<Result<ObservedLlr>>> {
    if backgrounds.len() != signals.len() || data.len() != signals.len() {
        return Err(Error::Validation(format!(
            "per-hypothesis inputs differ in length: {} backgrounds, {} signals, {} datasets",
            backgrounds.len(),
            signals.len(),
            data.len()
        )));
    }
    Ok(backgrounds
        .iter()
        .zip(signals)
        .zip(data)
        .map(|((b, s), d)| observed_llr(b, s, d))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cl_core::{BinIndex, Histogram1D, Histogram2D};

    fn hist(contents: &[f64]) -> Histogram1D {
        Histogram1D::with_unit_bins(contents.to_vec()).unwrap()
    }

    #[test]
    fn test_closed_form() {
        let b = hist(&[10.0, 0.0, 5.0]);
        let s = hist(&[2.0, 3.0, 1.0]);
        let obs = observed_llr(&b, &s, &b).unwrap();
        let expected = (2.0 * 2.0 - 2.0 * 10.0 * (1.0_f64 + 2.0 / 10.0).ln())
            + 6.0
            + (2.0 * 1.0 - 2.0 * 5.0 * (1.0_f64 + 1.0 / 5.0).ln());
        assert_relative_eq!(obs.value, expected, epsilon = 1e-12);
        assert_eq!(obs.n_empty_bins, 0);
        assert!(obs.ignored_counts.is_empty());
    }

    #[test]
    fn test_zero_background_with_data_is_flagged() {
        let b = hist(&[4.0, 0.0]);
        let s = hist(&[1.0, 2.0]);
        let d = hist(&[4.0, 3.0]);
        let obs = observed_llr(&b, &s, &d).unwrap();
        assert_eq!(obs.ignored_counts.len(), 1);
        assert_eq!(obs.ignored_counts[0].bin, BinIndex::OneD(1));
        assert_eq!(obs.ignored_counts[0].count, 3.0);
        // Bin 1 still contributes exactly 2 * s.
        let bin0 = 2.0 - 8.0 * 1.25_f64.ln();
        assert_relative_eq!(obs.value, bin0 + 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_signal_is_label_independent() {
        let b = hist(&[3.0, 7.0, 0.0]);
        let zero = hist(&[0.0, 0.0, 0.0]);
        let d = hist(&[5.0, 2.0, 1.0]);
        let results = observed_llrs_shared_background(&b, &[zero.clone(), zero], &d);
        let a = results[0].as_ref().unwrap();
        let c = results[1].as_ref().unwrap();
        assert_eq!(a.value, 0.0);
        assert_eq!(a, c);
        assert_eq!(a.n_empty_bins, 1);
    }

    #[test]
    fn test_shared_background_isolates_failures() {
        let b = hist(&[3.0, 7.0]);
        let d = hist(&[3.0, 7.0]);
        let good = hist(&[1.0, 1.0]);
        let bad = hist(&[1.0, 1.0, 1.0]);
        let results = observed_llrs_shared_background(&b, &[good.clone(), bad, good], &d);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Validation(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_per_hypothesis_requires_equal_lengths() {
        let h = hist(&[1.0]);
        let err = observed_llrs_per_hypothesis(&[h.clone()], &[h.clone(), h.clone()], &[h]);
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn test_per_hypothesis_uses_own_background() {
        let bs = [hist(&[10.0]), hist(&[20.0])];
        let ss = [hist(&[2.0]), hist(&[2.0])];
        let ds = [hist(&[10.0]), hist(&[20.0])];
        let out = observed_llrs_per_hypothesis(&bs, &ss, &ds).unwrap();
        let v0 = out[0].as_ref().unwrap().value;
        let v1 = out[1].as_ref().unwrap().value;
        assert_relative_eq!(v0, 4.0 - 20.0 * 1.2_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(v1, 4.0 - 40.0 * 1.1_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_two_d_equals_flattened() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0, 2.0];
        let b = Histogram2D::new(x.clone(), y.clone(), vec![vec![10.0, 0.0], vec![5.0, 0.0]]).unwrap();
        let s = Histogram2D::new(x.clone(), y.clone(), vec![vec![2.0, 3.0], vec![1.0, 0.0]]).unwrap();
        let d = Histogram2D::new(x, y, vec![vec![11.0, 1.0], vec![4.0, 0.0]]).unwrap();
        let two = observed_llr(&b, &s, &d).unwrap();
        let one = observed_llr(&hist(b.contents()), &hist(s.contents()), &hist(d.contents())).unwrap();
        assert_eq!(two.value, one.value);
        assert_eq!(two.n_empty_bins, 1);
        assert_eq!(two.ignored_counts[0].bin, BinIndex::TwoD(0, 1));
    }

    #[test]
    fn test_rejects_mismatched_data() {
        let b = hist(&[1.0, 2.0]);
        let s = hist(&[1.0, 2.0]);
        let d = Histogram1D::new(vec![0.0, 1.0, 3.0], vec![1.0, 2.0]).unwrap();
        assert!(matches!(observed_llr(&b, &s, &d), Err(Error::Validation(_))));
    }
}
