//! Per-bin LLR contribution policy.
//!
//! The test statistic is `-2 ln Q = Σ_i c_i` with
//! `c_i = 2 s_i - 2 N_i ln(1 + s_i / b_i)`. Bins without background cannot use
//! that ratio, so each bin is first classified into a [`Contribution`] and the
//! statistic is a fold over the classified bins.

use cl_core::{BinIndex, BinLayout, Binned, Error, Result};
use serde::{Deserialize, Serialize};

/// Classified contribution of one bin to `-2 ln Q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    /// Regular bin: `2 s - 2 n ln(1 + s / b)`.
    Formula {
        /// Expected background.
        b: f64,
        /// Expected signal.
        s: f64,
        /// Observed or pseudo-observed count.
        n: f64,
    },
    /// No background but some signal: contributes `2 s` regardless of `n`.
    ZeroBackground {
        /// Expected signal.
        s: f64,
        /// Observed or pseudo-observed count (not reflected in the value).
        n: f64,
    },
    /// No background and no signal: contributes nothing.
    Empty,
}

impl Contribution {
    /// Classify a bin from its expectations and count.
    #[inline]
    pub fn classify(b: f64, s: f64, n: f64) -> Self {
        if b == 0.0 {
            if s != 0.0 { Contribution::ZeroBackground { s, n } } else { Contribution::Empty }
        } else {
            Contribution::Formula { b, s, n }
        }
    }

    /// Contribution to `-2 ln Q`.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Contribution::Formula { b, s, n } => 2.0 * s - 2.0 * n * (1.0 + s / b).ln(),
            Contribution::ZeroBackground { s, .. } => 2.0 * s,
            Contribution::Empty => 0.0,
        }
    }

    /// True when the bin holds counts that the contribution cannot reflect.
    #[inline]
    pub fn ignores_count(self) -> bool {
        matches!(self, Contribution::ZeroBackground { n, .. } if n != 0.0)
    }
}

/// A zero-background bin whose nonzero count was left out of the statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IgnoredCountBin {
    /// Which bin.
    pub bin: BinIndex,
    /// Expected signal in the bin.
    pub signal: f64,
    /// Count that was not reflected.
    pub count: f64,
}

/// Result of folding the contribution rule over all bins of one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlrFold {
    /// `-2 ln Q`.
    pub value: f64,
    /// Bins with neither background nor signal.
    pub n_empty: usize,
    /// Zero-background bins with a nonzero count.
    pub ignored: Vec<IgnoredCountBin>,
}

/// Evaluate `-2 ln Q` for one dataset.
///
/// `background`, `signal` and `counts` are flat contents in `layout` order and must all
/// have `layout.n_bins()` entries.
pub fn fold_llr(
    layout: BinLayout<'_>,
    background: &[f64],
    signal: &[f64],
    counts: &[f64],
) -> LlrFold {
    debug_assert_eq!(background.len(), layout.n_bins());
    debug_assert_eq!(signal.len(), layout.n_bins());
    debug_assert_eq!(counts.len(), layout.n_bins());

    layout.bins().fold(LlrFold::default(), |mut acc, (flat, bin)| {
        let c = Contribution::classify(background[flat], signal[flat], counts[flat]);
        if c == Contribution::Empty {
            acc.n_empty += 1;
        } else if c.ignores_count() {
            acc.ignored.push(IgnoredCountBin { bin, signal: signal[flat], count: counts[flat] });
        }
        acc.value += c.value();
        acc
    })
}

/// Fail fast unless `other` has the same bin layout as `reference`.
pub(crate) fn ensure_same_layout<H: Binned + ?Sized>(
    what: &str,
    reference: &H,
    other: &H,
) -> Result<()> {
    let (a, b) = (reference.layout(), other.layout());
    if a.rank() != b.rank() {
        return Err(Error::Validation(format!(
            "{what}: {}D histogram does not match {}D background",
            b.rank(),
            a.rank()
        )));
    }
    if a != b || reference.n_bins() != other.n_bins() {
        return Err(Error::Validation(format!(
            "{what}: bin layout does not match the background ({} vs {} bins)",
            other.n_bins(),
            reference.n_bins()
        )));
    }
    Ok(())
}

/// Fail fast on negative or non-finite contents, or contents that disagree with the layout.
pub(crate) fn ensure_yields<H: Binned + ?Sized>(what: &str, h: &H) -> Result<()> {
    let contents = h.contents();
    if contents.len() != h.layout().n_bins() {
        return Err(Error::Validation(format!(
            "{what}: {} contents for {} bins",
            contents.len(),
            h.layout().n_bins()
        )));
    }
    if let Some((i, v)) = contents.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
        return Err(Error::Validation(format!(
            "{what}: {} has invalid content {v}",
            h.layout().index_of(i)
        )));
    }
    Ok(())
}
