//! Core traits for countllr
//!
//! The statistics engine is written once against [`Binned`] and serves both the
//! 1D and the 2D analysis: a 2D grid is walked through the same flat, row-major
//! bin sequence as a 1D axis.

use crate::types::{AnyHistogram, BinLayout, Histogram1D, Histogram2D};

/// A histogram whose bins can be walked as one flat sequence.
pub trait Binned {
    /// Flat bin contents in storage order (row-major for 2D).
    fn contents(&self) -> &[f64];

    /// Edge axes, used to check that histograms line up and to name bins.
    fn layout(&self) -> BinLayout<'_>;

    /// Number of bins.
    fn n_bins(&self) -> usize {
        self.contents().len()
    }
}

impl Binned for Histogram1D {
    fn contents(&self) -> &[f64] {
        Histogram1D::contents(self)
    }

    fn layout(&self) -> BinLayout<'_> {
        BinLayout::OneD { edges: self.edges() }
    }
}

impl Binned for Histogram2D {
    fn contents(&self) -> &[f64] {
        Histogram2D::contents(self)
    }

    fn layout(&self) -> BinLayout<'_> {
        BinLayout::TwoD { x_edges: self.x_edges(), y_edges: self.y_edges() }
    }
}

impl Binned for AnyHistogram {
    fn contents(&self) -> &[f64] {
        match self {
            AnyHistogram::OneD(h) => h.contents(),
            AnyHistogram::TwoD(h) => h.contents(),
        }
    }

    fn layout(&self) -> BinLayout<'_> {
        match self {
            AnyHistogram::OneD(h) => Binned::layout(h),
            AnyHistogram::TwoD(h) => Binned::layout(h),
        }
    }
}
