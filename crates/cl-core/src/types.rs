//! Binned histogram data model.
//!
//! Histograms carry non-negative bin contents together with strictly increasing edge
//! coordinates. They are validated once, at construction or deserialisation, so the
//! statistics engine can assume well-formed input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Position of a bin within its layout.
///
/// Serialises as a bare index (`3`) in 1D and as a pair (`[1, 2]`) in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinIndex {
    /// Bin `i` of a 1D axis.
    OneD(usize),
    /// Bin `(i, j)` of a 2D grid, `i` along x.
    TwoD(usize, usize),
}

impl fmt::Display for BinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinIndex::OneD(i) => write!(f, "bin {i}"),
            BinIndex::TwoD(i, j) => write!(f, "bin ({i}, {j})"),
        }
    }
}

/// Borrowed view of a histogram's edge axes.
///
/// Two histograms share a layout iff their `BinLayout`s compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinLayout<'a> {
    /// Single axis.
    OneD {
        /// Bin edges (length = n_bins + 1).
        edges: &'a [f64],
    },
    /// Two axes, contents stored row-major (x outer, y inner).
    TwoD {
        /// Edges along x.
        x_edges: &'a [f64],
        /// Edges along y.
        y_edges: &'a [f64],
    },
}

impl<'a> BinLayout<'a> {
    /// Total number of bins.
    pub fn n_bins(&self) -> usize {
        match self {
            BinLayout::OneD { edges } => edges.len().saturating_sub(1),
            BinLayout::TwoD { x_edges, y_edges } => {
                x_edges.len().saturating_sub(1) * y_edges.len().saturating_sub(1)
            }
        }
    }

    /// Dimensionality (1 or 2).
    pub fn rank(&self) -> usize {
        match self {
            BinLayout::OneD { .. } => 1,
            BinLayout::TwoD { .. } => 2,
        }
    }

    /// Map a flat (row-major) position to its structured index.
    pub fn index_of(&self, flat: usize) -> BinIndex {
        match self {
            BinLayout::OneD { .. } => BinIndex::OneD(flat),
            BinLayout::TwoD { y_edges, .. } => {
                let ny = y_edges.len().saturating_sub(1).max(1);
                BinIndex::TwoD(flat / ny, flat % ny)
            }
        }
    }

    /// Iterate all bins as `(flat, index)` pairs in storage order.
    pub fn bins(self) -> impl Iterator<Item = (usize, BinIndex)> + 'a {
        (0..self.n_bins()).map(move |flat| (flat, self.index_of(flat)))
    }
}

fn validate_edges(name: &str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::Validation(format!(
            "{name}: need at least 2 edges, got {}",
            edges.len()
        )));
    }
    if let Some(bad) = edges.iter().position(|e| !e.is_finite()) {
        return Err(Error::Validation(format!("{name}: edge {bad} is not finite")));
    }
    if let Some(w) = edges.windows(2).position(|w| w[1] <= w[0]) {
        return Err(Error::Validation(format!(
            "{name}: edges must be strictly increasing (edge {} = {} >= edge {} = {})",
            w,
            edges[w],
            w + 1,
            edges[w + 1]
        )));
    }
    Ok(())
}

fn validate_contents(name: &str, contents: &[f64]) -> Result<()> {
    for (i, &v) in contents.iter().enumerate() {
        if !v.is_finite() {
            return Err(Error::Validation(format!("{name}: bin {i} is not finite ({v})")));
        }
        if v < 0.0 {
            return Err(Error::Validation(format!("{name}: bin {i} is negative ({v})")));
        }
    }
    Ok(())
}

/// One-dimensional histogram: `contents.len() + 1 == edges.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Histogram1DRepr")]
pub struct Histogram1D {
    edges: Vec<f64>,
    contents: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Histogram1DRepr {
    edges: Vec<f64>,
    contents: Vec<f64>,
}

impl TryFrom<Histogram1DRepr> for Histogram1D {
    type Error = Error;

    fn try_from(r: Histogram1DRepr) -> Result<Self> {
        Self::new(r.edges, r.contents)
    }
}

impl Histogram1D {
    /// Build a validated histogram.
    pub fn new(edges: Vec<f64>, contents: Vec<f64>) -> Result<Self> {
        validate_edges("histogram", &edges)?;
        if edges.len() != contents.len() + 1 {
            return Err(Error::Validation(format!(
                "histogram: {} edges do not match {} bins (expected {} edges)",
                edges.len(),
                contents.len(),
                contents.len() + 1
            )));
        }
        validate_contents("histogram", &contents)?;
        Ok(Self { edges, contents })
    }

    /// Histogram with unit-width bins `[0, 1), [1, 2), ...`.
    pub fn with_unit_bins(contents: Vec<f64>) -> Result<Self> {
        let edges = (0..=contents.len()).map(|i| i as f64).collect();
        Self::new(edges, contents)
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin contents.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    /// Bin widths.
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Sum of contents.
    pub fn total(&self) -> f64 {
        self.contents.iter().sum()
    }
}

/// Two-dimensional histogram stored row-major: bin `(i, j)` lives at `i * ny + j`.
///
/// JSON form uses nested rows: `"contents": [[...], [...]]`, one row per x bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Histogram2DRepr", into = "Histogram2DRepr")]
pub struct Histogram2D {
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
    contents: Vec<f64>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Histogram2DRepr {
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
    contents: Vec<Vec<f64>>,
}

impl TryFrom<Histogram2DRepr> for Histogram2D {
    type Error = Error;

    fn try_from(r: Histogram2DRepr) -> Result<Self> {
        Self::new(r.x_edges, r.y_edges, r.contents)
    }
}

impl From<Histogram2D> for Histogram2DRepr {
    fn from(h: Histogram2D) -> Self {
        let contents = (0..h.nx()).map(|i| h.row(i).to_vec()).collect();
        Self { x_edges: h.x_edges, y_edges: h.y_edges, contents }
    }
}

impl Histogram2D {
    /// Build a validated histogram from rows (`rows[i][j]` is bin `(i, j)`).
    pub fn new(x_edges: Vec<f64>, y_edges: Vec<f64>, rows: Vec<Vec<f64>>) -> Result<Self> {
        validate_edges("histogram x axis", &x_edges)?;
        validate_edges("histogram y axis", &y_edges)?;
        let nx = x_edges.len() - 1;
        let ny = y_edges.len() - 1;
        if rows.len() != nx {
            return Err(Error::Validation(format!(
                "histogram: {} rows do not match {} x bins",
                rows.len(),
                nx
            )));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != ny) {
            return Err(Error::Validation(format!(
                "histogram: row {i} has {} entries, expected {ny}",
                rows[i].len()
            )));
        }
        let contents: Vec<f64> = rows.into_iter().flatten().collect();
        validate_contents("histogram", &contents)?;
        Ok(Self { x_edges, y_edges, contents })
    }

    /// Build from already-flattened row-major contents.
    pub fn from_flat(x_edges: Vec<f64>, y_edges: Vec<f64>, contents: Vec<f64>) -> Result<Self> {
        validate_edges("histogram x axis", &x_edges)?;
        validate_edges("histogram y axis", &y_edges)?;
        let n = (x_edges.len() - 1) * (y_edges.len() - 1);
        if contents.len() != n {
            return Err(Error::Validation(format!(
                "histogram: {} contents do not match {n} bins",
                contents.len()
            )));
        }
        validate_contents("histogram", &contents)?;
        Ok(Self { x_edges, y_edges, contents })
    }

    /// Edges along x.
    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    /// Edges along y.
    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    /// Number of x bins.
    pub fn nx(&self) -> usize {
        self.x_edges.len() - 1
    }

    /// Number of y bins.
    pub fn ny(&self) -> usize {
        self.y_edges.len() - 1
    }

    /// Flat row-major contents.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Row `i` (all y bins at x bin `i`).
    pub fn row(&self, i: usize) -> &[f64] {
        let ny = self.ny();
        &self.contents[i * ny..(i + 1) * ny]
    }

    /// Content of bin `(i, j)`.
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.contents[i * self.ny() + j]
    }
}

/// Either a 1D or a 2D histogram, as found in input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyHistogram {
    /// 2D histogram (`x_edges`, `y_edges`, nested `contents`).
    TwoD(Histogram2D),
    /// 1D histogram (`edges`, `contents`).
    OneD(Histogram1D),
}

impl AnyHistogram {
    /// Borrow as 1D, if it is one.
    pub fn as_one_d(&self) -> Option<&Histogram1D> {
        match self {
            AnyHistogram::OneD(h) => Some(h),
            AnyHistogram::TwoD(_) => None,
        }
    }

    /// Borrow as 2D, if it is one.
    pub fn as_two_d(&self) -> Option<&Histogram2D> {
        match self {
            AnyHistogram::TwoD(h) => Some(h),
            AnyHistogram::OneD(_) => None,
        }
    }
}

impl From<Histogram1D> for AnyHistogram {
    fn from(h: Histogram1D) -> Self {
        AnyHistogram::OneD(h)
    }
}

impl From<Histogram2D> for AnyHistogram {
    fn from(h: Histogram2D) -> Self {
        AnyHistogram::TwoD(h)
    }
}
