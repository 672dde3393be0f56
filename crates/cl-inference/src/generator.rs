//! Pseudo-experiment generation of the LLR test statistic.
//!
//! For every pseudo-experiment two datasets are drawn bin by bin:
//! `N_b ~ Poisson(b)` (background-only) and `N_sb ~ Poisson(b + s)`
//! (signal-plus-background). Each is folded into `-2 ln Q` with the same
//! per-bin rule as the observed statistic, giving a background-like and a
//! signal-plus-background-like sample of length `n_experiments`.
//!
//! Notes:
//! - Experiment `k` owns an RNG seeded with `seed + k`; within an experiment the
//!   background-only vector is drawn before the signal-plus-background vector.
//!   Output does not depend on the number of threads.
//! - Diagnostics are collected on the side and never change the samples.

use cl_core::{Binned, Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::contribution::{IgnoredCountBin, LlrFold, ensure_same_layout, ensure_yields, fold_llr};
use crate::toys::{experiment_rng, poisson_counts, signal_plus_background};

/// Default number of pseudo-experiments.
pub const DEFAULT_N_EXPERIMENTS: usize = 10_000;

const MAX_RECORDED_IGNORED: usize = 16;

/// Generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of pseudo-experiments per hypothesis (> 0).
    pub n_experiments: usize,
    /// Base seed. `None` draws one from the thread RNG; the value used is reported
    /// in [`LlrSamples::seed`].
    pub seed: Option<u64>,
    /// Log the empty-bin summary at info level.
    pub report_empty: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { n_experiments: DEFAULT_N_EXPERIMENTS, seed: None, report_empty: false }
    }
}

impl GeneratorConfig {
    /// Set the number of pseudo-experiments.
    pub fn with_experiments(mut self, n_experiments: usize) -> Self {
        self.n_experiments = n_experiments;
        self
    }

    /// Fix the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Informational record of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorDiagnostics {
    /// Pseudo-experiments generated.
    pub n_experiments: usize,
    /// Bins evaluated per pseudo-experiment.
    pub bins_per_experiment: usize,
    /// Empty bins (no background, no signal) summed over all pseudo-experiments.
    pub empty_bins: usize,
    /// Zero-background bins with a nonzero background-only count.
    pub ignored_b_like: usize,
    /// Zero-background bins with a nonzero signal-plus-background count.
    pub ignored_sb_like: usize,
    /// The first few such occurrences, in experiment order.
    pub first_ignored: Vec<IgnoredCountBin>,
}

impl GeneratorDiagnostics {
    /// Bins evaluated over the whole run.
    pub fn total_bins(&self) -> usize {
        self.n_experiments * self.bins_per_experiment
    }

    /// Fraction of evaluated bins that were empty.
    pub fn empty_fraction(&self) -> f64 {
        let total = self.total_bins();
        if total == 0 { 0.0 } else { self.empty_bins as f64 / total as f64 }
    }
}

/// Two LLR sample sets of equal length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlrSamples {
    /// `-2 ln Q` for background-only pseudo-data.
    pub b_like: Vec<f64>,
    /// `-2 ln Q` for signal-plus-background pseudo-data.
    pub sb_like: Vec<f64>,
    /// Base seed actually used.
    pub seed: u64,
    /// Side-channel diagnostics.
    pub diagnostics: GeneratorDiagnostics,
}

impl LlrSamples {
    /// Number of pseudo-experiments.
    pub fn len(&self) -> usize {
        self.b_like.len()
    }

    /// True if no pseudo-experiment was generated.
    pub fn is_empty(&self) -> bool {
        self.b_like.is_empty()
    }
}

struct Experiment {
    b_like: LlrFold,
    sb_like: LlrFold,
}

/// Generate background-like and signal-plus-background-like LLR samples.
///
/// `background` and `signal` must share a bin layout. Works identically for 1D and
/// 2D histograms.
pub fn generate_llr<H: Binned + ?Sized>(
    background: &H,
    signal: &H,
    config: &GeneratorConfig,
) -> Result<LlrSamples> {
    if config.n_experiments == 0 {
        return Err(Error::Validation("n_experiments must be > 0".to_string()));
    }
    ensure_yields("background", background)?;
    ensure_yields("signal", signal)?;
    ensure_same_layout("signal", background, signal)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    log::debug!("generating {} pseudo-experiments (seed {seed})", config.n_experiments);

    let layout = background.layout();
    let b = background.contents();
    let s = signal.contents();
    let sb = signal_plus_background(b, s);

    let experiments: Vec<Experiment> = (0..config.n_experiments)
        .into_par_iter()
        .with_min_len(64)
        .map(|k| {
            let mut rng = experiment_rng(seed, k);
            let n_b = poisson_counts(b, &mut rng)?;
            let n_sb = poisson_counts(&sb, &mut rng)?;
            Ok(Experiment { b_like: fold_llr(layout, b, s, &n_b), sb_like: fold_llr(layout, b, s, &n_sb) })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut diagnostics = GeneratorDiagnostics {
        n_experiments: config.n_experiments,
        bins_per_experiment: layout.n_bins(),
        ..Default::default()
    };
    let mut b_like = Vec::with_capacity(experiments.len());
    let mut sb_like = Vec::with_capacity(experiments.len());

    for (k, exp) in experiments.into_iter().enumerate() {
        diagnostics.empty_bins += exp.b_like.n_empty;
        diagnostics.ignored_b_like += exp.b_like.ignored.len();
        diagnostics.ignored_sb_like += exp.sb_like.ignored.len();
        for (variant, fold) in [("background-only", &exp.b_like), ("signal+background", &exp.sb_like)]
        {
            for ign in &fold.ignored {
                log::debug!(
                    "experiment {k}: {} has {} signal and {} {variant} counts but no background; \
                     the counts are not reflected in -2lnQ",
                    ign.bin,
                    ign.signal,
                    ign.count
                );
                if diagnostics.first_ignored.len() < MAX_RECORDED_IGNORED {
                    diagnostics.first_ignored.push(*ign);
                }
            }
        }
        b_like.push(exp.b_like.value);
        sb_like.push(exp.sb_like.value);
    }

    let n_ignored = diagnostics.ignored_b_like + diagnostics.ignored_sb_like;
    if n_ignored > 0 {
        log::warn!(
            "{n_ignored} zero-background bins had nonzero pseudo-counts ({} background-only, {} \
             signal+background); those counts were not included in -2lnQ",
            diagnostics.ignored_b_like,
            diagnostics.ignored_sb_like
        );
    }
    if config.report_empty {
        log::info!(
            "{} out of {} bins were empty ({:.2}%)",
            diagnostics.empty_bins,
            diagnostics.total_bins(),
            100.0 * diagnostics.empty_fraction()
        );
    }

    Ok(LlrSamples { b_like, sb_like, seed, diagnostics })
}
