//! # cl-inference
//!
//! Test-statistic engine for binned counting experiments.
//!
//! This crate provides:
//! - Poisson pseudo-experiment generation of the LLR `-2 ln Q` under the
//!   background-only and signal-plus-background hypotheses
//! - The observed LLR for real data
//! - Empirical PDFs, quantile bands, and one-sided confidence levels
//!
//! ## Architecture
//!
//! Every computation is generic over [`cl_core::Binned`]; 1D and 2D analyses share
//! one implementation of the per-bin rule in [`contribution`].

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Per-hypothesis batch driver (generate, observe, summarise).
pub mod analysis;
/// One-sided confidence levels of the observed LLR.
pub mod confidence;
/// Per-bin LLR contribution policy and the fold over bins.
pub mod contribution;
/// Pseudo-experiment LLR generator.
pub mod generator;
/// Observed LLR calculator.
pub mod observed;
/// Empirical PDFs of LLR sample sets.
pub mod pdf;
/// Quantile band extraction from a normalised PDF.
pub mod quantiles;
/// Poisson toy-count generation.
pub mod toys;

pub use analysis::{
    AnalysisConfig, HypothesisInput, HypothesisOutcome, HypothesisResult, SignalHypothesis,
    run_per_hypothesis, run_shared_background,
};
pub use confidence::{ConfidenceLevels, confidence_levels};
pub use contribution::{Contribution, IgnoredCountBin, LlrFold};
pub use generator::{GeneratorConfig, GeneratorDiagnostics, LlrSamples, generate_llr};
pub use observed::{
    ObservedLlr, observed_llr, observed_llrs_per_hypothesis, observed_llrs_shared_background,
};
pub use pdf::{DEFAULT_N_EDGES, EmpiricalPdf, llr_binning};
pub use quantiles::{QuantileSummary, quantiles};
