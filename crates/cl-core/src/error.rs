//! Error types for countllr

use thiserror::Error;

/// countllr error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input: mismatched lengths, negative contents, bad edges.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Input that is well-formed but cannot support the requested statistic,
    /// e.g. a cumulative distribution that never reaches a quantile target.
    #[error("Degenerate input: {0}")]
    Degenerate(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
