//! # cl-core
//!
//! Core types, traits, and error handling for countllr.
//!
//! This crate provides:
//! - Common error types
//! - Binned histogram data model (1D and 2D)
//! - The [`Binned`] trait the statistics engine is generic over

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::Binned;
pub use types::{AnyHistogram, BinIndex, BinLayout, Histogram1D, Histogram2D};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
