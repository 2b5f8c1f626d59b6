//! Error types for termpix operations
//!
//! This module defines `TermpixError`, the primary error type returned by the
//! crate's boundary-validation APIs. All errors include contextual information
//! (the offending input, the valid range) to aid debugging.
//!
//! # Zero Panics Policy
//!
//! Fallible public APIs return `Result<T, TermpixError>` instead of panicking.
//! Hot rendering paths never raise at all: malformed inputs that reach a
//! primitive (out-of-bounds dots, zero-sized bitmaps) are absorbed as no-ops
//! or produce canonical empty output.
//!
//! # Examples
//!
//! ```
//! use termpix::{BrailleCanvas, TermpixError};
//!
//! // Create a canvas with invalid dimensions
//! let result = BrailleCanvas::new(0, 10);
//! match result {
//!     Err(TermpixError::InvalidDimensions { width, height }) => {
//!         println!("Invalid dimensions: {}×{}", width, height);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Comprehensive error type for all termpix operations
///
/// All variants include contextual information to aid debugging and provide
/// actionable error messages to end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermpixError {
    /// Hex color string is malformed
    ///
    /// Accepted forms are `#RGB`, `#RRGGBB` and `#RRGGBBAA`. Anything else
    /// (wrong length, missing `#`, non-hex digits) is rejected.
    #[error("Invalid hex color: {input:?} (expected #RGB, #RRGGBB or #RRGGBBAA)")]
    InvalidHex {
        /// The string that failed to parse
        input: String,
    },

    /// Palette index is outside 0..=255
    ///
    /// Returned by checked conversions from untrusted integers. APIs that
    /// already hold a `u8` index are infallible.
    #[error("Invalid palette index: {index} (must be 0-255)")]
    InvalidPaletteIndex {
        /// The out-of-range index
        index: u32,
    },

    /// Configuration value is outside its valid range
    ///
    /// Covers backend construction parameters (e.g. the sixel palette size,
    /// which must be 2-256) and animation batches (frame/delay length
    /// mismatch, non-positive delays).
    #[error("Invalid {parameter}: {value} (expected {expected})")]
    InvalidConfig {
        /// Name of the offending parameter
        parameter: String,
        /// The value that was provided
        value: String,
        /// Description of the valid range
        expected: String,
    },

    /// Canvas dimensions are invalid (zero or exceeding maximum limits)
    ///
    /// Valid dimensions must satisfy:
    /// - `width > 0 && width <= 10,000`
    /// - `height > 0 && height <= 10,000`
    #[error("Invalid canvas dimensions: width={width}, height={height}")]
    InvalidDimensions {
        /// The invalid width value
        width: usize,
        /// The invalid height value
        height: usize,
    },
}

impl TermpixError {
    /// Build an `InvalidConfig` error from displayable parts.
    ///
    /// Convenience constructor used by backend option validation.
    pub fn invalid_config(
        parameter: impl Into<String>,
        value: impl std::fmt::Display,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}
