//! Core error types shared across the caption engine crates
//!
//! Follows a structured-error philosophy:
//! - `thiserror` derives, no `anyhow`
//! - detailed context (line numbers, section names, offending values)
//! - cheap to construct and clone, comparable in tests

use thiserror::Error;

use crate::document::{ParseError, ValidationError};

/// Unified error type for core operations.
///
/// Wraps the structured parse/validation errors and covers the leaf
/// utilities (timecodes, colours, numeric fields) that can fail outside
/// of a parsing context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Document parsing failed; fatal to loading.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Document violates a model invariant; blocks "ready" state.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Timecode string could not be interpreted as `H:MM:SS.CC`.
    #[error("invalid timecode '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    /// Colour value is not a recognized `&HAABBGGRR&` form.
    #[error("invalid colour value '{0}'")]
    InvalidColour(String),

    /// Numeric field could not be parsed.
    #[error("invalid numeric value '{value}': {reason}")]
    InvalidNumeric { value: String, reason: String },
}

impl CoreError {
    /// Create a timecode error with the offending value and a reason.
    pub fn invalid_time(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a numeric error with the offending value and a reason.
    pub fn invalid_numeric(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNumeric {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
