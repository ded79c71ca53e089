//! Utility types for the render crate.

use thiserror::Error;

use reelsub_core::utils::CoreError;

/// Errors surfaced while turning a document into a paint plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Errors from reelsub-core (colour decoding, mainly).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The document has no styles to resolve captions against.
    #[error("document has no styles")]
    NoStyles,

    /// The canvas has a non-positive dimension.
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },
}

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
