//! Error types for the reelsub-editor crate.
//!
//! Follows the same philosophy as core: thiserror for structured error
//! handling (no anyhow), detailed context for debugging, `?` propagation
//! throughout.

use thiserror::Error;

/// Main error type for editing operations.
///
/// Timing clamps are deliberately absent: out-of-range drags and
/// sub-minimum gaps are normalized silently by the session, never
/// rejected. Errors here mean the action itself was unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// An action that needs a selection was applied without one.
    #[error("no caption selected")]
    NoSelection,

    /// A caption index is outside the current list.
    #[error("caption index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A style mutation named a style the document does not define.
    #[error("unknown style '{name}'")]
    UnknownStyle { name: String },
}

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
