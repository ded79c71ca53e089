//! Core editor types: errors and the result alias.

pub mod errors;

pub use errors::{EditorError, Result};
