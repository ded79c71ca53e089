//! Parse errors and non-fatal parse diagnostics.

use thiserror::Error;

/// Fatal parse failure: the input cannot be loaded as a caption
/// document. Every variant carries enough context (line number, section
/// name) to point the user at the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input blob was empty or all-whitespace.
    #[error("empty input: nothing to parse")]
    EmptyInput,

    /// The style table produced zero entries.
    #[error("style table is empty")]
    NoStyles,

    /// The event table produced zero captions.
    #[error("event table is empty")]
    NoCaptions,

    /// A line could not be decomposed into the declared field count.
    #[error("line {line}: [{section}] has {found} fields, expected {expected}")]
    FieldCountMismatch {
        section: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A typed field failed to decode.
    #[error("line {line}: [{section}] field '{field}': {reason}")]
    InvalidField {
        section: String,
        line: usize,
        field: String,
        reason: String,
    },
}

/// Severity of a non-fatal parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueSeverity {
    /// Recoverable oddity; the line or section was skipped.
    Warning,
    /// A malformed construct that was dropped from the document.
    Error,
}

/// A recoverable problem recorded while parsing.
///
/// The parser skips past these and keeps going; they are surfaced on the
/// returned document so hosts can show diagnostics without failing the
/// load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub severity: IssueSeverity,
    pub message: String,
    pub line: usize,
}

impl ParseIssue {
    /// Create a new issue at the given 1-based source line.
    pub fn new(severity: IssueSeverity, message: impl Into<String>, line: usize) -> Self {
        Self {
            severity,
            message: message.into(),
            line,
        }
    }

    /// Convenience constructor for warnings.
    pub fn warning(message: impl Into<String>, line: usize) -> Self {
        Self::new(IssueSeverity::Warning, message, line)
    }
}
