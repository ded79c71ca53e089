//! Document invariant checks.
//!
//! Validation never mutates: it walks the model and reports every
//! violation it finds, so a host can surface all problems at once
//! instead of fixing them one save attempt at a time.

use ahash::AHashSet;
use thiserror::Error;

use super::CaptionDocument;

/// A violated document invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The style table is empty; every caption needs a resolvable style.
    #[error("document has no styles")]
    NoStyles,

    /// The caption list is empty.
    #[error("document has no captions")]
    NoCaptions,

    /// Two styles share a name, making references ambiguous.
    #[error("duplicate style name '{name}'")]
    DuplicateStyle { name: String },

    /// A caption references a style the table does not define.
    #[error("caption {index} references undefined style '{style}'")]
    DanglingStyle { index: usize, style: String },

    /// A caption starts before time zero.
    #[error("caption {index} starts at {start}s, before zero")]
    NegativeStart { index: usize, start: f64 },

    /// A caption ends at or before its start.
    #[error("caption {index} has non-positive duration ({start}s..{end}s)")]
    NonPositiveDuration { index: usize, start: f64, end: f64 },

    /// A caption's stored index does not match its list position.
    #[error("caption at position {position} carries index {index}")]
    IndexMismatch { position: usize, index: usize },
}

/// Check every model invariant, returning all violations found.
///
/// An empty result means the document is safe to render and save.
#[must_use]
pub fn validate(doc: &CaptionDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if doc.styles.is_empty() {
        errors.push(ValidationError::NoStyles);
    }
    if doc.captions.is_empty() {
        errors.push(ValidationError::NoCaptions);
    }

    let mut seen = AHashSet::with_capacity(doc.styles.len());
    for style in &doc.styles {
        if !seen.insert(style.name.as_str()) {
            errors.push(ValidationError::DuplicateStyle {
                name: style.name.clone(),
            });
        }
    }

    for (position, caption) in doc.captions.iter().enumerate() {
        if caption.index != position {
            errors.push(ValidationError::IndexMismatch {
                position,
                index: caption.index,
            });
        }
        if caption.start < 0.0 {
            errors.push(ValidationError::NegativeStart {
                index: position,
                start: caption.start,
            });
        }
        if caption.end <= caption.start {
            errors.push(ValidationError::NonPositiveDuration {
                index: position,
                start: caption.start,
                end: caption.end,
            });
        }
        if !caption.style.is_empty() && !seen.contains(caption.style.as_str()) {
            errors.push(ValidationError::DanglingStyle {
                index: position,
                style: caption.style.clone(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::super::{Caption, Style};
    use super::*;

    fn valid_doc() -> CaptionDocument {
        let mut caption = Caption {
            end: 2.0,
            ..Caption::default()
        };
        caption.set_text("Hello");
        CaptionDocument {
            styles: vec![Style::default()],
            captions: vec![caption],
            ..CaptionDocument::default()
        }
    }

    #[test]
    fn valid_document_has_no_errors() {
        assert!(validate(&valid_doc()).is_empty());
    }

    #[test]
    fn empty_tables_reported() {
        let doc = CaptionDocument::default();
        let errors = validate(&doc);
        assert!(errors.contains(&ValidationError::NoStyles));
        assert!(errors.contains(&ValidationError::NoCaptions));
    }

    #[test]
    fn duplicate_style_names() {
        let mut doc = valid_doc();
        doc.styles.push(Style::default());
        assert!(validate(&doc)
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateStyle { name } if name == "Default")));
    }

    #[test]
    fn dangling_style_reference() {
        let mut doc = valid_doc();
        doc.captions[0].style = "Missing".into();
        assert!(validate(&doc)
            .iter()
            .any(|e| matches!(e, ValidationError::DanglingStyle { index: 0, .. })));
    }

    #[test]
    fn timing_invariants() {
        let mut doc = valid_doc();
        doc.captions[0].start = -0.5;
        doc.captions[0].end = -1.0;
        let errors = validate(&doc);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::NegativeStart { index: 0, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::NonPositiveDuration { index: 0, .. })));
    }

    #[test]
    fn index_must_be_dense() {
        let mut doc = valid_doc();
        doc.captions[0].index = 5;
        assert!(validate(&doc).iter().any(
            |e| matches!(e, ValidationError::IndexMismatch { position: 0, index: 5 })
        ));
    }

    #[test]
    fn all_violations_reported_together() {
        let mut doc = valid_doc();
        doc.captions[0].style = "Missing".into();
        doc.captions[0].end = 0.0;
        assert_eq!(validate(&doc).len(), 2);
    }
}
