//! # Reelsub Editor
//!
//! Interactive editing layer over [`reelsub-core`] caption documents:
//! a synchronous state machine the host UI drives one action at a time.
//!
//! ## Design
//!
//! - **One mutation path**: every edit is an [`EditAction`] applied via
//!   [`EditSession::apply`]; there is no other way to change the
//!   document, so invariants cannot be skipped by a forgetful caller
//! - **Total operations**: timing edits are clamped and normalized,
//!   never rejected — dragging a boundary always lands somewhere legal
//! - **Dense indices**: every structural mutation re-indexes the
//!   caption list before returning
//!
//! ## Quick Start
//!
//! ```rust
//! use reelsub_core::document::{Caption, CaptionDocument, Style};
//! use reelsub_editor::{EditAction, EditSession};
//!
//! let mut caption = Caption { end: 2.0, ..Caption::default() };
//! caption.set_text("Hello world");
//! let doc = CaptionDocument {
//!     styles: vec![Style::default()],
//!     captions: vec![caption],
//!     ..CaptionDocument::default()
//! };
//!
//! let mut session = EditSession::new(doc).with_playable_duration(30.0);
//! session.apply(EditAction::Select(Some(0)))?;
//! session.apply(EditAction::SplitSelected { at: 1.0 })?;
//! assert_eq!(session.document().captions.len(), 2);
//! assert_eq!(session.selected(), Some(1));
//! # Ok::<(), reelsub_editor::EditorError>(())
//! ```

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod commands;
pub mod core;
pub mod sessions;

pub use commands::{EditAction, Outcome, StyleField};
pub use self::core::{EditorError, Result};
pub use sessions::{EditSession, MIN_GAP};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
