//! # Reelsub Core
//!
//! Subtitle and caption engine for short-form vertical video: a caption
//! script parser, document model and override-tag processor built for an
//! interactive reel studio rather than batch playback.
//!
//! ## Features
//!
//! - **Recovering parser**: malformed lines become diagnostics on the
//!   document, not load failures
//! - **Owned document model**: captions are mutated in place by the
//!   editing engine and serialized back on save
//! - **Declared schemas**: style/event field order is data, not logic
//! - **Tag processor**: karaoke, placement and styling overrides
//!   decoded into typed runs for rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use reelsub_core::document::parse;
//!
//! let script_text = r#"
//! [Script Info]
//! Title: Example
//! PlayResX: 1080
//! PlayResY: 1920
//!
//! [V4+ Styles]
//! Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
//! Style: Default,Arial,48,&H00FFFFFF,&H0000FFFF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1
//!
//! [Events]
//! Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
//! Dialogue: 0,0:00:00.00,0:00:05.00,Default,,0,0,0,,{\k50}Hello {\k70}world
//! "#;
//!
//! let doc = parse(script_text)?;
//! assert_eq!(doc.captions[0].plain_text, "Hello world");
//! # Ok::<(), reelsub_core::document::ParseError>(())
//! ```

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod document;
pub mod tags;
pub mod utils;

pub use document::{
    parse, serialize, validate, Caption, CaptionDocument, IssueSeverity, ParseError, ParseIssue,
    ScriptMetadata, Style, ValidationError,
};
pub use tags::{strip_tags, OverrideState, Overrides, ParsedText, TextRun};
pub use utils::CoreError;

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
