//! Caption document model: metadata, style table and timed caption list.
//!
//! The document is the single source of truth for an editing session. It
//! is parsed once from raw script text, mutated in place by the editing
//! engine, and serialized back on save. Unlike a read-only analysis pass
//! there is no zero-copy borrowing here: every field is owned so the
//! editor can rewrite captions without touching the original blob.

mod errors;
pub mod parser;
pub mod schema;
mod serialize;
mod validate;

pub use errors::{IssueSeverity, ParseError, ParseIssue};
pub use parser::parse;
pub use serialize::serialize;
pub use validate::{validate, ValidationError};

use crate::tags;

/// Ordered script metadata (`key: value` pairs from the info section).
///
/// Order and unrecognized keys are preserved verbatim so unknown host
/// metadata survives a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptMetadata {
    fields: Vec<(String, String)>,
}

impl ScriptMetadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key (case-sensitive, first match).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, replacing an existing entry in place or appending.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    /// Iterate entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Declared script coordinate space width, if present.
    #[must_use]
    pub fn play_res_x(&self) -> Option<f32> {
        self.get("PlayResX").and_then(|v| v.trim().parse().ok())
    }

    /// Declared script coordinate space height, if present.
    #[must_use]
    pub fn play_res_y(&self) -> Option<f32> {
        self.get("PlayResY").and_then(|v| v.trim().parse().ok())
    }

    /// Declared wrap policy, if present.
    #[must_use]
    pub fn wrap_style(&self) -> Option<u8> {
        self.get("WrapStyle").and_then(|v| v.trim().parse().ok())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A named visual preset from the style table.
///
/// Numeric fields are decoded to typed values at parse time; the four
/// colours stay in their raw `&H..` wire form so unmodified styles
/// round-trip exactly (the render crate decodes them on demand).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Unique name within the document.
    pub name: String,
    /// Font family.
    pub fontname: String,
    /// Font size in script-space pixels.
    pub fontsize: f32,
    /// Primary (unhighlighted) text colour, raw wire form.
    pub primary_colour: String,
    /// Karaoke-fill (highlighted) text colour, raw wire form.
    pub secondary_colour: String,
    /// Outline colour, raw wire form.
    pub outline_colour: String,
    /// Shadow/back colour, raw wire form.
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    /// Horizontal scale percentage (100 = unscaled).
    pub scale_x: f32,
    /// Vertical scale percentage (100 = unscaled).
    pub scale_y: f32,
    /// Extra inter-character spacing in pixels.
    pub spacing: f32,
    /// Rotation angle in degrees.
    pub angle: f32,
    /// Border style (1 = outline + shadow, 3 = opaque box).
    pub border_style: i32,
    /// Outline thickness in pixels.
    pub outline: f32,
    /// Shadow depth in pixels (applied to both axes).
    pub shadow: f32,
    /// Numpad alignment code, 1-9.
    pub alignment: u8,
    /// Left margin in script-space pixels.
    pub margin_l: i32,
    /// Right margin in script-space pixels.
    pub margin_r: i32,
    /// Vertical margin in script-space pixels.
    pub margin_v: i32,
    /// Character encoding id, passed through untouched.
    pub encoding: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            fontname: "Arial".into(),
            fontsize: 48.0,
            primary_colour: "&H00FFFFFF".into(),
            secondary_colour: "&H0000FFFF".into(),
            outline_colour: "&H00000000".into(),
            back_colour: "&H00000000".into(),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 0.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

/// One timed caption event.
///
/// `text` carries the raw, tag-laden content; `plain_text` is the
/// derived tag-stripped view used for editing. The pair must always be
/// consistent — use [`Caption::set_text`] / [`Caption::set_plain_text`]
/// rather than assigning the fields directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Caption {
    /// Dense zero-based index; matches list position after any mutation.
    pub index: usize,
    /// Paint order for overlapping captions (higher on top).
    pub layer: i32,
    /// Start time in seconds (centisecond precision).
    pub start: f64,
    /// End time in seconds; always greater than `start`.
    pub end: f64,
    /// Style table reference by name.
    pub style: String,
    /// Speaker name, passed through untouched.
    pub name: String,
    /// Effect field, passed through untouched.
    pub effect: String,
    /// Left margin override (0 = use style).
    pub margin_l: i32,
    /// Right margin override (0 = use style).
    pub margin_r: i32,
    /// Vertical margin override (0 = use style).
    pub margin_v: i32,
    /// Raw text with override tags.
    pub text: String,
    /// Tag-stripped text for the editing view; derived from `text`.
    pub plain_text: String,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            index: 0,
            layer: 0,
            start: 0.0,
            end: 0.0,
            style: "Default".into(),
            name: String::new(),
            effect: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            text: String::new(),
            plain_text: String::new(),
        }
    }
}

impl Caption {
    /// Replace the raw tagged text and re-derive `plain_text`.
    ///
    /// This is the single path that keeps the two text fields in sync;
    /// every mutation site routes through it or through
    /// [`Caption::set_plain_text`].
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.plain_text = tags::strip_tags(&self.text);
    }

    /// Replace the plain text, rebuilding the tagged text from it.
    ///
    /// If the plain text is unchanged the original tags (including
    /// karaoke timing) are preserved exactly; otherwise karaoke tags are
    /// discarded and only the alignment/position prefix survives. Brace
    /// characters in `plain` are dropped; they delimit tag blocks and
    /// have no escaped wire form.
    pub fn set_plain_text(&mut self, plain: &str) {
        self.text = tags::rebuild_text(plain, &self.text);
        self.plain_text = tags::strip_tags(&self.text);
    }

    /// Caption duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `time` falls inside this caption's `[start, end)` window.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// A parsed caption document: metadata, style table and caption list.
///
/// Caption order follows edit operations, not necessarily time order.
/// Exactly one mutable document exists per editing session, owned by the
/// session's state machine.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptionDocument {
    pub metadata: ScriptMetadata,
    pub styles: Vec<Style>,
    pub captions: Vec<Caption>,
    /// Non-fatal parse diagnostics (unknown sections, skipped lines).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub issues: Vec<ParseIssue>,
}

impl CaptionDocument {
    /// Look up a style by name.
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Mutable style lookup by name.
    pub fn style_mut(&mut self, name: &str) -> Option<&mut Style> {
        self.styles.iter_mut().find(|s| s.name == name)
    }

    /// The document's default style: the first entry in the table.
    #[must_use]
    pub fn default_style(&self) -> Option<&Style> {
        self.styles.first()
    }

    /// Validate model invariants; an empty list means ready to
    /// render/save.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        validate(self)
    }

    /// Serialize back to script text. See [`serialize`] for the
    /// round-trip guarantees.
    #[must_use]
    pub fn to_text(&self) -> String {
        serialize(self)
    }
}
