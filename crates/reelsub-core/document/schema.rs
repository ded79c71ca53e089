//! Declared field schemas for the positional style and event tables.
//!
//! Both tables are CSV-like: a `Format:` header declares field order,
//! then data lines carry positional values. Rather than branching on
//! field names at every call site, the field order and types are data:
//! one ordered table per record type, consumed by a generic split/lookup
//! pair. Format changes are schema edits, not logic edits.

use crate::utils::{self, CoreError};

/// How a positional field value is typed when decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string, kept verbatim (trimmed).
    Text,
    /// Integer value.
    Int,
    /// Floating-point value.
    Float,
    /// Boolean encoded as `0` / `-1` / `1`.
    Flag,
    /// `H:MM:SS.CC` timecode.
    Time,
}

/// One declared field: wire name plus decode type.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Canonical style-table schema, in serialization order.
pub const STYLE_FORMAT: &[FieldSpec] = &[
    field("Name", FieldKind::Text),
    field("Fontname", FieldKind::Text),
    field("Fontsize", FieldKind::Float),
    field("PrimaryColour", FieldKind::Text),
    field("SecondaryColour", FieldKind::Text),
    field("OutlineColour", FieldKind::Text),
    field("BackColour", FieldKind::Text),
    field("Bold", FieldKind::Flag),
    field("Italic", FieldKind::Flag),
    field("Underline", FieldKind::Flag),
    field("StrikeOut", FieldKind::Flag),
    field("ScaleX", FieldKind::Float),
    field("ScaleY", FieldKind::Float),
    field("Spacing", FieldKind::Float),
    field("Angle", FieldKind::Float),
    field("BorderStyle", FieldKind::Int),
    field("Outline", FieldKind::Float),
    field("Shadow", FieldKind::Float),
    field("Alignment", FieldKind::Int),
    field("MarginL", FieldKind::Int),
    field("MarginR", FieldKind::Int),
    field("MarginV", FieldKind::Int),
    field("Encoding", FieldKind::Int),
];

/// Canonical event-table schema, in serialization order. `Text` is last
/// and free-form: it may contain commas, so splitting stops there.
pub const EVENT_FORMAT: &[FieldSpec] = &[
    field("Layer", FieldKind::Int),
    field("Start", FieldKind::Time),
    field("End", FieldKind::Time),
    field("Style", FieldKind::Text),
    field("Name", FieldKind::Text),
    field("MarginL", FieldKind::Int),
    field("MarginR", FieldKind::Int),
    field("MarginV", FieldKind::Int),
    field("Effect", FieldKind::Text),
    field("Text", FieldKind::Text),
];

/// Render a `Format:` header line for a schema.
#[must_use]
pub fn format_line(schema: &[FieldSpec]) -> String {
    let names: Vec<&str> = schema.iter().map(|f| f.name).collect();
    format!("Format: {}", names.join(", "))
}

/// Field order declared by a section's `Format:` header.
///
/// Built once per section, then used to decompose every data line and
/// look fields up by name regardless of the order the file chose.
#[derive(Debug, Clone)]
pub struct FieldMap {
    names: Vec<String>,
    /// Index of the trailing free-form field, when the map declares one.
    trailing_text: Option<usize>,
}

impl FieldMap {
    /// Build a map from the comma-separated body of a `Format:` line.
    ///
    /// `trailing_text_field` names the free-form field (if any) that
    /// absorbs the remainder of each line, commas included.
    #[must_use]
    pub fn from_header(header_body: &str, trailing_text_field: Option<&str>) -> Self {
        let names: Vec<String> = header_body.split(',').map(|s| s.trim().to_owned()).collect();
        let trailing_text = trailing_text_field.and_then(|text_name| {
            names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(text_name))
                // Only the final declared field can absorb commas.
                .filter(|&idx| idx == names.len() - 1)
        });
        Self {
            names,
            trailing_text,
        }
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decompose a data line into exactly `len()` positional values.
    ///
    /// When the map has a trailing free-form field, splitting stops
    /// after `len() - 1` commas and the remainder becomes one value.
    /// Returns `None` when the line yields too few fields.
    #[must_use]
    pub fn split<'l>(&self, line: &'l str) -> Option<Vec<&'l str>> {
        let parts: Vec<&'l str> = if self.trailing_text.is_some() {
            line.splitn(self.len(), ',').collect()
        } else {
            line.split(',').collect()
        };
        (parts.len() == self.len()).then_some(parts)
    }

    /// Look up a positional value by declared field name.
    #[must_use]
    pub fn get<'l>(&self, parts: &[&'l str], name: &str) -> Option<&'l str> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .and_then(|idx| parts.get(idx))
            .map(|s| s.trim())
    }
}

/// One decomposed data line, with kind-aware typed accessors.
///
/// Accessor errors carry the field name so the parser can wrap them with
/// line/section context.
#[derive(Debug)]
pub struct Row<'m, 'l> {
    map: &'m FieldMap,
    parts: Vec<&'l str>,
}

impl<'m, 'l> Row<'m, 'l> {
    /// Decompose `line` under `map`; `None` on a field-count mismatch.
    #[must_use]
    pub fn new(map: &'m FieldMap, line: &'l str) -> Option<Self> {
        let parts = map.split(line)?;
        Some(Self { map, parts })
    }

    /// Number of fields the line actually yielded (for diagnostics).
    #[must_use]
    pub fn found_fields(line: &str) -> usize {
        line.split(',').count()
    }

    /// Text field; missing fields decode as empty.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.map.get(&self.parts, name).unwrap_or("").to_owned()
    }

    /// Integer field; missing fields decode as zero.
    pub fn int(&self, name: &str) -> Result<i32, CoreError> {
        match self.map.get(&self.parts, name) {
            Some(v) if !v.is_empty() => utils::parse_numeric(v),
            _ => Ok(0),
        }
    }

    /// Float field; missing fields decode as zero.
    pub fn float(&self, name: &str) -> Result<f32, CoreError> {
        match self.map.get(&self.parts, name) {
            Some(v) if !v.is_empty() => utils::parse_numeric(v),
            _ => Ok(0.0),
        }
    }

    /// Flag field: `0` is false, anything else (`-1`, `1`) is true.
    pub fn flag(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.int(name)? != 0)
    }

    /// Timecode field, decoded to f64 seconds.
    pub fn time(&self, name: &str) -> Result<f64, CoreError> {
        let raw = self.map.get(&self.parts, name).unwrap_or("");
        Ok(utils::cs_to_seconds(utils::parse_timecode(raw)?))
    }
}
