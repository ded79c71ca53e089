//! Line-by-line caption script parser.
//!
//! Scans the input once, tracking a current section selected by
//! bracketed headers. Three sections are recognized: script metadata
//! (`key: value` pairs), the style table and the event table (both
//! `Format:`-headed positional tables, decoded through
//! [`schema::FieldMap`]). Comment lines and blanks are skipped in every
//! section; unknown sections are skipped with a recorded warning.
//!
//! Structural problems (empty input, empty tables, field-count
//! mismatches) are fatal [`ParseError`]s carrying line and section
//! context. Oddities the document can survive (unknown section, unknown
//! event type) accumulate as [`ParseIssue`]s on the result.

use super::errors::{ParseError, ParseIssue};
use super::schema::{self, FieldMap, Row};
use super::{Caption, CaptionDocument, ScriptMetadata, Style};
use crate::tags;

/// Section the line scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Info,
    Styles,
    Events,
    Unknown,
}

const STYLES_SECTION: &str = "V4+ Styles";
const EVENTS_SECTION: &str = "Events";

/// Parse raw script text into a [`CaptionDocument`].
///
/// # Errors
///
/// Returns [`ParseError`] when the input is empty, either table yields
/// zero entries, or a data line cannot be decomposed into its declared
/// field count. Errors carry the line number and section name.
pub fn parse(source: &str) -> Result<CaptionDocument, ParseError> {
    let source = source.trim_start_matches('\u{FEFF}');
    if source.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut metadata = ScriptMetadata::new();
    let mut styles: Vec<Style> = Vec::new();
    let mut captions: Vec<Caption> = Vec::new();
    let mut issues: Vec<ParseIssue> = Vec::new();

    let mut section = Section::None;
    let mut styles_map: Option<FieldMap> = None;
    let mut events_map: Option<FieldMap> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with("!:") {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim();
            section = match name {
                "Script Info" => Section::Info,
                "V4+ Styles" | "V4 Styles" | "Styles" => Section::Styles,
                "Events" => Section::Events,
                _ => {
                    issues.push(ParseIssue::warning(
                        format!("unknown section [{name}], skipping"),
                        line_no,
                    ));
                    Section::Unknown
                }
            };
            continue;
        }

        match section {
            Section::None => {
                issues.push(ParseIssue::warning(
                    "data before any section header",
                    line_no,
                ));
            }
            Section::Unknown => {}
            Section::Info => {
                if let Some(colon) = line.find(':') {
                    metadata.set(line[..colon].trim(), line[colon + 1..].trim());
                } else {
                    issues.push(ParseIssue::warning("metadata line without ':'", line_no));
                }
            }
            Section::Styles => {
                if let Some(body) = line.strip_prefix("Format:") {
                    styles_map = Some(FieldMap::from_header(body, None));
                } else if let Some(body) = line.strip_prefix("Style:") {
                    let map = styles_map
                        .get_or_insert_with(|| canonical_map(schema::STYLE_FORMAT, None));
                    styles.push(parse_style_line(map, body.trim(), line_no)?);
                } else {
                    issues.push(ParseIssue::warning("unrecognized style line", line_no));
                }
            }
            Section::Events => {
                if let Some(body) = line.strip_prefix("Format:") {
                    events_map = Some(FieldMap::from_header(body, Some("Text")));
                } else if let Some(colon) = line.find(':') {
                    let kind = line[..colon].trim();
                    let body = &line[colon + 1..];
                    match kind {
                        "Dialogue" => {
                            let map = events_map.get_or_insert_with(|| {
                                canonical_map(schema::EVENT_FORMAT, Some("Text"))
                            });
                            captions.push(parse_event_line(map, body.trim_start(), line_no)?);
                        }
                        // Comment events are not captions; dropped like
                        // any other comment line.
                        "Comment" => {}
                        _ => {
                            issues.push(ParseIssue::warning(
                                format!("unknown event type '{kind}', skipping"),
                                line_no,
                            ));
                        }
                    }
                } else {
                    issues.push(ParseIssue::warning("unrecognized event line", line_no));
                }
            }
        }
    }

    if styles.is_empty() {
        return Err(ParseError::NoStyles);
    }
    if captions.is_empty() {
        return Err(ParseError::NoCaptions);
    }

    for (index, caption) in captions.iter_mut().enumerate() {
        caption.index = index;
    }

    Ok(CaptionDocument {
        metadata,
        styles,
        captions,
        issues,
    })
}

/// Fallback map in canonical schema order, for tables whose `Format:`
/// header is missing.
fn canonical_map(format: &[schema::FieldSpec], trailing: Option<&str>) -> FieldMap {
    let names: Vec<&str> = format.iter().map(|f| f.name).collect();
    FieldMap::from_header(&names.join(","), trailing)
}

fn parse_style_line(map: &FieldMap, body: &str, line_no: usize) -> Result<Style, ParseError> {
    let row = Row::new(map, body).ok_or_else(|| ParseError::FieldCountMismatch {
        section: STYLES_SECTION.into(),
        line: line_no,
        expected: map.len(),
        found: Row::found_fields(body),
    })?;
    let field_err = |field: &str, e: crate::utils::CoreError| ParseError::InvalidField {
        section: STYLES_SECTION.into(),
        line: line_no,
        field: field.into(),
        reason: e.to_string(),
    };

    Ok(Style {
        name: row.text("Name"),
        fontname: row.text("Fontname"),
        fontsize: row.float("Fontsize").map_err(|e| field_err("Fontsize", e))?,
        primary_colour: row.text("PrimaryColour"),
        secondary_colour: row.text("SecondaryColour"),
        outline_colour: row.text("OutlineColour"),
        back_colour: row.text("BackColour"),
        bold: row.flag("Bold").map_err(|e| field_err("Bold", e))?,
        italic: row.flag("Italic").map_err(|e| field_err("Italic", e))?,
        underline: row.flag("Underline").map_err(|e| field_err("Underline", e))?,
        strikeout: row.flag("StrikeOut").map_err(|e| field_err("StrikeOut", e))?,
        scale_x: row.float("ScaleX").map_err(|e| field_err("ScaleX", e))?,
        scale_y: row.float("ScaleY").map_err(|e| field_err("ScaleY", e))?,
        spacing: row.float("Spacing").map_err(|e| field_err("Spacing", e))?,
        angle: row.float("Angle").map_err(|e| field_err("Angle", e))?,
        border_style: row
            .int("BorderStyle")
            .map_err(|e| field_err("BorderStyle", e))?,
        outline: row.float("Outline").map_err(|e| field_err("Outline", e))?,
        shadow: row.float("Shadow").map_err(|e| field_err("Shadow", e))?,
        alignment: match row.int("Alignment").map_err(|e| field_err("Alignment", e))? {
            a @ 1..=9 => a as u8,
            // Out-of-range codes fall back to bottom-centre.
            _ => 2,
        },
        margin_l: row.int("MarginL").map_err(|e| field_err("MarginL", e))?,
        margin_r: row.int("MarginR").map_err(|e| field_err("MarginR", e))?,
        margin_v: row.int("MarginV").map_err(|e| field_err("MarginV", e))?,
        encoding: row.int("Encoding").map_err(|e| field_err("Encoding", e))?,
    })
}

fn parse_event_line(map: &FieldMap, body: &str, line_no: usize) -> Result<Caption, ParseError> {
    let row = Row::new(map, body).ok_or_else(|| ParseError::FieldCountMismatch {
        section: EVENTS_SECTION.into(),
        line: line_no,
        expected: map.len(),
        found: Row::found_fields(body),
    })?;
    let field_err = |field: &str, e: crate::utils::CoreError| ParseError::InvalidField {
        section: EVENTS_SECTION.into(),
        line: line_no,
        field: field.into(),
        reason: e.to_string(),
    };

    let text = row.text("Text");
    let plain_text = tags::strip_tags(&text);

    Ok(Caption {
        index: 0, // densely assigned once the full list is known
        layer: row.int("Layer").map_err(|e| field_err("Layer", e))?,
        start: row.time("Start").map_err(|e| field_err("Start", e))?,
        end: row.time("End").map_err(|e| field_err("End", e))?,
        style: row.text("Style"),
        name: row.text("Name"),
        effect: row.text("Effect"),
        margin_l: row.int("MarginL").map_err(|e| field_err("MarginL", e))?,
        margin_r: row.int("MarginR").map_err(|e| field_err("MarginR", e))?,
        margin_v: row.int("MarginV").map_err(|e| field_err("MarginV", e))?,
        text,
        plain_text,
    })
}
