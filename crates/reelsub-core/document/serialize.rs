//! Caption document serializer.
//!
//! Emits metadata, the style table and the event table in one fixed,
//! canonical field order (the [`schema`] tables), writing each caption's
//! raw tagged `text`. Output is not byte-identical to arbitrary input —
//! field order is normalized and a provenance comment is added — but
//! parsing it back reproduces the same styles, captions, timing and
//! text.

use super::schema::{self, FieldSpec};
use super::{Caption, CaptionDocument, Style};
use crate::utils::{format_timecode, seconds_to_cs};

/// Serialize a document back to script text.
#[must_use]
pub fn serialize(doc: &CaptionDocument) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("; Script generated by reelsub\n");
    for (key, value) in doc.metadata.iter() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("[V4+ Styles]\n");
    out.push_str(&schema::format_line(schema::STYLE_FORMAT));
    out.push('\n');
    for style in &doc.styles {
        out.push_str("Style: ");
        out.push_str(&encode_row(schema::STYLE_FORMAT, |name| {
            style_field(style, name)
        }));
        out.push('\n');
    }
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str(&schema::format_line(schema::EVENT_FORMAT));
    out.push('\n');
    for caption in &doc.captions {
        out.push_str("Dialogue: ");
        out.push_str(&encode_row(schema::EVENT_FORMAT, |name| {
            caption_field(caption, name)
        }));
        out.push('\n');
    }

    out
}

/// Join one record's field values in schema order.
fn encode_row(format: &[FieldSpec], field_value: impl Fn(&str) -> String) -> String {
    let values: Vec<String> = format.iter().map(|f| field_value(f.name)).collect();
    values.join(",")
}

/// Encode a boolean style flag in wire form.
fn flag(value: bool) -> String {
    if value { "-1".into() } else { "0".into() }
}

/// Encode a float without a redundant fraction (`48` not `48.0`).
fn float(value: f32) -> String {
    if (value - value.round()).abs() < f32::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}

fn style_field(style: &Style, name: &str) -> String {
    match name {
        "Name" => style.name.clone(),
        "Fontname" => style.fontname.clone(),
        "Fontsize" => float(style.fontsize),
        "PrimaryColour" => style.primary_colour.clone(),
        "SecondaryColour" => style.secondary_colour.clone(),
        "OutlineColour" => style.outline_colour.clone(),
        "BackColour" => style.back_colour.clone(),
        "Bold" => flag(style.bold),
        "Italic" => flag(style.italic),
        "Underline" => flag(style.underline),
        "StrikeOut" => flag(style.strikeout),
        "ScaleX" => float(style.scale_x),
        "ScaleY" => float(style.scale_y),
        "Spacing" => float(style.spacing),
        "Angle" => float(style.angle),
        "BorderStyle" => style.border_style.to_string(),
        "Outline" => float(style.outline),
        "Shadow" => float(style.shadow),
        "Alignment" => style.alignment.to_string(),
        "MarginL" => style.margin_l.to_string(),
        "MarginR" => style.margin_r.to_string(),
        "MarginV" => style.margin_v.to_string(),
        "Encoding" => style.encoding.to_string(),
        _ => String::new(),
    }
}

fn caption_field(caption: &Caption, name: &str) -> String {
    match name {
        "Layer" => caption.layer.to_string(),
        "Start" => format_timecode(seconds_to_cs(caption.start)),
        "End" => format_timecode(seconds_to_cs(caption.end)),
        "Style" => caption.style.clone(),
        "Name" => caption.name.clone(),
        "MarginL" => caption.margin_l.to_string(),
        "MarginR" => caption.margin_r.to_string(),
        "MarginV" => caption.margin_v.to_string(),
        "Effect" => caption.effect.clone(),
        "Text" => caption.text.clone(),
        _ => String::new(),
    }
}
