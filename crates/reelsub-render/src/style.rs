//! Effective style resolution: document styles decoded to render-ready
//! values, with per-caption margin overrides and per-run tag overrides
//! merged in.

use reelsub_core::document::{Caption, CaptionDocument, Style};
use reelsub_core::tags::OverrideState;
use reelsub_core::utils::parse_bgr_colour;

use crate::utils::{RenderError, Result};

/// A decoded colour, RGBA byte order.
pub type Rgba = [u8; 4];

/// A style with wire-form fields decoded for rendering: colours as
/// RGBA, margins merged with the caption's overrides.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectiveStyle {
    pub fontname: String,
    /// Font size in script-space pixels.
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    /// Unhighlighted text fill colour.
    pub primary: Rgba,
    /// Karaoke highlight fill colour.
    pub secondary: Rgba,
    /// Outline stroke colour.
    pub outline_colour: Rgba,
    /// Shadow fill colour.
    pub shadow_colour: Rgba,
    /// Outline stroke width in script-space pixels.
    pub outline: f32,
    /// Shadow offset in script-space pixels, both axes.
    pub shadow: f32,
    /// Numpad alignment code, 1-9.
    pub alignment: u8,
    pub margin_l: f32,
    pub margin_r: f32,
    pub margin_v: f32,
    /// Horizontal glyph scale, 1.0 = unscaled.
    pub scale_x: f32,
    /// Vertical glyph scale, 1.0 = unscaled.
    pub scale_y: f32,
    /// Extra inter-character spacing in script-space pixels.
    pub spacing: f32,
}

impl EffectiveStyle {
    /// Decode a document style.
    pub fn from_style(style: &Style) -> Result<Self> {
        Ok(Self {
            fontname: style.fontname.clone(),
            font_size: style.fontsize,
            bold: style.bold,
            italic: style.italic,
            primary: parse_bgr_colour(&style.primary_colour)?,
            secondary: parse_bgr_colour(&style.secondary_colour)?,
            outline_colour: parse_bgr_colour(&style.outline_colour)?,
            shadow_colour: parse_bgr_colour(&style.back_colour)?,
            outline: style.outline,
            shadow: style.shadow,
            alignment: style.alignment,
            margin_l: style.margin_l as f32,
            margin_r: style.margin_r as f32,
            margin_v: style.margin_v as f32,
            scale_x: style.scale_x / 100.0,
            scale_y: style.scale_y / 100.0,
            spacing: style.spacing,
        })
    }

    /// Resolve a caption's style against the document.
    ///
    /// An unresolvable style name falls back to the document's first
    /// style; a document with no styles at all cannot be rendered.
    /// Non-zero caption margins replace the style's.
    pub fn resolve(doc: &CaptionDocument, caption: &Caption) -> Result<Self> {
        let style = doc
            .style(&caption.style)
            .or_else(|| doc.default_style())
            .ok_or(RenderError::NoStyles)?;
        let mut effective = Self::from_style(style)?;
        if caption.margin_l != 0 {
            effective.margin_l = caption.margin_l as f32;
        }
        if caption.margin_r != 0 {
            effective.margin_r = caption.margin_r as f32;
        }
        if caption.margin_v != 0 {
            effective.margin_v = caption.margin_v as f32;
        }
        Ok(effective)
    }

    /// Merge a run's override snapshot on top of this style.
    #[must_use]
    pub fn apply(&self, state: &OverrideState) -> Self {
        let mut merged = self.clone();
        if let Some(size) = state.font_size {
            merged.font_size = size;
        }
        if let Some(colour) = state.primary_colour {
            merged.primary = colour;
        }
        merged
    }
}
