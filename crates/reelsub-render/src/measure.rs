//! Text measurement seam.
//!
//! The engine never shapes or rasterizes text itself: the host hands it
//! a [`TextMeasurer`] the same way it hands it a drawing surface. For
//! headless use and tests, [`HeuristicMeasurer`] gives deterministic
//! numbers from character counts alone.

use crate::style::EffectiveStyle;

/// Measured extent of one text run, in script-space pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// Host-provided measurement of text under an effective style.
///
/// Implementations must be pure: the same text and style always yield
/// the same metrics within a frame.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &EffectiveStyle) -> TextMetrics;
}

/// Deterministic character-count measurer for headless layout.
///
/// Width is `chars * font_size * glyph_aspect * scale_x` plus spacing;
/// height is `font_size * line_height * scale_y`. Coarse, but monotone
/// in text length and stable, which is all layout tests need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicMeasurer {
    /// Average glyph width as a fraction of the font size.
    pub glyph_aspect: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self {
            glyph_aspect: 0.55,
            line_height: 1.2,
        }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, style: &EffectiveStyle) -> TextMetrics {
        let chars = text.chars().count() as f32;
        let glyph = style.font_size * self.glyph_aspect * style.scale_x;
        TextMetrics {
            width: chars * (glyph + style.spacing),
            height: style.font_size * self.line_height * style.scale_y,
        }
    }
}
