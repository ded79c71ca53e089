//! Pure layout: tagged caption text to positioned runs on a canvas.
//!
//! All math happens in the document's script coordinate space
//! (`PlayResX`/`PlayResY`, defaulting to the canvas size) and is mapped
//! to canvas pixels at the end. Nothing here touches a display; the
//! host's pointer-event translation lives host-side.

use smallvec::SmallVec;

use reelsub_core::document::{Caption, CaptionDocument};
use reelsub_core::tags;

use crate::measure::TextMeasurer;
use crate::style::EffectiveStyle;
use crate::utils::{RenderError, Result};

/// Target surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// One text run with its final canvas position and render-ready style.
///
/// The style's pixel-valued fields (font size, outline, shadow,
/// spacing) are already scaled to canvas space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedRun {
    pub text: String,
    /// Top-left of the run's box, canvas pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: EffectiveStyle,
    /// Karaoke highlight duration, centiseconds.
    pub karaoke_cs: Option<u32>,
}

/// One laid-out line: its runs plus the line box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineLayout {
    pub runs: SmallVec<[PositionedRun; 4]>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A fully laid-out caption: positioned lines plus the block box.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptionLayout {
    pub lines: Vec<LineLayout>,
    /// Block top-left, canvas pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Lay out one caption on the canvas.
///
/// Runs are measured under their merged per-run style, lines are sized
/// and stacked, and the block origin comes from the numpad alignment
/// code anchored at the margins — or, with a position override, at the
/// explicit anchor interpreted per the same alignment code (the anchor
/// is the block's edge/centre, not its top-left).
pub fn layout(
    doc: &CaptionDocument,
    caption: &Caption,
    canvas: CanvasSize,
    measurer: &dyn TextMeasurer,
) -> Result<CaptionLayout> {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return Err(RenderError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        });
    }

    let base = EffectiveStyle::resolve(doc, caption)?;
    let parsed = tags::parse_runs(&caption.text);

    let script_w = doc
        .metadata
        .play_res_x()
        .filter(|v| *v > 0.0)
        .unwrap_or(canvas.width);
    let script_h = doc
        .metadata
        .play_res_y()
        .filter(|v| *v > 0.0)
        .unwrap_or(canvas.height);
    let scale_x = canvas.width / script_w;
    let scale_y = canvas.height / script_h;

    let alignment = parsed.overrides.alignment.unwrap_or(base.alignment);

    // Measure every run in script space, collecting line boxes.
    struct MeasuredLine {
        runs: Vec<(String, EffectiveStyle, f32, f32, Option<u32>)>,
        width: f32,
        height: f32,
    }
    let mut measured: Vec<MeasuredLine> = Vec::with_capacity(parsed.lines.len());
    for line in &parsed.lines {
        let mut runs = Vec::with_capacity(line.len());
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in line {
            let style = base.apply(&run.state);
            let metrics = measurer.measure(&run.text, &style);
            width += metrics.width;
            height = height.max(metrics.height);
            runs.push((
                run.text.clone(),
                style,
                metrics.width,
                metrics.height,
                run.karaoke_cs,
            ));
        }
        if line.is_empty() {
            // A blank line still occupies vertical space.
            height = measurer.measure("", &base).height;
        }
        measured.push(MeasuredLine {
            runs,
            width,
            height,
        });
    }

    let block_w = measured.iter().map(|l| l.width).fold(0.0f32, f32::max);
    let block_h: f32 = measured.iter().map(|l| l.height).sum();

    // Block origin, script space.
    let (block_x, block_y) = if let Some((px, py)) = parsed.overrides.position {
        (
            px - alignment_offset_x(alignment, block_w),
            py - alignment_offset_y(alignment, block_h),
        )
    } else {
        anchor_point(alignment, block_w, block_h, script_w, script_h, &base)
    };

    // Stack lines inside the block, aligning each to the block's column.
    let mut lines = Vec::with_capacity(measured.len());
    let mut cursor_y = block_y;
    for line in measured {
        let line_x = block_x
            + match alignment % 3 {
                1 => 0.0,
                2 => (block_w - line.width) / 2.0,
                // 0: right column (3, 6, 9).
                _ => block_w - line.width,
            };

        let mut runs = SmallVec::new();
        let mut cursor_x = line_x;
        for (text, style, width, height, karaoke_cs) in line.runs {
            runs.push(PositionedRun {
                text,
                x: cursor_x * scale_x,
                y: cursor_y * scale_y,
                width: width * scale_x,
                height: height * scale_y,
                style: scale_style(style, scale_x, scale_y),
                karaoke_cs,
            });
            cursor_x += width;
        }

        lines.push(LineLayout {
            runs,
            x: line_x * scale_x,
            y: cursor_y * scale_y,
            width: line.width * scale_x,
            height: line.height * scale_y,
        });
        cursor_y += line.height;
    }

    Ok(CaptionLayout {
        lines,
        x: block_x * scale_x,
        y: block_y * scale_y,
        width: block_w * scale_x,
        height: block_h * scale_y,
    })
}

/// Map the pixel-valued style fields into canvas space.
fn scale_style(mut style: EffectiveStyle, scale_x: f32, scale_y: f32) -> EffectiveStyle {
    style.font_size *= scale_y;
    style.outline *= scale_y;
    style.shadow *= scale_y;
    style.spacing *= scale_x;
    style
}

/// Block top-left for margin-anchored placement.
fn anchor_point(
    alignment: u8,
    block_w: f32,
    block_h: f32,
    script_w: f32,
    script_h: f32,
    style: &EffectiveStyle,
) -> (f32, f32) {
    let x = match alignment % 3 {
        1 => style.margin_l,
        2 => (script_w - block_w) / 2.0,
        // 0: right column (3, 6, 9).
        _ => script_w - style.margin_r - block_w,
    };
    let y = match alignment {
        1..=3 => script_h - style.margin_v - block_h,
        4..=6 => (script_h - block_h) / 2.0,
        7..=9 => style.margin_v,
        _ => script_h - style.margin_v - block_h,
    };
    (x, y)
}

/// Horizontal distance from the block's left edge to its anchor.
fn alignment_offset_x(alignment: u8, block_w: f32) -> f32 {
    match alignment % 3 {
        1 => 0.0,
        2 => block_w / 2.0,
        // 0: right column (3, 6, 9).
        _ => block_w,
    }
}

/// Vertical distance from the block's top edge to its anchor.
fn alignment_offset_y(alignment: u8, block_h: f32) -> f32 {
    match alignment {
        1..=3 => block_h,
        4..=6 => block_h / 2.0,
        7..=9 => 0.0,
        _ => block_h,
    }
}
