//! Paint plan: the layered stroke/fill call list for one frame.
//!
//! The plan mirrors the layering native renderers of the format use —
//! shadow, then outline stroke, then text fill, per run — so the
//! preview visually matches the external compositor that burns the
//! final video.

use reelsub_core::utils::seconds_to_cs;

use crate::layout::CaptionLayout;
use crate::style::{EffectiveStyle, Rgba};

/// Font selection for one draw call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontSpec {
    pub family: String,
    /// Size in canvas pixels.
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    fn from_style(style: &EffectiveStyle) -> Self {
        Self {
            family: style.fontname.clone(),
            size: style.font_size,
            bold: style.bold,
            italic: style.italic,
        }
    }
}

/// One drawing-surface call. Coordinates are the text box's top-left in
/// canvas pixels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaintOp {
    FillText {
        text: String,
        x: f32,
        y: f32,
        colour: Rgba,
        font: FontSpec,
    },
    StrokeText {
        text: String,
        x: f32,
        y: f32,
        colour: Rgba,
        stroke_width: f32,
        font: FontSpec,
    },
}

/// Ordered draw calls for a frame, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaintPlan {
    pub ops: Vec<PaintOp>,
}

impl PaintPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append another plan's calls after this one's.
    pub fn extend(&mut self, other: PaintPlan) {
        self.ops.extend(other.ops);
    }
}

/// Paint one laid-out caption at `elapsed_cs` centiseconds into it.
///
/// A karaoke run is highlighted (filled with the style's karaoke-fill
/// colour) once the elapsed time reaches its cumulative threshold:
/// `elapsed_cs >= cumulative_before + run.karaoke_cs`. Runs without a
/// duration never highlight, and never advance the cumulative clock.
#[must_use]
pub fn paint(layout: &CaptionLayout, elapsed_cs: u32) -> PaintPlan {
    let mut ops = Vec::new();
    let mut cumulative_cs: u32 = 0;

    for line in &layout.lines {
        for run in &line.runs {
            if run.text.is_empty() {
                continue;
            }
            let style = &run.style;
            let font = FontSpec::from_style(style);

            let highlighted = match run.karaoke_cs {
                Some(duration) => {
                    let lit = elapsed_cs >= cumulative_cs + duration;
                    cumulative_cs += duration;
                    lit
                }
                None => false,
            };

            if style.shadow > 0.0 {
                ops.push(PaintOp::FillText {
                    text: run.text.clone(),
                    x: run.x + style.shadow,
                    y: run.y + style.shadow,
                    colour: style.shadow_colour,
                    font: font.clone(),
                });
            }
            if style.outline > 0.0 {
                ops.push(PaintOp::StrokeText {
                    text: run.text.clone(),
                    x: run.x,
                    y: run.y,
                    colour: style.outline_colour,
                    stroke_width: style.outline,
                    font: font.clone(),
                });
            }
            ops.push(PaintOp::FillText {
                text: run.text.clone(),
                x: run.x,
                y: run.y,
                colour: if highlighted {
                    style.secondary
                } else {
                    style.primary
                },
                font,
            });
        }
    }

    PaintPlan { ops }
}

/// Which runs of a karaoke duration sequence are highlighted at
/// `elapsed_cs`. Always a prefix of the sequence.
#[must_use]
pub fn highlighted_prefix(durations: &[u32], elapsed_cs: u32) -> usize {
    let mut cumulative: u32 = 0;
    let mut lit = 0;
    for &duration in durations {
        if elapsed_cs >= cumulative + duration {
            lit += 1;
        } else {
            break;
        }
        cumulative += duration;
    }
    lit
}

/// Elapsed centiseconds into a caption at playback time `time`.
#[must_use]
pub fn elapsed_cs(caption_start: f64, time: f64) -> u32 {
    seconds_to_cs(time - caption_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, CanvasSize};
    use crate::measure::HeuristicMeasurer;
    use pretty_assertions::assert_eq;
    use reelsub_core::document::{Caption, CaptionDocument, Style};

    fn laid_out(text: &str) -> CaptionLayout {
        let doc = CaptionDocument {
            styles: vec![Style::default()],
            ..CaptionDocument::default()
        };
        let mut caption = Caption {
            end: 3.0,
            ..Caption::default()
        };
        caption.set_text(text);
        layout(
            &doc,
            &caption,
            CanvasSize::new(1080.0, 1920.0),
            &HeuristicMeasurer::default(),
        )
        .unwrap()
    }

    fn fill_colours(plan: &PaintPlan) -> Vec<Rgba> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::FillText { colour, text, .. } if !text.trim().is_empty() => Some(*colour),
                _ => None,
            })
            .collect()
    }

    const WHITE: Rgba = [255, 255, 255, 255];
    const YELLOW: Rgba = [255, 255, 0, 255];

    #[test]
    fn layering_is_shadow_stroke_fill() {
        let mut layout = laid_out("Hi");
        // Default style has no shadow; give it one.
        layout.lines[0].runs[0].style.shadow = 2.0;
        let plan = paint(&layout, 0);

        assert_eq!(plan.ops.len(), 3);
        assert!(matches!(plan.ops[0], PaintOp::FillText { .. }));
        assert!(matches!(plan.ops[1], PaintOp::StrokeText { .. }));
        assert!(matches!(plan.ops[2], PaintOp::FillText { .. }));

        // Shadow is offset by its depth.
        let (PaintOp::FillText { x: sx, y: sy, .. }, PaintOp::FillText { x, y, .. }) =
            (&plan.ops[0], &plan.ops[2])
        else {
            unreachable!()
        };
        assert!((sx - (x + 2.0)).abs() < 1e-3);
        assert!((sy - (y + 2.0)).abs() < 1e-3);
    }

    #[test]
    fn karaoke_highlights_at_cumulative_thresholds() {
        let layout = laid_out("{\\k50}This{\\k30}has{\\k40}karaoke");

        // Threshold is cumulative-before plus own duration.
        assert_eq!(fill_colours(&paint(&layout, 0)), [WHITE, WHITE, WHITE]);
        assert_eq!(fill_colours(&paint(&layout, 49)), [WHITE, WHITE, WHITE]);
        assert_eq!(fill_colours(&paint(&layout, 50)), [YELLOW, WHITE, WHITE]);
        assert_eq!(fill_colours(&paint(&layout, 79)), [YELLOW, WHITE, WHITE]);
        assert_eq!(fill_colours(&paint(&layout, 80)), [YELLOW, YELLOW, WHITE]);
        assert_eq!(fill_colours(&paint(&layout, 120)), [YELLOW, YELLOW, YELLOW]);
        assert_eq!(fill_colours(&paint(&layout, 9999)), [YELLOW, YELLOW, YELLOW]);
    }

    #[test]
    fn untimed_runs_never_highlight() {
        let layout = laid_out("{\\k50}sung{\\fs60} plain tail");
        let plan = paint(&layout, 10_000);
        let colours = fill_colours(&plan);
        assert_eq!(colours, [YELLOW, WHITE]);
    }

    #[test]
    fn highlighted_prefix_math() {
        let durations = [50, 30, 40];
        assert_eq!(highlighted_prefix(&durations, 0), 0);
        assert_eq!(highlighted_prefix(&durations, 50), 1);
        assert_eq!(highlighted_prefix(&durations, 79), 1);
        assert_eq!(highlighted_prefix(&durations, 80), 2);
        assert_eq!(highlighted_prefix(&durations, 200), 3);
        assert_eq!(highlighted_prefix(&[], 100), 0);
    }

    #[test]
    fn elapsed_cs_clamps_before_start() {
        assert_eq!(elapsed_cs(2.0, 1.0), 0);
        assert_eq!(elapsed_cs(2.0, 2.75), 75);
    }
}
