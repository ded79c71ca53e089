//! # Reelsub Render
//!
//! Karaoke preview renderer for reelsub caption documents: resolves the
//! captions active at a playback time, lays their text runs out on the
//! canvas, and emits an ordered stroke/fill paint plan for the host's
//! 2D drawing surface.
//!
//! The crate is pure computation — it owns no canvas and loads no
//! fonts. Text measurement comes in through the [`TextMeasurer`] trait
//! and drawing goes out as [`PaintPlan`] data, so every stage is
//! testable headless.
//!
//! ## Quick Start
//!
//! ```rust
//! use reelsub_core::document::parse;
//! use reelsub_render::{render_frame, CanvasSize, HeuristicMeasurer};
//!
//! let script_text = r#"
//! [Script Info]
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
//! let plan = render_frame(
//!     &doc,
//!     1.0,
//!     CanvasSize::new(1080.0, 1920.0),
//!     &HeuristicMeasurer::default(),
//! )?;
//! assert!(!plan.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod layout;
pub mod measure;
pub mod paint;
pub mod resolve;
pub mod style;
pub mod utils;

pub use layout::{layout, CanvasSize, CaptionLayout, LineLayout, PositionedRun};
pub use measure::{HeuristicMeasurer, TextMeasurer, TextMetrics};
pub use paint::{paint, FontSpec, PaintOp, PaintPlan};
pub use resolve::{active_captions, resolve};
pub use style::{EffectiveStyle, Rgba};
pub use utils::{RenderError, Result};

use reelsub_core::document::CaptionDocument;

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render one frame: every caption active at `time`, laid out and
/// painted in layer order (lower layers first).
pub fn render_frame(
    doc: &CaptionDocument,
    time: f64,
    canvas: CanvasSize,
    measurer: &dyn TextMeasurer,
) -> Result<PaintPlan> {
    let mut plan = PaintPlan::default();
    for caption in active_captions(doc, time) {
        let laid_out = layout::layout(doc, caption, canvas, measurer)?;
        let elapsed = paint::elapsed_cs(caption.start, time);
        plan.extend(paint::paint(&laid_out, elapsed));
    }
    Ok(plan)
}
