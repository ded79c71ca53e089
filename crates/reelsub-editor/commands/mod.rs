//! The editing action set and its outcomes.
//!
//! Every mutation the host UI can perform is one variant of
//! [`EditAction`], dispatched through `EditSession::apply`. Keeping the
//! action set closed makes the session a real state machine: there is no
//! second mutation path for a caller to forget invariants on.

use reelsub_core::tags::Overrides;

/// One editing action, applied atomically to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Change the selection; never touches document data.
    Select(Option<usize>),
    /// Insert a new caption after the selection (or at the end),
    /// inheriting style, layer and margins; selects the new caption.
    Add,
    /// Remove the selected caption and select its nearest neighbour.
    DeleteSelected,
    /// Split the selected caption at `at` seconds; the split point falls
    /// back to the caption midpoint when `at` is too close to a
    /// boundary. Selects the second half.
    SplitSelected { at: f64 },
    /// Merge the selected caption with the one after it, joining plain
    /// text with a single space. No-op when nothing follows.
    MergeSelected,
    /// Move one or both boundaries of a caption. Out-of-range values are
    /// clamped and the opposite boundary is pushed to keep the minimum
    /// gap; retiming never fails on timing grounds.
    Retime {
        index: usize,
        start: Option<f64>,
        end: Option<f64>,
    },
    /// Replace a caption's editable plain text.
    SetPlainText { index: usize, text: String },
    /// Replace a caption's alignment/position override prefix.
    SetOverrides { index: usize, overrides: Overrides },
    /// Replace one field of a named style.
    SetStyleField { style: String, field: StyleField },
}

/// A single direct style-field replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleField {
    Fontname(String),
    Fontsize(f32),
    PrimaryColour(String),
    SecondaryColour(String),
    OutlineColour(String),
    BackColour(String),
    Bold(bool),
    Italic(bool),
    Alignment(u8),
    MarginL(i32),
    MarginR(i32),
    MarginV(i32),
    Outline(f32),
    Shadow(f32),
}

/// What an applied action did, for host-side feedback (scroll the new
/// caption into view, refresh the style panel, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Selection moved; no data changed.
    Selected(Option<usize>),
    /// A caption was inserted at this index.
    Inserted(usize),
    /// The caption at this index was removed.
    Removed(usize),
    /// A caption was split; the second half sits at this index.
    Split(usize),
    /// The caption at this index absorbed its follower.
    Merged(usize),
    /// Timing, text or overrides changed on this caption.
    Updated(usize),
    /// A style definition changed.
    StyleUpdated,
    /// The action had nothing to do.
    Noop,
}
