//! Active-caption resolution: which captions are on screen at a time.

use reelsub_core::document::{Caption, CaptionDocument};

/// All captions covering `time` (`start <= time < end`), sorted by
/// `layer` so callers can paint them back-to-front. Captions on the same
/// layer keep document order.
#[must_use]
pub fn active_captions(doc: &CaptionDocument, time: f64) -> Vec<&Caption> {
    let mut active: Vec<&Caption> = doc.captions.iter().filter(|c| c.contains(time)).collect();
    active.sort_by_key(|c| c.layer);
    active
}

/// The single caption covering `time`, when the host only shows one.
/// With overlapping layers this is the lowest layer's first match.
#[must_use]
pub fn resolve(doc: &CaptionDocument, time: f64) -> Option<&Caption> {
    active_captions(doc, time).into_iter().next()
}
