//! The editing session: a state machine over one caption document.
//!
//! `EditSession` owns its [`CaptionDocument`] exclusively. Every
//! mutation flows through [`EditSession::apply`], which re-establishes
//! the model invariants (dense indices, minimum duration, consistent
//! `text`/`plain_text`) before returning. Hosts read the document back
//! through [`EditSession::document`] and re-render.

use reelsub_core::document::{Caption, CaptionDocument};
use reelsub_core::tags;

use crate::commands::{EditAction, Outcome, StyleField};
use crate::core::{EditorError, Result};

/// Minimum caption duration in seconds. Retiming and splitting never
/// produce a caption shorter than this.
pub const MIN_GAP: f64 = 0.1;

/// Default duration of a freshly added caption, in seconds.
const ADD_TARGET: f64 = 1.0;

/// Shortest window an added caption may be clamped down to. When the
/// playable duration leaves less room than this, the floor wins and the
/// caption runs past the end of playback.
const ADD_FLOOR: f64 = 0.5;

/// Interactive editing state over one exclusively-owned document.
#[derive(Debug, Clone)]
pub struct EditSession {
    document: CaptionDocument,
    selected: Option<usize>,
    playable_duration: Option<f64>,
    dirty: bool,
}

impl EditSession {
    /// Start a session over a document, with nothing selected.
    #[must_use]
    pub fn new(document: CaptionDocument) -> Self {
        Self {
            document,
            selected: None,
            playable_duration: None,
            dirty: false,
        }
    }

    /// Set the companion video's duration, used to clamp end times.
    #[must_use]
    pub fn with_playable_duration(mut self, seconds: f64) -> Self {
        self.playable_duration = Some(seconds);
        self
    }

    /// The session's document, for rendering and serialization.
    #[must_use]
    pub fn document(&self) -> &CaptionDocument {
        &self.document
    }

    /// Give the document back, consuming the session.
    #[must_use]
    pub fn into_document(self) -> CaptionDocument {
        self.document
    }

    /// Currently selected caption index, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the document has unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the host persists the document.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Apply one editing action atomically.
    ///
    /// On success the document satisfies all model invariants; on error
    /// nothing was changed.
    pub fn apply(&mut self, action: EditAction) -> Result<Outcome> {
        match action {
            EditAction::Select(index) => self.select(index),
            EditAction::Add => self.add(),
            EditAction::DeleteSelected => self.delete_selected(),
            EditAction::SplitSelected { at } => self.split_selected(at),
            EditAction::MergeSelected => self.merge_selected(),
            EditAction::Retime { index, start, end } => self.retime(index, start, end),
            EditAction::SetPlainText { index, text } => self.set_plain_text(index, &text),
            EditAction::SetOverrides { index, overrides } => self.set_overrides(index, &overrides),
            EditAction::SetStyleField { style, field } => self.set_style_field(&style, field),
        }
    }

    fn select(&mut self, index: Option<usize>) -> Result<Outcome> {
        if let Some(idx) = index {
            self.check_index(idx)?;
        }
        self.selected = index;
        Ok(Outcome::Selected(index))
    }

    fn add(&mut self) -> Result<Outcome> {
        let captions = &self.document.captions;
        let insert_at = self.selected.map_or(captions.len(), |i| i + 1);
        let template = self
            .selected
            .and_then(|i| captions.get(i))
            .or_else(|| captions.first())
            .cloned();
        let anchor = match self.selected {
            Some(i) => captions[i].end,
            None => captions.last().map_or(0.0, |c| c.end),
        };

        let mut caption = Caption::default();
        if let Some(t) = &template {
            caption.style = t.style.clone();
            caption.layer = t.layer;
            caption.margin_l = t.margin_l;
            caption.margin_r = t.margin_r;
            caption.margin_v = t.margin_v;
        } else if let Some(style) = self.document.default_style() {
            // No caption to inherit from: reference whatever style the
            // table actually holds, not a hard-coded name.
            caption.style = style.name.clone();
        }
        caption.start = anchor;
        caption.end = anchor + ADD_TARGET;
        if let Some(limit) = self.playable_duration {
            if caption.end > limit {
                caption.end = limit.max(anchor + ADD_FLOOR);
            }
        }

        self.document.captions.insert(insert_at, caption);
        self.reindex();
        self.selected = Some(insert_at);
        self.dirty = true;
        Ok(Outcome::Inserted(insert_at))
    }

    fn delete_selected(&mut self) -> Result<Outcome> {
        let index = self.selected.ok_or(EditorError::NoSelection)?;
        self.check_index(index)?;

        self.document.captions.remove(index);
        self.reindex();
        let len = self.document.captions.len();
        self.selected = if len == 0 {
            None
        } else {
            Some(index.min(len - 1))
        };
        self.dirty = true;
        Ok(Outcome::Removed(index))
    }

    fn split_selected(&mut self, at: f64) -> Result<Outcome> {
        let index = self.selected.ok_or(EditorError::NoSelection)?;
        self.check_index(index)?;

        let original = self.document.captions[index].clone();
        if original.duration() < 2.0 * MIN_GAP {
            // Both halves must reach MIN_GAP; too short to split.
            return Ok(Outcome::Noop);
        }
        let mut split_at = at;
        if split_at < original.start + MIN_GAP || split_at > original.end - MIN_GAP {
            split_at = (original.start + original.end) / 2.0;
        }
        let (first_text, second_text) = partition_plain(&original.plain_text);

        let first = &mut self.document.captions[index];
        first.end = split_at;
        first.set_plain_text(&first_text);

        let mut second = original;
        second.start = split_at;
        second.set_plain_text(&second_text);
        self.document.captions.insert(index + 1, second);

        self.reindex();
        self.selected = Some(index + 1);
        self.dirty = true;
        Ok(Outcome::Split(index + 1))
    }

    fn merge_selected(&mut self) -> Result<Outcome> {
        let index = self.selected.ok_or(EditorError::NoSelection)?;
        self.check_index(index)?;
        if index + 1 >= self.document.captions.len() {
            return Ok(Outcome::Noop);
        }

        let follower = self.document.captions.remove(index + 1);
        let joined = join_plain(&self.document.captions[index].plain_text, &follower.plain_text);
        let caption = &mut self.document.captions[index];
        caption.end = follower.end;
        caption.set_plain_text(&joined);

        self.reindex();
        self.dirty = true;
        Ok(Outcome::Merged(index))
    }

    fn retime(&mut self, index: usize, start: Option<f64>, end: Option<f64>) -> Result<Outcome> {
        self.check_index(index)?;
        let caption = &self.document.captions[index];

        let mut new_start = start.unwrap_or(caption.start).max(0.0);
        let mut new_end = end.unwrap_or(caption.end);
        if let Some(limit) = self.playable_duration {
            new_end = new_end.min(limit);
        }

        // Too narrow: push the boundary the user did not move. When both
        // moved at once, start wins and end gives way.
        if new_end - new_start < MIN_GAP {
            if end.is_some() && start.is_none() {
                new_start = (new_end - MIN_GAP).max(0.0);
                new_end = new_end.max(new_start + MIN_GAP);
            } else {
                new_end = new_start + MIN_GAP;
                if let Some(limit) = self.playable_duration {
                    if new_end > limit {
                        // The gap invariant beats the playable clamp.
                        new_end = limit.max(MIN_GAP);
                        new_start = new_end - MIN_GAP;
                    }
                }
            }
        }

        let caption = &mut self.document.captions[index];
        caption.start = new_start;
        caption.end = new_end;
        self.dirty = true;
        Ok(Outcome::Updated(index))
    }

    fn set_plain_text(&mut self, index: usize, text: &str) -> Result<Outcome> {
        self.check_index(index)?;
        self.document.captions[index].set_plain_text(text);
        self.dirty = true;
        Ok(Outcome::Updated(index))
    }

    fn set_overrides(&mut self, index: usize, overrides: &tags::Overrides) -> Result<Outcome> {
        self.check_index(index)?;
        let caption = &mut self.document.captions[index];
        let rewritten = tags::set_overrides(&caption.text, overrides);
        caption.set_text(rewritten);
        self.dirty = true;
        Ok(Outcome::Updated(index))
    }

    fn set_style_field(&mut self, name: &str, field: StyleField) -> Result<Outcome> {
        let style = self
            .document
            .style_mut(name)
            .ok_or_else(|| EditorError::UnknownStyle {
                name: name.to_owned(),
            })?;
        match field {
            StyleField::Fontname(v) => style.fontname = v,
            StyleField::Fontsize(v) => style.fontsize = v,
            StyleField::PrimaryColour(v) => style.primary_colour = v,
            StyleField::SecondaryColour(v) => style.secondary_colour = v,
            StyleField::OutlineColour(v) => style.outline_colour = v,
            StyleField::BackColour(v) => style.back_colour = v,
            StyleField::Bold(v) => style.bold = v,
            StyleField::Italic(v) => style.italic = v,
            StyleField::Alignment(v) => style.alignment = v,
            StyleField::MarginL(v) => style.margin_l = v,
            StyleField::MarginR(v) => style.margin_r = v,
            StyleField::MarginV(v) => style.margin_v = v,
            StyleField::Outline(v) => style.outline = v,
            StyleField::Shadow(v) => style.shadow = v,
        }
        self.dirty = true;
        Ok(Outcome::StyleUpdated)
    }

    /// Reassign dense zero-based indices. Called inside every structural
    /// mutation, never left to the caller.
    fn reindex(&mut self) {
        for (i, caption) in self.document.captions.iter_mut().enumerate() {
            caption.index = i;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.document.captions.len();
        if index < len {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfBounds { index, len })
        }
    }
}

/// Split plain text for a caption split: at the midpoint word index, or
/// for a single word at its character midpoint.
fn partition_plain(plain: &str) -> (String, String) {
    let words: Vec<&str> = plain.split_whitespace().collect();
    match words.len() {
        0 => (String::new(), String::new()),
        1 => {
            let word = words[0];
            let mid = word.chars().count() / 2;
            let byte = word
                .char_indices()
                .nth(mid)
                .map_or(word.len(), |(i, _)| i);
            (word[..byte].to_owned(), word[byte..].to_owned())
        }
        n => {
            let mid = n.div_ceil(2);
            (words[..mid].join(" "), words[mid..].join(" "))
        }
    }
}

/// Join two plain texts with a single space, tolerating empty halves.
fn join_plain(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_owned(),
        (_, true) => a.to_owned(),
        _ => format!("{a} {b}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reelsub_core::document::Style;

    fn caption(index: usize, start: f64, end: f64, text: &str) -> Caption {
        let mut c = Caption {
            index,
            start,
            end,
            ..Caption::default()
        };
        c.set_text(text);
        c
    }

    fn session(n: usize) -> EditSession {
        let captions = (0..n)
            .map(|i| caption(i, i as f64, i as f64 + 1.0, &format!("Caption {i}")))
            .collect();
        EditSession::new(CaptionDocument {
            styles: vec![Style::default()],
            captions,
            ..CaptionDocument::default()
        })
    }

    fn assert_invariants(session: &EditSession) {
        for (i, c) in session.document().captions.iter().enumerate() {
            assert_eq!(c.index, i);
            assert!(c.end > c.start, "caption {i} has non-positive duration");
        }
        if let Some(sel) = session.selected() {
            assert!(sel < session.document().captions.len());
        }
    }

    #[test]
    fn select_changes_nothing_but_selection() {
        let mut s = session(3);
        let outcome = s.apply(EditAction::Select(Some(1))).unwrap();
        assert_eq!(outcome, Outcome::Selected(Some(1)));
        assert_eq!(s.selected(), Some(1));
        assert!(!s.is_dirty());

        s.apply(EditAction::Select(None)).unwrap();
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn select_out_of_bounds_fails() {
        let mut s = session(2);
        assert_eq!(
            s.apply(EditAction::Select(Some(5))),
            Err(EditorError::IndexOutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn add_after_selection_inherits_and_selects() {
        let mut s = session(3);
        s.document.captions[1].style = "Alt".into();
        s.document.captions[1].layer = 2;
        s.document.styles.push(Style {
            name: "Alt".into(),
            ..Style::default()
        });
        s.apply(EditAction::Select(Some(1))).unwrap();

        let outcome = s.apply(EditAction::Add).unwrap();
        assert_eq!(outcome, Outcome::Inserted(2));
        assert_eq!(s.selected(), Some(2));
        assert!(s.is_dirty());

        let added = &s.document().captions[2];
        assert_eq!(added.style, "Alt");
        assert_eq!(added.layer, 2);
        assert!((added.start - 2.0).abs() < 1e-9);
        assert!((added.end - 3.0).abs() < 1e-9);
        assert_invariants(&s);
    }

    #[test]
    fn add_without_selection_appends() {
        let mut s = session(2);
        s.apply(EditAction::Add).unwrap();
        let added = s.document().captions.last().unwrap();
        assert!((added.start - 2.0).abs() < 1e-9);
        assert_eq!(s.selected(), Some(2));
        assert_invariants(&s);
    }

    #[test]
    fn add_to_empty_document_starts_at_zero() {
        let mut s = session(0);
        s.apply(EditAction::Add).unwrap();
        let added = &s.document().captions[0];
        assert!((added.start - 0.0).abs() < 1e-9);
        assert!((added.end - 1.0).abs() < 1e-9);
        assert_eq!(added.style, "Default");
    }

    #[test]
    fn add_to_empty_document_uses_first_style() {
        let mut s = EditSession::new(CaptionDocument {
            styles: vec![Style {
                name: "Title".into(),
                ..Style::default()
            }],
            ..CaptionDocument::default()
        });
        s.apply(EditAction::Add).unwrap();
        let added = &s.document().captions[0];
        assert_eq!(added.style, "Title");
        assert!(s.document().style(&added.style).is_some());
    }

    #[test]
    fn add_clamps_to_playable_duration_with_floor() {
        let mut s = session(2).with_playable_duration(2.8);
        s.apply(EditAction::Add).unwrap();
        assert!((s.document().captions[2].end - 2.8).abs() < 1e-9);

        // Not enough room: the half-second floor wins over the clamp.
        let mut s = session(2).with_playable_duration(2.1);
        s.apply(EditAction::Add).unwrap();
        assert!((s.document().captions[2].end - 2.5).abs() < 1e-9);
    }

    #[test]
    fn delete_selects_nearest_position() {
        let mut s = session(3);
        s.apply(EditAction::Select(Some(1))).unwrap();
        s.apply(EditAction::DeleteSelected).unwrap();
        assert_eq!(s.document().captions.len(), 2);
        assert_eq!(s.selected(), Some(1));
        assert_eq!(s.document().captions[1].plain_text, "Caption 2");
        assert_invariants(&s);

        // Deleting the tail moves the selection back.
        s.apply(EditAction::DeleteSelected).unwrap();
        assert_eq!(s.selected(), Some(0));

        s.apply(EditAction::DeleteSelected).unwrap();
        assert_eq!(s.selected(), None);
        assert!(s.document().captions.is_empty());
    }

    #[test]
    fn delete_without_selection_fails() {
        let mut s = session(1);
        assert_eq!(
            s.apply(EditAction::DeleteSelected),
            Err(EditorError::NoSelection)
        );
    }

    #[test]
    fn split_partitions_words_and_selects_second() {
        let mut s = session(0);
        s.document.captions.push(caption(0, 0.0, 2.0, "one two three four"));
        s.apply(EditAction::Select(Some(0))).unwrap();

        let outcome = s.apply(EditAction::SplitSelected { at: 1.5 }).unwrap();
        assert_eq!(outcome, Outcome::Split(1));
        assert_eq!(s.selected(), Some(1));

        let captions = &s.document().captions;
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].plain_text, "one two");
        assert_eq!(captions[1].plain_text, "three four");
        assert!((captions[0].end - 1.5).abs() < 1e-9);
        assert!((captions[1].start - 1.5).abs() < 1e-9);
        assert!((captions[1].end - 2.0).abs() < 1e-9);
        assert_invariants(&s);
    }

    #[test]
    fn split_near_boundary_falls_back_to_midpoint() {
        let mut s = session(1);
        s.apply(EditAction::Select(Some(0))).unwrap();
        // 0.05 is within MIN_GAP of the 0.0 start.
        s.apply(EditAction::SplitSelected { at: 0.05 }).unwrap();
        assert!((s.document().captions[0].end - 0.5).abs() < 1e-9);
    }

    #[test]
    fn split_too_short_is_noop() {
        let mut s = session(0);
        s.document.captions.push(caption(0, 0.0, 0.15, "tiny"));
        s.apply(EditAction::Select(Some(0))).unwrap();
        assert_eq!(
            s.apply(EditAction::SplitSelected { at: 0.08 }).unwrap(),
            Outcome::Noop
        );
        assert_eq!(s.document().captions.len(), 1);
        assert!((s.document().captions[0].end - 0.15).abs() < 1e-9);
    }

    #[test]
    fn split_single_word_at_character_midpoint() {
        let mut s = session(0);
        s.document.captions.push(caption(0, 0.0, 1.0, "Wonderful"));
        s.apply(EditAction::Select(Some(0))).unwrap();
        s.apply(EditAction::SplitSelected { at: 0.5 }).unwrap();
        assert_eq!(s.document().captions[0].plain_text, "Wond");
        assert_eq!(s.document().captions[1].plain_text, "erful");
    }

    #[test]
    fn merge_joins_with_single_space_and_extends_end() {
        let mut s = session(3);
        s.apply(EditAction::Select(Some(0))).unwrap();
        let outcome = s.apply(EditAction::MergeSelected).unwrap();
        assert_eq!(outcome, Outcome::Merged(0));

        let captions = &s.document().captions;
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].plain_text, "Caption 0 Caption 1");
        assert!((captions[0].end - 2.0).abs() < 1e-9);
        assert_invariants(&s);
    }

    #[test]
    fn merge_with_no_follower_is_noop() {
        let mut s = session(2);
        s.apply(EditAction::Select(Some(1))).unwrap();
        assert_eq!(s.apply(EditAction::MergeSelected).unwrap(), Outcome::Noop);
        assert_eq!(s.document().captions.len(), 2);
    }

    #[test]
    fn split_then_merge_restores_timing_and_spaced_text() {
        let mut s = session(0);
        s.document.captions.push(caption(0, 1.0, 3.0, "hello brave world"));
        s.apply(EditAction::Select(Some(0))).unwrap();
        s.apply(EditAction::SplitSelected { at: 2.0 }).unwrap();
        let first_half = s.document().captions[0].plain_text.clone();
        let second_half = s.document().captions[1].plain_text.clone();

        s.apply(EditAction::Select(Some(0))).unwrap();
        s.apply(EditAction::MergeSelected).unwrap();

        let merged = &s.document().captions[0];
        assert!((merged.start - 1.0).abs() < 1e-9);
        assert!((merged.end - 3.0).abs() < 1e-9);
        assert_eq!(merged.plain_text, format!("{first_half} {second_half}"));
    }

    #[test]
    fn retime_clamps_and_pushes_other_boundary() {
        let mut s = session(1);

        // Negative start clamps to zero.
        s.apply(EditAction::Retime {
            index: 0,
            start: Some(-5.0),
            end: None,
        })
        .unwrap();
        assert!((s.document().captions[0].start - 0.0).abs() < 1e-9);

        // Dragging start past end pushes end forward.
        s.apply(EditAction::Retime {
            index: 0,
            start: Some(3.0),
            end: None,
        })
        .unwrap();
        let c = &s.document().captions[0];
        assert!((c.start - 3.0).abs() < 1e-9);
        assert!((c.end - 3.1).abs() < 1e-9);

        // Dragging end before start pushes start back.
        s.apply(EditAction::Retime {
            index: 0,
            start: None,
            end: Some(1.0),
        })
        .unwrap();
        let c = &s.document().captions[0];
        assert!((c.end - 1.0).abs() < 1e-9);
        assert!((c.start - 0.9).abs() < 1e-9);
        assert_invariants(&s);
    }

    #[test]
    fn retime_end_clamps_to_playable_duration() {
        let mut s = session(1).with_playable_duration(5.0);
        s.apply(EditAction::Retime {
            index: 0,
            start: None,
            end: Some(99.0),
        })
        .unwrap();
        assert!((s.document().captions[0].end - 5.0).abs() < 1e-9);
    }

    #[test]
    fn retime_out_of_bounds_fails() {
        let mut s = session(1);
        assert_eq!(
            s.apply(EditAction::Retime {
                index: 3,
                start: None,
                end: None,
            }),
            Err(EditorError::IndexOutOfBounds { index: 3, len: 1 })
        );
    }

    #[test]
    fn set_plain_text_keeps_fields_in_sync() {
        let mut s = session(0);
        s.document
            .captions
            .push(caption(0, 0.0, 1.0, "{\\an8}{\\k50}Old {\\k30}text"));
        s.apply(EditAction::SetPlainText {
            index: 0,
            text: "New text".into(),
        })
        .unwrap();
        let c = &s.document().captions[0];
        assert_eq!(c.plain_text, "New text");
        // Placement survives the rewrite, karaoke does not.
        assert_eq!(c.text, "{\\an8}New text");
        assert!(s.is_dirty());
    }

    #[test]
    fn set_overrides_rewrites_prefix() {
        let mut s = session(1);
        s.apply(EditAction::SetOverrides {
            index: 0,
            overrides: tags::Overrides {
                alignment: Some(8),
                position: Some((540.0, 200.0)),
            },
        })
        .unwrap();
        let c = &s.document().captions[0];
        assert!(c.text.starts_with("{\\an8\\pos(540,200)}"));
        assert_eq!(c.plain_text, "Caption 0");
    }

    #[test]
    fn set_style_field_replaces_one_field() {
        let mut s = session(1);
        s.apply(EditAction::SetStyleField {
            style: "Default".into(),
            field: StyleField::Fontsize(64.0),
        })
        .unwrap();
        assert!((s.document().styles[0].fontsize - 64.0).abs() < f32::EPSILON);

        assert_eq!(
            s.apply(EditAction::SetStyleField {
                style: "Missing".into(),
                field: StyleField::Bold(true),
            }),
            Err(EditorError::UnknownStyle {
                name: "Missing".into()
            })
        );
    }
}
