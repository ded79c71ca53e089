//! Override-tag micro-language: the `{...}` blocks embedded in caption
//! text that alter rendering state (karaoke timing, alignment, explicit
//! position, font/colour overrides).
//!
//! Three views are derived from tagged text:
//! - [`strip_tags`] — the editable plain-text view
//! - [`parse_runs`] — per-line text runs with override-state snapshots,
//!   the input to karaoke layout/paint
//! - [`rebuild_text`] / [`set_overrides`] — write paths that keep tags
//!   coherent after edits
//!
//! Karaoke timing is attached to the run it highlights, not to the
//! caption: each run lights up independently as playback crosses its
//! cumulative duration threshold.

use crate::utils::parse_bgr_colour;

/// Accumulated forward-going overrides (colour/font). A reset tag (`\r`)
/// clears the whole state.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverrideState {
    /// Font size override in script-space pixels.
    pub font_size: Option<f32>,
    /// Primary text colour override, RGBA.
    pub primary_colour: Option<[u8; 4]>,
}

impl OverrideState {
    /// Whether no override is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none() && self.primary_colour.is_none()
    }
}

/// Caption-level one-shot overrides: alignment and explicit position.
///
/// These apply to the whole caption block, unlike [`OverrideState`]
/// which is per-run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Overrides {
    /// Numpad alignment code (1-9) from `\an` (or legacy `\a`).
    pub alignment: Option<u8>,
    /// Explicit anchor in script coordinate space from `\pos(x,y)`.
    pub position: Option<(f32, f32)>,
}

impl Overrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alignment.is_none() && self.position.is_none()
    }
}

/// A run of plain characters sharing one override-state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Override state in effect when the run was flushed.
    pub state: OverrideState,
    /// Karaoke highlight duration attached to this run, centiseconds.
    pub karaoke_cs: Option<u32>,
    /// True for inferred single-space separators inserted between
    /// adjacent runs lacking a natural space boundary. Synthetic runs
    /// never carry karaoke durations.
    pub synthetic: bool,
}

/// Fully decomposed caption text: per-line run groups plus the
/// caption-level overrides found anywhere in the text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedText {
    pub lines: Vec<Vec<TextRun>>,
    pub overrides: Overrides,
}

impl ParsedText {
    /// All runs in caption order, across lines.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.lines.iter().flatten()
    }

    /// Karaoke durations of karaoke-bearing runs, in caption order.
    #[must_use]
    pub fn karaoke_durations(&self) -> Vec<u32> {
        self.runs().filter_map(|r| r.karaoke_cs).collect()
    }
}

/// Remove all override blocks, producing the plain-text view.
///
/// Line-break escapes (`\N`, `\n`) become literal newlines and `\h`
/// becomes a non-breaking space. No spaces are inferred between
/// adjacent tagged words: `{\k50}This{\k30}has` strips to `Thishas`.
/// Idempotent.
#[must_use]
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_block = false;

    while let Some(ch) = chars.next() {
        if in_block {
            if ch == '}' {
                in_block = false;
            }
            continue;
        }
        match ch {
            '{' => in_block = true,
            '\\' => match chars.next() {
                Some('N' | 'n') => out.push('\n'),
                Some('h') => out.push('\u{00A0}'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }

    out
}

/// One parsed tag token from inside an override block.
#[derive(Debug, Clone, PartialEq)]
enum Tag {
    Karaoke(u32),
    Alignment(u8),
    Position(f32, f32),
    FontSize(f32),
    PrimaryColour([u8; 4]),
    Reset,
    Unknown,
}

/// Split an override block body into raw `\tag` tokens.
fn block_tokens(block: &str) -> impl Iterator<Item = &str> {
    block.split('\\').map(str::trim).filter(|t| !t.is_empty())
}

/// Decode a single tag token. Unknown or malformed tags decode as
/// [`Tag::Unknown`] and leave state untouched.
fn parse_tag(token: &str) -> Tag {
    if let Some(rest) = token.strip_prefix("pos") {
        if let Some((x, y)) = parse_pos_args(rest) {
            return Tag::Position(x, y);
        }
        return Tag::Unknown;
    }
    if let Some(rest) = token
        .strip_prefix("kf")
        .or_else(|| token.strip_prefix("ko"))
        .or_else(|| token.strip_prefix('K'))
        .or_else(|| token.strip_prefix('k'))
    {
        if let Ok(duration) = rest.trim().parse::<u32>() {
            return Tag::Karaoke(duration);
        }
        return Tag::Unknown;
    }
    if let Some(rest) = token.strip_prefix("an") {
        if let Ok(align @ 1..=9) = rest.trim().parse::<u8>() {
            return Tag::Alignment(align);
        }
        return Tag::Unknown;
    }
    if let Some(rest) = token.strip_prefix("fs") {
        if let Ok(size) = rest.trim().parse::<f32>() {
            return Tag::FontSize(size);
        }
        return Tag::Unknown;
    }
    if let Some(rest) = token.strip_prefix("1c").or_else(|| token.strip_prefix('c')) {
        if let Ok(colour) = parse_bgr_colour(rest) {
            return Tag::PrimaryColour(colour);
        }
        return Tag::Unknown;
    }
    if let Some(rest) = token.strip_prefix('a') {
        if let Ok(legacy) = rest.trim().parse::<u8>() {
            return Tag::Alignment(convert_legacy_alignment(legacy));
        }
        return Tag::Unknown;
    }
    if token.strip_prefix('r').is_some() {
        // \r or \rStyleName both clear accumulated overrides.
        return Tag::Reset;
    }
    Tag::Unknown
}

/// Parse `(x,y)` position arguments.
fn parse_pos_args(args: &str) -> Option<(f32, f32)> {
    let args = args.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = args.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    parts.next().is_none().then_some((x, y))
}

/// Convert a legacy `\a` alignment code to the numpad convention.
///
/// Legacy codes: 1-3 = left/centre/right on the bottom row, +4 = top,
/// +8 = middle.
#[must_use]
pub fn convert_legacy_alignment(legacy: u8) -> u8 {
    let column = match legacy & 3 {
        1 => 1,
        3 => 3,
        _ => 2,
    };
    let row_offset = if legacy & 8 != 0 {
        3 // middle row: 4-6
    } else if legacy & 4 != 0 {
        6 // top row: 7-9
    } else {
        0 // bottom row: 1-3
    };
    column + row_offset
}

/// Walk tagged text into per-line runs with state snapshots.
///
/// A karaoke tag attaches its duration to the next plain-text run only.
/// Within a line, a synthetic single-space run is inserted between
/// adjacent runs that lack a natural space boundary, so word-level
/// highlighting does not visually merge tokens.
#[must_use]
pub fn parse_runs(text: &str) -> ParsedText {
    let mut parsed = ParsedText {
        lines: vec![Vec::new()],
        ..ParsedText::default()
    };
    let mut state = OverrideState::default();
    let mut pending_karaoke: Option<u32> = None;
    let mut buf = String::new();

    let flush = |lines: &mut Vec<Vec<TextRun>>,
                 buf: &mut String,
                 state: &OverrideState,
                 pending: &mut Option<u32>| {
        if buf.is_empty() {
            return;
        }
        let line = lines.last_mut().expect("line list starts non-empty");
        line.push(TextRun {
            text: core::mem::take(buf),
            state: state.clone(),
            karaoke_cs: pending.take(),
            synthetic: false,
        });
    };

    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                flush(&mut parsed.lines, &mut buf, &state, &mut pending_karaoke);
                let mut block = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    block.push(c);
                }
                for token in block_tokens(&block) {
                    match parse_tag(token) {
                        Tag::Karaoke(cs) => pending_karaoke = Some(cs),
                        Tag::Alignment(a) => parsed.overrides.alignment = Some(a),
                        Tag::Position(x, y) => parsed.overrides.position = Some((x, y)),
                        Tag::FontSize(size) => state.font_size = Some(size),
                        Tag::PrimaryColour(colour) => state.primary_colour = Some(colour),
                        Tag::Reset => state = OverrideState::default(),
                        Tag::Unknown => {}
                    }
                }
            }
            '\\' => match chars.next() {
                Some('N' | 'n') => {
                    flush(&mut parsed.lines, &mut buf, &state, &mut pending_karaoke);
                    parsed.lines.push(Vec::new());
                }
                Some('h') => buf.push('\u{00A0}'),
                Some(other) => {
                    buf.push('\\');
                    buf.push(other);
                }
                None => buf.push('\\'),
            },
            _ => buf.push(ch),
        }
    }
    flush(&mut parsed.lines, &mut buf, &state, &mut pending_karaoke);

    for line in &mut parsed.lines {
        insert_synthetic_spaces(line);
    }

    parsed
}

/// Insert single-space separator runs between adjacent runs within a
/// line that lack a natural space boundary.
fn insert_synthetic_spaces(line: &mut Vec<TextRun>) {
    let mut idx = 1;
    while idx < line.len() {
        let left_bounded = line[idx - 1].text.ends_with(char::is_whitespace);
        let right_bounded = line[idx].text.starts_with(char::is_whitespace);
        if !left_bounded && !right_bounded {
            let state = line[idx - 1].state.clone();
            line.insert(
                idx,
                TextRun {
                    text: " ".into(),
                    state,
                    karaoke_cs: None,
                    synthetic: true,
                },
            );
            idx += 1;
        }
        idx += 1;
    }
}

/// Rebuild tagged text after a plain-text edit.
///
/// When the edited plain text matches the original's stripped form the
/// original tagged text is returned unmodified, preserving karaoke
/// timing. Otherwise per-word karaoke tags are discarded (their timing
/// no longer matches the wording) and only the alignment/position
/// prefix from the original is re-prepended.
#[must_use]
pub fn rebuild_text(plain: &str, original: &str) -> String {
    if strip_tags(original) == plain {
        return original.to_owned();
    }

    let kept: Vec<String> = leading_tokens(original)
        .iter()
        .filter(|t| is_placement_token(t))
        .map(|t| (*t).to_owned())
        .collect();

    let body = escape_plain(plain);
    if kept.is_empty() {
        body
    } else {
        format!("{{\\{}}}{}", kept.join("\\"), body)
    }
}

/// Rewrite only the leading override-block prefix with the given
/// alignment/position overrides.
///
/// Non-placement tags already in the leading block (karaoke, colour)
/// are preserved after the new placement tags; trailing per-run tags
/// and body text are untouched. An empty resulting prefix block is
/// omitted rather than serialized as `{}`.
#[must_use]
pub fn set_overrides(text: &str, overrides: &Overrides) -> String {
    let (leading, body) = split_leading_blocks(text);
    let mut tokens: Vec<String> = Vec::new();

    if let Some(align) = overrides.alignment {
        tokens.push(format!("an{align}"));
    }
    if let Some((x, y)) = overrides.position {
        tokens.push(format!("pos({},{})", format_coord(x), format_coord(y)));
    }
    for token in &leading {
        if !is_placement_token(token) {
            tokens.push((*token).to_owned());
        }
    }

    if tokens.is_empty() {
        body.to_owned()
    } else {
        format!("{{\\{}}}{}", tokens.join("\\"), body)
    }
}

/// Raw tag tokens of the leading override block(s).
fn leading_tokens(text: &str) -> Vec<&str> {
    split_leading_blocks(text).0
}

/// Split `text` into the tag tokens of its leading `{...}` blocks and
/// the remaining body.
fn split_leading_blocks(text: &str) -> (Vec<&str>, &str) {
    let mut tokens = Vec::new();
    let mut rest = text;
    while rest.starts_with('{') {
        let Some(close) = rest.find('}') else { break };
        tokens.extend(block_tokens(&rest[1..close]));
        rest = &rest[close + 1..];
    }
    (tokens, rest)
}

/// Whether a raw token is an alignment or position tag.
fn is_placement_token(token: &str) -> bool {
    matches!(
        parse_tag(token),
        Tag::Alignment(_) | Tag::Position(_, _)
    )
}

/// Escape plain text back to wire form (`\n` to `\N`, NBSP to `\h`).
///
/// Braces delimit override blocks and have no escaped wire form, so
/// they are dropped rather than written where a stray `{` would
/// swallow the rest of the line as a tag block.
fn escape_plain(plain: &str) -> String {
    let mut out = String::with_capacity(plain.len());
    for ch in plain.chars() {
        match ch {
            '\n' => out.push_str("\\N"),
            '\u{00A0}' => out.push_str("\\h"),
            '{' | '}' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Format a position coordinate, dropping a redundant fraction.
fn format_coord(value: f32) -> String {
    if (value - value.round()).abs() < f32::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strip_removes_blocks() {
        assert_eq!(strip_tags("{\\an8}Hello {\\k30}world"), "Hello world");
        assert_eq!(strip_tags("no tags at all"), "no tags at all");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn strip_karaoke_without_inferred_spaces() {
        // Literal tag placement is preserved: no spaces appear that were
        // not in the source text.
        assert_eq!(
            strip_tags("{\\k50}This{\\k30}has{\\k40}karaoke"),
            "Thishaskaraoke"
        );
    }

    #[test]
    fn strip_converts_break_escapes() {
        assert_eq!(strip_tags("one\\Ntwo\\nthree"), "one\ntwo\nthree");
        assert_eq!(strip_tags("non\\hbreaking"), "non\u{00A0}breaking");
        assert_eq!(strip_tags("keep \\k literal"), "keep \\k literal");
    }

    #[test]
    fn strip_is_idempotent() {
        for text in [
            "{\\k50}This{\\k30}has{\\k40}karaoke",
            "line\\None\\Nline two",
            "plain",
            "{\\pos(10,20)}placed",
        ] {
            let once = strip_tags(text);
            assert_eq!(strip_tags(&once), once);
        }
    }

    #[test]
    fn runs_scenario_karaoke() {
        let parsed = parse_runs("{\\k50}This{\\k30}has{\\k40}karaoke");
        assert_eq!(parsed.karaoke_durations(), vec![50, 30, 40]);

        let karaoke_runs: Vec<&TextRun> =
            parsed.runs().filter(|r| r.karaoke_cs.is_some()).collect();
        assert_eq!(karaoke_runs.len(), 3);
        assert_eq!(karaoke_runs[0].text, "This");
        assert_eq!(karaoke_runs[2].text, "karaoke");

        // Adjacent tagged words get synthetic separators so the
        // renderer does not merge them.
        let synthetic: Vec<&TextRun> = parsed.runs().filter(|r| r.synthetic).collect();
        assert_eq!(synthetic.len(), 2);
        assert!(synthetic.iter().all(|r| r.karaoke_cs.is_none()));
    }

    #[test]
    fn runs_respect_natural_spaces() {
        let parsed = parse_runs("{\\k20}Hello {\\k20}world");
        assert!(parsed.runs().all(|r| !r.synthetic));
        assert_eq!(parsed.karaoke_durations(), vec![20, 20]);
    }

    #[test]
    fn runs_split_on_line_breaks() {
        let parsed = parse_runs("first line\\Nsecond {\\k10}line");
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].len(), 1);
        assert_eq!(parsed.lines[0][0].text, "first line");
        assert_eq!(parsed.lines[1].last().unwrap().karaoke_cs, Some(10));
    }

    #[test]
    fn runs_track_override_state() {
        let parsed = parse_runs("{\\fs60\\c&H0000FF&}big red{\\r} normal");
        let runs: Vec<&TextRun> = parsed.runs().collect();
        assert_eq!(runs[0].state.font_size, Some(60.0));
        assert_eq!(runs[0].state.primary_colour, Some([255, 0, 0, 255]));
        // Reset clears accumulated overrides for the following run.
        assert!(runs.last().unwrap().state.is_empty());
    }

    #[test]
    fn runs_capture_placement_overrides() {
        let parsed = parse_runs("{\\an8\\pos(640,120)}pinned");
        assert_eq!(parsed.overrides.alignment, Some(8));
        assert_eq!(parsed.overrides.position, Some((640.0, 120.0)));
    }

    #[test]
    fn legacy_alignment_conversion() {
        assert_eq!(convert_legacy_alignment(1), 1); // bottom left
        assert_eq!(convert_legacy_alignment(2), 2); // bottom centre
        assert_eq!(convert_legacy_alignment(6), 8); // top centre
        assert_eq!(convert_legacy_alignment(10), 5); // middle centre
    }

    #[test]
    fn rebuild_unchanged_preserves_tags() {
        let original = "{\\an8}{\\k50}This{\\k30}has{\\k40}karaoke";
        let plain = strip_tags(original);
        assert_eq!(rebuild_text(&plain, original), original);
    }

    #[test]
    fn rebuild_changed_discards_karaoke_keeps_placement() {
        let original = "{\\an8\\pos(100,200)}{\\k50}old{\\k30}words";
        let rebuilt = rebuild_text("new words", original);
        assert_eq!(rebuilt, "{\\an8\\pos(100,200)}new words");
    }

    #[test]
    fn rebuild_changed_plain_body() {
        assert_eq!(rebuild_text("edited", "untagged"), "edited");
        assert_eq!(rebuild_text("two\nlines", "one line"), "two\\Nlines");
    }

    #[test]
    fn rebuild_drops_brace_characters() {
        let rebuilt = rebuild_text("edited {note} tail", "old text");
        assert_eq!(rebuilt, "edited note tail");
        // The derived view stays consistent: nothing gets swallowed as
        // an unclosed tag block.
        assert_eq!(strip_tags(&rebuilt), "edited note tail");

        let rebuilt = rebuild_text("curly { text", "{\\an8}old");
        assert_eq!(rebuilt, "{\\an8}curly  text");
        assert_eq!(strip_tags(&rebuilt), "curly  text");
    }

    #[test]
    fn set_overrides_writes_prefix() {
        let out = set_overrides(
            "body text",
            &Overrides {
                alignment: Some(5),
                position: Some((640.0, 360.0)),
            },
        );
        assert_eq!(out, "{\\an5\\pos(640,360)}body text");
    }

    #[test]
    fn set_overrides_replaces_existing_placement() {
        let out = set_overrides(
            "{\\an8\\pos(0,0)}body",
            &Overrides {
                alignment: Some(2),
                position: None,
            },
        );
        assert_eq!(out, "{\\an2}body");
    }

    #[test]
    fn set_overrides_keeps_other_leading_tags() {
        let out = set_overrides(
            "{\\an8\\k50}word",
            &Overrides {
                alignment: Some(4),
                position: None,
            },
        );
        assert_eq!(out, "{\\an4\\k50}word");
    }

    #[test]
    fn set_overrides_empty_block_omitted() {
        let out = set_overrides("{\\an8}body", &Overrides::default());
        assert_eq!(out, "body");
        // Trailing per-run tags survive untouched.
        let out = set_overrides("{\\an8}a{\\k20}b", &Overrides::default());
        assert_eq!(out, "a{\\k20}b");
    }
}
