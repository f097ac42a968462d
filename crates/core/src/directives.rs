//! Per-slide directive parsing.
//!
//! Turns the raw lines of one sub-section into a slide body, applying in
//! order: sized-image rewriting, the `::left` alignment marker, the
//! `::fragment <name>` animation override, speaker-note extraction and
//! secondary-title inheritance for `###`+ headings.
//!
//! Every body line remembers the document line it came from, so later
//! stages (auto-split) can still report exact source ranges.

use crate::lines::{classify_all, heading_level, Line, LineKind};
use crate::types::{Alignment, SourceRange};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Directive that left-aligns a slide.
pub const ALIGN_LEFT_DIRECTIVE: &str = "::left";

/// Directive that overrides the fragment style of a slide.
pub const FRAGMENT_DIRECTIVE: &str = "::fragment";

/// Marker that starts the speaker-notes block.
const NOTES_MARKER: &str = "note:";

/// Inline image with a trailing ` =WxH` size suffix.
static SIZED_IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(\s*([^\s)]+)\s+=([^\s)]+)\s*\)").unwrap());

/// The `WxH` part of a size suffix; either side may be missing. Units may be
/// upper case, but only a lower-case `x` separates the two sides.
static IMAGE_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9.]+(?:%|[a-wyzA-Z]+)?)?(?:x([0-9.]+(?:%|[a-wyzA-Z]+)?)?)?$").unwrap()
});

/// A body line tagged with its document line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BodyLine {
    pub source: usize,
    pub text: String,
}

/// The outcome of parsing one sub-section.
#[derive(Debug, Clone)]
pub(crate) struct ParsedSlide {
    pub body: Vec<BodyLine>,
    pub notes: Option<String>,
    /// `Some` only when a `::left` marker was present.
    pub alignment: Option<Alignment>,
    /// Name from a `::fragment` marker.
    pub animation: Option<String>,
    /// Span from the first to the last non-blank line of the sub-section.
    pub range: SourceRange,
}

impl ParsedSlide {
    /// The body as markdown.
    pub fn content(&self) -> String {
        join_body(&self.body)
    }

    /// Whether the body has anything to display.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|l| l.text.trim().is_empty())
    }

    /// Text of the first level-2 heading outside fenced code.
    pub fn secondary_title(&self) -> Option<String> {
        let kinds = classify_all(self.body.iter().map(|l| l.text.as_str()));
        self.body
            .iter()
            .zip(kinds)
            .find(|(_, kind)| *kind == LineKind::Heading(2))
            .map(|(line, _)| line.text[2..].trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Join body lines back into markdown.
pub(crate) fn join_body(body: &[BodyLine]) -> String {
    body.iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse the lines of one sub-section.
///
/// Returns `None` when the sub-section has no non-blank line at all.
pub(crate) fn parse_slide(lines: &[Line<'_>], secondary_title: Option<&str>) -> Option<ParsedSlide> {
    let first = lines.iter().position(|l| !l.kind.is_blank())?;
    let last = lines.iter().rposition(|l| !l.kind.is_blank())?;
    let lines = &lines[first..=last];
    let range = SourceRange::new(lines[0].number, lines[lines.len() - 1].number);

    let mut in_fence = false;
    let mut body: Vec<BodyLine> = lines
        .iter()
        .map(|line| {
            let text = if in_fence || line.kind == LineKind::Fence {
                line.text.to_string()
            } else {
                rewrite_sized_images(line.text)
            };
            if line.kind == LineKind::Fence {
                in_fence = !in_fence;
            }
            BodyLine {
                source: line.number,
                text,
            }
        })
        .collect();
    trim_body(&mut body);

    let alignment = strip_align_directive(&mut body).then_some(Alignment::Left);
    let animation = strip_fragment_directive(&mut body);
    let notes = extract_notes(&mut body);

    if let Some(title) = secondary_title.filter(|t| !t.is_empty()) {
        inherit_title(&mut body, title);
    }

    Some(ParsedSlide {
        body,
        notes,
        alignment,
        animation,
        range,
    })
}

/// Drop blank lines at either end and trim the outer whitespace.
pub(crate) fn trim_body(body: &mut Vec<BodyLine>) {
    while body.last().is_some_and(|l| l.text.trim().is_empty()) {
        body.pop();
    }
    let leading = body
        .iter()
        .position(|l| !l.text.trim().is_empty())
        .unwrap_or(body.len());
    body.drain(..leading);

    if let Some(first) = body.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = body.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
}

/// Remove a leading directive token; the rest of its line stays in the body.
fn strip_leading_token(body: &mut Vec<BodyLine>, rest_start: usize) {
    if let Some(first) = body.first_mut() {
        first.text = first.text[rest_start..].trim_start().to_string();
    }
    trim_body(body);
}

/// Handle a leading `::left` marker.
fn strip_align_directive(body: &mut Vec<BodyLine>) -> bool {
    let matched = body
        .first()
        .and_then(|l| l.text.strip_prefix(ALIGN_LEFT_DIRECTIVE))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));

    if matched {
        strip_leading_token(body, ALIGN_LEFT_DIRECTIVE.len());
    }
    matched
}

/// Handle a leading `::fragment <name>` marker, returning the name.
fn strip_fragment_directive(body: &mut Vec<BodyLine>) -> Option<String> {
    let first = body.first()?;
    let rest = first.text.strip_prefix(FRAGMENT_DIRECTIVE)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.split_whitespace().next()?.to_string();

    // Byte offset just past the name.
    let name_offset = rest.find(name.as_str())?;
    let consumed = FRAGMENT_DIRECTIVE.len() + name_offset + name.len();
    strip_leading_token(body, consumed);
    Some(name)
}

/// Whether a line opens the speaker-notes block.
pub(crate) fn is_notes_marker(line: &str) -> bool {
    line.get(..NOTES_MARKER.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(NOTES_MARKER))
}

/// Cut everything from the first `Note:` line after the opening line.
fn extract_notes(body: &mut Vec<BodyLine>) -> Option<String> {
    let kinds = classify_all(body.iter().map(|l| l.text.as_str()));
    let mut in_fence = false;
    let mut marker = None;
    for (idx, (line, kind)) in body.iter().zip(kinds).enumerate() {
        if kind == LineKind::Fence {
            in_fence = !in_fence;
        } else if idx > 0 && !in_fence && is_notes_marker(&line.text) {
            marker = Some(idx);
            break;
        }
    }

    let idx = marker?;
    let tail = body.split_off(idx);
    trim_body(body);

    let mut notes = tail[0].text[NOTES_MARKER.len()..].to_string();
    for line in &tail[1..] {
        notes.push('\n');
        notes.push_str(&line.text);
    }
    let notes = notes.trim();
    (!notes.is_empty()).then(|| notes.to_string())
}

/// Prefix a `###`+ opening heading with the current secondary title.
fn inherit_title(body: &mut [BodyLine], secondary_title: &str) {
    let Some(first) = body.first_mut() else {
        return;
    };
    let Some(level) = heading_level(&first.text).filter(|l| *l >= 3) else {
        return;
    };

    let title = first.text[level..].trim();
    if title.starts_with(secondary_title) {
        return;
    }
    first.text = format!(
        "{} {} - {}",
        &first.text[..level],
        secondary_title,
        title
    );
}

/// Rewrite `![alt](url =WxH)` into a sized `<img>` element.
fn rewrite_sized_images(line: &str) -> String {
    if !line.contains("](") {
        return line.to_string();
    }
    SIZED_IMAGE_REGEX
        .replace_all(line, |caps: &Captures<'_>| {
            let original = caps[0].to_string();
            let Some(size) = IMAGE_SIZE_REGEX.captures(&caps[3]) else {
                return original;
            };
            let width = size.get(1).map(|m| css_dimension(m.as_str()));
            let height = size.get(2).map(|m| css_dimension(m.as_str()));
            if width.is_none() && height.is_none() {
                return original;
            }

            format!(
                "<img src=\"{}\" alt=\"{}\" style=\"width: {}; height: {};\">",
                &caps[2],
                caps[1].replace('"', "&quot;"),
                width.as_deref().unwrap_or("auto"),
                height.as_deref().unwrap_or("auto"),
            )
        })
        .into_owned()
}

/// Bare numbers are pixels; anything with a unit passes through.
fn css_dimension(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        format!("{}px", value)
    } else {
        value.to_string()
    }
}
