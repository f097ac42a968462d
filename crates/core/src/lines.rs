//! Line classification.
//!
//! The first pass over a document: every line is tagged once, in order,
//! with the structural role it plays for segmentation. Classification is
//! fence-aware, so headings and separators inside fenced code are plain text.

use crate::directives::{ALIGN_LEFT_DIRECTIVE, FRAGMENT_DIRECTIVE};

/// Structural role of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Empty or whitespace-only.
    Blank,
    /// `#`-style heading with its level (1 for `# `).
    Heading(usize),
    /// `---` on its own line.
    HorizontalSeparator,
    /// `--` on its own line.
    VerticalSeparator,
    /// `::left` or `::fragment` marker line.
    Directive,
    /// Opening or closing code fence.
    Fence,
    /// Anything else, including every line inside a fenced block.
    Text,
}

impl LineKind {
    pub(crate) fn is_blank(self) -> bool {
        self == Self::Blank
    }

    /// Whether the line counts as slide content when deciding where a
    /// section may start. Separators and directives do not.
    pub(crate) fn is_content(self) -> bool {
        !matches!(
            self,
            Self::Blank | Self::Directive | Self::HorizontalSeparator | Self::VerticalSeparator
        )
    }
}

/// A classified line of the original document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// Zero-indexed line number in the document.
    pub number: usize,
    pub text: &'a str,
    pub kind: LineKind,
}

/// Heading level of a line starting with `#` characters and a space.
pub(crate) fn heading_level(line: &str) -> Option<usize> {
    let level = line.len() - line.trim_start_matches('#').len();
    if level == 0 {
        return None;
    }
    match line[level..].chars().next() {
        Some(' ') | Some('\t') => Some(level),
        _ => None,
    }
}

/// Whether the line opens or closes a fenced code block.
pub(crate) fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Whether the trimmed line starts with a directive token.
pub(crate) fn is_directive(trimmed: &str) -> bool {
    [ALIGN_LEFT_DIRECTIVE, FRAGMENT_DIRECTIVE].iter().any(|token| {
        trimmed
            .strip_prefix(token)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// Classify one line given whether a code fence is currently open.
fn classify(line: &str, in_fence: bool) -> LineKind {
    if is_fence(line) {
        return LineKind::Fence;
    }
    if in_fence {
        return LineKind::Text;
    }

    match line.trim() {
        "" => LineKind::Blank,
        "---" => LineKind::HorizontalSeparator,
        "--" => LineKind::VerticalSeparator,
        trimmed if is_directive(trimmed) => LineKind::Directive,
        _ => heading_level(line).map_or(LineKind::Text, LineKind::Heading),
    }
}

/// Classify a run of lines, tracking fence state across them.
pub(crate) fn classify_all<'a, I>(lines: I) -> Vec<LineKind>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut in_fence = false;
    lines
        .into_iter()
        .map(|line| {
            let kind = classify(line, in_fence);
            if kind == LineKind::Fence {
                in_fence = !in_fence;
            }
            kind
        })
        .collect()
}

/// Split a document into classified lines.
///
/// Expects `\n` line endings; a trailing `\r` on a line is ignored.
pub(crate) fn tokenize(text: &str) -> Vec<Line<'_>> {
    let raw: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let kinds = classify_all(raw.iter().copied());

    let fences = kinds.iter().filter(|k| **k == LineKind::Fence).count();
    if fences % 2 == 1 {
        log::warn!("Unterminated code fence; treating it as open to end of document");
    }

    raw.into_iter()
        .zip(kinds)
        .enumerate()
        .map(|(number, (text, kind))| {
            log::trace!("line {}: {:?}", number, kind);
            Line { number, text, kind }
        })
        .collect()
}
