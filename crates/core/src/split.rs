//! Long-slide auto-splitting.
//!
//! A slide whose body is too long to display is cut into chunks that the
//! segmenter groups as a vertical stack. Fenced code blocks are never cut.

use crate::directives::{join_body, trim_body, BodyLine, ParsedSlide};
use crate::lines::{classify_all, is_fence, LineKind};
use crate::types::SourceRange;

/// Default character threshold.
pub const DEFAULT_CHAR_LIMIT: usize = 1500;

/// Default line threshold.
pub const DEFAULT_LINE_LIMIT: usize = 24;

/// Title used for continuations when the slide has no heading.
const FALLBACK_TITLE: (&str, &str) = ("##", "Continued");

/// Size thresholds that trigger a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLimits {
    /// Maximum body length in characters.
    pub chars: usize,
    /// Maximum body length in lines, also the maximum chunk length.
    pub lines: usize,
}

impl Default for SplitLimits {
    fn default() -> Self {
        Self {
            chars: DEFAULT_CHAR_LIMIT,
            lines: DEFAULT_LINE_LIMIT,
        }
    }
}

impl SplitLimits {
    fn exceeded_by(&self, chars: usize, lines: usize) -> bool {
        chars > self.chars || lines > self.lines
    }

    /// Past 80% of the character limit a heading may start a new chunk.
    fn past_soft_limit(&self, chars: usize) -> bool {
        chars * 5 > self.chars * 4
    }
}

/// One piece of a (possibly split) slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub content: String,
    pub notes: Option<String>,
    pub range: SourceRange,
}

/// Split `slide` if it exceeds `limits`; otherwise return it as one chunk.
pub(crate) fn auto_split(slide: &ParsedSlide, limits: SplitLimits) -> Vec<Chunk> {
    let content = slide.content();
    let char_count = content.chars().count();

    if !limits.exceeded_by(char_count, slide.body.len()) {
        return vec![Chunk {
            content,
            notes: slide.notes.clone(),
            range: slide.range,
        }];
    }

    let pieces = cut(&slide.body, limits);
    let (marker, title) = first_heading(&slide.body);

    log::debug!(
        "Auto-splitting slide at lines {}-{} ({} chars, {} lines) into {} parts",
        slide.range.start,
        slide.range.end,
        char_count,
        slide.body.len(),
        pieces.len()
    );

    let starts: Vec<usize> = pieces
        .iter()
        .enumerate()
        .map(|(idx, piece)| {
            if idx == 0 {
                slide.range.start
            } else {
                piece[0].source
            }
        })
        .collect();

    pieces
        .iter()
        .enumerate()
        .map(|(idx, piece)| {
            let end = starts
                .get(idx + 1)
                .map_or(slide.range.end, |next| next - 1);
            let body = join_body(piece);
            let content = if idx == 0 {
                body
            } else {
                format!("{} {} (Part {})\n\n{}", marker, title, idx + 1, body)
            };

            Chunk {
                content,
                notes: if idx == 0 { slide.notes.clone() } else { None },
                range: SourceRange::new(starts[idx], end),
            }
        })
        .collect()
}

/// Partition body lines into non-empty, trimmed pieces.
fn cut(body: &[BodyLine], limits: SplitLimits) -> Vec<Vec<BodyLine>> {
    let mut pieces = Vec::new();
    let mut current: Vec<BodyLine> = Vec::new();
    let mut chars = 0;
    let mut in_fence = false;

    for line in body {
        let boundary = (limits.past_soft_limit(chars) && line.text.starts_with('#'))
            || current.len() >= limits.lines;

        if boundary && !in_fence && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            chars = 0;
        }

        current.push(line.clone());
        chars += line.text.chars().count() + 1;
        if is_fence(&line.text) {
            in_fence = !in_fence;
        }
    }
    pieces.push(current);

    pieces
        .into_iter()
        .filter_map(|mut piece| {
            trim_body(&mut piece);
            (!piece.is_empty()).then_some(piece)
        })
        .collect()
}

/// Marker and text of the first heading in the whole slide.
fn first_heading(body: &[BodyLine]) -> (String, String) {
    let kinds = classify_all(body.iter().map(|l| l.text.as_str()));
    body.iter()
        .zip(kinds)
        .find_map(|(line, kind)| match kind {
            LineKind::Heading(level) => {
                let text = line.text[level..].trim();
                (!text.is_empty()).then(|| (line.text[..level].to_string(), text.to_string()))
            }
            _ => None,
        })
        .unwrap_or_else(|| (FALLBACK_TITLE.0.to_string(), FALLBACK_TITLE.1.to_string()))
}
