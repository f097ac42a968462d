//! Markdown to slide-deck segmentation.
//!
//! Works in two passes. [`tokenize`] classifies every line once; the
//! segmenter then cuts the classified lines into horizontal sections
//! (`---`, `# `, `## `) and each of those into vertical sub-sections
//! (`--`, `### `+). Each sub-section is parsed for directives, auto-split
//! when oversized, and annotated with fragment markup.
//!
//! The most recent `##` heading is threaded through the sections as an
//! explicit accumulator so deeper headings can be prefixed with it.

use crate::animation;
use crate::directives::{parse_slide, ParsedSlide};
use crate::error::Result;
use crate::fragments::inject_fragments;
use crate::lines::{tokenize, Line, LineKind};
use crate::split::{auto_split, SplitLimits};
use crate::types::{Alignment, Deck, Slide, SlideNode};
use std::borrow::Cow;
use std::path::Path;

/// Most recent level-2 heading text seen in document order.
type SecondaryTitle = Option<String>;

/// Slide segmenter with caller-supplied defaults.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    /// Global fragment style, already resolved (`None` disables).
    animation: Option<String>,
    /// Alignment for slides without a `::left` marker.
    alignment: Alignment,
    /// Auto-split thresholds.
    limits: SplitLimits,
}

impl Segmenter {
    /// Create a segmenter with default settings: centered, no animation,
    /// 1500 characters / 24 lines per slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global fragment style. `none` disables animation.
    pub fn with_animation(mut self, animation: &str) -> Self {
        self.animation = animation::resolve(Some(animation));
        self
    }

    /// Set the alignment for slides without a `::left` marker.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the character threshold for auto-splitting.
    pub fn with_char_limit(mut self, chars: usize) -> Self {
        self.limits.chars = chars.max(1);
        self
    }

    /// Set the line threshold for auto-splitting.
    pub fn with_line_limit(mut self, lines: usize) -> Self {
        self.limits.lines = lines.max(1);
        self
    }

    /// Segment a document into a deck.
    pub fn segment(&self, text: &str) -> Deck {
        let text = normalize_line_endings(text);
        let lines = tokenize(&text);
        let sections = horizontal_sections(&lines);

        let (nodes, _) = sections.into_iter().fold(
            (Vec::new(), SecondaryTitle::None),
            |(mut nodes, title), section| {
                let (node, title) = self.segment_section(section, title);
                nodes.extend(node);
                (nodes, title)
            },
        );

        let deck = Deck::new(nodes);
        log::debug!(
            "Segmented {} lines into {} positions ({} slides)",
            lines.len(),
            deck.nodes.len(),
            deck.slide_count()
        );
        deck
    }

    /// Read and segment a document from disk.
    pub fn segment_file(&self, path: impl AsRef<Path>) -> Result<Deck> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(self.segment(&text))
    }

    /// Segment one horizontal section into a leaf or a stack.
    fn segment_section(
        &self,
        section: &[Line<'_>],
        title: SecondaryTitle,
    ) -> (Option<SlideNode>, SecondaryTitle) {
        let (slides, title) = vertical_sections(section).into_iter().fold(
            (Vec::new(), title),
            |(mut slides, title), sub| {
                let Some(parsed) = parse_slide(sub, title.as_deref()) else {
                    return (slides, title);
                };
                let next_title = parsed.secondary_title().or(title);
                slides.extend(self.build_slides(&parsed));
                (slides, next_title)
            },
        );

        (SlideNode::from_slides(slides), title)
    }

    /// Resolve directives, auto-split and inject fragments.
    fn build_slides(&self, parsed: &ParsedSlide) -> Vec<Slide> {
        if parsed.is_empty() {
            log::debug!(
                "Dropping empty slide at lines {}-{}",
                parsed.range.start,
                parsed.range.end
            );
            return Vec::new();
        }

        let alignment = parsed.alignment.unwrap_or(self.alignment);
        let animation = match &parsed.animation {
            Some(name) => animation::resolve(Some(name)),
            None => self.animation.clone(),
        };

        auto_split(parsed, self.limits)
            .into_iter()
            .map(|chunk| Slide {
                content: inject_fragments(&chunk.content, animation.as_deref()),
                notes: chunk.notes,
                alignment,
                animation: animation.clone(),
                source_range: chunk.range,
            })
            .collect()
    }
}

/// Segment `text` with optional global animation and alignment defaults.
pub fn segment(text: &str, animation: Option<&str>, alignment: Option<Alignment>) -> Vec<SlideNode> {
    let mut segmenter = Segmenter::new().with_alignment(alignment.unwrap_or_default());
    if let Some(animation) = animation {
        segmenter = segmenter.with_animation(animation);
    }
    segmenter.segment(text).nodes
}

fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Cut at `---` (consumed) and before `# ` / `## ` headings.
fn horizontal_sections<'l, 'a>(lines: &'l [Line<'a>]) -> Vec<&'l [Line<'a>]> {
    split_sections(lines, |kind| match kind {
        LineKind::HorizontalSeparator => Some(Cut::Consume),
        LineKind::Heading(1) | LineKind::Heading(2) => Some(Cut::Before),
        _ => None,
    })
}

/// Cut at `--` (consumed) and before `### `+ headings.
fn vertical_sections<'l, 'a>(lines: &'l [Line<'a>]) -> Vec<&'l [Line<'a>]> {
    split_sections(lines, |kind| match kind {
        LineKind::VerticalSeparator => Some(Cut::Consume),
        LineKind::Heading(level) if level >= 3 => Some(Cut::Before),
        _ => None,
    })
}

/// How a boundary line relates to the sections around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cut {
    /// The line is a separator and belongs to neither section.
    Consume,
    /// The line opens the next section.
    Before,
}

/// Split `lines` into contiguous sections, dropping blank-only ones.
///
/// A heading only opens a new section once the current one has content;
/// directive lines above a heading stay with it.
fn split_sections<'l, 'a, F>(lines: &'l [Line<'a>], boundary: F) -> Vec<&'l [Line<'a>]>
where
    F: Fn(LineKind) -> Option<Cut>,
{
    let mut sections = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for (idx, line) in lines.iter().enumerate() {
        match boundary(line.kind) {
            Some(Cut::Consume) => {
                sections.push(&lines[start..idx]);
                start = idx + 1;
                has_content = false;
            }
            Some(Cut::Before) if has_content => {
                sections.push(&lines[start..idx]);
                start = idx;
            }
            _ => has_content |= line.kind.is_content(),
        }
    }
    sections.push(&lines[start..]);

    sections.retain(|s| s.iter().any(|l| !l.kind.is_blank()));
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SlideIndex, SourceRange};

    fn slides(nodes: &[SlideNode]) -> Vec<&Slide> {
        nodes.iter().flat_map(|n| n.slides()).collect()
    }

    fn numbered_lines(count: usize) -> String {
        (1..=count)
            .map(|n| format!("Line {}", n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    const DECK: &str = "# Welcome\nIntro text\n\n---\n\n## Agenda\n- one\n- two\n\nNote: keep it short\n\n### Details\nMore\n--\nVertical piece\n## Wrap\nBye";

    #[test]
    fn test_empty_documents() {
        assert!(segment("", None, None).is_empty());
        assert!(segment("  \n\t\n", None, None).is_empty());
        assert!(segment("---\n\n---\n--\n", None, None).is_empty());
    }

    #[test]
    fn test_separator_consumption() {
        let nodes = segment("# A\n---\n## B", None, None);
        assert_eq!(nodes.len(), 2);

        let all = slides(&nodes);
        assert_eq!(all[0].title(), Some("A"));
        assert_eq!(all[1].title(), Some("B"));
        assert_eq!(all[0].source_range, SourceRange::new(0, 0));
        assert_eq!(all[1].source_range, SourceRange::new(2, 2));
    }

    #[test]
    fn test_leading_heading_does_not_open_empty_section() {
        let nodes = segment("\n# A\ntext\n## B\nmore", None, None);
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| !n.is_stack()));
        assert_eq!(slides(&nodes)[0].content, "# A\ntext");
    }

    #[test]
    fn test_text_before_first_heading_is_its_own_slide() {
        let nodes = segment("intro\n# A", None, None);
        let all = slides(&nodes);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content, "intro");
        assert_eq!(all[1].content, "# A");
    }

    #[test]
    fn test_stack_promotion_with_title_inheritance() {
        let nodes = segment("## B\nintro\n### C\ndetail", None, None);
        assert_eq!(nodes.len(), 1);

        let SlideNode::Stack(stack) = &nodes[0] else {
            panic!("expected a stack");
        };
        assert_eq!(stack.children.len(), 2);
        assert_eq!(stack.children[0].content, "## B\nintro");
        assert_eq!(stack.children[1].content, "### B - C\ndetail");
    }

    #[test]
    fn test_secondary_title_carries_across_sections() {
        let nodes = segment("## B\ntext\n---\n### C\n---\n# Top\n### D", None, None);
        let all = slides(&nodes);

        assert_eq!(all[1].content, "### B - C");
        // A level-1 heading does not reset the tracked title.
        assert_eq!(all[3].content, "### B - D");
    }

    #[test]
    fn test_explicit_vertical_separator() {
        let nodes = segment("## A\nfirst\n--\nsecond\n--\n", None, None);
        let SlideNode::Stack(stack) = &nodes[0] else {
            panic!("expected a stack");
        };
        assert_eq!(stack.children.len(), 2);
        assert_eq!(stack.children[1].content, "second");
        assert_eq!(stack.children[1].source_range, SourceRange::new(3, 3));
    }

    #[test]
    fn test_defaults_are_center_without_animation() {
        for slide in slides(&segment(DECK, None, None)) {
            assert_eq!(slide.alignment, Alignment::Center);
            assert_eq!(slide.animation, None);
            assert!(!slide.content.contains("fragment"));
        }
    }

    #[test]
    fn test_inline_directives_override_defaults() {
        let text = "::left\n# A\n---\n::fragment grow\n# B\nbody\n---\n# C";
        let nodes = segment(text, None, None);
        let all = slides(&nodes);

        assert_eq!(all[0].alignment, Alignment::Left);
        assert_eq!(all[0].source_range, SourceRange::new(0, 1));
        assert_eq!(all[1].animation.as_deref(), Some("grow"));
        assert_eq!(
            all[1].content,
            "# B\nbody\n<!-- .element: class=\"fragment grow\" -->"
        );
        assert_eq!(all[2].alignment, Alignment::Center);
        assert_eq!(all[2].animation, None);
    }

    #[test]
    fn test_global_defaults_and_none_override() {
        let text = "# A\nbody\n---\n::fragment none\n# B\nbody";
        let nodes = segment(text, Some("fade-up"), Some(Alignment::Left));
        let all = slides(&nodes);

        assert_eq!(all[0].alignment, Alignment::Left);
        assert_eq!(all[0].animation.as_deref(), Some("fade-up"));
        assert!(all[0].content.contains("class=\"fragment fade-up\""));

        assert_eq!(all[1].animation, None);
        assert_eq!(all[1].content, "# B\nbody");
    }

    #[test]
    fn test_notes_privacy() {
        let nodes = segment(DECK, None, None);
        let agenda = slides(&nodes)
            .into_iter()
            .find(|s| s.title() == Some("Agenda"))
            .unwrap();

        assert_eq!(agenda.notes.as_deref(), Some("keep it short"));
        assert!(!agenda.content.contains("keep it short"));
        assert!(!agenda.content.contains("Note:"));
    }

    #[test]
    fn test_auto_split_grouping() {
        let text = format!("{}\nNote: first only", numbered_lines(60));
        let nodes = segment(&text, None, None);
        assert_eq!(nodes.len(), 1);

        let SlideNode::Stack(stack) = &nodes[0] else {
            panic!("expected a stack");
        };
        assert_eq!(stack.children.len(), 3);
        assert_eq!(stack.children[1].title(), Some("Continued (Part 2)"));
        assert_eq!(stack.children[2].title(), Some("Continued (Part 3)"));
        assert_eq!(stack.children[0].notes.as_deref(), Some("first only"));
        assert!(stack.children[1..].iter().all(|c| c.notes.is_none()));
    }

    #[test]
    fn test_auto_split_children_join_existing_stack() {
        let text = format!("## Big\n{}\n### Small\nok", numbered_lines(30));
        let nodes = segment(&text, None, None);

        let SlideNode::Stack(stack) = &nodes[0] else {
            panic!("expected a stack");
        };
        assert_eq!(stack.children.len(), 3);
        assert_eq!(stack.children[1].title(), Some("Big (Part 2)"));
        assert_eq!(stack.children[2].content, "### Big - Small\nok");
    }

    #[test]
    fn test_fragment_override_applies_to_every_chunk() {
        let text = format!("::fragment grow\n## Long\n{}", numbered_lines(40));
        let nodes = segment(&text, None, None);
        let all = slides(&nodes);

        assert_eq!(all.len(), 2);
        for slide in all {
            assert_eq!(slide.animation.as_deref(), Some("grow"));
            assert!(slide.content.contains("class=\"fragment grow\""));
        }
    }

    #[test]
    fn test_code_block_split_immunity() {
        let text = format!("## Code\n```\n{}\n```", numbered_lines(40));
        let nodes = segment(&text, None, None);
        let all = slides(&nodes);

        let holder = all
            .iter()
            .find(|s| s.content.contains("Line 1\n"))
            .unwrap();
        for n in 1..=40 {
            assert!(holder.content.contains(&format!("Line {}", n)));
        }
    }

    #[test]
    fn test_headings_inside_code_do_not_split() {
        let text = "## Shell\n```sh\n# install\n---\n### not a slide\n```";
        let nodes = segment(text, None, None);
        assert_eq!(nodes.len(), 1);
        assert!(!nodes[0].is_stack());
    }

    #[test]
    fn test_ranges_are_monotonic_and_disjoint() {
        let text = format!("{}\n---\n{}", DECK, numbered_lines(50));
        let nodes = segment(&text, None, None);
        let all = slides(&nodes);

        for pair in all.windows(2) {
            assert!(pair[0].source_range.start <= pair[0].source_range.end);
            assert!(pair[0].source_range.end < pair[1].source_range.start);
        }
    }

    #[test]
    fn test_ranges_cover_authored_lines() {
        let lines: Vec<&str> = DECK.lines().collect();
        let nodes = segment(DECK, None, None);

        for slide in slides(&nodes) {
            let range = slide.source_range;
            let source = lines[range.start..=range.end].join("\n");
            let first = slide.content.lines().next().unwrap();
            let original = first.split(" - ").last().unwrap().trim_start_matches('#').trim();
            assert!(source.contains(original), "{:?} not in {:?}", original, source);
        }
    }

    #[test]
    fn test_no_content_loss() {
        let nodes = segment(DECK, None, None);
        let mut combined = String::new();
        for slide in slides(&nodes) {
            combined.push_str(&slide.content);
            combined.push('\n');
            if let Some(notes) = &slide.notes {
                combined.push_str(notes);
                combined.push('\n');
            }
        }

        for line in DECK.lines() {
            let line = line.trim();
            if line.is_empty() || line == "---" || line == "--" {
                continue;
            }
            let text = line.trim_start_matches('#').trim();
            let text = text.strip_prefix("Note:").unwrap_or(text).trim();
            assert!(combined.contains(text), "lost {:?}", text);
        }
    }

    #[test]
    fn test_cursor_mapping() {
        let deck = Segmenter::new().segment(DECK);

        assert_eq!(deck.locate_line(1), Some(SlideIndex::new(0, 0)));
        assert_eq!(deck.locate_line(9), Some(SlideIndex::new(1, 0)));
        assert_eq!(deck.locate_line(12), Some(SlideIndex::new(1, 1)));
        assert_eq!(deck.locate_line(14), Some(SlideIndex::new(1, 2)));
        assert_eq!(deck.locate_line(16), Some(SlideIndex::new(2, 0)));
        assert_eq!(deck.locate_line(3), None);
    }

    #[test]
    fn test_output_is_deterministic() {
        let segmenter = Segmenter::new().with_animation("fade-up");
        assert_eq!(segmenter.segment(DECK), segmenter.segment(DECK));
    }

    #[test]
    fn test_carriage_returns() {
        let nodes = segment("# A\r\n---\r\n## B\r\n", None, None);
        let all = slides(&nodes);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].content, "## B");
        assert_eq!(all[1].source_range, SourceRange::new(2, 2));
    }

    #[test]
    fn test_custom_limits() {
        let segmenter = Segmenter::new().with_line_limit(2).with_char_limit(0);
        let deck = segmenter.segment("a\nb\nc");
        assert_eq!(deck.slide_count(), 2);
    }
}
