//! Domain types for representing a segmented slide deck.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal text alignment of a slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Centered (the default).
    #[default]
    Center,
    /// Left-aligned, set per slide with `::left`.
    Left,
}

impl Alignment {
    /// The lowercase name used in directives and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
        }
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "center" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            _ => Err(Error::InvalidAlignment(s.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive, zero-indexed span of lines in the original document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    /// First line of the span.
    pub start: usize,
    /// Last line of the span (inclusive).
    pub end: usize,
}

impl SourceRange {
    /// Create a range covering `start..=end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether `line` falls inside this range.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A single displayable slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Markdown body shown to the audience.
    pub content: String,

    /// Speaker notes, never part of `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Resolved alignment.
    pub alignment: Alignment,

    /// Resolved fragment style; `None` when animation is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,

    /// Lines of the original document this slide was derived from.
    pub source_range: SourceRange,
}

impl Slide {
    /// Text of the first line when it is a heading, without the `#` marker.
    pub fn title(&self) -> Option<&str> {
        let first = self.content.lines().next()?;
        let hashes = first.len() - first.trim_start_matches('#').len();
        if hashes == 0 {
            return None;
        }
        first[hashes..]
            .strip_prefix(' ')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A vertical group of slides navigated as sub-slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideStack {
    /// Sub-slides in navigation order. Never empty.
    pub children: Vec<Slide>,
}

/// One horizontal position in the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideNode {
    /// A single slide.
    Leaf(Slide),
    /// A vertical stack of slides.
    Stack(SlideStack),
}

impl SlideNode {
    /// Build a node from a non-empty run of slides: one slide stays a leaf,
    /// several become a stack.
    pub(crate) fn from_slides(mut slides: Vec<Slide>) -> Option<Self> {
        match slides.len() {
            0 => None,
            1 => slides.pop().map(Self::Leaf),
            _ => Some(Self::Stack(SlideStack { children: slides })),
        }
    }

    /// The slides at this position, in vertical order.
    pub fn slides(&self) -> &[Slide] {
        match self {
            Self::Leaf(slide) => std::slice::from_ref(slide),
            Self::Stack(stack) => &stack.children,
        }
    }

    /// Whether this node is a vertical stack.
    pub fn is_stack(&self) -> bool {
        matches!(self, Self::Stack(_))
    }
}

/// Position of a slide as `[horizontal, vertical]` navigation indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideIndex {
    /// Index into the top-level node sequence.
    pub horizontal: usize,
    /// Index into a stack's children; 0 for leaves.
    pub vertical: usize,
}

impl SlideIndex {
    /// Create a new index pair.
    pub fn new(horizontal: usize, vertical: usize) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// A slide seen through the flattened, linear preview order.
#[derive(Debug, Clone, Copy)]
pub struct FlatSlide<'a> {
    /// The slide itself.
    pub slide: &'a Slide,
    /// Its navigation position.
    pub index: SlideIndex,
}

impl FlatSlide<'_> {
    /// Whether this slide sits below another one in its stack.
    pub fn is_sub_slide(&self) -> bool {
        self.index.vertical > 0
    }
}

/// A segmented deck: the ordered top-level nodes plus navigation helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Top-level nodes in presentation order.
    pub nodes: Vec<SlideNode>,
}

impl Deck {
    /// Wrap a node sequence.
    pub fn new(nodes: Vec<SlideNode>) -> Self {
        Self { nodes }
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of displayable slides, counting stack children.
    pub fn slide_count(&self) -> usize {
        self.nodes.iter().map(|n| n.slides().len()).sum()
    }

    /// All slides in linear order, each tagged with its navigation index.
    pub fn flatten(&self) -> Vec<FlatSlide<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(h, node)| {
                node.slides()
                    .iter()
                    .enumerate()
                    .map(move |(v, slide)| FlatSlide {
                        slide,
                        index: SlideIndex::new(h, v),
                    })
            })
            .collect()
    }

    /// Map a flat preview position back to navigation indices.
    pub fn index_of_flat(&self, flat: usize) -> Option<SlideIndex> {
        self.flatten().get(flat).map(|f| f.index)
    }

    /// Find the slide whose source range contains `line`.
    pub fn locate_line(&self, line: usize) -> Option<SlideIndex> {
        self.flatten()
            .into_iter()
            .find(|f| f.slide.source_range.contains(line))
            .map(|f| f.index)
    }

    /// Source range of the slide at `index`.
    pub fn range_of(&self, index: SlideIndex) -> Option<SourceRange> {
        self.get(index).map(|s| s.source_range)
    }

    /// The slide at `index`.
    pub fn get(&self, index: SlideIndex) -> Option<&Slide> {
        self.nodes
            .get(index.horizontal)
            .and_then(|n| n.slides().get(index.vertical))
    }

    /// Serialize the node sequence as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.nodes)?
        } else {
            serde_json::to_string(&self.nodes)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(content: &str, start: usize, end: usize) -> Slide {
        Slide {
            content: content.to_string(),
            notes: None,
            alignment: Alignment::Center,
            animation: None,
            source_range: SourceRange::new(start, end),
        }
    }

    fn sample_deck() -> Deck {
        Deck::new(vec![
            SlideNode::Leaf(slide("# A", 0, 1)),
            SlideNode::Stack(SlideStack {
                children: vec![slide("## B", 2, 4), slide("### B - C", 5, 7)],
            }),
        ])
    }

    #[test]
    fn test_alignment_from_str() {
        assert_eq!("left".parse::<Alignment>().unwrap(), Alignment::Left);
        assert_eq!(" Center ".parse::<Alignment>().unwrap(), Alignment::Center);

        let err = "right".parse::<Alignment>().unwrap_err();
        assert!(matches!(err, Error::InvalidAlignment(_)));
    }

    #[test]
    fn test_source_range_contains() {
        let range = SourceRange::new(3, 5);
        assert!(!range.contains(2));
        assert!(range.contains(3));
        assert!(range.contains(5));
        assert!(!range.contains(6));
        assert_eq!(range.line_count(), 3);
    }

    #[test]
    fn test_slide_title() {
        assert_eq!(slide("## Hello \nbody", 0, 1).title(), Some("Hello"));
        assert_eq!(slide("plain text", 0, 0).title(), None);
        assert_eq!(slide("#hashtag", 0, 0).title(), None);
    }

    #[test]
    fn test_flatten_marks_sub_slides() {
        let deck = sample_deck();
        let flat = deck.flatten();

        assert_eq!(flat.len(), 3);
        assert_eq!(deck.slide_count(), 3);
        assert!(!flat[0].is_sub_slide());
        assert!(!flat[1].is_sub_slide());
        assert!(flat[2].is_sub_slide());
        assert_eq!(flat[2].index, SlideIndex::new(1, 1));
    }

    #[test]
    fn test_index_of_flat() {
        let deck = sample_deck();
        assert_eq!(deck.index_of_flat(0), Some(SlideIndex::new(0, 0)));
        assert_eq!(deck.index_of_flat(1), Some(SlideIndex::new(1, 0)));
        assert_eq!(deck.index_of_flat(2), Some(SlideIndex::new(1, 1)));
        assert_eq!(deck.index_of_flat(3), None);
    }

    #[test]
    fn test_locate_line_round_trip() {
        let deck = sample_deck();
        assert_eq!(deck.locate_line(1), Some(SlideIndex::new(0, 0)));
        assert_eq!(deck.locate_line(6), Some(SlideIndex::new(1, 1)));
        assert_eq!(deck.locate_line(40), None);

        let index = SlideIndex::new(1, 0);
        assert_eq!(deck.range_of(index), Some(SourceRange::new(2, 4)));
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let json = serde_json::to_value(SlideNode::Leaf(slide("# A", 0, 0))).unwrap();
        assert_eq!(json["kind"], "leaf");
        assert_eq!(json["alignment"], "center");
        assert_eq!(json["sourceRange"]["start"], 0);
        assert!(json.get("notes").is_none());

        let deck = sample_deck();
        let json = serde_json::to_value(&deck.nodes[1]).unwrap();
        assert_eq!(json["kind"], "stack");
        assert_eq!(json["children"].as_array().map(Vec::len), Some(2));
    }
}
