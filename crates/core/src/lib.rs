//! Markdown to slide-deck segmentation: heading hierarchy, slide directives,
//! long-slide auto-splitting and fragment annotation.

pub mod animation;
pub mod directives;
pub mod error;
pub mod fragments;
mod lines;
pub mod reveal;
pub mod segment;
pub mod split;
pub mod types;

pub use error::{Error, Result};
pub use fragments::{inject_fragments, FragmentInjector};
pub use reveal::RevealFormatter;
pub use segment::{segment, Segmenter};
pub use split::SplitLimits;
pub use types::{Alignment, Deck, FlatSlide, Slide, SlideIndex, SlideNode, SlideStack, SourceRange};
