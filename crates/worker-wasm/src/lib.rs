//! WASM wrapper around the slide segmenter.
//!
//! This crate exposes segmentation to JavaScript editors, which call it on
//! every edit for live preview and cursor-to-slide mapping.

use mdslides_core::animation::KNOWN_ANIMATIONS;
use mdslides_core::{Alignment, Deck, RevealFormatter, Segmenter, SlideIndex, SlideNode};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of segmenting a document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    /// Top-level nodes in presentation order.
    pub nodes: Vec<SlideNode>,
    /// Number of displayable slides, counting stack children.
    pub slide_count: usize,
}

/// Segment a Markdown document into slide nodes.
///
/// # Arguments
/// * `text` - The Markdown source
/// * `animation` - Global fragment style (`none` or absent disables)
/// * `alignment` - Global alignment, `center` (default) or `left`
///
/// # Returns
/// A JavaScript object with the nodes, or throws on an invalid alignment.
#[wasm_bindgen]
pub fn segment_markdown(
    text: &str,
    animation: Option<String>,
    alignment: Option<String>,
) -> Result<JsValue, JsValue> {
    let result = segment_markdown_impl(text, animation.as_deref(), alignment.as_deref())
        .map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn segmenter(animation: Option<&str>, alignment: Option<&str>) -> Result<Segmenter, String> {
    let alignment = match alignment {
        Some(name) => name.parse::<Alignment>().map_err(|e| e.to_string())?,
        None => Alignment::default(),
    };

    let mut segmenter = Segmenter::new().with_alignment(alignment);
    if let Some(animation) = animation {
        segmenter = segmenter.with_animation(animation);
    }
    Ok(segmenter)
}

fn segment_markdown_impl(
    text: &str,
    animation: Option<&str>,
    alignment: Option<&str>,
) -> Result<SegmentResult, String> {
    let deck = segmenter(animation, alignment)?.segment(text);

    Ok(SegmentResult {
        slide_count: deck.slide_count(),
        nodes: deck.nodes,
    })
}

/// Map a zero-indexed editor line to the `{ horizontal, vertical }` index of
/// the slide containing it, or `null`.
#[wasm_bindgen]
pub fn locate_line(text: &str, line: usize) -> Result<JsValue, JsValue> {
    let index = locate_line_impl(text, line);

    serde_wasm_bindgen::to_value(&index)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn locate_line_impl(text: &str, line: usize) -> Option<SlideIndex> {
    Segmenter::new().segment(text).locate_line(line)
}

/// Render a document as slideshow-runtime section markup.
#[wasm_bindgen]
pub fn render_reveal(
    text: &str,
    animation: Option<String>,
    alignment: Option<String>,
) -> Result<String, JsValue> {
    render_reveal_impl(text, animation.as_deref(), alignment.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

fn render_reveal_impl(
    text: &str,
    animation: Option<&str>,
    alignment: Option<&str>,
) -> Result<String, String> {
    let deck: Deck = segmenter(animation, alignment)?.segment(text);
    Ok(RevealFormatter::new().format(&deck))
}

/// The known fragment styles, for pickers.
#[wasm_bindgen]
pub fn known_animations() -> js_sys::Array {
    KNOWN_ANIMATIONS
        .iter()
        .map(|name| JsValue::from_str(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_markdown() {
        let result =
            segment_markdown_impl("# One\n---\n## Two\n### Three", Some("fade-up"), Some("left"))
                .unwrap();

        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.slide_count, 3);
        assert!(result.nodes[1].is_stack());
        assert!(result
            .nodes
            .iter()
            .flat_map(|n| n.slides())
            .all(|s| s.alignment == Alignment::Left));
    }

    #[test]
    fn test_invalid_alignment() {
        let err = segment_markdown_impl("# One", None, Some("right")).unwrap_err();
        assert!(err.contains("right"));
    }

    #[test]
    fn test_locate_line() {
        let text = "# One\ntext\n---\n## Two";
        assert_eq!(locate_line_impl(text, 1), Some(SlideIndex::new(0, 0)));
        assert_eq!(locate_line_impl(text, 3), Some(SlideIndex::new(1, 0)));
        assert_eq!(locate_line_impl(text, 2), None);
    }

    #[test]
    fn test_render_reveal() {
        let html = render_reveal_impl("# One\n--\nTwo", None, None).unwrap();
        assert!(html.starts_with("<section>\n<section data-markdown>"));
        assert!(html.contains("Two"));
    }
}
