//! Slideshow runtime markup.
//!
//! Renders a deck as `<section data-markdown>` blocks for a Reveal-style
//! runtime: stacks become an outer `<section>` around their children, and
//! notes are re-emitted after a `Note:` line for the runtime's notes plugin.

use crate::types::{Alignment, Deck, Slide, SlideNode};

/// Formatter for slideshow-runtime section markup.
#[derive(Debug, Clone, Default)]
pub struct RevealFormatter {
    /// Alignment applied to every slide, regardless of per-slide directives.
    force_alignment: Option<Alignment>,
}

impl RevealFormatter {
    /// Create a formatter that honors each slide's own alignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force one alignment onto every slide.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.force_alignment = Some(alignment);
        self
    }

    /// Format a whole deck, one top-level section per node.
    ///
    /// # Example output
    /// ```text
    /// <section data-markdown>
    /// <textarea data-template>
    /// # Title
    /// </textarea>
    /// </section>
    /// ```
    pub fn format(&self, deck: &Deck) -> String {
        deck.nodes
            .iter()
            .map(|node| self.format_node(node))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format and add a trailing newline.
    pub fn format_with_newline(&self, deck: &Deck) -> String {
        let formatted = self.format(deck);
        if formatted.is_empty() {
            formatted
        } else {
            format!("{}\n", formatted)
        }
    }

    fn format_node(&self, node: &SlideNode) -> String {
        match node {
            SlideNode::Leaf(slide) => self.format_slide(slide),
            SlideNode::Stack(stack) => {
                let inner = stack
                    .children
                    .iter()
                    .map(|s| self.format_slide(s))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("<section>\n{}\n</section>", inner)
            }
        }
    }

    /// Format a single slide section.
    pub fn format_slide(&self, slide: &Slide) -> String {
        let alignment = self.force_alignment.unwrap_or(slide.alignment);
        let style = match alignment {
            Alignment::Left => " style=\"text-align: left;\"",
            Alignment::Center => "",
        };

        let mut body = escape_textarea(&slide.content);
        if let Some(notes) = &slide.notes {
            body.push_str("\n\nNote:\n");
            body.push_str(&escape_textarea(notes));
        }

        format!(
            "<section data-markdown{}>\n<textarea data-template>\n{}\n</textarea>\n</section>",
            style, body
        )
    }
}

/// Keep slide text from closing the template early.
fn escape_textarea(text: &str) -> String {
    text.replace("</textarea", "&lt;/textarea")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SlideStack, SourceRange};

    fn slide(content: &str, alignment: Alignment, notes: Option<&str>) -> Slide {
        Slide {
            content: content.to_string(),
            notes: notes.map(str::to_string),
            alignment,
            animation: None,
            source_range: SourceRange::new(0, 0),
        }
    }

    #[test]
    fn test_format_empty() {
        let formatter = RevealFormatter::new();
        assert_eq!(formatter.format(&Deck::default()), "");
        assert_eq!(formatter.format_with_newline(&Deck::default()), "");
    }

    #[test]
    fn test_format_leaf() {
        let formatter = RevealFormatter::new();
        let deck = Deck::new(vec![SlideNode::Leaf(slide("# Hi", Alignment::Center, None))]);
        assert_eq!(
            formatter.format(&deck),
            "<section data-markdown>\n<textarea data-template>\n# Hi\n</textarea>\n</section>"
        );
    }

    #[test]
    fn test_format_left_with_notes() {
        let formatter = RevealFormatter::new();
        let out = formatter.format_slide(&slide("## A", Alignment::Left, Some("say hi")));
        assert!(out.starts_with("<section data-markdown style=\"text-align: left;\">"));
        assert!(out.contains("## A\n\nNote:\nsay hi\n</textarea>"));
    }

    #[test]
    fn test_forced_alignment() {
        let formatter = RevealFormatter::new().with_alignment(Alignment::Left);
        let out = formatter.format_slide(&slide("## A", Alignment::Center, None));
        assert!(out.contains("text-align: left;"));
    }

    #[test]
    fn test_format_stack_wraps_children() {
        let formatter = RevealFormatter::new();
        let deck = Deck::new(vec![SlideNode::Stack(SlideStack {
            children: vec![
                slide("## A", Alignment::Center, None),
                slide("### A - B", Alignment::Center, None),
            ],
        })]);
        let out = formatter.format_with_newline(&deck);

        assert!(out.starts_with("<section>\n<section data-markdown>"));
        assert!(out.ends_with("</section>\n</section>\n"));
        assert_eq!(out.matches("<section data-markdown>").count(), 2);
    }

    #[test]
    fn test_textarea_escape() {
        let formatter = RevealFormatter::new();
        let out = formatter.format_slide(&slide("</textarea>", Alignment::Center, None));
        assert!(out.contains("&lt;/textarea>"));
    }
}
