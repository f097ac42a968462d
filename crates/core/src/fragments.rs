//! Fragment annotation injection.
//!
//! Rewrites a slide body so every block reveals progressively: block
//! constructs get one trailing `<!-- .element: ... -->` annotation, plain list
//! items get their text wrapped in a fragment span, and other text lines get
//! an annotation on the following line.

use crate::directives::{is_notes_marker, ALIGN_LEFT_DIRECTIVE, FRAGMENT_DIRECTIVE};
use crate::lines::heading_level;
use regex::Regex;
use std::sync::LazyLock;

/// Ordered or unordered list item: indent, marker, text.
static LIST_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+[.)])\s+(.*)$").unwrap());

/// Task-list checkbox at the start of an item's text.
static CHECKBOX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[ xX]\]").unwrap());

/// Three or more of the same `-`, `*` or `_`, optionally spaced.
static THEMATIC_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// Prefix of an existing runtime attribute comment (`.element`, `.slide`).
const ATTRIBUTE_COMMENT: &str = "<!-- .";

/// Substring that marks the previous line as already annotated.
const ANNOTATION_MARK: &str = "<!-- .element";

/// The multi-line block currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Code,
    Math,
    Table,
    Quote,
}

/// Injects fragment annotations for one animation style.
#[derive(Debug, Clone)]
pub struct FragmentInjector {
    annotation: String,
    span_open: String,
}

impl FragmentInjector {
    /// Create an injector for the named style.
    pub fn new(animation: &str) -> Self {
        Self {
            annotation: format!("<!-- .element: class=\"fragment {}\" -->", animation),
            span_open: format!("<span class=\"fragment {}\">", animation),
        }
    }

    /// The block-level annotation line.
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Annotate `content` line by line.
    pub fn inject(&self, content: &str) -> String {
        let lines: Vec<&str> = content.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len() * 2);
        let mut block = Block::None;
        let mut in_notes = false;

        for (idx, &line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            let next = lines.get(idx + 1).map(|l| l.trim());

            if in_notes {
                out.push(line.to_string());
                continue;
            }

            match block {
                Block::Code => {
                    out.push(line.to_string());
                    if trimmed.starts_with("```") {
                        out.push(self.annotation.clone());
                        block = Block::None;
                    }
                    continue;
                }
                Block::Math => {
                    out.push(line.to_string());
                    if trimmed.ends_with("$$") {
                        out.push(self.annotation.clone());
                        block = Block::None;
                    }
                    continue;
                }
                Block::Table | Block::Quote | Block::None => {}
            }

            if trimmed.starts_with("```") {
                block = self.close(block, &mut out);
                out.push(line.to_string());
                block = Block::Code;
                continue;
            }

            if trimmed.starts_with("$$") {
                block = self.close(block, &mut out);
                out.push(line.to_string());
                if trimmed.len() > 2 && trimmed.ends_with("$$") {
                    out.push(self.annotation.clone());
                } else {
                    block = Block::Math;
                }
                continue;
            }

            if let Some(kind) = row_block(trimmed) {
                if block != kind {
                    block = self.close(block, &mut out);
                }
                out.push(line.to_string());
                block = kind;
                if next.and_then(row_block) != Some(kind) {
                    block = self.close(block, &mut out);
                }
                continue;
            }

            if is_passthrough(line, trimmed) {
                if is_notes_marker(line) {
                    in_notes = true;
                }
                out.push(line.to_string());
                continue;
            }

            match LIST_ITEM_REGEX.captures(line) {
                Some(caps) if CHECKBOX_REGEX.is_match(&caps[3]) => {
                    out.push(line.to_string());
                    self.annotate(next, &mut out);
                }
                Some(caps) if !caps[3].trim().is_empty() => {
                    out.push(format!(
                        "{}{} {}{}</span>",
                        &caps[1], &caps[2], self.span_open, &caps[3]
                    ));
                }
                _ => {
                    out.push(line.to_string());
                    self.annotate(next, &mut out);
                }
            }
        }

        if matches!(block, Block::Code | Block::Math) {
            log::warn!("Unterminated {:?} block left without fragment annotation", block);
        }
        self.close(block, &mut out);

        out.join("\n")
    }

    /// Annotate the line just pushed unless the author already did.
    fn annotate(&self, next: Option<&str>, out: &mut Vec<String>) {
        if !next.is_some_and(|l| l.contains(ANNOTATION_MARK)) {
            out.push(self.annotation.clone());
        }
    }

    /// Close an open table or quote with its annotation.
    fn close(&self, block: Block, out: &mut Vec<String>) -> Block {
        if matches!(block, Block::Table | Block::Quote) {
            out.push(self.annotation.clone());
        }
        Block::None
    }
}

/// Table rows and quote lines are grouped into one block each.
fn row_block(trimmed: &str) -> Option<Block> {
    if trimmed.starts_with('|') {
        Some(Block::Table)
    } else if trimmed.starts_with('>') {
        Some(Block::Quote)
    } else {
        None
    }
}

/// Lines that are never annotated.
fn is_passthrough(line: &str, trimmed: &str) -> bool {
    trimmed.is_empty()
        || heading_level(line).is_some()
        || trimmed == "---"
        || trimmed == "--"
        || THEMATIC_BREAK_REGEX.is_match(line)
        || trimmed.starts_with(ALIGN_LEFT_DIRECTIVE)
        || trimmed.starts_with(FRAGMENT_DIRECTIVE)
        || is_notes_marker(line)
        || line.contains(ATTRIBUTE_COMMENT)
}

/// Apply `animation` to `content`; `None` or `"none"` leaves it unchanged.
pub fn inject_fragments(content: &str, animation: Option<&str>) -> String {
    match animation {
        Some(name) if !name.is_empty() && name != "none" => {
            FragmentInjector::new(name).inject(content)
        }
        _ => content.to_string(),
    }
}
