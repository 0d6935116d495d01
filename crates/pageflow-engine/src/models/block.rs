use serde::{Deserialize, Serialize};

use crate::parsing::{markup, text};

/// Block-level content classification.
///
/// The kind is derived from the element's tag when markup is parsed and only
/// drives measurement heuristics and reporting. The raw markup is always the
/// source of truth for what the block contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// `<p>`
    Paragraph,
    /// `<h1>` to `<h6>`
    Heading { level: u8 },
    /// `<table>`
    Table,
    /// `<img>` or `<figure>`
    Image,
    /// `<hr>`
    Rule,
    /// `<ul>` / `<ol>`
    List { ordered: bool },
    /// `<blockquote>`
    BlockQuote,
    /// `<pre>`
    CodeBlock,
    /// Any other top-level element (`<div>`, `<section>`, ...)
    Other { tag: String },
    /// Bare top-level text that is not wrapped in an element
    Text,
    /// Top-level `<!-- comment -->`
    Comment,
}

impl BlockKind {
    /// Short lowercase label used in logs and reports
    pub fn label(&self) -> String {
        match self {
            BlockKind::Paragraph => "paragraph".to_string(),
            BlockKind::Heading { level } => format!("h{level}"),
            BlockKind::Table => "table".to_string(),
            BlockKind::Image => "image".to_string(),
            BlockKind::Rule => "rule".to_string(),
            BlockKind::List { ordered: true } => "ordered-list".to_string(),
            BlockKind::List { ordered: false } => "list".to_string(),
            BlockKind::BlockQuote => "blockquote".to_string(),
            BlockKind::CodeBlock => "code".to_string(),
            BlockKind::Other { tag } => tag.clone(),
            BlockKind::Text => "text".to_string(),
            BlockKind::Comment => "comment".to_string(),
        }
    }
}

/// A single block-level content unit of a [`Document`](crate::models::Document).
///
/// Blocks carry their raw markup verbatim. Height is never stored here; it is
/// measured on demand by a [`MeasureBlock`](crate::layout::MeasureBlock)
/// capability during pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub markup: String,
}

impl Block {
    pub fn new(kind: BlockKind, markup: impl Into<String>) -> Self {
        Self {
            kind,
            markup: markup.into(),
        }
    }

    /// Build a block from a single fragment of markup, classifying it by tag.
    ///
    /// Only the first top-level node is kept; an empty fragment yields an
    /// empty text block.
    pub fn from_markup(markup: &str) -> Self {
        markup::parse_blocks(markup)
            .into_iter()
            .next()
            .unwrap_or_else(|| Block::new(BlockKind::Text, ""))
    }

    pub fn paragraph(text: &str) -> Self {
        let escaped = html_escape::encode_text(text);
        Self::new(BlockKind::Paragraph, format!("<p>{escaped}</p>"))
    }

    pub fn heading(level: u8, text: &str) -> Self {
        let level = level.clamp(1, 6);
        let escaped = html_escape::encode_text(text);
        Self::new(
            BlockKind::Heading { level },
            format!("<h{level}>{escaped}</h{level}>"),
        )
    }

    pub fn rule() -> Self {
        Self::new(BlockKind::Rule, "<hr>")
    }

    pub fn image(src: &str, height: u32) -> Self {
        let src = html_escape::encode_double_quoted_attribute(src);
        Self::new(
            BlockKind::Image,
            format!("<img src=\"{src}\" height=\"{height}\">"),
        )
    }

    /// Visible text of the block in document order.
    ///
    /// Tags and comments are dropped, entities decoded, and whitespace
    /// collapsed the way a browser lays it out (code blocks keep theirs).
    pub fn text(&self) -> String {
        let preserve = matches!(self.kind, BlockKind::CodeBlock);
        match self.kind {
            BlockKind::Comment => String::new(),
            _ => text::visible_text(&self.markup, preserve),
        }
    }

    /// Length of [`Block::text`] in chars
    pub fn text_len(&self) -> usize {
        self.text().chars().count()
    }

    /// Lowercase tag name of the block's outer element, if it is an element
    pub fn tag(&self) -> Option<String> {
        markup::open_tag_name(&self.markup)
    }

    /// Value of an attribute on the block's outer element.
    ///
    /// Attributes without a value (`<div hidden>`) return an empty string.
    pub fn attribute(&self, name: &str) -> Option<String> {
        markup::attribute(&self.markup, name)
    }

    /// True for page-only markup (page number footers and similar) that must
    /// never be folded back into the document.
    pub fn is_page_chrome(&self) -> bool {
        self.attribute(markup::PAGE_CHROME_ATTR).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paragraph_escapes_text() {
        let block = Block::paragraph("a < b & c");
        assert_eq!(block.markup, "<p>a &lt; b &amp; c</p>");
        assert_eq!(block.text(), "a < b & c");
        assert_eq!(block.text_len(), 9);
    }

    #[test]
    fn heading_level_is_clamped() {
        let block = Block::heading(9, "Title");
        assert_eq!(block.kind, BlockKind::Heading { level: 6 });
        assert_eq!(block.markup, "<h6>Title</h6>");
    }

    #[test]
    fn from_markup_classifies_by_tag() {
        assert_eq!(Block::from_markup("<table></table>").kind, BlockKind::Table);
        assert_eq!(
            Block::from_markup("<ol><li>x</li></ol>").kind,
            BlockKind::List { ordered: true }
        );
        assert_eq!(
            Block::from_markup("<div>x</div>").kind,
            BlockKind::Other {
                tag: "div".to_string()
            }
        );
    }

    #[test]
    fn image_and_rule_have_no_text() {
        assert_eq!(Block::image("chart.png", 120).text_len(), 0);
        assert_eq!(Block::rule().text_len(), 0);
    }

    #[test]
    fn attribute_lookup_reads_outer_element_only() {
        let block = Block::from_markup(r#"<div class="note"><span class="inner">x</span></div>"#);
        assert_eq!(block.attribute("class"), Some("note".to_string()));
        assert_eq!(block.tag(), Some("div".to_string()));
    }

    #[test]
    fn page_chrome_is_detected_by_marker_attribute() {
        let footer = Block::from_markup(r#"<footer data-page-chrome>3</footer>"#);
        assert!(footer.is_page_chrome());
        assert!(!Block::paragraph("3").is_page_chrome());
    }

    #[test]
    fn comments_contribute_no_text() {
        let block = Block::from_markup("<!-- note to self -->");
        assert_eq!(block.kind, BlockKind::Comment);
        assert_eq!(block.text(), "");
    }
}
