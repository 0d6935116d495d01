use serde::{Deserialize, Serialize};

use crate::models::{BLOCK_SEPARATOR, Block};
use crate::parsing::{markdown, markup};

/// Content shown when the editor mounts without restored content
pub const DEFAULT_TEMPLATE: &str = "<h1>Untitled report</h1>\n<p>Start writing here.</p>";

/// Canonical single-stream document.
///
/// The document is the source of truth for content; pages are only a view
/// computed from it. It serializes to and from a markup string at explicit
/// boundaries so nothing downstream ever touches a live rendering surface.
///
/// ```rust
/// # use pageflow_engine::models::Document;
/// let doc = Document::from_markup("<h1>Title</h1><p>Body</p>");
/// assert_eq!(doc.len(), 2);
/// assert_eq!(doc.text(), "Title\nBody");
/// assert_eq!(Document::from_markup(&doc.to_markup()), doc);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parse top-level block elements out of a markup string
    pub fn from_markup(markup: &str) -> Self {
        Self::new(markup::parse_blocks(markup))
    }

    /// Create a document from raw bytes, rejecting invalid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_markup(text))
    }

    /// Import Markdown by rendering it to markup first
    pub fn from_markdown(source: &str) -> Self {
        Self::from_markup(&markdown::markdown_to_markup(source))
    }

    pub fn default_template() -> Self {
        Self::from_markup(DEFAULT_TEMPLATE)
    }

    /// Serialize back to markup, one block per line.
    ///
    /// Parsing the result yields an equal document.
    pub fn to_markup(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.markup.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Flattened visible text, blocks joined by [`BLOCK_SEPARATOR`].
    ///
    /// Canonical offsets index into this string (in chars).
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push(BLOCK_SEPARATOR);
            }
            out.push_str(&block.text());
        }
        out
    }

    /// Length of [`Document::text`] in chars
    pub fn text_len(&self) -> usize {
        let blocks: usize = self.blocks.iter().map(Block::text_len).sum();
        blocks + self.blocks.len().saturating_sub(1)
    }
}

impl FromIterator<Block> for Document {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
