use serde::{Deserialize, Serialize};

use crate::models::Block;
use crate::parsing::markup::PAGE_CHROME_ATTR;

/// A contiguous, capacity-bounded run of blocks produced by pagination.
///
/// Pages are a view, never a source of truth: they are rebuilt in full on
/// every reflow and folded back into a [`Document`](crate::models::Document)
/// by the synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based display number
    pub number: usize,
    pub blocks: Vec<Block>,
    /// Sum of the measured block heights placed on this page
    pub used_height: f64,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            blocks: Vec::new(),
            used_height: 0.0,
        }
    }

    /// Page built from already measured blocks, mainly for surfaces and tests
    pub fn with_blocks(number: usize, blocks: Vec<Block>) -> Self {
        Self {
            number,
            blocks,
            used_height: 0.0,
        }
    }

    /// 0-based position of this page in its page list
    pub fn index(&self) -> usize {
        self.number.saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Text length of each block, in order
    pub fn block_text_lens(&self) -> Vec<usize> {
        self.blocks.iter().map(Block::text_len).collect()
    }

    /// Length of the page's flattened text in chars, including the one-char
    /// separator between consecutive blocks
    pub fn text_len(&self) -> usize {
        let blocks: usize = self.block_text_lens().iter().sum();
        blocks + self.blocks.len().saturating_sub(1)
    }

    /// Render the page container handed to the edit surface.
    ///
    /// The page-number footer is marked as chrome so
    /// [`flatten_markup`](crate::editing::sync::flatten_markup) can drop it.
    pub fn to_markup(&self) -> String {
        let mut out = format!("<section class=\"page\" data-page=\"{}\">\n", self.number);
        for block in &self.blocks {
            out.push_str(&block.markup);
            out.push('\n');
        }
        out.push_str(&format!(
            "<footer class=\"page-number\" {PAGE_CHROME_ATTR}>{}</footer>\n",
            self.number
        ));
        out.push_str("</section>");
        out
    }
}
