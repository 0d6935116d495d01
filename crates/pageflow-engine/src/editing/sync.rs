//! Content synchronizer: the inverse of pagination.
//!
//! Edits land on pages, but the [`Document`] is the source of truth. After
//! each edit the pages are folded back into one document and split again, so
//! pages are never patched incrementally.

use crate::layout::{MeasureBlock, PageCapacity, paginate};
use crate::models::{Block, Document, Page};
use crate::parsing::{has_class, inner_markup, parse_blocks};

/// Concatenate page blocks, in page order, into one document.
///
/// Page chrome (page-number footers and similar) is excluded.
pub fn flatten(pages: &[Page]) -> Document {
    pages
        .iter()
        .flat_map(|page| page.blocks.iter())
        .filter(|block| !block.is_page_chrome())
        .cloned()
        .collect()
}

/// Split a document into pages; see [`paginate`]
pub fn split<M>(document: &Document, capacity: &PageCapacity, measure: &M) -> Vec<Page>
where
    M: MeasureBlock + ?Sized,
{
    paginate(document, capacity, measure)
}

/// Flatten then split again, returning both the canonical document and the
/// fresh page list
pub fn reflow<M>(pages: &[Page], capacity: &PageCapacity, measure: &M) -> (Document, Vec<Page>)
where
    M: MeasureBlock + ?Sized,
{
    let document = flatten(pages);
    let pages = split(&document, capacity, measure);
    (document, pages)
}

/// Flatten serialized page containers as read back from the edit surface.
///
/// Each entry is usually the output of [`Page::to_markup`] after the user
/// edited it. Page containers are unwrapped and chrome elements dropped;
/// anything else at the top level is kept as content.
pub fn flatten_markup<S: AsRef<str>>(page_markups: &[S]) -> Document {
    let mut blocks = Vec::new();
    for markup in page_markups {
        collect_content_blocks(markup.as_ref(), &mut blocks);
    }
    Document::new(blocks)
}

/// Rebuild the edited page list from serialized page containers, one
/// [`Page`] per container and numbered in order.
///
/// Top-level content outside any container joins the page before it, or
/// opens the first page. Heights are unknown until the next split.
pub fn pages_from_markup(markup: &str) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    for block in parse_blocks(markup) {
        if block.is_page_chrome() {
            continue;
        }
        if is_page_container(&block) {
            let mut page = Page::new(pages.len() + 1);
            if let Some(inner) = inner_markup(&block.markup) {
                collect_content_blocks(inner, &mut page.blocks);
            }
            pages.push(page);
            continue;
        }
        match pages.last_mut() {
            Some(page) => page.blocks.push(block),
            None => pages.push(Page::with_blocks(1, vec![block])),
        }
    }
    pages
}

fn collect_content_blocks(markup: &str, out: &mut Vec<Block>) {
    for block in parse_blocks(markup) {
        if block.is_page_chrome() {
            continue;
        }
        if is_page_container(&block) {
            if let Some(inner) = inner_markup(&block.markup) {
                collect_content_blocks(inner, out);
            }
            continue;
        }
        out.push(block);
    }
}

fn is_page_container(block: &Block) -> bool {
    block.attribute("data-page").is_some() || has_class(&block.markup, "page")
}
