use std::fmt;

use crate::layout::{MeasureBlock, PageCapacity};
use crate::models::{Block, Document, Page};

/// Partition a document's blocks into pages under a height budget.
///
/// Blocks are taken in order and accumulated onto the current page. A page
/// is closed when the next block would push it past
/// [`PageCapacity::content_height`] **and** it already holds something, so:
///
/// - every returned page holds at least one block;
/// - a block taller than the budget still lands alone on its own page
///   (forward progress, no infinite loop);
/// - an empty document yields no pages at all.
///
/// Blocks the measurer cannot evaluate count as exactly one budget tall and
/// always sit on a page of their own, even next to zero-height neighbours,
/// instead of failing the reflow.
///
/// ```rust
/// # use pageflow_engine::layout::{paginate, PageCapacity, MeasureError};
/// # use pageflow_engine::models::{Block, Document};
/// let doc = Document::from_markup("<p>a</p><p>b</p><p>c</p>");
/// let measure = |_: &Block| -> Result<f64, MeasureError> { Ok(40.0) };
/// let pages = paginate(&doc, &PageCapacity::with_content_height(100.0), &measure);
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages[0].blocks.len(), 2);
/// ```
pub fn paginate<M>(document: &Document, capacity: &PageCapacity, measure: &M) -> Vec<Page>
where
    M: MeasureBlock + ?Sized,
{
    let budget = capacity.content_height();
    let mut pages = Vec::new();
    let mut current = Page::new(1);
    // The current page holds a degraded block and takes nothing more
    let mut sealed = false;

    for block in document.blocks() {
        let measured = measured_height(block, measure);
        let height = measured.unwrap_or(budget);
        let overflows = current.used_height + height > budget;
        if !current.is_empty() && (sealed || measured.is_none() || overflows) {
            let next = Page::new(current.number + 1);
            pages.push(std::mem::replace(&mut current, next));
        }
        current.used_height += height;
        current.blocks.push(block.clone());
        sealed = measured.is_none();
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

/// Usable height of `block`, or `None` when measurement degraded
fn measured_height<M>(block: &Block, measure: &M) -> Option<f64>
where
    M: MeasureBlock + ?Sized,
{
    match measure.measure(block) {
        Ok(height) if height.is_finite() && height >= 0.0 => Some(height),
        Ok(height) => {
            log::debug!(
                "Invalid height {height} for {} block, treating as capacity-sized",
                block.kind.label()
            );
            None
        }
        Err(e) => {
            log::debug!(
                "Could not measure {} block ({e}), treating as capacity-sized",
                block.kind.label()
            );
            None
        }
    }
}

/// Per-page line of a [`PaginationReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub number: usize,
    pub kinds: Vec<String>,
    pub used_height: f64,
    /// The page holds a single block taller than the budget
    pub oversized: bool,
}

/// Human-readable summary of a pagination result
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationReport {
    pub budget: f64,
    pub pages: Vec<PageSummary>,
}

impl PaginationReport {
    pub fn new(pages: &[Page], capacity: &PageCapacity) -> Self {
        let budget = capacity.content_height();
        let pages = pages
            .iter()
            .map(|page| PageSummary {
                number: page.number,
                kinds: page.blocks.iter().map(|b| b.kind.label()).collect(),
                used_height: page.used_height,
                oversized: page.used_height > budget,
            })
            .collect();
        Self { budget, pages }
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|page| page.kinds.len()).sum()
    }
}

impl fmt::Display for PaginationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            write!(
                f,
                "page {}: {} ({:.0}/{:.0})",
                page.number,
                page.kinds.join(", "),
                page.used_height,
                self.budget
            )?;
            if page.oversized {
                write!(f, " oversized")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
