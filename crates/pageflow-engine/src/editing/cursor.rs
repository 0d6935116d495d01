//! Cursor position translator.
//!
//! A live position on the surface is `(page, block, char offset in block)`,
//! which is meaningless once the pages are rebuilt. Before a reflow the
//! position is captured as a page-relative [`CursorAddress`]; after the
//! reflow it is carried through a page-independent [`CanonicalOffset`] onto
//! the new page list and written back to the surface.
//!
//! Offsets count chars of visible text in document order. Consecutive blocks
//! are separated by one virtual char (see
//! [`BLOCK_SEPARATOR`](crate::models::BLOCK_SEPARATOR)), so the end of one
//! block and the start of the next are distinct positions.

use serde::{Deserialize, Serialize};

use crate::models::Page;

/// A caret position on the live surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// 0-based page index
    pub page: usize,
    /// 0-based block index within the page
    pub block: usize,
    /// Char offset within the block's visible text
    pub offset: usize,
}

impl SurfacePoint {
    pub fn new(page: usize, block: usize, offset: usize) -> Self {
        Self {
            page,
            block,
            offset,
        }
    }
}

/// The surface's active selection: a caret when anchor and focus coincide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: SurfacePoint,
    pub focus: SurfacePoint,
}

impl Selection {
    pub fn caret(point: SurfacePoint) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn range(anchor: SurfacePoint, focus: SurfacePoint) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Live selection read/write capability of the edit surface
pub trait SelectionSurface {
    fn selection(&self) -> Option<Selection>;
    fn set_selection(&mut self, selection: Selection);
}

/// Page-relative edit position captured before a reflow.
///
/// Only meaningful against the page list that produced it; use [`carry`] to
/// move it onto a different page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorAddress {
    pub page_index: usize,
    /// Chars from the start of the page's text to the anchor
    pub char_offset: usize,
    pub collapsed: bool,
    /// Offset of the range focus when it lies on the same page
    pub focus_offset: Option<usize>,
}

impl CursorAddress {
    pub fn caret(page_index: usize, char_offset: usize) -> Self {
        Self {
            page_index,
            char_offset,
            collapsed: true,
            focus_offset: None,
        }
    }
}

/// Offset into the flattened text of the whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalOffset(pub usize);

/// Capture the active selection as a page-relative address.
///
/// Returns `None` when there is no selection or it points outside `pages`;
/// callers then skip the restore step.
pub fn save_cursor(selection: Option<&Selection>, pages: &[Page]) -> Option<CursorAddress> {
    let Some(selection) = selection else {
        log::debug!("No active selection, cursor not saved");
        return None;
    };
    let anchor = selection.anchor;
    let Some(char_offset) = pages.get(anchor.page).and_then(|page| page_offset(page, anchor)) else {
        log::debug!("Selection anchor {anchor:?} is outside the page list");
        return None;
    };

    let collapsed = selection.is_collapsed();
    let focus_offset = if collapsed || selection.focus.page != anchor.page {
        None
    } else {
        page_offset(&pages[anchor.page], selection.focus)
    };

    Some(CursorAddress {
        page_index: anchor.page,
        char_offset,
        collapsed,
        focus_offset,
    })
}

/// Resolve an address to a surface selection without applying it.
///
/// Offsets past the end of the page clamp to the end of its last block.
pub fn resolve(address: &CursorAddress, pages: &[Page]) -> Option<Selection> {
    let page = pages.get(address.page_index)?;
    let anchor = point_at(page, address.page_index, address.char_offset)?;
    let focus = match address.focus_offset {
        Some(offset) if !address.collapsed => point_at(page, address.page_index, offset)?,
        _ => anchor,
    };
    Some(Selection { anchor, focus })
}

/// Place the caret/selection described by `address` on the surface.
///
/// A page index that no longer exists (pages can disappear after edits) is
/// silently skipped.
pub fn restore_cursor<S>(address: &CursorAddress, pages: &[Page], surface: &mut S)
where
    S: SelectionSurface + ?Sized,
{
    match resolve(address, pages) {
        Some(selection) => surface.set_selection(selection),
        None => log::debug!(
            "Cursor page {} not present in {} pages, restore skipped",
            address.page_index,
            pages.len()
        ),
    }
}

/// Convert a page-relative address into a document-wide offset
pub fn to_canonical(address: &CursorAddress, pages: &[Page]) -> Option<CanonicalOffset> {
    let page = pages.get(address.page_index)?;
    let start = page_start(pages, address.page_index);
    Some(CanonicalOffset(start + address.char_offset.min(page.text_len())))
}

/// Convert a document-wide offset into a caret address on `pages`.
///
/// Offsets past the end clamp to the end of the last page. Returns `None`
/// only when no page holds any block.
pub fn from_canonical(offset: CanonicalOffset, pages: &[Page]) -> Option<CursorAddress> {
    let mut remaining = offset.0;
    let mut last = None;
    for (index, page) in pages.iter().enumerate() {
        if page.is_empty() {
            continue;
        }
        let len = page.text_len();
        if remaining <= len {
            return Some(CursorAddress::caret(index, remaining));
        }
        remaining -= len + 1;
        last = Some((index, len));
    }
    last.map(|(index, len)| CursorAddress::caret(index, len))
}

/// Move an address captured on `from` onto the equivalent text position in
/// `to`, typically the pages before and after a reflow.
///
/// A range whose focus ends up on a different page than its anchor is
/// reduced to a caret at the anchor.
pub fn carry(address: &CursorAddress, from: &[Page], to: &[Page]) -> Option<CursorAddress> {
    let anchor = from_canonical(to_canonical(address, from)?, to)?;

    let focus_offset = match address.focus_offset {
        Some(offset) if !address.collapsed => {
            let focus = CursorAddress {
                char_offset: offset,
                ..*address
            };
            to_canonical(&focus, from)
                .and_then(|canonical| from_canonical(canonical, to))
                .filter(|moved| moved.page_index == anchor.page_index)
                .map(|moved| moved.char_offset)
        }
        _ => None,
    };

    Some(CursorAddress {
        page_index: anchor.page_index,
        char_offset: anchor.char_offset,
        collapsed: address.collapsed,
        focus_offset,
    })
}

/// Chars from the start of the page to `point`, clamping the in-block offset
fn page_offset(page: &Page, point: SurfacePoint) -> Option<usize> {
    let lens = page.block_text_lens();
    let block_len = *lens.get(point.block)?;
    let before: usize = lens[..point.block].iter().map(|len| len + 1).sum();
    Some(before + point.offset.min(block_len))
}

/// Walk the page's blocks in text order to the given offset
fn point_at(page: &Page, page_index: usize, offset: usize) -> Option<SurfacePoint> {
    let lens = page.block_text_lens();
    let last = lens.len().checked_sub(1)?;
    let mut remaining = offset;
    for (block, len) in lens.iter().enumerate() {
        if remaining <= *len {
            return Some(SurfacePoint::new(page_index, block, remaining));
        }
        remaining -= len + 1;
    }
    Some(SurfacePoint::new(page_index, last, lens[last]))
}

/// Canonical offset of the first char of page `index`
fn page_start(pages: &[Page], index: usize) -> usize {
    pages[..index]
        .iter()
        .filter(|page| !page.is_empty())
        .map(|page| page.text_len() + 1)
        .sum()
}
