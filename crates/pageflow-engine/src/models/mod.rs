pub mod block;
pub mod document;
pub mod page;

pub use block::{Block, BlockKind};
pub use document::{DEFAULT_TEMPLATE, Document};
pub use page::Page;

/// Separator inserted between consecutive blocks in flattened text.
///
/// It counts as one char, which gives every caret position between two
/// blocks its own offset.
pub const BLOCK_SEPARATOR: char = '\n';
