//! Boundary between serialized markup and the typed block model.
//!
//! - **`markup`**: tolerant top-level block scanner and attribute lookup
//! - **`text`**: visible-text extraction used for cursor offsets
//! - **`markdown`**: Markdown import via pulldown-cmark

pub mod markdown;
pub mod markup;
pub mod text;

pub use markdown::markdown_to_markup;
pub use markup::{PAGE_CHROME_ATTR, attribute, classify, has_class, inner_markup, parse_blocks};
pub use text::visible_text;
