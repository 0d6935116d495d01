//! Pagination engine.
//!
//! Splits a [`Document`](crate::models::Document) into [`Page`](crate::models::Page)s
//! under a measured height budget. Measurement is an injected capability so
//! the engine never touches a rendering surface.

pub mod capacity;
pub mod measure;
pub mod paginate;

pub use capacity::PageCapacity;
pub use measure::{MeasureBlock, MeasureError, TextMetrics};
pub use paginate::{PageSummary, PaginationReport, paginate};
