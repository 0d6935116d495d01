use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::history::{HistoryStore, MemoryStore, StoreError};
use crate::layout::MeasureError;
use crate::models::{Block, Document};
use tempfile::TempDir;

/// Document of `<p>Paragraph N</p>` blocks, numbered from 1
pub fn numbered_paragraphs(count: usize) -> Document {
    (1..=count)
        .map(|n| Block::paragraph(&format!("Paragraph {n}")))
        .collect()
}

/// Measurer for [`numbered_paragraphs`] documents: paragraph N is
/// `heights[N - 1]` tall. Anything else cannot be measured.
pub fn fixed_heights(heights: &[f64]) -> impl Fn(&Block) -> Result<f64, MeasureError> + use<> {
    let heights = heights.to_vec();
    move |block: &Block| {
        block
            .text()
            .strip_prefix("Paragraph ")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| heights.get(n.wrapping_sub(1)).copied())
            .ok_or(MeasureError::NotRendered)
    }
}

/// Measurer that gives every block the same height
pub fn uniform_height(height: f64) -> impl Fn(&Block) -> Result<f64, MeasureError> {
    move |_: &Block| Ok(height)
}

pub fn create_test_store_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Store whose reads or writes can be switched off after history was written.
/// The switches are shared, so clones of them keep working once the store
/// has moved into a manager.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: Rc<Cell<bool>>,
    pub fail_writes: Rc<Cell<bool>>,
}

impl HistoryStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}
