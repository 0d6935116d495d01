//! Persistent undo history.
//!
//! A fixed-capacity ring of serialized document snapshots plus one meta
//! record, written through a [`HistoryStore`] so it survives a restart.

pub mod manager;
pub mod meta;
pub mod store;

pub use manager::HistoryManager;
pub use meta::{
    ALREADY_AT_NEWEST, ALREADY_AT_OLDEST, DEFAULT_CAPACITY, DEFAULT_NAMESPACE, ENTRY_UNAVAILABLE,
    HistoryConfig, HistoryMeta, HistoryOutcome, HistorySnapshot, HistoryStatus, NO_HISTORY,
    REACHED_NEWEST, REACHED_OLDEST, RedoPolicy, SCHEMA_VERSION, STORAGE_UNAVAILABLE,
};
pub use store::{FileStore, HistoryStore, MemoryStore, StoreError};
