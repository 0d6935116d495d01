use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of snapshots kept before the oldest is overwritten
pub const DEFAULT_CAPACITY: usize = 25;

/// Key prefix for everything the history manager persists
pub const DEFAULT_NAMESPACE: &str = "report_history";

/// Bumped whenever the persisted meta or snapshot layout changes.
///
/// Stored history with a different version is discarded on open.
pub const SCHEMA_VERSION: u32 = 1;

pub const NO_HISTORY: &str = "No history available";
pub const ALREADY_AT_OLDEST: &str = "Already at the oldest state";
pub const REACHED_OLDEST: &str = "Reached the oldest state";
pub const ALREADY_AT_NEWEST: &str = "Already at the newest state";
pub const REACHED_NEWEST: &str = "Reached the newest state";
pub const ENTRY_UNAVAILABLE: &str = "History entry could not be read";
pub const STORAGE_UNAVAILABLE: &str = "History storage unavailable";

/// What happens to undone states when a new edit is saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedoPolicy {
    /// Undone states stay reachable until the ring physically overwrites them
    #[default]
    KeepUntilEvicted,
    /// A new edit after undo discards the undone states, like most editors
    TruncateOnEdit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub namespace: String,
    pub redo_policy: RedoPolicy,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            namespace: DEFAULT_NAMESPACE.to_string(),
            redo_policy: RedoPolicy::default(),
        }
    }
}

/// Position bookkeeping of the circular snapshot buffer.
///
/// `size` is in `0..=capacity` and every index is in `0..capacity`. While
/// populated, live slots run from `tail_index` forward to `head_index`
/// (wrapping), and `current_index` lies somewhere in that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMeta {
    pub current_index: usize,
    pub head_index: usize,
    pub tail_index: usize,
    pub size: usize,
    #[serde(default)]
    pub schema_version: u32,
}

impl HistoryMeta {
    /// Empty buffer positioned so the first save lands in slot 0
    pub fn empty(capacity: usize) -> Self {
        let last = capacity.saturating_sub(1);
        Self {
            current_index: last,
            head_index: last,
            tail_index: 0,
            size: 0,
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Steps from the tail forward to `index`, wrapping
    pub fn offset_from_tail(&self, index: usize, capacity: usize) -> usize {
        (index + capacity - self.tail_index) % capacity
    }

    /// One past the highest slot index this record refers to
    pub fn slot_bound(&self) -> usize {
        self.current_index
            .max(self.head_index)
            .max(self.tail_index)
            .saturating_add(1)
    }

    /// Check a record read back from storage against the buffer invariants
    pub fn is_valid(&self, capacity: usize) -> bool {
        if self.schema_version != SCHEMA_VERSION || self.size > capacity {
            return false;
        }
        let in_range = [self.current_index, self.head_index, self.tail_index]
            .iter()
            .all(|index| *index < capacity);
        if !in_range {
            return false;
        }
        if self.size == 0 {
            return true;
        }
        self.offset_from_tail(self.head_index, capacity) == self.size - 1
            && self.offset_from_tail(self.current_index, capacity) < self.size
    }
}

/// One serialized document stored in the buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub slot_index: usize,
}

/// Undo/redo availability, derived purely from [`HistoryMeta`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_index: usize,
    pub total_states: usize,
    pub is_at_oldest: bool,
    pub is_at_newest: bool,
}

impl HistoryStatus {
    pub fn from_meta(meta: &HistoryMeta) -> Self {
        let populated = !meta.is_empty();
        let at_oldest = !populated || meta.current_index == meta.tail_index;
        let at_newest = !populated || meta.current_index == meta.head_index;
        Self {
            can_undo: !at_oldest,
            can_redo: !at_newest,
            current_index: meta.current_index,
            total_states: meta.size,
            is_at_oldest: at_oldest,
            is_at_newest: at_newest,
        }
    }
}

/// Result of an undo or redo request.
///
/// Boundaries and storage faults are reported here as `content: None` plus a
/// short message for a transient notification, never as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOutcome {
    pub content: Option<String>,
    pub status: HistoryStatus,
    pub message: Option<String>,
}

impl HistoryOutcome {
    /// True when a snapshot was returned and the caller should apply it
    pub fn is_applied(&self) -> bool {
        self.content.is_some()
    }
}
