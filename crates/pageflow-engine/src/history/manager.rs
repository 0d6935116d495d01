use chrono::Utc;

use super::meta::{
    ALREADY_AT_NEWEST, ALREADY_AT_OLDEST, ENTRY_UNAVAILABLE, HistoryConfig, HistoryMeta,
    HistoryOutcome, HistorySnapshot, HistoryStatus, NO_HISTORY, REACHED_NEWEST, REACHED_OLDEST,
    RedoPolicy, STORAGE_UNAVAILABLE,
};
use super::store::{HistoryStore, StoreError};

/// Highest slot index swept when clearing out a discarded history
const STALE_SLOT_LIMIT: usize = 4096;

/// Direction of a pointer move through the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Back,
    Forward,
}

/// Why a slot could not be handed out
enum SlotFault {
    Missing,
    Store(StoreError),
}

/// Persistent circular undo log.
///
/// Holds at most `capacity` snapshots of serialized document content. Every
/// mutation writes the touched slot and then the meta record through the
/// injected [`HistoryStore`]. Storage faults never surface as errors: they
/// are logged and reported as "no data" outcomes.
///
/// When the stored meta cannot be read at open, the manager stays empty and
/// refuses to write until it is reopened or explicitly cleared, so a
/// transient read fault never overwrites the persisted log.
#[derive(Debug)]
pub struct HistoryManager<S: HistoryStore> {
    store: S,
    config: HistoryConfig,
    meta: HistoryMeta,
    available: bool,
}

impl<S: HistoryStore> HistoryManager<S> {
    /// Open with the default configuration
    pub fn new(store: S) -> Self {
        Self::open(store, HistoryConfig::default())
    }

    /// Restore the buffer position persisted in `store`, if any.
    ///
    /// A meta record that cannot be parsed, or that violates the buffer
    /// invariants, is discarded together with its slots. A store that fails
    /// to answer leaves everything in place and disables writes.
    pub fn open(store: S, mut config: HistoryConfig) -> Self {
        config.capacity = config.capacity.max(1);
        let mut manager = Self {
            meta: HistoryMeta::empty(config.capacity),
            store,
            config,
            available: true,
        };

        let key = manager.meta_key();
        match manager.store.get(&key) {
            Ok(None) => {
                log::debug!("No stored history under '{}'", manager.config.namespace);
            }
            Ok(Some(json)) => match serde_json::from_str::<HistoryMeta>(&json) {
                Ok(meta) if meta.is_valid(manager.config.capacity) => {
                    log::info!(
                        "Restored history '{}' with {} states",
                        manager.config.namespace,
                        meta.size
                    );
                    manager.meta = meta;
                }
                Ok(meta) => {
                    log::warn!(
                        "Discarding stored history '{}': incompatible meta {:?}",
                        manager.config.namespace,
                        meta
                    );
                    manager.remove_all(meta.slot_bound());
                }
                Err(e) => {
                    log::warn!(
                        "Discarding stored history '{}': {}",
                        manager.config.namespace,
                        e
                    );
                    manager.remove_all(0);
                }
            },
            Err(e) => {
                log::warn!("History storage unavailable, writes disabled: {}", e);
                manager.available = false;
            }
        }
        manager
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn meta(&self) -> &HistoryMeta {
        &self.meta
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// False when the stored history could not be read at open
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus::from_meta(&self.meta)
    }

    /// Append `content` as the newest state and make it current.
    ///
    /// Returns `None` when nothing was recorded: the store is unavailable or
    /// the slot write failed. History is then left exactly as it was.
    pub fn save_to_history(&mut self, content: &str) -> Option<HistoryStatus> {
        if !self.available {
            log::warn!("History storage unavailable, snapshot not saved");
            return None;
        }
        let capacity = self.config.capacity;
        let truncate = self.config.redo_policy == RedoPolicy::TruncateOnEdit
            && !self.meta.is_empty()
            && self.meta.current_index != self.meta.head_index;

        let mut next = self.meta;
        let slot = if truncate {
            let kept = self.meta.offset_from_tail(self.meta.current_index, capacity) + 1;
            let slot = (self.meta.current_index + 1) % capacity;
            next.size = kept + 1;
            slot
        } else {
            let slot = (self.meta.head_index + 1) % capacity;
            if self.meta.size == capacity {
                next.tail_index = (self.meta.tail_index + 1) % capacity;
            } else {
                next.size += 1;
            }
            slot
        };
        if self.meta.is_empty() {
            next.tail_index = slot;
        }
        next.head_index = slot;
        next.current_index = slot;

        let snapshot = HistorySnapshot {
            content: content.to_string(),
            timestamp: Utc::now(),
            slot_index: slot,
        };
        if let Err(e) = self.write_slot(&snapshot) {
            log::warn!("Failed to save history slot {}: {}", slot, e);
            return None;
        }

        if truncate {
            self.remove_orphans(slot, self.meta.head_index);
        }
        self.meta = next;
        self.write_meta();
        log::debug!(
            "Saved history slot {} ({} of {})",
            slot,
            self.meta.size,
            capacity
        );
        Some(self.status())
    }

    /// Step back one state
    pub fn undo(&mut self) -> HistoryOutcome {
        self.step(Step::Back)
    }

    /// Step forward one state
    pub fn redo(&mut self) -> HistoryOutcome {
        self.step(Step::Forward)
    }

    fn step(&mut self, step: Step) -> HistoryOutcome {
        if self.meta.is_empty() {
            return self.outcome(None, NO_HISTORY);
        }

        let capacity = self.config.capacity;
        let (boundary, already, reached) = match step {
            Step::Back => (self.meta.tail_index, ALREADY_AT_OLDEST, REACHED_OLDEST),
            Step::Forward => (self.meta.head_index, ALREADY_AT_NEWEST, REACHED_NEWEST),
        };
        if self.meta.current_index == boundary {
            return self.outcome(None, already);
        }

        let target = match step {
            Step::Back => (self.meta.current_index + capacity - 1) % capacity,
            Step::Forward => (self.meta.current_index + 1) % capacity,
        };
        let snapshot = match self.read_slot(target) {
            Ok(snapshot) => snapshot,
            Err(SlotFault::Missing) => return self.outcome(None, ENTRY_UNAVAILABLE),
            Err(SlotFault::Store(e)) => {
                log::warn!("Failed to read history slot {}: {}", target, e);
                return self.outcome(None, STORAGE_UNAVAILABLE);
            }
        };

        self.meta.current_index = target;
        self.write_meta();
        let message = (target == boundary).then_some(reached);
        HistoryOutcome {
            content: Some(snapshot.content),
            status: self.status(),
            message: message.map(str::to_string),
        }
    }

    /// Forget every stored state, re-enabling writes after a failed open
    pub fn clear_history(&mut self) {
        self.remove_all(0);
        self.meta = HistoryMeta::empty(self.config.capacity);
        self.available = true;
        log::info!("Cleared history '{}'", self.config.namespace);
    }

    /// Start over with `content` as the only state
    pub fn initialize_history(&mut self, content: &str) -> Option<HistoryStatus> {
        self.clear_history();
        self.save_to_history(content)
    }

    /// Content of the current state, if it can be read
    pub fn current_content(&self) -> Option<String> {
        if self.meta.is_empty() {
            return None;
        }
        self.read_slot(self.meta.current_index)
            .ok()
            .map(|snapshot| snapshot.content)
    }

    /// Readable snapshots from oldest to newest; unreadable slots are skipped
    pub fn snapshots(&self) -> Vec<HistorySnapshot> {
        let capacity = self.config.capacity;
        (0..self.meta.size)
            .map(|offset| (self.meta.tail_index + offset) % capacity)
            .filter_map(|slot| self.read_slot(slot).ok())
            .collect()
    }

    fn outcome(&self, content: Option<String>, message: &str) -> HistoryOutcome {
        HistoryOutcome {
            content,
            status: self.status(),
            message: Some(message.to_string()),
        }
    }

    fn meta_key(&self) -> String {
        format!("{}:meta", self.config.namespace)
    }

    fn slot_key(&self, slot: usize) -> String {
        format!("{}:slot:{}", self.config.namespace, slot)
    }

    fn read_slot(&self, slot: usize) -> Result<HistorySnapshot, SlotFault> {
        let json = self
            .store
            .get(&self.slot_key(slot))
            .map_err(SlotFault::Store)?
            .ok_or(SlotFault::Missing)?;
        serde_json::from_str(&json).map_err(|e| {
            log::warn!("History slot {} is corrupted: {}", slot, e);
            SlotFault::Missing
        })
    }

    fn write_slot(&mut self, snapshot: &HistorySnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let key = self.slot_key(snapshot.slot_index);
        self.store.set(&key, &json)
    }

    fn write_meta(&mut self) {
        let key = self.meta_key();
        let result = serde_json::to_string(&self.meta)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
            .and_then(|json| self.store.set(&key, &json));
        if let Err(e) = result {
            log::warn!("Failed to save history meta: {}", e);
        }
    }

    /// Remove slots strictly after `slot` up to and including `old_head`
    fn remove_orphans(&mut self, slot: usize, old_head: usize) {
        let capacity = self.config.capacity;
        let mut index = slot;
        while index != old_head {
            index = (index + 1) % capacity;
            self.remove_slot(index);
        }
    }

    fn remove_slot(&mut self, slot: usize) {
        let key = self.slot_key(slot);
        if let Err(e) = self.store.remove(&key) {
            log::warn!("Failed to remove history slot {}: {}", slot, e);
        }
    }

    /// Remove the meta record and every slot, including slots left above the
    /// current capacity by a run with a larger ring. `bound` is the highest
    /// slot index known to be in use, plus one.
    fn remove_all(&mut self, bound: usize) {
        let capacity = self.config.capacity;
        let upper = bound.clamp(capacity, STALE_SLOT_LIMIT.max(capacity));
        for slot in 0..upper {
            self.remove_slot(slot);
        }
        let mut slot = upper;
        while slot < STALE_SLOT_LIMIT
            && matches!(self.store.get(&self.slot_key(slot)), Ok(Some(_)))
        {
            self.remove_slot(slot);
            slot += 1;
        }
        let key = self.meta_key();
        if let Err(e) = self.store.remove(&key) {
            log::warn!("Failed to remove history meta: {}", e);
        }
    }
}
