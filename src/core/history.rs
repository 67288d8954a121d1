//! Bounded, newest-first translation history persisted through a `KeyValueStore`.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::core::storage::KeyValueStore;
use crate::shared::error::AppResult;
use crate::shared::types::HistoryEntry;

pub struct HistoryCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_items: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryCache {
    /// Load history stored under `key`.
    ///
    /// Never fails: a storage error, a missing key or a payload that is not a JSON list of
    /// entries all yield an empty history. Lists longer than `max_items` are cut to size.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, max_items: usize) -> Self {
        let key = key.into();
        let max_items = max_items.max(1);

        let entries = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(max_items);
                    entries
                }
                Err(e) => {
                    warn!("[History] Ignoring unreadable history under '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("[History] Failed to read history: {}", e);
                Vec::new()
            }
        };

        debug!("[History] Loaded {} entries", entries.len());
        Self {
            store,
            key,
            max_items,
            entries,
        }
    }

    /// Insert at the front, evict the oldest past the bound, persist.
    ///
    /// Returns the updated list for re-rendering. A failed write is logged; the in-memory
    /// list stays authoritative for the session.
    pub fn add(&mut self, entry: HistoryEntry) -> &[HistoryEntry] {
        self.entries.insert(0, entry);
        if self.entries.len() > self.max_items {
            self.entries.truncate(self.max_items);
        }

        if let Err(e) = self.persist() {
            error!("[History] Failed to persist history: {}", e);
        }
        &self.entries
    }

    /// Serialize the whole list and overwrite the stored copy
    pub fn persist(&self) -> AppResult<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.store.set(&self.key, &serialized)
    }

    pub fn clear(&mut self) -> AppResult<()> {
        self.entries.clear();
        self.persist()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn front(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
