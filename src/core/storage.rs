//! Durable key-value storage for the translator
//!
//! Mirrors a browser's local storage: string keys, string values, synchronous access.
//! The history cache only ever talks to the `KeyValueStore` trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use redb::{Database, TableDefinition};
use tracing::debug;

use crate::shared::error::{AppError, AppResult};

/// Key: storage key, Value: serialized payload
const KV_TABLE: TableDefinition<&str, &str> = TableDefinition::new("kv");

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Overwrite whatever is stored under `key`
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Redb-backed store, one database file per profile
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Io(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)?;

        // Create the table up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _table = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;

        debug!("[Storage] Opened {}", path.display());
        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// In-memory store, used with `--in-memory` and in tests
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let items = self.items.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        Ok(items.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut items = self.items.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut items = self.items.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        items.remove(key);
        Ok(())
    }
}
