//! In-process store. Nothing survives the process, which is exactly what
//! tests want.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::{SessionStore, StoreError, StoreKey};

/// A [`SessionStore`] backed by a `HashMap`.
///
/// Supports per-key failure injection so callers can be tested against the
/// "any key may fail independently" contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
    failing_reads: Mutex<HashSet<StoreKey>>,
    failing_writes: Mutex<HashSet<StoreKey>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with entries.
    pub fn with_entries<'a>(
        entries: impl IntoIterator<Item = (StoreKey, &'a str)>,
    ) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Makes every subsequent read of `key` fail.
    pub async fn fail_reads_of(&self, key: StoreKey) {
        self.failing_reads.lock().await.insert(key);
    }

    /// Makes every subsequent write or removal of `key` fail.
    pub async fn fail_writes_of(&self, key: StoreKey) {
        self.failing_writes.lock().await.insert(key);
    }

    /// Returns a copy of the current entries, bypassing failure injection.
    pub async fn snapshot(&self) -> HashMap<StoreKey, String> {
        self.entries.lock().await.clone()
    }
}

impl SessionStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        if self.failing_reads.lock().await.contains(&key) {
            return Err(StoreError::Unavailable(key.to_string()));
        }
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        if self.failing_writes.lock().await.contains(&key) {
            return Err(StoreError::Unavailable(key.to_string()));
        }
        self.entries.lock().await.insert(key, value.to_string());
        Ok(())
    }

    async fn remove_many(&self, keys: &[StoreKey]) -> Result<(), StoreError> {
        {
            let failing = self.failing_writes.lock().await;
            if let Some(key) = keys.iter().find(|k| failing.contains(*k)) {
                return Err(StoreError::Unavailable(key.to_string()));
            }
        }
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
