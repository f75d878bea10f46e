//! File-backed store: one small JSON object on disk.
//!
//! The file is read lazily on first access and cached. Every mutation
//! rewrites the whole object to a sibling temp file and renames it over the
//! original, so a crash mid-write leaves either the old or the new file,
//! never a torn one.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::sync::Mutex;

use crate::{SessionStore, StoreError, StoreKey};

/// A [`SessionStore`] persisted as a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// `None` until the file has been loaded once.
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Creates a store at `path`. The file (and its parent directory) is
    /// created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Where the record lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "session file is corrupt");
                StoreError::Corrupt(e.to_string())
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Loads the record for a mutation. A corrupt file is dropped so the
    /// write that follows replaces it; the flag is true in that case.
    async fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.load().await {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "discarding corrupt session file"
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let suffix: u32 = rand::rng().random();
        let tmp = self.path.with_extension(format!("tmp-{suffix:08x}"));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Io(e));
        }
        Ok(())
    }
}

impl SessionStore for FileStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        Ok(cache
            .as_ref()
            .and_then(|entries| entries.get(key.as_str()).cloned()))
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().await;
        let (mut entries, _) = match cache.take() {
            Some(entries) => (entries, false),
            None => self.load_for_write().await?,
        };
        entries.insert(key.as_str().to_string(), value.to_string());
        let written = self.persist(&entries).await;
        // Keep the cache in step with the file: on failure reload next time.
        if written.is_ok() {
            *cache = Some(entries);
        }
        written
    }

    async fn remove_many(&self, keys: &[StoreKey]) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().await;
        let (mut entries, discarded) = match cache.take() {
            Some(entries) => (entries, false),
            None => self.load_for_write().await?,
        };
        let before = entries.len();
        for key in keys {
            entries.remove(key.as_str());
        }
        if entries.len() == before && !discarded {
            *cache = Some(entries);
            return Ok(());
        }
        let written = self.persist(&entries).await;
        if written.is_ok() {
            *cache = Some(entries);
        }
        written
    }
}
