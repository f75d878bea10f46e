//! Durable session storage for Souk.
//!
//! The client keeps exactly four string entries across restarts: the
//! access token, the refresh token, the JSON-serialized user, and the user
//! id. This crate defines:
//!
//! - [`StoreKey`]: the four entries and their bit-exact storage names
//! - [`SessionStore`]: the async key/value contract
//! - [`MemoryStore`]: in-process implementation (tests, ephemeral runs)
//! - [`FileStore`]: JSON file on disk, survives process restarts
//!
//! # No transactions
//!
//! Writes to different keys are independent. A crash between two `set`
//! calls can leave a partial record (token present, user id absent). The
//! session manager is responsible for recovering from that at restore time.

mod error;
mod file;
mod keys;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use keys::StoreKey;
pub use memory::MemoryStore;

use std::future::Future;

/// Async key/value storage for the persisted session record.
///
/// Every operation may fail independently for any key. Callers on the
/// read path should prefer [`get_or_absent`](Self::get_or_absent), which
/// turns a failure into "entry absent" instead of an error.
pub trait SessionStore: Send + Sync + 'static {
    /// Reads one entry. `Ok(None)` means the entry doesn't exist.
    fn get(
        &self,
        key: StoreKey,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Writes (or overwrites) one entry.
    fn set(
        &self,
        key: StoreKey,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes several entries. Removing an entry that doesn't exist is
    /// not an error, so clearing twice is the same as clearing once.
    fn remove_many(
        &self,
        keys: &[StoreKey],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads one entry, logging and swallowing any failure.
    fn get_or_absent(
        &self,
        key: StoreKey,
    ) -> impl Future<Output = Option<String>> + Send {
        async move {
            match self.get(key).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "store read failed, treating entry as absent");
                    None
                }
            }
        }
    }

    /// Removes all four session entries.
    fn clear_all(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.remove_many(&StoreKey::ALL)
    }
}
