//! Error types for the storage layer.

/// Errors that can occur while reading or writing the session record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file or device could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data exists but can't be parsed.
    #[error("storage is corrupt: {0}")]
    Corrupt(String),

    /// The store refused the operation for this key.
    #[error("storage unavailable for {0}")]
    Unavailable(String),
}
