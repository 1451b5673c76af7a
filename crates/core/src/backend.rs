//! Storage backend boundary.
//!
//! The underlying persistent key-value store is an external collaborator:
//! any process or context may mutate it at any time, and this system
//! never assumes exclusive access. The [`StorageBackend`] trait specifies
//! the store at its interface only: read, write, and remove by string
//! key. Change notification is NOT part of this boundary: the store's
//! native cross-context signal (where one exists) is bridged in through
//! the change notifier by embedding code.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a storage backend.
///
/// A failing `read` is an expected condition (no persistent store in the
/// current execution context) and is flattened to "absent" by the
/// storage accessor. `write`/`remove` failures propagate to the caller.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No store is available in this execution context
    #[error("storage backend unavailable")]
    Unavailable,

    /// The store is present but rejected the operation
    /// (quota exceeded, entry too large, access denied)
    #[error("storage backend rejected the operation: {0}")]
    Rejected(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pluggable persistent key-value store.
///
/// Implementations must be `Send + Sync`; one backend instance is shared
/// by every observer of the engine built on it.
///
/// # Contract
///
/// - `read` returns `Ok(None)` for a missing entry. It may return
///   `Err(BackendError::Unavailable)` when no store exists in this
///   context; callers going through the accessor see that as absent.
/// - `write` persists text under a key, replacing any previous entry.
///   No retry is attempted on failure; the caller decides.
/// - `remove` is idempotent: removing an absent key is not an error.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the stored text for a key, `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Persist text under a key.
    async fn write(&self, key: &str, text: &str) -> Result<(), BackendError>;

    /// Delete the entry for a key. Idempotent.
    async fn remove(&self, key: &str) -> Result<(), BackendError>;
}
