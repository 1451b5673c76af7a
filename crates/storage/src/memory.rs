//! In-memory storage backend.
//!
//! Process-local backend used for tests and ephemeral mirrors. Also
//! models the two degraded store conditions the engine must tolerate:
//! a missing store (`MemoryBackend::unavailable`) and a present store
//! that rejects writes (`set_reject_writes`).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use keymirror_core::{BackendError, StorageBackend};

/// In-memory key-value backend.
///
/// Reads are lock-free via DashMap. Entries live for the lifetime of the
/// backend instance.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: DashMap<String, String>,
    available: bool,
    reject_writes: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty, available backend.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            available: true,
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Create a backend that models a missing store.
    ///
    /// Every operation reports [`BackendError::Unavailable`]. The
    /// accessor flattens failing reads to absent, so observers on top of
    /// this backend see "no value" rather than an error.
    pub fn unavailable() -> Self {
        Self {
            entries: DashMap::new(),
            available: false,
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail with [`BackendError::Rejected`],
    /// modeling quota exhaustion or access denial.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Insert raw stored text directly, bypassing the accessor.
    ///
    /// Simulates a write performed by another context or by
    /// non-participating code; no notification is dispatched.
    pub fn insert_raw(&self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Read raw stored text directly, bypassing the accessor.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.available {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.check_available()?;
        Ok(self.entries.get(key).map(|entry| entry.clone()))
    }

    async fn write(&self, key: &str, text: &str) -> Result<(), BackendError> {
        self.check_available()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("write rejected".to_string()));
        }
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.check_available()?;
        // Idempotent: removing an absent key is not an error
        self.entries.remove(key);
        Ok(())
    }
}
