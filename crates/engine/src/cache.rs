//! Shared value cache.
//!
//! ## Design
//!
//! A single process-wide mapping from [`Key`] to the last-known decoded
//! value, shared by every observer of an engine so that observers of the
//! same key expose the identical value graph (one `Arc<Value>`) and do
//! not redundantly re-decode.
//!
//! Updates are equality-gated: replacing an entry with a deep-equal
//! value is a no-op and reports "no change", which observers use to
//! suppress redundant downstream notifications. The gate also prevents
//! an out-of-order stale read from visually reverting a newer value that
//! happens to be identical to an even older one.
//!
//! No eviction: entries accumulate for the lifetime of the engine,
//! which stays small because applications observe a bounded set of
//! distinct keys. A decode failure stores the absent marker but leaves
//! the entry present; the next successful read repopulates it.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use keymirror_core::{Key, Value};

/// Last-known decoded value for one key.
///
/// `None` is the absent marker: a read completed and found no entry (or
/// the entry failed to decode).
pub type CachedValue = Option<Arc<Value>>;

/// Process-wide, key-indexed store of last-known decoded values.
///
/// Cloning shares the underlying map. Constructed once per engine and
/// handed to each observer; tests build isolated engines, so there is no
/// language-level global here.
#[derive(Debug, Clone, Default)]
pub struct SharedValueCache {
    entries: Arc<DashMap<Key, CachedValue>>,
}

impl SharedValueCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-known value for `key`.
    ///
    /// Outer `None` means no read has ever completed for the key; inner
    /// `None` is the absent marker.
    pub fn get(&self, key: &Key) -> Option<CachedValue> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Replace the entry for `key` unless `new` is deep-equal to it.
    ///
    /// Returns whether a change occurred. First insert always counts as
    /// a change, including inserting the absent marker.
    pub fn update(&self, key: &Key, new: CachedValue) -> bool {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if cached_eq(occupied.get(), &new) {
                    false
                } else {
                    occupied.insert(new);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(new);
                true
            }
        }
    }

    /// Number of keys ever read through this cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been read yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Deep value equality; both-absent is equal.
fn cached_eq(a: &CachedValue, b: &CachedValue) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
