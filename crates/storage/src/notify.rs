//! Change notification bus.
//!
//! Two input channels funnel into one logical "something may have
//! changed" event stream:
//!
//! - **External**: relayed from the platform's native cross-context
//!   signal. Such signals fire in contexts that did NOT perform the
//!   write and carry no key information, so external events mean
//!   "re-validate all keys".
//! - **Self-origin**: dispatched by the storage accessor after each of
//!   its own successful writes/removes, because the native signal never
//!   fires in the writer's own context. Carries the key so observers of
//!   other keys can filter cheaply.
//!
//! Events are re-read triggers only, never value payloads: consumers
//! always re-derive via a fresh read, which stays correct when the store
//! is also mutated by non-participating code.

use keymirror_core::Key;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast channel capacity.
///
/// A lagged observer treats the lag itself as a change trigger, so a
/// modest buffer is enough.
pub const CHANNEL_CAPACITY: usize = 64;

/// Which channel an event arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The platform's native cross-context signal (another context wrote)
    External,
    /// Dispatched by this process's own accessor after a successful
    /// write/remove
    SelfOrigin,
}

/// A "something may have changed" event.
///
/// Never carries the new value. `key: None` means the event cannot be
/// attributed to one key and every observer must re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Which channel the event arrived on
    pub origin: ChangeOrigin,
    /// The key concerned, where known
    pub key: Option<Key>,
}

impl ChangeEvent {
    /// Whether an observer of `key` should react to this event.
    pub fn concerns(&self, key: &Key) -> bool {
        match &self.key {
            None => true,
            Some(k) => k == key,
        }
    }
}

/// Process-wide change notification bus.
///
/// Cloning shares the underlying channel. Dispatch with no live
/// subscribers is a no-op, not an error.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    /// Create a new bus with the default capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Dispatch a self-origin event for `key`.
    ///
    /// Called by the accessor after each successful write/remove.
    pub fn notify_self_origin(&self, key: &Key) {
        trace!(key = %key, "dispatching self-origin change event");
        let _ = self.tx.send(ChangeEvent {
            origin: ChangeOrigin::SelfOrigin,
            key: Some(key.clone()),
        });
    }

    /// Relay the platform's native cross-context signal.
    ///
    /// Carries no key; every observer re-validates. Embedding code calls
    /// this from whatever native notification mechanism the store has.
    pub fn notify_external(&self) {
        trace!("dispatching external change event");
        let _ = self.tx.send(ChangeEvent {
            origin: ChangeOrigin::External,
            key: None,
        });
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
