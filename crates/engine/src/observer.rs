//! Per-key observer lifecycle.
//!
//! ## Design
//!
//! Each [`Observer`] pairs a caller-facing handle with a driver task.
//! The driver performs the initial load, listens on the change bus, and
//! coalesces bursts of notifications into one debounced re-read. The
//! handle exposes the continuously-updated projection (`value`,
//! `is_loading`, `error`) on a watch channel, plus the write path.
//!
//! Every state transition funnels through one `load` sequence:
//! read from the accessor, decode through the codec, update the shared
//! cache (equality-gated), publish a snapshot. Writes never update the
//! projection optimistically: the self-origin change signal triggers
//! the standard re-read, so the exposed value always reflects what
//! `decode(encode(x))` actually produces, catching asymmetric codecs.
//!
//! ## Ordering
//!
//! Same-key operations are deliberately NOT serialized: cache updates
//! apply in completion order, and rapid overlapping writes resolve
//! last-completed-wins. Unsubscribing (dropping the handle) aborts the
//! driver; in-flight backend futures held by `set` callers run to
//! completion, and their late cache writes are harmless because the
//! cache is keyed by key, not by observer.

use std::sync::Arc;
use std::time::Duration;

use keymirror_core::{Codec, Error, Key, Result, Value};
use keymirror_storage::{ChangeEvent, StorageAccessor};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::cache::{CachedValue, SharedValueCache};

/// One observer's exposed projection.
///
/// The three observable conditions stay distinct: `is_loading` (initial
/// read in flight), `value == None && error == None` (no value present),
/// and `error == Some` (value unavailable).
#[derive(Debug, Clone)]
pub struct ObserverState {
    /// Decoded value, the fallback default, or `None`
    pub value: CachedValue,
    /// True until the subscribe-time read completes
    pub is_loading: bool,
    /// Latest failure surfaced on this registration
    pub error: Option<Arc<Error>>,
}

impl ObserverState {
    fn loading() -> Self {
        Self {
            value: None,
            is_loading: true,
            error: None,
        }
    }

    /// Convenience accessor: the value with `Arc` peeled off.
    pub fn value_ref(&self) -> Option<&Value> {
        self.value.as_deref()
    }
}

// Values compare deeply; errors by identity (an Error carries a boxed
// opaque cause and two distinct failures are never "the same" state).
impl PartialEq for ObserverState {
    fn eq(&self, other: &Self) -> bool {
        let errors_eq = match (&self.error, &other.error) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.value == other.value && self.is_loading == other.is_loading && errors_eq
    }
}

pub(crate) enum Command {
    Rebind(Key, oneshot::Sender<()>),
}

struct ObserverShared {
    key: RwLock<Key>,
    codec: Arc<dyn Codec>,
    default_value: CachedValue,
    accessor: StorageAccessor,
    cache: SharedValueCache,
    state: watch::Sender<ObserverState>,
}

/// Live binding of one subscriber to a key.
///
/// Dropping the handle is teardown: the driver task is aborted, the
/// pending debounce dies with it, and no further transitions occur.
pub struct Observer {
    shared: Arc<ObserverShared>,
    state_rx: watch::Receiver<ObserverState>,
    commands: mpsc::UnboundedSender<Command>,
    driver: JoinHandle<()>,
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("key", &self.shared.key.read())
            .finish_non_exhaustive()
    }
}

impl Observer {
    pub(crate) fn spawn(
        key: Key,
        codec: Arc<dyn Codec>,
        default_value: Option<Value>,
        accessor: StorageAccessor,
        cache: SharedValueCache,
        debounce: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ObserverState::loading());
        let shared = Arc::new(ObserverShared {
            key: RwLock::new(key),
            codec,
            default_value: default_value.map(Arc::new),
            accessor,
            cache,
            state: state_tx,
        });

        let events = shared.accessor.notifier().subscribe();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(Arc::clone(&shared), events, cmd_rx, debounce));

        Self {
            shared,
            state_rx,
            commands: cmd_tx,
            driver,
        }
    }

    /// The key currently observed.
    pub fn key(&self) -> Key {
        self.shared.key.read().clone()
    }

    /// Snapshot of the current projection.
    pub fn state(&self) -> ObserverState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to projection changes.
    ///
    /// The receiver sees every distinct snapshot; deep-equal updates are
    /// suppressed at the source.
    pub fn subscribe(&self) -> watch::Receiver<ObserverState> {
        self.state_rx.clone()
    }

    /// Wait until the subscribe-time (or rebind-time) read completes.
    pub async fn ready(&self) {
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|state| !state.is_loading).await;
    }

    /// Write or remove the observed value.
    ///
    /// `None` removes the stored entry (distinct from writing an empty
    /// value, which keeps one). On success the self-origin signal makes
    /// every observer of this key, including this one, re-read through
    /// the standard path. Failures are returned to the caller and leave
    /// the stored entry untouched.
    pub async fn set(&self, value: Option<Value>) -> Result<()> {
        let key = self.key();
        match value {
            None => {
                self.shared.accessor.remove(&key).await?;
                self.shared.cache.update(&key, None);
                let is_loading = self.state_rx.borrow().is_loading;
                publish(
                    &self.shared,
                    ObserverState {
                        value: self.shared.default_value.clone(),
                        is_loading,
                        error: None,
                    },
                );
                Ok(())
            }
            Some(value) => {
                let text = self.shared.codec.encode(&value).await.map_err(|err| {
                    Error::Serializing {
                        key: key.clone(),
                        source: err.into(),
                    }
                })?;
                // An encode failure returns above without touching the
                // store; a write failure leaves the old entry in place.
                self.shared.accessor.write(&key, &text).await
            }
        }
    }

    /// Switch this observer to another key.
    ///
    /// Equivalent to unsubscribe-then-resubscribe: the pending debounce
    /// is cancelled, the subscribe sequence runs for the new key, and
    /// later `set` calls target it. Completes once the new key's initial
    /// read has been applied.
    pub async fn rebind(&self, new_key: impl AsRef<str>) -> Result<()> {
        let key = Key::new(new_key.as_ref())?;
        debug!(key = %key, "rebinding observer");
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Rebind(key, ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
        Ok(())
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Driver loop: initial load, then debounced reaction to change events
/// and rebind commands.
async fn drive(
    shared: Arc<ObserverShared>,
    mut events: broadcast::Receiver<ChangeEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    debounce: Duration,
) {
    load(&shared, true).await;

    let timer = time::sleep(debounce);
    tokio::pin!(timer);
    // Only the existence of a pending re-read matters, not how many
    // notifications piled up behind it.
    let mut pending = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let relevant = {
                        let key = shared.key.read();
                        event.concerns(&key)
                    };
                    if relevant {
                        timer.as_mut().reset(time::Instant::now() + debounce);
                        pending = true;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Events carry no payload, so missing some only
                    // means "something changed": schedule one re-read.
                    warn!(missed, "change bus lagged; scheduling re-read");
                    timer.as_mut().reset(time::Instant::now() + debounce);
                    pending = true;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            () = &mut timer, if pending => {
                pending = false;
                load(&shared, false).await;
            }
            command = commands.recv() => match command {
                Some(Command::Rebind(new_key, ack)) => {
                    pending = false;
                    *shared.key.write() = new_key;
                    load(&shared, true).await;
                    let _ = ack.send(());
                }
                None => break,
            },
        }
    }
}

/// One read-and-update sequence: read, decode, cache, publish.
///
/// `initial` marks the subscribe/rebind path, which resets the
/// projection to loading first; notification-triggered re-reads leave
/// `is_loading` alone.
async fn load(shared: &ObserverShared, initial: bool) {
    let key = shared.key.read().clone();
    if initial {
        publish(shared, ObserverState::loading());
    }

    let next = match shared.accessor.read(&key).await {
        None => {
            shared.cache.update(&key, None);
            // Absent and error-free: the fallback default (if any) is
            // exposed but never cached and never written back.
            ObserverState {
                value: shared.default_value.clone(),
                is_loading: false,
                error: None,
            }
        }
        Some(text) => match shared.codec.decode(&text).await {
            Ok(value) => {
                shared.cache.update(&key, Some(Arc::new(value)));
                // Expose the cache's graph, not our local allocation:
                // when the equality gate suppressed the update, every
                // observer keeps sharing the previously cached Arc.
                let cached = shared.cache.get(&key).and_then(|entry| entry);
                ObserverState {
                    value: cached,
                    is_loading: false,
                    error: None,
                }
            }
            Err(err) => {
                warn!(
                    key = %key,
                    codec = shared.codec.name(),
                    error = %err,
                    "failed to decode stored text"
                );
                shared.cache.update(&key, None);
                // Stored-but-corrupt is distinct from never-stored: the
                // fallback default is NOT applied here.
                ObserverState {
                    value: None,
                    is_loading: false,
                    error: Some(Arc::new(Error::Deserializing {
                        key: key.clone(),
                        source: err.into(),
                    })),
                }
            }
        },
    };

    // A rebind may have raced this load. The cache write above is a
    // harmless per-key update; the projection must not revive the old
    // key's value.
    if *shared.key.read() == key {
        publish(shared, next);
    }
}

fn publish(shared: &ObserverShared, next: ObserverState) {
    shared.state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
