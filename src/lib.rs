//! Keymirror - client-side state synchronization over a key-value store
//!
//! Keymirror mirrors a single typed value per key between in-memory
//! application state and a pluggable persistent key-value store, keeping
//! every observer of a key consistent within one process and reacting to
//! externally-originated store changes with a debounced re-read.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use keymirror::{MemoryBackend, ObserveOptions, SyncEngine, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> keymirror::Result<()> {
//! let engine = SyncEngine::new(Arc::new(MemoryBackend::new()));
//!
//! // Observe a key, with a fallback for the never-stored case
//! let observer = engine.observe(
//!     "settings:theme",
//!     ObserveOptions::new().with_default("light"),
//! )?;
//! observer.ready().await;
//! assert_eq!(observer.state().value_ref(), Some(&Value::from("light")));
//!
//! // Writes go through the codec and notify every observer of the key
//! observer.set(Some(Value::from("dark"))).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The engine re-reads from storage on every change signal rather than
//! trusting values passed around in memory, so it stays correct when the
//! store is also mutated by code that does not participate in this
//! system. The store itself and the render framework consuming the
//! projections are external collaborators, specified only at their
//! interfaces ([`StorageBackend`] and `tokio::sync::watch`).

// Re-export the public API from the member crates
pub use keymirror_core::{
    validate_key, BackendError, Cause, Codec, CodecError, Error, JsonCodec, Key, KeyError, Result,
    StorageBackend, Value, MAX_KEY_BYTES,
};
pub use keymirror_engine::{
    CachedValue, EngineConfig, ObserveOptions, Observer, ObserverState, SharedValueCache,
    SyncEngine, DEFAULT_DEBOUNCE,
};
pub use keymirror_storage::{
    ChangeEvent, ChangeNotifier, ChangeOrigin, FileBackend, MemoryBackend, StorageAccessor,
};
