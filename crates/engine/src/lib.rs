//! Synchronization engine for Keymirror
//!
//! This crate implements the per-key observer machinery on top of the
//! storage layer:
//! - SharedValueCache: process-wide, equality-gated decoded-value cache
//! - SyncEngine: injectable context bundling accessor, cache, and bus
//! - Observer: per-subscription lifecycle with debounced re-reads
//! - ObserverState: the `{ value, is_loading, error }` projection
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keymirror_engine::{ObserveOptions, SyncEngine};
//! use keymirror_core::Value;
//! use keymirror_storage::MemoryBackend;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> keymirror_core::Result<()> {
//! let engine = SyncEngine::new(Arc::new(MemoryBackend::new()));
//!
//! let observer = engine.observe("theme", ObserveOptions::new())?;
//! observer.ready().await;
//! assert!(observer.state().value.is_none()); // nothing stored yet
//!
//! observer.set(Some(Value::from("dark"))).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
mod engine;
mod observer;

pub use cache::{CachedValue, SharedValueCache};
pub use config::{EngineConfig, DEFAULT_DEBOUNCE};
pub use engine::{ObserveOptions, SyncEngine};
pub use observer::{Observer, ObserverState};
