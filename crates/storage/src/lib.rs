//! Storage layer for Keymirror
//!
//! This crate implements the defensive boundary between the engine and
//! the external persistent store:
//! - StorageAccessor: guarded read/write/remove with typed errors
//! - ChangeNotifier: dual-channel (external + self-origin) change bus
//! - MemoryBackend: in-process backend for tests and ephemeral mirrors
//! - FileBackend: file-per-key backend rooted at a directory
//!
//! The accessor owns the rule that the store's native change signal
//! never fires in the writing context: it dispatches the self-origin
//! event itself after each successful mutation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod file;
pub mod memory;
pub mod notify;

pub use accessor::StorageAccessor;
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use notify::{ChangeEvent, ChangeNotifier, ChangeOrigin, CHANNEL_CAPACITY};
