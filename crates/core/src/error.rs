//! Error types for Keymirror
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! ## Normalization
//!
//! Every internal failure is normalized into one [`Error`] carrying the
//! operation, the key it concerned, and the original cause. Raw backend
//! or codec errors never reach consumers directly. Nothing here is fatal
//! to the host process: every failure degrades to an observable error
//! state plus an absent value, recoverable by a later successful read or
//! write.

use crate::key::{Key, KeyError};
use thiserror::Error;

/// Result type alias for keymirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed original failure carried as an error's cause
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for keymirror operations
///
/// Each variant names the operation that failed and carries the key plus
/// the boxed original cause. Read failures from the backend are NOT
/// represented here: a failing read is an expected condition (missing
/// store in the current execution context) and is flattened to "absent"
/// by the storage accessor.
#[derive(Debug, Error)]
pub enum Error {
    /// Codec decode raised while reading a stored entry
    #[error("deserializing stored text for key '{key}': {source}")]
    Deserializing {
        /// Key whose stored text failed to decode
        key: Key,
        /// Original codec failure
        #[source]
        source: Cause,
    },

    /// Codec encode raised during a write; nothing was written
    #[error("serializing value for key '{key}': {source}")]
    Serializing {
        /// Key the value was being written under
        key: Key,
        /// Original codec failure
        #[source]
        source: Cause,
    },

    /// Backend rejected a write; the stored entry is unchanged
    #[error("writing key '{key}': {source}")]
    Write {
        /// Key being written
        key: Key,
        /// Original backend failure
        #[source]
        source: Cause,
    },

    /// Backend rejected a remove; the stored entry is unchanged
    #[error("removing key '{key}': {source}")]
    Remove {
        /// Key being removed
        key: Key,
        /// Original backend failure
        #[source]
        source: Cause,
    },

    /// Key failed validation
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),
}

impl Error {
    /// The key this error concerns, if any
    pub fn key(&self) -> Option<&Key> {
        match self {
            Error::Deserializing { key, .. }
            | Error::Serializing { key, .. }
            | Error::Write { key, .. }
            | Error::Remove { key, .. } => Some(key),
            Error::InvalidKey(_) => None,
        }
    }

    /// Short name of the failed operation
    pub fn operation(&self) -> &'static str {
        match self {
            Error::Deserializing { .. } => "deserializing",
            Error::Serializing { .. } => "serializing",
            Error::Write { .. } => "writing",
            Error::Remove { .. } => "removing",
            Error::InvalidKey(_) => "key validation",
        }
    }

    /// True if this is a deserialization failure
    pub fn is_deserializing(&self) -> bool {
        matches!(self, Error::Deserializing { .. })
    }
}
