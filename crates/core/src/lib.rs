//! Core types and traits for Keymirror
//!
//! This crate defines the foundational types used throughout the system:
//! - Key: Validated string identifier of one logical stored value
//! - Value: Unified value enum with deep structural equality
//! - Error: Error type hierarchy (operation + key + original cause)
//! - Codec: Pluggable async encode/decode between values and stored text
//! - JsonCodec: Default structural JSON codec
//! - StorageBackend: The external persistent store boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod codec;
pub mod error;
pub mod key;
pub mod value;

// Re-export commonly used types and traits
pub use backend::{BackendError, StorageBackend};
pub use codec::{Codec, CodecError, JsonCodec};
pub use error::{Cause, Error, Result};
pub use key::{validate_key, Key, KeyError, MAX_KEY_BYTES};
pub use value::Value;
