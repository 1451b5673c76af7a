//! Key validation for Keymirror
//!
//! This module defines key validation rules that are enforced at observer
//! creation and on every direct accessor call. Keys are Unicode strings
//! with specific constraints.
//!
//! ## Contract
//!
//! - Keys must be valid UTF-8 (guaranteed by Rust's &str type)
//! - Keys must not be empty
//! - Keys must not contain NUL bytes (\0)
//! - Keys must not exceed `MAX_KEY_BYTES` (1024)
//!
//! Beyond these rules keys are opaque: no hierarchy or structure is
//! imposed, and equality is plain string equality.

use std::fmt;

use thiserror::Error;

/// Maximum key length in bytes
pub const MAX_KEY_BYTES: usize = 1024;

/// A validated key identifying one logical stored value.
///
/// Construct via [`Key::new`], which enforces the validation rules.
/// Cloning is cheap relative to the engine's per-key work; keys are
/// stored by value in the cache and observer registrations.
///
/// # Examples
///
/// ```
/// use keymirror_core::Key;
///
/// let key = Key::new("settings:theme").unwrap();
/// assert_eq!(key.as_str(), "settings:theme");
///
/// assert!(Key::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Create a key, validating it against the key rules.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(key: &str) -> Result<Self, KeyError> {
        Key::new(key)
    }
}

/// Validate a key string against the key rules.
///
/// This is the primary validation function; [`Key::new`] calls it.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    // Rule 1: Key cannot be empty
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    // Rule 2: Key cannot contain NUL bytes
    if key.contains('\x00') {
        return Err(KeyError::ContainsNul);
    }

    // Rule 3: Key cannot exceed max length
    let len = key.len();
    if len > MAX_KEY_BYTES {
        return Err(KeyError::TooLong {
            actual: len,
            max: MAX_KEY_BYTES,
        });
    }

    Ok(())
}

/// Key validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key is an empty string
    #[error("key cannot be empty")]
    Empty,

    /// Key contains a NUL byte
    #[error("key cannot contain NUL bytes")]
    ContainsNul,

    /// Key exceeds the maximum length
    #[error("key too long: {actual} bytes (max {max})")]
    TooLong {
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },
}
