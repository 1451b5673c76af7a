//! Codec trait definitions.

use async_trait::async_trait;

use crate::error::Cause;
use crate::value::Value;

/// Value codec trait.
///
/// Converts a typed [`Value`] to storable text and back. Both directions
/// may complete synchronously or asynchronously; the engine always
/// awaits the result uniformly, so a synchronous codec simply returns
/// immediately.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync`; one codec instance is shared by every
/// observer configured with it.
///
/// # Round-trip
///
/// A well-behaved codec satisfies `decode(encode(v)) == v` for every
/// value it accepts. The engine does not assume symmetry: after a write
/// it re-reads through `decode` rather than trusting the input value, so
/// an asymmetric codec is surfaced rather than hidden.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Encode a value for storage.
    async fn encode(&self, value: &Value) -> Result<String, CodecError>;

    /// Decode stored text back into a value.
    ///
    /// Returns an error if the text cannot be decoded (corrupt entry,
    /// foreign format).
    async fn decode(&self, text: &str) -> Result<Value, CodecError>;

    /// Short codec identifier, used in logs.
    fn name(&self) -> &str;
}

/// Codec errors.
///
/// Carries a message and, where available, the original failure as a
/// nested cause. The engine wraps this into `Error::Serializing` /
/// `Error::Deserializing` together with the key concerned.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
    #[source]
    source: Option<Cause>,
}

impl CodecError {
    /// Create a codec error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    /// Create a codec error wrapping an original failure.
    pub fn with_source(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
