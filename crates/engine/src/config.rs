//! Engine configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use keymirror_core::{Codec, JsonCodec};

/// Default debounce window for coalescing change notifications.
///
/// A burst of notifications inside one window triggers exactly one
/// re-read after the burst settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Engine-wide configuration.
///
/// Individual observers may override the codec and the debounce window
/// at subscribe time.
#[derive(Clone)]
pub struct EngineConfig {
    /// Debounce window for notification-triggered re-reads
    pub debounce: Duration,
    /// Codec used by observers that do not supply their own
    pub codec: Arc<dyn Codec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            codec: Arc::new(JsonCodec),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("debounce", &self.debounce)
            .field("codec", &self.codec.name())
            .finish()
    }
}
