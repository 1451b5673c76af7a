//! Engine entry point.
//!
//! A [`SyncEngine`] bundles the storage accessor, the shared value
//! cache, and the change bus for one store. It is the injectable
//! process-wide context: construct one at application start and clone it
//! wherever observers are needed; tests construct isolated engines.

use std::sync::Arc;
use std::time::Duration;

use keymirror_core::{Codec, Key, Result, StorageBackend, Value};
use keymirror_storage::{ChangeNotifier, StorageAccessor};
use tracing::debug;

use crate::cache::SharedValueCache;
use crate::config::EngineConfig;
use crate::observer::Observer;

/// Per-observer subscribe options.
#[derive(Clone, Default)]
pub struct ObserveOptions {
    /// Fallback exposed when the key has no stored entry.
    ///
    /// Never written back and never cached; a stored entry always takes
    /// priority, and a corrupt entry surfaces an error instead.
    pub default_value: Option<Value>,
    /// Codec override for this observer
    pub codec: Option<Arc<dyn Codec>>,
    /// Debounce window override for this observer
    pub debounce: Option<Duration>,
}

impl ObserveOptions {
    /// Options with engine defaults for everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Override the codec for this observer.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Override the debounce window for this observer.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }
}

/// Process-wide synchronization context over one storage backend.
///
/// Cloning shares the accessor, cache, and change bus, so observers
/// created from any clone stay consistent with each other.
#[derive(Clone)]
pub struct SyncEngine {
    accessor: StorageAccessor,
    cache: SharedValueCache,
    config: EngineConfig,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("cached_keys", &self.cache.len())
            .finish()
    }
}

impl SyncEngine {
    /// Create an engine with default configuration.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(backend: Arc<dyn StorageBackend>, config: EngineConfig) -> Self {
        let accessor = StorageAccessor::new(backend, ChangeNotifier::new());
        Self {
            accessor,
            cache: SharedValueCache::new(),
            config,
        }
    }

    /// The change bus.
    ///
    /// Embedding code bridges the store's native cross-context signal in
    /// via [`ChangeNotifier::notify_external`].
    pub fn notifier(&self) -> &ChangeNotifier {
        self.accessor.notifier()
    }

    /// The shared value cache.
    pub fn cache(&self) -> &SharedValueCache {
        &self.cache
    }

    /// Register an observer for `key`.
    ///
    /// The returned handle's projection starts in the loading state and
    /// is continuously updated from then on. Fails only on an invalid
    /// key.
    pub fn observe(&self, key: impl AsRef<str>, options: ObserveOptions) -> Result<Observer> {
        let key = Key::new(key.as_ref())?;
        debug!(key = %key, "registering observer");
        let codec = options.codec.unwrap_or_else(|| Arc::clone(&self.config.codec));
        let debounce = options.debounce.unwrap_or(self.config.debounce);
        Ok(Observer::spawn(
            key,
            codec,
            options.default_value,
            self.accessor.clone(),
            self.cache.clone(),
            debounce,
        ))
    }
}
