//! Defensive storage accessor.
//!
//! Thin wrapper over the external [`StorageBackend`]:
//! - reads flatten every backend failure to "absent" (a missing store in
//!   the current execution context is expected, not exceptional);
//! - writes and removes map backend rejection into the typed error
//!   hierarchy and do not retry;
//! - after every successful write/remove the accessor dispatches the
//!   self-origin change signal, because the store's native notification
//!   never fires in the context that performed the write.

use std::sync::Arc;

use keymirror_core::{Error, Key, Result, StorageBackend};
use tracing::debug;

use crate::notify::ChangeNotifier;

/// Defensive wrapper over a storage backend plus the change bus.
#[derive(Clone)]
pub struct StorageAccessor {
    backend: Arc<dyn StorageBackend>,
    notifier: ChangeNotifier,
}

impl StorageAccessor {
    /// Wrap a backend, dispatching self-origin events on `notifier`.
    pub fn new(backend: Arc<dyn StorageBackend>, notifier: ChangeNotifier) -> Self {
        Self { backend, notifier }
    }

    /// The change bus this accessor dispatches on.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Read the stored text for `key`, absent on any backend failure.
    pub async fn read(&self, key: &Key) -> Option<String> {
        match self.backend.read(key.as_str()).await {
            Ok(entry) => entry,
            Err(err) => {
                debug!(key = %key, error = %err, "backend read failed; treating as absent");
                None
            }
        }
    }

    /// Persist `text` under `key`, then signal the change.
    pub async fn write(&self, key: &Key, text: &str) -> Result<()> {
        self.backend
            .write(key.as_str(), text)
            .await
            .map_err(|err| Error::Write {
                key: key.clone(),
                source: err.into(),
            })?;
        self.notifier.notify_self_origin(key);
        Ok(())
    }

    /// Delete the entry for `key`, then signal the change. Idempotent.
    pub async fn remove(&self, key: &Key) -> Result<()> {
        self.backend
            .remove(key.as_str())
            .await
            .map_err(|err| Error::Remove {
                key: key.clone(),
                source: err.into(),
            })?;
        self.notifier.notify_self_origin(key);
        Ok(())
    }
}
