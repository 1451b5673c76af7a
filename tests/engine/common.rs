//! Shared test utilities for the engine integration suite.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use keymirror::{BackendError, Codec, CodecError, JsonCodec, StorageBackend, Value};

static INIT_TRACING: Once = Once::new();

/// Route tracing output through the test harness once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// In-memory backend that counts reads per key.
///
/// Used to assert debounce coalescing (N notifications, one re-read)
/// and per-key event filtering.
#[derive(Default)]
pub struct CountingBackend {
    entries: Mutex<HashMap<String, String>>,
    reads: Mutex<HashMap<String, usize>>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_raw(&self, key: &str, text: &str) {
        self.entries.lock().unwrap().insert(key.to_string(), text.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Number of reads issued for `key` so far.
    pub fn reads_for(&self, key: &str) -> usize {
        *self.reads.lock().unwrap().get(key).unwrap_or(&0)
    }
}

#[async_trait]
impl StorageBackend for CountingBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        *self.reads.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &str, text: &str) -> Result<(), BackendError> {
        self.entries.lock().unwrap().insert(key.to_string(), text.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Deliberately asymmetric codec: JSON underneath, but decoded strings
/// come back upper-cased. Exercises the rule that observers re-read
/// through `decode` after a write instead of trusting the input value.
pub struct UppercaseCodec;

#[async_trait]
impl Codec for UppercaseCodec {
    async fn encode(&self, value: &Value) -> Result<String, CodecError> {
        JsonCodec.encode_text(value)
    }

    async fn decode(&self, text: &str) -> Result<Value, CodecError> {
        let value = JsonCodec.decode_text(text)?;
        Ok(match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        })
    }

    fn name(&self) -> &str {
        "uppercase"
    }
}

/// Wrap a backend in an engine-friendly Arc.
pub fn shared<B: StorageBackend + 'static>(backend: B) -> Arc<B> {
    Arc::new(backend)
}
