//! Subscribe, fallback, key-switch, and teardown behavior.

use std::time::Duration;

use keymirror::{MemoryBackend, ObserveOptions, SyncEngine, Value};

use crate::common::{init_tracing, shared};

#[tokio::test(start_paused = true)]
async fn absent_key_settles_with_no_value_and_no_error() {
    init_tracing();
    let engine = SyncEngine::new(shared(MemoryBackend::new()));

    let observer = engine.observe("missing", ObserveOptions::new()).unwrap();
    observer.ready().await;

    let state = observer.state();
    assert!(state.value.is_none());
    assert!(state.error.is_none());
    assert!(!state.is_loading);
}

#[tokio::test(start_paused = true)]
async fn stored_entry_is_decoded_at_subscribe_time() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    backend.insert_raw("k", r#"{"theme":"dark","size":14}"#);

    let engine = SyncEngine::new(backend);
    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;

    let state = observer.state();
    let value = state.value_ref().unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.get("theme"), Some(&Value::from("dark")));
    assert_eq!(object.get("size"), Some(&Value::Int(14)));
}

#[tokio::test(start_paused = true)]
async fn fallback_default_is_exposed_but_never_written_back() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine
        .observe("k", ObserveOptions::new().with_default("light"))
        .unwrap();
    observer.ready().await;

    assert_eq!(observer.state().value_ref(), Some(&Value::from("light")));
    // The store stays empty and the cache holds the absent marker, not
    // the default.
    assert_eq!(backend.get_raw("k"), None);
    assert_eq!(engine.cache().get(&observer.key()), Some(None));
}

#[tokio::test(start_paused = true)]
async fn stored_entry_beats_default_even_when_deep_equal() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    backend.insert_raw("k", "\"light\"");

    let engine = SyncEngine::new(backend);
    let observer = engine
        .observe("k", ObserveOptions::new().with_default("light"))
        .unwrap();
    observer.ready().await;

    assert_eq!(observer.state().value_ref(), Some(&Value::from("light")));
    // The decoded stored entry is what got cached; a default never is.
    assert!(engine.cache().get(&observer.key()).unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn corrupt_entry_surfaces_typed_error_without_default_fallback() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    backend.insert_raw("k", "{not json");

    let engine = SyncEngine::new(backend.clone());
    let observer = engine
        .observe("k", ObserveOptions::new().with_default("light"))
        .unwrap();
    observer.ready().await;

    let state = observer.state();
    // Stored-but-corrupt: no value, no default, a deserialization error
    assert!(state.value.is_none());
    let error = state.error.expect("corrupt entry must surface an error");
    assert!(error.is_deserializing());
    assert_eq!(error.key(), Some(&observer.key()));
    // The raw stored text is left untouched
    assert_eq!(backend.get_raw("k"), Some("{not json".to_string()));
}

#[tokio::test(start_paused = true)]
async fn rebind_does_not_leak_old_key_value() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    backend.insert_raw("a", "\"a-value\"");

    let engine = SyncEngine::new(backend);
    let observer = engine.observe("a", ObserveOptions::new()).unwrap();
    observer.ready().await;
    assert_eq!(observer.state().value_ref(), Some(&Value::from("a-value")));

    observer.rebind("b").await.unwrap();

    let state = observer.state();
    assert_eq!(observer.key().as_str(), "b");
    assert!(state.value.is_none());
    assert!(state.error.is_none());
    assert!(!state.is_loading);
}

#[tokio::test(start_paused = true)]
async fn set_after_rebind_targets_the_new_key() {
    init_tracing();
    let backend = shared(MemoryBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine.observe("a", ObserveOptions::new()).unwrap();
    observer.ready().await;
    observer.rebind("b").await.unwrap();

    observer.set(Some(Value::Int(7))).await.unwrap();
    assert_eq!(backend.get_raw("b"), Some("7".to_string()));
    assert_eq!(backend.get_raw("a"), None);
}

#[tokio::test(start_paused = true)]
async fn unavailable_store_reads_as_absent_not_error() {
    init_tracing();
    let engine = SyncEngine::new(shared(MemoryBackend::unavailable()));

    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;

    let state = observer.state();
    assert!(state.value.is_none());
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn teardown_detaches_bus_listener() {
    init_tracing();
    let engine = SyncEngine::new(shared(MemoryBackend::new()));

    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;
    assert_eq!(engine.notifier().receiver_count(), 1);

    drop(observer);
    // The driver is aborted; give the runtime a beat to reap it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(engine.notifier().receiver_count(), 0);
}
