//! Change-notification handling: debounce, filtering, error recovery.

use std::time::Duration;

use keymirror::{ObserveOptions, SyncEngine, Value};

use crate::common::{init_tracing, shared, CountingBackend};

const SETTLE: Duration = Duration::from_millis(200);

#[tokio::test(start_paused = true)]
async fn external_change_updates_observer_without_resubscribe() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;
    assert!(observer.state().value.is_none());

    // Another context writes directly and the platform signal is bridged in
    backend.insert_raw("k", "\"from-elsewhere\"");
    engine.notifier().notify_external();

    tokio::time::sleep(SETTLE).await;
    assert_eq!(
        observer.state().value_ref(),
        Some(&Value::from("from-elsewhere"))
    );
}

#[tokio::test(start_paused = true)]
async fn notification_burst_coalesces_into_one_reread() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;
    let before = backend.reads_for("k");

    for _ in 0..10 {
        engine.notifier().notify_external();
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(backend.reads_for("k"), before + 1);
}

#[tokio::test(start_paused = true)]
async fn bursts_separated_by_quiet_periods_reread_once_each() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;
    let before = backend.reads_for("k");

    for _ in 0..3 {
        engine.notifier().notify_external();
    }
    tokio::time::sleep(SETTLE).await;
    for _ in 0..3 {
        engine.notifier().notify_external();
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(backend.reads_for("k"), before + 2);
}

#[tokio::test(start_paused = true)]
async fn self_origin_events_are_filtered_by_key() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer_a = engine.observe("a", ObserveOptions::new()).unwrap();
    let observer_b = engine.observe("b", ObserveOptions::new()).unwrap();
    observer_a.ready().await;
    observer_b.ready().await;

    let a_before = backend.reads_for("a");
    let b_before = backend.reads_for("b");

    observer_b.set(Some(Value::Int(1))).await.unwrap();
    tokio::time::sleep(SETTLE).await;

    // Only the written key re-reads
    assert_eq!(backend.reads_for("a"), a_before);
    assert_eq!(backend.reads_for("b"), b_before + 1);
}

#[tokio::test(start_paused = true)]
async fn error_state_clears_after_external_correction() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    backend.insert_raw("k", "{corrupt");

    let engine = SyncEngine::new(backend.clone());
    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;

    let state = observer.state();
    assert!(state.value.is_none());
    assert!(state.error.as_ref().unwrap().is_deserializing());

    // Another context repairs the entry and the signal arrives
    backend.insert_raw("k", "\"repaired\"");
    engine.notifier().notify_external();
    tokio::time::sleep(SETTLE).await;

    let state = observer.state();
    assert_eq!(state.value_ref(), Some(&Value::from("repaired")));
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn rebind_cancels_pending_debounced_reread() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    let engine = SyncEngine::new(backend.clone());

    let observer = engine.observe("a", ObserveOptions::new()).unwrap();
    observer.ready().await;
    let a_before = backend.reads_for("a");

    engine.notifier().notify_external();
    observer.rebind("b").await.unwrap();
    tokio::time::sleep(SETTLE).await;

    // The pending re-read for "a" died with the rebind; only "b" loads
    // from here on.
    assert_eq!(backend.reads_for("a"), a_before);
}

#[tokio::test(start_paused = true)]
async fn watch_subscribers_see_distinct_snapshots_only() {
    init_tracing();
    let backend = shared(CountingBackend::new());
    backend.insert_raw("k", "1");

    let engine = SyncEngine::new(backend.clone());
    let observer = engine.observe("k", ObserveOptions::new()).unwrap();
    observer.ready().await;

    let mut rx = observer.subscribe();
    rx.borrow_and_update();

    // A notification that re-reads an unchanged entry must not wake
    // subscribers: the decoded value is deep-equal to the cached one.
    engine.notifier().notify_external();
    tokio::time::sleep(SETTLE).await;
    assert!(!rx.has_changed().unwrap());

    // A real change does wake them
    backend.insert_raw("k", "2");
    engine.notifier().notify_external();
    tokio::time::sleep(SETTLE).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().value_ref(), Some(&Value::Int(2)));
}
