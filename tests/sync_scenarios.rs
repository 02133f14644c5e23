mod common;

use common::{ScriptedBackend, company, fast_retry, memory_manager, sqlite_manager};
use inspection_sync::application::ports::LocalStore;
use inspection_sync::application::services::RetryPolicy;
use inspection_sync::domain::entities::offline::{SyncReport, SyncState};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn queued_company_syncs_and_queue_empties() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.issue_ids(&["abc123"]);
    let (manager, store) = sqlite_manager(backend.clone(), fast_retry()).await;

    manager.enqueue(&company("Acme")).await.unwrap();
    let report = manager.sync().await;

    assert_eq!(report.success_count, 1);
    assert_eq!(report.failure_count, 0);
    assert_eq!(report.remaining, 0);
    assert!(report.success);
    assert_eq!(store.count_queue_items().await.unwrap(), 0);

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "insert");
    assert_eq!(calls[0].row["fantasy_name"], "Acme");
}

#[tokio::test]
async fn one_rejected_item_does_not_block_the_rest() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reject("Bravo", 3);
    let (manager, store) = sqlite_manager(backend.clone(), fast_retry()).await;

    manager.enqueue(&company("Alpha")).await.unwrap();
    let bravo = manager.enqueue(&company("Bravo")).await.unwrap();
    manager.enqueue(&company("Charlie")).await.unwrap();

    let report = manager.sync().await;

    assert_eq!(report.success_count, 2);
    assert_eq!(report.failure_count, 1);
    assert_eq!(report.remaining, 1);
    assert!(!report.success);
    assert_eq!(report.summary(), "2 sincronizados, 1 falharam");

    let left = store.list_queue_items().await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, bravo.id);

    // Bravo は3回試行され、その後 Charlie が処理される
    let order: Vec<String> = backend
        .calls()
        .iter()
        .map(|call| call.row["fantasy_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["Alpha", "Bravo", "Bravo", "Bravo", "Charlie"]);
}

#[tokio::test]
async fn parked_item_syncs_on_a_later_pass() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reject("Acme", 3);
    let (manager, _store) = sqlite_manager(backend.clone(), fast_retry()).await;

    manager.enqueue(&company("Acme")).await.unwrap();
    assert_eq!(manager.sync().await.failure_count, 1);

    let second = manager.sync().await;
    assert_eq!(second, SyncReport::completed(1, 0, 0));
    assert_eq!(manager.pending_count().await.unwrap(), 0);
    assert_eq!(manager.metrics().passes_failed, 1);
    assert_eq!(manager.metrics().passes_completed, 1);
}

#[tokio::test]
async fn concurrent_trigger_is_skipped_while_a_pass_runs() {
    let (backend, gate) = ScriptedBackend::gated();
    let backend = Arc::new(backend);
    let (manager, _store) = sqlite_manager(backend.clone(), fast_retry()).await;
    let manager = Arc::new(manager);
    manager.enqueue(&company("Acme")).await.unwrap();

    let first = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move { manager.sync().await }
    });
    while manager.state() != SyncState::Syncing {
        tokio::task::yield_now().await;
    }

    let second = manager.sync().await;
    assert!(second.skipped);
    assert_eq!(second.success_count, 0);

    gate.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.success_count, 1);
    assert!(!first.skipped);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(manager.state(), SyncState::Idle);
}

#[tokio::test(start_paused = true)]
async fn retries_wait_at_least_the_linear_backoff() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reject("Acme", 2);
    let (manager, _store) = memory_manager(backend.clone(), RetryPolicy::default());

    manager.enqueue(&company("Acme")).await.unwrap();
    let started = Instant::now();
    let report = manager.sync().await;

    assert!(started.elapsed() >= Duration::from_millis(1_000 + 2_000));
    assert_eq!(report, SyncReport::completed(1, 0, 0));
    assert_eq!(backend.call_count(), 3);
}
