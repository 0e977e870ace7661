//! Owner lifecycle, first-login migration, and the observer hook.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::*;
use stockpile_sync::adapters::RemoteOp;
use stockpile_sync::{MigrationOutcome, SyncStatus};
use tokio::time::sleep;

#[tokio::test]
async fn test_set_user_pulls() {
    let h = Harness::new();
    h.remote.seed_items(vec![remote_item("Rice", "alice", 0)]).await;

    let snapshot = h.engine.set_user(Some("alice".into())).await.unwrap();

    assert_eq!(names(&snapshot.items), vec!["Rice"]);
    assert_eq!(h.engine.owner().as_deref(), Some("alice"));
    assert_eq!(h.statuses(), vec![SyncStatus::Syncing, SyncStatus::Synced]);
}

#[tokio::test]
async fn test_set_user_none_makes_no_calls() {
    let h = Harness::signed_in("alice").await;

    assert_eq!(h.engine.set_user(None).await, None);

    assert_eq!(h.engine.status(), SyncStatus::Local);
    assert_eq!(h.engine.owner(), None);
    assert!(h.remote.calls().await.is_empty());
}

#[tokio::test]
async fn test_set_user_offline() {
    let h = Harness::new();
    h.net.set(false);

    assert_eq!(h.engine.set_user(Some("alice".into())).await, None);

    assert_eq!(h.engine.status(), SyncStatus::Offline);
    assert!(h.remote.calls().await.is_empty());
}

#[tokio::test]
async fn test_migration_runs_once_per_owner() {
    let h = Harness::new();
    h.seed_local(&snapshot_with(vec![item("Rice"), item("Beans")])).await;

    let (outcome, pulled) = h.engine.sign_in("alice").await;
    match outcome {
        MigrationOutcome::Migrated(report) => assert_eq!(report.items, 2),
        other => panic!("expected migration, got {:?}", other),
    }
    // The pull that follows brings the pushed items back at version 1.
    let pulled = pulled.unwrap();
    assert_eq!(pulled.items.len(), 2);
    assert!(pulled.items.iter().all(|i| i.version == 1));

    assert_eq!(h.engine.migrate_to_cloud().await, MigrationOutcome::AlreadyMigrated);
    assert_eq!(h.remote.call_count(RemoteOp::UpsertItems).await, 1);
}

#[tokio::test]
async fn test_migration_repeats_for_a_new_owner() {
    let h = Harness::new();
    h.seed_local(&snapshot_with(vec![item("Rice")])).await;

    h.engine.sign_in("alice").await;
    let (outcome, _) = h.engine.sign_in("bob").await;

    assert!(matches!(outcome, MigrationOutcome::Migrated(_)));
    assert_eq!(h.remote.stored_items("bob").await.len(), 1);
}

#[tokio::test]
async fn test_nothing_to_migrate() {
    let h = Harness::new();

    let (outcome, _) = h.engine.sign_in("alice").await;

    assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
    assert_eq!(h.remote.call_count(RemoteOp::UpsertItems).await, 0);
}

#[tokio::test]
async fn test_failed_migration_retries() {
    let h = Harness::new();
    h.seed_local(&snapshot_with(vec![item("Rice")])).await;
    h.remote.fail_next(RemoteOp::UpsertItems).await;
    h.net.set(false);
    h.engine.set_user(Some("alice".into())).await;
    h.net.set(true);

    assert_eq!(h.engine.migrate_to_cloud().await, MigrationOutcome::Failed);
    assert_eq!(h.engine.status(), SyncStatus::Error);

    assert!(matches!(
        h.engine.migrate_to_cloud().await,
        MigrationOutcome::Migrated(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_pull_waits_for_in_flight_push() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&snapshot_with(vec![item("Rice")])).await;
    h.remote
        .set_latency(RemoteOp::UpsertItems, Duration::from_secs(1))
        .await;

    let engine = h.engine.clone();
    let push = tokio::spawn(async move { engine.push().await });

    sleep(Duration::from_millis(100)).await;
    let pulled = h.engine.pull().await.unwrap();

    assert!(push.await.unwrap().is_some());

    let ops: Vec<RemoteOp> = h.remote.calls().await.into_iter().map(|c| c.op).collect();
    let first_select = ops
        .iter()
        .position(|op| *op == RemoteOp::SelectItems)
        .unwrap();
    let last_push_call = ops
        .iter()
        .rposition(|op| matches!(op, RemoteOp::UpsertItems | RemoteOp::UpdateProfile))
        .unwrap();
    assert!(last_push_call < first_select, "calls interleaved: {:?}", ops);

    // The pull saw the finished push.
    assert_eq!(names(&pulled.items), vec!["Rice"]);
    assert_eq!(pulled.items[0].version, 1);
    assert_eq!(h.engine.status(), SyncStatus::Synced);
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_mid_push_abandons_push() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&snapshot_with(vec![item("Rice")])).await;
    let meta_before = h.local_metadata().await;
    h.remote
        .set_latency(RemoteOp::UpsertItems, Duration::from_secs(1))
        .await;

    let engine = h.engine.clone();
    let push = tokio::spawn(async move { engine.push().await });

    sleep(Duration::from_millis(100)).await;
    h.engine.set_user(None).await;

    assert_eq!(push.await.unwrap(), None);
    assert_eq!(h.engine.status(), SyncStatus::Local);
    assert_eq!(h.local_metadata().await, meta_before);
    assert_eq!(h.remote.call_count(RemoteOp::UpdateProfile).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_account_switch_mid_pull() {
    let h = Harness::signed_in("alice").await;
    h.remote.seed_items(vec![remote_item("Alice's", "alice", 0)]).await;
    h.remote.seed_items(vec![remote_item("Bob's", "bob", 0)]).await;
    h.remote
        .set_latency(RemoteOp::SelectItems, Duration::from_secs(1))
        .await;

    let engine = h.engine.clone();
    let alice_pull = tokio::spawn(async move { engine.pull().await });

    sleep(Duration::from_millis(100)).await;
    let bob_view = h.engine.set_user(Some("bob".into())).await.unwrap();

    assert_eq!(alice_pull.await.unwrap(), None);
    assert_eq!(names(&bob_view.items), vec!["Bob's"]);
    assert_eq!(names(&h.local_snapshot().await.unwrap().items), vec!["Bob's"]);
    assert_eq!(h.local_metadata().await.unwrap().user_id, "bob");
}

#[tokio::test]
async fn test_last_observer_wins() {
    let h = Harness::signed_in("alice").await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.engine
        .set_observer(Arc::new(move |s: SyncStatus| sink.lock().unwrap().push(s)));

    h.engine.set_user(None).await;
    h.net.set(false);
    h.engine.set_user(Some("alice".into())).await;

    assert_eq!(*seen.lock().unwrap(), vec![SyncStatus::Local, SyncStatus::Offline]);
    assert!(h.statuses().is_empty());
}

#[tokio::test]
async fn test_pull_write_failure_is_error() {
    let h = Harness::signed_in("alice").await;
    h.local.set_fail_writes(true);

    assert_eq!(h.engine.pull().await, None);
    assert_eq!(h.engine.status(), SyncStatus::Error);
}
