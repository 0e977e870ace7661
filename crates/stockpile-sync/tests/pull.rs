//! Pull: fetch, merge into the local snapshot, persist.

mod common;

use chrono::Utc;
use common::*;
use stockpile_core::{LocalSnapshot, PinRow, ProfileRow};
use stockpile_sync::adapters::RemoteOp;
use stockpile_sync::{MergePolicy, SyncConfig, SyncStatus};

#[tokio::test]
async fn test_remote_items_replace_local() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&snapshot_with(vec![item("A")])).await;
    h.remote
        .seed_items(vec![remote_item("C", "alice", 60), remote_item("B", "alice", 5)])
        .await;

    let merged = h.engine.pull().await.unwrap();

    assert_eq!(names(&merged.items), vec!["B", "C"]);
    assert!(merged.saved_at.is_some());
    assert_eq!(h.local_snapshot().await, Some(merged));
    assert!(h.local_metadata().await.unwrap().last_pull.is_some());
    assert_eq!(h.statuses(), vec![SyncStatus::Syncing, SyncStatus::Synced]);
}

#[tokio::test]
async fn test_empty_remote_preserves_local() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&snapshot_with(vec![item("A")])).await;

    let merged = h.engine.pull().await.unwrap();

    assert_eq!(names(&merged.items), vec!["A"]);
    assert_eq!(names(&h.local_snapshot().await.unwrap().items), vec!["A"]);
}

#[tokio::test]
async fn test_pulled_items_carry_remote_version() {
    let h = Harness::signed_in("alice").await;
    let mut row = remote_item("Rice", "alice", 0);
    row.version = 7;
    h.remote.seed_items(vec![row]).await;

    let merged = h.engine.pull().await.unwrap();
    assert_eq!(merged.items[0].version, 7);
}

#[tokio::test]
async fn test_soft_deleted_rows_are_invisible() {
    let h = Harness::signed_in("alice").await;
    let keep = remote_item("Keep", "alice", 10);
    let gone = remote_item("Gone", "alice", 5);
    h.remote.seed_items(vec![keep, gone.clone()]).await;
    h.remote.soft_delete_item("alice", &gone.id, Utc::now()).await;

    let merged = h.engine.pull().await.unwrap();
    assert_eq!(names(&merged.items), vec!["Keep"]);
}

#[tokio::test]
async fn test_other_owners_rows_are_invisible() {
    let h = Harness::signed_in("alice").await;
    h.remote
        .seed_items(vec![remote_item("Mine", "alice", 0), remote_item("Theirs", "bob", 0)])
        .await;

    let merged = h.engine.pull().await.unwrap();
    assert_eq!(names(&merged.items), vec!["Mine"]);
    assert!(h
        .remote
        .calls()
        .await
        .iter()
        .all(|c| c.owner.as_deref() == Some("alice")));
}

#[tokio::test]
async fn test_profile_falls_back_remote_local_default() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&LocalSnapshot {
        people: Some(6),
        prop_address: Some("1 Hill Rd".into()),
        ..Default::default()
    })
    .await;
    h.remote
        .seed_profile(ProfileRow {
            climate: Some("cold".into()),
            ..ProfileRow::empty("alice")
        })
        .await;

    let merged = h.engine.pull().await.unwrap();

    assert_eq!(merged.climate.as_deref(), Some("cold"));
    assert_eq!(merged.people, Some(6));
    assert_eq!(merged.prop_address.as_deref(), Some("1 Hill Rd"));
    assert_eq!(merged.active_property_id.as_deref(), Some("home"));
}

#[tokio::test]
async fn test_missing_profile_uses_defaults() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&LocalSnapshot::default()).await;

    let merged = h.engine.pull().await.unwrap();

    assert_eq!(merged.climate.as_deref(), Some("temperate"));
    assert_eq!(merged.people, Some(4));
    assert_eq!(merged.prop_address.as_deref(), Some(""));
    assert_eq!(merged.active_property_id.as_deref(), Some("home"));
    assert_eq!(h.engine.status(), SyncStatus::Synced);
}

#[tokio::test]
async fn test_configured_profile_defaults() {
    let mut config = SyncConfig::default();
    config.profile_defaults.people = 1;
    config.profile_defaults.climate = "tropical".into();
    let h = Harness::with_config(config);

    let merged = h.engine.set_user(Some("alice".into())).await.unwrap();
    assert_eq!(merged.people, Some(1));
    assert_eq!(merged.climate.as_deref(), Some("tropical"));
}

#[tokio::test]
async fn test_remote_pins_replace_local() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&LocalSnapshot {
        pins: vec![pin("Local")],
        ..Default::default()
    })
    .await;
    let remote = PinRow::for_push(&pin("Remote"), "alice", Utc::now());
    h.remote.seed_pins(vec![remote]).await;

    let merged = h.engine.pull().await.unwrap();
    assert_eq!(merged.pins.len(), 1);
    assert_eq!(merged.pins[0].label, "Remote");
}

#[tokio::test]
async fn test_pull_failure_leaves_local_untouched() {
    let h = Harness::signed_in("alice").await;
    h.seed_local(&snapshot_with(vec![item("A")])).await;
    let before = h.local_snapshot().await;
    h.remote.seed_items(vec![remote_item("B", "alice", 0)]).await;
    h.remote.fail_next(RemoteOp::SelectPins).await;

    assert_eq!(h.engine.pull().await, None);

    assert_eq!(h.engine.status(), SyncStatus::Error);
    assert_eq!(h.local_snapshot().await, before);
}

#[tokio::test]
async fn test_pull_offline() {
    let h = Harness::signed_in("alice").await;
    h.net.set(false);

    assert_eq!(h.engine.pull().await, None);
    assert_eq!(h.engine.status(), SyncStatus::Offline);
    assert!(h.remote.calls().await.is_empty());
}

#[tokio::test]
async fn test_union_policy_keeps_unpushed_local_items() {
    let mut config = SyncConfig::default();
    config.sync.merge_policy = MergePolicy::Union;
    let h = Harness::with_config(config);
    h.engine.set_user(Some("alice".into())).await;

    let mut pushed_before = item("Pushed earlier");
    pushed_before.version = 3;
    h.seed_local(&snapshot_with(vec![pushed_before, item("Fresh")])).await;
    h.remote.seed_items(vec![remote_item("Remote", "alice", 0)]).await;

    let merged = h.engine.pull().await.unwrap();
    assert_eq!(names(&merged.items), vec!["Remote", "Fresh"]);
}
