//! Two devices syncing through one SQLite-backed remote.

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{item, names, pin};
use stockpile_db::{Database, DbConfig};
use stockpile_sync::adapters::{SqliteLocalStore, SqliteRemoteTables};
use stockpile_sync::{SyncConfig, SyncEngine, SyncEngineBuilder, SyncStatus};

async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn device(remote: &SqliteRemoteTables) -> SyncEngine {
    SyncEngineBuilder::new(SyncConfig::default())
        .with_remote(Arc::new(remote.clone()))
        .with_local(Arc::new(SqliteLocalStore::new(memory_db().await)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_two_devices_share_owner_rows() {
    let remote_db = memory_db().await;
    let remote = SqliteRemoteTables::new(remote_db.clone());
    remote.ensure_profile("alice").await.unwrap();

    let laptop = device(&remote).await;
    laptop.set_user(Some("alice".into())).await.unwrap();
    laptop
        .edit_snapshot(|s| {
            s.items.push(item("Rice"));
            s.items.push(item("Beans"));
            s.people = Some(5);
            s.pins.push(pin("Water main"));
        })
        .await
        .unwrap();
    laptop.destroy();

    let report = laptop.push().await.unwrap();
    assert_eq!(report.items, 2);
    assert!(report.profile_synced);
    assert!(report.pins_synced);

    let phone = device(&remote).await;
    let pulled = phone.set_user(Some("alice".into())).await.unwrap();

    let mut pulled_names = names(&pulled.items);
    pulled_names.sort();
    assert_eq!(pulled_names, vec!["Beans", "Rice"]);
    assert_eq!(pulled.people, Some(5));
    assert_eq!(pulled.pins.len(), 1);
    assert_eq!(phone.status(), SyncStatus::Synced);

    // A deletion made elsewhere disappears on the next pull.
    let rice = pulled.items.iter().find(|i| i.name == "Rice").unwrap();
    let deleted = remote_db
        .items()
        .soft_delete("alice", &[rice.id.clone()], Utc::now())
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let after = phone.pull().await.unwrap();
    assert_eq!(names(&after.items), vec!["Beans"]);
}

#[tokio::test]
async fn test_push_without_profile_row_still_succeeds() {
    let remote_db = memory_db().await;
    let remote = SqliteRemoteTables::new(remote_db.clone());

    let engine = device(&remote).await;
    engine.set_user(Some("bob".into())).await;
    engine
        .edit_snapshot(|s| s.items.push(item("Candles")))
        .await
        .unwrap();
    engine.destroy();

    let report = engine.push().await.unwrap();

    assert_eq!(report.items, 1);
    assert_eq!(remote_db.items().count_live("bob").await.unwrap(), 1);
    assert!(remote_db.profiles().get("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_metadata_persists_in_local_db() {
    let remote = SqliteRemoteTables::new(memory_db().await);
    let local_db = memory_db().await;

    let engine = SyncEngineBuilder::new(SyncConfig::default())
        .with_remote(Arc::new(remote))
        .with_local(Arc::new(SqliteLocalStore::new(local_db.clone())))
        .build()
        .unwrap();
    engine.set_user(Some("carol".into())).await.unwrap();

    let meta = engine.metadata().await.unwrap();
    assert_eq!(meta.user_id, "carol");
    assert!(meta.last_pull.is_some());
    assert!(local_db
        .kv()
        .get(stockpile_sync::config::DEFAULT_METADATA_KEY)
        .await
        .unwrap()
        .is_some());
}
