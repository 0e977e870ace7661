//! Shared harness for engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use stockpile_core::{Item, ItemRow, LocalSnapshot, MapPin, SyncMetadata};
use stockpile_sync::adapters::{MemoryLocalStore, MemoryRemoteTables};
use stockpile_sync::config::{DEFAULT_METADATA_KEY, DEFAULT_SNAPSHOT_KEY};
use stockpile_sync::{SharedReachability, SyncConfig, SyncEngine, SyncEngineBuilder, SyncStatus};

pub struct Harness {
    pub engine: SyncEngine,
    pub remote: Arc<MemoryRemoteTables>,
    pub local: Arc<MemoryLocalStore>,
    pub net: SharedReachability,
    statuses: Arc<Mutex<Vec<SyncStatus>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        let remote = Arc::new(MemoryRemoteTables::new());
        let local = Arc::new(MemoryLocalStore::new());
        let net = SharedReachability::new(true);
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let sink = statuses.clone();
        let engine = SyncEngineBuilder::new(config)
            .with_remote(remote.clone())
            .with_local(local.clone())
            .with_reachability(Arc::new(net.clone()))
            .with_observer(Arc::new(move |s: SyncStatus| sink.lock().unwrap().push(s)))
            .build()
            .unwrap();

        Harness {
            engine,
            remote,
            local,
            net,
            statuses,
        }
    }

    /// Writes `snapshot` straight into the local store.
    pub async fn seed_local(&self, snapshot: &LocalSnapshot) {
        self.local
            .put(DEFAULT_SNAPSHOT_KEY, &snapshot.to_json().unwrap())
            .await;
    }

    pub async fn local_snapshot(&self) -> Option<LocalSnapshot> {
        self.local
            .get(DEFAULT_SNAPSHOT_KEY)
            .await
            .map(|blob| LocalSnapshot::from_json(&blob).unwrap())
    }

    pub async fn local_metadata(&self) -> Option<SyncMetadata> {
        self.local
            .get(DEFAULT_METADATA_KEY)
            .await
            .map(|blob| SyncMetadata::from_json(&blob).unwrap())
    }

    /// Signs `owner` in (pulling an empty remote) and forgets the calls
    /// and statuses that produced.
    pub async fn signed_in(owner: &str) -> Self {
        let h = Self::new();
        h.engine.set_user(Some(owner.to_string())).await;
        h.reset_observations().await;
        h
    }

    pub fn statuses(&self) -> Vec<SyncStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub async fn reset_observations(&self) {
        self.statuses.lock().unwrap().clear();
        self.remote.clear_calls().await;
    }
}

pub fn item(name: &str) -> Item {
    Item::new("food", name)
}

pub fn items(n: usize) -> Vec<Item> {
    (0..n).map(|i| item(&format!("Item {}", i))).collect()
}

pub fn pin(label: &str) -> MapPin {
    let mut pin = MapPin::new("utilities", "shutoff", 10.0, 20.0);
    pin.label = label.to_string();
    pin
}

pub fn snapshot_with(items: Vec<Item>) -> LocalSnapshot {
    LocalSnapshot {
        items,
        ..Default::default()
    }
}

/// A remote item row for `owner`, updated `age_secs` seconds ago.
pub fn remote_item(name: &str, owner: &str, age_secs: i64) -> ItemRow {
    let at: DateTime<Utc> = Utc::now() - Duration::seconds(age_secs);
    ItemRow::for_push(&item(name), owner, at)
}

pub fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}
