//! # In-Memory Adapters
//!
//! Process-local implementations of [`RemoteTables`] and [`LocalStore`] for
//! tests and embedders that bring their own persistence.
//!
//! The remote side behaves like the real tables (owner scoping, soft
//! deletes, newest-first ordering) and adds test hooks:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  call log      every call: operation, owner, row count               │
//! │  faults        fail_next(op) / fail_always(op) → SyncError::Remote   │
//! │  latency       set_latency(op, d) → tokio::time::sleep(d) per call   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use chrono::{DateTime, Utc};
use stockpile_core::{ItemRow, PinRow, ProfilePatch, ProfileRow, Table};

use crate::error::{SyncError, SyncResult};
use crate::local::LocalStore;
use crate::remote::RemoteTables;

// =============================================================================
// Call Log
// =============================================================================

/// The six remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    UpsertItems,
    SelectItems,
    SelectProfile,
    UpdateProfile,
    UpsertPins,
    SelectPins,
}

impl RemoteOp {
    pub fn table(&self) -> Table {
        match self {
            RemoteOp::UpsertItems | RemoteOp::SelectItems => Table::Items,
            RemoteOp::SelectProfile | RemoteOp::UpdateProfile => Table::Profiles,
            RemoteOp::UpsertPins | RemoteOp::SelectPins => Table::MapPins,
        }
    }
}

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub op: RemoteOp,
    /// Owner the call was scoped to. Upserts record the first row's owner.
    pub owner: Option<String>,
    /// Rows sent (upserts) or returned (selects).
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Once,
    Always,
}

// =============================================================================
// Remote Tables
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by (owner_id, id).
    items: HashMap<(String, String), ItemRow>,
    profiles: HashMap<String, ProfileRow>,
    pins: HashMap<(String, String), PinRow>,
}

/// In-memory remote tables with fault injection and call recording.
#[derive(Debug, Default)]
pub struct MemoryRemoteTables {
    tables: Mutex<Tables>,
    calls: Mutex<Vec<RemoteCall>>,
    faults: Mutex<HashMap<RemoteOp, Fault>>,
    latency: Mutex<HashMap<RemoteOp, Duration>>,
}

impl MemoryRemoteTables {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Test hooks
    // -------------------------------------------------------------------------

    /// Makes the next call of `op` fail.
    pub async fn fail_next(&self, op: RemoteOp) {
        self.faults.lock().await.insert(op, Fault::Once);
    }

    /// Makes every call of `op` fail until [`Self::clear_faults`].
    pub async fn fail_always(&self, op: RemoteOp) {
        self.faults.lock().await.insert(op, Fault::Always);
    }

    pub async fn clear_faults(&self) {
        self.faults.lock().await.clear();
    }

    /// Delays every call of `op` by `delay` before it takes effect.
    pub async fn set_latency(&self, op: RemoteOp, delay: Duration) {
        self.latency.lock().await.insert(op, delay);
    }

    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self, op: RemoteOp) -> usize {
        self.calls.lock().await.iter().filter(|c| c.op == op).count()
    }

    /// Row counts of each `upsert_items` call, in order.
    pub async fn item_batches(&self) -> Vec<usize> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.op == RemoteOp::UpsertItems)
            .map(|c| c.rows)
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    // -------------------------------------------------------------------------
    // Direct table access
    // -------------------------------------------------------------------------

    /// Inserts rows as if another device had pushed them.
    pub async fn seed_items(&self, rows: Vec<ItemRow>) {
        let mut tables = self.tables.lock().await;
        for row in rows {
            tables
                .items
                .insert((row.owner_id.clone(), row.id.clone()), row);
        }
    }

    pub async fn seed_pins(&self, rows: Vec<PinRow>) {
        let mut tables = self.tables.lock().await;
        for row in rows {
            tables.pins.insert((row.owner_id.clone(), row.id.clone()), row);
        }
    }

    pub async fn seed_profile(&self, row: ProfileRow) {
        self.tables.lock().await.profiles.insert(row.id.clone(), row);
    }

    /// Marks an item soft-deleted.
    pub async fn soft_delete_item(&self, owner_id: &str, id: &str, at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.items.get_mut(&(owner_id.to_string(), id.to_string())) {
            Some(row) => {
                row.deleted_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Every item row stored for the owner, deleted ones included, sorted
    /// by id.
    pub async fn stored_items(&self, owner_id: &str) -> Vec<ItemRow> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<ItemRow> = tables
            .items
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    pub async fn stored_pins(&self, owner_id: &str) -> Vec<PinRow> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PinRow> = tables
            .pins
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    pub async fn stored_profile(&self, owner_id: &str) -> Option<ProfileRow> {
        self.tables.lock().await.profiles.get(owner_id).cloned()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn enter(&self, op: RemoteOp, owner: Option<&str>, rows: usize) -> SyncResult<()> {
        self.calls.lock().await.push(RemoteCall {
            op,
            owner: owner.map(str::to_string),
            rows,
        });

        let delay = self.latency.lock().await.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut faults = self.faults.lock().await;
        match faults.get(&op).copied() {
            Some(Fault::Once) => {
                faults.remove(&op);
                Err(SyncError::remote(op.table(), "injected failure"))
            }
            Some(Fault::Always) => Err(SyncError::remote(op.table(), "injected failure")),
            None => Ok(()),
        }
    }

    async fn record_returned(&self, rows: usize) {
        if let Some(last) = self.calls.lock().await.last_mut() {
            last.rows = rows;
        }
    }
}

#[async_trait]
impl RemoteTables for MemoryRemoteTables {
    async fn upsert_items(&self, rows: &[ItemRow]) -> SyncResult<()> {
        let owner = rows.first().map(|r| r.owner_id.as_str());
        self.enter(RemoteOp::UpsertItems, owner, rows.len()).await?;
        self.seed_items(rows.to_vec()).await;
        Ok(())
    }

    async fn select_items(&self, owner_id: &str) -> SyncResult<Vec<ItemRow>> {
        self.enter(RemoteOp::SelectItems, Some(owner_id), 0).await?;

        let mut rows: Vec<ItemRow> = {
            let tables = self.tables.lock().await;
            tables
                .items
                .values()
                .filter(|r| r.is_live_for(owner_id))
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        self.record_returned(rows.len()).await;
        Ok(rows)
    }

    async fn select_profile(&self, owner_id: &str) -> SyncResult<Option<ProfileRow>> {
        self.enter(RemoteOp::SelectProfile, Some(owner_id), 0).await?;
        Ok(self.stored_profile(owner_id).await)
    }

    async fn update_profile(&self, owner_id: &str, patch: &ProfilePatch) -> SyncResult<()> {
        self.enter(RemoteOp::UpdateProfile, Some(owner_id), 1).await?;

        let mut tables = self.tables.lock().await;
        if let Some(row) = tables.profiles.get_mut(owner_id) {
            patch.apply_to(row);
        }
        Ok(())
    }

    async fn upsert_pins(&self, rows: &[PinRow]) -> SyncResult<()> {
        let owner = rows.first().map(|r| r.owner_id.as_str());
        self.enter(RemoteOp::UpsertPins, owner, rows.len()).await?;
        self.seed_pins(rows.to_vec()).await;
        Ok(())
    }

    async fn select_pins(&self, owner_id: &str) -> SyncResult<Vec<PinRow>> {
        self.enter(RemoteOp::SelectPins, Some(owner_id), 0).await?;

        let mut rows: Vec<PinRow> = {
            let tables = self.tables.lock().await;
            tables
                .pins
                .values()
                .filter(|r| r.is_live_for(owner_id))
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        self.record_returned(rows.len()).await;
        Ok(rows)
    }
}

// =============================================================================
// Local Store
// =============================================================================

/// In-memory local key-value store.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail while set.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw stored value, bypassing the trait.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    /// Stores a raw value, bypassing the trait.
    pub async fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn read(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.get(key).await)
    }

    async fn write(&self, key: &str, value: &str) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::LocalStore(format!("write to '{}' refused", key)));
        }
        self.put(key, value).await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
