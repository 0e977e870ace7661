//! # SQLite Adapters
//!
//! [`LocalStore`] and [`RemoteTables`] over `stockpile-db`.
//!
//! ```text
//! SqliteLocalStore    ──► KvRepository        (local_kv table)
//! SqliteRemoteTables  ──► ItemRowRepository   (items)
//!                     ──► ProfileRepository   (profiles)
//!                     ──► PinRowRepository    (map_pins)
//! ```
//!
//! The two usually live in different database files: one on the device,
//! one on the node that plays the remote.

use async_trait::async_trait;
use tracing::debug;

use stockpile_core::{ItemRow, PinRow, ProfilePatch, ProfileRow, Table};
use stockpile_db::Database;

use crate::error::{SyncError, SyncResult};
use crate::local::LocalStore;
use crate::remote::RemoteTables;

// =============================================================================
// Local Store
// =============================================================================

/// Local store backed by the `local_kv` table.
#[derive(Debug, Clone)]
pub struct SqliteLocalStore {
    db: Database,
}

impl SqliteLocalStore {
    pub fn new(db: Database) -> Self {
        SqliteLocalStore { db }
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn read(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.db.kv().get(key).await?)
    }

    async fn write(&self, key: &str, value: &str) -> SyncResult<()> {
        Ok(self.db.kv().put(key, value).await?)
    }
}

// =============================================================================
// Remote Tables
// =============================================================================

/// Remote tables backed by owner-scoped SQLite tables.
#[derive(Debug, Clone)]
pub struct SqliteRemoteTables {
    db: Database,
}

impl SqliteRemoteTables {
    pub fn new(db: Database) -> Self {
        SqliteRemoteTables { db }
    }

    /// Creates the owner's profile row if missing. Sign-up does this on a
    /// hosted backend; a push never creates it.
    pub async fn ensure_profile(&self, owner_id: &str) -> SyncResult<()> {
        self.db
            .profiles()
            .ensure(owner_id)
            .await
            .map_err(|e| SyncError::remote(Table::Profiles, e))
    }
}

#[async_trait]
impl RemoteTables for SqliteRemoteTables {
    async fn upsert_items(&self, rows: &[ItemRow]) -> SyncResult<()> {
        self.db
            .items()
            .upsert_many(rows)
            .await
            .map_err(|e| SyncError::remote(Table::Items, e))?;
        Ok(())
    }

    async fn select_items(&self, owner_id: &str) -> SyncResult<Vec<ItemRow>> {
        self.db
            .items()
            .list_live(owner_id)
            .await
            .map_err(|e| SyncError::remote(Table::Items, e))
    }

    async fn select_profile(&self, owner_id: &str) -> SyncResult<Option<ProfileRow>> {
        self.db
            .profiles()
            .get(owner_id)
            .await
            .map_err(|e| SyncError::remote(Table::Profiles, e))
    }

    async fn update_profile(&self, owner_id: &str, patch: &ProfilePatch) -> SyncResult<()> {
        let updated = self
            .db
            .profiles()
            .update(owner_id, patch)
            .await
            .map_err(|e| SyncError::remote(Table::Profiles, e))?;

        if updated == 0 {
            debug!(owner_id = %owner_id, "No profile row to update");
        }
        Ok(())
    }

    async fn upsert_pins(&self, rows: &[PinRow]) -> SyncResult<()> {
        self.db
            .pins()
            .upsert_many(rows)
            .await
            .map_err(|e| SyncError::remote(Table::MapPins, e))?;
        Ok(())
    }

    async fn select_pins(&self, owner_id: &str) -> SyncResult<Vec<PinRow>> {
        self.db
            .pins()
            .list_live(owner_id)
            .await
            .map_err(|e| SyncError::remote(Table::MapPins, e))
    }
}
