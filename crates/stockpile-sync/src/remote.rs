//! # Remote Table Adapter
//!
//! The capability the engine needs from the remote backing store: upsert,
//! select, and update against three owner-scoped tables.
//!
//! ```text
//! ┌───────────┬──────────────────────┬──────────────────────────────────┐
//! │ table     │ conflict key         │ operations                       │
//! ├───────────┼──────────────────────┼──────────────────────────────────┤
//! │ items     │ (id, owner_id)       │ upsert_items, select_items       │
//! │ profiles  │ id (= owner)         │ select_profile, update_profile   │
//! │ map_pins  │ (id, owner_id)       │ upsert_pins, select_pins         │
//! └───────────┴──────────────────────┴──────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Upserts insert or overwrite by conflict key and are idempotent.
//! - Selects return only the owner's rows, exclude soft-deleted rows, and
//!   order by `updated_at` descending.
//! - A missing profile row is `Ok(None)`; updating one is not an error.
//! - Failures are reported as [`SyncError::Remote`] tagged with the table.

use async_trait::async_trait;

use stockpile_core::{ItemRow, PinRow, ProfilePatch, ProfileRow};

use crate::error::SyncResult;

/// Per-table access to the remote store.
#[async_trait]
pub trait RemoteTables: Send + Sync {
    /// Inserts or overwrites item rows by `(id, owner_id)`.
    async fn upsert_items(&self, rows: &[ItemRow]) -> SyncResult<()>;

    /// Live item rows for `owner_id`, newest first.
    async fn select_items(&self, owner_id: &str) -> SyncResult<Vec<ItemRow>>;

    /// The owner's profile row, if one exists.
    async fn select_profile(&self, owner_id: &str) -> SyncResult<Option<ProfileRow>>;

    /// Applies `patch` to the owner's profile row.
    async fn update_profile(&self, owner_id: &str, patch: &ProfilePatch) -> SyncResult<()>;

    /// Inserts or overwrites pin rows by `(id, owner_id)`.
    async fn upsert_pins(&self, rows: &[PinRow]) -> SyncResult<()>;

    /// Live pin rows for `owner_id`, newest first.
    async fn select_pins(&self, owner_id: &str) -> SyncResult<Vec<PinRow>>;
}
