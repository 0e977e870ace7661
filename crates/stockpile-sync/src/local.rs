//! # Local Snapshot Store
//!
//! Key-value persistence for whole blobs. The engine keeps exactly two keys
//! here: the serialized snapshot and the sync metadata.

use async_trait::async_trait;

use crate::error::SyncResult;

/// Device-local key-value storage. Last write wins.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn read(&self, key: &str) -> SyncResult<Option<String>>;

    async fn write(&self, key: &str, value: &str) -> SyncResult<()>;
}
