//! # Repository Module
//!
//! Database repository implementations for Stockpile.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Local side                                                            │
//! │  └── KvRepository        get / put whole blobs by key                  │
//! │                                                                         │
//! │  Owner-scoped side (every query binds owner_id)                        │
//! │  ├── ItemRowRepository   upsert_many / list_live / soft_delete         │
//! │  ├── ProfileRepository   get / update / ensure                         │
//! │  └── PinRowRepository    upsert_many / list_live / soft_delete         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod items;
pub mod kv;
pub mod pins;
pub mod profiles;

/// Converts a stored INTEGER into a `u32` column value.
pub(crate) fn column_u32(column: &str, value: i64) -> crate::DbResult<u32> {
    u32::try_from(value).map_err(|e| crate::DbError::invalid_value(column, e))
}

/// Converts a stored INTEGER into a `u64` column value.
pub(crate) fn column_u64(column: &str, value: i64) -> crate::DbResult<u64> {
    u64::try_from(value).map_err(|e| crate::DbError::invalid_value(column, e))
}

/// Converts a `u64` for binding as INTEGER.
pub(crate) fn bind_u64(column: &str, value: u64) -> crate::DbResult<i64> {
    i64::try_from(value).map_err(|e| crate::DbError::invalid_value(column, e))
}
