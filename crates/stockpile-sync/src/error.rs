//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Remote         │  │  LocalStore             │ │
//! │  │  ConfigLoad     │  │  Timeout        │  │  Serialization          │ │
//! │  │  ConfigSave     │  │  Offline        │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │     Owner       │  │    Internal     │                              │
//! │  │                 │  │                 │                              │
//! │  │  NoOwner        │  │  Internal       │                              │
//! │  │  OwnerChanged   │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The public sync operations never return these; they log them and move
//! the status to `error`. They surface from `edit_snapshot`, the adapters,
//! and configuration loading.

use stockpile_core::{CoreError, Table, ValidationError};
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// A remote table call failed.
    #[error("Remote {table} call failed: {message}")]
    Remote { table: Table, message: String },

    /// A remote table call did not complete in time.
    #[error("Remote {table} call timed out after {secs} seconds")]
    Timeout { table: Table, secs: u64 },

    /// Network is unreachable.
    #[error("Network unreachable")]
    Offline,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// The local store failed to read or write.
    #[error("Local store error: {0}")]
    LocalStore(String),

    /// A stored blob could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The snapshot failed validation.
    #[error("Invalid snapshot: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Owner Errors
    // =========================================================================
    /// No owner identity is set.
    #[error("No signed-in owner")]
    NoOwner,

    /// The owner identity changed while an operation was in flight.
    #[error("Owner changed during sync")]
    OwnerChanged,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal engine error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Wraps any displayable failure as a remote error on `table`.
    pub fn remote(table: Table, err: impl std::fmt::Display) -> Self {
        SyncError::Remote {
            table,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<stockpile_db::DbError> for SyncError {
    fn from(err: stockpile_db::DbError) -> Self {
        SyncError::LocalStore(err.to_string())
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => SyncError::Validation(v),
            CoreError::Serialization(msg) => SyncError::SerializationFailed(msg),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if a later push or pull may succeed without any change
    /// on this device.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Remote { .. } | SyncError::Timeout { .. } | SyncError::Offline
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the operation was abandoned because of the owner
    /// identity rather than a failure.
    pub fn is_owner_error(&self) -> bool {
        matches!(self, SyncError::NoOwner | SyncError::OwnerChanged)
    }
}
