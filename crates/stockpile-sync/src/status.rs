//! # Sync Status
//!
//! The engine's five-state status and the observer hook the UI subscribes
//! with.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Status Transitions                               │
//! │                                                                         │
//! │              set_user(None) / queue_sync (no owner)                     │
//! │   ┌──────────────────────────────────────────────┐                      │
//! │   ▼                                              │                      │
//! │ ┌───────┐  push/pull start  ┌─────────┐ ok  ┌────────┐                  │
//! │ │ local │ ────────────────► │ syncing │ ──► │ synced │                  │
//! │ └───────┘                   └─────────┘     └────────┘                  │
//! │     ▲                            │ fail                                 │
//! │     │                            ▼                                      │
//! │     │                       ┌─────────┐                                 │
//! │     │                       │  error  │  (retried by the next push)     │
//! │     │                       └─────────┘                                 │
//! │     │                                                                   │
//! │     │  network unreachable at queue_sync / push / pull                  │
//! │     │                       ┌─────────┐                                 │
//! │     └────────────────────── │ offline │                                 │
//! │                             └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Sync Status
// =============================================================================

/// Current sync status of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No owner signed in, or nothing has synced yet.
    #[default]
    Local,

    /// The network is unreachable.
    Offline,

    /// A push or pull is in flight.
    Syncing,

    /// The last push or pull succeeded.
    Synced,

    /// The last push or pull failed.
    Error,
}

impl SyncStatus {
    /// Returns the wire name shown to the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Offline => "offline",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }

    /// Returns true if an operation is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Observer Trait
// =============================================================================

/// Receives every status transition, synchronously, in order.
///
/// Implementations must not block; the engine calls this while holding no
/// locks, but from whichever task made the transition.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, status: SyncStatus);
}

impl<F> StatusObserver for F
where
    F: Fn(SyncStatus) + Send + Sync,
{
    fn on_status(&self, status: SyncStatus) {
        self(status)
    }
}

/// No-op observer, installed until the host registers one.
pub struct NoOpObserver;

impl StatusObserver for NoOpObserver {
    fn on_status(&self, _status: SyncStatus) {}
}

/// Shared observer handle.
pub type SharedObserver = Arc<dyn StatusObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_status_default_is_local() {
        assert_eq!(SyncStatus::default(), SyncStatus::Local);
        assert!(!SyncStatus::Synced.is_busy());
        assert!(SyncStatus::Syncing.is_busy());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SyncStatus::Offline).unwrap();
        assert_eq!(json, "\"offline\"");
        assert_eq!(SyncStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer: SharedObserver = Arc::new(move |s: SyncStatus| {
            sink.lock().unwrap().push(s);
        });

        observer.on_status(SyncStatus::Syncing);
        observer.on_status(SyncStatus::Synced);

        assert_eq!(*seen.lock().unwrap(), vec![SyncStatus::Syncing, SyncStatus::Synced]);
    }
}
