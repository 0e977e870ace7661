//! # Network Reachability
//!
//! A synchronous yes/no the engine consults before touching the network.
//! The host flips it from whatever platform signal it has, and tells the
//! engine via `SyncEngine::reachability_changed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports whether the network is currently reachable.
pub trait Reachability: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Atomic flag shared between the host and the engine.
#[derive(Debug, Clone)]
pub struct SharedReachability {
    online: Arc<AtomicBool>,
}

impl SharedReachability {
    pub fn new(online: bool) -> Self {
        SharedReachability {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Updates the flag. Clones observe the change immediately.
    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for SharedReachability {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reachability for SharedReachability {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Always reachable. Used when the remote is local (CLI against SQLite).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReachable;

impl Reachability for AlwaysReachable {
    fn is_reachable(&self) -> bool {
        true
    }
}
