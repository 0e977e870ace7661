//! # stockpile-sync: Offline-First Sync Engine for Stockpile
//!
//! Keeps the device's local snapshot and the signed-in owner's remote rows
//! in step, over a network that may come and go.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  SyncEngine (Main Orchestrator)                  │  │
//! │  │                                                                  │  │
//! │  │  Owned by the host; cheap to clone                               │  │
//! │  │  push / pull / queue_sync / migrate_to_cloud / set_user          │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  RemoteTables  │  │   LocalStore   │  │    Reachability        │    │
//! │  │                │  │                │  │                        │    │
//! │  │ items,profiles │  │ snapshot blob  │  │ is the network up?     │    │
//! │  │ map_pins by    │  │ + sync         │  │                        │    │
//! │  │ owner          │  │ metadata       │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  STATUS (to the UI via StatusObserver):                                │
//! │  local · offline · syncing · synced · error                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - Main `SyncEngine` orchestrator and builder
//! - [`config`] - Sync configuration (debounce, batch size, timeouts, keys)
//! - [`error`] - Sync error types
//! - [`merge`] - Pull merge rules
//! - [`status`] - Status values and the observer hook
//! - [`remote`], [`local`], [`reachability`] - Collaborator traits
//! - [`adapters`] - In-memory and SQLite implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockpile_sync::{SyncConfig, SyncEngineBuilder, SyncStatus};
//! use stockpile_sync::adapters::{MemoryLocalStore, MemoryRemoteTables};
//!
//! let engine = SyncEngineBuilder::new(SyncConfig::load_or_default(None))
//!     .with_remote(Arc::new(MemoryRemoteTables::new()))
//!     .with_local(Arc::new(MemoryLocalStore::new()))
//!     .with_observer(Arc::new(|s: SyncStatus| println!("sync: {s}")))
//!     .build()?;
//!
//! engine.set_user(Some("owner-1".into())).await;
//! engine.edit_snapshot(|s| s.people = Some(3)).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod local;
pub mod merge;
pub mod reachability;
pub mod remote;
pub mod status;

pub use config::{MergePolicy, SyncConfig};
pub use engine::{MigrationOutcome, PushReport, SyncEngine, SyncEngineBuilder};
pub use error::{SyncError, SyncResult};
pub use local::LocalStore;
pub use reachability::{AlwaysReachable, Reachability, SharedReachability};
pub use remote::RemoteTables;
pub use status::{NoOpObserver, StatusObserver, SyncStatus};
