//! # stockpile-db: Database Layer for Stockpile
//!
//! SQLite storage for both sides of the sync: the local key-value blob store
//! and the owner-scoped tables a self-hosted node serves as its remote.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpile Data Flow                              │
//! │                                                                         │
//! │  stockpile-sync adapters (SqliteLocalStore / SqliteRemoteTables)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockpile-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ KvRepository  │    │ 001_kv.sql   │  │   │
//! │  │   │ SqlitePool    │◄───│ ItemRowRepo   │    │ 002_owner_   │  │   │
//! │  │   │               │    │ ProfileRepo   │    │   tables.sql │  │   │
//! │  │   │               │    │ PinRowRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockpile_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockpile.db")).await?;
//! db.kv().put("stockpile.snapshot", "{}").await?;
//! let live = db.items().list_live("owner-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::items::ItemRowRepository;
pub use repository::kv::KvRepository;
pub use repository::pins::PinRowRepository;
pub use repository::profiles::ProfileRepository;
