//! # Adapters
//!
//! Concrete collaborators for the engine.
//!
//! - [`memory`] - in-process tables and store, with test hooks
//! - [`sqlite`] - `stockpile-db` backed store and tables for a self-hosted
//!   node

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryLocalStore, MemoryRemoteTables, RemoteCall, RemoteOp};
pub use sqlite::{SqliteLocalStore, SqliteRemoteTables};
