//! # stockpile-core: Pure Data Model for Stockpile
//!
//! This crate holds the data shapes shared by the local snapshot, the remote
//! tables and the sync engine, as pure types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockpile Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (inventory + map)                         │   │
//! │  │    edits LocalSnapshot ──► queue_sync ──► status indicator      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockpile-sync (engine)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockpile-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   rows    │  │validation │                  │   │
//! │  │   │ Snapshot  │  │ ItemRow   │  │   rules   │                  │   │
//! │  │   │ Item, Pin │  │ PinRow    │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Local-side types (LocalSnapshot, Item, MapPin, SyncMetadata)
//! - [`rows`] - Remote-side row shapes and the mappings to/from local types
//! - [`error`] - Domain error types
//! - [`validation`] - Snapshot validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockpile_core::{Item, LocalSnapshot};
//!
//! let mut snapshot = LocalSnapshot::default();
//! snapshot.items.push(Item::new("water", "Bottled water"));
//!
//! let blob = snapshot.to_json().unwrap();
//! let restored = LocalSnapshot::from_json(&blob).unwrap();
//! assert_eq!(restored.items.len(), 1);
//! assert_eq!(restored.items[0].quantity, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod rows;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use rows::{ItemRow, PinRow, ProfilePatch, ProfileRow, Table};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Climate used when neither the remote profile nor the local snapshot has one.
pub const DEFAULT_CLIMATE: &str = "temperate";

/// Household size used when neither side has one.
pub const DEFAULT_PEOPLE: u32 = 4;

/// Property selected when neither side has an active property.
pub const DEFAULT_PROPERTY_ID: &str = "home";

/// Maximum length of an item name.
pub const MAX_ITEM_NAME_LEN: usize = 200;
