//! # Remote Row Shapes
//!
//! The column-level shapes of the three remote tables and the mappings
//! between them and the local types.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Local  ⇄  Remote                                   │
//! │                                                                         │
//! │  Item ──── ItemRow::for_push(item, owner, now) ───► ItemRow             │
//! │            • owner_id stamped                                           │
//! │            • updated_at = now                                           │
//! │            • version = _version + 1                                     │
//! │                                                                         │
//! │  ItemRow ── into_item() ──────────────────────────► Item                │
//! │            • version carried back as _version                           │
//! │                                                                         │
//! │  MapPin ◄── PinRow (same pattern, no version)                           │
//! │                                                                         │
//! │  LocalSnapshot ── ProfilePatch::from_snapshot ───► profiles row update  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every row is scoped by `owner_id`; rows with `deleted_at` set are
//! soft-deleted and never surface as local data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Item, ItemFields, LocalSnapshot, MapPin, ProfileDefaults};

// =============================================================================
// Table
// =============================================================================

/// The logical remote tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Items,
    Profiles,
    MapPins,
}

impl Table {
    /// Table name in the remote store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Items => "items",
            Table::Profiles => "profiles",
            Table::MapPins => "map_pins",
        }
    }

    /// Columns an upsert into this table conflicts on.
    pub fn conflict_key(&self) -> &'static [&'static str] {
        match self {
            Table::Items | Table::MapPins => &["id", "owner_id"],
            Table::Profiles => &["id"],
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Item Row
// =============================================================================

/// A row of the `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub sub_type: String,
    pub name: String,
    pub quantity: u32,
    pub location: String,
    pub fields: ItemFields,
    pub added_date: Option<NaiveDate>,
    pub property_id: Option<String>,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ItemRow {
    /// Builds the row pushed for `item` on behalf of `owner_id`.
    pub fn for_push(item: &Item, owner_id: &str, now: DateTime<Utc>) -> Self {
        ItemRow {
            id: item.id.clone(),
            owner_id: owner_id.to_string(),
            category: item.category.clone(),
            sub_type: item.sub_type.clone(),
            name: item.name.clone(),
            quantity: item.quantity.max(1),
            location: item.location.clone(),
            fields: item.fields.clone(),
            added_date: item.added_date,
            property_id: item.property_id.clone(),
            version: item.version + 1,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the row belongs to `owner_id` and is not soft-deleted.
    pub fn is_live_for(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id && self.deleted_at.is_none()
    }

    /// Maps the row back to a local item.
    pub fn into_item(self) -> Item {
        Item {
            id: self.id,
            category: self.category,
            sub_type: self.sub_type,
            name: self.name,
            quantity: self.quantity.max(1),
            location: self.location,
            fields: self.fields,
            added_date: self.added_date,
            property_id: self.property_id,
            version: self.version,
        }
    }
}

// =============================================================================
// Pin Row
// =============================================================================

/// A row of the `map_pins` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinRow {
    pub id: String,
    pub owner_id: String,
    pub layer: String,
    pub pin_type: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub notes: String,
    pub assignee: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PinRow {
    /// Builds the row pushed for `pin` on behalf of `owner_id`.
    pub fn for_push(pin: &MapPin, owner_id: &str, now: DateTime<Utc>) -> Self {
        PinRow {
            id: pin.id.clone(),
            owner_id: owner_id.to_string(),
            layer: pin.layer.clone(),
            pin_type: pin.pin_type.clone(),
            x: pin.x,
            y: pin.y,
            label: pin.label.clone(),
            notes: pin.notes.clone(),
            assignee: pin.assignee.clone(),
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the row belongs to `owner_id` and is not soft-deleted.
    pub fn is_live_for(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id && self.deleted_at.is_none()
    }

    /// Maps the row back to a local pin.
    pub fn into_pin(self) -> MapPin {
        MapPin {
            id: self.id,
            layer: self.layer,
            pin_type: self.pin_type,
            x: self.x,
            y: self.y,
            label: self.label,
            notes: self.notes,
            assignee: self.assignee,
        }
    }
}

// =============================================================================
// Profile Row
// =============================================================================

/// The owner's row in the `profiles` table. `id` is the owner identity.
///
/// Columns are nullable: a profile created by sign-up has none of the
/// settings yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub climate: Option<String>,
    pub people: Option<u32>,
    pub prop_address: Option<String>,
    pub active_property_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// A profile row with no settings.
    pub fn empty(owner_id: impl Into<String>) -> Self {
        ProfileRow {
            id: owner_id.into(),
            climate: None,
            people: None,
            prop_address: None,
            active_property_id: None,
            updated_at: None,
        }
    }
}

/// Partial update applied to the owner's profile row on push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub climate: String,
    pub people: u32,
    pub prop_address: String,
    pub active_property_id: String,
    pub updated_at: DateTime<Utc>,
}

impl ProfilePatch {
    /// Takes the four profile scalars from the snapshot, filling unset
    /// ones from `defaults`.
    pub fn from_snapshot(
        snapshot: &LocalSnapshot,
        defaults: &ProfileDefaults,
        now: DateTime<Utc>,
    ) -> Self {
        ProfilePatch {
            climate: snapshot.climate_or(defaults).to_string(),
            people: snapshot.people_or(defaults),
            prop_address: snapshot.prop_address_or(defaults).to_string(),
            active_property_id: snapshot.active_property_id_or(defaults).to_string(),
            updated_at: now,
        }
    }

    /// Applies the patch to a row.
    pub fn apply_to(&self, row: &mut ProfileRow) {
        row.climate = Some(self.climate.clone());
        row.people = Some(self.people);
        row.prop_address = Some(self.prop_address.clone());
        row.active_property_id = Some(self.active_property_id.clone());
        row.updated_at = Some(self.updated_at);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
