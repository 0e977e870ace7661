//! # Local Types
//!
//! The shapes the UI reads and writes, persisted as ONE serialized blob.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         LocalSnapshot (one blob)                        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │     MapPin      │   │ profile scalars │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  climate        │       │
//! │  │  category       │   │  layer / type   │   │  people         │       │
//! │  │  name, quantity │   │  x, y           │   │  propAddress    │       │
//! │  │  fields         │   │  label, notes   │   │  activeProperty │       │
//! │  │  _version       │   │  assignee       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  savedAt ─ stamped on every persist                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//!   SyncMetadata (separate blob) ─ userId, lastPush, lastPull
//! ```
//!
//! JSON keys are camelCase because the blob is shared with the UI layer.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::{DEFAULT_CLIMATE, DEFAULT_PEOPLE, DEFAULT_PROPERTY_ID};

// =============================================================================
// Item Fields
// =============================================================================

/// Category-specific attributes of an item.
///
/// The known keys are typed; anything else the UI stores lands in `extra`
/// and is written back in the same flat JSON object. A known key whose
/// value does not fit its type (`"expires": ""`, `"capacity": "5"`) is kept
/// verbatim in `extra` instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BTreeMap<String, Value>")]
pub struct ItemFields {
    /// Expiration / best-before date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Unit of measure ("gal", "lb", "cans").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Capacity in `unit`s (e.g. water container volume).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    /// Attributes without a declared key, or whose value does not fit it.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<BTreeMap<String, Value>> for ItemFields {
    fn from(mut raw: BTreeMap<String, Value>) -> Self {
        let expires = take_typed(&mut raw, "expires");
        let notes = take_typed(&mut raw, "notes");
        let unit = take_typed(&mut raw, "unit");
        let capacity = take_typed(&mut raw, "capacity");
        let serial = take_typed(&mut raw, "serial");

        ItemFields {
            expires,
            notes,
            unit,
            capacity,
            serial,
            extra: raw,
        }
    }
}

/// Removes `key` from `raw` if its value decodes as `T`; otherwise leaves
/// it in place.
fn take_typed<T: DeserializeOwned>(raw: &mut BTreeMap<String, Value>, key: &str) -> Option<T> {
    let parsed = T::deserialize(raw.get(key)?).ok()?;
    raw.remove(key);
    Some(parsed)
}

impl ItemFields {
    /// Returns true if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.expires.is_none()
            && self.notes.is_none()
            && self.unit.is_none()
            && self.capacity.is_none()
            && self.serial.is_none()
            && self.extra.is_empty()
    }
}

// =============================================================================
// Item
// =============================================================================

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable, globally unique identifier (client- or server-assigned).
    pub id: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub sub_type: String,

    #[serde(default)]
    pub name: String,

    /// Count on hand, at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Free-text storage location ("garage shelf 2").
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub fields: ItemFields,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub added_date: Option<NaiveDate>,

    /// Property grouping this item belongs to.
    #[serde(default)]
    pub property_id: Option<String>,

    /// Client-local optimistic counter, bumped on every push.
    /// Kept for auditing; never consulted for conflict resolution.
    #[serde(rename = "_version", default)]
    pub version: u64,
}

fn default_quantity() -> u32 {
    1
}

impl Item {
    /// Creates a new item with a fresh UUID and quantity 1.
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Item {
            id: Uuid::new_v4().to_string(),
            category: category.into(),
            sub_type: String::new(),
            name: name.into(),
            quantity: default_quantity(),
            location: String::new(),
            fields: ItemFields::default(),
            added_date: None,
            property_id: None,
            version: 0,
        }
    }

    /// Returns true if this item has never been pushed.
    #[inline]
    pub fn is_unpushed(&self) -> bool {
        self.version == 0
    }
}

// =============================================================================
// Map Pin
// =============================================================================

/// A marker on the property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MapPin {
    pub id: String,

    /// Named overlay group ("utilities", "evacuation").
    #[serde(default)]
    pub layer: String,

    /// Marker kind ("shutoff", "rally-point").
    #[serde(rename = "type", default)]
    pub pin_type: String,

    pub x: f64,
    pub y: f64,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub assignee: Option<String>,
}

impl MapPin {
    /// Creates a pin with a fresh UUID at the given position.
    pub fn new(layer: impl Into<String>, pin_type: impl Into<String>, x: f64, y: f64) -> Self {
        MapPin {
            id: Uuid::new_v4().to_string(),
            layer: layer.into(),
            pin_type: pin_type.into(),
            x,
            y,
            label: String::new(),
            notes: String::new(),
            assignee: None,
        }
    }
}

// =============================================================================
// Profile Defaults
// =============================================================================

/// Values a profile field takes when neither remote nor local has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    #[serde(default = "default_climate")]
    pub climate: String,

    #[serde(default = "default_people")]
    pub people: u32,

    #[serde(default)]
    pub prop_address: String,

    #[serde(default = "default_property_id")]
    pub active_property_id: String,
}

fn default_climate() -> String {
    DEFAULT_CLIMATE.to_string()
}

fn default_people() -> u32 {
    DEFAULT_PEOPLE
}

fn default_property_id() -> String {
    DEFAULT_PROPERTY_ID.to_string()
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        ProfileDefaults {
            climate: default_climate(),
            people: default_people(),
            prop_address: String::new(),
            active_property_id: default_property_id(),
        }
    }
}

// =============================================================================
// Local Snapshot
// =============================================================================

/// The entire application state, persisted as one blob.
///
/// Profile scalars are optional so that "never set locally" stays
/// distinguishable from a real value during the pull merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LocalSnapshot {
    /// Order is preserved for UI stability; it carries no meaning.
    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_property_id: Option<String>,

    #[serde(default)]
    pub pins: Vec<MapPin>,

    /// Timestamp of the last local persist.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl LocalSnapshot {
    /// Decodes a snapshot blob.
    pub fn from_json(blob: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Encodes the snapshot blob.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Finds an item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Climate, falling back to `defaults`.
    pub fn climate_or<'a>(&'a self, defaults: &'a ProfileDefaults) -> &'a str {
        self.climate.as_deref().unwrap_or(&defaults.climate)
    }

    /// Household size, falling back to `defaults`.
    pub fn people_or(&self, defaults: &ProfileDefaults) -> u32 {
        self.people.unwrap_or(defaults.people)
    }

    /// Property address, falling back to `defaults`.
    pub fn prop_address_or<'a>(&'a self, defaults: &'a ProfileDefaults) -> &'a str {
        self.prop_address.as_deref().unwrap_or(&defaults.prop_address)
    }

    /// Active property, falling back to `defaults`.
    pub fn active_property_id_or<'a>(&'a self, defaults: &'a ProfileDefaults) -> &'a str {
        self.active_property_id
            .as_deref()
            .unwrap_or(&defaults.active_property_id)
    }
}

// =============================================================================
// Sync Metadata
// =============================================================================

/// Per-owner sync recency record.
///
/// Only answers "have I ever synced for this owner?" (the migration guard)
/// and when. Never used for conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub user_id: String,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub last_push: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub last_pull: Option<DateTime<Utc>>,
}

impl SyncMetadata {
    /// Returns true if this record belongs to `owner_id`.
    pub fn belongs_to(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }

    /// Records a successful push, carrying over `last_pull` only when the
    /// previous record belongs to the same owner.
    pub fn record_push(previous: Option<SyncMetadata>, owner_id: &str, at: DateTime<Utc>) -> Self {
        let last_pull = previous
            .filter(|m| m.belongs_to(owner_id))
            .and_then(|m| m.last_pull);

        SyncMetadata {
            user_id: owner_id.to_string(),
            last_push: Some(at),
            last_pull,
        }
    }

    /// Records a successful pull; mirror of [`SyncMetadata::record_push`].
    pub fn record_pull(previous: Option<SyncMetadata>, owner_id: &str, at: DateTime<Utc>) -> Self {
        let last_push = previous
            .filter(|m| m.belongs_to(owner_id))
            .and_then(|m| m.last_push);

        SyncMetadata {
            user_id: owner_id.to_string(),
            last_push,
            last_pull: Some(at),
        }
    }

    /// Decodes a metadata blob.
    pub fn from_json(blob: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Encodes the metadata blob.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
