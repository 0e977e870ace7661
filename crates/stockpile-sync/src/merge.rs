//! # Pull Merge
//!
//! Pure functions combining what `pull` fetched with the current local
//! snapshot. No I/O here; the engine persists the result.
//!
//! ## Merge Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Collection (items, pins)                                               │
//! │  ─────────────────────────                                              │
//! │  remote empty          → local kept as-is (a fresh account never        │
//! │                          wipes a device)                                │
//! │  remote non-empty      → REPLACE: remote, in remote order               │
//! │                          UNION:   remote, then local records absent     │
//! │                                   remotely that were never pushed       │
//! │                                                                         │
//! │  Profile scalar (climate, people, propAddress, activePropertyId)        │
//! │  ───────────────────────────────────────────────────────────────        │
//! │  remote value → local value → configured default                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use stockpile_core::{Item, LocalSnapshot, MapPin, ProfileDefaults, ProfileRow};

use crate::config::MergePolicy;

/// Everything one pull fetched for the owner, already mapped to local types
/// and filtered to live rows.
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    pub items: Vec<Item>,
    pub profile: Option<ProfileRow>,
    pub pins: Vec<MapPin>,
}

/// Merges `remote` into `local` and stamps `saved_at`.
pub fn merge_snapshot(
    local: LocalSnapshot,
    remote: RemoteState,
    policy: MergePolicy,
    defaults: &ProfileDefaults,
    now: DateTime<Utc>,
) -> LocalSnapshot {
    let profile = remote.profile.as_ref();

    let climate = profile
        .and_then(|p| p.climate.clone())
        .or(local.climate)
        .unwrap_or_else(|| defaults.climate.clone());
    let people = profile
        .and_then(|p| p.people)
        .or(local.people)
        .unwrap_or(defaults.people);
    let prop_address = profile
        .and_then(|p| p.prop_address.clone())
        .or(local.prop_address)
        .unwrap_or_else(|| defaults.prop_address.clone());
    let active_property_id = profile
        .and_then(|p| p.active_property_id.clone())
        .or(local.active_property_id)
        .unwrap_or_else(|| defaults.active_property_id.clone());

    LocalSnapshot {
        items: merge_items(local.items, remote.items, policy),
        climate: Some(climate),
        people: Some(people),
        prop_address: Some(prop_address),
        active_property_id: Some(active_property_id),
        pins: merge_pins(local.pins, remote.pins, policy),
        saved_at: Some(now),
    }
}

/// Items: under UNION only never-pushed local items survive (`_version` 0).
/// A pushed item missing remotely was deleted elsewhere.
pub fn merge_items(local: Vec<Item>, remote: Vec<Item>, policy: MergePolicy) -> Vec<Item> {
    merge_collection(local, remote, policy, |i| i.id.as_str(), Item::is_unpushed)
}

/// Pins carry no version, so under UNION every local pin absent remotely
/// survives.
pub fn merge_pins(local: Vec<MapPin>, remote: Vec<MapPin>, policy: MergePolicy) -> Vec<MapPin> {
    merge_collection(local, remote, policy, |p| p.id.as_str(), |_| true)
}

fn merge_collection<T>(
    local: Vec<T>,
    remote: Vec<T>,
    policy: MergePolicy,
    id: fn(&T) -> &str,
    keep_local: fn(&T) -> bool,
) -> Vec<T> {
    if remote.is_empty() {
        return local;
    }

    match policy {
        MergePolicy::Replace => remote,
        MergePolicy::Union => {
            let remote_ids: HashSet<String> = remote.iter().map(|r| id(r).to_string()).collect();
            let mut merged = remote;
            merged.extend(
                local
                    .into_iter()
                    .filter(|l| keep_local(l) && !remote_ids.contains(id(l))),
            );
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, version: u64) -> Item {
        let mut i = Item::new("food", name);
        i.version = version;
        i
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_remote_replaces_local() {
        let merged = merge_items(
            vec![item("A", 1)],
            vec![item("B", 3), item("C", 1)],
            MergePolicy::Replace,
        );
        assert_eq!(names(&merged), vec!["B", "C"]);
    }

    #[test]
    fn test_empty_remote_preserves_local() {
        for policy in [MergePolicy::Replace, MergePolicy::Union] {
            let merged = merge_items(vec![item("A", 0)], Vec::new(), policy);
            assert_eq!(names(&merged), vec!["A"]);
        }
    }

    #[test]
    fn test_union_keeps_unpushed_only() {
        let fresh = item("Fresh", 0);
        let stale = item("Stale", 2);
        let remote = vec![item("B", 1)];

        let merged = merge_items(vec![stale, fresh], remote, MergePolicy::Union);
        assert_eq!(names(&merged), vec!["B", "Fresh"]);
    }

    #[test]
    fn test_union_remote_wins_on_same_id() {
        let local = item("Old name", 0);
        let mut remote = local.clone();
        remote.name = "New name".into();
        remote.version = 1;

        let merged = merge_items(vec![local], vec![remote], MergePolicy::Union);
        assert_eq!(names(&merged), vec!["New name"]);
    }

    #[test]
    fn test_profile_precedence() {
        let local = LocalSnapshot {
            climate: Some("arid".into()),
            people: Some(6),
            ..Default::default()
        };
        let remote = RemoteState {
            profile: Some(ProfileRow {
                climate: Some("cold".into()),
                ..ProfileRow::empty("alice")
            }),
            ..Default::default()
        };
        let now = Utc::now();

        let merged = merge_snapshot(local, remote, MergePolicy::Replace, &ProfileDefaults::default(), now);

        assert_eq!(merged.climate.as_deref(), Some("cold"));
        assert_eq!(merged.people, Some(6));
        assert_eq!(merged.prop_address.as_deref(), Some(""));
        assert_eq!(merged.active_property_id.as_deref(), Some("home"));
        assert_eq!(merged.saved_at, Some(now));
    }

    #[test]
    fn test_pins_union_keeps_local_absent_remotely() {
        let local = MapPin::new("utilities", "valve", 1.0, 1.0);
        let remote = MapPin::new("hazards", "gas", 2.0, 2.0);

        let merged = merge_pins(vec![local.clone()], vec![remote.clone()], MergePolicy::Union);
        assert_eq!(merged, vec![remote.clone(), local]);

        let replaced = merge_pins(Vec::new(), vec![remote.clone()], MergePolicy::Replace);
        assert_eq!(replaced, vec![remote]);
    }
}
