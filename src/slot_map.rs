//! Kit slot-map normalization and migration
//!
//! A kit instance stores `slot key -> component id` as authored, and
//! historical instances carry stale or free-form keys. This module rewrites
//! such maps onto canonical keys ([`crate::slot_key::resolve_slot_key`]),
//! locates legacy keys without forcing a rewrite, and migrates maps to a
//! kit type's current slot definitions as an explicit operation (never as a
//! display-time side effect).

use crate::config::EngineConfig;
use crate::models::SlotDefinition;
use crate::slot_key::{canonicalize, resolve_slot_key};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Two differently-authored raw keys resolved to the same canonical key.
///
/// Last write wins in the normalized map, but the collision is surfaced
/// here instead of being silently resolved; callers decide whether to
/// error, merge, or ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKeyConflict {
    pub resolved_key: String,
    /// Raw key whose value was displaced
    pub displaced_key: String,
    /// Raw key whose value won
    pub winning_key: String,
}

/// Result of normalizing or migrating a slot map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedSlotMap {
    pub map: BTreeMap<String, Option<String>>,
    pub conflicts: Vec<SlotKeyConflict>,
}

/// Extract a plain component id from a raw slot-map value.
///
/// Accepts a bare string id or an object carrying one under the first
/// non-empty of `component_id`, `componentId`, `id`. Anything else (null,
/// numbers, empty strings) yields `None`; malformed values are tolerated,
/// not rejected.
pub fn extract_component_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Object(obj) => ["component_id", "componentId", "id"].iter().find_map(|key| {
            obj.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        }),
        _ => None,
    }
}

/// Display label for a raw key, taken from the slot definition whose
/// authored key canonicalizes the same way (if any).
fn label_for<'a>(raw_key: &str, slot_defs: &'a [SlotDefinition]) -> &'a str {
    let wanted = canonicalize(raw_key);
    slot_defs
        .iter()
        .find(|d| canonicalize(&d.slot_key) == wanted)
        .map(|d| d.required_component_type.as_str())
        .unwrap_or("")
}

/// Rewrite a raw slot map onto canonical keys.
///
/// Every entry's id is extracted via [`extract_component_id`] and written
/// under the key resolved from the raw key (using the matching slot
/// definition's label when available). Collisions are recorded and logged;
/// the later entry wins.
pub fn normalize_components_map(
    raw: &serde_json::Map<String, Value>,
    kit_type: &str,
    slot_defs: &[SlotDefinition],
    config: &EngineConfig,
) -> NormalizedSlotMap {
    let mut out = NormalizedSlotMap::default();
    let mut raw_key_for: BTreeMap<String, String> = BTreeMap::new();

    for (raw_key, value) in raw {
        let label = label_for(raw_key, slot_defs);
        let resolved = resolve_slot_key(raw_key, kit_type, label, &config.roles);
        let id = extract_component_id(value);

        if let Some(previous_raw) = raw_key_for.get(&resolved) {
            warn!(
                resolved_key = %resolved,
                displaced = %previous_raw,
                winner = %raw_key,
                "slot key collision while normalizing components map"
            );
            out.conflicts.push(SlotKeyConflict {
                resolved_key: resolved.clone(),
                displaced_key: previous_raw.clone(),
                winning_key: raw_key.clone(),
            });
        }
        raw_key_for.insert(resolved.clone(), raw_key.clone());
        out.map.insert(resolved, id);
    }
    out
}

/// Find the existing raw key in `map` holding the given slot's value.
///
/// A raw key matches when its canonical form equals either the canonical
/// input key or the canonical resolved key; this locates a slot's current
/// value without forcing a map rewrite.
pub fn find_component_key_for_slot<'a>(
    map: &'a serde_json::Map<String, Value>,
    slot_key: &str,
    kit_type: &str,
    slot_label: &str,
    config: &EngineConfig,
) -> Option<&'a str> {
    let wanted_raw = canonicalize(slot_key);
    let wanted_resolved =
        canonicalize(&resolve_slot_key(slot_key, kit_type, slot_label, &config.roles));

    // Prefer the key matching the input's own canonical form; a stale alias
    // that only matches the resolved form must not shadow it.
    map.keys()
        .find(|k| canonicalize(k) == wanted_raw)
        .or_else(|| map.keys().find(|k| canonicalize(k) == wanted_resolved))
        .map(String::as_str)
}

/// Migrate a slot map to the kit type's current slot definitions.
///
/// Pure: returns the replacement map, caller persists it. For each defined
/// slot, the legacy entry (located via [`find_component_key_for_slot`]) is
/// carried under the resolved key and the legacy key dropped. Raw entries
/// matching no definition are stale-but-tolerated: they are preserved under
/// their own resolved key. A stale entry resolving onto a defined slot may
/// fill that slot when it is unfilled; a value disagreement is recorded as
/// a conflict, never silently overwritten.
pub fn migrate_slot_map(
    raw: &serde_json::Map<String, Value>,
    kit_type: &str,
    slot_defs: &[SlotDefinition],
    config: &EngineConfig,
) -> NormalizedSlotMap {
    let mut out = NormalizedSlotMap::default();
    let mut consumed: Vec<&str> = Vec::new();
    let mut raw_key_for: BTreeMap<String, String> = BTreeMap::new();

    for def in slot_defs {
        let resolved = resolve_slot_key(
            &def.slot_key,
            kit_type,
            &def.required_component_type,
            &config.roles,
        );
        let legacy = find_component_key_for_slot(
            raw,
            &def.slot_key,
            kit_type,
            &def.required_component_type,
            config,
        );
        let id = legacy.and_then(|k| raw.get(k).and_then(extract_component_id));
        if let Some(k) = legacy {
            consumed.push(k);
        }

        if let Some(previous) = raw_key_for.get(&resolved) {
            // Two definitions collapsing onto one canonical key; keep the
            // earlier slot's value so the collision stays visible.
            warn!(resolved_key = %resolved, "slot definitions collide after resolution");
            out.conflicts.push(SlotKeyConflict {
                resolved_key: resolved.clone(),
                displaced_key: def.slot_key.clone(),
                winning_key: previous.clone(),
            });
            continue;
        }
        raw_key_for.insert(resolved.clone(), def.slot_key.clone());
        out.map.insert(resolved, id);
    }

    for (raw_key, value) in raw {
        if consumed.iter().any(|k| *k == raw_key.as_str()) {
            continue;
        }
        let resolved = resolve_slot_key(raw_key, kit_type, "", &config.roles);
        let orphan_id = extract_component_id(value);
        if let Some(previous) = raw_key_for.get(&resolved) {
            // A stale key landing on a defined slot: it may fill the slot
            // if that slot is unfilled (or agrees with it); an actual value
            // disagreement is a conflict, never a silent overwrite.
            let existing = out.map.get(&resolved);
            let agrees = existing.map(|v| v == &orphan_id).unwrap_or(false);
            let unfilled = matches!(existing, Some(None));
            if orphan_id.is_none() || agrees {
                continue;
            }
            if unfilled {
                out.map.insert(resolved, orphan_id);
            } else {
                out.conflicts.push(SlotKeyConflict {
                    resolved_key: resolved.clone(),
                    displaced_key: raw_key.clone(),
                    winning_key: previous.clone(),
                });
            }
            continue;
        }
        raw_key_for.insert(resolved.clone(), raw_key.clone());
        out.map.insert(resolved, orphan_id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use serde_json::json;

    fn defs() -> Vec<SlotDefinition> {
        vec![
            SlotDefinition {
                slot_key: "Drone 1".into(),
                required_component_type: "Avetta Drone".into(),
            },
            SlotDefinition {
                slot_key: "Goggles".into(),
                required_component_type: "Avetta Goggles".into(),
            },
        ]
    }

    fn raw(entries: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn extract_accepts_bare_ids_and_objects() {
        assert_eq!(extract_component_id(&json!("D-100")), Some("D-100".into()));
        assert_eq!(
            extract_component_id(&json!({"component_id": "D-1"})),
            Some("D-1".into())
        );
        assert_eq!(
            extract_component_id(&json!({"componentId": "D-2"})),
            Some("D-2".into())
        );
        assert_eq!(extract_component_id(&json!({"id": "D-3"})), Some("D-3".into()));
        // component_id wins over id
        assert_eq!(
            extract_component_id(&json!({"id": "B", "component_id": "A"})),
            Some("A".into())
        );
    }

    #[test]
    fn extract_tolerates_malformed_values() {
        assert_eq!(extract_component_id(&json!(null)), None);
        assert_eq!(extract_component_id(&json!("")), None);
        assert_eq!(extract_component_id(&json!("   ")), None);
        assert_eq!(extract_component_id(&json!(7)), None);
        assert_eq!(extract_component_id(&json!({"component_id": ""})), None);
    }

    #[test]
    fn normalize_rewrites_to_canonical_keys() {
        let raw = raw(&[("Drone 1", json!("D-100")), ("Goggles", json!(null))]);
        let result = normalize_components_map(&raw, "Avetta", &defs(), default_config());
        assert!(result.conflicts.is_empty());
        assert_eq!(result.map.get("avetta_drone"), Some(&Some("D-100".into())));
        assert_eq!(result.map.get("avetta_goggles"), Some(&None));
        assert_eq!(result.map.len(), 2);
    }

    #[test]
    fn normalize_surfaces_collisions_last_write_wins() {
        let raw = raw(&[("Drone 1", json!("D-1")), ("avetta drone", json!("D-2"))]);
        let result = normalize_components_map(&raw, "Avetta", &defs(), default_config());
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].resolved_key, "avetta_drone");
        // serde_json::Map iterates in key order: "Drone 1" then "avetta drone"
        assert_eq!(result.map.get("avetta_drone"), Some(&Some("D-2".into())));
    }

    #[test]
    fn find_key_matches_raw_or_resolved_form() {
        let raw = raw(&[("Drone 1", json!("D-100"))]);
        let cfg = default_config();
        // Matches via its own canonical form
        assert_eq!(
            find_component_key_for_slot(&raw, "drone-1", "Avetta", "", cfg),
            Some("Drone 1")
        );
        // Matches via the resolved canonical form
        assert_eq!(
            find_component_key_for_slot(&raw, "avetta_drone", "Avetta", "", cfg),
            Some("Drone 1")
        );
        assert_eq!(
            find_component_key_for_slot(&raw, "goggles", "Avetta", "", cfg),
            None
        );
    }

    #[test]
    fn migrate_carries_legacy_values_and_preserves_orphans() {
        let raw = raw(&[
            ("Drone 1", json!("D-100")),
            ("old_battery_slot", json!("B-7")),
        ]);
        let result = migrate_slot_map(&raw, "Avetta", &defs(), default_config());
        assert!(result.conflicts.is_empty());
        assert_eq!(result.map.get("avetta_drone"), Some(&Some("D-100".into())));
        // Defined but unfilled slot appears with no value
        assert_eq!(result.map.get("avetta_goggles"), Some(&None));
        // Orphaned entry survives under its own resolved key
        assert_eq!(result.map.get("old_battery_slot"), Some(&Some("B-7".into())));
        assert!(!result.map.contains_key("Drone 1"));
    }

    #[test]
    fn migrate_never_lets_an_orphan_displace_a_defined_slot() {
        let raw = raw(&[
            ("Drone 1", json!("D-100")),
            ("Avetta Drone ", json!("D-999")),
        ]);
        let result = migrate_slot_map(&raw, "Avetta", &defs(), default_config());
        assert_eq!(result.map.get("avetta_drone"), Some(&Some("D-100".into())));
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].resolved_key, "avetta_drone");
    }
}
