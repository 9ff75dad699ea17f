//! Per-slot candidate computation for kit editing
//!
//! Given the pools the store handed us and the kit's current assignments,
//! compute which components a slot may legally hold. Recomputed from
//! scratch on every keystroke in the consuming UI, so everything here is
//! pure and allocation-light.

use crate::config::EngineConfig;
use crate::matcher::component_matches;
use crate::models::{ComponentRecord, ComponentStatus};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Insertion-ordered component set de-duplicated by `(id, type)`.
///
/// Component ids are not unique across type variants in source data, so a
/// plain id-keyed map would silently drop legitimate variants.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<(String, String)>,
    items: Vec<ComponentRecord>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record unless an identical `(id, type)` is already present.
    /// Returns whether the record was inserted.
    pub fn insert(&mut self, record: &ComponentRecord) -> bool {
        let key = (record.component_id.clone(), record.component_type.clone());
        if self.seen.insert(key) {
            self.items.push(record.clone());
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<ComponentRecord> {
        self.items
    }
}

/// Everything [`available_for_slot`] needs about one slot of one kit
#[derive(Debug, Clone)]
pub struct SlotContext<'a> {
    /// Canonical key of the slot being edited
    pub slot_key: &'a str,
    /// Required component type of the slot
    pub required_type: &'a str,
    /// Kit type name ("" when unknown)
    pub kit_type: &'a str,
    /// The kit's current canonical slot map
    pub components_map: &'a BTreeMap<String, Option<String>>,
    /// Full component pool, whatever its assignment state
    pub all_components: &'a [ComponentRecord],
    /// Components not currently assigned to any kit
    pub free_components: &'a [ComponentRecord],
}

/// An occupant of some other slot in the same kit
struct Occupied<'a> {
    slot_key: &'a str,
    component_id: &'a str,
    component_type: &'a str,
}

/// Compute the eligible candidate components for one slot.
///
/// Candidates are drawn from the free pool, the full pool, and whatever
/// currently occupies any slot of this kit, de-duplicated by `(id, type)`.
/// A candidate is dropped when it is malformed (blank id or type), when the
/// same id already fills a *different* slot under the same component type
/// (one physical component cannot fill two same-typed slots, unless it is
/// this very slot's current value), or when it fails compatibility against
/// the slot's required type.
///
/// Guarantees: the output never contains duplicate component ids, and the
/// slot's current selection is always present, re-inserted at the front,
/// as a synthesized placeholder if the record cannot be found, so the UI
/// never silently drops it.
pub fn available_for_slot(ctx: &SlotContext<'_>, config: &EngineConfig) -> Vec<ComponentRecord> {
    // Every record sharing an id, across both pools.
    let mut by_id: HashMap<&str, Vec<&ComponentRecord>> = HashMap::new();
    for record in ctx.all_components.iter().chain(ctx.free_components.iter()) {
        by_id
            .entry(record.component_id.as_str())
            .or_default()
            .push(record);
    }

    // What the kit's other slots currently hold.
    let mut occupied: Vec<Occupied<'_>> = Vec::new();
    for (slot, value) in ctx.components_map {
        let Some(id) = value.as_deref() else { continue };
        if slot == ctx.slot_key {
            continue;
        }
        if let Some(records) = by_id.get(id) {
            for r in records {
                occupied.push(Occupied {
                    slot_key: slot,
                    component_id: id,
                    component_type: &r.component_type,
                });
            }
        }
    }

    let current_id = ctx
        .components_map
        .get(ctx.slot_key)
        .and_then(|v| v.as_deref());

    // Candidate pool: free ∪ full ∪ current occupants of any slot of this
    // kit (including this one), built once per computation.
    let mut pool = CandidateSet::new();
    for record in ctx.free_components.iter().chain(ctx.all_components.iter()) {
        pool.insert(record);
    }
    for value in ctx.components_map.values() {
        let Some(id) = value.as_deref() else { continue };
        if let Some(records) = by_id.get(id) {
            for r in records {
                pool.insert(r);
            }
        }
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut result: Vec<ComponentRecord> = Vec::new();
    let candidates = pool.into_vec();
    for candidate in &candidates {
        if candidate.component_id.trim().is_empty() || candidate.component_type.trim().is_empty() {
            debug!(id = %candidate.component_id, "skipping malformed component candidate");
            continue;
        }
        let conflicts = occupied.iter().any(|o| {
            o.component_id == candidate.component_id
                && o.component_type == candidate.component_type
                && o.slot_key != ctx.slot_key
        }) && current_id != Some(candidate.component_id.as_str());
        if conflicts {
            continue;
        }
        if !component_matches(
            &candidate.component_type,
            ctx.required_type,
            ctx.kit_type,
            &config.families,
        ) {
            continue;
        }
        // Final de-dup is by id alone; first occurrence wins.
        if seen_ids.insert(candidate.component_id.as_str()) {
            result.push(candidate.clone());
        }
    }

    // The current selection must survive filtering even when it is a stale
    // reference belonging to neither pool.
    if let Some(id) = current_id {
        if !result.iter().any(|r| r.component_id == id) {
            let record = by_id
                .get(id)
                .and_then(|records| records.first())
                .map(|r| (*r).clone())
                .unwrap_or_else(|| ComponentRecord {
                    component_id: id.to_string(),
                    component_type: ctx.required_type.to_string(),
                    status: ComponentStatus::Missing,
                });
            result.insert(0, record);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    fn component(id: &str, kind: &str) -> ComponentRecord {
        ComponentRecord {
            component_id: id.into(),
            component_type: kind.into(),
            status: ComponentStatus::Operational,
        }
    }

    fn map(entries: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(String::from)))
            .collect()
    }

    #[test]
    fn candidate_set_dedups_by_id_and_type() {
        let mut set = CandidateSet::new();
        assert!(set.insert(&component("D-1", "Avetta Drone")));
        assert!(!set.insert(&component("D-1", "Avetta Drone")));
        // Same id, different type variant: kept
        assert!(set.insert(&component("D-1", "Evo Drone")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn filters_by_required_type() {
        let all = vec![
            component("D-1", "Avetta Drone"),
            component("G-1", "Avetta Goggles"),
        ];
        let free = all.clone();
        let components_map = map(&[("avetta_drone", None)]);
        let ctx = SlotContext {
            slot_key: "avetta_drone",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &free,
        };
        let out = available_for_slot(&ctx, default_config());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].component_id, "D-1");
    }

    #[test]
    fn cross_slot_conflict_excludes_same_typed_occupant() {
        // D-1 already fills the other drone slot; it must not be offered
        // for this one, while D-2 still is.
        let all = vec![
            component("D-1", "Avetta Drone"),
            component("D-2", "Avetta Drone"),
        ];
        let components_map = map(&[("avetta_drone", Some("D-1")), ("spare_drone_bay", None)]);
        let ctx = SlotContext {
            slot_key: "spare_drone_bay",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &[],
        };
        let out = available_for_slot(&ctx, default_config());
        let ids: Vec<&str> = out.iter().map(|r| r.component_id.as_str()).collect();
        assert_eq!(ids, vec!["D-2"]);
    }

    #[test]
    fn own_occupant_is_never_excluded_by_conflict_rule() {
        let all = vec![component("D-1", "Avetta Drone")];
        let components_map = map(&[("avetta_drone", Some("D-1"))]);
        let ctx = SlotContext {
            slot_key: "avetta_drone",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &[],
        };
        let out = available_for_slot(&ctx, default_config());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].component_id, "D-1");
    }

    #[test]
    fn stale_current_value_is_synthesized_at_front() {
        let all = vec![component("D-2", "Avetta Drone")];
        let components_map = map(&[("avetta_drone", Some("D-GONE"))]);
        let ctx = SlotContext {
            slot_key: "avetta_drone",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &[],
        };
        let out = available_for_slot(&ctx, default_config());
        assert_eq!(out[0].component_id, "D-GONE");
        assert_eq!(out[0].status, ComponentStatus::Missing);
        assert!(out.iter().any(|r| r.component_id == "D-2"));
    }

    #[test]
    fn output_never_contains_duplicate_ids() {
        // Same id under two type variants, present in both pools.
        let all = vec![
            component("D-1", "Avetta Drone"),
            component("D-1", "Avetta Drone Mk2"),
        ];
        let free = all.clone();
        let components_map = map(&[("avetta_drone", None)]);
        let ctx = SlotContext {
            slot_key: "avetta_drone",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &free,
        };
        let out = available_for_slot(&ctx, default_config());
        let mut ids: Vec<&str> = out.iter().map(|r| r.component_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), out.len());
    }

    #[test]
    fn malformed_candidates_are_silently_dropped() {
        let all = vec![component("", "Avetta Drone"), component("D-1", "")];
        let components_map = map(&[("avetta_drone", None)]);
        let ctx = SlotContext {
            slot_key: "avetta_drone",
            required_type: "Avetta Drone",
            kit_type: "Avetta",
            components_map: &components_map,
            all_components: &all,
            free_components: &[],
        };
        assert!(available_for_slot(&ctx, default_config()).is_empty());
    }
}
