//! Linked weapon pair discovery and selection
//!
//! Some weapon types are issued as two physically linked units sharing a
//! base identifier: `item_type` carries the pairing marker and `item_id`
//! ends in `-1`/`-2`. Selecting one half for a soldier must always pull in
//! the other half, and the duplicate validator counts a complete pair as a
//! single logical item.

use crate::config::EngineConfig;
use crate::models::SerializedItemRecord;
use std::collections::HashSet;

/// Which half of a linked pair an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairHalf {
    First,
    Second,
}

impl PairHalf {
    fn suffix(self) -> &'static str {
        match self {
            PairHalf::First => "-1",
            PairHalf::Second => "-2",
        }
    }

    fn sibling(self) -> PairHalf {
        match self {
            PairHalf::First => PairHalf::Second,
            PairHalf::Second => PairHalf::First,
        }
    }
}

/// Base identifier and half of a pairable item, or `None` when the item is
/// not pairable (type lacks the marker, or id lacks a `-1`/`-2` suffix).
pub fn pair_base(item: &SerializedItemRecord, marker: &str) -> Option<(String, PairHalf)> {
    if !item.item_type.contains(marker) {
        return None;
    }
    if let Some(base) = item.item_id.strip_suffix("-1") {
        Some((base.to_string(), PairHalf::First))
    } else if let Some(base) = item.item_id.strip_suffix("-2") {
        Some((base.to_string(), PairHalf::Second))
    } else {
        None
    }
}

/// Find the sibling of a pairable item in `pool`.
///
/// The sibling has the same `item_type` and the base id with the other
/// suffix. With `include_already_selected == false`, candidates whose id is
/// in `selected_ids` are skipped.
///
/// Symmetric: for a valid pair (A, B), `find_pair(A) == B` and
/// `find_pair(B) == A`.
pub fn find_pair<'a>(
    item: &SerializedItemRecord,
    pool: &'a [SerializedItemRecord],
    include_already_selected: bool,
    selected_ids: &HashSet<String>,
    config: &EngineConfig,
) -> Option<&'a SerializedItemRecord> {
    let (base, half) = pair_base(item, &config.pairing_marker)?;
    let wanted_id = format!("{}{}", base, half.sibling().suffix());
    pool.iter().find(|candidate| {
        candidate.item_type == item.item_type
            && candidate.item_id == wanted_id
            && (include_already_selected || !selected_ids.contains(&candidate.item_id))
    })
}

/// Select an item, auto-selecting its pair sibling when one exists.
pub fn select_with_pair(
    item: &SerializedItemRecord,
    pool: &[SerializedItemRecord],
    selected_ids: &mut HashSet<String>,
    config: &EngineConfig,
) {
    selected_ids.insert(item.item_id.clone());
    if let Some(sibling) = find_pair(item, pool, true, selected_ids, config) {
        selected_ids.insert(sibling.item_id.clone());
    }
}

/// Deselect an item. The sibling is deselected too when it was selected;
/// if it never was, only the item itself is removed.
pub fn deselect_with_pair(
    item: &SerializedItemRecord,
    pool: &[SerializedItemRecord],
    selected_ids: &mut HashSet<String>,
    config: &EngineConfig,
) {
    selected_ids.remove(&item.item_id);
    if let Some(sibling) = find_pair(item, pool, true, selected_ids, config) {
        selected_ids.remove(&sibling.item_id);
    }
}
