//! Duplicate-type validation for assignment batches
//!
//! A soldier may be signed at most one item of each logical type per kind
//! in a single batch. A complete linked weapon pair counts as one logical
//! item, not two.

use crate::config::EngineConfig;
use crate::models::{ItemKind, SerializedItemRecord};
use crate::pairing::pair_base;
use std::collections::{BTreeMap, BTreeSet};

/// One offending type within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateType {
    pub kind: ItemKind,
    pub item_type: String,
    /// Logical occurrences after pair collapsing (always >= 2)
    pub count: usize,
}

/// Outcome of validating an assignment batch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchValidation {
    pub duplicates: Vec<DuplicateType>,
}

impl BatchValidation {
    /// Valid iff, after pair collapsing, every (kind, type) is a singleton
    pub fn is_valid(&self) -> bool {
        self.duplicates.is_empty()
    }

    /// Actionable per-duplicate messages naming the offending types
    pub fn messages(&self) -> Vec<String> {
        self.duplicates
            .iter()
            .map(|d| {
                format!(
                    "{} type '{}' selected {} times; only one per soldier is allowed",
                    d.kind.display_name(),
                    d.item_type,
                    d.count
                )
            })
            .collect()
    }
}

/// Validate a selection of serialized items for one signing operation.
///
/// Items are partitioned by kind. Within weapons, complete pairs (both
/// halves present, same type and base id) are collapsed to one logical
/// entry before counting; a lone half counts as itself. Any (kind, type)
/// occurring more than once is reported.
pub fn validate_batch(
    selected: &[SerializedItemRecord],
    config: &EngineConfig,
) -> BatchValidation {
    // Logical occurrence count per (kind, type). BTreeMap keeps the report
    // order deterministic.
    let mut counts: BTreeMap<(ItemKind, &str), usize> = BTreeMap::new();
    // Weapon pair groups keyed by (type, base id). Both halves of a valid
    // pair land in the same group, so each group is one logical item
    // whether it holds a complete pair or a lone half.
    let mut pair_groups: BTreeSet<(&str, String)> = BTreeSet::new();

    for item in selected {
        if item.kind == ItemKind::Weapon {
            if let Some((base, _half)) = pair_base(item, &config.pairing_marker) {
                pair_groups.insert((item.item_type.as_str(), base));
                continue;
            }
        }
        *counts.entry((item.kind, item.item_type.as_str())).or_insert(0) += 1;
    }

    for group in &pair_groups {
        *counts.entry((ItemKind::Weapon, group.0)).or_insert(0) += 1;
    }

    let duplicates = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((kind, item_type), count)| DuplicateType {
            kind,
            item_type: item_type.to_string(),
            count,
        })
        .collect();
    BatchValidation { duplicates }
}
