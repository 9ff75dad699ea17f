//! Inventory data model
//!
//! In-memory snapshots of the records the persistence layer hands the
//! engine. The engine only reads these; every mutation it decides on is
//! expressed as a [`WriteOp`](crate::store::WriteOp) for the store to
//! execute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operational status of a serialized kit component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Operational,
    Maintenance,
    Damaged,
    Missing,
}

/// A serialized component that can fill a kit slot (drone body, goggles,
/// remote control, bomb dropper).
///
/// `component_id` is stable but **not** guaranteed unique across type
/// variants in source data; consumers must key on `(id, type)` when
/// de-duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub component_id: String,
    pub component_type: String,
    pub status: ComponentStatus,
}

/// One named position within a kit type.
///
/// `slot_key` is free-form as authored by the administrator.
/// `required_component_type` names the component type the slot accepts and
/// doubles as the slot's display label for role inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub slot_key: String,
    pub required_component_type: String,
}

/// Administrator-authored definition of a composite kit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitTypeDefinition {
    /// Unique type name, e.g. "Avetta"
    pub type_name: String,
    /// Ordered slot set; keys unique as authored but may collide after
    /// normalization
    pub slots: Vec<SlotDefinition>,
}

/// A physical kit instance.
///
/// `kit_type` references [`KitTypeDefinition::type_name`] by value (string
/// match, not id). Keys in `slot_assignments` should canonicalize to keys
/// derivable from the current definition, but historical data may carry
/// stale/raw keys; the engine reconciles those at read time instead of
/// rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitInstance {
    pub serial_number: String,
    pub kit_type: String,
    pub slot_assignments: BTreeMap<String, Option<String>>,
}

/// Category of a serialized inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Gear,
    DroneKit,
}

impl ItemKind {
    /// Human-readable kind name for validation messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Gear => "gear",
            ItemKind::DroneKit => "drone kit",
        }
    }
}

/// A serialized (individually tracked) inventory item.
///
/// Weapon records whose `item_type` contains the pairing marker and whose
/// `item_id` ends in `-1`/`-2` denote two physically linked units sharing a
/// base identifier; see [`crate::pairing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedItemRecord {
    pub item_id: String,
    pub item_type: String,
    pub kind: ItemKind,
    pub assigned_to: Option<String>,
    pub division_name: String,
}

/// Non-serialized equipment tracked by quantity.
///
/// Multiple records may exist for the same `(equipment_type, division)`
/// pair. A record whose quantity reaches zero is deleted, never persisted
/// at zero. `serial_number` is a property of non-aggregated stock only and
/// is never copied onto an aggregated per-soldier holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Store document id, used to address update/delete writes
    pub record_id: String,
    pub equipment_type: String,
    pub quantity: i64,
    pub division_name: Option<String>,
    pub condition: String,
    pub assigned_to: Option<String>,
    pub serial_number: Option<String>,
}

/// One stock draw within an assignment batch: how many units of a type to
/// issue, taken from which records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDraw {
    pub equipment_type: String,
    pub quantity: i64,
    pub source_record_ids: Vec<String>,
}

/// Everything selected for one signing operation to one soldier.
///
/// Ephemeral: lives only for the duration of one assignment transaction
/// and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentBatch {
    pub soldier_id: String,
    /// Division the signed items move to, when the signing changes it
    pub soldier_division: Option<String>,
    pub items: Vec<SerializedItemRecord>,
    pub stock_draws: Vec<StockDraw>,
}
