//! Quantity-conserving stock allocation
//!
//! Non-serialized equipment moves between divisions, or from division
//! stock into a soldier's holding, as pure write-op plans: source records
//! are decremented or deleted, never persisted at zero, and the receiving
//! side is merged into a compatible record or created fresh. Total
//! quantity is conserved across every plan.

use crate::error::{Error, Result};
use crate::models::StockRecord;
use crate::store::{EntityKind, WriteOp};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Update op setting a stock record's quantity
fn quantity_update(record_id: &str, quantity: i64) -> WriteOp {
    let mut fields = Map::new();
    fields.insert("quantity".into(), Value::from(quantity));
    WriteOp::update(EntityKind::Stock, record_id, fields)
}

/// Creation fields for a new stock record; `serial_number` is deliberately
/// absent (it belongs to non-aggregated stock only)
fn creation_fields(
    equipment_type: &str,
    quantity: i64,
    division: Option<&str>,
    condition: &str,
    assigned_to: Option<&str>,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("equipment_type".into(), Value::from(equipment_type));
    fields.insert("quantity".into(), Value::from(quantity));
    fields.insert(
        "division_name".into(),
        division.map(Value::from).unwrap_or(Value::Null),
    );
    fields.insert("condition".into(), Value::from(condition));
    fields.insert(
        "assigned_to".into(),
        assigned_to.map(Value::from).unwrap_or(Value::Null),
    );
    fields
}

/// Greedily draw `quantity` units from `sources`, smallest records first.
///
/// Smallest-first keeps small draws from fragmenting large records.
/// Returns the source-side write ops plus the drawn quantity grouped by
/// record condition. Records with a non-positive quantity are skipped
/// (malformed data is excluded, not rejected). Callers have already
/// checked that the sources hold enough.
fn draw_from_sources(
    sources: &[&StockRecord],
    quantity: i64,
) -> (Vec<WriteOp>, BTreeMap<String, i64>) {
    let mut sorted: Vec<&StockRecord> = sources.to_vec();
    sorted.sort_by(|a, b| a.quantity.cmp(&b.quantity).then(a.record_id.cmp(&b.record_id)));

    let mut ops = Vec::new();
    let mut drawn: BTreeMap<String, i64> = BTreeMap::new();
    let mut remaining = quantity;
    for record in sorted {
        if remaining == 0 {
            break;
        }
        if record.quantity <= 0 {
            debug!(record_id = %record.record_id, "skipping stock record with non-positive quantity");
            continue;
        }
        let take = remaining.min(record.quantity);
        if take == record.quantity {
            // Consumed entirely: delete, never persist a zero quantity.
            ops.push(WriteOp::delete(EntityKind::Stock, &record.record_id));
        } else {
            ops.push(quantity_update(&record.record_id, record.quantity - take));
        }
        *drawn.entry(record.condition.clone()).or_insert(0) += take;
        remaining -= take;
    }
    (ops, drawn)
}

/// Plan a transfer of stock between two divisions.
///
/// Source records not matching `(equipment_type, source_division,
/// unassigned)` are ignored rather than rejected. The drawn quantity is
/// grouped by condition; per condition, an existing compatible destination
/// record (same type, division and condition, unassigned) is incremented,
/// otherwise one is created.
///
/// Invariant: summed unassigned quantity of `equipment_type` across both
/// divisions is identical before and after the plan is applied.
pub fn plan_transfer(
    source_division: &str,
    dest_division: &str,
    equipment_type: &str,
    quantity: i64,
    source_records: &[StockRecord],
    dest_records: &[StockRecord],
) -> Result<Vec<WriteOp>> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity(quantity));
    }
    if source_division == dest_division {
        return Err(Error::SameDivision(source_division.to_string()));
    }

    let sources: Vec<&StockRecord> = source_records
        .iter()
        .filter(|r| {
            r.equipment_type == equipment_type
                && r.division_name.as_deref() == Some(source_division)
                && r.assigned_to.is_none()
        })
        .collect();
    let available: i64 = sources.iter().map(|r| r.quantity.max(0)).sum();
    if quantity > available {
        return Err(Error::InsufficientStock {
            requested: quantity,
            available,
        });
    }

    let (mut ops, drawn) = draw_from_sources(&sources, quantity);
    for (condition, moved) in drawn {
        let existing = dest_records.iter().find(|r| {
            r.equipment_type == equipment_type
                && r.division_name.as_deref() == Some(dest_division)
                && r.condition == condition
                && r.assigned_to.is_none()
        });
        match existing {
            Some(record) => ops.push(quantity_update(&record.record_id, record.quantity + moved)),
            None => ops.push(WriteOp::create(
                EntityKind::Stock,
                creation_fields(equipment_type, moved, Some(dest_division), &condition, None),
            )),
        }
    }
    Ok(ops)
}

/// Plan issuing stock to a soldier.
///
/// Same allocation shape as a division transfer: the chosen stock records
/// are decremented/deleted, then the soldier's existing holding of the
/// type (matching condition) is incremented or a new one created. The
/// created holding never copies a serial number; serial numbers belong to
/// non-aggregated stock, not to an aggregated per-soldier holding.
pub fn plan_soldier_issue(
    soldier_id: &str,
    equipment_type: &str,
    quantity: i64,
    source_records: &[StockRecord],
    soldier_records: &[StockRecord],
) -> Result<Vec<WriteOp>> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity(quantity));
    }

    let sources: Vec<&StockRecord> = source_records
        .iter()
        .filter(|r| r.equipment_type == equipment_type && r.assigned_to.is_none())
        .collect();
    let available: i64 = sources.iter().map(|r| r.quantity.max(0)).sum();
    if quantity > available {
        return Err(Error::InsufficientStock {
            requested: quantity,
            available,
        });
    }

    let (mut ops, drawn) = draw_from_sources(&sources, quantity);
    for (condition, moved) in drawn {
        let existing = soldier_records.iter().find(|r| {
            r.equipment_type == equipment_type
                && r.condition == condition
                && r.assigned_to.as_deref() == Some(soldier_id)
        });
        match existing {
            Some(record) => ops.push(quantity_update(&record.record_id, record.quantity + moved)),
            None => ops.push(WriteOp::create(
                EntityKind::Stock,
                creation_fields(equipment_type, moved, None, &condition, Some(soldier_id)),
            )),
        }
    }
    Ok(ops)
}
