//! Assignment planning: one signing operation into one write batch
//!
//! Glue between the constraint layers and the write contract: validate the
//! selection, then emit the per-item `assigned_to`/`division_name` updates
//! and the stock-issue allocation as independent write ops for
//! [`crate::store::execute_batch`].

use crate::batch::validate_batch;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{AssignmentBatch, StockRecord};
use crate::stock::plan_soldier_issue;
use crate::store::{EntityKind, WriteOp};
use serde_json::{Map, Value};

/// Plan the writes for one assignment batch.
///
/// Fails with [`Error::InvalidInput`] naming every offending type when the
/// selection violates the duplicate-type rule, and with the stock errors of
/// [`plan_soldier_issue`] when a draw cannot be satisfied from the records
/// in `stock_records` it names. On success, every returned op is
/// independent: issuing them is the caller's job, and partial persistence
/// failure is handled there, not here.
pub fn plan_assignment(
    batch: &AssignmentBatch,
    stock_records: &[StockRecord],
    soldier_records: &[StockRecord],
    config: &EngineConfig,
) -> Result<Vec<WriteOp>> {
    let validation = validate_batch(&batch.items, config);
    if !validation.is_valid() {
        return Err(Error::InvalidInput(validation.messages().join("; ")));
    }

    let mut ops = Vec::new();
    for item in &batch.items {
        let mut fields = Map::new();
        fields.insert("assigned_to".into(), Value::from(batch.soldier_id.as_str()));
        if let Some(division) = &batch.soldier_division {
            fields.insert("division_name".into(), Value::from(division.as_str()));
        }
        ops.push(WriteOp::update(
            EntityKind::from(item.kind),
            &item.item_id,
            fields,
        ));
    }

    for draw in &batch.stock_draws {
        let chosen: Vec<StockRecord> = stock_records
            .iter()
            .filter(|r| draw.source_record_ids.contains(&r.record_id))
            .cloned()
            .collect();
        ops.extend(plan_soldier_issue(
            &batch.soldier_id,
            &draw.equipment_type,
            draw.quantity,
            &chosen,
            soldier_records,
        )?);
    }
    Ok(ops)
}
