//! Outbound write contract and batch execution
//!
//! The engine never talks to durable storage directly: it emits
//! [`WriteOp`]s and an external adapter implementing [`EquipmentStore`]
//! executes them. Batches are issued as independent operations and awaited
//! collectively; one failed write never prevents the others, and the
//! report distinguishes fully, partially and not-at-all succeeded batches.

use crate::models::KitInstance;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Kind of entity a write addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Weapon,
    Gear,
    Kit,
    Stock,
}

impl From<crate::models::ItemKind> for EntityKind {
    fn from(kind: crate::models::ItemKind) -> Self {
        match kind {
            crate::models::ItemKind::Weapon => EntityKind::Weapon,
            crate::models::ItemKind::Gear => EntityKind::Gear,
            crate::models::ItemKind::DroneKit => EntityKind::Kit,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Weapon => "weapon",
            EntityKind::Gear => "gear",
            EntityKind::Kit => "kit",
            EntityKind::Stock => "stock",
        };
        write!(f, "{name}")
    }
}

/// One independent persistence operation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    Create {
        entity: EntityKind,
        fields: Map<String, Value>,
    },
    Update {
        entity: EntityKind,
        id: String,
        fields: Map<String, Value>,
    },
    Delete {
        entity: EntityKind,
        id: String,
    },
}

impl WriteOp {
    pub fn create(entity: EntityKind, fields: Map<String, Value>) -> Self {
        WriteOp::Create { entity, fields }
    }

    pub fn update(entity: EntityKind, id: impl Into<String>, fields: Map<String, Value>) -> Self {
        WriteOp::Update {
            entity,
            id: id.into(),
            fields,
        }
    }

    pub fn delete(entity: EntityKind, id: impl Into<String>) -> Self {
        WriteOp::Delete {
            entity,
            id: id.into(),
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            WriteOp::Create { entity, .. }
            | WriteOp::Update { entity, .. }
            | WriteOp::Delete { entity, .. } => *entity,
        }
    }

    /// Id of the addressed record (`None` for creations)
    pub fn target_id(&self) -> Option<&str> {
        match self {
            WriteOp::Create { .. } => None,
            WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => Some(id),
        }
    }
}

/// Build the replacement slot-assignments update for a kit instance.
///
/// The stored mapping is replaced wholesale; unfilled slots are persisted
/// as nulls so a cleared slot does not resurrect an old value.
pub fn slot_assignments_update(
    serial_number: &str,
    map: &BTreeMap<String, Option<String>>,
) -> WriteOp {
    let assignments: Map<String, Value> = map
        .iter()
        .map(|(k, v)| {
            let value = v.as_ref().map(|id| Value::String(id.clone())).unwrap_or(Value::Null);
            (k.clone(), value)
        })
        .collect();
    let mut fields = Map::new();
    fields.insert("slot_assignments".into(), Value::Object(assignments));
    WriteOp::update(EntityKind::Kit, serial_number, fields)
}

/// Convenience: the same update derived from a [`KitInstance`] snapshot
pub fn kit_instance_update(kit: &KitInstance) -> WriteOp {
    slot_assignments_update(&kit.serial_number, &kit.slot_assignments)
}

/// Port to the external persistence collaborator
#[async_trait::async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Execute one write. Errors are opaque to the engine.
    async fn apply(&self, op: &WriteOp) -> anyhow::Result<()>;
}

/// Overall outcome of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Succeeded,
    PartiallySucceeded,
    Failed,
}

/// Per-operation result; the store's error is carried as text
#[derive(Debug)]
pub struct WriteOutcome {
    pub op: WriteOp,
    pub error: Option<String>,
}

impl WriteOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one batch execution
#[derive(Debug)]
pub struct BatchReport {
    /// Correlates the batch's log lines and side effects
    pub batch_id: Uuid,
    pub outcomes: Vec<WriteOutcome>,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// An empty batch counts as fully succeeded
    pub fn status(&self) -> BatchStatus {
        let failed = self.failed_count();
        if failed == 0 {
            BatchStatus::Succeeded
        } else if failed == self.outcomes.len() {
            BatchStatus::Failed
        } else {
            BatchStatus::PartiallySucceeded
        }
    }
}

/// Execute every operation of a batch, settling them all.
///
/// All writes are issued together and awaited collectively; a failure in
/// one never prevents the others from completing.
pub async fn execute_batch(store: &dyn EquipmentStore, ops: Vec<WriteOp>) -> BatchReport {
    let batch_id = Uuid::new_v4();
    let results = join_all(ops.iter().map(|op| store.apply(op))).await;
    let outcomes: Vec<WriteOutcome> = ops
        .into_iter()
        .zip(results)
        .map(|(op, result)| WriteOutcome {
            op,
            error: result.err().map(|e| e.to_string()),
        })
        .collect();

    let report = BatchReport { batch_id, outcomes };
    match report.status() {
        BatchStatus::Succeeded => {
            info!(%batch_id, ops = report.outcomes.len(), "batch write succeeded")
        }
        status => warn!(
            %batch_id,
            ?status,
            failed = report.failed_count(),
            total = report.outcomes.len(),
            "batch write did not fully succeed"
        ),
    }
    report
}

/// Best-effort follow-up to a batch (audit entry, notification, ...).
///
/// Failures are logged and recorded but never re-report the primary batch
/// as failed.
#[async_trait::async_trait]
pub trait SideEffect: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, report: &BatchReport) -> anyhow::Result<()>;
}

/// Recorded result of one side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectOutcome {
    pub name: String,
    pub error: Option<String>,
}

/// Primary batch report plus the best-effort side-effect results
#[derive(Debug)]
pub struct AssignmentOutcome {
    pub primary: BatchReport,
    pub side_effects: Vec<SideEffectOutcome>,
}

/// Run the primary batch, then every side effect.
///
/// Side effects see the finished report (so an audit entry can record the
/// partial outcome) and run even when the batch partially or fully failed;
/// their own failures only produce warnings.
pub async fn finalize_assignment(
    store: &dyn EquipmentStore,
    ops: Vec<WriteOp>,
    side_effects: &[&dyn SideEffect],
) -> AssignmentOutcome {
    let primary = execute_batch(store, ops).await;

    let results = join_all(side_effects.iter().map(|s| s.run(&primary))).await;
    let side_effects = side_effects
        .iter()
        .zip(results)
        .map(|(effect, result)| {
            let error = result.err().map(|e| e.to_string());
            if let Some(err) = &error {
                warn!(
                    batch_id = %primary.batch_id,
                    effect = effect.name(),
                    error = %err,
                    "best-effort side effect failed"
                );
            }
            SideEffectOutcome {
                name: effect.name().to_string(),
                error,
            }
        })
        .collect();

    AssignmentOutcome { primary, side_effects }
}
