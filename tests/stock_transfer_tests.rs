//! Division-to-division stock transfer and soldier issue, checked for
//! quantity conservation by applying the planned writes to an in-memory
//! copy of the records.

use armory_core::error::Error;
use armory_core::models::StockRecord;
use armory_core::stock::{plan_soldier_issue, plan_transfer};
use armory_core::store::WriteOp;

fn helmet(id: &str, qty: i64, division: &str) -> StockRecord {
    StockRecord {
        record_id: id.into(),
        equipment_type: "Helmet".into(),
        quantity: qty,
        division_name: Some(division.into()),
        condition: "good".into(),
        assigned_to: None,
        serial_number: None,
    }
}

/// Apply a write plan to an in-memory record set
fn apply(records: &mut Vec<StockRecord>, ops: &[WriteOp]) {
    let mut next_id = 0;
    for op in ops {
        match op {
            WriteOp::Delete { id, .. } => records.retain(|r| r.record_id != *id),
            WriteOp::Update { id, fields, .. } => {
                let record = records
                    .iter_mut()
                    .find(|r| r.record_id == *id)
                    .expect("update addresses a known record");
                record.quantity = fields["quantity"].as_i64().expect("quantity field");
            }
            WriteOp::Create { fields, .. } => {
                next_id += 1;
                records.push(StockRecord {
                    record_id: format!("created-{next_id}"),
                    equipment_type: fields["equipment_type"].as_str().unwrap().into(),
                    quantity: fields["quantity"].as_i64().unwrap(),
                    division_name: fields["division_name"].as_str().map(String::from),
                    condition: fields["condition"].as_str().unwrap().into(),
                    assigned_to: fields["assigned_to"].as_str().map(String::from),
                    serial_number: None,
                });
            }
        }
    }
}

fn division_total(records: &[StockRecord], division: &str) -> i64 {
    records
        .iter()
        .filter(|r| r.division_name.as_deref() == Some(division) && r.assigned_to.is_none())
        .map(|r| r.quantity)
        .sum()
}

#[test]
fn five_helmets_from_a_split_source_to_an_empty_division() {
    // Division A: records of 2 and 4. Transfer 5 to B: the 2-record is
    // consumed (deleted), the 4-record drops to 1, B gains a 5-record.
    let mut records = vec![helmet("S-two", 2, "A"), helmet("S-four", 4, "A")];
    let ops = plan_transfer("A", "B", "Helmet", 5, &records, &[]).unwrap();
    apply(&mut records, &ops);

    assert_eq!(division_total(&records, "A"), 1);
    assert_eq!(division_total(&records, "B"), 5);
    assert!(records.iter().all(|r| r.record_id != "S-two"));
    let remaining = records.iter().find(|r| r.record_id == "S-four").unwrap();
    assert_eq!(remaining.quantity, 1);
}

#[test]
fn transfers_conserve_quantity_and_never_persist_zero() {
    for requested in 1..=9 {
        let mut records = vec![
            helmet("S-1", 2, "A"),
            helmet("S-2", 4, "A"),
            helmet("S-3", 3, "A"),
            helmet("D-1", 6, "B"),
        ];
        let before = division_total(&records, "A") + division_total(&records, "B");
        let dest: Vec<StockRecord> = records
            .iter()
            .filter(|r| r.division_name.as_deref() == Some("B"))
            .cloned()
            .collect();
        let ops = plan_transfer("A", "B", "Helmet", requested, &records, &dest).unwrap();
        apply(&mut records, &ops);

        let after = division_total(&records, "A") + division_total(&records, "B");
        assert_eq!(before, after, "requested {requested}");
        assert!(records.iter().all(|r| r.quantity > 0), "requested {requested}");
        assert_eq!(division_total(&records, "B"), 6 + requested);
    }
}

#[test]
fn over_requesting_fails_with_the_available_amount() {
    let records = vec![helmet("S-1", 2, "A")];
    match plan_transfer("A", "B", "Helmet", 3, &records, &[]) {
        Err(Error::InsufficientStock { requested, available }) => {
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

#[test]
fn soldier_issue_moves_quantity_into_a_holding() {
    let mut records = vec![helmet("S-1", 4, "A")];
    let ops = plan_soldier_issue("soldier-9", "Helmet", 3, &records, &[]).unwrap();
    apply(&mut records, &ops);

    assert_eq!(division_total(&records, "A"), 1);
    let holding = records
        .iter()
        .find(|r| r.assigned_to.as_deref() == Some("soldier-9"))
        .unwrap();
    assert_eq!(holding.quantity, 3);
    assert_eq!(holding.serial_number, None);
}

#[test]
fn repeated_issues_merge_into_the_same_holding() {
    let mut records = vec![helmet("S-1", 6, "A")];
    let ops = plan_soldier_issue("soldier-9", "Helmet", 2, &records, &[]).unwrap();
    apply(&mut records, &ops);

    let holdings: Vec<StockRecord> = records
        .iter()
        .filter(|r| r.assigned_to.is_some())
        .cloned()
        .collect();
    let sources: Vec<StockRecord> = records
        .iter()
        .filter(|r| r.assigned_to.is_none())
        .cloned()
        .collect();
    let ops = plan_soldier_issue("soldier-9", "Helmet", 2, &sources, &holdings).unwrap();
    apply(&mut records, &ops);

    let holdings: Vec<&StockRecord> = records.iter().filter(|r| r.assigned_to.is_some()).collect();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].quantity, 4);
    assert_eq!(division_total(&records, "A"), 2);
}
