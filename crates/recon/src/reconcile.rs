use std::collections::HashSet;

use redline_engine::{CellValue, ColumnRef, Sheet};

use crate::config::OrderingPolicy;
use crate::model::{Entry, ReconciliationResult, RowRange, Status};

/// Every non-null physical cell of `column` within `rows`, duplicates kept.
///
/// Rows hidden under a span contribute their own cell (usually null), not the
/// span's representative value.
pub fn collect_values(sheet: &Sheet, column: ColumnRef, rows: RowRange) -> Vec<CellValue> {
    let col = column.index();
    rows.rows()
        .filter_map(|row| sheet.cell(row, col).cloned())
        .collect()
}

/// Partition the deduplicated union of both sides into Unchanged (both),
/// Added (new only) and Removed (original only), one entry per value.
pub fn reconcile(
    new_values: &[CellValue],
    original_values: &[CellValue],
    ordering: &OrderingPolicy,
) -> ReconciliationResult {
    let in_new: HashSet<&CellValue> = new_values.iter().collect();
    let in_original: HashSet<&CellValue> = original_values.iter().collect();

    let mut seen = HashSet::with_capacity(in_new.len() + in_original.len());
    let mut universe: Vec<&CellValue> = new_values
        .iter()
        .chain(original_values)
        .filter(|v| seen.insert(*v))
        .collect();
    ordering.apply(&mut universe);

    let entries = universe
        .into_iter()
        .map(|value| {
            let status = match (in_new.contains(value), in_original.contains(value)) {
                (true, true) => Status::Unchanged,
                (true, false) => Status::Added,
                _ => Status::Removed,
            };
            Entry { value: value.clone(), status }
        })
        .collect();

    ReconciliationResult { entries }
}

/// No original counterpart: every new value is Added, duplicates included.
pub fn reconcile_unmatched(new_values: &[CellValue], ordering: &OrderingPolicy) -> ReconciliationResult {
    let mut values: Vec<&CellValue> = new_values.iter().collect();
    ordering.apply(&mut values);
    ReconciliationResult {
        entries: values
            .into_iter()
            .map(|value| Entry {
                value: value.clone(),
                status: Status::Added,
            })
            .collect(),
    }
}
