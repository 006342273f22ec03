// Property-based tests for value reconciliation and block layout.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use redline_engine::{CellValue, ColumnRef, RowSpan, TabularDocument};
use redline_recon::config::{ColumnGroup, KeyLevel, OrderingPolicy, RedlineConfig};
use redline_recon::engine::run;
use redline_recon::indexer::index;
use redline_recon::model::{ReconciliationResult, Status};
use redline_recon::reconcile::reconcile;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn one_level() -> RedlineConfig {
    let root = KeyLevel::new(ColumnRef::parse("A").unwrap())
        .with_content(ColumnGroup::new(vec![ColumnRef::parse("B").unwrap()]));
    RedlineConfig::new("prop", root)
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small alphabet so both sides overlap often; sometimes blank.
fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-e]",
        1 => r"[1-3]",
        1 => Just(String::new()),
    ]
}

fn arb_values(max: usize) -> impl Strategy<Value = Vec<CellValue>> {
    proptest::collection::vec(arb_input(), 0..=max)
        .prop_map(|inputs| {
            inputs
                .iter()
                .map(|s| CellValue::from_input(s))
                .filter(|v| !v.is_empty())
                .collect()
        })
}

fn arb_ordering() -> impl Strategy<Value = OrderingPolicy> {
    prop_oneof![Just(OrderingPolicy::FirstSeen), Just(OrderingPolicy::Sorted)]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn with_status(result: &ReconciliationResult, status: Status) -> HashSet<CellValue> {
    result.with_status(status).cloned().collect()
}

/// One sheet whose column A holds a single key spanned over `b_inputs.len()`
/// rows, with `b_inputs` in column B.
fn one_block_doc(b_inputs: &[String]) -> TabularDocument {
    let mut doc = TabularDocument::empty();
    let sheet = doc.add_sheet_named("S").unwrap();
    sheet.set_value(1, 1, "K");
    for (i, input) in b_inputs.iter().enumerate() {
        sheet.set_value(i + 1, 2, input);
    }
    if b_inputs.len() > 1 {
        sheet.add_row_span(RowSpan::new(1, 1, b_inputs.len())).unwrap();
    }
    // Keep column B inside the extent even when every B cell is blank
    sheet.set_column_width(2, 10.0);
    doc
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn statuses_partition_the_universe(
        new in arb_values(8),
        original in arb_values(8),
        ordering in arb_ordering(),
    ) {
        let result = reconcile(&new, &original, &ordering);

        let new_set: HashSet<CellValue> = new.iter().cloned().collect();
        let original_set: HashSet<CellValue> = original.iter().cloned().collect();
        let universe: HashSet<CellValue> = new_set.union(&original_set).cloned().collect();

        // One entry per universe value
        let listed: HashSet<CellValue> = result.entries.iter().map(|e| e.value.clone()).collect();
        prop_assert_eq!(listed.len(), result.len());
        prop_assert_eq!(&listed, &universe);

        let unchanged = with_status(&result, Status::Unchanged);
        let added = with_status(&result, Status::Added);
        let removed = with_status(&result, Status::Removed);
        prop_assert_eq!(unchanged, new_set.intersection(&original_set).cloned().collect::<HashSet<_>>());
        prop_assert_eq!(added, new_set.difference(&original_set).cloned().collect::<HashSet<_>>());
        prop_assert_eq!(removed, original_set.difference(&new_set).cloned().collect::<HashSet<_>>());
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn swapping_sides_swaps_added_and_removed(
        new in arb_values(8),
        original in arb_values(8),
    ) {
        let forward = reconcile(&new, &original, &OrderingPolicy::FirstSeen);
        let backward = reconcile(&original, &new, &OrderingPolicy::FirstSeen);

        prop_assert_eq!(with_status(&forward, Status::Unchanged), with_status(&backward, Status::Unchanged));
        prop_assert_eq!(with_status(&forward, Status::Added), with_status(&backward, Status::Removed));
        prop_assert_eq!(with_status(&forward, Status::Removed), with_status(&backward, Status::Added));
        for entry in &forward.entries {
            let mirrored = backward.entries.iter().find(|e| e.value == entry.value).map(|e| e.status);
            prop_assert_eq!(mirrored, Some(entry.status.mirrored()));
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn block_uses_max_of_span_and_universe(
        new_inputs in proptest::collection::vec(arb_input(), 1..=6),
        original_inputs in proptest::collection::vec(arb_input(), 1..=6),
    ) {
        let new = one_block_doc(&new_inputs);
        let original = one_block_doc(&original_inputs);
        let result = run(&one_level(), &new, &original).unwrap();

        let universe: HashSet<String> = new_inputs
            .iter()
            .chain(&original_inputs)
            .filter(|s| !s.is_empty())
            .cloned()
            .collect();
        let expected = new_inputs.len().max(universe.len());
        prop_assert_eq!(result.report.sheets[0].output_rows, expected);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn identical_documents_have_no_changes(
        rows in proptest::collection::vec((prop::bool::ANY, arb_input()), 1..=12),
    ) {
        let mut doc = TabularDocument::empty();
        let sheet = doc.add_sheet_named("S").unwrap();
        for (i, (keyed, b)) in rows.iter().enumerate() {
            if *keyed {
                sheet.set_value(i + 1, 1, &format!("K{i}"));
            }
            sheet.set_value(i + 1, 2, b);
        }
        sheet.set_column_width(2, 10.0);

        let result = run(&one_level(), &doc, &doc).unwrap();
        prop_assert_eq!(result.report.summary.added, 0);
        prop_assert_eq!(result.report.summary.removed, 0);
        prop_assert_eq!(result.report.summary.unmatched_blocks, 0);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn blocks_cover_every_keyed_row_once(
        inputs in proptest::collection::vec(prop_oneof![Just("x"), Just("y"), Just("")], 1..=20),
    ) {
        let mut doc = TabularDocument::empty();
        let sheet = doc.add_sheet_named("S").unwrap();
        for (i, input) in inputs.iter().enumerate() {
            sheet.set_value(i + 1, 1, input);
        }
        let sheet = doc.sheet(0).unwrap();
        let column = ColumnRef::parse("A").unwrap();
        let blocks = index(sheet, column);

        prop_assert_eq!(&blocks, &index(sheet, column));

        let mut covered = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            for row in block.start_row..=block.end_row {
                prop_assert_eq!(sheet.cell(row, 1), Some(&block.key));
                covered.push(row);
            }
            // Maximal: an equal neighbour directly below would have merged
            if let Some(next) = blocks.get(i + 1) {
                prop_assert!(next.start_row > block.end_row);
                prop_assert!(next.start_row > block.end_row + 1 || next.key != block.key);
            }
        }
        let keyed: Vec<usize> = (1..=inputs.len()).filter(|&r| sheet.cell(r, 1).is_some()).collect();
        prop_assert_eq!(covered, keyed);
    }
}
