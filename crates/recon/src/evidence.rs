use redline_engine::column::letters;

use crate::assemble::AssembledSheet;
use crate::hierarchy::SheetOutput;
use crate::model::{ChangeRecord, RedlineSummary, SheetSummary, SkippedSheet, Status};

/// Per-sheet report: block counters, value counts and every changed cell.
pub fn summarize_sheet(name: &str, output: &SheetOutput, assembled: &AssembledSheet) -> SheetSummary {
    let mut summary = SheetSummary {
        name: name.to_string(),
        blocks: output.stats.blocks,
        matched_blocks: output.stats.matched_blocks,
        unmatched_blocks: output.stats.unmatched_blocks,
        skipped_blocks: output.stats.skipped_blocks,
        output_rows: output.output_rows,
        spans_applied: assembled.spans_applied,
        spans_dropped: assembled.spans_dropped,
        ..SheetSummary::default()
    };

    for write in &output.writes {
        match write.status {
            Status::Unchanged => summary.unchanged += 1,
            Status::Added => summary.added += 1,
            Status::Removed => summary.removed += 1,
        }
        if write.status != Status::Unchanged {
            summary.changes.push(ChangeRecord {
                row: write.row,
                column: letters(write.col),
                value: write.value.raw_display(),
                status: write.status,
            });
        }
    }
    summary.changes.sort_by_key(|c| (c.row, c.column.len(), c.column.clone()));

    summary
}

/// Document-level totals over every compared sheet.
pub fn compute_summary(sheets: &[SheetSummary], skipped: &[SkippedSheet]) -> RedlineSummary {
    let mut summary = RedlineSummary {
        sheets_compared: sheets.len(),
        sheets_skipped: skipped.len(),
        ..RedlineSummary::default()
    };

    for s in sheets {
        summary.blocks += s.blocks;
        summary.matched_blocks += s.matched_blocks;
        summary.unmatched_blocks += s.unmatched_blocks;
        summary.added += s.added;
        summary.removed += s.removed;
        summary.unchanged += s.unchanged;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::SheetStats;
    use crate::model::{CellWrite, Side};
    use redline_engine::{CellValue, Sheet, SheetId};

    fn write(row: usize, col: usize, value: &str, status: Status) -> CellWrite {
        CellWrite {
            row,
            col,
            value: CellValue::from_input(value),
            status,
        }
    }

    fn assembled() -> AssembledSheet {
        AssembledSheet {
            sheet: Sheet::new_with_name(SheetId::from_raw(1), "S"),
            spans_applied: 2,
            spans_dropped: 0,
        }
    }

    #[test]
    fn sheet_summary_lists_changes_in_cell_order() {
        let output = SheetOutput {
            writes: vec![
                write(1, 28, "far", Status::Added),
                write(1, 1, "R1", Status::Unchanged),
                write(1, 2, "x", Status::Added),
                write(2, 2, "z", Status::Removed),
            ],
            stats: SheetStats {
                blocks: 1,
                matched_blocks: 1,
                ..SheetStats::default()
            },
            output_rows: 2,
            ..SheetOutput::default()
        };
        let summary = summarize_sheet("S", &output, &assembled());

        assert_eq!(summary.added, 2);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.spans_applied, 2);
        let cells: Vec<(usize, &str)> = summary.changes.iter().map(|c| (c.row, c.column.as_str())).collect();
        assert_eq!(cells, vec![(1, "B"), (1, "AB"), (2, "B")]);
    }

    #[test]
    fn document_summary_totals() {
        let a = SheetSummary {
            blocks: 3,
            matched_blocks: 2,
            unmatched_blocks: 1,
            added: 4,
            unchanged: 5,
            ..SheetSummary::default()
        };
        let b = SheetSummary {
            blocks: 1,
            matched_blocks: 1,
            removed: 2,
            ..SheetSummary::default()
        };
        let skipped = vec![SkippedSheet {
            name: "Notes".into(),
            missing_from: Side::Original,
        }];
        let summary = compute_summary(&[a, b], &skipped);
        assert_eq!(summary.sheets_compared, 2);
        assert_eq!(summary.sheets_skipped, 1);
        assert_eq!(summary.blocks, 4);
        assert_eq!(summary.matched_blocks, 3);
        assert_eq!(summary.added, 4);
        assert_eq!(summary.removed, 2);
        assert_eq!(summary.unchanged, 5);
    }
}
