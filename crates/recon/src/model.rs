use std::ops::RangeInclusive;

use redline_engine::{CellValue, TabularDocument};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Inclusive, 1-based row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "row range {start}..={end} is inverted");
        Self { start, end }
    }

    pub fn height(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row <= self.end
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Maximal contiguous rows sharing one non-null effective key value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub key: CellValue,
    pub start_row: usize,
    pub end_row: usize,
}

impl Block {
    pub fn new(key: CellValue, start_row: usize, end_row: usize) -> Self {
        Self { key, start_row, end_row }
    }

    pub fn span(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn rows(&self) -> RowRange {
        RowRange::new(self.start_row, self.end_row)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unchanged,
    Added,
    Removed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unchanged => "unchanged",
            Status::Added => "added",
            Status::Removed => "removed",
        }
    }

    /// The label the other side would see: Added and Removed trade places.
    pub fn mirrored(self) -> Self {
        match self {
            Status::Unchanged => Status::Unchanged,
            Status::Added => Status::Removed,
            Status::Removed => Status::Added,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: CellValue,
    pub status: Status,
}

/// One column's reconciled values, one per output row, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub entries: Vec<Entry>,
}

impl ReconciliationResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &CellValue> {
        self.entries
            .iter()
            .filter(move |e| e.status == status)
            .map(|e| &e.value)
    }

    pub fn count(&self, status: Status) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

// ---------------------------------------------------------------------------
// Output buffer
// ---------------------------------------------------------------------------

/// A buffered output cell, materialized by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A content cell that differs between the two documents.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub status: Status,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub blocks: usize,
    pub matched_blocks: usize,
    pub unmatched_blocks: usize,
    pub skipped_blocks: usize,
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub output_rows: usize,
    pub spans_applied: usize,
    pub spans_dropped: usize,
    pub changes: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    New,
    Original,
}

/// A sheet present in only one document; it is skipped, not copied.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSheet {
    pub name: String,
    pub missing_from: Side,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RedlineSummary {
    pub sheets_compared: usize,
    pub sheets_skipped: usize,
    pub blocks: usize,
    pub matched_blocks: usize,
    pub unmatched_blocks: usize,
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedlineMeta {
    pub config_name: String,
    pub match_scope: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedlineReport {
    pub meta: RedlineMeta,
    pub summary: RedlineSummary,
    pub sheets: Vec<SheetSummary>,
    pub skipped: Vec<SkippedSheet>,
}

impl RedlineReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSummary> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// The annotated document plus the run report.
#[derive(Debug, Clone)]
pub struct RedlineResult {
    pub document: TabularDocument,
    pub report: RedlineReport,
}
