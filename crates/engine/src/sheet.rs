use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::cell::{Cell, CellFormat, CellValue};

/// Stable sheet identity, never reused within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(u64);

impl SheetId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Lookup key for sheet names (case-insensitive, trimmed).
pub fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sheet names follow the usual workbook rules: non-empty, at most 31
/// characters, none of `[ ] : * ? / \`.
pub fn is_valid_sheet_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= 31
        && !trimmed.chars().any(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
}

/// A single-column, multi-row merged region.
///
/// The value shown for every row of the region is the cell in `start_row`
/// (the representative value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowSpan {
    pub col: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl RowSpan {
    pub fn new(col: usize, start_row: usize, end_row: usize) -> Self {
        Self {
            col,
            start_row: start_row.min(end_row),
            end_row: start_row.max(end_row),
        }
    }

    #[inline]
    pub fn contains(&self, row: usize) -> bool {
        self.start_row <= row && row <= self.end_row
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn overlaps(&self, other: &RowSpan) -> bool {
        self.col == other.col && self.start_row <= other.end_row && other.start_row <= self.end_row
    }
}

/// One sheet: sparse cells addressed 1-based by (row, col), per-column row
/// spans, and column widths.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    name_key: String,
    cells: FxHashMap<(usize, usize), Cell>,
    /// col -> spans sorted by start_row, never overlapping
    row_spans: BTreeMap<usize, Vec<RowSpan>>,
    col_widths: BTreeMap<usize, f64>,
    max_row: usize,
    max_col: usize,
}

impl Sheet {
    pub fn new_with_name(id: SheetId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            name_key: normalize_sheet_name(name),
            cells: FxHashMap::default(),
            row_spans: BTreeMap::new(),
            col_widths: BTreeMap::new(),
            max_row: 0,
            max_col: 0,
        }
    }

    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.name_key = normalize_sheet_name(name);
    }

    // =========================================================================
    // Cells
    // =========================================================================

    /// The cell's own value, or None if the cell is null (missing or blank).
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells
            .get(&(row, col))
            .map(|c| &c.value)
            .filter(|v| !v.is_empty())
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn get_format(&self, row: usize, col: usize) -> CellFormat {
        self.cells
            .get(&(row, col))
            .map(|c| c.format.clone())
            .unwrap_or_default()
    }

    /// Parse `input` like typed text and store it.
    pub fn set_value(&mut self, row: usize, col: usize, input: &str) {
        self.set_cell(row, col, CellValue::from_input(input));
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        let format = self.get_format(row, col);
        self.set_cell_with_format(row, col, value, format);
    }

    pub fn set_cell_with_format(&mut self, row: usize, col: usize, value: CellValue, format: CellFormat) {
        debug_assert!(row >= 1 && col >= 1, "sheet coordinates are 1-based");
        if value.is_empty() && format.is_default() {
            self.cells.remove(&(row, col));
            return;
        }
        self.cells.insert((row, col), Cell::with_format(value, format));
        self.grow(row, col);
    }

    pub fn clear_cell(&mut self, row: usize, col: usize) {
        self.cells.remove(&(row, col));
    }

    pub fn cells_iter(&self) -> impl Iterator<Item = (&(usize, usize), &Cell)> {
        self.cells.iter()
    }

    /// Value displayed at (row, col): the span's representative value when the
    /// row is covered by a row span, otherwise the cell's own value.
    pub fn effective_value(&self, row: usize, col: usize) -> Option<&CellValue> {
        match self.span_at(row, col) {
            Some(span) => self.cell(span.start_row, col),
            None => self.cell(row, col),
        }
    }

    // =========================================================================
    // Row spans
    // =========================================================================

    /// Add a row span. Fails if it overlaps an existing span in that column.
    pub fn add_row_span(&mut self, span: RowSpan) -> Result<(), String> {
        if span.col == 0 || span.start_row == 0 {
            return Err(format!(
                "row span {}..{} in column {} is not 1-based",
                span.start_row, span.end_row, span.col
            ));
        }

        let spans = self.row_spans.entry(span.col).or_default();
        if let Some(existing) = spans.iter().find(|s| s.overlaps(&span)) {
            return Err(format!(
                "rows {}..={} in column {} overlap existing span {}..={}",
                span.start_row, span.end_row, span.col, existing.start_row, existing.end_row
            ));
        }

        let at = spans.partition_point(|s| s.start_row < span.start_row);
        spans.insert(at, span);
        self.grow(span.end_row, span.col);
        Ok(())
    }

    /// Spans of one column in row order.
    pub fn row_spans(&self, col: usize) -> &[RowSpan] {
        self.row_spans.get(&col).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_row_spans(&self) -> impl Iterator<Item = &RowSpan> {
        self.row_spans.values().flatten()
    }

    pub fn span_at(&self, row: usize, col: usize) -> Option<&RowSpan> {
        let spans = self.row_spans.get(&col)?;
        let idx = spans.partition_point(|s| s.end_row < row);
        spans.get(idx).filter(|s| s.contains(row))
    }

    /// True for rows covered by a span other than its first row.
    pub fn is_span_hidden(&self, row: usize, col: usize) -> bool {
        self.span_at(row, col).is_some_and(|s| s.start_row != row)
    }

    // =========================================================================
    // Extent + layout
    // =========================================================================

    pub fn max_row(&self) -> usize {
        self.max_row
    }

    pub fn max_col(&self) -> usize {
        self.max_col
    }

    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.col_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.col_widths.insert(col, width);
        self.max_col = self.max_col.max(col);
    }

    pub fn column_widths(&self) -> &BTreeMap<usize, f64> {
        &self.col_widths
    }

    fn grow(&mut self, row: usize, col: usize) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::new_with_name(SheetId::from_raw(1), "Sheet1")
    }

    #[test]
    fn test_extent_tracks_cells_and_spans() {
        let mut s = sheet();
        assert_eq!((s.max_row(), s.max_col()), (0, 0));
        s.set_value(3, 2, "x");
        s.add_row_span(RowSpan::new(1, 4, 6)).unwrap();
        assert_eq!((s.max_row(), s.max_col()), (6, 2));
    }

    #[test]
    fn test_blank_cells_are_null() {
        let mut s = sheet();
        s.set_value(1, 1, "   ");
        s.set_cell(1, 2, CellValue::Text(String::new()));
        assert!(s.cell(1, 1).is_none());
        assert!(s.cell(1, 2).is_none());
        assert!(s.cell(9, 9).is_none());
    }

    #[test]
    fn test_effective_value_uses_representative() {
        let mut s = sheet();
        s.set_value(2, 1, "R1");
        s.set_value(3, 1, "residue");
        s.add_row_span(RowSpan::new(1, 2, 4)).unwrap();
        for row in 2..=4 {
            assert_eq!(s.effective_value(row, 1), Some(&CellValue::text("R1")));
        }
        assert_eq!(s.cell(3, 1), Some(&CellValue::text("residue")));
        assert!(s.effective_value(5, 1).is_none());
    }

    #[test]
    fn test_overlapping_span_rejected() {
        let mut s = sheet();
        s.add_row_span(RowSpan::new(1, 2, 4)).unwrap();
        let err = s.add_row_span(RowSpan::new(1, 4, 5)).unwrap_err();
        assert!(err.contains("overlap"));
        // Same rows in another column are fine
        s.add_row_span(RowSpan::new(2, 2, 4)).unwrap();
    }

    #[test]
    fn test_span_lookup_sorted() {
        let mut s = sheet();
        s.add_row_span(RowSpan::new(1, 10, 12)).unwrap();
        s.add_row_span(RowSpan::new(1, 2, 3)).unwrap();
        s.add_row_span(RowSpan::new(1, 5, 7)).unwrap();
        let starts: Vec<usize> = s.row_spans(1).iter().map(|r| r.start_row).collect();
        assert_eq!(starts, vec![2, 5, 10]);
        assert_eq!(s.span_at(6, 1).map(|r| r.start_row), Some(5));
        assert!(s.span_at(4, 1).is_none());
        assert!(s.span_at(13, 1).is_none());
        assert!(s.is_span_hidden(11, 1));
        assert!(!s.is_span_hidden(10, 1));
    }

    #[test]
    fn test_zero_based_span_rejected() {
        let mut s = sheet();
        assert!(s.add_row_span(RowSpan::new(1, 0, 2)).is_err());
    }

    #[test]
    fn test_sheet_name_rules() {
        assert!(is_valid_sheet_name("dFMEA"));
        assert!(!is_valid_sheet_name("  "));
        assert!(!is_valid_sheet_name("a/b"));
        assert_eq!(normalize_sheet_name(" Risks "), "risks");
    }
}
