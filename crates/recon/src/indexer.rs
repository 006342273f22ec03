use redline_engine::{ColumnRef, Sheet};

use crate::model::{Block, RowRange};

/// Partition every row of `column` into blocks.
pub fn index(sheet: &Sheet, column: ColumnRef) -> Vec<Block> {
    if sheet.max_row() == 0 {
        return Vec::new();
    }
    index_range(sheet, column, RowRange::new(1, sheet.max_row()))
}

/// Partition the rows of `range` in `column` into blocks, in row order.
///
/// A row span is exactly one block (clipped to `range`) and never merges with
/// its neighbours. Unspanned adjacent rows with equal values form one block.
/// Null rows are skipped.
pub fn index_range(sheet: &Sheet, column: ColumnRef, range: RowRange) -> Vec<Block> {
    let col = column.index();
    let mut blocks: Vec<Block> = Vec::new();
    // Whether the last block may still grow by one plain row
    let mut open = false;
    let mut row = range.start;

    while row <= range.end {
        if let Some(span) = sheet.span_at(row, col) {
            let end = span.end_row.min(range.end);
            if let Some(key) = sheet.cell(span.start_row, col) {
                blocks.push(Block::new(key.clone(), row, end));
            }
            open = false;
            row = end + 1;
            continue;
        }

        match sheet.cell(row, col) {
            Some(value) => {
                let continues = open && blocks.last().is_some_and(|last| last.key == *value);
                if continues {
                    if let Some(last) = blocks.last_mut() {
                        last.end_row = row;
                    }
                } else {
                    blocks.push(Block::new(value.clone(), row, row));
                    open = true;
                }
            }
            None => open = false,
        }
        row += 1;
    }

    blocks
}

/// The block of `column` that contains `row`, if the row is not null.
pub fn block_at(sheet: &Sheet, column: ColumnRef, row: usize) -> Option<Block> {
    let col = column.index();
    if let Some(span) = sheet.span_at(row, col) {
        return sheet
            .cell(span.start_row, col)
            .map(|key| Block::new(key.clone(), span.start_row, span.end_row));
    }

    let key = sheet.cell(row, col)?;
    let extends = |r: usize| sheet.span_at(r, col).is_none() && sheet.cell(r, col) == Some(key);

    let mut start = row;
    while start > 1 && extends(start - 1) {
        start -= 1;
    }
    let mut end = row;
    while end < sheet.max_row() && extends(end + 1) {
        end += 1;
    }
    Some(Block::new(key.clone(), start, end))
}
