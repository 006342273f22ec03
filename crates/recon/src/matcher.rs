use std::collections::HashMap;

use redline_engine::{CellValue, ColumnRef, Sheet};

use crate::indexer::{block_at, index, index_range};
use crate::model::{Block, RowRange};

/// Find `key` in `other`: the block containing the first row (in sheet order)
/// whose effective value in `column` equals `key`.
///
/// The search is global. A key that appears under two different parents in
/// `other` always resolves to the first occurrence.
pub fn find_block(other: &Sheet, column: ColumnRef, key: &CellValue) -> Option<Block> {
    let col = column.index();
    let row = (1..=other.max_row()).find(|&r| other.effective_value(r, col) == Some(key))?;
    block_at(other, column, row)
}

/// Like `find_block`, but only rows inside `scope` are considered.
pub fn find_block_within(other: &Sheet, column: ColumnRef, key: &CellValue, scope: RowRange) -> Option<Block> {
    index_range(other, column, scope)
        .into_iter()
        .find(|b| b.key == *key)
}

/// Per-column block index over one sheet, built lazily and reused for every
/// lookup in that column.
///
/// Blocks come out in row order and null rows never form blocks, so the first
/// block with a given key is the block holding the first matching row.
pub struct BlockIndex<'a> {
    sheet: &'a Sheet,
    columns: HashMap<ColumnRef, Vec<Block>>,
}

impl<'a> BlockIndex<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self {
            sheet,
            columns: HashMap::new(),
        }
    }

    pub fn sheet(&self) -> &'a Sheet {
        self.sheet
    }

    /// Global first-match lookup.
    pub fn find(&mut self, column: ColumnRef, key: &CellValue) -> Option<Block> {
        let sheet = self.sheet;
        self.columns
            .entry(column)
            .or_insert_with(|| index(sheet, column))
            .iter()
            .find(|b| b.key == *key)
            .cloned()
    }

    /// Lookup restricted to `scope`, or global when `scope` is None.
    pub fn find_in(&mut self, column: ColumnRef, key: &CellValue, scope: Option<RowRange>) -> Option<Block> {
        match scope {
            Some(rows) => find_block_within(self.sheet, column, key, rows),
            None => self.find(column, key),
        }
    }
}
