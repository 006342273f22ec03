//! Recursive descent over the key hierarchy.
//!
//! Each block of a level is in one of three states: its key matched a block in
//! the original sheet, it did not (everything below it is new), or the level
//! has no children and recursion stops there. Output rows are allocated
//! depth-first; a parent's key cell is spanned only after all of its
//! descendants have reported how many rows they used.

use std::collections::HashSet;

use redline_engine::{CellValue, ColumnRef, RowSpan, Sheet};

use crate::config::{KeyLevel, MatchScope, RedlineConfig};
use crate::indexer::index_range;
use crate::matcher::BlockIndex;
use crate::model::{Block, CellWrite, ReconciliationResult, RowRange, Status};
use crate::reconcile::{collect_values, reconcile, reconcile_unmatched};

/// Block counters gathered while reconciling one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetStats {
    pub blocks: usize,
    pub matched_blocks: usize,
    pub unmatched_blocks: usize,
    /// Root blocks dropped as repeats of an earlier key.
    pub skipped_blocks: usize,
}

/// A block's counterpart in the original sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counterpart {
    Matched(Block),
    Unmatched,
}

/// What a level's parent block resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lineage {
    Root,
    Matched(RowRange),
    Unmatched,
}

/// Everything buffered for one sheet, ready for the assembler.
#[derive(Debug, Clone, Default)]
pub struct SheetOutput {
    pub writes: Vec<CellWrite>,
    pub spans: Vec<RowSpan>,
    pub stats: SheetStats,
    pub output_rows: usize,
}

/// Mutable state threaded through the recursion for one sheet.
pub struct ReconciliationContext<'a> {
    new: &'a Sheet,
    originals: BlockIndex<'a>,
    config: &'a RedlineConfig,
    /// Next free output row at the root level
    cursor: usize,
    writes: Vec<CellWrite>,
    spans: Vec<RowSpan>,
    seen_root_keys: HashSet<CellValue>,
    stats: SheetStats,
}

impl<'a> ReconciliationContext<'a> {
    pub fn new(new: &'a Sheet, original: &'a Sheet, config: &'a RedlineConfig) -> Self {
        Self {
            new,
            originals: BlockIndex::new(original),
            config,
            cursor: 1,
            writes: Vec::new(),
            spans: Vec::new(),
            seen_root_keys: HashSet::new(),
            stats: SheetStats::default(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn finish(self) -> SheetOutput {
        SheetOutput {
            writes: self.writes,
            spans: self.spans,
            stats: self.stats,
            output_rows: self.cursor - 1,
        }
    }

    fn lookup(&mut self, column: ColumnRef, key: &CellValue, lineage: Lineage) -> Counterpart {
        let scope = match (lineage, self.config.match_scope) {
            (Lineage::Unmatched, _) => return Counterpart::Unmatched,
            (Lineage::Matched(parent), MatchScope::WithinParent) => Some(parent),
            _ => None,
        };
        match self.originals.find_in(column, key, scope) {
            Some(block) => Counterpart::Matched(block),
            None => Counterpart::Unmatched,
        }
    }

    fn write(&mut self, row: usize, column: ColumnRef, value: CellValue, status: Status) {
        self.writes.push(CellWrite {
            row,
            col: column.index(),
            value,
            status,
        });
    }

    /// Span `column` over `extent` rows from `start`, if more than one.
    fn span(&mut self, column: ColumnRef, start: usize, extent: usize) {
        if extent > 1 {
            self.spans.push(RowSpan::new(column.index(), start, start + extent - 1));
        }
    }

    /// Write one value per row from `out_start`. Returns how many were written.
    fn write_column(&mut self, column: ColumnRef, out_start: usize, result: &ReconciliationResult) -> usize {
        for (i, entry) in result.entries.iter().enumerate() {
            self.write(out_start + i, column, entry.value.clone(), entry.status);
        }
        result.len()
    }

    /// Span the last of `written` values down to the end of `extent`.
    fn span_tail(&mut self, column: ColumnRef, out_start: usize, written: usize, extent: usize) {
        if written > 0 && written < extent {
            self.span(column, out_start + written - 1, extent - written + 1);
        }
    }
}

/// Reconcile the configured hierarchy over every row of the new sheet.
pub fn reconcile_sheet(ctx: &mut ReconciliationContext<'_>) {
    if ctx.new.max_row() == 0 {
        return;
    }
    let config = ctx.config;
    let rows = RowRange::new(1, ctx.new.max_row());
    let start = ctx.cursor;
    let consumed = reconcile_level(ctx, &config.root, rows, Lineage::Root, start, 0);
    ctx.cursor += consumed;
}

/// Reconcile every block of `level` inside `rows`, allocating output from
/// `out_start`. Returns the number of output rows used.
///
/// Null-key rows between blocks keep one blank output row each, so the
/// result never uses fewer rows than `rows` spans.
fn reconcile_level(
    ctx: &mut ReconciliationContext<'_>,
    level: &KeyLevel,
    rows: RowRange,
    lineage: Lineage,
    out_start: usize,
    depth: usize,
) -> usize {
    let blocks = index_range(ctx.new, level.column, rows);
    let mut cursor = out_start;
    let mut next_new_row = rows.start;

    for block in blocks {
        if depth == 0 && ctx.config.dedupe_root_keys && !ctx.seen_root_keys.insert(block.key.clone()) {
            log::debug!(
                "{}{}: repeated key '{}' skipped",
                level.column,
                block.start_row,
                block.key
            );
            ctx.stats.skipped_blocks += 1;
            next_new_row = block.end_row + 1;
            continue;
        }

        cursor += block.start_row - next_new_row;
        cursor += reconcile_block(ctx, level, &block, lineage, cursor, depth);
        next_new_row = block.end_row + 1;
    }

    cursor += rows.end + 1 - next_new_row;
    cursor - out_start
}

/// Reconcile one block and its descendants. Returns output rows used:
/// the largest of the block's own span, each content group's extent, and
/// each child level's consumption.
///
/// The key cell covers the whole extent whether it is written as a separate
/// key cell or as part of a content group.
fn reconcile_block(
    ctx: &mut ReconciliationContext<'_>,
    level: &KeyLevel,
    block: &Block,
    lineage: Lineage,
    out_start: usize,
    depth: usize,
) -> usize {
    let counterpart = ctx.lookup(level.column, &block.key, lineage);
    ctx.stats.blocks += 1;
    match &counterpart {
        Counterpart::Matched(original) => {
            ctx.stats.matched_blocks += 1;
            log::debug!(
                "{}{}..{}: '{}' matched original rows {}..{}",
                level.column,
                block.start_row,
                block.end_row,
                block.key,
                original.start_row,
                original.end_row
            );
        }
        Counterpart::Unmatched => {
            ctx.stats.unmatched_blocks += 1;
            log::debug!(
                "{}{}..{}: '{}' has no original counterpart",
                level.column,
                block.start_row,
                block.end_row,
                block.key
            );
        }
    }

    let mut extent = block.span();
    // Columns of the group holding the level's own key, spanned once the
    // descendants have reported
    let mut key_group: Vec<(ColumnRef, usize)> = Vec::new();

    for group in &level.content {
        let results: Vec<(ColumnRef, ReconciliationResult)> = group
            .columns
            .iter()
            .map(|&column| {
                let new_values = collect_values(ctx.new, column, block.rows());
                let result = match &counterpart {
                    Counterpart::Matched(original) => {
                        let original_values = collect_values(ctx.originals.sheet(), column, original.rows());
                        reconcile(&new_values, &original_values, &ctx.config.ordering)
                    }
                    Counterpart::Unmatched => reconcile_unmatched(&new_values, &ctx.config.ordering),
                };
                (column, result)
            })
            .collect();

        let group_extent = results
            .iter()
            .map(|(_, r)| r.len())
            .fold(block.span(), usize::max);
        let owns_key = group.columns.contains(&level.column);
        for (column, result) in &results {
            let written = ctx.write_column(*column, out_start, result);
            if owns_key {
                key_group.push((*column, written));
            } else {
                ctx.span_tail(*column, out_start, written, group_extent);
            }
        }
        extent = extent.max(group_extent);
    }

    let child_lineage = match &counterpart {
        Counterpart::Matched(original) => Lineage::Matched(original.rows()),
        Counterpart::Unmatched => Lineage::Unmatched,
    };
    for child in &level.children {
        let consumed = reconcile_level(ctx, child, block.rows(), child_lineage, out_start, depth + 1);
        extent = extent.max(consumed);
    }

    for (column, written) in key_group {
        ctx.span_tail(column, out_start, written, extent);
    }
    if !level.reconciles_own_column() {
        let status = match counterpart {
            Counterpart::Matched(_) => Status::Unchanged,
            Counterpart::Unmatched => Status::Added,
        };
        ctx.write(out_start, level.column, block.key.clone(), status);
        ctx.span(level.column, out_start, extent);
    }

    extent
}
