//! `redline-engine`: in-memory tabular documents with cells, sheets and row spans.

pub mod cell;
pub mod column;
pub mod document;
pub mod sheet;

pub use cell::{Cell, CellFormat, CellValue};
pub use column::ColumnRef;
pub use document::TabularDocument;
pub use sheet::{RowSpan, Sheet, SheetId};
