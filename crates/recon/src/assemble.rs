use redline_engine::{Sheet, SheetId, TabularDocument};

use crate::config::StyleConfig;
use crate::error::RedlineError;
use crate::hierarchy::SheetOutput;

/// A materialized output sheet and what happened to its spans.
#[derive(Debug, Clone)]
pub struct AssembledSheet {
    pub sheet: Sheet,
    pub spans_applied: usize,
    pub spans_dropped: usize,
}

/// Materialize one sheet: every buffered cell first, then every span, then
/// the column widths of `layout`.
///
/// A span the sheet rejects is dropped with a warning; the cells it would
/// have covered are already written.
pub fn assemble_sheet(
    id: SheetId,
    name: &str,
    output: &SheetOutput,
    layout: &Sheet,
    style: &StyleConfig,
) -> AssembledSheet {
    let mut sheet = Sheet::new_with_name(id, name);

    for write in &output.writes {
        sheet.set_cell_with_format(write.row, write.col, write.value.clone(), style.format_for(write.status));
    }

    let mut spans_applied = 0;
    let mut spans_dropped = 0;
    for span in &output.spans {
        match sheet.add_row_span(*span) {
            Ok(()) => spans_applied += 1,
            Err(e) => {
                log::warn!("sheet '{name}': span dropped: {e}");
                spans_dropped += 1;
            }
        }
    }

    for (&col, &width) in layout.column_widths() {
        if col <= layout.max_col() {
            sheet.set_column_width(col, width);
        }
    }

    AssembledSheet {
        sheet,
        spans_applied,
        spans_dropped,
    }
}

/// Owns the output document while sheets are added to it.
///
/// The document starts with a placeholder sheet, as a fresh document does;
/// `finish` removes it by id.
pub struct OutputAssembler {
    document: TabularDocument,
    placeholder: Option<SheetId>,
}

impl Default for OutputAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputAssembler {
    pub fn new() -> Self {
        let document = TabularDocument::new();
        let placeholder = document.sheet(0).map(|s| s.id);
        Self { document, placeholder }
    }

    pub fn next_sheet_id(&mut self) -> SheetId {
        self.document.generate_sheet_id()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<(), RedlineError> {
        // An output sheet may share the placeholder's name
        if let Some(id) = self.placeholder {
            let collides = self
                .document
                .sheet_by_id(id)
                .is_some_and(|p| p.name_key() == sheet.name_key());
            if collides {
                self.document.remove_sheet(id);
                self.placeholder = None;
            }
        }
        self.document.push_sheet(sheet).map_err(RedlineError::Output)
    }

    pub fn finish(mut self) -> TabularDocument {
        if let Some(id) = self.placeholder.take() {
            self.document.remove_sheet(id);
        }
        self.document
    }
}
