use redline_engine::{Sheet, TabularDocument};

use crate::assemble::{assemble_sheet, OutputAssembler};
use crate::config::{MatchScope, RedlineConfig};
use crate::error::RedlineError;
use crate::evidence::{compute_summary, summarize_sheet};
use crate::hierarchy::{reconcile_sheet, ReconciliationContext};
use crate::model::{RedlineMeta, RedlineReport, RedlineResult, Side, SkippedSheet};

/// Redline `new_doc` against `original_doc`. Returns the annotated document
/// plus a report of what was compared, changed and skipped.
///
/// Only sheets present in both documents (names compared case-insensitively)
/// are reconciled. Every such sheet is checked against the configured columns
/// before any output is produced, so an error never leaves partial results.
pub fn run(
    config: &RedlineConfig,
    new_doc: &TabularDocument,
    original_doc: &TabularDocument,
) -> Result<RedlineResult, RedlineError> {
    config.validate()?;
    if config.match_scope != MatchScope::Global {
        log::warn!(
            "'{}': match scope is {}; keys are only looked up under their parent's counterpart",
            config.name,
            config.match_scope
        );
    }

    let (pairs, skipped) = pair_sheets(new_doc, original_doc);

    for (new, original) in &pairs {
        let max_col = new.max_col().max(original.max_col());
        if max_col > 0 {
            config.validate_extent(&new.name, max_col)?;
        }
    }

    let mut assembler = OutputAssembler::new();
    let mut sheets = Vec::with_capacity(pairs.len());

    for (new, original) in pairs {
        let mut ctx = ReconciliationContext::new(new, original, config);
        reconcile_sheet(&mut ctx);
        let output = ctx.finish();

        let id = assembler.next_sheet_id();
        let assembled = assemble_sheet(id, &new.name, &output, new, &config.style);
        let summary = summarize_sheet(&new.name, &output, &assembled);
        log::info!(
            "sheet '{}': {} blocks ({} matched), {} added, {} removed, {} output rows",
            summary.name,
            summary.blocks,
            summary.matched_blocks,
            summary.added,
            summary.removed,
            summary.output_rows
        );

        assembler.add_sheet(assembled.sheet)?;
        sheets.push(summary);
    }

    let summary = compute_summary(&sheets, &skipped);

    Ok(RedlineResult {
        document: assembler.finish(),
        report: RedlineReport {
            meta: RedlineMeta {
                config_name: config.name.clone(),
                match_scope: config.match_scope.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            sheets,
            skipped,
        },
    })
}

/// Like `run`, returning only the annotated document.
pub fn reconcile(
    new_doc: &TabularDocument,
    original_doc: &TabularDocument,
    config: &RedlineConfig,
) -> Result<TabularDocument, RedlineError> {
    run(config, new_doc, original_doc).map(|result| result.document)
}

/// Shared sheets in new-document order, plus every sheet found on one side only.
fn pair_sheets<'a>(
    new_doc: &'a TabularDocument,
    original_doc: &'a TabularDocument,
) -> (Vec<(&'a Sheet, &'a Sheet)>, Vec<SkippedSheet>) {
    let mut pairs = Vec::new();
    let mut skipped = Vec::new();

    for new in new_doc.sheets() {
        match original_doc.sheet_by_name(&new.name) {
            Some(original) => pairs.push((new, original)),
            None => {
                log::info!("sheet '{}' is missing from the original document, skipped", new.name);
                skipped.push(SkippedSheet {
                    name: new.name.clone(),
                    missing_from: Side::Original,
                });
            }
        }
    }

    for original in original_doc.sheets() {
        if new_doc.sheet_by_name(&original.name).is_none() {
            log::info!("sheet '{}' is missing from the new document, skipped", original.name);
            skipped.push(SkippedSheet {
                name: original.name.clone(),
                missing_from: Side::New,
            });
        }
    }

    (pairs, skipped)
}
