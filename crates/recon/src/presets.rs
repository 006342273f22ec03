//! Built-in configurations for the two known document families.

use crate::config::{ColumnGroup, KeyLevel, RedlineConfig};
use crate::error::RedlineError;

/// Failure mode analysis sheets: a function row (A) owns requirement and
/// effect columns, each failure mode (G, with its effect in H) owns four
/// independent cause/control/action/owner lists.
pub fn dfmea() -> Result<RedlineConfig, RedlineError> {
    let mut root = KeyLevel::parse("A")?;
    for column in ["B", "C", "D", "E", "F", "M", "N"] {
        root = root.with_content(ColumnGroup::parse(&[column])?);
    }

    let mut mode = KeyLevel::parse("G")?.with_content(ColumnGroup::parse(&["G", "H"])?);
    for column in ["I", "J", "K", "L"] {
        mode = mode.with_child(KeyLevel::parse(column)?.with_content(ColumnGroup::parse(&[column])?));
    }

    let config = RedlineConfig::new("dfmea", root.with_child(mode));
    config.validate()?;
    Ok(config)
}

/// Requirements traceability: one requirement id (A) per block, its
/// description list in B. Ids repeated further down the sheet are skipped.
pub fn rtm() -> Result<RedlineConfig, RedlineError> {
    let root = KeyLevel::parse("A")?.with_content(ColumnGroup::parse(&["B"])?);
    let mut config = RedlineConfig::new("rtm", root);
    config.dedupe_root_keys = true;
    config.validate()?;
    Ok(config)
}
