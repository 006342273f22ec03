use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use redline_engine::{CellFormat, CellValue, ColumnRef};
use serde::{Deserialize, Deserializer};

use crate::error::RedlineError;
use crate::model::Status;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedlineConfig {
    pub name: String,
    #[serde(default)]
    pub ordering: OrderingPolicy,
    #[serde(default)]
    pub match_scope: MatchScope,
    /// Skip a root block whose key was already processed earlier in the sheet.
    #[serde(default)]
    pub dedupe_root_keys: bool,
    #[serde(default)]
    pub style: StyleConfig,
    pub root: KeyLevel,
}

// ---------------------------------------------------------------------------
// Key hierarchy
// ---------------------------------------------------------------------------

/// One level of the grouping hierarchy.
///
/// `column` partitions rows into blocks; each content group is reconciled per
/// block; children are reconciled inside each block's rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyLevel {
    pub column: ColumnRef,
    #[serde(default)]
    pub content: Vec<ColumnGroup>,
    #[serde(default)]
    pub children: Vec<KeyLevel>,
}

/// Columns reconciled as a unit: they share one row allocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ColumnGroup {
    pub columns: Vec<ColumnRef>,
}

impl ColumnGroup {
    pub fn new(columns: Vec<ColumnRef>) -> Self {
        Self { columns }
    }

    /// Parse a group from column letters or numbers.
    pub fn parse(columns: &[&str]) -> Result<Self, RedlineError> {
        columns
            .iter()
            .map(|c| parse_column(c))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl KeyLevel {
    pub fn new(column: ColumnRef) -> Self {
        Self {
            column,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn parse(column: &str) -> Result<Self, RedlineError> {
        parse_column(column).map(Self::new)
    }

    pub fn with_content(mut self, group: ColumnGroup) -> Self {
        self.content.push(group);
        self
    }

    pub fn with_child(mut self, child: KeyLevel) -> Self {
        self.children.push(child);
        self
    }

    /// True when the grouping column is itself reconciled as content, in which
    /// case no separate key cell is written for this level.
    pub fn reconciles_own_column(&self) -> bool {
        self.content.iter().any(|g| g.columns.contains(&self.column))
    }

    /// Every column this level and its descendants touch, in tree order.
    pub fn columns(&self) -> Vec<ColumnRef> {
        let mut out = vec![self.column];
        for group in &self.content {
            out.extend(group.columns.iter().copied());
        }
        for child in &self.children {
            out.extend(child.columns());
        }
        out
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

pub fn parse_column(input: &str) -> Result<ColumnRef, RedlineError> {
    ColumnRef::parse(input).map_err(RedlineError::InvalidColumn)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Order in which a universe's values are laid out in output rows.
#[derive(Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// New-side values in first-seen row order, then original-only values in
    /// their first-seen order.
    #[default]
    FirstSeen,
    /// Natural `CellValue` order (booleans, numbers, then text).
    Sorted,
    #[serde(skip)]
    Custom(fn(&CellValue, &CellValue) -> Ordering),
}

impl OrderingPolicy {
    /// Reorder values gathered in first-seen order. Sorting is stable.
    pub fn apply(&self, values: &mut [&CellValue]) {
        match self {
            Self::FirstSeen => {}
            Self::Sorted => values.sort(),
            Self::Custom(cmp) => values.sort_by(|a, b| cmp(a, b)),
        }
    }
}

impl fmt::Debug for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstSeen => write!(f, "FirstSeen"),
            Self::Sorted => write!(f, "Sorted"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Where the original document is searched for a block's counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// First match anywhere in the sheet, regardless of ancestry.
    #[default]
    Global,
    /// Only within the rows of the parent block's original counterpart.
    WithinParent,
}

impl fmt::Display for MatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::WithinParent => write!(f, "within_parent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

pub const DEFAULT_ADDED_COLOR: u32 = 0x00FF00;
pub const DEFAULT_REMOVED_COLOR: u32 = 0xFF0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default = "default_added_color", deserialize_with = "de_hex_color")]
    pub added_color: u32,
    #[serde(default = "default_removed_color", deserialize_with = "de_hex_color")]
    pub removed_color: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            added_color: DEFAULT_ADDED_COLOR,
            removed_color: DEFAULT_REMOVED_COLOR,
        }
    }
}

impl StyleConfig {
    /// Added: coloured. Removed: coloured and struck through. Unchanged: plain.
    pub fn format_for(&self, status: Status) -> CellFormat {
        match status {
            Status::Unchanged => CellFormat::default(),
            Status::Added => CellFormat {
                font_color: Some(self.added_color),
                ..CellFormat::default()
            },
            Status::Removed => CellFormat {
                font_color: Some(self.removed_color),
                strikethrough: true,
                ..CellFormat::default()
            },
        }
    }
}

fn default_added_color() -> u32 {
    DEFAULT_ADDED_COLOR
}

fn default_removed_color() -> u32 {
    DEFAULT_REMOVED_COLOR
}

/// Parse `RRGGBB` (optionally prefixed with `#`).
pub fn parse_hex_color(input: &str) -> Option<u32> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn de_hex_color<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_hex_color(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{s}', expected RRGGBB")))
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RedlineConfig {
    pub fn new(name: &str, root: KeyLevel) -> Self {
        Self {
            name: name.to_string(),
            ordering: OrderingPolicy::default(),
            match_scope: MatchScope::default(),
            dedupe_root_keys: false,
            style: StyleConfig::default(),
            root,
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, RedlineError> {
        let config: RedlineConfig =
            toml::from_str(input).map_err(|e| RedlineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not depend on any document.
    pub fn validate(&self) -> Result<(), RedlineError> {
        let mut owners: HashMap<ColumnRef, ColumnRef> = HashMap::new();
        validate_level(&self.root, &mut Vec::new(), &mut owners)
    }

    /// Fail if any configured column lies beyond `max_col`.
    pub fn validate_extent(&self, sheet: &str, max_col: usize) -> Result<(), RedlineError> {
        match self.root.columns().into_iter().find(|c| c.index() > max_col) {
            Some(column) => Err(RedlineError::ColumnOutOfRange {
                sheet: sheet.to_string(),
                column: column.letters(),
                max_col,
            }),
            None => Ok(()),
        }
    }
}

/// `owners` maps every claimed column to the grouping column of the level
/// that claimed it. A column may be claimed once, except that a level's own
/// grouping column may reappear in that level's content.
fn validate_level(
    level: &KeyLevel,
    ancestors: &mut Vec<ColumnRef>,
    owners: &mut HashMap<ColumnRef, ColumnRef>,
) -> Result<(), RedlineError> {
    if ancestors.contains(&level.column) {
        return Err(RedlineError::ConfigValidation(format!(
            "level column {} is not distinct from an ancestor level",
            level.column
        )));
    }
    claim(owners, level.column, level.column)?;

    let mut own_column_reused = false;
    for (i, group) in level.content.iter().enumerate() {
        if group.columns.is_empty() {
            return Err(RedlineError::ConfigValidation(format!(
                "level {}: content group {} is empty",
                level.column,
                i + 1
            )));
        }
        for &column in &group.columns {
            if column == level.column && !own_column_reused {
                own_column_reused = true;
                continue;
            }
            claim(owners, column, level.column)?;
        }
    }

    ancestors.push(level.column);
    for child in &level.children {
        validate_level(child, ancestors, owners)?;
    }
    ancestors.pop();
    Ok(())
}

fn claim(
    owners: &mut HashMap<ColumnRef, ColumnRef>,
    column: ColumnRef,
    level: ColumnRef,
) -> Result<(), RedlineError> {
    if let Some(owner) = owners.insert(column, level) {
        return Err(RedlineError::ConfigValidation(format!(
            "column {column} is used by level {owner} and again by level {level}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
