use std::fmt;

#[derive(Debug)]
pub enum RedlineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty group, column reused in the tree, etc.).
    ConfigValidation(String),
    /// A column reference that is neither a letter nor a positive number.
    InvalidColumn(String),
    /// A configured column lies outside a sheet's extent.
    ColumnOutOfRange { sheet: String, column: String, max_col: usize },
    /// The output document rejected a sheet.
    Output(String),
}

impl fmt::Display for RedlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidColumn(msg) => write!(f, "invalid column: {msg}"),
            Self::ColumnOutOfRange { sheet, column, max_col } => {
                write!(f, "sheet '{sheet}': column {column} is outside the sheet extent (max column {max_col})")
            }
            Self::Output(msg) => write!(f, "output error: {msg}"),
        }
    }
}

impl std::error::Error for RedlineError {}
