//! Column references.
//!
//! A `ColumnRef` is parsed once (from a letter like `"G"` or a 1-based number)
//! and then carried around as a validated index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest column a sheet can address (XFD).
pub const MAX_COLUMN: usize = 16_384;

/// A validated, 1-based column reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawColumn", into = "String")]
pub struct ColumnRef(usize);

impl ColumnRef {
    /// Create from a 1-based index. Returns None for 0 or beyond `MAX_COLUMN`.
    pub fn from_index(index: usize) -> Option<Self> {
        if (1..=MAX_COLUMN).contains(&index) {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Parse `"A"`, `"aa"`, or `"7"`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty column reference".to_string());
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = trimmed
                .parse()
                .map_err(|_| format!("column number '{trimmed}' is too large"))?;
            return Self::from_index(index)
                .ok_or_else(|| format!("column number {index} is out of range 1..={MAX_COLUMN}"));
        }

        if !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(format!("'{trimmed}' is not a column letter or number"));
        }

        let mut index: usize = 0;
        for b in trimmed.bytes() {
            index = index * 26 + (b.to_ascii_uppercase() - b'A' + 1) as usize;
            if index > MAX_COLUMN {
                return Err(format!("column '{trimmed}' is beyond {}", letters(MAX_COLUMN)));
            }
        }
        Self::from_index(index).ok_or_else(|| format!("invalid column '{trimmed}'"))
    }

    /// 1-based index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    pub fn letters(self) -> String {
        letters(self.0)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl From<ColumnRef> for String {
    fn from(col: ColumnRef) -> Self {
        col.letters()
    }
}

/// Serialized form: either `"G"` or `7`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Number(u64),
    Letters(String),
}

impl TryFrom<RawColumn> for ColumnRef {
    type Error = String;

    fn try_from(raw: RawColumn) -> Result<Self, Self::Error> {
        match raw {
            RawColumn::Number(n) => usize::try_from(n)
                .ok()
                .and_then(ColumnRef::from_index)
                .ok_or_else(|| format!("column number {n} is out of range 1..={MAX_COLUMN}")),
            RawColumn::Letters(s) => ColumnRef::parse(&s),
        }
    }
}

/// Convert a 1-based column index to Excel-style letter(s).
pub fn letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        assert_eq!(ColumnRef::parse("A").unwrap().index(), 1);
        assert_eq!(ColumnRef::parse("g").unwrap().index(), 7);
        assert_eq!(ColumnRef::parse("Z").unwrap().index(), 26);
        assert_eq!(ColumnRef::parse("AA").unwrap().index(), 27);
        assert_eq!(ColumnRef::parse("XFD").unwrap().index(), MAX_COLUMN);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(ColumnRef::parse("14").unwrap().index(), 14);
        assert!(ColumnRef::parse("0").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ColumnRef::parse("").is_err());
        assert!(ColumnRef::parse("A1").is_err());
        assert!(ColumnRef::parse("XFE").is_err());
    }

    #[test]
    fn test_letters_roundtrip_boundaries() {
        for (idx, s) in [(1, "A"), (26, "Z"), (27, "AA"), (52, "AZ"), (53, "BA"), (702, "ZZ"), (703, "AAA")] {
            assert_eq!(letters(idx), s);
            assert_eq!(ColumnRef::parse(s).unwrap().index(), idx);
        }
    }

    #[test]
    fn test_display_uses_letters() {
        let col = ColumnRef::from_index(13).unwrap();
        assert_eq!(col.to_string(), "M");
    }
}
