//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//! Columns use bijective base-26 throughout, so "Z" is followed by "AA".
//!
//! # Examples
//!
//! ```
//! use cellcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::config::GridBounds;
use super::error::EvalError;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

/// A decomposed identifier: column letters, zero-based column index and
/// one-based row number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub column: String,
    pub x: usize,
    pub y: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { col, row }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let col = letters_to_column_index(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        column_index_to_letters(col)
    }

    /// One-based row number as it appears in the identifier.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            column: column_index_to_letters(self.col),
            x: self.col,
            y: self.row_number(),
        }
    }

    /// The cell above, or the same cell on the first row.
    pub fn up(&self) -> CellRef {
        CellRef::new(self.col, self.row.saturating_sub(1))
    }

    /// The cell below, clamped to the last row of `bounds`.
    pub fn down(&self, bounds: &GridBounds) -> CellRef {
        let last = bounds.num_rows.saturating_sub(1);
        CellRef::new(self.col, (self.row + 1).min(last))
    }

    /// The cell to the left, or the same cell in the first column.
    pub fn left(&self) -> CellRef {
        CellRef::new(self.col.saturating_sub(1), self.row)
    }

    /// The cell to the right, clamped to the last column of `bounds`.
    pub fn right(&self, bounds: &GridBounds) -> CellRef {
        let last = bounds.num_cols.saturating_sub(1);
        CellRef::new((self.col + 1).min(last), self.row)
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

/// Bijective base-26 encoding of a column index (0 -> "A", 26 -> "AA").
pub fn column_index_to_letters(index: usize) -> String {
    let mut result = String::new();
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Inverse of [`column_index_to_letters`]. Only uppercase ASCII letters are accepted.
pub fn letters_to_column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = (c - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

/// Decompose an identifier like "AB12" into its column letters and coordinates.
pub fn cell_to_coordinate(id: &str) -> Result<Coordinate, EvalError> {
    CellRef::from_str(id)
        .map(|cell| cell.coordinate())
        .ok_or_else(|| EvalError::InvalidCellRef(id.to_string()))
}

/// Render a zero-based column index and one-based row as an identifier.
/// Row 0 is clamped to 1.
pub fn coordinate_to_cell(x: usize, y: usize) -> String {
    format!("{}{}", column_index_to_letters(x), y.max(1))
}

impl std::str::FromStr for CellRef {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| EvalError::InvalidCellRef(s.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}
