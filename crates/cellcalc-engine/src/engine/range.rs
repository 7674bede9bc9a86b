//! Rectangular cell ranges.
//!
//! A range is written as two corner identifiers (`B4:C5`) in any order and
//! is normalized to its top-left and bottom-right corners. Expansion lists
//! cells column by column: every row of the first column, then every row of
//! the next one.

use std::fmt;

use super::cell_ref::CellRef;
use super::error::EvalError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Build a normalized range from two corners given in any order.
    pub fn new(a: &CellRef, b: &CellRef) -> CellRange {
        CellRange {
            start: min_cell(a, b),
            end: max_cell(a, b),
        }
    }

    /// Parse a range like "A1:B5".
    pub fn parse(range: &str) -> Result<CellRange, EvalError> {
        let parts: Vec<&str> = range.split(':').collect();
        if parts.len() != 2 {
            return Err(EvalError::InvalidRange(range.to_string()));
        }
        let start = CellRef::from_str(parts[0].trim());
        let end = CellRef::from_str(parts[1].trim());
        match (start, end) {
            (Some(start), Some(end)) => Ok(CellRange::new(&start, &end)),
            _ => Err(EvalError::InvalidRange(range.to_string())),
        }
    }

    pub fn width(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// Number of cells, or None if it does not fit in a usize.
    pub fn cell_count(&self) -> Option<usize> {
        self.width().checked_mul(self.height())
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start.col..=self.end.col).contains(&cell.col)
            && (self.start.row..=self.end.row).contains(&cell.row)
    }

    /// Expand to individual cells, failing if there are more than `limit`.
    pub fn cells(&self, limit: usize) -> Result<Vec<CellRef>, EvalError> {
        let count = self.cell_count().unwrap_or(usize::MAX);
        if count > limit {
            return Err(EvalError::RangeTooLarge {
                range: self.to_string(),
                cells: count,
                limit,
            });
        }

        let mut cells = Vec::with_capacity(count);
        for col in self.start.col..=self.end.col {
            for row in self.start.row..=self.end.row {
                cells.push(CellRef::new(col, row));
            }
        }
        Ok(cells)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Upper-left corner of the rectangle spanned by `a` and `b`.
pub fn min_cell(a: &CellRef, b: &CellRef) -> CellRef {
    CellRef::new(a.col.min(b.col), a.row.min(b.row))
}

/// Bottom-right corner of the rectangle spanned by `a` and `b`.
pub fn max_cell(a: &CellRef, b: &CellRef) -> CellRef {
    CellRef::new(a.col.max(b.col), a.row.max(b.row))
}

/// List every cell between two corner identifiers, at most `limit` of them.
pub fn range_to_cell_list(start: &str, end: &str, limit: usize) -> Result<Vec<CellRef>, EvalError> {
    let a = CellRef::from_str(start).ok_or_else(|| EvalError::InvalidCellRef(start.to_string()))?;
    let b = CellRef::from_str(end).ok_or_else(|| EvalError::InvalidCellRef(end.to_string()))?;
    CellRange::new(&a, &b).cells(limit)
}
