//! A1-style cell references and rectangular ranges.

use crate::error::{Error, Result};
use std::fmt;

/// A single cell, 1-based column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// The cell immediately to the right.
    pub fn right(self) -> Self {
        Self::new(self.col + 1, self.row)
    }

    /// Parse A1 notation (e.g., "A1", "bc123").
    pub fn parse(cell: &str) -> Result<Self> {
        let cell = cell.trim().to_ascii_uppercase();
        let invalid = || Error::InvalidCellRef(cell.clone());

        // Find where letters end and digits begin
        let col_end = cell
            .chars()
            .position(|c| !c.is_ascii_uppercase())
            .ok_or_else(invalid)?;
        if col_end == 0 {
            return Err(invalid());
        }

        let col_str = &cell[..col_end];
        let row_str = &cell[col_end..];
        if !row_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        // A=1, B=2, ..., Z=26, AA=27
        let col = col_str.chars().try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)
        });
        let col = col.ok_or_else(invalid)?;

        let row: u32 = row_str.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

/// Convert a 1-based column index to letters (1 -> "A", 27 -> "AA").
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inclusive rectangle such as `A1:B3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellRef::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    /// Parse `A1:B3`; a lone reference is a one-cell range.
    pub fn parse(range: &str) -> Result<Self> {
        match range.split_once(':') {
            Some((a, b)) => Ok(Self::new(CellRef::parse(a)?, CellRef::parse(b)?)),
            None => {
                let cell = CellRef::parse(range)?;
                Ok(Self::new(cell, cell))
            }
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.col..=self.end.col).contains(&cell.col)
            && (self.start.row..=self.end.row).contains(&cell.row)
    }

    pub fn top_left(&self) -> CellRef {
        self.start
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
