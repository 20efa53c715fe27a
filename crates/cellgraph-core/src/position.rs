//! Cell position and printable size types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell position (e.g., "A1", "B2")
///
/// Positions are 0-based internally and rendered in A1 notation, where columns
/// are uppercase letters (A=0, B=1, ..., Z=25, AA=26) and rows are 1-based.
/// A `Position` may hold coordinates outside the sheet; use
/// [`Position::is_valid`] before addressing a cell with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0)
    pub col: u32,
}

impl Position {
    /// Create a new position
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Whether the position lies inside the sheet's address space
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation
    ///
    /// Column letters must be uppercase. The result is always valid.
    ///
    /// # Examples
    /// ```
    /// use cellgraph_core::Position;
    ///
    /// let pos = Position::parse("A1").unwrap();
    /// assert_eq!(pos, Position::new(0, 0));
    ///
    /// let pos = Position::parse("AB12").unwrap();
    /// assert_eq!(pos, Position::new(11, 27));
    ///
    /// assert!(Position::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let pos = Self::parse_unchecked(s)?;
        if !pos.is_valid() {
            return Err(Error::InvalidPosition(format!("'{}' is out of range", s)));
        }
        Ok(pos)
    }

    /// Parse A1-style notation without checking the sheet bounds.
    ///
    /// Only the syntax is checked: letters, then a 1-based row number, both
    /// fitting in `u32`. Used by the formula parser, where a reference past the
    /// edge of the sheet is legal text that evaluates to `#REF!`.
    pub fn parse_unchecked(s: &str) -> Result<Self> {
        let letters_end = s
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(s.len());

        if letters_end == 0 {
            return Err(Error::InvalidPosition(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..letters_end])?;

        let row_str = &s[letters_end..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPosition(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidPosition(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in A1 notation
        if row == 0 {
            return Err(Error::InvalidPosition(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert uppercase column letters to an index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidPosition("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidPosition(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c as u64 - 'A' as u64 + 1);
            if col > u32::MAX as u64 {
                return Err(Error::InvalidPosition(format!(
                    "column '{}' is too large",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Dimensions of the printable area of a sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub rows: u32,
    pub cols: u32,
}

impl Size {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }
}
