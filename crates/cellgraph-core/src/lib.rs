//! # cellgraph-core
//!
//! Core data types shared by the cellgraph crates:
//! - [`Position`] and [`Size`] - Cell addressing (A1 notation) and printable area
//! - [`CellValue`] and [`CellError`] - Cell values, including first-class error tokens
//! - [`Error`] - Structural errors raised by sheet edits
//!
//! ## Example
//!
//! ```rust
//! use cellgraph_core::{CellValue, Position};
//!
//! let pos = Position::parse("B3").unwrap();
//! assert_eq!((pos.row, pos.col), (2, 1));
//! assert_eq!(pos.to_string(), "B3");
//!
//! assert_eq!(CellValue::Number(6.0).to_string(), "6");
//! ```

pub mod error;
pub mod position;
pub mod value;

pub use error::{Error, Result};
pub use position::{Position, Size};
pub use value::{CellError, CellValue};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u32 = 16_384;

/// Leading character marking the rest of a cell's text as a formula
pub const FORMULA_SIGN: char = '=';

/// Leading character forcing the rest of a cell's text to be read literally
pub const ESCAPE_SIGN: char = '\'';
