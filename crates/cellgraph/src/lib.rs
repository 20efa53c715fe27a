//! # cellgraph
//!
//! An in-memory spreadsheet engine: a grid of cells holding text or formulas,
//! kept consistent through a dependency graph.
//!
//! - Every edit is checked for reference cycles before anything changes
//! - Formula results are cached and recomputed lazily after an edit
//! - Cells referenced by formulas exist as empty placeholders until cleared
//!   of all references
//!
//! ## Example
//!
//! ```rust
//! use cellgraph::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! let a1 = Position::parse("A1").unwrap();
//! let b1 = Position::parse("B1").unwrap();
//!
//! sheet.set_cell(a1, "5").unwrap();
//! sheet.set_cell(b1, "=A1+1").unwrap();
//! assert_eq!(sheet.get_cell(b1).unwrap().unwrap().value(), CellValue::Number(6.0));
//!
//! // Cycles are rejected and leave the sheet untouched
//! assert!(matches!(
//!     sheet.set_cell(a1, "=B1"),
//!     Err(Error::CircularDependency(_))
//! ));
//! assert_eq!(sheet.get_cell(a1).unwrap().unwrap().text(), "5");
//! ```

mod arena;
pub mod cell;
mod graph;
pub mod prelude;
pub mod sheet;

pub use arena::CellId;
pub use cell::{Cell, CellContent, FormulaCell};
pub use sheet::{CellView, Sheet};

// Re-export core types
pub use cellgraph_core::{
    CellError, CellValue, Error, Position, Result, Size, ESCAPE_SIGN, FORMULA_SIGN, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use cellgraph_formula::{CellLookup, Formula, FormulaError, FormulaExpr, FormulaValue};
