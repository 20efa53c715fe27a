//! # cellgraph-formula
//!
//! Formula parser and evaluator for cellgraph.
//!
//! This crate provides:
//! - Formula parsing (expression text → AST)
//! - Formula evaluation against a [`CellLookup`] context
//! - Referenced-cell extraction for dependency tracking
//! - Canonical expression text with minimal parentheses
//!
//! ## Example
//!
//! ```rust
//! use cellgraph_formula::{Formula, FormulaValue, NoCells};
//!
//! let formula = Formula::parse("(1+2)*3").unwrap();
//! assert_eq!(formula.evaluate(&NoCells), FormulaValue::Number(9.0));
//! assert_eq!(formula.expression(), "(1+2)*3");
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellLookup, FormulaValue, NoCells};
pub use formula::Formula;
pub use parser::parse_formula;
