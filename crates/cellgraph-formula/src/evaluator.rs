//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use cellgraph_core::{CellError, CellValue, Position};

/// Result of evaluating a formula: a number, or the error token that stopped it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    Error(CellError),
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::Error(e) => CellValue::Error(e),
        }
    }
}

impl From<Result<f64, CellError>> for FormulaValue {
    fn from(result: Result<f64, CellError>) -> Self {
        match result {
            Ok(n) => FormulaValue::Number(n),
            Err(e) => FormulaValue::Error(e),
        }
    }
}

/// Read access to cell values during evaluation
///
/// Implementations return the current value of the cell at `pos`, or an empty
/// text value when no cell is stored there. Only valid positions are looked
/// up; references outside the sheet evaluate to `#REF!` without a lookup.
/// A lookup must never change the structure of the sheet it reads.
pub trait CellLookup {
    fn cell_value(&self, pos: Position) -> CellValue;
}

/// A lookup in which every cell is empty
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCells;

impl CellLookup for NoCells {
    fn cell_value(&self, _pos: Position) -> CellValue {
        CellValue::empty()
    }
}

/// Evaluate a formula AST
///
/// Errors are returned as [`FormulaValue::Error`]; the first error met in
/// left-to-right order wins. An error read from a referenced cell is forwarded
/// as-is.
pub fn evaluate(expr: &FormulaExpr, lookup: &dyn CellLookup) -> FormulaValue {
    eval_number(expr, lookup).into()
}

fn eval_number(expr: &FormulaExpr, lookup: &dyn CellLookup) -> Result<f64, CellError> {
    let result = match expr {
        FormulaExpr::Number(n) => *n,
        FormulaExpr::CellRef(pos) => return cell_number(*pos, lookup),
        FormulaExpr::UnaryOp { op, operand } => {
            let value = eval_number(operand, lookup)?;
            match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Negate => -value,
            }
        }
        FormulaExpr::BinaryOp { op, left, right } => {
            // Both sides are read before either error is reported, so every
            // referenced cell has a computed value once this one does.
            let left = eval_number(left, lookup);
            let right = eval_number(right, lookup);
            let (left, right) = (left?, right?);
            match op {
                BinaryOperator::Add => left + right,
                BinaryOperator::Subtract => left - right,
                BinaryOperator::Multiply => left * right,
                BinaryOperator::Divide => left / right,
            }
        }
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(CellError::Arithmetic)
    }
}

fn cell_number(pos: Position, lookup: &dyn CellLookup) -> Result<f64, CellError> {
    if !pos.is_valid() {
        return Err(CellError::Ref);
    }

    match lookup.cell_value(pos) {
        CellValue::Number(n) => Ok(n),
        CellValue::Error(e) => Err(e),
        CellValue::Text(s) => text_to_number(&s),
    }
}

/// Empty text reads as zero; other text must be a finite number in full.
fn text_to_number(s: &str) -> Result<f64, CellError> {
    if s.is_empty() {
        return Ok(0.0);
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CellError::Value),
    }
}
