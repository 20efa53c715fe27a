//! Formula Abstract Syntax Tree types

use cellgraph_core::Position;
use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference (may point outside the sheet)
    CellRef(Position),

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

impl BinaryOperator {
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }

    /// `a - (b - c)` and `a / (b / c)` keep their parentheses
    fn is_right_sensitive(self) -> bool {
        matches!(self, BinaryOperator::Subtract | BinaryOperator::Divide)
    }
}

impl UnaryOperator {
    pub fn symbol(self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl FormulaExpr {
    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::CellRef(_) => ATOM_PRECEDENCE,
            FormulaExpr::UnaryOp { .. } => UNARY_PRECEDENCE,
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
        }
    }

    /// Every cell reference in the expression, in left-to-right order,
    /// duplicates and out-of-range positions included.
    pub fn references(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                FormulaExpr::Number(_) => {}
                FormulaExpr::CellRef(pos) => refs.push(*pos),
                FormulaExpr::UnaryOp { operand, .. } => stack.push(operand),
                FormulaExpr::BinaryOp { left, right, .. } => {
                    // Right first so the left subtree is visited first
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        refs
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Canonical text: the expression without the leading `=`, using the fewest
/// parentheses that preserve the tree.
impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n),
            FormulaExpr::CellRef(pos) => write!(f, "{}", pos),
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_child(f, operand.precedence() < UNARY_PRECEDENCE)
            }
            FormulaExpr::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                left.fmt_child(f, left.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                right.fmt_child(
                    f,
                    right.precedence() < prec
                        || (right.precedence() == prec && op.is_right_sensitive()),
                )
            }
        }
    }
}
