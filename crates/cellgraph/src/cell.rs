//! Cell representation
//!
//! A [`Cell`] holds exactly one [`CellContent`] plus the dependency edges that
//! connect it to other cells of the same sheet. Edges are maintained by the
//! sheet; this module only knows how to build content from text and how to
//! produce values from it.

use std::cell::OnceCell;

use ahash::AHashSet;
use cellgraph_core::{CellValue, Position, Result, ESCAPE_SIGN, FORMULA_SIGN};
use cellgraph_formula::{CellLookup, Formula, FormulaValue};

use crate::arena::CellId;

/// What a cell currently holds
#[derive(Debug, Clone)]
pub enum CellContent {
    /// No content; the value is the empty string
    Empty,

    /// Literal text, stored as entered (escape marker included)
    Text(String),

    /// A formula and its memoized result
    Formula(FormulaCell),
}

/// A parsed formula together with its result cache
#[derive(Debug, Clone)]
pub struct FormulaCell {
    formula: Formula,
    cache: OnceCell<FormulaValue>,
}

impl FormulaCell {
    fn new(formula: Formula) -> Self {
        Self {
            formula,
            cache: OnceCell::new(),
        }
    }

    fn value(&self, lookup: &dyn CellLookup) -> FormulaValue {
        *self.cache.get_or_init(|| self.formula.evaluate(lookup))
    }
}

impl CellContent {
    /// Build content from the text a user typed into a cell.
    ///
    /// - `""` is [`CellContent::Empty`]
    /// - `=` followed by at least one character is a formula; a parse failure
    ///   is returned as [`Error::FormulaParse`](cellgraph_core::Error::FormulaParse)
    /// - anything else (including a lone `=`) is text
    pub fn from_text(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula = Formula::parse(expression)?;
                Ok(CellContent::Formula(FormulaCell::new(formula)))
            }
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    /// Text as it would be typed back in; formulas use their canonical form
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(cell) => {
                format!("{}{}", FORMULA_SIGN, cell.formula.expression())
            }
        }
    }

    /// Current value; formulas are evaluated only when their cache is empty
    pub fn value(&self, lookup: &dyn CellLookup) -> CellValue {
        match self {
            CellContent::Empty => CellValue::empty(),
            CellContent::Text(text) => {
                let text = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                CellValue::text(text)
            }
            CellContent::Formula(cell) => cell.value(lookup).into(),
        }
    }

    /// Positions read by this content, sorted and without duplicates
    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula(cell) => cell.formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    /// Non-formula content never needs recomputation
    pub fn is_cache_valid(&self) -> bool {
        match self {
            CellContent::Formula(cell) => cell.cache.get().is_some(),
            CellContent::Empty | CellContent::Text(_) => true,
        }
    }

    /// Drop the cached formula result. Returns whether a result was cached.
    pub fn invalidate_cache(&mut self) -> bool {
        match self {
            CellContent::Formula(cell) => cell.cache.take().is_some(),
            CellContent::Empty | CellContent::Text(_) => false,
        }
    }
}

/// A cell of a sheet: its content plus its edges in the dependency graph
#[derive(Debug)]
pub struct Cell {
    position: Position,
    pub(crate) content: CellContent,
    /// Cells this cell's formula reads
    pub(crate) outgoing: AHashSet<CellId>,
    /// Cells whose formulas read this cell
    pub(crate) incoming: AHashSet<CellId>,
}

impl Cell {
    /// A new cell without content or edges
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            content: CellContent::Empty,
            outgoing: AHashSet::new(),
            incoming: AHashSet::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Whether any formula reads this cell
    pub fn is_referenced(&self) -> bool {
        !self.incoming.is_empty()
    }

    /// Empty and unreferenced: nothing would be lost by dropping it
    pub(crate) fn is_unused(&self) -> bool {
        self.content.is_empty() && self.incoming.is_empty()
    }
}
