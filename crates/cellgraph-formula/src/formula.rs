//! Parsed formula with its dependency list

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, CellLookup, FormulaValue};
use crate::parser::parse_formula;
use cellgraph_core::Position;

/// A parsed formula
///
/// Holds the AST together with the positions it reads, so the sheet can
/// build dependency edges without walking the tree again.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: FormulaExpr,
    referenced: Vec<Position>,
}

impl Formula {
    /// Parse expression text (without the leading `=`)
    pub fn parse(expression: &str) -> FormulaResult<Self> {
        let expr = parse_formula(expression)?;

        let mut referenced: Vec<Position> = expr
            .references()
            .into_iter()
            .filter(Position::is_valid)
            .collect();
        referenced.sort_unstable();
        referenced.dedup();

        Ok(Self { expr, referenced })
    }

    /// Evaluate against the given cell values
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> FormulaValue {
        evaluate(&self.expr, lookup)
    }

    /// Valid positions read by the formula, sorted and without duplicates
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }

    /// Canonical expression text (without the leading `=`)
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgraph_core::CellError;
    use pretty_assertions::assert_eq;

    fn canonical(text: &str) -> String {
        Formula::parse(text).unwrap().expression()
    }

    #[test]
    fn test_referenced_cells_sorted_and_unique() {
        let formula = Formula::parse("C1+A2+A1+C1+B1").unwrap();
        assert_eq!(
            formula.referenced_cells(),
            &[
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_referenced_cells_skip_out_of_range() {
        let formula = Formula::parse("A1+A99999").unwrap();
        assert_eq!(formula.referenced_cells(), &[Position::new(0, 0)]);
        assert_eq!(
            formula.evaluate(&crate::NoCells),
            FormulaValue::Error(CellError::Ref)
        );
    }

    #[test]
    fn test_canonical_drops_redundant_parentheses() {
        assert_eq!(canonical("((1))"), "1");
        assert_eq!(canonical(" 1 + 2 "), "1+2");
        assert_eq!(canonical("(1+2)+3"), "1+2+3");
        assert_eq!(canonical("1+(2+3)"), "1+2+3");
        assert_eq!(canonical("1+(2-3)"), "1+2-3");
        assert_eq!(canonical("(2*3)+1"), "2*3+1");
        assert_eq!(canonical("1*(2/3)"), "1*2/3");
        assert_eq!(canonical("-(A1)"), "-A1");
    }

    #[test]
    fn test_canonical_keeps_required_parentheses() {
        assert_eq!(canonical("(1+2)*3"), "(1+2)*3");
        assert_eq!(canonical("1-(2+3)"), "1-(2+3)");
        assert_eq!(canonical("1-(2-3)"), "1-(2-3)");
        assert_eq!(canonical("8/(4/2)"), "8/(4/2)");
        assert_eq!(canonical("8/(4*2)"), "8/(4*2)");
        assert_eq!(canonical("-(1+2)"), "-(1+2)");
        assert_eq!(canonical("2*(-3)"), "2*-3");
    }

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(canonical("1.50"), "1.5");
        assert_eq!(canonical("1e3"), "1000");
        assert_eq!(canonical(".25"), "0.25");
    }

    #[test]
    fn test_canonical_is_stable() {
        for text in ["1-(2-3)*A1", "-(B2+C3)/4", "((A1))+-+2", "A99999*2"] {
            let once = canonical(text);
            assert_eq!(canonical(&once), once);
        }
    }
}
