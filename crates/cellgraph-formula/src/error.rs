//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula
///
/// Evaluation never fails with this type: runtime failures are reported as
/// [`CellError`](cellgraph_core::CellError) tokens inside the result value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed cell reference
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl From<FormulaError> for cellgraph_core::Error {
    fn from(e: FormulaError) -> Self {
        cellgraph_core::Error::FormulaParse(e.to_string())
    }
}
