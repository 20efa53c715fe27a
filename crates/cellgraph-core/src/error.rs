//! Error types for cellgraph-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised by sheet operations.
///
/// Every variant aborts the operation that raised it before anything is
/// mutated. Computational failures inside formulas are not errors in this
/// sense; they travel as [`CellError`](crate::CellError) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Position outside the sheet's address space
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Malformed formula text
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// The edit would introduce a reference cycle
    #[error("Circular dependency detected involving cell {0}")]
    CircularDependency(String),
}
