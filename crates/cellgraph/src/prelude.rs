//! Prelude module - common imports for cellgraph users
//!
//! ```rust
//! use cellgraph::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellError,
    CellValue,
    CellView,
    // Error types
    Error,
    Position,
    Result,
    // Main types
    Sheet,
    Size,
};
