//! Prelude module - common imports for moneyflow users
//!
//! ```rust
//! use moneyflow::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    CellAddress,
    CellRange,
    CellStore,
    CellValue,

    // Error types
    Error,
    FormulaError,
    FormulaResult,
    Result,

    // Recalculation types
    RecalcMode,
    RecalcOptions,
    RecalcStats,

    // Main types
    Sheet,
};
