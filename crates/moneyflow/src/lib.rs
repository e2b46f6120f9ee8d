//! # moneyflow
//!
//! The Money Flow sheet: a small income and expense grid whose formula
//! cells are recalculated after every edit.
//!
//! ## Features
//!
//! - Cell store with literal and formula cells
//! - Formula evaluation: `+ - * /`, parentheses, cell references and
//!   `SUM`/`AVERAGE`/`MIN`/`MAX`/`COUNT` over ranges
//! - Full or dependency-driven recalculation with circular reference
//!   detection
//! - The seed sheet used as initial state and reset target
//!
//! ## Example
//!
//! ```rust
//! use moneyflow::prelude::*;
//!
//! let mut sheet = Sheet::seeded();
//! assert_eq!(sheet.get_at("D9").unwrap().value, CellValue::Number(11700.0));
//!
//! // Edits recalculate every formula that reads them
//! sheet.edit("E4", "500").unwrap();
//! assert_eq!(sheet.get_at("F4").unwrap().value, CellValue::Number(2500.0));
//! assert_eq!(sheet.get_at("F9").unwrap().value, CellValue::Number(10770.0));
//!
//! // Copy-on-write edits leave the original alone
//! let preview = sheet.with_edit("D2", "=D4*2").unwrap();
//! assert_eq!(preview.get_at("D2").unwrap().value, CellValue::Number(6000.0));
//! assert_eq!(sheet.get_at("D2").unwrap().value, CellValue::Number(1500.0));
//! ```

pub mod calculation;
pub mod prelude;
pub mod seed;
pub mod sheet;

pub use calculation::{RecalcMode, RecalcOptions, RecalcStats};
pub use seed::{seed_inputs, seed_store, SEED_CELL_COUNT};
pub use sheet::Sheet;

// Re-export core types
pub use moneyflow_core::{
    Cell, CellAddress, CellContent, CellRange, CellStore, CellValue, Error, Result,
};

// Re-export formula types
pub use moneyflow_formula::{
    evaluate_formula, parse_formula, try_evaluate_formula, FormulaError, FormulaExpr,
    FormulaResult,
};
