//! # moneyflow-core
//!
//! Core data structures for the moneyflow spreadsheet engine.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellValue`] and [`CellContent`] - Displayed values and classified input
//! - [`CellStore`] - The sparse map of [`Cell`] records behind a sheet
//!
//! ## Example
//!
//! ```rust
//! use moneyflow_core::{CellStore, CellValue};
//!
//! let mut store = CellStore::new();
//! store.set_at("B2", "Coffee sales").unwrap();
//! store.set_at("D2", "1500").unwrap();
//! store.set_at("F2", "=D2-E2").unwrap();
//!
//! assert_eq!(store.get_at("D2").unwrap().value, CellValue::Number(1500.0));
//! assert!(store.get_at("F2").unwrap().is_formula());
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{
    parse_leading_number, Cell, CellAddress, CellContent, CellRange, CellRangeIterator, CellStore,
    CellValue,
};
pub use error::{Error, Result};

/// Maximum number of rows addressable in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns addressable in a sheet
pub const MAX_COLS: u16 = 16_384;
