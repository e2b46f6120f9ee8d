//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value displayed by a cell
//! - [`CellContent`] - Raw user input classified as formula, number or text
//! - [`CellAddress`] - A cell's location (e.g., "D9")
//! - [`CellRange`] - A range of cells (e.g., "D2:D8")
//! - [`Cell`] and [`CellStore`] - Cell records and the sparse store holding them

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use storage::{Cell, CellStore};
pub use value::{parse_leading_number, CellContent, CellValue};
