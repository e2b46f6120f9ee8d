//! Cell storage
//!
//! A sparse map from address to cell record. Only written cells are stored;
//! reading any other address yields the empty cell.

use std::collections::BTreeMap;

use super::{CellAddress, CellContent, CellRange, CellValue};
use crate::error::Result;

/// A single cell record: its displayed value and optional formula
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Literal value, or the last computed result for formula cells
    pub value: CellValue,
    /// Formula text including the leading `=`
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub formula: Option<String>,
}

impl Cell {
    /// A cell that was never written
    pub fn empty() -> Self {
        Self::default()
    }

    /// A literal cell
    pub fn literal<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            formula: None,
        }
    }

    /// A formula cell whose value has not been computed yet
    ///
    /// Until the next recalculation the value holds the formula text itself.
    pub fn formula<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        Self {
            value: CellValue::Text(text.clone()),
            formula: Some(text),
        }
    }

    /// Formula text, if the cell carries a non-empty formula
    pub fn formula_text(&self) -> Option<&str> {
        self.formula.as_deref().filter(|f| !f.is_empty())
    }

    /// Check if the cell carries a formula
    pub fn is_formula(&self) -> bool {
        self.formula_text().is_some()
    }
}

impl From<CellContent> for Cell {
    fn from(content: CellContent) -> Self {
        match content {
            CellContent::Formula(text) => Cell::formula(text),
            CellContent::Number(n) => Cell::literal(n),
            CellContent::Text(s) => Cell::literal(s),
        }
    }
}

/// Sparse cell store keyed by address
///
/// Iteration is row-major. The store is cheap to clone at the grid sizes it is
/// used for, and the calculation layer replaces it wholesale on each edit.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CellStore {
    cells: BTreeMap<CellAddress, Cell>,
}

impl CellStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell, or the empty cell if the address was never written
    pub fn get(&self, addr: CellAddress) -> Cell {
        self.cells.get(&addr).cloned().unwrap_or_default()
    }

    /// Get a stored cell by reference
    pub fn cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&addr)
    }

    /// Check if an address has been written
    pub fn contains(&self, addr: CellAddress) -> bool {
        self.cells.contains_key(&addr)
    }

    /// Store raw user input
    ///
    /// Input beginning with `=` becomes a formula; anything else is a literal
    /// number when it parses as one and text otherwise. Any input is accepted.
    pub fn set(&mut self, addr: CellAddress, raw: &str) {
        self.set_cell(addr, CellContent::parse(raw).into());
    }

    /// Store raw user input at an A1-style address
    pub fn set_at(&mut self, addr: &str, raw: &str) -> Result<CellAddress> {
        let addr = CellAddress::parse(addr)?;
        self.set(addr, raw);
        Ok(addr)
    }

    /// Get a cell at an A1-style address
    pub fn get_at(&self, addr: &str) -> Result<Cell> {
        Ok(self.get(CellAddress::parse(addr)?))
    }

    /// Store a complete cell record
    pub fn set_cell(&mut self, addr: CellAddress, cell: Cell) {
        self.cells.insert(addr, cell);
    }

    /// Overwrite the computed value of a formula cell
    ///
    /// Returns `false` (and changes nothing) when the cell is missing or is a
    /// literal, so literal input is never clobbered by a calculation.
    pub fn set_formula_result(&mut self, addr: CellAddress, value: CellValue) -> bool {
        match self.cells.get_mut(&addr) {
            Some(cell) if cell.is_formula() => {
                cell.value = value;
                true
            }
            _ => false,
        }
    }

    /// Remove a cell, returning it if present
    pub fn remove(&mut self, addr: CellAddress) -> Option<Cell> {
        self.cells.remove(&addr)
    }

    /// Remove every cell
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the store holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.cells.iter().map(|(addr, cell)| (*addr, cell))
    }

    /// Iterate over cells carrying a formula, yielding the formula text
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.cells
            .iter()
            .filter_map(|(addr, cell)| cell.formula_text().map(|f| (*addr, f)))
    }

    /// Smallest range from A1 covering every stored cell
    pub fn used_range(&self) -> Option<CellRange> {
        let max_row = self.cells.keys().map(|a| a.row).max()?;
        let max_col = self.cells.keys().map(|a| a.col).max()?;
        Some(CellRange::new(
            CellAddress::new(0, 0),
            CellAddress::new(max_row, max_col),
        ))
    }
}

impl FromIterator<(CellAddress, Cell)> for CellStore {
    fn from_iter<I: IntoIterator<Item = (CellAddress, Cell)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
