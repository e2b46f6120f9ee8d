//! The Money Flow sheet: a cell store kept recalculated after every edit

use crate::calculation::{CalculationEngine, RecalcOptions, RecalcStats};
use crate::seed::seed_store;
use moneyflow_core::{Cell, CellAddress, CellStore, Result};
use moneyflow_formula::FormulaResult;
use tracing::debug;

/// A single sheet of cells
///
/// Every mutating operation recalculates before returning, so formula cells
/// always show the value of their formula against the current contents.
#[derive(Debug, Clone)]
pub struct Sheet {
    store: CellStore,
    engine: CalculationEngine,
    last_stats: RecalcStats,
}

impl Sheet {
    /// Create an empty sheet with default options
    pub fn new() -> Self {
        Self::with_options(RecalcOptions::default())
    }

    /// Create an empty sheet with custom recalculation options
    pub fn with_options(options: RecalcOptions) -> Self {
        Self::from_store(CellStore::new(), options)
    }

    /// Create a sheet holding the Money Flow seed
    pub fn seeded() -> Self {
        Self::seeded_with_options(RecalcOptions::default())
    }

    /// Create a sheet holding the Money Flow seed with custom options
    pub fn seeded_with_options(options: RecalcOptions) -> Self {
        Self::from_store(seed_store(), options)
    }

    /// Wrap an existing store, recalculating it
    pub fn from_store(store: CellStore, options: RecalcOptions) -> Self {
        let mut sheet = Self {
            store,
            engine: CalculationEngine::new(options),
            last_stats: RecalcStats::default(),
        };
        sheet.recalculate();
        sheet
    }

    /// Recalculation options in effect
    pub fn options(&self) -> &RecalcOptions {
        self.engine.options()
    }

    /// The underlying store
    pub fn store(&self) -> &CellStore {
        &self.store
    }

    /// Statistics from the most recent recalculation
    pub fn last_stats(&self) -> &RecalcStats {
        &self.last_stats
    }

    /// Get a cell; never-written cells read as empty text
    pub fn get(&self, addr: CellAddress) -> Cell {
        self.store.get(addr)
    }

    /// Get a cell at an A1-style address
    pub fn get_at(&self, addr: &str) -> Result<Cell> {
        self.store.get_at(addr)
    }

    /// Store raw input at `addr` and recalculate
    ///
    /// Fails only when the address is malformed, in which case nothing
    /// changes.
    pub fn edit(&mut self, addr: &str, raw: &str) -> Result<RecalcStats> {
        let addr = CellAddress::parse(addr)?;
        Ok(self.edit_cell(addr, raw))
    }

    /// Store raw input at a parsed address and recalculate
    pub fn edit_cell(&mut self, addr: CellAddress, raw: &str) -> RecalcStats {
        debug!(cell = %addr, raw, "editing cell");
        self.store.set(addr, raw);
        let stats = self.engine.calculate_after_edit(&mut self.store, addr);
        self.last_stats = stats.clone();
        stats
    }

    /// Return a recalculated copy with one edit applied
    ///
    /// `self` is left untouched.
    pub fn with_edit(&self, addr: &str, raw: &str) -> Result<Sheet> {
        let mut next = self.clone();
        next.edit(addr, raw)?;
        Ok(next)
    }

    /// Restore the seed and recalculate
    pub fn reset(&mut self) -> RecalcStats {
        debug!("resetting sheet to seed");
        self.store = seed_store();
        self.recalculate()
    }

    /// Re-evaluate every formula cell
    pub fn recalculate(&mut self) -> RecalcStats {
        let stats = self.engine.calculate_all(&mut self.store);
        self.last_stats = stats.clone();
        stats
    }

    /// Evaluate formula text against this sheet, mapping errors to `0`
    pub fn evaluate_formula(&self, formula: &str) -> f64 {
        moneyflow_formula::evaluate_formula(formula, &self.store)
    }

    /// Evaluate formula text against this sheet
    pub fn try_evaluate_formula(&self, formula: &str) -> FormulaResult<f64> {
        moneyflow_formula::try_evaluate_formula(formula, &self.store)
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
