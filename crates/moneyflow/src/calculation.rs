//! Sheet recalculation engine
//!
//! Keeps the cached `value` of every formula cell in step with the raw
//! contents of the store, either by re-evaluating every formula after an
//! edit or by following the dependency graph from the edited cell.
//!
//! # Example
//!
//! ```rust
//! use moneyflow::prelude::*;
//!
//! let mut sheet = Sheet::with_options(RecalcOptions::incremental());
//! sheet.edit("A1", "5").unwrap();
//! sheet.edit("A2", "=A1*2").unwrap();
//!
//! let stats = sheet.edit("A1", "7").unwrap();
//! assert_eq!(stats.cells_calculated, 1);
//! assert_eq!(sheet.get_at("A2").unwrap().value, CellValue::Number(14.0));
//! ```

use moneyflow_core::{CellAddress, CellStore, CellValue};
use moneyflow_formula::{parse_formula, DependencyGraph, EvaluationContext, FormulaError};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Ranges larger than this are not expanded into the dependency graph; the
/// formulas reading them are recalculated after every edit instead.
const MAX_TRACKED_RANGE_CELLS: u64 = 65_536;

/// How formulas are brought up to date after an edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecalcMode {
    /// Re-evaluate every formula cell on every edit
    #[default]
    Full,
    /// Re-evaluate only the edited cell and the formulas downstream of it
    Incremental,
}

/// Options for sheet recalculation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecalcOptions {
    /// Recalculation strategy (default: full)
    pub mode: RecalcMode,
}

impl RecalcOptions {
    /// Options for full recalculation
    pub fn full() -> Self {
        Self {
            mode: RecalcMode::Full,
        }
    }

    /// Options for dependency-driven recalculation
    pub fn incremental() -> Self {
        Self {
            mode: RecalcMode::Incremental,
        }
    }
}

/// Statistics from a recalculation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecalcStats {
    /// Total number of formula cells in the store
    pub formula_count: usize,
    /// Number of formula cells evaluated in this run
    pub cells_calculated: usize,
    /// Number of formula cells that could not resolve because of a cycle
    pub circular_references: usize,
    /// Addresses of those cells, in row-major order
    pub circular_cells: Vec<CellAddress>,
    /// Number of formula cells whose evaluation failed for another reason
    pub errors: usize,
}

impl RecalcStats {
    /// Whether every evaluated formula produced a value
    pub fn is_clean(&self) -> bool {
        self.circular_references == 0 && self.errors == 0
    }
}

/// The recalculation engine
///
/// Owned by a [`Sheet`](crate::Sheet). In incremental mode it keeps the
/// dependency graph of the store's formulas across edits.
#[derive(Debug, Clone, Default)]
pub(crate) struct CalculationEngine {
    options: RecalcOptions,
    /// Formula cell → the cells it reads
    dependency_graph: DependencyGraph,
    /// Formulas reading a range too large to track
    untracked_cells: BTreeSet<CellAddress>,
}

impl CalculationEngine {
    pub(crate) fn new(options: RecalcOptions) -> Self {
        Self {
            options,
            dependency_graph: DependencyGraph::new(),
            untracked_cells: BTreeSet::new(),
        }
    }

    pub(crate) fn options(&self) -> &RecalcOptions {
        &self.options
    }

    /// Recalculate every formula cell, rebuilding the dependency graph when
    /// running incrementally
    pub(crate) fn calculate_all(&mut self, store: &mut CellStore) -> RecalcStats {
        if self.options.mode == RecalcMode::Incremental {
            self.rebuild_graph(store);
        }

        let order: Vec<CellAddress> = store.formula_cells().map(|(cell, _)| cell).collect();
        debug!(
            mode = ?self.options.mode,
            formulas = order.len(),
            "recalculating all formulas"
        );
        calculate_cells(store, &order)
    }

    /// Bring formulas up to date after `edited` changed
    pub(crate) fn calculate_after_edit(
        &mut self,
        store: &mut CellStore,
        edited: CellAddress,
    ) -> RecalcStats {
        match self.options.mode {
            RecalcMode::Full => self.calculate_all(store),
            RecalcMode::Incremental => {
                self.track_cell(store, edited);

                let mut order = self.dependency_graph.get_recalc_order(&[edited]);
                let untracked: Vec<CellAddress> = self
                    .untracked_cells
                    .iter()
                    .copied()
                    .filter(|cell| !order.contains(cell))
                    .collect();
                order.extend(untracked);
                order.retain(|&cell| store.cell(cell).map_or(false, |c| c.is_formula()));

                debug!(
                    cell = %edited,
                    formulas = order.len(),
                    "recalculating downstream formulas"
                );
                calculate_cells(store, &order)
            }
        }
    }

    fn rebuild_graph(&mut self, store: &CellStore) {
        self.dependency_graph.clear();
        self.untracked_cells.clear();

        let formula_cells: Vec<CellAddress> =
            store.formula_cells().map(|(cell, _)| cell).collect();
        for cell in formula_cells {
            self.track_cell(store, cell);
        }
        trace!(
            tracked = self.dependency_graph.formula_count(),
            untracked = self.untracked_cells.len(),
            "dependency graph rebuilt"
        );
    }

    /// Refresh the graph links for one cell from its current content
    fn track_cell(&mut self, store: &CellStore, cell: CellAddress) {
        self.untracked_cells.remove(&cell);

        let formula = match store.cell(cell).and_then(|c| c.formula_text()) {
            Some(formula) => formula,
            None => {
                self.dependency_graph.clear_precedents(cell);
                return;
            }
        };

        let ast = match parse_formula(formula) {
            Ok(ast) => ast,
            Err(e) => {
                // Evaluates to an error no matter what it reads
                trace!(cell = %cell, error = %e, "formula does not parse");
                self.dependency_graph.clear_precedents(cell);
                return;
            }
        };

        let ranges = ast.referenced_ranges();
        if ranges
            .iter()
            .any(|range| range.cell_count() > MAX_TRACKED_RANGE_CELLS)
        {
            self.dependency_graph.clear_precedents(cell);
            self.untracked_cells.insert(cell);
            return;
        }

        self.dependency_graph
            .set_precedents(cell, ranges.iter().flat_map(|range| range.cells()));
    }
}

/// Evaluate `cells` against the store as it is now, then write the results
///
/// All evaluation happens before any result is written, so every formula
/// reads the raw post-edit contents.
fn calculate_cells(store: &mut CellStore, cells: &[CellAddress]) -> RecalcStats {
    let mut stats = RecalcStats {
        formula_count: store.formula_cells().count(),
        ..RecalcStats::default()
    };

    let results: Vec<(CellAddress, Result<f64, FormulaError>)> = {
        let ctx = EvaluationContext::new(store);
        cells
            .iter()
            .map(|&cell| (cell, ctx.evaluate_cell(cell)))
            .collect()
    };

    for (cell, result) in results {
        let value = match result {
            Ok(value) => value,
            Err(e) if e.is_circular() => {
                warn!(cell = %cell, "circular reference; storing 0");
                stats.circular_references += 1;
                stats.circular_cells.push(cell);
                0.0
            }
            Err(e) => {
                debug!(cell = %cell, error = %e, "formula error; storing 0");
                stats.errors += 1;
                0.0
            }
        };

        if store.set_formula_result(cell, CellValue::Number(value)) {
            stats.cells_calculated += 1;
        }
    }

    stats.circular_cells.sort();
    trace!(
        calculated = stats.cells_calculated,
        circular = stats.circular_references,
        errors = stats.errors,
        "recalculation finished"
    );
    stats
}
