//! Dependency tracking for incremental recalculation

use moneyflow_core::CellAddress;
use std::collections::{HashMap, HashSet};

/// Dependency graph for formula cells
///
/// Tracks which cells each formula reads (precedents) and, inversely, which
/// formulas read each cell (dependents), so an edit only recomputes the
/// formulas downstream of it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: HashMap<CellAddress, HashSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: HashMap<CellAddress, HashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Replace everything `cell` depends on
    ///
    /// Cells that depend on `cell` are unaffected: they still read it,
    /// whatever it now contains.
    pub fn set_precedents<I>(&mut self, cell: CellAddress, precedents: I)
    where
        I: IntoIterator<Item = CellAddress>,
    {
        self.clear_precedents(cell);
        for precedent in precedents {
            self.add_dependency(precedent, cell);
        }
    }

    /// Remove the links from `cell` to the cells it reads
    pub fn clear_precedents(&mut self, cell: CellAddress) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get the changed cells and everything downstream of them, in an order
    /// where every cell comes after the cells it depends on
    ///
    /// Cells on a cycle are included once; their relative order is arbitrary.
    pub fn get_recalc_order(&self, changed: &[CellAddress]) -> Vec<CellAddress> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();

        for &cell in changed {
            self.topological_sort(cell, &mut result, &mut visited, &mut in_stack);
        }

        // Post-order puts dependents first
        result.reverse();
        result
    }

    /// Depth-first post-order walk from `start`, with an explicit stack so
    /// long chains do not exhaust the call stack
    fn topological_sort(
        &self,
        start: CellAddress,
        result: &mut Vec<CellAddress>,
        visited: &mut HashSet<CellAddress>,
        in_stack: &mut HashSet<CellAddress>,
    ) {
        if visited.contains(&start) || in_stack.contains(&start) {
            return;
        }

        in_stack.insert(start);
        let mut stack = vec![(start, self.get_dependents(start))];

        while let Some((cell, dependents)) = stack.last_mut() {
            match dependents.find(|d| !visited.contains(d) && !in_stack.contains(d)) {
                Some(next) => {
                    in_stack.insert(next);
                    stack.push((next, self.get_dependents(next)));
                }
                None => {
                    let cell = *cell;
                    stack.pop();
                    in_stack.remove(&cell);
                    visited.insert(cell);
                    result.push(cell);
                }
            }
        }
    }

    /// Number of cells with at least one precedent
    pub fn formula_count(&self) -> usize {
        self.precedents.len()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}
