//! Formula evaluator
//!
//! Evaluates formula ASTs against a [`CellStore`]. Referenced formula cells
//! are resolved on demand. An in-progress set turns self-reference into
//! [`FormulaError::CircularReference`], and evaluation deeper than
//! [`MAX_EVALUATION_DEPTH`] levels (a long chain of cells each reading the
//! next) stops with [`FormulaError::NestingLimit`] instead of exhausting the
//! stack.

use crate::ast::{FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::parse_formula;
use ahash::{AHashMap, AHashSet};
use moneyflow_core::{parse_leading_number, CellAddress, CellRange, CellStore};
use std::cell::{Cell, RefCell};
use std::sync::OnceLock;

/// Deepest expression nesting one evaluation may reach, counting every
/// expression node on the path through referenced formula cells
pub const MAX_EVALUATION_DEPTH: usize = 512;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Context for formula evaluation
///
/// One context reads one store snapshot. Formula cells it resolves are
/// memoized, so a context should not outlive edits to the store it borrows
/// (the borrow checker enforces this).
pub struct EvaluationContext<'a> {
    store: &'a CellStore,
    /// Formula cells currently being resolved
    in_progress: RefCell<AHashSet<CellAddress>>,
    /// Resolved formula cells
    resolved: RefCell<AHashMap<CellAddress, f64>>,
    /// Current expression nesting
    depth: Cell<usize>,
}

/// Holds one level of evaluation depth until dropped
struct DepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context over a store
    pub fn new(store: &'a CellStore) -> Self {
        Self {
            store,
            in_progress: RefCell::new(AHashSet::new()),
            resolved: RefCell::new(AHashMap::new()),
            depth: Cell::new(0),
        }
    }

    /// The store this context reads
    pub fn store(&self) -> &'a CellStore {
        self.store
    }

    /// Evaluate formula text that belongs to no particular cell
    ///
    /// Text without a leading `=` is read as a plain number (its leading
    /// numeric prefix), or 0 when it has none.
    pub fn evaluate_text(&self, text: &str) -> FormulaResult<f64> {
        if !text.starts_with('=') {
            return Ok(parse_leading_number(text).unwrap_or(0.0));
        }

        let ast = parse_formula(text)?;
        evaluate(&ast, self)
    }

    /// Evaluate the cell at `addr`
    ///
    /// Formula cells report their own errors. Literal cells yield their
    /// numeric value; missing and non-numeric cells yield 0.
    pub fn evaluate_cell(&self, addr: CellAddress) -> FormulaResult<f64> {
        let formula = self.store.cell(addr).and_then(|cell| cell.formula_text());
        match formula {
            Some(text) => self.resolve_formula_cell(addr, text),
            None => Ok(self.reference_value(addr)?.unwrap_or(0.0)),
        }
    }

    /// Numeric value of a referenced cell
    ///
    /// `None` when the cell is missing or holds text without a leading
    /// number. A referenced formula that fails to evaluate counts as 0; only
    /// circular references and the nesting limit propagate, since the whole
    /// chain is unresolvable.
    pub fn reference_value(&self, addr: CellAddress) -> FormulaResult<Option<f64>> {
        let cell = match self.store.cell(addr) {
            Some(cell) => cell,
            None => return Ok(None),
        };

        match cell.formula_text() {
            Some(text) => match self.resolve_formula_cell(addr, text) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.propagates() => Err(e),
                Err(e) => {
                    tracing::debug!("formula in {} evaluated to 0: {}", addr, e);
                    Ok(Some(0.0))
                }
            },
            None => Ok(cell.value.coerce_number()),
        }
    }

    /// Numeric values of the stored cells in a range, row by row
    pub fn range_values(&self, range: &CellRange) -> FormulaResult<Vec<f64>> {
        // Walk whichever is smaller: the range or the store
        let addrs: Vec<CellAddress> = if range.cell_count() > self.store.len() as u64 {
            self.store
                .iter()
                .map(|(addr, _)| addr)
                .filter(|addr| range.contains(addr))
                .collect()
        } else {
            range
                .cells()
                .filter(|addr| self.store.contains(*addr))
                .collect()
        };

        let mut values = Vec::with_capacity(addrs.len());
        for addr in addrs {
            if let Some(value) = self.reference_value(addr)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn enter(&self) -> FormulaResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= MAX_EVALUATION_DEPTH {
            return Err(FormulaError::NestingLimit(MAX_EVALUATION_DEPTH));
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    fn resolve_formula_cell(&self, addr: CellAddress, text: &str) -> FormulaResult<f64> {
        let cached = self.resolved.borrow().get(&addr).copied();
        if let Some(value) = cached {
            return Ok(value);
        }

        if !self.in_progress.borrow_mut().insert(addr) {
            return Err(FormulaError::CircularReference(addr.to_string()));
        }
        let result = self.evaluate_text(text);
        self.in_progress.borrow_mut().remove(&addr);

        if let Ok(value) = result {
            self.resolved.borrow_mut().insert(addr, value);
        }
        result
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<f64> {
    let _guard = ctx.enter()?;

    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(addr) => Ok(ctx.reference_value(*addr)?.unwrap_or(0.0)),

        FormulaExpr::RangeRef(range) => Err(FormulaError::Evaluation(format!(
            "Range {} can only be used as a function argument",
            range
        ))),

        FormulaExpr::BinaryOp { op, left, right } => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            Ok(op.apply(l, r))
        }

        FormulaExpr::UnaryOp { op, operand } => {
            let n = evaluate(operand, ctx)?;
            match op {
                UnaryOperator::Negate => Ok(-n),
            }
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<f64> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    let mut values = Vec::new();
    for arg in args {
        match arg {
            FormulaExpr::RangeRef(range) => values.extend(ctx.range_values(range)?),
            FormulaExpr::CellRef(addr) => values.extend(ctx.reference_value(*addr)?),
            expr => values.push(evaluate(expr, ctx)?),
        }
    }

    (func.implementation)(&values)
}

/// Evaluate formula text against a store, reporting errors
///
/// This is the strict counterpart of [`evaluate_formula`].
pub fn try_evaluate_formula(formula: &str, store: &CellStore) -> FormulaResult<f64> {
    EvaluationContext::new(store).evaluate_text(formula)
}

/// Evaluate formula text against a store
///
/// Any failure (malformed text, unknown function, circular reference,
/// nesting limit) evaluates to 0.
///
/// # Example
/// ```rust
/// use moneyflow_core::CellStore;
/// use moneyflow_formula::evaluate_formula;
///
/// let mut store = CellStore::new();
/// store.set_at("D2", "1500").unwrap();
/// store.set_at("E2", "0").unwrap();
///
/// assert_eq!(evaluate_formula("=D2-E2", &store), 1500.0);
/// assert_eq!(evaluate_formula("=SUM(", &store), 0.0);
/// ```
pub fn evaluate_formula(formula: &str, store: &CellStore) -> f64 {
    try_evaluate_formula(formula, store).unwrap_or_else(|e| {
        tracing::debug!("formula {:?} evaluated to 0: {}", formula, e);
        0.0
    })
}
