//! # moneyflow-formula
//!
//! Formula parser and evaluator for moneyflow.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → number) against a [`CellStore`](moneyflow_core::CellStore)
//! - Aggregate functions (`SUM`, `AVERAGE`, `MIN`, `MAX`, `COUNT`)
//! - Dependency tracking for incremental recalculation
//!
//! ## Example
//!
//! ```rust
//! use moneyflow_core::CellStore;
//! use moneyflow_formula::evaluate_formula;
//!
//! let mut store = CellStore::new();
//! for (row, amount) in ["1500", "0", "3000"].iter().enumerate() {
//!     store.set_at(&format!("D{}", row + 2), amount).unwrap();
//! }
//!
//! assert_eq!(evaluate_formula("=SUM(D2:D4)", &store), 4500.0);
//! assert_eq!(evaluate_formula("=Z99+1", &store), 1.0);
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_formula, try_evaluate_formula, EvaluationContext};
pub use parser::parse_formula;
