//! Formula Abstract Syntax Tree types

use moneyflow_core::{CellAddress, CellRange};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference
    CellRef(CellAddress),
    /// Range reference, only meaningful as a function argument
    RangeRef(CellRange),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Function call; the name is stored uppercase
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Every range this expression reads, single references as one-cell
    /// ranges, in source order
    pub fn referenced_ranges(&self) -> Vec<CellRange> {
        let mut ranges = Vec::new();
        self.collect_ranges(&mut ranges);
        ranges
    }

    /// Every cell this expression reads, ranges expanded, in source order
    ///
    /// Addresses may repeat when the formula mentions a cell more than once.
    pub fn references(&self) -> Vec<CellAddress> {
        self.referenced_ranges()
            .iter()
            .flat_map(|range| range.cells())
            .collect()
    }

    fn collect_ranges(&self, ranges: &mut Vec<CellRange>) {
        match self {
            FormulaExpr::CellRef(addr) => ranges.push(CellRange::single(*addr)),
            FormulaExpr::RangeRef(range) => ranges.push(*range),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_ranges(ranges);
                right.collect_ranges(ranges);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_ranges(ranges),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_ranges(ranges);
                }
            }
            FormulaExpr::Number(_) => {}
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Apply the operator with IEEE float semantics (x/0 is infinite, 0/0 is NaN)
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}
