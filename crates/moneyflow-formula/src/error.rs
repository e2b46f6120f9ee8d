//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A formula depends on its own value
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(String),

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Evaluation went deeper than the given number of levels
    #[error("Formula nesting exceeds {0} levels")]
    NestingLimit(usize),
}

impl FormulaError {
    /// Check if this is a circular reference
    pub fn is_circular(&self) -> bool {
        matches!(self, FormulaError::CircularReference(_))
    }

    /// Check if this error spoils every formula that reads the failing cell
    ///
    /// Other errors in a referenced formula make that cell read as 0.
    pub fn propagates(&self) -> bool {
        matches!(
            self,
            FormulaError::CircularReference(_) | FormulaError::NestingLimit(_)
        )
    }
}
