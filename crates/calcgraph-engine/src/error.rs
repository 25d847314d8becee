//! Engine error types

use calcgraph_formula::FormulaError;
use thiserror::Error;

/// Result type for compiler and registry operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised at compile or insert time
///
/// Evaluation itself never fails: numeric edge cases propagate as
/// NaN/Infinity through `f64` arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Lexing or parsing failed
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Identifier not present in the registry at compile time, or name
    /// missing on a registry read
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// Registry insert collision
    #[error("a variable named '{name}' is already registered")]
    DuplicateVariableName { name: String },

    /// `set_value` called on a non-mutable variable
    #[error("variable '{name}' is not mutable")]
    ImmutableVariable { name: String },
}
