//! Formula parse error types

use thiserror::Error;

/// Result type for lexing and parsing operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while turning formula text into an AST
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Unrecognized character in the input
    #[error("unrecognized character '{character}' at position {position}")]
    Lexical { position: usize, character: char },

    /// Malformed grammar
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Call of a function the grammar does not know
    #[error("unknown function '{name}' at position {position}")]
    UnknownFunction { position: usize, name: String },
}
