//! # calcgraph-formula
//!
//! Text front end for the calcgraph formula engine.
//!
//! This crate provides:
//! - Lexing (text → tokens)
//! - Parsing (tokens → AST) with precedence and associativity
//! - The closed AST and built-in function set
//!
//! ## Example
//!
//! ```rust
//! use calcgraph_formula::parse;
//!
//! let ast = parse("1 + 2 * 3").unwrap();
//! let ast = parse("round(price * rate, 2)").unwrap();
//! ```
//!
//! Compilation of an AST into an executable resolver lives in
//! `calcgraph-engine`, which re-exports this crate's surface.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOperator, Expr, Func, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use lexer::{tokenize, Op, Token, TokenKind};
pub use parser::parse;
