//! # calcgraph-engine
//!
//! A small live numeric-formula engine.
//!
//! Formula text is parsed (via `calcgraph-formula`), compiled once into a
//! reusable resolver closure, and bound against a [`VariableRegistry`] of
//! named variables. Delegate and Lazy variables store compiled formulas of
//! their own, which gives the registry the shape of a dependency graph;
//! [`VariableLookup`] answers one-hop and transitive queries over it.
//!
//! ## Example
//!
//! ```rust
//! use calcgraph_engine::prelude::*;
//! use std::rc::Rc;
//!
//! let mut registry = VariableRegistry::new();
//! let rate = Variable::mutable("rate", 0.25);
//! registry.add(Rc::clone(&rate)).unwrap();
//! registry.add(Variable::constant("principal", 1000.0)).unwrap();
//!
//! let interest = compile("principal * rate", Some(&registry)).unwrap();
//! assert_eq!(interest.value(), 250.0);
//!
//! rate.set_value(0.5).unwrap();
//! assert_eq!(interest.value(), 500.0);
//! ```
//!
//! The engine is single-threaded by design (`Rc`/`Cell`, no locking);
//! concurrent mutation discipline is the caller's responsibility.

pub mod compiler;
pub mod error;
pub mod lookup;
pub mod prelude;
pub mod registry;
pub mod variable;

pub use compiler::{compile, compile_expr, evaluate_once, CompiledFormula, Resolver};
pub use error::{EngineError, EngineResult};
pub use lookup::{LookupMode, VariableLookup};
pub use registry::VariableRegistry;
pub use variable::Variable;

// Re-export the text front end
pub use calcgraph_formula::{
    parse, tokenize, BinaryOperator, Expr, FormulaError, Func, Op, Token, TokenKind, UnaryOperator,
};
