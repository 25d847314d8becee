//! Convenience re-exports of the everyday surface
//!
//! ```rust
//! use calcgraph_engine::prelude::*;
//! ```

pub use crate::compiler::{compile, compile_expr, evaluate_once, CompiledFormula};
pub use crate::error::{EngineError, EngineResult};
pub use crate::lookup::{LookupMode, VariableLookup};
pub use crate::registry::VariableRegistry;
pub use crate::variable::Variable;
pub use calcgraph_formula::{parse, Expr, FormulaError};
