//! Variable model
//!
//! Four variants behind one uniform read contract:
//!
//! - `Constant` - fixed at construction
//! - `Mutable` - settable via [`Variable::set_value`]
//! - `Delegate` - re-evaluates its formula on every read, no caching
//! - `Lazy` - evaluates once, caches, returns the cache until
//!   [`Variable::reset`]
//!
//! Variables are handed out as `Rc<Variable>` so that compiled resolvers can
//! capture read accessors to them. Interior mutability (`Cell`) keeps the
//! whole engine single-threaded by design; there is no internal locking.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashSet;
use once_cell::sync::Lazy;

use crate::compiler::CompiledFormula;
use crate::error::{EngineError, EngineResult};

/// Shared empty set returned by `direct_refs` on non-computed variables
static NO_REFS: Lazy<AHashSet<String>> = Lazy::new(AHashSet::new);

/// A named numeric source held by a registry
pub struct Variable {
    name: String,
    kind: VariableKind,
}

enum VariableKind {
    Constant(f64),
    Mutable(Cell<f64>),
    Delegate(CompiledFormula),
    Lazy {
        formula: CompiledFormula,
        cached: Cell<Option<f64>>,
    },
}

impl Variable {
    /// Create a constant variable, fixed at construction
    pub fn constant(name: impl Into<String>, value: f64) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind: VariableKind::Constant(value),
        })
    }

    /// Create a mutable variable with an initial value
    pub fn mutable(name: impl Into<String>, initial: f64) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind: VariableKind::Mutable(Cell::new(initial)),
        })
    }

    /// Create a delegate variable that re-evaluates `formula` on every read
    pub fn delegate(name: impl Into<String>, formula: CompiledFormula) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind: VariableKind::Delegate(formula),
        })
    }

    /// Create a lazy variable that evaluates `formula` once and caches the
    /// result until [`Variable::reset`]
    pub fn lazy(name: impl Into<String>, formula: CompiledFormula) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind: VariableKind::Lazy {
                formula,
                cached: Cell::new(None),
            },
        })
    }

    /// Unique key within a registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    ///
    /// Evaluating a Delegate/Lazy variable whose formula graph is cyclic
    /// recurses without a guard and will exhaust the stack; keeping the
    /// graph acyclic is the caller's responsibility.
    pub fn value(&self) -> f64 {
        match &self.kind {
            VariableKind::Constant(value) => *value,
            VariableKind::Mutable(cell) => cell.get(),
            VariableKind::Delegate(formula) => formula.value(),
            VariableKind::Lazy { formula, cached } => match cached.get() {
                Some(value) => value,
                None => {
                    let value = formula.value();
                    cached.set(Some(value));
                    value
                }
            },
        }
    }

    /// Set the value of a Mutable variable
    ///
    /// Fails with [`EngineError::ImmutableVariable`] on any other kind.
    pub fn set_value(&self, value: f64) -> EngineResult<()> {
        match &self.kind {
            VariableKind::Mutable(cell) => {
                cell.set(value);
                Ok(())
            }
            _ => Err(EngineError::ImmutableVariable {
                name: self.name.clone(),
            }),
        }
    }

    /// Clear the cached value of a Lazy variable; no-op on other kinds
    pub fn reset(&self) {
        if let VariableKind::Lazy { cached, .. } = &self.kind {
            cached.set(None);
        }
    }

    /// Whether this variable is computed from a formula (Delegate or Lazy)
    ///
    /// Only computed variables have outgoing dependency edges.
    pub fn is_computed(&self) -> bool {
        matches!(
            self.kind,
            VariableKind::Delegate(_) | VariableKind::Lazy { .. }
        )
    }

    /// Names of the variables this variable's own formula mentions
    ///
    /// Empty for Constant and Mutable variables.
    pub fn direct_refs(&self) -> &AHashSet<String> {
        match &self.kind {
            VariableKind::Delegate(formula) => formula.direct_refs(),
            VariableKind::Lazy { formula, .. } => formula.direct_refs(),
            _ => &NO_REFS,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            VariableKind::Constant(_) => "Constant",
            VariableKind::Mutable(_) => "Mutable",
            VariableKind::Delegate(_) => "Delegate",
            VariableKind::Lazy { .. } => "Lazy",
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("kind", &self.kind_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::registry::VariableRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constant() {
        let c = Variable::constant("c", 42.0);
        assert_eq!(c.value(), 42.0);
        assert!(!c.is_computed());
        assert!(c.direct_refs().is_empty());
        assert_eq!(
            c.set_value(1.0).unwrap_err(),
            EngineError::ImmutableVariable { name: "c".into() }
        );
    }

    #[test]
    fn test_mutable() {
        let m = Variable::mutable("m", 1.0);
        assert_eq!(m.value(), 1.0);
        m.set_value(2.0).unwrap();
        assert_eq!(m.value(), 2.0);
        assert!(!m.is_computed());
        assert!(m.direct_refs().is_empty());
    }

    #[test]
    fn test_delegate_reads_are_live() {
        let mut registry = VariableRegistry::new();
        let m = Variable::mutable("m", 1.0);
        registry.add(Rc::clone(&m)).unwrap();

        let d = Variable::delegate("d", compile("m + 1", Some(&registry)).unwrap());
        assert_eq!(d.value(), 2.0);
        assert!(d.is_computed());

        m.set_value(2.0).unwrap();
        assert_eq!(d.value(), 3.0);
    }

    #[test]
    fn test_lazy_caches_until_reset() {
        let mut registry = VariableRegistry::new();
        let x = Variable::mutable("x", 1.0);
        registry.add(Rc::clone(&x)).unwrap();

        let lz = Variable::lazy("lz", compile("x", Some(&registry)).unwrap());
        assert_eq!(lz.value(), 1.0);

        x.set_value(2.0).unwrap();
        assert_eq!(lz.value(), 1.0); // still cached

        lz.reset();
        assert_eq!(lz.value(), 2.0);
    }

    #[test]
    fn test_reset_in_empty_state_is_harmless() {
        let mut registry = VariableRegistry::new();
        registry.add(Variable::constant("a", 5.0)).unwrap();

        let lz = Variable::lazy("lz", compile("a", Some(&registry)).unwrap());
        lz.reset();
        assert_eq!(lz.value(), 5.0);
    }

    #[test]
    fn test_reset_is_noop_on_plain_variables() {
        let m = Variable::mutable("m", 3.0);
        m.reset();
        assert_eq!(m.value(), 3.0);
    }

    #[test]
    fn test_computed_direct_refs_match_formula() {
        let mut registry = VariableRegistry::new();
        registry.add(Variable::constant("a", 1.0)).unwrap();
        registry.add(Variable::constant("b", 2.0)).unwrap();

        let d = Variable::delegate("d", compile("a + b", Some(&registry)).unwrap());
        let mut refs: Vec<_> = d.direct_refs().iter().cloned().collect();
        refs.sort();
        assert_eq!(refs, vec!["a", "b"]);
    }

    #[test]
    fn test_shared_formula() {
        // A compiled formula may back more than one variable
        let formula = compile("1 + 2", None).unwrap();
        let d = Variable::delegate("d", formula.clone());
        let lz = Variable::lazy("lz", formula);
        assert_eq!(d.value(), 3.0);
        assert_eq!(lz.value(), 3.0);
    }
}
