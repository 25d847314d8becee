//! Variable registry
//!
//! A named collection binding identifiers to variables. The registry is the
//! sole owner of its variables and is always an explicit, caller-constructed
//! object per workspace, never a process-wide singleton. Iteration order is
//! insertion order for reproducibility.

use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{EngineError, EngineResult};
use crate::variable::Variable;

/// Insertion-ordered map of unique name → variable
#[derive(Debug, Default)]
pub struct VariableRegistry {
    order: Vec<Rc<Variable>>,
    index: AHashMap<String, usize>,
}

impl VariableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    ///
    /// Fails with [`EngineError::DuplicateVariableName`] and leaves the
    /// registry unchanged if the name is already taken.
    pub fn add(&mut self, variable: Rc<Variable>) -> EngineResult<()> {
        if self.index.contains_key(variable.name()) {
            return Err(EngineError::DuplicateVariableName {
                name: variable.name().to_string(),
            });
        }

        log::debug!("registering variable '{}'", variable.name());
        self.index
            .insert(variable.name().to_string(), self.order.len());
        self.order.push(variable);
        Ok(())
    }

    /// Add variables in order, stopping at the first failure
    ///
    /// Entries added before the offending name stay in the registry; there
    /// is no rollback.
    pub fn add_many(
        &mut self,
        variables: impl IntoIterator<Item = Rc<Variable>>,
    ) -> EngineResult<()> {
        for variable in variables {
            self.add(variable)?;
        }
        Ok(())
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> EngineResult<&Rc<Variable>> {
        self.index
            .get(name)
            .map(|&i| &self.order[i])
            .ok_or_else(|| EngineError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over all variables in insertion order; restartable
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Variable>> {
        self.order.iter()
    }

    /// Iterate over variable names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|v| v.name())
    }
}
