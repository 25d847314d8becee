//! Dependency lookup
//!
//! Graph queries over the Delegate/Lazy formulas held by a registry:
//! "what does this variable reference" and "what references this variable",
//! each in one-hop ([`LookupMode::Explicit`]) and transitive-closure
//! ([`LookupMode::All`]) form.
//!
//! Queries are computed fresh on every call; there is no incremental index.
//! Explicit queries cost O(out-degree) or O(registry size), transitive ones
//! walk the graph with a worklist and a visited set, which also keeps the
//! queries themselves safe on cyclic graphs. Results are returned in
//! registry insertion order.

use std::rc::Rc;

use ahash::{AHashMap, AHashSet};

use crate::registry::VariableRegistry;
use crate::variable::Variable;

/// How far a dependency query reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Direct references only
    Explicit,
    /// Transitive closure
    All,
}

/// Dependency queries over a borrowed registry
#[derive(Debug)]
pub struct VariableLookup<'a> {
    registry: &'a VariableRegistry,
}

impl<'a> VariableLookup<'a> {
    pub fn new(registry: &'a VariableRegistry) -> Self {
        Self { registry }
    }

    /// Variables the given variable's formula references
    ///
    /// Empty for Constant/Mutable variables in either mode.
    pub fn referenced(&self, variable: &Variable, mode: LookupMode) -> Vec<Rc<Variable>> {
        let mut found: AHashSet<String> = variable.direct_refs().clone();

        if mode == LookupMode::All {
            let mut work: Vec<String> = found.iter().cloned().collect();
            while let Some(name) = work.pop() {
                log::trace!("expanding references of '{}'", name);
                let Ok(current) = self.registry.get(&name) else {
                    continue;
                };
                for dep in current.direct_refs() {
                    if found.insert(dep.clone()) {
                        work.push(dep.clone());
                    }
                }
            }
        }

        self.in_registry_order(&found)
    }

    /// Variables whose formulas reference the given variable
    pub fn referencing(&self, variable: &Variable, mode: LookupMode) -> Vec<Rc<Variable>> {
        match mode {
            LookupMode::Explicit => self
                .registry
                .iter()
                .filter(|v| v.direct_refs().contains(variable.name()))
                .cloned()
                .collect(),
            LookupMode::All => {
                // Reverse adjacency in one registry pass: name → names of
                // the variables whose formulas mention it.
                let mut dependents: AHashMap<&str, Vec<&str>> = AHashMap::new();
                for v in self.registry.iter() {
                    for dep in v.direct_refs() {
                        dependents.entry(dep.as_str()).or_default().push(v.name());
                    }
                }

                let mut found: AHashSet<String> = AHashSet::new();
                let mut work: Vec<&str> = vec![variable.name()];
                while let Some(name) = work.pop() {
                    let Some(users) = dependents.get(name) else {
                        continue;
                    };
                    for &user in users {
                        if found.insert(user.to_string()) {
                            log::trace!("'{}' transitively references '{}'", user, name);
                            work.push(user);
                        }
                    }
                }

                self.in_registry_order(&found)
            }
        }
    }

    fn in_registry_order(&self, names: &AHashSet<String>) -> Vec<Rc<Variable>> {
        self.registry
            .iter()
            .filter(|v| names.contains(v.name()))
            .cloned()
            .collect()
    }
}
