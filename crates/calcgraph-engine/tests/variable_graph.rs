//! End-to-end tests for formula compilation over a variable graph

use std::rc::Rc;

use calcgraph_engine::prelude::*;
use calcgraph_engine::Variable;
use pretty_assertions::assert_eq;

fn names(vars: &[Rc<Variable>]) -> Vec<&str> {
    vars.iter().map(|v| v.name()).collect()
}

/// Spot values from the arithmetic surface
#[test]
fn test_evaluate_once_spot_values() {
    assert_eq!(evaluate_once("11 + 77").unwrap(), 88.0);
    assert_eq!(evaluate_once("11 - 77").unwrap(), -66.0);
    assert_eq!(evaluate_once("11 * 77").unwrap(), 847.0);
    assert_eq!(evaluate_once("22 % 6").unwrap(), 4.0);
    assert_eq!(evaluate_once("10/0").unwrap(), f64::INFINITY);

    assert_eq!(evaluate_once("5.105 ^ -3").unwrap(), 5.105f64.powf(-3.0));
    assert_eq!(evaluate_once("sqrt(15)").unwrap(), 15f64.sqrt());
    assert_eq!(evaluate_once("log(19)").unwrap(), 19f64.log10());
    assert_eq!(evaluate_once("ln(2.7)").unwrap(), 2.7f64.ln());
    assert_eq!(evaluate_once("exp(3)").unwrap(), 3f64.exp());
}

/// A delegate variable sees mutable updates immediately
#[test]
fn test_delegate_over_mutable_is_live() {
    let mut registry = VariableRegistry::new();
    let m = Variable::mutable("m", 1.0);
    registry.add(Rc::clone(&m)).unwrap();

    let d = Variable::delegate("d", compile("m * 3", Some(&registry)).unwrap());
    registry.add(Rc::clone(&d)).unwrap();

    assert_eq!(d.value(), 3.0);
    m.set_value(2.0).unwrap();
    assert_eq!(d.value(), 6.0);
}

/// A lazy variable caches its first read until reset
#[test]
fn test_lazy_cache_lifecycle() {
    let mut registry = VariableRegistry::new();
    let x = Variable::mutable("x", 1.0);
    registry.add(Rc::clone(&x)).unwrap();

    let lz = Variable::lazy("lz", compile("x", Some(&registry)).unwrap());
    registry.add(Rc::clone(&lz)).unwrap();

    assert_eq!(lz.value(), 1.0);
    x.set_value(2.0).unwrap();
    assert_eq!(lz.value(), 1.0);
    lz.reset();
    assert_eq!(lz.value(), 2.0);
}

/// Laziness composes: a lazy over a delegate over a mutable
#[test]
fn test_lazy_over_delegate_chain() {
    let mut registry = VariableRegistry::new();
    let base = Variable::mutable("base", 10.0);
    registry.add(Rc::clone(&base)).unwrap();

    let doubled = Variable::delegate("doubled", compile("base * 2", Some(&registry)).unwrap());
    registry.add(doubled).unwrap();

    let snapshot = Variable::lazy("snapshot", compile("doubled + 1", Some(&registry)).unwrap());
    registry.add(Rc::clone(&snapshot)).unwrap();

    assert_eq!(snapshot.value(), 21.0);
    base.set_value(100.0).unwrap();
    assert_eq!(snapshot.value(), 21.0);
    snapshot.reset();
    assert_eq!(snapshot.value(), 201.0);
}

/// A small layered dependency graph:
/// a constant, b = a + 2, c = a + b, d = c, e = a + b + c
#[test]
fn test_transitive_dependency_queries() {
    let mut registry = VariableRegistry::new();
    registry.add(Variable::constant("a", 1.0)).unwrap();
    let b = Variable::delegate("b", compile("a + 2", Some(&registry)).unwrap());
    registry.add(b).unwrap();
    let c = Variable::lazy("c", compile("a + b", Some(&registry)).unwrap());
    registry.add(c).unwrap();
    let d = Variable::lazy("d", compile("c", Some(&registry)).unwrap());
    registry.add(d).unwrap();
    let e = Variable::lazy("e", compile("a+b+c", Some(&registry)).unwrap());
    registry.add(e).unwrap();

    let lookup = VariableLookup::new(&registry);

    let e = registry.get("e").unwrap();
    assert_eq!(names(&lookup.referenced(e, LookupMode::All)), vec!["a", "b", "c"]);

    let d = registry.get("d").unwrap();
    assert_eq!(names(&lookup.referenced(d, LookupMode::Explicit)), vec!["c"]);
    assert_eq!(names(&lookup.referenced(d, LookupMode::All)), vec!["a", "b", "c"]);

    let a = registry.get("a").unwrap();
    assert_eq!(
        names(&lookup.referencing(a, LookupMode::All)),
        vec!["b", "c", "d", "e"]
    );

    // The graph also evaluates: b = 3, c = 4, d = 4, e = 8
    assert_eq!(registry.get("b").unwrap().value(), 3.0);
    assert_eq!(registry.get("c").unwrap().value(), 4.0);
    assert_eq!(registry.get("d").unwrap().value(), 4.0);
    assert_eq!(registry.get("e").unwrap().value(), 8.0);
}

/// Duplicate names fail without disturbing the first entry
#[test]
fn test_duplicate_name_is_rejected_atomically() {
    let mut registry = VariableRegistry::new();
    registry.add(Variable::constant("x", 1.0)).unwrap();

    let err = registry.add(Variable::mutable("x", 2.0)).unwrap_err();
    assert_eq!(err, EngineError::DuplicateVariableName { name: "x".into() });
    assert_eq!(registry.get("x").unwrap().value(), 1.0);
}

/// Compiling against a registry that lacks a referenced name fails fast
#[test]
fn test_compile_fails_on_unknown_variable() {
    let registry = VariableRegistry::new();
    assert_eq!(
        compile("y + 1", Some(&registry)).unwrap_err(),
        EngineError::UnknownVariable { name: "y".into() }
    );
}

/// The same text compiled against two registries yields independent resolvers
#[test]
fn test_registries_are_isolated_workspaces() {
    let mut metric = VariableRegistry::new();
    metric.add(Variable::constant("unit", 1.0)).unwrap();
    let mut imperial = VariableRegistry::new();
    imperial.add(Variable::constant("unit", 2.54)).unwrap();

    let fm = compile("unit * 10", Some(&metric)).unwrap();
    let fi = compile("unit * 10", Some(&imperial)).unwrap();

    assert_eq!(fm.value(), 10.0);
    assert_eq!(fi.value(), 25.4);
}

/// Formulas referencing a lazy variable observe its cache, not its source
#[test]
fn test_reads_through_lazy_see_cached_value() {
    let mut registry = VariableRegistry::new();
    let x = Variable::mutable("x", 1.0);
    registry.add(Rc::clone(&x)).unwrap();
    let lz = Variable::lazy("lz", compile("x", Some(&registry)).unwrap());
    registry.add(Rc::clone(&lz)).unwrap();

    let through = compile("lz + 100", Some(&registry)).unwrap();
    assert_eq!(through.value(), 101.0);

    x.set_value(50.0).unwrap();
    assert_eq!(through.value(), 101.0);

    lz.reset();
    assert_eq!(through.value(), 150.0);
}
