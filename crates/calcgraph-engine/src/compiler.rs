//! Formula compiler
//!
//! Walks a parsed AST once and builds a reusable resolver: a zero-argument
//! closure returning the current `f64` value of the formula. Variable
//! references are bound against a [`VariableRegistry`] at compile time; the
//! resolver captures a handle to each referenced variable (not a snapshot
//! value), so later mutation is observed on every invocation.

use std::fmt;
use std::rc::Rc;

use ahash::AHashSet;
use calcgraph_formula::{parse, BinaryOperator, Expr, Func, UnaryOperator};

use crate::error::{EngineError, EngineResult};
use crate::registry::VariableRegistry;

/// A compiled, zero-argument callable returning the current value of a formula
pub type Resolver = Rc<dyn Fn() -> f64>;

/// A formula compiled into a resolver plus the set of variable names its
/// source AST mentions directly
///
/// Immutable once built; cloning shares the resolver.
#[derive(Clone)]
pub struct CompiledFormula {
    resolver: Resolver,
    direct_refs: Rc<AHashSet<String>>,
    source: Option<Rc<str>>,
}

impl CompiledFormula {
    /// Evaluate the formula against the current variable values
    pub fn value(&self) -> f64 {
        (self.resolver)()
    }

    /// Names of the variables referenced directly in the source AST
    pub fn direct_refs(&self) -> &AHashSet<String> {
        &self.direct_refs
    }

    /// The formula text this was compiled from, when compiled from text
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl fmt::Debug for CompiledFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFormula")
            .field("source", &self.source)
            .field("direct_refs", &self.direct_refs)
            .finish()
    }
}

/// Compile formula text against an optional registry
///
/// Every variable reference must resolve to a live registry entry; a missing
/// registry or missing name fails with [`EngineError::UnknownVariable`].
pub fn compile(text: &str, registry: Option<&VariableRegistry>) -> EngineResult<CompiledFormula> {
    let expr = parse(text)?;
    let mut formula = compile_expr(&expr, registry)?;
    formula.source = Some(Rc::from(text));

    log::debug!(
        "compiled formula '{}' with {} direct reference(s)",
        text,
        formula.direct_refs.len()
    );

    Ok(formula)
}

/// Compile an already-parsed AST against an optional registry
pub fn compile_expr(
    expr: &Expr,
    registry: Option<&VariableRegistry>,
) -> EngineResult<CompiledFormula> {
    let mut refs = AHashSet::new();
    let resolver = build(expr, registry, &mut refs)?;

    Ok(CompiledFormula {
        resolver,
        direct_refs: Rc::new(refs),
        source: None,
    })
}

/// Compile and evaluate a registry-free formula (constants only)
pub fn evaluate_once(text: &str) -> EngineResult<f64> {
    Ok(compile(text, None)?.value())
}

fn build(
    expr: &Expr,
    registry: Option<&VariableRegistry>,
    refs: &mut AHashSet<String>,
) -> EngineResult<Resolver> {
    match expr {
        Expr::Number(value) => {
            let value = *value;
            Ok(Rc::new(move || value))
        }

        Expr::Variable(name) => {
            let registry = registry.ok_or_else(|| EngineError::UnknownVariable {
                name: name.clone(),
            })?;
            let variable = Rc::clone(registry.get(name)?);
            refs.insert(name.clone());
            Ok(Rc::new(move || variable.value()))
        }

        Expr::UnaryOp { op, operand } => {
            let operand = build(operand, registry, refs)?;
            match op {
                UnaryOperator::Negate => Ok(Rc::new(move || -operand())),
            }
        }

        Expr::BinaryOp { op, left, right } => {
            let lhs = build(left, registry, refs)?;
            let rhs = build(right, registry, refs)?;
            let resolver: Resolver = match op {
                BinaryOperator::Add => Rc::new(move || lhs() + rhs()),
                BinaryOperator::Subtract => Rc::new(move || lhs() - rhs()),
                BinaryOperator::Multiply => Rc::new(move || lhs() * rhs()),
                // IEEE-754 semantics: x/0.0 is ±Infinity/NaN, never an error
                BinaryOperator::Divide => Rc::new(move || lhs() / rhs()),
                // Remainder after truncating division, sign follows the dividend
                BinaryOperator::Remainder => Rc::new(move || lhs() % rhs()),
                BinaryOperator::Power => Rc::new(move || lhs().powf(rhs())),
            };
            Ok(resolver)
        }

        Expr::FunctionCall { func, args } => build_call(*func, args, registry, refs),
    }
}

fn build_call(
    func: Func,
    args: &[Expr],
    registry: Option<&VariableRegistry>,
    refs: &mut AHashSet<String>,
) -> EngineResult<Resolver> {
    // The parser checks arity, but a hand-built AST may not honor it
    if args.len() != func.arity() {
        return Err(EngineError::Formula(calcgraph_formula::FormulaError::Syntax {
            position: 0,
            message: format!(
                "{} expects {} argument(s), got {}",
                func,
                func.arity(),
                args.len()
            ),
        }));
    }

    let resolver: Resolver = match func {
        Func::Sqrt => {
            let x = build(&args[0], registry, refs)?;
            Rc::new(move || x().sqrt())
        }
        Func::Log => {
            let x = build(&args[0], registry, refs)?;
            Rc::new(move || x().log10())
        }
        Func::Ln => {
            let x = build(&args[0], registry, refs)?;
            Rc::new(move || x().ln())
        }
        Func::Exp => {
            let x = build(&args[0], registry, refs)?;
            Rc::new(move || x().exp())
        }
        Func::Round => {
            let x = build(&args[0], registry, refs)?;
            let digits = build(&args[1], registry, refs)?;
            Rc::new(move || round_to(x(), digits()))
        }
    };

    Ok(resolver)
}

/// Round to a number of decimal places, away-from-zero at midpoints
fn round_to(x: f64, digits: f64) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (x * factor).round() / factor
}
