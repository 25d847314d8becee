//! Formula Abstract Syntax Tree types

use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Reference to a named variable
    Variable(String),
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Built-in function call, arity already checked by the parser
    FunctionCall { func: Func, args: Vec<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::Remainder => '%',
            BinaryOperator::Power => '^',
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}

/// The closed set of built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Log,
    Ln,
    Exp,
    Round,
}

impl Func {
    /// Resolve a function name from formula text
    pub fn from_name(name: &str) -> Option<Func> {
        match name {
            "sqrt" => Some(Func::Sqrt),
            "log" => Some(Func::Log),
            "ln" => Some(Func::Ln),
            "exp" => Some(Func::Exp),
            "round" => Some(Func::Round),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::Sqrt => "sqrt",
            Func::Log => "log",
            Func::Ln => "ln",
            Func::Exp => "exp",
            Func::Round => "round",
        }
    }

    /// Number of arguments the function takes
    pub fn arity(&self) -> usize {
        match self {
            Func::Round => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Expr {
    /// Canonical fully-parenthesized rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(name) => f.write_str(name),
            Expr::UnaryOp { op, operand } => match op {
                UnaryOperator::Negate => write!(f, "-{}", operand),
            },
            Expr::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::FunctionCall { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
