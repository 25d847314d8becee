//! Formula parser
//!
//! A recursive descent parser with the grammar, highest to lowest binding:
//!
//! ```text
//! expr   := term (('+'|'-') term)*
//! term   := power (('*'|'/'|'%') power)*
//! power  := unary ('^' power)?
//! unary  := '-' unary | primary
//! primary:= NUMBER | IDENT | FUNC '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! `^` is right-associative (`a^b^c` is `a^(b^c)`), `* / %` and `+ -` are
//! left-associative, and unary minus binds tighter than `^` (`-2^2` is `4`).

use crate::ast::{BinaryOperator, Expr, Func, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Op, Token, TokenKind};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use calcgraph_formula::parse;
///
/// let ast = parse("1 + 2 * 3").unwrap();
/// let ast = parse("round(price * rate, 2)").unwrap();
/// ```
pub fn parse(input: &str) -> FormulaResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens, input.len());

    if parser.is_at_end() {
        return Err(FormulaError::Syntax {
            position: 0,
            message: "empty formula".into(),
        });
    }

    let expr = parser.parse_expr()?;

    // Make sure we consumed all input
    if let Some(token) = parser.peek() {
        return Err(FormulaError::Syntax {
            position: token.position,
            message: format!("unexpected '{}' after expression", token.text),
        });
    }

    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Byte length of the input, used as the position of end-of-input errors
    end: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
        }
    }

    // === Expression parsing with precedence ===

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek_op() {
                Some(Op::Plus) => BinaryOperator::Add,
                Some(Op::Minus) => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_term()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_power()?;

        loop {
            let op = match self.peek_op() {
                Some(Op::Star) => BinaryOperator::Multiply,
                Some(Op::Slash) => BinaryOperator::Divide,
                Some(Op::Percent) => BinaryOperator::Remainder,
                _ => break,
            };

            self.consume();
            let right = self.parse_power()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let left = self.parse_unary()?;

        if self.peek_op() == Some(Op::Caret) {
            self.consume();
            let right = self.parse_power()?; // Right associative
            return Ok(Expr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if self.peek_op() == Some(Op::Minus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => {
                return Err(FormulaError::Syntax {
                    position: self.end,
                    message: "expected a number, variable, function call or '('".into(),
                })
            }
        };

        match token.kind {
            TokenKind::Number(value) => {
                self.consume();
                Ok(Expr::Number(value))
            }

            TokenKind::Identifier => {
                self.consume();
                Ok(Expr::Variable(token.text))
            }

            TokenKind::Function => {
                self.consume();
                self.parse_function_call(&token)
            }

            TokenKind::LParen => {
                self.consume();
                let expr = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(expr)
            }

            _ => Err(FormulaError::Syntax {
                position: token.position,
                message: format!("unexpected '{}'", token.text),
            }),
        }
    }

    fn parse_function_call(&mut self, name_token: &Token) -> FormulaResult<Expr> {
        let func =
            Func::from_name(&name_token.text).ok_or_else(|| FormulaError::UnknownFunction {
                position: name_token.position,
                name: name_token.text.clone(),
            })?;

        // The lexer only emits Function when a '(' follows
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::LParen) => self.consume(),
            _ => {
                return Err(FormulaError::Syntax {
                    position: self.peek_position(),
                    message: format!("expected '(' after '{}'", func),
                })
            }
        };

        let mut args = vec![self.parse_expr()?];
        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Comma)) {
            self.consume();
            args.push(self.parse_expr()?);
        }

        self.expect_rparen()?;

        if args.len() != func.arity() {
            return Err(FormulaError::Syntax {
                position: name_token.position,
                message: format!(
                    "{} expects {} argument(s), got {}",
                    func,
                    func.arity(),
                    args.len()
                ),
            });
        }

        Ok(Expr::FunctionCall { func, args })
    }

    // === Helper methods ===

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<Op> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn peek_position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn consume(&mut self) {
        self.pos += 1;
    }

    fn expect_rparen(&mut self) -> FormulaResult<()> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::RParen) => {
                self.consume();
                Ok(())
            }
            _ => Err(FormulaError::Syntax {
                position: self.peek_position(),
                message: "expected ')'".into(),
            }),
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
