//! Formula lexer
//!
//! Turns formula text into a flat token stream. Identifiers that are
//! immediately followed by `(` are emitted as [`TokenKind::Function`] so the
//! parser can tell `log(2)` apart from a variable named `log`.

use crate::error::{FormulaError, FormulaResult};

/// A single token with its raw text and byte position in the input
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal, already parsed to its `f64` value
    Number(f64),
    /// Variable name
    Identifier,
    /// Identifier followed by `(`
    Function,
    Operator(Op),
    LParen,
    RParen,
    Comma,
}

/// Arithmetic operator symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
}

/// Tokenize a formula string
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let start = self.pos;
            let c = match self.peek_char() {
                Some(c) => c,
                None => break,
            };

            if let Some(op) = Self::operator(c) {
                self.advance();
                tokens.push(self.token(TokenKind::Operator(op), start));
                continue;
            }

            match c {
                '(' => {
                    self.advance();
                    tokens.push(self.token(TokenKind::LParen, start));
                }
                ')' => {
                    self.advance();
                    tokens.push(self.token(TokenKind::RParen, start));
                }
                ',' => {
                    self.advance();
                    tokens.push(self.token(TokenKind::Comma, start));
                }
                _ if Self::starts_number(c, self.peek_char_at(1)) => {
                    tokens.push(self.scan_number()?);
                }
                _ if c.is_alphabetic() || c == '_' => {
                    tokens.push(self.scan_identifier());
                }
                _ => {
                    return Err(FormulaError::Lexical {
                        position: start,
                        character: c,
                    });
                }
            }
        }

        Ok(tokens)
    }

    fn operator(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Plus),
            '-' => Some(Op::Minus),
            '*' => Some(Op::Star),
            '/' => Some(Op::Slash),
            '%' => Some(Op::Percent),
            '^' => Some(Op::Caret),
            _ => None,
        }
    }

    fn starts_number(c: char, next: Option<char>) -> bool {
        c.is_ascii_digit() || (c == '.' && next.map_or(false, |n| n.is_ascii_digit()))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part, only consumed when a digit actually follows
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let mut lookahead = 1;
            if self
                .peek_char_at(lookahead)
                .map_or(false, |c| c == '+' || c == '-')
            {
                lookahead += 1;
            }
            if self
                .peek_char_at(lookahead)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..=lookahead {
                    self.advance();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = &self.input[start..self.pos];
        let value: f64 = text.parse().map_err(|_| FormulaError::Syntax {
            position: start,
            message: format!("invalid number literal '{}'", text),
        })?;

        Ok(Token {
            kind: TokenKind::Number(value),
            text: text.to_string(),
            position: start,
        })
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }

        // An identifier directly applied to an argument list is a function
        let kind = if self.peek_next_non_space() == Some('(') {
            TokenKind::Function
        } else {
            TokenKind::Identifier
        };

        Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            position: start,
        }
    }

    // === Helper methods ===

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            position: start,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn peek_next_non_space(&self) -> Option<char> {
        self.input[self.pos..].chars().find(|c| !c.is_whitespace())
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
