//! Recursive-descent parser for formula text.
//!
//! Precedence, lowest first:
//! `? :` (right associative), `||`, `&&`, `== !=`, `< > <= >=`, `+ -`,
//! `* /`, unary `- !`, then literals, identifiers and parentheses.
//!
//! Nesting (parentheses, ternary arms, unary chains) is capped at
//! [`MAX_DEPTH`] and formulas at [`MAX_TOKENS`] tokens, so hostile input is a
//! syntax error rather than a stack overflow in the parser or evaluator.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::{tokenize, Spanned, Token};
use crate::types::{FormulaError, Result};

/// Deepest nesting of parentheses, ternaries and unary operators accepted.
pub const MAX_DEPTH: usize = 256;

/// Longest formula accepted, in tokens.
pub const MAX_TOKENS: usize = 4096;

/// Parses formula text into an expression tree.
pub fn parse(text: &str) -> Result<Expr> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(FormulaError::syntax(0, "empty formula"));
    }
    if let Some(first_extra) = tokens.get(MAX_TOKENS) {
        return Err(FormulaError::syntax(
            first_extra.pos,
            format!("formula longer than {MAX_TOKENS} tokens"),
        ));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
        depth: 0,
    };
    let expr = parser.parse_conditional()?;
    if let Some(extra) = parser.peek() {
        return Err(FormulaError::syntax(
            extra.pos,
            format!("unexpected {}", extra.token.describe()),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Offset reported for "unexpected end of formula".
    end: usize,
    depth: usize,
}

impl Parser {
    fn parse_conditional(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.parse_ternary();
        self.depth -= 1;
        expr
    }

    fn parse_ternary(&mut self) -> Result<Expr> {
        let cond = self.parse_or()?;
        if !self.consume(&Token::Question) {
            return Ok(cond);
        }
        let then = self.parse_conditional()?;
        self.expect(&Token::Colon)?;
        let otherwise = self.parse_conditional()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_and()?;
        while self.consume(&Token::OrOr) {
            let rhs = self.parse_and()?;
            expr = binary(BinaryOp::Or, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_equality()?;
        while self.consume(&Token::AndAnd) {
            let rhs = self.parse_equality()?;
            expr = binary(BinaryOp::And, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = if self.consume(&Token::EqEq) {
                BinaryOp::Eq
            } else if self.consume(&Token::NotEq) {
                BinaryOp::Ne
            } else {
                break;
            };
            let rhs = self.parse_comparison()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = if self.consume(&Token::Lt) {
                BinaryOp::Lt
            } else if self.consume(&Token::Gt) {
                BinaryOp::Gt
            } else if self.consume(&Token::Le) {
                BinaryOp::Le
            } else if self.consume(&Token::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let rhs = self.parse_additive()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = if self.consume(&Token::Plus) {
                BinaryOp::Add
            } else if self.consume(&Token::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let rhs = self.parse_multiplicative()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.consume(&Token::Star) {
                BinaryOp::Mul
            } else if self.consume(&Token::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let rhs = self.parse_unary()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        // Unary plus is accepted and dropped.
        let op = if self.consume(&Token::Plus) {
            None
        } else if self.consume(&Token::Minus) {
            Some(UnaryOp::Neg)
        } else if self.consume(&Token::Bang) {
            Some(UnaryOp::Not)
        } else {
            return self.parse_primary();
        };
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = operand?;
        Ok(match op {
            Some(op) => Expr::Unary {
                op,
                expr: Box::new(operand),
            },
            None => operand,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(spanned) = self.next() else {
            return Err(FormulaError::syntax(self.end, "unexpected end of formula"));
        };
        match spanned.token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::Ident(name) => Ok(Expr::Var(name)),
            Token::LParen => {
                let expr = self.parse_conditional()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(FormulaError::syntax(
                spanned.pos,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            let pos = self.peek().map_or(self.end, |t| t.pos);
            return Err(FormulaError::syntax(pos, "formula nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.consume(expected) {
            return Ok(());
        }
        match self.peek() {
            Some(found) => Err(FormulaError::syntax(
                found.pos,
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    found.token.describe()
                ),
            )),
            None => Err(FormulaError::syntax(
                self.end,
                format!("expected {}, found end of formula", expected.describe()),
            )),
        }
    }

    fn consume(&mut self, expected: &Token) -> bool {
        if let Some(spanned) = self.peek() {
            if std::mem::discriminant(&spanned.token) == std::mem::discriminant(expected) {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn next(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
