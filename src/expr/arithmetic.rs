//! Integer arithmetic over tokenized expressions.
//!
//! Precedence climbing: parentheses and unary minus bind tightest, then
//! `* / %`, then `+ -`, each left-associative. Operands that are paths are
//! resolved through a caller-supplied lookup.

use super::tokenizer::{tokenize, Token};

/// Result of attempting to reduce an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Value(i64),
    /// A division or modulo by zero was reached; nothing was evaluated.
    DivisionByZero,
    /// The input is not an integer arithmetic expression.
    NotArithmetic,
}

enum Failure {
    DivisionByZero,
    Invalid,
}

/// Reduce `expr`, resolving path operands with `operand`.
///
/// Input without any operator is reported as [`Reduction::NotArithmetic`] so
/// that bare paths and literals are left to the caller.
pub fn reduce(expr: &str, operand: impl Fn(&str) -> Option<i64>) -> Reduction {
    let Some(tokens) = tokenize(expr) else {
        return Reduction::NotArithmetic;
    };
    if !tokens.iter().any(|(token, _)| token.is_operator()) {
        return Reduction::NotArithmetic;
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        operand,
    };
    match parser.sum() {
        Ok(value) if parser.cursor == parser.tokens.len() => Reduction::Value(value),
        Ok(_) | Err(Failure::Invalid) => Reduction::NotArithmetic,
        Err(Failure::DivisionByZero) => Reduction::DivisionByZero,
    }
}

struct Parser<'a, F> {
    tokens: Vec<(Token, &'a str)>,
    cursor: usize,
    operand: F,
}

impl<F: Fn(&str) -> Option<i64>> Parser<'_, F> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).map(|(token, _)| *token)
    }

    fn sum(&mut self) -> Result<i64, Failure> {
        let mut acc = self.product()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.cursor += 1;
            let rhs = self.product()?;
            acc = match op {
                Token::Plus => acc.checked_add(rhs),
                _ => acc.checked_sub(rhs),
            }
            .ok_or(Failure::Invalid)?;
        }
        Ok(acc)
    }

    fn product(&mut self) -> Result<i64, Failure> {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.cursor += 1;
            let rhs = self.unary()?;
            acc = match op {
                Token::Star => acc.checked_mul(rhs).ok_or(Failure::Invalid)?,
                _ if rhs == 0 => return Err(Failure::DivisionByZero),
                Token::Slash => acc.checked_div(rhs).ok_or(Failure::Invalid)?,
                _ => acc.checked_rem(rhs).ok_or(Failure::Invalid)?,
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<i64, Failure> {
        let Some(&(token, text)) = self.tokens.get(self.cursor) else {
            return Err(Failure::Invalid);
        };
        self.cursor += 1;
        match token {
            Token::Minus => self.unary()?.checked_neg().ok_or(Failure::Invalid),
            Token::Integer => text.parse().map_err(|_| Failure::Invalid),
            Token::Path => (self.operand)(text).ok_or(Failure::Invalid),
            Token::ParenOpen => {
                let value = self.sum()?;
                if self.peek() != Some(Token::ParenClose) {
                    return Err(Failure::Invalid);
                }
                self.cursor += 1;
                Ok(value)
            }
            _ => Err(Failure::Invalid),
        }
    }
}
