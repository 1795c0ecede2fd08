//! logos-based tokenizer for arithmetic expressions.
//!
//! Only integer literals, state paths, the five operators and parentheses
//! lex. Anything else (quotes, decimals, `${`) is a lex error, which tells the
//! evaluator the input is not arithmetic.

use logos::Logos;

/// Arithmetic token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    /// Non-negative integer literal. Unary minus is handled by the parser.
    #[regex(r"[0-9]+")]
    Integer,

    /// State path: `count`, `user.age`, `items[index].price`, `items.count`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z0-9_]+|\[[^\]]*\])*")]
    Path,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,
}

impl Token {
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Token::Plus | Token::Minus | Token::Star | Token::Slash | Token::Percent
        )
    }
}

/// Tokenize `input` into `(Token, slice)` pairs.
///
/// Returns `None` as soon as any character fails to lex.
pub fn tokenize(input: &str) -> Option<Vec<(Token, &str)>> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| result.ok().map(|token| (token, &input[span])))
        .collect()
}
