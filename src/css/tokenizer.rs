//! logos-based CSS tokenizer.
//!
//! The lexer only separates the structural characters of a stylesheet
//! (braces, parentheses, semicolons, strings, escapes, comments, at-keywords)
//! from runs of plain text. Selectors and values are kept as text and parsed
//! later by their own grammars, so whitespace is significant and never skipped.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `/* c */` as [`Token::Comment`] beats `/` as [`Token::Slash`])
//! 2. For equal length matches, earlier-defined variants win

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// Block comment: `/* ... */`.
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    /// Double-quoted string literal, escapes allowed.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    StringLiteral,

    /// Single-quoted string literal, escapes allowed.
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    StringLiteralSingle,

    /// An escape sequence: a backslash and the character it protects.
    ///
    /// Hex escapes (`\31 `) lex as an escape of the first digit followed by
    /// text; the pair is re-joined when the prelude is assembled.
    #[regex(r"\\[^\n]")]
    Escape,

    /// At-keyword: `@media`, `@container`, `@layer`.
    #[regex(r"@[a-zA-Z_-][a-zA-Z0-9_-]*")]
    AtKeyword,

    /// Any run of characters without structural meaning, whitespace included.
    #[regex(r#"[^{}();'"\\/@]+"#)]
    Text,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `/` outside a comment.
    #[token("/")]
    Slash,

    /// `@` not starting an at-keyword.
    #[token("@")]
    At,
}

/// Tokenize a CSS string into a vector of `(Token, &str)` pairs.
///
/// Input the lexer cannot match (an unterminated string, a trailing
/// backslash) is kept as [`Token::Text`] so no source text is lost.
pub fn tokenize(input: &str) -> Vec<(Token, &str)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .map(|(result, span)| (result.unwrap_or(Token::Text), &input[span]))
        .collect()
}
