//! Recursive descent CSS parser.
//!
//! Parses CSS text into a nested [`StyleSheet`] tree. Uses the logos-based
//! tokenizer from [`crate::css::tokenizer`]. Rule bodies may contain
//! declarations, nested rules (`&:hover { ... }`), and nested at-rules, which
//! is the shape utility engines emit for variants.

use crate::css::model::*;
use crate::css::tokenizer::{tokenize, Token};

/// Errors from CSS parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// Parse a CSS string into a [`StyleSheet`].
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(input),
        cursor: 0,
    };
    let nodes = parser.parse_block(false)?;
    Ok(StyleSheet { nodes })
}

/// Recursive descent parser state.
struct Parser<'a> {
    tokens: Vec<(Token, &'a str)>,
    cursor: usize,
}

/// What stopped a prelude scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    /// `{` was consumed; a block body follows.
    Block,
    /// `;` was consumed.
    Semicolon,
    /// `}` was seen but left for the enclosing block.
    Close,
    /// End of input.
    Eof,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).map(|(t, _)| *t)
    }

    fn skip_trivia(&mut self) {
        while let Some((token, text)) = self.tokens.get(self.cursor) {
            let trivial = match token {
                Token::Comment => true,
                Token::Text => text.trim().is_empty(),
                _ => false,
            };
            if !trivial {
                break;
            }
            self.cursor += 1;
        }
    }

    /// Parse a sequence of nodes. When `nested` is true the sequence must be
    /// closed by `}`, which is consumed.
    fn parse_block(&mut self, nested: bool) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None if nested => {
                    return Err(ParseError::UnexpectedEof("expected '}'".into()));
                }
                None => return Ok(nodes),
                Some(Token::BraceClose) if nested => {
                    self.cursor += 1;
                    return Ok(nodes);
                }
                Some(Token::BraceClose) => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.cursor,
                        message: "unmatched '}'".into(),
                    });
                }
                Some(Token::Semicolon) => {
                    // Stray semicolons between items are allowed.
                    self.cursor += 1;
                }
                Some(Token::AtKeyword) => nodes.push(self.parse_at_rule()?),
                Some(_) => {
                    if let Some(node) = self.parse_rule_or_declaration()? {
                        nodes.push(node);
                    }
                }
            }
        }
    }

    /// Collect source text up to the next structural `{`, `;`, or `}`.
    ///
    /// Parentheses are tracked so that `;` inside `url(...)` or a function
    /// argument stays part of the text. Comments collapse to a single space.
    fn read_prelude(&mut self) -> (String, Terminator) {
        let mut text = String::new();
        let mut depth = 0usize;

        while let Some(&(token, slice)) = self.tokens.get(self.cursor) {
            match token {
                Token::BraceOpen => {
                    self.cursor += 1;
                    return (text, Terminator::Block);
                }
                Token::BraceClose => return (text, Terminator::Close),
                Token::Semicolon if depth == 0 => {
                    self.cursor += 1;
                    return (text, Terminator::Semicolon);
                }
                Token::ParenOpen => depth += 1,
                Token::ParenClose => depth = depth.saturating_sub(1),
                _ => {}
            }
            if token == Token::Comment {
                text.push(' ');
            } else {
                text.push_str(slice);
            }
            self.cursor += 1;
        }

        (text, Terminator::Eof)
    }

    /// Parse `@name params;` or `@name params { ... }`.
    fn parse_at_rule(&mut self) -> Result<Node, ParseError> {
        let keyword = self.tokens[self.cursor].1;
        self.cursor += 1;
        let name = keyword.trim_start_matches('@').to_string();

        let (params, terminator) = self.read_prelude();
        let children = match terminator {
            Terminator::Block => Some(self.parse_block(true)?),
            Terminator::Semicolon | Terminator::Close | Terminator::Eof => None,
        };

        Ok(Node::AtRule(AtRule {
            name,
            params: params.trim().to_string(),
            children,
        }))
    }

    /// Parse either `selector { ... }` or `property: value;`.
    fn parse_rule_or_declaration(&mut self) -> Result<Option<Node>, ParseError> {
        let position = self.cursor;
        let (prelude, terminator) = self.read_prelude();

        if terminator == Terminator::Block {
            let selector = prelude.trim();
            if selector.is_empty() {
                return Err(ParseError::UnexpectedToken {
                    position,
                    message: "expected selector before '{'".into(),
                });
            }
            let children = self.parse_block(true)?;
            return Ok(Some(Node::Rule(Rule {
                selector: selector.to_string(),
                children,
            })));
        }

        let text = prelude.trim();
        if text.is_empty() {
            return Ok(None);
        }
        parse_declaration(text)
            .map(|d| Some(Node::Declaration(d)))
            .ok_or_else(|| ParseError::UnexpectedToken {
                position,
                message: format!("expected ':' in declaration '{text}'"),
            })
    }
}

/// Split `property: value [!important]` into a [`Declaration`].
fn parse_declaration(text: &str) -> Option<Declaration> {
    let (property, value) = text.split_once(':')?;
    let property = property.trim();
    if property.is_empty() {
        return None;
    }

    let mut value = value.trim();
    let mut important = false;
    if let Some(stripped) = strip_important(value) {
        value = stripped;
        important = true;
    }

    Some(Declaration {
        property: property.to_string(),
        value: value.to_string(),
        important,
    })
}

/// Strip a trailing `!important` (any case), returning the remaining value.
fn strip_important(value: &str) -> Option<&str> {
    const FLAG: &str = "!important";
    if value.len() < FLAG.len() {
        return None;
    }
    let split = value.len() - FLAG.len();
    if !value.is_char_boundary(split) || !value[split..].eq_ignore_ascii_case(FLAG) {
        return None;
    }
    Some(value[..split].trim_end())
}
