//! CSS engine: tokenizer, parser, tree model, selector AST.

pub mod tokenizer;
pub mod model;
pub mod parser;
pub mod selector;
