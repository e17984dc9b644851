//! Compilation errors.
//!
//! Only the generation engine call and the nesting flattener can fail a
//! compilation. Every other anomaly degrades to "no output for this item",
//! plus a warning where one applies. Strict mode adds one more failure:
//! unresolved utility tokens.

use std::fmt;

use crate::css::parser::ParseError;
use crate::css::selector::SelectorError;
use crate::engine::EngineError;

pub type CompileResult<T> = Result<T, CompileError>;

/// A compilation phase, named in fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Generate,
    Index,
    Synthesize,
    Flatten,
    Resolve,
    Normalize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Generate => "generate",
            Phase::Index => "index",
            Phase::Synthesize => "synthesize",
            Phase::Flatten => "flatten",
            Phase::Resolve => "resolve",
            Phase::Normalize => "normalize",
        })
    }
}

/// Errors from the nesting flattener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    #[error("invalid selector '{selector}': {source}")]
    Selector {
        selector: String,
        source: SelectorError,
    },
    #[error("nesting deeper than {max_depth} levels")]
    MaxNestingDepthExceeded { max_depth: usize },
}

/// A fatal compilation error.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{phase} phase failed: generation engine error: {source}")]
    Engine {
        phase: Phase,
        #[source]
        source: EngineError,
    },

    #[error("{phase} phase failed: engine output is not valid CSS: {source}")]
    GeneratedCss {
        phase: Phase,
        #[source]
        source: ParseError,
    },

    #[error("flatten phase failed: {0}")]
    Flatten(#[from] FlattenError),

    #[error("unresolved utility tokens: {}", .warnings.join("; "))]
    Unresolved { warnings: Vec<String> },
}

impl CompileError {
    /// The phase the error was raised in.
    pub fn phase(&self) -> Phase {
        match self {
            CompileError::Engine { phase, .. } | CompileError::GeneratedCss { phase, .. } => *phase,
            CompileError::Flatten(_) => Phase::Flatten,
            CompileError::Unresolved { .. } => Phase::Synthesize,
        }
    }
}
