//! # tailskin
//!
//! Compile per-component maps of semantic style names to utility-class strings
//! into one scoped stylesheet and a matching type declaration.
//!
//! Each semantic name (say `Button`) carries a string of utility tokens
//! (`"bg-blue-500 text-white hover:bg-blue-600"`). tailskin asks a utility-CSS
//! generation engine for every token once, then rebuilds the generated rules
//! under the semantic name: selectors rescoped, nesting flattened, custom
//! properties resolved to literal values, duplicate declarations removed.
//!
//! ## Core Systems
//!
//! - **[`css`]**: CSS engine (tokenizer, parser, tree model, selector AST)
//! - **[`classify`]**: splits utility strings into simple, arbitrary, container tokens
//! - **[`engine`]**: the generation engine boundary and a command-line adapter
//! - **[`index`]**: generated rules keyed by the class names they match
//! - **[`synth`]**: rescoped clones and authored declarations per semantic name
//! - **[`flatten`]**: nesting flattener, selector simplifier, group rewrite
//! - **[`vars`]**: custom-property resolution with cycle detection
//! - **[`normalize`]**: declaration cleanup and the type declaration
//! - **[`theme`]**: container breakpoints and the literal value pass
//! - **[`compile`]**: the pipeline driver
//!
//! ## Example
//!
//! ```
//! use tailskin::testing::tailwind_fixture;
//! use tailskin::{compile, CompileOptions, StyleMap};
//!
//! let styles = StyleMap::new().with("Button", "bg-blue-500 text-white");
//! let engine = tailwind_fixture();
//! let output = tokio_test::block_on(compile(&styles, &engine, &CompileOptions::default())).unwrap();
//! assert!(output.css.starts_with(".Button {"));
//! assert!(output.dts.contains("readonly Button: string;"));
//! assert!(output.warnings.is_empty());
//! ```

extern crate self as tailskin;

// CSS engine
pub mod css;

// Pipeline phases
pub mod classify;
pub mod index;
pub mod synth;
pub mod flatten;
pub mod vars;
pub mod normalize;
pub mod theme;

// Boundaries
pub mod engine;
pub mod error;

// Driver
pub mod compile;

// Test support
pub mod testing;

pub use compile::{compile, CompileOptions, CompileOutput, StyleMap};
pub use engine::{CommandEngine, EngineError, GenerationEngine, GenerationRequest};
pub use error::{CompileError, CompileResult, Phase};
pub use theme::{LiteralPass, ResolveScope};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use tailskin_macros::skin;
