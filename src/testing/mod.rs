//! Testing support: deterministic in-memory generation engines.
//!
//! Use [`FixtureEngine`] to compile a style map without an external engine
//! process. [`tailwind_fixture`] returns an engine preloaded with a realistic
//! slice of utility output (nested variants, media queries, group variants,
//! shadow, filter and transition scaffolding).

pub mod fixture;

pub use fixture::{tailwind_fixture, FailingEngine, FixtureEngine};
