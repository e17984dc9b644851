//! Theme tables and the literal value pass.
//!
//! [`container_breakpoint`] maps container-query tiers to lengths.
//! [`LiteralPass`] inlines custom-property references against a
//! caller-supplied table, restricted to a [`ResolveScope`].

use std::fmt;
use std::str::FromStr;

use crate::css::model::{Declaration, Node, Rule, StyleSheet};
use crate::css::parser::{parse_css, ParseError};
use crate::vars::{self, GlobalScope};

/// Container-query tiers and their minimum widths.
pub const CONTAINER_BREAKPOINTS: &[(&str, &str)] = &[
    ("3xs", "16rem"),
    ("2xs", "18rem"),
    ("xs", "20rem"),
    ("sm", "24rem"),
    ("md", "28rem"),
    ("lg", "32rem"),
    ("xl", "36rem"),
    ("2xl", "42rem"),
    ("3xl", "48rem"),
    ("4xl", "56rem"),
    ("5xl", "64rem"),
    ("6xl", "72rem"),
    ("7xl", "80rem"),
];

/// The minimum width of a container-query tier.
pub fn container_breakpoint(tier: &str) -> Option<&'static str> {
    CONTAINER_BREAKPOINTS
        .iter()
        .find(|(name, _)| *name == tier)
        .map(|&(_, size)| size)
}

// ---------------------------------------------------------------------------
// ResolveScope
// ---------------------------------------------------------------------------

/// Which custom properties the literal pass may inline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolveScope {
    /// `--spacing` and `--spacing-*`.
    Spacing,
    /// `--color-*`.
    Colors,
    /// Every name in the table.
    #[default]
    All,
}

impl ResolveScope {
    /// Returns `true` if `name` falls inside this scope.
    pub fn includes(self, name: &str) -> bool {
        match self {
            ResolveScope::Spacing => name == "--spacing" || name.starts_with("--spacing-"),
            ResolveScope::Colors => name.starts_with("--color-"),
            ResolveScope::All => name.starts_with("--"),
        }
    }
}

/// An unknown resolve scope name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resolve scope '{0}', expected \"spacing\", \"colors\" or \"all\"")]
pub struct UnknownScope(pub String);

impl FromStr for ResolveScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spacing" => Ok(ResolveScope::Spacing),
            "colors" => Ok(ResolveScope::Colors),
            "all" => Ok(ResolveScope::All),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}

impl fmt::Display for ResolveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolveScope::Spacing => "spacing",
            ResolveScope::Colors => "colors",
            ResolveScope::All => "all",
        })
    }
}

// ---------------------------------------------------------------------------
// LiteralPass
// ---------------------------------------------------------------------------

/// Inline custom-property references against a literal theme table.
///
/// The table is injected as a synthetic `:root` rule at the head of the
/// sheet, references are resolved leniently against it, and the synthetic
/// rule is removed again. References outside the scope, or missing from the
/// table, are left as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralPass {
    pub scope: ResolveScope,
    pub table: Vec<(String, String)>,
}

impl LiteralPass {
    pub fn new(scope: ResolveScope) -> Self {
        Self {
            scope,
            table: Vec::new(),
        }
    }

    /// Add a table entry (builder).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.table.push((name.into(), value.into()));
        self
    }

    /// The pass without entries `globals` already declares.
    ///
    /// Inside [`compile`](crate::compile::compile) the pass runs before full
    /// resolution, so only the references the engine's own sheet leaves
    /// undeclared are filled from the table.
    pub fn yielding_to(&self, globals: &GlobalScope) -> LiteralPass {
        LiteralPass {
            scope: self.scope,
            table: self
                .table
                .iter()
                .filter(|(name, _)| globals.global(name).is_none())
                .cloned()
                .collect(),
        }
    }

    /// Apply the pass to a stylesheet tree.
    pub fn apply(&self, sheet: &mut StyleSheet) {
        let mut root = Rule::new(":root");
        for (name, value) in self.table.iter().filter(|(name, _)| self.scope.includes(name)) {
            root.push_declaration(Declaration::new(name.clone(), value.clone()));
        }
        if !root.has_declarations() {
            return;
        }
        tracing::debug!(scope = %self.scope, entries = root.children.len(), "applying literal pass");

        sheet.nodes.insert(0, Node::Rule(root));
        let scope = GlobalScope::collect_declared(sheet);
        vars::resolve_lenient(sheet, &scope);
        sheet.nodes.remove(0);
    }

    /// Apply the pass to CSS text.
    pub fn apply_to_css(&self, css: &str) -> Result<String, ParseError> {
        let mut sheet = parse_css(css)?;
        self.apply(&mut sheet);
        Ok(sheet.to_css())
    }
}
