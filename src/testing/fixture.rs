//! FixtureEngine: an in-memory stand-in for the utility-CSS engine.
//!
//! The engine answers from a table of utility → CSS snippet. Requested
//! candidates are emitted inside `@layer utilities { }` in table order, after
//! the preamble and any theme overrides, the way a real engine sorts its
//! output independently of the request order.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{EngineError, GenerationEngine, GenerationRequest};

// ---------------------------------------------------------------------------
// FixtureEngine
// ---------------------------------------------------------------------------

/// A deterministic generation engine backed by a snippet table.
///
/// # Examples
///
/// ```
/// use tailskin::testing::FixtureEngine;
///
/// let engine = FixtureEngine::new()
///     .utility("p-4", ".p-4 { padding: 1rem; }")
///     .utility("m-2", ".m-2 { margin: 0.5rem; }");
/// assert_eq!(engine.render(&["m-2".to_string()], &[]).trim(), "@layer utilities {\n.m-2 { margin: 0.5rem; }\n}");
/// ```
#[derive(Debug, Default)]
pub struct FixtureEngine {
    preamble: String,
    utilities: Vec<(String, String)>,
    calls: AtomicUsize,
}

impl FixtureEngine {
    /// Create an engine with an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set CSS emitted before every response (builder).
    pub fn with_preamble(mut self, css: impl Into<String>) -> Self {
        self.preamble = css.into();
        self
    }

    /// Add the CSS the engine emits for `token` (builder).
    ///
    /// Re-adding a token replaces its snippet in place.
    pub fn utility(mut self, token: impl Into<String>, css: impl Into<String>) -> Self {
        let token = token.into();
        let css = css.into();
        match self.utilities.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = css,
            None => self.utilities.push((token, css)),
        }
        self
    }

    /// Returns `true` if the table has a snippet for `token`.
    pub fn knows(&self, token: &str) -> bool {
        self.utilities.iter().any(|(t, _)| t == token)
    }

    /// Number of times [`GenerationEngine::generate`] was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Render the stylesheet the engine answers for these candidates.
    pub fn render(&self, candidates: &[String], theme: &[(String, String)]) -> String {
        let mut out = String::new();
        if !self.preamble.is_empty() {
            out.push_str(&self.preamble);
            out.push('\n');
        }

        if !theme.is_empty() {
            out.push_str(":root, :host {\n");
            for (name, value) in theme {
                let _ = writeln!(out, "  {name}: {value};");
            }
            out.push_str("}\n");
        }

        let matched: Vec<&str> = self
            .utilities
            .iter()
            .filter(|(token, _)| candidates.iter().any(|c| c == token))
            .map(|(_, css)| css.as_str())
            .collect();
        if !matched.is_empty() {
            out.push_str("@layer utilities {\n");
            for css in matched {
                out.push_str(css);
                out.push('\n');
            }
            out.push_str("}\n");
        }

        out
    }
}

impl GenerationEngine for FixtureEngine {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.render(&request.candidates, &request.theme))
    }
}

// ---------------------------------------------------------------------------
// FailingEngine
// ---------------------------------------------------------------------------

/// An engine that rejects every request with the given message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingEngine {
    message: String,
}

impl FailingEngine {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl GenerationEngine for FailingEngine {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, EngineError> {
        Err(EngineError::Rejected(self.message.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tailwind-shaped fixture
// ---------------------------------------------------------------------------

const THEME_PREAMBLE: &str = r#"@layer theme {
  :root, :host {
    --color-blue-500: oklch(62.3% 0.214 259.815);
    --color-blue-600: oklch(54.6% 0.245 262.881);
    --color-red-500: oklch(63.7% 0.237 25.331);
    --color-white: #fff;
    --spacing: 0.25rem;
    --radius-lg: 0.5rem;
    --text-sm: 0.875rem;
    --text-sm--line-height: calc(1.25 / 0.875);
    --font-weight-bold: 700;
    --blur-sm: 8px;
    --default-transition-duration: 150ms;
    --default-transition-timing-function: cubic-bezier(0.4, 0, 0.2, 1);
  }
}
@property --tw-border-style {
  syntax: "*";
  inherits: false;
  initial-value: solid;
}
@property --tw-content {
  syntax: "*";
  inherits: false;
}"#;

const UTILITIES: &[(&str, &str)] = &[
    (
        "bg-blue-500",
        ".bg-blue-500 { background-color: var(--color-blue-500); }",
    ),
    (
        "hover:bg-blue-600",
        r".hover\:bg-blue-600 { &:hover { @media (hover: hover) { background-color: var(--color-blue-600); } } }",
    ),
    ("text-white", ".text-white { color: var(--color-white); }"),
    ("text-inherit", ".text-inherit { color: inherit; }"),
    (
        "text-sm",
        ".text-sm { font-size: var(--text-sm); line-height: var(--tw-leading, var(--text-sm--line-height)); }",
    ),
    (
        "font-bold",
        ".font-bold { --tw-font-weight: var(--font-weight-bold); font-weight: var(--font-weight-bold); }",
    ),
    ("p-4", ".p-4 { padding: calc(var(--spacing) * 4); }"),
    ("px-2", ".px-2 { padding-inline: calc(var(--spacing) * 2); }"),
    (
        "md:p-8",
        r".md\:p-8 { @media (width >= 48rem) { padding: calc(var(--spacing) * 8); } }",
    ),
    (
        "lg:p-12",
        r"@media (width >= 64rem) { .lg\:p-12 { padding: calc(var(--spacing) * 12); } }",
    ),
    ("rounded-lg", ".rounded-lg { border-radius: var(--radius-lg); }"),
    (
        "border",
        ".border { border-style: var(--tw-border-style); border-width: 1px; }",
    ),
    (
        "shadow-md",
        ".shadow-md { --tw-shadow: 0 4px 6px -1px var(--tw-shadow-color, rgb(0 0 0 / 0.1)), 0 2px 4px -2px var(--tw-shadow-color, rgb(0 0 0 / 0.1)); box-shadow: var(--tw-inset-shadow), var(--tw-inset-ring-shadow), var(--tw-ring-offset-shadow), var(--tw-ring-shadow), var(--tw-shadow); }",
    ),
    (
        "blur-sm",
        ".blur-sm { --tw-blur: blur(var(--blur-sm)); filter: var(--tw-blur,) var(--tw-brightness,) var(--tw-contrast,) var(--tw-grayscale,) var(--tw-drop-shadow,); }",
    ),
    (
        "transition-colors",
        ".transition-colors { transition-property: color, background-color, border-color, --tw-gradient-from, --tw-gradient-to; transition-timing-function: var(--tw-ease, var(--default-transition-timing-function)); transition-duration: var(--tw-duration, var(--default-transition-duration)); }",
    ),
    (
        "space-y-4",
        ".space-y-4 { :where(& > :not(:last-child)) { --tw-space-y-reverse: 0; margin-block-start: calc(calc(var(--spacing) * 4) * var(--tw-space-y-reverse)); margin-block-end: calc(calc(var(--spacing) * 4) * calc(1 - var(--tw-space-y-reverse))); } }",
    ),
    (
        "group-hover:underline",
        r".group-hover\:underline { &:is(:where(.group):hover *) { @media (hover: hover) { text-decoration-line: underline; } } }",
    ),
    (
        "group-hover/card:text-red-500",
        r".group-hover\/card\:text-red-500 { &:is(:where(.group\/card):hover *) { @media (hover: hover) { color: var(--color-red-500); } } }",
    ),
    (
        "before:absolute",
        r".before\:absolute { &::before { content: var(--tw-content); position: absolute; } }",
    ),
    ("underline", ".underline { text-decoration-line: underline; }"),
    ("flex", ".flex { display: flex; }"),
];

/// A [`FixtureEngine`] preloaded with Tailwind-v4-shaped output.
pub fn tailwind_fixture() -> FixtureEngine {
    UTILITIES
        .iter()
        .fold(FixtureEngine::new().with_preamble(THEME_PREAMBLE), |engine, (token, css)| {
            engine.utility(*token, *css)
        })
}
