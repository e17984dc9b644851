//! Compilation driver: StyleMap in, `{css, dts, warnings}` out.
//!
//! One call runs every phase strictly in order: classify, generate (the
//! single engine call), index, synthesize, flatten and simplify, the optional
//! literal pass, custom-property resolution, normalization. Nothing is cached
//! between calls, so independent compilations can run concurrently.

use std::collections::HashSet;

use tracing::Instrument;

use crate::classify::{classify, is_marker, looks_arbitrary, ClassifiedStyle};
use crate::css::parser::parse_css;
use crate::engine::{GenerationEngine, GenerationRequest};
use crate::error::{CompileError, CompileResult, Phase};
use crate::flatten::{flatten, group_owners, simplify};
use crate::index::RuleIndex;
use crate::normalize::{normalize, type_declaration};
use crate::synth::{Synthesizer, Unresolved};
use crate::theme::LiteralPass;
use crate::vars::{self, GlobalScope};

// ---------------------------------------------------------------------------
// StyleMap
// ---------------------------------------------------------------------------

/// Ordered map of semantic name → raw utility string.
///
/// Iteration follows insertion order. Re-inserting a name replaces its
/// utilities in place.
///
/// # Examples
///
/// ```
/// use tailskin::StyleMap;
///
/// let styles = StyleMap::new()
///     .with("Button", "bg-blue-500 text-white")
///     .with("Card", "p-4 rounded-lg");
/// assert_eq!(styles.names().collect::<Vec<_>>(), vec!["Button", "Card"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a name, returning the utilities it replaced.
    pub fn insert(&mut self, name: impl Into<String>, utilities: impl Into<String>) -> Option<String> {
        let name = name.into();
        let utilities = utilities.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, utilities)),
            None => {
                self.entries.push((name, utilities));
                None
            }
        }
    }

    /// Insert a name (builder).
    pub fn with(mut self, name: impl Into<String>, utilities: impl Into<String>) -> Self {
        self.insert(name, utilities);
        self
    }

    /// The utilities of a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, u)| u.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, utilities)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl<N: Into<String>, U: Into<String>> FromIterator<(N, U)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (N, U)>>(iter: T) -> Self {
        let mut map = StyleMap::new();
        for (name, utilities) in iter {
            map.insert(name, utilities);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Options and output
// ---------------------------------------------------------------------------

/// Compilation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Engine theme overrides, custom property → value.
    pub theme: Vec<(String, String)>,
    /// Report unresolved tokens in [`CompileOutput::warnings`].
    pub collect_warnings: bool,
    /// Fail with [`CompileError::Unresolved`] instead of warning.
    pub strict: bool,
    /// Inline custom properties against a literal theme table.
    pub literal: Option<LiteralPass>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            theme: Vec::new(),
            collect_warnings: true,
            strict: false,
            literal: None,
        }
    }
}

impl CompileOptions {
    /// Add a theme override (builder).
    pub fn with_theme(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.theme.push((name.into(), value.into()));
        self
    }

    /// Enable or disable warning collection (builder).
    pub fn with_warnings(mut self, collect: bool) -> Self {
        self.collect_warnings = collect;
        self
    }

    /// Enable or disable strict mode (builder).
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the literal pass (builder).
    pub fn with_literal(mut self, pass: LiteralPass) -> Self {
        self.literal = Some(pass);
        self
    }
}

/// The result of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    /// Final stylesheet text.
    pub css: String,
    /// Type declaration with one member per style map name.
    pub dts: String,
    /// One `"Name: token, token"` line per name with unresolved tokens.
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

/// Every distinct token the engine must generate, first-seen order: simple
/// tokens (markers excluded) and non-arbitrary container-query utilities.
pub fn vocabulary<'a, I>(styles: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ClassifiedStyle>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut out = Vec::new();
    for style in styles {
        let simple = style.simple_classes.iter().filter(|t| !is_marker(t));
        let queried = style
            .container_queries
            .iter()
            .map(|q| &q.utility)
            .filter(|u| !looks_arbitrary(u));
        for token in simple.chain(queried) {
            if seen.insert(token.as_str()) {
                out.push(token.clone());
            }
        }
    }
    out
}

/// Compile a style map into scoped CSS, a type declaration and warnings.
///
/// The engine is called exactly once. Engine failures, unparseable engine
/// output and flattening failures are fatal; in strict mode so are
/// unresolved tokens. Everything else degrades to "no output for this item".
pub async fn compile<E>(
    styles: &StyleMap,
    engine: &E,
    options: &CompileOptions,
) -> CompileResult<CompileOutput>
where
    E: GenerationEngine + ?Sized,
{
    let span = tracing::info_span!("compile", names = styles.len());
    run(styles, engine, options).instrument(span).await
}

async fn run<E>(styles: &StyleMap, engine: &E, options: &CompileOptions) -> CompileResult<CompileOutput>
where
    E: GenerationEngine + ?Sized,
{
    let classified: Vec<(&str, ClassifiedStyle)> =
        styles.iter().map(|(name, raw)| (name, classify(raw))).collect();
    let candidates = vocabulary(classified.iter().map(|(_, style)| style));
    tracing::debug!(vocabulary = candidates.len(), "classified style map");

    let request = GenerationRequest::new(candidates, &options.theme);
    let generated = engine
        .generate(&request)
        .await
        .map_err(|source| CompileError::Engine {
            phase: Phase::Generate,
            source,
        })?;

    let sheet = parse_css(&generated).map_err(|source| CompileError::GeneratedCss {
        phase: Phase::Index,
        source,
    })?;
    let index = RuleIndex::build(&sheet);
    let scope = GlobalScope::collect(&sheet).with_overrides(&options.theme);

    let mut synth = Synthesizer::new(&index);
    for (name, style) in &classified {
        synth.add(name, style);
    }
    let (root, unresolved) = synth.finish();

    let warnings: Vec<String> = unresolved.iter().map(Unresolved::warning).collect();
    if options.strict && !warnings.is_empty() {
        return Err(CompileError::Unresolved { warnings });
    }
    if options.collect_warnings {
        for warning in &warnings {
            tracing::warn!(%warning, "unresolved utility tokens");
        }
    }

    let groups = group_owners(classified.iter().map(|(name, style)| (*name, style)));
    let mut root = flatten(&root)?;
    simplify(&mut root, &groups)?;
    tracing::debug!(nodes = root.nodes.len(), groups = groups.len(), "flattened output tree");

    if let Some(pass) = &options.literal {
        pass.yielding_to(&scope).apply(&mut root);
    }
    vars::resolve(&mut root, &scope);
    normalize(&mut root);
    tracing::debug!(nodes = root.nodes.len(), "normalized output tree");

    Ok(CompileOutput {
        css: root.to_css(),
        dts: type_declaration(styles.names()),
        warnings: if options.collect_warnings {
            warnings
        } else {
            Vec::new()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tailwind_fixture, FixtureEngine};
    use pretty_assertions::assert_eq;

    // ── StyleMap ────────────────────────────────────────────────────

    #[test]
    fn style_map_keeps_insertion_order_and_replaces_in_place() {
        let mut styles = StyleMap::new().with("B", "p-4").with("A", "m-2");
        assert_eq!(styles.insert("B", "p-8"), Some("p-4".to_string()));
        assert_eq!(styles.iter().collect::<Vec<_>>(), vec![("B", "p-8"), ("A", "m-2")]);
        assert_eq!(styles.get("A"), Some("m-2"));
        assert_eq!(styles.get("C"), None);
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn style_map_from_iterator() {
        let styles: StyleMap = [("A", "p-4"), ("B", "m-2"), ("A", "flex")].into_iter().collect();
        assert_eq!(styles.iter().collect::<Vec<_>>(), vec![("A", "flex"), ("B", "m-2")]);
    }

    #[test]
    fn options_defaults_and_builders() {
        let options = CompileOptions::default();
        assert!(options.collect_warnings);
        assert!(!options.strict);
        assert!(options.literal.is_none());

        let options = options.with_theme("--color-brand", "#f50").with_strict(true).with_warnings(false);
        assert_eq!(options.theme, vec![("--color-brand".to_string(), "#f50".to_string())]);
        assert!(options.strict);
        assert!(!options.collect_warnings);
    }

    // ── Vocabulary ──────────────────────────────────────────────────

    #[test]
    fn vocabulary_dedupes_and_skips_markers() {
        let a = classify("p-4 group/card flex w-[3px] @md:grid @sm:w-[1px]");
        let b = classify("flex p-4 peer grid text-white");
        assert_eq!(vocabulary([&a, &b]), vec!["p-4", "flex", "grid", "text-white"]);
    }

    // ── Pipeline ────────────────────────────────────────────────────

    #[tokio::test]
    async fn engine_called_once() {
        let engine = tailwind_fixture();
        let styles = StyleMap::new().with("A", "p-4").with("B", "p-4 flex").with("C", "");
        compile(&styles, &engine, &CompileOptions::default()).await.unwrap();
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn disabled_warnings_are_empty() {
        let engine = tailwind_fixture();
        let styles = StyleMap::new().with("Foo", "nope");
        let options = CompileOptions::default().with_warnings(false);
        let output = compile(&styles, &engine, &options).await.unwrap();
        assert!(output.warnings.is_empty());
        assert_eq!(output.css, "");
    }

    #[tokio::test]
    async fn unparseable_engine_output_is_fatal() {
        let engine = FixtureEngine::new().with_preamble(".a { color: red;");
        let styles = StyleMap::new().with("A", "p-4");
        let err = compile(&styles, &engine, &CompileOptions::default()).await.unwrap_err();
        assert!(matches!(err, CompileError::GeneratedCss { .. }));
        assert_eq!(err.phase(), Phase::Index);
    }

    #[tokio::test]
    async fn theme_overrides_reach_engine_and_resolver() {
        let engine = FixtureEngine::new().utility("bg-brand", ".bg-brand { background-color: var(--color-brand); }");
        let styles = StyleMap::new().with("Hero", "bg-brand");
        let options = CompileOptions::default().with_theme("--color-brand", "#ff5500");
        let output = compile(&styles, &engine, &options).await.unwrap();
        assert_eq!(output.css, ".Hero {\n  background-color: #ff5500;\n}\n");
    }
}
