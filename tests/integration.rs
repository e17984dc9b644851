//! Integration tests for tailskin.
//!
//! These tests drive the public API end to end, compiling style maps against
//! the in-memory Tailwind-shaped fixture engine.

use pretty_assertions::assert_eq;
use tailskin::testing::{tailwind_fixture, FailingEngine, FixtureEngine};
use tailskin::{
    compile, CompileError, CompileOptions, CompileOutput, LiteralPass, Phase, ResolveScope,
    StyleMap,
};

async fn compile_default(styles: &StyleMap) -> CompileOutput {
    compile(styles, &tailwind_fixture(), &CompileOptions::default())
        .await
        .unwrap_or_else(|e| panic!("compile failed: {e}"))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_name_all_tokens_known() {
    let styles = StyleMap::new().with("Button", "bg-blue-500 text-white");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Button {\n  background-color: oklch(62.3% 0.214 259.815);\n  color: #fff;\n}\n"
    );
    assert!(output.dts.contains("readonly Button: string;"));
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_unknown_token_only_warns() {
    let styles = StyleMap::new().with("Foo", "not-a-real-utility");
    let output = compile_default(&styles).await;
    assert!(!output.css.contains(".Foo"));
    assert_eq!(output.warnings, vec!["Foo: not-a-real-utility".to_string()]);
    assert!(output.dts.contains("readonly Foo: string;"));
}

#[tokio::test]
async fn test_shared_token_scoped_per_name() {
    let styles = StyleMap::new().with("A", "p-4").with("B", "p-4 text-white");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".A {\n  padding: calc(0.25rem * 4);\n}\n\n.B {\n  padding: calc(0.25rem * 4);\n  color: #fff;\n}\n"
    );
    assert!(!output.css.contains(".p-4"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_compilation_is_idempotent() {
    let styles = StyleMap::new()
        .with("Card", "group/card p-4 rounded-lg shadow-md unknown-thing")
        .with("Title", "text-sm group-hover/card:text-red-500");
    let first = compile_default(&styles).await;
    let second = compile_default(&styles).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_partial_resolution_keeps_known_tokens() {
    let styles = StyleMap::new().with("Mixed", "p-4 bogus flex nonsense bogus");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Mixed {\n  padding: calc(0.25rem * 4);\n  display: flex;\n}\n"
    );
    assert_eq!(output.warnings, vec!["Mixed: bogus, nonsense".to_string()]);
}

#[tokio::test]
async fn test_custom_properties_fully_resolved() {
    let styles = StyleMap::new()
        .with("Label", "text-sm font-bold border")
        .with("Icon", "before:absolute");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Label {\n  font-size: 0.875rem;\n  line-height: calc(1.25 / 0.875);\n  font-weight: 700;\n  border-style: solid;\n  border-width: 1px;\n}\n\n.Icon::before {\n  content: '';\n  position: absolute;\n}\n"
    );
    assert!(!output.css.contains("var("));
    assert!(!output.css.contains("--tw-"));
}

#[tokio::test]
async fn test_arbitrary_variant_gets_own_rule() {
    let styles = StyleMap::new()
        .with("List", "gap-[1rem] text-[red]:[&_svg]")
        .with("Nav", "text-[blue]:[a:hover]");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".List {\n  gap: 1rem;\n}\n\n.List svg {\n  color: red;\n}\n\n.Nav a:hover {\n  color: blue;\n}\n"
    );
}

#[tokio::test]
async fn test_invalid_variant_selector_dropped_silently() {
    let styles = StyleMap::new().with("Box", "p-4 color-[red]:[&_)]");
    let output = compile_default(&styles).await;
    assert_eq!(output.css, ".Box {\n  padding: calc(0.25rem * 4);\n}\n");
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_bracketed_variants_reach_engine() {
    let engine = FixtureEngine::new().utility(
        "data-[paused]:hidden",
        r".data-\[paused\]\:hidden { &[data-paused] { display: none; } }",
    );
    let styles = StyleMap::new().with("Icon", "data-[paused]:hidden max-[600px]:flex");
    let output = compile(&styles, &engine, &CompileOptions::default()).await.unwrap();
    assert_eq!(output.css, ".Icon[data-paused] {\n  display: none;\n}\n");
    assert_eq!(output.warnings, vec!["Icon: max-[600px]:flex".to_string()]);
}

#[tokio::test]
async fn test_responsive_rule_follows_its_base_rule() {
    let engine = FixtureEngine::new()
        .utility("block", ".block { display: block; }")
        .utility(
            "md:flex",
            r".md\:flex { @media (width >= 48rem) { display: flex; } }",
        );
    let styles = StyleMap::new().with("X", "md:flex").with("Y", "block md:flex");
    let output = compile(&styles, &engine, &CompileOptions::default()).await.unwrap();
    assert_eq!(
        output.css,
        "@media (width >= 48rem) {\n  .X {\n    display: flex;\n  }\n}\n\n.Y {\n  display: block;\n}\n\n@media (width >= 48rem) {\n  .Y {\n    display: flex;\n  }\n}\n"
    );
}

#[tokio::test]
async fn test_arbitrary_text_size() {
    let styles = StyleMap::new().with("Hint", "text-[14px] text-[#f50]");
    let output = compile_default(&styles).await;
    assert_eq!(output.css, ".Hint {\n  font-size: 14px;\n  color: #f50;\n}\n");
}

#[tokio::test]
async fn test_malformed_arbitrary_dropped_silently() {
    let styles = StyleMap::new().with("Box", "w-[10px p-[] p-4");
    let output = compile_default(&styles).await;
    assert_eq!(output.css, ".Box {\n  padding: calc(0.25rem * 4);\n}\n");
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_group_rewritten_to_owner() {
    let styles = StyleMap::new()
        .with("Card", "group/card p-4")
        .with("Title", "group-hover/card:text-red-500")
        .with("Item", "group flex")
        .with("Label", "group-hover:underline");
    let output = compile_default(&styles).await;
    assert!(output.css.contains(
        "@media (hover: hover) {\n  .Card:hover .Title {\n    color: oklch(63.7% 0.237 25.331);\n  }\n}\n"
    ));
    assert!(output.css.contains(
        "@media (hover: hover) {\n  .Item:hover .Label {\n    text-decoration-line: underline;\n  }\n}\n"
    ));
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_undeclared_group_left_unrewritten() {
    let styles = StyleMap::new().with("Title", "group-hover/card:text-red-500");
    let output = compile_default(&styles).await;
    assert!(output.css.contains(r".Title:is(.group\/card:hover *)"));
}

// ---------------------------------------------------------------------------
// Declaration cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_values_cleaned() {
    let styles = StyleMap::new().with("Glass", "blur-sm transition-colors");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Glass {\n  filter: blur(8px);\n  transition-property: color, background-color, border-color;\n  transition-timing-function: cubic-bezier(0.4, 0, 0.2, 1);\n  transition-duration: 150ms;\n}\n"
    );
}

#[tokio::test]
async fn test_explicit_value_beats_inherit() {
    let styles = StyleMap::new().with("Text", "text-inherit text-white");
    let output = compile_default(&styles).await;
    assert_eq!(output.css, ".Text {\n  color: #fff;\n}\n");
}

#[tokio::test]
async fn test_space_between_selector_simplified() {
    let styles = StyleMap::new().with("Stack", "space-y-4");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Stack > :not(:last-child) {\n  margin-block-start: calc(calc(0.25rem * 4) * 0);\n  margin-block-end: calc(calc(0.25rem * 4) * calc(1 - 0));\n}\n"
    );
}

// ---------------------------------------------------------------------------
// Conditional blocks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_containers_and_container_queries() {
    let styles = StyleMap::new().with("Panel", "@container/panel @md/panel:flex @sm:p-[2rem] @huge:flex");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        ".Panel {\n  container-type: inline-size;\n  container-name: panel;\n}\n\n@container panel (min-width: 28rem) {\n  .Panel {\n    display: flex;\n  }\n}\n\n@container (min-width: 24rem) {\n  .Panel {\n    padding: 2rem;\n  }\n}\n"
    );
}

#[tokio::test]
async fn test_top_level_media_rule() {
    let styles = StyleMap::new().with("Wide", "lg:p-12");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.css,
        "@media (width >= 64rem) {\n  .Wide {\n    padding: calc(0.25rem * 12);\n  }\n}\n"
    );
}

#[tokio::test]
async fn test_full_component_stylesheet() {
    let styles = StyleMap::new()
        .with("Card", "group/card @container/card p-4 rounded-lg shadow-md md:p-8")
        .with("Title", "text-sm font-bold group-hover/card:text-red-500")
        .with("Button", "bg-blue-500 text-white px-2 hover:bg-blue-600 transition-colors");
    let output = compile_default(&styles).await;

    insta::assert_snapshot!(output.css, @r###"
.Card {
  padding: calc(0.25rem * 4);
  border-radius: 0.5rem;
  box-shadow: 0 0 #0000, 0 0 #0000, 0 0 #0000, 0 0 #0000, 0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1);
  container-type: inline-size;
  container-name: card;
}

@media (width >= 48rem) {
  .Card {
    padding: calc(0.25rem * 8);
  }
}

.Title {
  font-size: 0.875rem;
  line-height: calc(1.25 / 0.875);
  font-weight: 700;
}

@media (hover: hover) {
  .Card:hover .Title {
    color: oklch(63.7% 0.237 25.331);
  }
}

.Button {
  background-color: oklch(62.3% 0.214 259.815);
  color: #fff;
  padding-inline: calc(0.25rem * 2);
  transition-property: color, background-color, border-color;
  transition-timing-function: cubic-bezier(0.4, 0, 0.2, 1);
  transition-duration: 150ms;
}

@media (hover: hover) {
  .Button:hover {
    background-color: oklch(54.6% 0.245 262.881);
  }
}
"###);

    assert_eq!(
        output.dts,
        "declare const styles: {\n  readonly Card: string;\n  readonly Title: string;\n  readonly Button: string;\n};\nexport default styles;\n"
    );
    assert!(output.warnings.is_empty());
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_strict_mode_fails_on_unresolved() {
    let styles = StyleMap::new().with("Foo", "p-4 nope").with("Bar", "zip");
    let options = CompileOptions::default().with_strict(true);
    let err = compile(&styles, &tailwind_fixture(), &options).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Synthesize);
    match err {
        CompileError::Unresolved { warnings } => {
            assert_eq!(warnings, vec!["Foo: nope".to_string(), "Bar: zip".to_string()]);
        }
        other => panic!("expected unresolved error, got {other}"),
    }
}

#[tokio::test]
async fn test_strict_mode_passes_when_all_known() {
    let styles = StyleMap::new().with("Foo", "p-4 group");
    let options = CompileOptions::default().with_strict(true);
    let output = compile(&styles, &tailwind_fixture(), &options).await.unwrap();
    assert!(output.css.contains(".Foo"));
}

#[tokio::test]
async fn test_engine_failure_aborts() {
    let styles = StyleMap::new().with("Button", "p-4");
    let err = compile(&styles, &FailingEngine::new("offline"), &CompileOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.phase(), Phase::Generate);
    assert_eq!(
        err.to_string(),
        "generate phase failed: generation engine error: engine rejected the request: offline"
    );
}

#[tokio::test]
async fn test_literal_pass_limited_to_scope() {
    let engine = FixtureEngine::new()
        .with_preamble(":root { --spacing: 0.25rem; }")
        .utility("p-card", ".p-card { padding: var(--spacing-card); }")
        .utility("gap-4", ".gap-4 { gap: calc(var(--spacing) * 4); }")
        .utility("bg-card", ".bg-card { background-color: var(--color-card, red); }");
    let styles = StyleMap::new().with("Box", "p-card gap-4 bg-card");
    let pass = LiteralPass::new("spacing".parse::<ResolveScope>().unwrap())
        .with("--spacing", "4px")
        .with("--spacing-card", "12px")
        .with("--color-card", "blue");
    let options = CompileOptions::default().with_literal(pass);
    let output = compile(&styles, &engine, &options).await.unwrap();
    assert_eq!(
        output.css,
        ".Box {\n  padding: 12px;\n  gap: calc(0.25rem * 4);\n  background-color: red;\n}\n"
    );
}

#[tokio::test]
async fn test_dts_lists_every_name() {
    let styles = StyleMap::new().with("Empty", "").with("Foo", "nope").with("card-title", "p-4");
    let output = compile_default(&styles).await;
    assert_eq!(
        output.dts,
        "declare const styles: {\n  readonly Empty: string;\n  readonly Foo: string;\n  readonly \"card-title\": string;\n};\nexport default styles;\n"
    );
    assert!(output.css.contains(".card-title {"));
}

#[tokio::test]
async fn test_independent_compilations_run_concurrently() {
    let engine = tailwind_fixture();
    let options = CompileOptions::default();
    let a = StyleMap::new().with("A", "p-4");
    let b = StyleMap::new().with("B", "flex");
    let (ra, rb) = tokio::join!(compile(&a, &engine, &options), compile(&b, &engine, &options));
    assert_eq!(ra.unwrap().css, ".A {\n  padding: calc(0.25rem * 4);\n}\n");
    assert_eq!(rb.unwrap().css, ".B {\n  display: flex;\n}\n");
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_custom_fixture_engine() {
    let engine = FixtureEngine::new()
        .with_preamble(":root { --brand: #f50; }")
        .utility("bg-brand", ".bg-brand { background-color: var(--brand, red); }")
        .utility("ring", ".ring { box-shadow: var(--tw-ring-shadow); }");
    let styles = StyleMap::new().with("Hero", "bg-brand ring");
    let output = compile(&styles, &engine, &CompileOptions::default()).await.unwrap();
    assert_eq!(
        output.css,
        ".Hero {\n  background-color: #f50;\n  box-shadow: 0 0 #0000;\n}\n"
    );
}

#[cfg(feature = "macros")]
#[tokio::test]
async fn test_skin_macro_builds_style_map() {
    let styles = tailskin::skin! {
        Button: "bg-blue-500 text-white",
        "card-title": "p-4",
    };
    assert_eq!(styles.names().collect::<Vec<_>>(), vec!["Button", "card-title"]);
    let output = compile_default(&styles).await;
    assert!(output.css.contains(".Button {"));
}
