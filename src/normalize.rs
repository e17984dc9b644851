//! Declaration normalizer and type declaration builder.

use std::fmt::Write as _;

use crate::css::model::{Declaration, Node, Rule, StyleSheet};

/// Normalize every rule of the sheet in place, then drop rules and block
/// at-rules left empty.
pub fn normalize(sheet: &mut StyleSheet) {
    normalize_nodes(&mut sheet.nodes);
}

fn normalize_nodes(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        match node {
            Node::Rule(rule) => normalize_rule(rule),
            Node::AtRule(at) => {
                if let Some(children) = &mut at.children {
                    normalize_nodes(children);
                }
            }
            Node::Declaration(_) => {}
        }
    }
    nodes.retain(|node| match node {
        Node::Rule(rule) => !rule.children.is_empty(),
        Node::AtRule(at) => at.children.as_ref().map_or(true, |c| !c.is_empty()),
        Node::Declaration(_) => true,
    });
}

/// Clean list values, drop exact duplicates, then settle `inherit` conflicts.
pub fn normalize_rule(rule: &mut Rule) {
    let mut decls: Vec<Declaration> = Vec::new();
    let mut others: Vec<Node> = Vec::new();

    for node in std::mem::take(&mut rule.children) {
        match node {
            Node::Declaration(decl) => {
                let Some(decl) = clean_value(decl) else {
                    continue;
                };
                if !decls.contains(&decl) {
                    decls.push(decl);
                }
            }
            Node::Rule(mut nested) => {
                normalize_rule(&mut nested);
                others.push(Node::Rule(nested));
            }
            other => others.push(other),
        }
    }

    let overridden: Vec<String> = decls
        .iter()
        .filter(|d| !is_inherit(&d.value))
        .filter(|d| decls.iter().any(|o| o.property == d.property && is_inherit(&o.value)))
        .map(|d| d.property.clone())
        .collect();
    decls.retain(|d| !(is_inherit(&d.value) && overridden.contains(&d.property)));

    rule.children = decls.into_iter().map(Node::Declaration).chain(others).collect();
}

fn is_inherit(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("inherit")
}

/// Property-specific value cleanup. `None` removes the declaration.
fn clean_value(mut decl: Declaration) -> Option<Declaration> {
    let value = decl.value.trim();
    let cleaned = match decl.property.as_str() {
        "box-shadow" | "text-shadow" => split_top_level(value, ',')
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        "filter" | "backdrop-filter" => value.split_whitespace().collect::<Vec<_>>().join(" "),
        "transition" | "transition-property" if value.contains("--tw-") => {
            split_top_level(value, ',')
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.contains("--tw-"))
                .collect::<Vec<_>>()
                .join(", ")
        }
        "content" if value.is_empty() => "''".to_string(),
        _ => value.to_string(),
    };

    if cleaned.is_empty() {
        tracing::trace!(property = %decl.property, "dropping declaration with empty list value");
        return None;
    }
    decl.value = cleaned;
    Some(decl)
}

/// Split on `sep` outside parentheses and quotes.
fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

// ---------------------------------------------------------------------------
// Type declaration
// ---------------------------------------------------------------------------

/// Build the type declaration: one `readonly` member per name, in order.
///
/// Names that are not plain identifiers are emitted as quoted keys.
pub fn type_declaration<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::from("declare const styles: {\n");
    for name in names {
        if is_identifier(name) {
            let _ = writeln!(out, "  readonly {name}: string;");
        } else {
            let _ = writeln!(out, "  readonly \"{}\": string;", name.replace('\\', "\\\\").replace('"', "\\\""));
        }
    }
    out.push_str("};\nexport default styles;\n");
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_css;
    use pretty_assertions::assert_eq;

    fn normalized(css: &str) -> String {
        let mut sheet = parse_css(css).unwrap();
        normalize(&mut sheet);
        sheet.to_css()
    }

    // ── Declarations ────────────────────────────────────────────────

    #[test]
    fn exact_duplicates_removed() {
        assert_eq!(
            normalized(".a { color: red; margin: 0; color: red; color: blue; }"),
            ".a {\n  color: red;\n  margin: 0;\n  color: blue;\n}\n"
        );
    }

    #[test]
    fn explicit_value_beats_inherit() {
        assert_eq!(
            normalized(".a { color: inherit; color: #fff; font: inherit; }"),
            ".a {\n  color: #fff;\n  font: inherit;\n}\n"
        );
    }

    #[test]
    fn shadow_segments_cleaned() {
        assert_eq!(
            normalized(".a { box-shadow: , 0 0 #0000,  , 0 1px rgb(0, 0, 0) ; text-shadow: , ; }"),
            ".a {\n  box-shadow: 0 0 #0000, 0 1px rgb(0, 0, 0);\n}\n"
        );
    }

    #[test]
    fn filter_whitespace_collapsed() {
        assert_eq!(
            normalized(".a { filter: blur(8px)     drop-shadow(0 1px  2px red)  ; backdrop-filter:   ; }"),
            ".a {\n  filter: blur(8px) drop-shadow(0 1px 2px red);\n}\n"
        );
    }

    #[test]
    fn transition_scaffolding_removed() {
        assert_eq!(
            normalized(".a { transition-property: color, --tw-gradient-from, background-color, --tw-gradient-to; }"),
            ".a {\n  transition-property: color, background-color;\n}\n"
        );
        assert_eq!(normalized(".a { transition-property: --tw-x; }"), "");
        assert_eq!(
            normalized(".a { transition: opacity 150ms; }"),
            ".a {\n  transition: opacity 150ms;\n}\n"
        );
    }

    #[test]
    fn empty_content_becomes_empty_string() {
        let mut rule = Rule::new(".a::before");
        rule.push_declaration(Declaration::new("content", ""));
        normalize_rule(&mut rule);
        assert_eq!(rule.declarations().next().unwrap().value, "''");
    }

    #[test]
    fn empty_rules_removed() {
        assert_eq!(normalized("@media (x) { .a { box-shadow: ,; } }"), "");
    }

    #[test]
    fn split_respects_parens_and_quotes() {
        assert_eq!(split_top_level("a(1, 2), 'x,y', b", ','), vec!["a(1, 2)", " 'x,y'", " b"]);
    }

    // ── Type declaration ────────────────────────────────────────────

    #[test]
    fn dts_lists_names_in_order() {
        assert_eq!(
            type_declaration(["Button", "Card"]),
            "declare const styles: {\n  readonly Button: string;\n  readonly Card: string;\n};\nexport default styles;\n"
        );
    }

    #[test]
    fn dts_quotes_non_identifiers() {
        let dts = type_declaration(["card-title"]);
        assert!(dts.contains("  readonly \"card-title\": string;\n"));
    }

    #[test]
    fn dts_for_no_names() {
        assert_eq!(type_declaration([]), "declare const styles: {\n};\nexport default styles;\n");
    }
}
