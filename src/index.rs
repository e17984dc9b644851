//! Rule index: generated rules keyed by the class names they match.
//!
//! The engine's stylesheet is walked once. Every style rule is recorded under
//! each class its selector touches, in both the raw (escaped) and decoded
//! spelling, together with the chain of conditional at-rules around it.
//! `@layer` blocks are transparent; they are descended but not recorded.

use std::collections::HashMap;

use crate::css::model::{AtRule, Node, Rule, StyleSheet};
use crate::css::selector::{unescape_ident, SelectorList};

/// One indexed rule and the conditional at-rules enclosing it, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry<'a> {
    pub rule: &'a Rule,
    pub ancestors: Vec<&'a AtRule>,
}

impl IndexEntry<'_> {
    /// Returns `true` if the rule applies unconditionally.
    pub fn is_unconditional(&self) -> bool {
        self.ancestors.is_empty()
    }
}

/// Read-only lookup from utility token to the generated rules it produced.
#[derive(Debug, Default)]
pub struct RuleIndex<'a> {
    entries: HashMap<String, Vec<IndexEntry<'a>>>,
    rules: usize,
}

impl<'a> RuleIndex<'a> {
    /// Index every style rule of a generated stylesheet.
    pub fn build(sheet: &'a StyleSheet) -> Self {
        let mut index = Self::default();
        let mut chain = Vec::new();
        index.walk(&sheet.nodes, &mut chain);
        tracing::debug!(rules = index.rules, keys = index.entries.len(), "built rule index");
        index
    }

    /// Rules generated for `token`, in stylesheet order.
    pub fn get(&self, token: &str) -> Option<&[IndexEntry<'a>]> {
        self.entries.get(token).map(Vec::as_slice)
    }

    /// Returns `true` if at least one rule matches `token`.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Number of distinct keys (spellings) in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rules that were indexed under at least one key.
    pub fn rule_count(&self) -> usize {
        self.rules
    }

    fn walk(&mut self, nodes: &'a [Node], chain: &mut Vec<&'a AtRule>) {
        for node in nodes {
            match node {
                Node::Rule(rule) => self.insert(rule, chain),
                Node::AtRule(at) => {
                    let Some(children) = &at.children else {
                        continue;
                    };
                    if at.name == "layer" {
                        self.walk(children, chain);
                    } else if at.is_conditional() {
                        chain.push(at);
                        self.walk(children, chain);
                        chain.pop();
                    }
                }
                Node::Declaration(_) => {}
            }
        }
    }

    fn insert(&mut self, rule: &'a Rule, chain: &[&'a AtRule]) {
        let list = match SelectorList::parse(&rule.selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::trace!(selector = %rule.selector, %err, "skipping unparseable rule");
                return;
            }
        };

        let classes = list.classes();
        if classes.is_empty() {
            return;
        }
        self.rules += 1;

        for raw in classes {
            let decoded = unescape_ident(&raw);
            let keys = if decoded == raw {
                vec![raw]
            } else {
                vec![raw, decoded]
            };
            for key in keys {
                let bucket = self.entries.entry(key).or_default();
                // Two spellings of one class decode to the same key.
                let duplicate = bucket.last().is_some_and(|e| std::ptr::eq(e.rule, rule));
                if !duplicate {
                    bucket.push(IndexEntry {
                        rule,
                        ancestors: chain.to_vec(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_css;

    fn sheet(css: &str) -> StyleSheet {
        parse_css(css).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    #[test]
    fn indexes_plain_rule() {
        let sheet = sheet(".p-4 { padding: 1rem; }");
        let index = RuleIndex::build(&sheet);
        let entries = index.get("p-4").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rule.selector, ".p-4");
        assert!(entries[0].is_unconditional());
        assert_eq!(index.rule_count(), 1);
    }

    #[test]
    fn indexes_both_spellings() {
        let sheet = sheet(r".hover\:bg-x { &:hover { color: red; } }");
        let index = RuleIndex::build(&sheet);
        assert!(index.contains("hover:bg-x"));
        assert!(index.contains(r"hover\:bg-x"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn layers_are_transparent_and_conditions_recorded() {
        let sheet = sheet(
            "@layer utilities { @media (width >= 64rem) { @supports (display: grid) { .lg\\:grid { display: grid; } } } }",
        );
        let index = RuleIndex::build(&sheet);
        let entry = &index.get("lg:grid").unwrap()[0];
        let chain: Vec<&str> = entry.ancestors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(chain, vec!["media", "supports"]);
        assert_eq!(entry.ancestors[0].params, "(width >= 64rem)");
    }

    #[test]
    fn rules_without_classes_are_ignored() {
        let sheet = sheet(":root, :host { --spacing: 0.25rem; } * { margin: 0; } .a { color: red; }");
        let index = RuleIndex::build(&sheet);
        assert_eq!(index.rule_count(), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn keyframes_and_property_are_not_descended() {
        let sheet = sheet(
            "@keyframes spin { to { transform: rotate(360deg); } } @property --tw-x { syntax: \"*\"; inherits: false; }",
        );
        assert!(RuleIndex::build(&sheet).is_empty());
    }

    #[test]
    fn group_rule_indexed_under_every_class() {
        let sheet = sheet(r".group:hover .group-hover\:underline { text-decoration-line: underline; }");
        let index = RuleIndex::build(&sheet);
        assert!(index.contains("group"));
        assert!(index.contains("group-hover:underline"));
    }

    #[test]
    fn one_rule_per_token_in_order() {
        let sheet = sheet(".a { color: red; } .a { margin: 0; } .b { color: blue; }");
        let index = RuleIndex::build(&sheet);
        let entries = index.get("a").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].rule.declarations().next().unwrap().property, "margin");
        assert!(index.get("c").is_none());
    }
}
