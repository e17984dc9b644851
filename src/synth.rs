//! Scoped rule synthesizer: build the output tree, one semantic name at a time.
//!
//! For every simple token the generated rules indexed under it are cloned,
//! rescoped from the token's class to the semantic name's class, and wrapped
//! back into their conditional at-rules. Declarations authored directly in
//! the utility string (container markers, arbitrary values) go on the name's
//! own top-level rule; container queries get their own `@container` block.

use std::collections::HashSet;

use crate::classify::{container_marker_name, is_marker, parse_arbitrary, ClassifiedStyle};
use crate::css::model::{AtRule, Declaration, Node, Rule, StyleSheet};
use crate::css::selector::{escape_ident, SelectorList};
use crate::index::{IndexEntry, RuleIndex};
use crate::theme::container_breakpoint;

/// Tokens of one semantic name that matched no generated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub name: String,
    pub tokens: Vec<String>,
}

impl Unresolved {
    /// The warning line for this name: `"Name: tok, tok"`.
    pub fn warning(&self) -> String {
        format!("{}: {}", self.name, self.tokens.join(", "))
    }
}

/// Accumulates the output tree across semantic names.
#[derive(Debug)]
pub struct Synthesizer<'i, 'a> {
    index: &'i RuleIndex<'a>,
    root: StyleSheet,
    seen: HashSet<String>,
    unresolved: Vec<Unresolved>,
}

impl<'i, 'a> Synthesizer<'i, 'a> {
    pub fn new(index: &'i RuleIndex<'a>) -> Self {
        Self {
            index,
            root: StyleSheet::new(),
            seen: HashSet::new(),
            unresolved: Vec::new(),
        }
    }

    /// Synthesize every rule for one semantic name.
    pub fn add(&mut self, name: &str, style: &ClassifiedStyle) {
        let scope = format!(".{}", escape_ident(name));
        let mut top = Rule::new(scope.clone());
        let mut missing: Vec<String> = Vec::new();

        for token in &style.simple_classes {
            if is_marker(token) {
                continue;
            }
            let Some(entries) = self.index.get(token) else {
                if !missing.contains(token) {
                    missing.push(token.clone());
                }
                continue;
            };
            for entry in entries {
                let node = rescoped_clone(entry, token, name);
                if self.seen.insert(node.to_css()) {
                    self.root.nodes.push(node);
                }
            }
        }

        for marker in &style.container_declarations {
            let Some(container) = container_marker_name(marker) else {
                continue;
            };
            top.push_declaration(Declaration::new("container-type", "inline-size"));
            if !container.is_empty() {
                top.push_declaration(Declaration::new("container-name", container));
            }
        }

        for value in &style.arbitrary_values {
            let decl = Declaration::new(value.property.clone(), value.value.clone());
            match &value.variant_selector {
                Some(pattern) => {
                    let mut nested = Rule::new(pattern.clone());
                    nested.push_declaration(decl);
                    top.children.push(Node::Rule(nested));
                }
                None => top.push_declaration(decl),
            }
        }

        if !top.children.is_empty() {
            self.root.nodes.push(Node::Rule(top));
        }

        for query in &style.container_queries {
            let Some(size) = container_breakpoint(&query.breakpoint) else {
                tracing::trace!(name, breakpoint = %query.breakpoint, "dropping container query with unknown tier");
                continue;
            };
            let params = if query.container.is_empty() {
                format!("(min-width: {size})")
            } else {
                format!("{} (min-width: {size})", query.container)
            };

            let mut rule = Rule::new(scope.clone());
            if let Some(value) = parse_arbitrary(&query.utility) {
                let decl = Declaration::new(value.property, value.value);
                match value.variant_selector {
                    Some(pattern) => {
                        let mut nested = Rule::new(pattern);
                        nested.push_declaration(decl);
                        rule.children.push(Node::Rule(nested));
                    }
                    None => rule.push_declaration(decl),
                }
            } else if let Some(entries) = self.index.get(&query.utility) {
                for entry in entries.iter().filter(|e| e.is_unconditional()) {
                    for decl in entry.rule.declarations() {
                        rule.push_declaration(decl.clone());
                    }
                }
            }

            if rule.children.is_empty() {
                tracing::trace!(name, utility = %query.utility, "container query produced nothing");
                continue;
            }
            let mut wrapper = AtRule::block("container", params);
            wrapper.push(Node::Rule(rule));
            self.root.nodes.push(Node::AtRule(wrapper));
        }

        if !missing.is_empty() {
            self.unresolved.push(Unresolved {
                name: name.to_string(),
                tokens: missing,
            });
        }
    }

    /// Finish synthesis, returning the output tree and every unresolved token.
    pub fn finish(self) -> (StyleSheet, Vec<Unresolved>) {
        tracing::debug!(
            nodes = self.root.nodes.len(),
            unresolved = self.unresolved.len(),
            "synthesized output tree"
        );
        (self.root, self.unresolved)
    }
}

/// Clone an indexed rule with its at-rule ancestors, renaming `token` to
/// `name` in every selector of the clone.
fn rescoped_clone(entry: &IndexEntry<'_>, token: &str, name: &str) -> Node {
    let mut rule = entry.rule.clone();
    rescope_rule(&mut rule, token, name);

    let mut node = Node::Rule(rule);
    for ancestor in entry.ancestors.iter().rev() {
        let mut shell = ancestor.shell();
        shell.push(node);
        node = Node::AtRule(shell);
    }
    node
}

fn rescope_rule(rule: &mut Rule, token: &str, name: &str) {
    match SelectorList::parse(&rule.selector) {
        Ok(mut list) => {
            if list.rename_class(token, name) > 0 {
                rule.selector = list.to_string();
            }
        }
        Err(err) => tracing::trace!(selector = %rule.selector, %err, "selector kept as written"),
    }

    for child in &mut rule.children {
        match child {
            Node::Rule(nested) => rescope_rule(nested, token, name),
            Node::AtRule(at) => {
                for node in at.children.iter_mut().flatten() {
                    if let Node::Rule(nested) = node {
                        rescope_rule(nested, token, name);
                    }
                }
            }
            Node::Declaration(_) => {}
        }
    }
}
