//! CSS tree: StyleSheet, Node, Rule, AtRule, Declaration.
//!
//! Unlike a flat rule list, the tree keeps CSS nesting: a [`Rule`] may hold
//! nested rules and at-rules next to its declarations, and an [`AtRule`] may
//! hold a body of any node kind. Selectors, params, and values are kept as
//! source text; [`crate::css::selector`] parses selectors on demand.

use std::fmt::{self, Write};

/// A single CSS property declaration, e.g. `color: red` or `--tw-shadow: 0 0 #0000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// The property name, e.g. `"color"`, `"--tw-shadow"`.
    pub property: String,
    /// The raw value text, trimmed, without `!important`.
    pub value: String,
    /// Whether `!important` was specified.
    pub important: bool,
}

impl Declaration {
    /// Create a new declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Mark this declaration `!important` (builder).
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Returns `true` for custom property declarations (`--name: ...`).
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// A style rule: a selector text and a body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    /// The selector list as written, e.g. `".a, .b:hover"`.
    pub selector: String,
    /// Declarations, nested rules, and nested at-rules in source order.
    pub children: Vec<Node>,
}

impl Rule {
    /// Create an empty rule for the given selector.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            children: Vec::new(),
        }
    }

    /// Append a declaration to the body.
    pub fn push_declaration(&mut self, declaration: Declaration) {
        self.children.push(Node::Declaration(declaration));
    }

    /// Iterate over the direct declarations of this rule.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.children.iter().filter_map(|node| match node {
            Node::Declaration(d) => Some(d),
            _ => None,
        })
    }

    /// Returns `true` if the body holds at least one direct declaration.
    pub fn has_declarations(&self) -> bool {
        self.declarations().next().is_some()
    }
}

/// An at-rule such as `@media (hover: hover) { ... }` or `@import "x";`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtRule {
    /// The name without the `@`, e.g. `"media"`.
    pub name: String,
    /// The prelude text between the name and the body, trimmed.
    pub params: String,
    /// The block body; `None` for statement at-rules ending in `;`.
    pub children: Option<Vec<Node>>,
}

impl AtRule {
    /// Create a block at-rule with an empty body.
    pub fn block(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            children: Some(Vec::new()),
        }
    }

    /// Create an at-rule with the same name and params but an empty body.
    pub fn shell(&self) -> Self {
        Self {
            name: self.name.clone(),
            params: self.params.clone(),
            children: self.children.as_ref().map(|_| Vec::new()),
        }
    }

    /// Returns `true` for block at-rules that condition their contents:
    /// `@media`, `@supports`, `@container`.
    pub fn is_conditional(&self) -> bool {
        matches!(self.name.as_str(), "media" | "supports" | "container")
    }

    /// Append a node to the body, creating the body if this was a statement.
    pub fn push(&mut self, node: Node) {
        self.children.get_or_insert_with(Vec::new).push(node);
    }
}

/// One item of a stylesheet or block body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// A property declaration.
    Declaration(Declaration),
    /// A style rule.
    Rule(Rule),
    /// An at-rule.
    AtRule(AtRule),
}

impl Node {
    /// Serialize this node on its own, at indentation level zero.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self, 0);
        out
    }
}

/// A parsed CSS stylesheet: a list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub nodes: Vec<Node>,
}

impl StyleSheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Returns `true` if the stylesheet has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to CSS text.
    ///
    /// Top-level blocks are separated by a blank line; every declaration sits
    /// on its own line; nested bodies are indented by two spaces. Non-empty
    /// output ends with a single trailing newline.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            write_node(&mut out, node, 0);
        }
        out
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_body(out: &mut String, children: &[Node], depth: usize) {
    for child in children {
        write_node(out, child, depth);
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    indent(out, depth);
    match node {
        Node::Declaration(d) => {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{d};");
        }
        Node::Rule(rule) => {
            out.push_str(&rule.selector);
            out.push_str(" {\n");
            write_body(out, &rule.children, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
        Node::AtRule(at) => {
            out.push('@');
            out.push_str(&at.name);
            if !at.params.is_empty() {
                out.push(' ');
                out.push_str(&at.params);
            }
            match &at.children {
                None => out.push_str(";\n"),
                Some(children) => {
                    out.push_str(" {\n");
                    write_body(out, children, depth + 1);
                    indent(out, depth);
                    out.push_str("}\n");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn button_rule() -> Rule {
        let mut rule = Rule::new(".Button");
        rule.push_declaration(Declaration::new("color", "#fff"));
        rule.push_declaration(Declaration::new("padding", "1rem").important());
        rule
    }

    #[test]
    fn test_declaration_display() {
        assert_eq!(Declaration::new("color", "red").to_string(), "color: red");
        assert_eq!(
            Declaration::new("color", "red").important().to_string(),
            "color: red !important"
        );
    }

    #[test]
    fn test_custom_property_detection() {
        assert!(Declaration::new("--tw-shadow", "0 0 #0000").is_custom_property());
        assert!(!Declaration::new("box-shadow", "none").is_custom_property());
    }

    #[test]
    fn test_rule_declarations_skip_nested() {
        let mut rule = button_rule();
        rule.children.push(Node::Rule(Rule::new("&:hover")));
        assert_eq!(rule.declarations().count(), 2);
        assert!(rule.has_declarations());
        assert!(!Rule::new(".x").has_declarations());
    }

    #[test]
    fn test_serialize_rule() {
        let sheet = StyleSheet {
            nodes: vec![Node::Rule(button_rule())],
        };
        assert_eq!(
            sheet.to_css(),
            ".Button {\n  color: #fff;\n  padding: 1rem !important;\n}\n"
        );
    }

    #[test]
    fn test_serialize_at_rule_wrapper() {
        let mut media = AtRule::block("media", "(hover: hover)");
        media.push(Node::Rule(button_rule()));
        let sheet = StyleSheet {
            nodes: vec![Node::AtRule(media), Node::Rule(Rule::new(".x"))],
        };
        assert_eq!(
            sheet.to_css(),
            "@media (hover: hover) {\n  .Button {\n    color: #fff;\n    padding: 1rem !important;\n  }\n}\n\n.x {\n}\n"
        );
    }

    #[test]
    fn test_serialize_statement_at_rule() {
        let at = AtRule {
            name: "import".into(),
            params: "\"tailwindcss\"".into(),
            children: None,
        };
        assert_eq!(Node::AtRule(at).to_css(), "@import \"tailwindcss\";\n");
    }

    #[test]
    fn test_shell_drops_body() {
        let mut media = AtRule::block("media", "print");
        media.push(Node::Rule(Rule::new(".a")));
        let shell = media.shell();
        assert_eq!(shell.children, Some(Vec::new()));
        assert_eq!(shell.params, "print");
    }

    #[test]
    fn test_conditional_at_rules() {
        assert!(AtRule::block("media", "print").is_conditional());
        assert!(AtRule::block("supports", "(display: grid)").is_conditional());
        assert!(AtRule::block("container", "card (min-width: 24rem)").is_conditional());
        assert!(!AtRule::block("layer", "utilities").is_conditional());
        assert!(!AtRule::block("keyframes", "spin").is_conditional());
    }

    #[test]
    fn test_empty_stylesheet_serializes_to_nothing() {
        assert_eq!(StyleSheet::new().to_css(), "");
        assert!(StyleSheet::default().is_empty());
    }
}
