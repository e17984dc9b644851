//! Custom-property resolver: inline every `var(--name)` reference.
//!
//! Each rule gets its own [`VariableTable`]. A reference resolves against, in
//! order: the rule's own custom properties, the global `:root`/`:host` table of
//! the generated sheet, the defaults tier (engine defaults plus `@property`
//! initial values), and finally the `var()` call's own fallback. A value of
//! `initial` counts as not declared. A reference that is already being
//! resolved (a cycle) resolves to the empty string.

use std::collections::{HashMap, HashSet};

use crate::css::model::{Node, Rule, StyleSheet};

/// Engine scaffolding defaults: values the engine relies on the browser
/// supplying through `@property` registrations.
const ENGINE_DEFAULTS: &[(&str, &str)] = &[
    ("--tw-shadow", "0 0 #0000"),
    ("--tw-inset-shadow", "0 0 #0000"),
    ("--tw-ring-shadow", "0 0 #0000"),
    ("--tw-inset-ring-shadow", "0 0 #0000"),
    ("--tw-ring-offset-shadow", "0 0 #0000"),
    ("--tw-ring-offset-width", "0px"),
    ("--tw-ring-offset-color", "#fff"),
    ("--tw-translate-x", "0"),
    ("--tw-translate-y", "0"),
    ("--tw-translate-z", "0"),
    ("--tw-scale-x", "1"),
    ("--tw-scale-y", "1"),
    ("--tw-scale-z", "1"),
    ("--tw-space-x-reverse", "0"),
    ("--tw-space-y-reverse", "0"),
    ("--tw-divide-x-reverse", "0"),
    ("--tw-divide-y-reverse", "0"),
    ("--tw-outline-style", "solid"),
    ("--tw-gradient-from-position", "0%"),
    ("--tw-gradient-via-position", "50%"),
    ("--tw-gradient-to-position", "100%"),
];

// ---------------------------------------------------------------------------
// GlobalScope
// ---------------------------------------------------------------------------

/// The rule-external tiers: global custom properties and defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalScope {
    globals: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl GlobalScope {
    /// A scope with only the engine defaults tier.
    pub fn new() -> Self {
        Self {
            globals: HashMap::new(),
            defaults: ENGINE_DEFAULTS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// A scope with no tiers at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect `:root`/`:host` custom properties and `@property` initial
    /// values from a generated sheet, on top of the engine defaults.
    pub fn collect(sheet: &StyleSheet) -> Self {
        let mut scope = Self::new();
        scope.collect_nodes(&sheet.nodes);
        tracing::debug!(
            globals = scope.globals.len(),
            defaults = scope.defaults.len(),
            "collected global custom properties"
        );
        scope
    }

    /// Collect only the sheet's own `:root`/`:host` and `@property` values,
    /// without the engine defaults.
    pub fn collect_declared(sheet: &StyleSheet) -> Self {
        let mut scope = Self::empty();
        scope.collect_nodes(&sheet.nodes);
        scope
    }

    /// Add theme overrides as a late global tier: they fill names the
    /// sheet did not declare and never replace one it did.
    pub fn with_overrides(mut self, theme: &[(String, String)]) -> Self {
        for (name, value) in theme {
            self.globals
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// The global value of a custom property.
    pub fn global(&self, name: &str) -> Option<&str> {
        self.globals.get(name).map(String::as_str)
    }

    /// The default value of a custom property.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults.get(name).map(String::as_str)
    }

    fn collect_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Rule(rule) if is_root_scope(&rule.selector) => {
                    for decl in rule.declarations().filter(|d| d.is_custom_property()) {
                        self.globals.insert(decl.property.clone(), decl.value.clone());
                    }
                }
                Node::AtRule(at) if at.name == "layer" => {
                    if let Some(children) = &at.children {
                        self.collect_nodes(children);
                    }
                }
                Node::AtRule(at) if at.name == "property" => {
                    let initial = at
                        .children
                        .iter()
                        .flatten()
                        .find_map(|child| match child {
                            Node::Declaration(d) if d.property == "initial-value" => Some(d),
                            _ => None,
                        });
                    if let Some(initial) = initial {
                        self.defaults
                            .insert(at.params.trim().to_string(), initial.value.clone());
                    }
                }
                _ => {}
            }
        }
    }
}

/// `:root`, `:host`, or a list of only those.
fn is_root_scope(selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .all(|s| s == ":root" || s == ":host")
}

// ---------------------------------------------------------------------------
// VariableTable
// ---------------------------------------------------------------------------

/// Per-rule resolution state.
#[derive(Debug, Default)]
pub struct VariableTable {
    /// Custom properties declared by the rule itself, last declaration wins.
    pub declared: HashMap<String, String>,
    /// Resolved values of names that came from tiers one to three.
    pub memo: HashMap<String, String>,
    /// Names currently being resolved.
    pub resolving: HashSet<String>,
}

impl VariableTable {
    /// Build the table from a rule's own custom-property declarations.
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            declared: rule
                .declarations()
                .filter(|d| d.is_custom_property())
                .map(|d| (d.property.clone(), d.value.clone()))
                .collect(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Unresolved references become empty; scaffolding is stripped.
    Strict,
    /// Unresolved references are kept verbatim; nothing is removed.
    Lenient,
}

/// Resolve every custom-property reference in the sheet, strip custom-property
/// declarations, and remove declarations, rules and at-rules left empty.
pub fn resolve(sheet: &mut StyleSheet, scope: &GlobalScope) {
    Resolver {
        scope,
        mode: Mode::Strict,
    }
    .resolve_nodes(&mut sheet.nodes);
}

/// Inline the references the scope can answer and leave everything else,
/// custom properties and unresolvable references included, untouched.
pub fn resolve_lenient(sheet: &mut StyleSheet, scope: &GlobalScope) {
    Resolver {
        scope,
        mode: Mode::Lenient,
    }
    .resolve_nodes(&mut sheet.nodes);
}

struct Resolver<'s> {
    scope: &'s GlobalScope,
    mode: Mode,
}

impl Resolver<'_> {
    fn resolve_nodes(&self, nodes: &mut Vec<Node>) {
        for node in nodes.iter_mut() {
            match node {
                Node::Rule(rule) => self.resolve_rule(rule),
                Node::AtRule(at) => {
                    if let Some(children) = &mut at.children {
                        self.resolve_nodes(children);
                    }
                }
                Node::Declaration(_) => {}
            }
        }

        if self.mode == Mode::Strict {
            nodes.retain(|node| match node {
                Node::Rule(rule) => !rule.children.is_empty(),
                Node::AtRule(at) => at.children.as_ref().map_or(true, |c| !c.is_empty()),
                Node::Declaration(_) => true,
            });
        }
    }

    fn resolve_rule(&self, rule: &mut Rule) {
        let mut table = VariableTable::from_rule(rule);
        let children = std::mem::take(&mut rule.children);

        for node in children {
            match node {
                Node::Declaration(decl) if decl.is_custom_property() => {
                    if self.mode == Mode::Lenient {
                        rule.children.push(Node::Declaration(decl));
                    }
                }
                Node::Declaration(mut decl) => {
                    if find_var(&decl.value).is_some() {
                        decl.value = self.substitute(&decl.value, &mut table).trim().to_string();
                    }
                    if self.mode == Mode::Strict && decl.value.is_empty() {
                        if decl.property != "content" {
                            tracing::trace!(property = %decl.property, selector = %rule.selector, "dropping empty declaration");
                            continue;
                        }
                        decl.value = "''".to_string();
                    }
                    rule.children.push(Node::Declaration(decl));
                }
                Node::Rule(mut nested) => {
                    self.resolve_rule(&mut nested);
                    rule.children.push(Node::Rule(nested));
                }
                Node::AtRule(mut at) => {
                    if let Some(children) = &mut at.children {
                        self.resolve_nodes(children);
                    }
                    rule.children.push(Node::AtRule(at));
                }
            }
        }
    }

    /// Replace every `var()` reference in `value`.
    fn substitute(&self, value: &str, table: &mut VariableTable) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = find_var(rest) {
            out.push_str(&rest[..start]);
            let args = &rest[start + 4..];
            let Some(close) = closing_paren(args) else {
                // Unbalanced: keep the tail as written.
                out.push_str(&rest[start..]);
                return out;
            };

            let (name, fallback) = split_fallback(&args[..close]);
            match self.lookup(name.trim(), fallback, table) {
                Some(resolved) => out.push_str(&resolved),
                None if self.mode == Mode::Lenient => out.push_str(&rest[start..start + 5 + close]),
                None => {}
            }
            rest = &args[close + 1..];
        }

        out.push_str(rest);
        out
    }

    fn lookup(&self, name: &str, fallback: Option<&str>, table: &mut VariableTable) -> Option<String> {
        if !name.starts_with("--") {
            return None;
        }
        if let Some(hit) = table.memo.get(name) {
            return Some(hit.clone());
        }
        if table.resolving.contains(name) {
            tracing::debug!(property = name, "custom property cycle resolved to empty");
            return Some(String::new());
        }

        let declared = table
            .declared
            .get(name)
            .filter(|v| !is_initial(v))
            .cloned()
            .or_else(|| self.scope.global(name).filter(|v| !is_initial(v)).map(String::from))
            .or_else(|| {
                self.scope
                    .default_value(name)
                    .filter(|v| !is_initial(v))
                    .map(String::from)
            });

        if let Some(raw) = declared {
            table.resolving.insert(name.to_string());
            let resolved = self.substitute(&raw, table).trim().to_string();
            table.resolving.remove(name);
            table.memo.insert(name.to_string(), resolved.clone());
            return Some(resolved);
        }

        fallback.map(|fb| self.substitute(fb.trim(), table).trim().to_string())
    }
}

fn is_initial(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("initial")
}

/// Byte offset of the next `var(` that starts an identifier.
pub(crate) fn find_var(s: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = s[from..].find("var(") {
        let at = from + i;
        let boundary = s[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if boundary {
            return Some(at);
        }
        from = at + 4;
    }
    None
}

/// Offset of the `)` closing an argument list whose `(` was just consumed.
fn closing_paren(args: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for (i, c) in args.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `--name, fallback` at the first top-level comma.
fn split_fallback(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return (&inner[..i], Some(&inner[i + 1..])),
            _ => {}
        }
    }
    (inner, None)
}
