//! Nesting flattener and selector simplifier.
//!
//! [`flatten`] turns rule-in-rule trees into flat CSS: every rule ends up a
//! direct child of the sheet or of one at-rule chain, nested at-rules bubble
//! out of the rules that contain them, and `@media` nested in `@media` is
//! joined with `and`. [`simplify`] then cleans selectors (group rewrite,
//! wrapper unwrapping, trailing universals), drops rules still starting with
//! `&`, and merges rules and at-rules that share a selector or prelude.

use std::collections::HashMap;

use crate::classify::{group_marker_name, ClassifiedStyle};
use crate::css::model::{AtRule, Node, Rule, StyleSheet};
use crate::css::selector::{
    unescape_ident, Combinator, CompoundSelector, PseudoArgs, Selector, SelectorComponent,
    SelectorList, SelectorPart,
};
use crate::error::FlattenError;

/// Deepest rule/at-rule nesting the flattener accepts.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Group marker name → the semantic name that declared it.
pub type GroupOwners = HashMap<String, String>;

/// Map every group marker to the first semantic name declaring it.
pub fn group_owners<'s, I>(styles: I) -> GroupOwners
where
    I: IntoIterator<Item = (&'s str, &'s ClassifiedStyle)>,
{
    let mut owners = GroupOwners::new();
    for (name, style) in styles {
        for token in &style.simple_classes {
            if let Some(group) = group_marker_name(token) {
                owners
                    .entry(group.to_string())
                    .or_insert_with(|| name.to_string());
            }
        }
    }
    owners
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Flatten nested rules and at-rules.
pub fn flatten(sheet: &StyleSheet) -> Result<StyleSheet, FlattenError> {
    let mut nodes = Vec::new();
    flatten_into(&sheet.nodes, None, 0, &mut nodes)?;
    Ok(StyleSheet { nodes })
}

fn check_depth(depth: usize) -> Result<(), FlattenError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(FlattenError::MaxNestingDepthExceeded {
            max_depth: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}

fn parse_selector(selector: &str) -> Result<SelectorList, FlattenError> {
    SelectorList::parse(selector).map_err(|source| FlattenError::Selector {
        selector: selector.to_string(),
        source,
    })
}

fn declarations_of(children: &[Node]) -> Vec<Node> {
    children
        .iter()
        .filter(|n| matches!(n, Node::Declaration(_)))
        .cloned()
        .collect()
}

fn flatten_into(
    nodes: &[Node],
    parent: Option<&SelectorList>,
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<(), FlattenError> {
    for node in nodes {
        match node {
            Node::Rule(rule) => flatten_rule(rule, parent, depth, out)?,
            Node::AtRule(at) => flatten_at_rule(at, parent, depth, out)?,
            // Declarations under a parent rule are collected by the caller.
            Node::Declaration(_) if parent.is_some() => {}
            Node::Declaration(decl) => out.push(Node::Declaration(decl.clone())),
        }
    }
    Ok(())
}

fn flatten_rule(
    rule: &Rule,
    parent: Option<&SelectorList>,
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<(), FlattenError> {
    check_depth(depth)?;

    let own = parse_selector(&rule.selector)?;
    let resolved = match parent {
        Some(parent) => nest_list(parent, &own),
        None => own,
    };

    let decls = declarations_of(&rule.children);
    if !decls.is_empty() {
        out.push(Node::Rule(Rule {
            selector: resolved.to_string(),
            children: decls,
        }));
    }

    for child in &rule.children {
        match child {
            Node::Rule(nested) => flatten_rule(nested, Some(&resolved), depth + 1, out)?,
            Node::AtRule(at) => flatten_at_rule(at, Some(&resolved), depth + 1, out)?,
            Node::Declaration(_) => {}
        }
    }
    Ok(())
}

fn flatten_at_rule(
    at: &AtRule,
    parent: Option<&SelectorList>,
    depth: usize,
    out: &mut Vec<Node>,
) -> Result<(), FlattenError> {
    check_depth(depth)?;

    let Some(children) = &at.children else {
        out.push(Node::AtRule(at.clone()));
        return Ok(());
    };

    let mut body = Vec::new();
    if let Some(parent) = parent {
        let decls = declarations_of(children);
        if !decls.is_empty() {
            body.push(Node::Rule(Rule {
                selector: parent.to_string(),
                children: decls,
            }));
        }
    }
    flatten_into(children, parent, depth + 1, &mut body)?;

    if at.name != "media" {
        if !body.is_empty() {
            out.push(Node::AtRule(AtRule {
                name: at.name.clone(),
                params: at.params.clone(),
                children: Some(body),
            }));
        }
        return Ok(());
    }

    let mut rest = Vec::new();
    let mut joined = Vec::new();
    for node in body {
        match node {
            Node::AtRule(inner) if inner.name == "media" && inner.children.is_some() => {
                joined.push(Node::AtRule(AtRule {
                    name: inner.name,
                    params: format!("{} and {}", at.params, inner.params),
                    children: inner.children,
                }));
            }
            other => rest.push(other),
        }
    }
    if !rest.is_empty() {
        out.push(Node::AtRule(AtRule {
            name: at.name.clone(),
            params: at.params.clone(),
            children: Some(rest),
        }));
    }
    out.extend(joined);
    Ok(())
}

/// Resolve a nested selector list against its parent list.
fn nest_list(parent: &SelectorList, child: &SelectorList) -> SelectorList {
    let mut selectors = Vec::with_capacity(parent.selectors.len() * child.selectors.len());
    for child in &child.selectors {
        for parent in &parent.selectors {
            selectors.push(nest(parent, child));
        }
    }
    SelectorList { selectors }
}

fn nest(parent: &Selector, child: &Selector) -> Selector {
    if !child.has_nesting() {
        let mut parts = parent.parts.clone();
        if !matches!(child.parts.first(), Some(SelectorPart::Combinator(_))) {
            parts.push(SelectorPart::Combinator(Combinator::Descendant));
        }
        parts.extend(child.parts.iter().cloned());
        return Selector { parts };
    }

    let mut parts: Vec<SelectorPart> = Vec::with_capacity(child.parts.len() + parent.parts.len());
    for part in &child.parts {
        let compound = match part {
            SelectorPart::Combinator(c) => {
                parts.push(SelectorPart::Combinator(*c));
                continue;
            }
            SelectorPart::Compound(compound) => nest_arguments(compound, parent),
        };

        if !compound.has_direct_nesting() {
            parts.push(SelectorPart::Compound(compound));
        } else if let Some(single) = parent.as_compound() {
            parts.push(SelectorPart::Compound(splice(&compound, single)));
        } else if let (true, Some((SelectorPart::Compound(last), init))) =
            (parts.is_empty(), parent.parts.split_last())
        {
            // `&` leads: continue the parent's chain.
            parts.extend(init.iter().cloned());
            parts.push(SelectorPart::Compound(splice(&compound, last)));
        } else {
            let wrapped = CompoundSelector {
                components: vec![SelectorComponent::PseudoClass(
                    "is".to_string(),
                    Some(PseudoArgs::Selectors(SelectorList {
                        selectors: vec![parent.clone()],
                    })),
                )],
            };
            parts.push(SelectorPart::Compound(splice(&compound, &wrapped)));
        }
    }
    Selector { parts }
}

/// Resolve `&` inside selector-list arguments of a compound's pseudo-classes.
fn nest_arguments(compound: &CompoundSelector, parent: &Selector) -> CompoundSelector {
    let components = compound
        .components
        .iter()
        .map(|component| match component {
            SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(list)))
                if list.selectors.iter().any(Selector::has_nesting) =>
            {
                let selectors = list
                    .selectors
                    .iter()
                    .map(|s| if s.has_nesting() { nest(parent, s) } else { s.clone() })
                    .collect();
                SelectorComponent::PseudoClass(
                    name.clone(),
                    Some(PseudoArgs::Selectors(SelectorList { selectors })),
                )
            }
            other => other.clone(),
        })
        .collect();
    CompoundSelector { components }
}

/// Replace every bare `&` of `compound` with the components of `with`.
fn splice(compound: &CompoundSelector, with: &CompoundSelector) -> CompoundSelector {
    let mut components = Vec::with_capacity(compound.components.len() + with.components.len());
    for component in &compound.components {
        match component {
            SelectorComponent::Nesting => components.extend(with.components.iter().cloned()),
            other => components.push(other.clone()),
        }
    }
    CompoundSelector { components }
}

// ---------------------------------------------------------------------------
// Simplification
// ---------------------------------------------------------------------------

/// Clean selectors of a flattened sheet and merge rules sharing a selector.
pub fn simplify(sheet: &mut StyleSheet, groups: &GroupOwners) -> Result<(), FlattenError> {
    simplify_nodes(&mut sheet.nodes, groups)?;
    merge_nodes(&mut sheet.nodes);
    Ok(())
}

fn simplify_nodes(nodes: &mut Vec<Node>, groups: &GroupOwners) -> Result<(), FlattenError> {
    let mut kept = Vec::with_capacity(nodes.len());
    for mut node in std::mem::take(nodes) {
        match &mut node {
            Node::Rule(rule) => {
                let mut list = parse_selector(&rule.selector)?;
                for selector in &mut list.selectors {
                    rewrite_groups(selector, groups);
                    simplify_selector(selector, true);
                }
                list.selectors.retain(|s| !s.starts_with_nesting());
                if list.selectors.is_empty() {
                    tracing::trace!(selector = %rule.selector, "dropping unflattened rule");
                    continue;
                }
                rule.selector = list.to_string();
            }
            Node::AtRule(at) => {
                if let Some(children) = &mut at.children {
                    simplify_nodes(children, groups)?;
                }
            }
            Node::Declaration(_) => {}
        }
        kept.push(node);
    }
    *nodes = kept;
    Ok(())
}

fn is_wrapper(name: &str) -> bool {
    name == "is" || name == "where"
}

/// Rewrite `.Child:is(:where(.group/name):state *)` to `.Owner:state .Child`.
fn rewrite_groups(selector: &mut Selector, groups: &GroupOwners) {
    let mut i = 0;
    while i < selector.parts.len() {
        let SelectorPart::Compound(compound) = &mut selector.parts[i] else {
            i += 1;
            continue;
        };
        let found = compound
            .components
            .iter()
            .enumerate()
            .find_map(|(j, c)| group_scope(c, groups).map(|owner| (j, owner)));
        let Some((j, owner)) = found else {
            i += 1;
            continue;
        };

        compound.components.remove(j);
        if compound.components.is_empty() {
            compound.components.push(SelectorComponent::Universal);
        }
        selector
            .parts
            .insert(i, SelectorPart::Combinator(Combinator::Descendant));
        selector.parts.insert(i, SelectorPart::Compound(owner));
        i += 2;
    }
}

/// The owner compound for a group-relative wrapper, if `component` is one
/// and its group is mapped.
fn group_scope(component: &SelectorComponent, groups: &GroupOwners) -> Option<CompoundSelector> {
    let SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(inner))) = component else {
        return None;
    };
    if !is_wrapper(name) || inner.selectors.len() != 1 {
        return None;
    }
    let [SelectorPart::Compound(scope), SelectorPart::Combinator(Combinator::Descendant), SelectorPart::Compound(tail)] =
        inner.selectors[0].parts.as_slice()
    else {
        return None;
    };
    if !tail.is_universal() {
        return None;
    }

    let (k, group) = scope
        .components
        .iter()
        .enumerate()
        .find_map(|(k, c)| group_class(c).map(|g| (k, g)))?;
    let owner = groups.get(&group)?;

    let mut compound = CompoundSelector::class(owner);
    compound.components.extend(
        scope
            .components
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != k)
            .map(|(_, c)| c.clone()),
    );
    Some(compound)
}

/// The group name of `.group/name`, bare or wrapped in a single-class
/// `:where()`/`:is()`.
fn group_class(component: &SelectorComponent) -> Option<String> {
    match component {
        SelectorComponent::Class(raw) => group_marker_name(&unescape_ident(raw)).map(str::to_string),
        SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(list)))
            if is_wrapper(name) && list.selectors.len() == 1 =>
        {
            match list.selectors[0].as_compound()?.components.as_slice() {
                [SelectorComponent::Class(raw)] => {
                    group_marker_name(&unescape_ident(raw)).map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn simplify_selector(selector: &mut Selector, top_level: bool) {
    for part in &mut selector.parts {
        if let SelectorPart::Compound(compound) = part {
            for component in &mut compound.components {
                if let SelectorComponent::PseudoClass(_, Some(PseudoArgs::Selectors(inner))) = component {
                    for nested in &mut inner.selectors {
                        simplify_selector(nested, false);
                    }
                }
            }
            unwrap_compound(compound);
        }
    }

    // A selector that is nothing but one wrapper becomes its argument.
    let replacement = match selector.as_compound().map(|c| c.components.as_slice()) {
        Some([SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(inner)))])
            if is_wrapper(name)
                && inner.selectors.len() == 1
                && matches!(inner.selectors[0].parts.first(), Some(SelectorPart::Compound(_))) =>
        {
            Some(inner.selectors[0].clone())
        }
        _ => None,
    };
    if let Some(replacement) = replacement {
        *selector = replacement;
    }

    if top_level {
        let n = selector.parts.len();
        if n >= 3
            && matches!(&selector.parts[n - 1], SelectorPart::Compound(c) if c.is_universal())
            && matches!(selector.parts[n - 2], SelectorPart::Combinator(Combinator::Descendant))
        {
            selector.parts.truncate(n - 2);
        }
    }
}

/// Inline `:is(x)`/`:where(x)` whose argument is a single compound.
fn unwrap_compound(compound: &mut CompoundSelector) {
    let components = std::mem::take(&mut compound.components);
    let mut out = Vec::with_capacity(components.len());
    for component in components {
        match single_compound_argument(&component, out.is_empty()) {
            Some(inner) => out.extend(inner.iter().cloned()),
            None => out.push(component),
        }
    }
    compound.components = out;
}

fn single_compound_argument(component: &SelectorComponent, leading: bool) -> Option<&[SelectorComponent]> {
    let SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(list))) = component else {
        return None;
    };
    if !is_wrapper(name) || list.selectors.len() != 1 {
        return None;
    }
    let inner = list.selectors[0].as_compound()?;
    // Type and universal selectors must stay first in a compound.
    let typed = inner.components.iter().any(|c| {
        matches!(
            c,
            SelectorComponent::Type(_) | SelectorComponent::Universal | SelectorComponent::Nesting
        )
    });
    if typed && !leading {
        return None;
    }
    Some(&inner.components)
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge rules with identical selectors within each container, and a block
/// at-rule into the block right before it when name and params match.
/// Declarations keep encounter order.
fn merge_nodes(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in std::mem::take(nodes) {
        match node {
            Node::Rule(rule) => {
                let existing = merged.iter_mut().find_map(|n| match n {
                    Node::Rule(r) if r.selector == rule.selector => Some(r),
                    _ => None,
                });
                match existing {
                    Some(existing) => existing.children.extend(rule.children),
                    None => merged.push(Node::Rule(rule)),
                }
            }
            Node::AtRule(at) if at.children.is_some() => {
                // Only the immediately preceding block may absorb it, so no
                // rule is moved across another.
                let existing = match merged.last_mut() {
                    Some(Node::AtRule(a))
                        if a.children.is_some() && a.name == at.name && a.params == at.params =>
                    {
                        Some(a)
                    }
                    _ => None,
                };
                match existing {
                    Some(existing) => existing
                        .children
                        .get_or_insert_with(Vec::new)
                        .extend(at.children.into_iter().flatten()),
                    None => merged.push(Node::AtRule(at)),
                }
            }
            other => merged.push(other),
        }
    }

    for node in &mut merged {
        if let Node::AtRule(AtRule {
            children: Some(children),
            ..
        }) = node
        {
            merge_nodes(children);
        }
    }
    *nodes = merged;
}
