//! Token classification for raw utility strings.
//!
//! A raw utility string is split on whitespace and every token lands in one
//! of four buckets:
//!
//! | Shape                          | Bucket                          |
//! |--------------------------------|---------------------------------|
//! | `width-[37px]`, `fill-[red]:[&_svg]` | [`ArbitraryValue`]        |
//! | `@container`, `@container/card`| container declaration           |
//! | `@md/card:p-4`, `@lg:w-[10px]` | [`ContainerQuery`]              |
//! | anything else                  | simple class (sent to the engine) |
//!
//! Inside brackets `_` stands for a space and `\_` for a literal underscore.

use std::sync::LazyLock;

use regex::Regex;

use crate::css::selector::SelectorList;

/// `property-[value]` with an optional `:[pattern]` variant suffix.
static ARBITRARY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9-]*)-\[(.*?)\](?::\[(.*)\])?$").ok());

/// `@container` or `@container/name`.
static CONTAINER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^@container(?:/([A-Za-z0-9_-]+))?$").ok());

/// `@tier[/name]:utility`.
static CONTAINER_QUERY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^@([a-z0-9]+)(?:/([A-Za-z0-9_-]+))?:(.+)$").ok());

/// Known utility prefixes that are not themselves CSS property names.
const PREFIX_PROPERTIES: &[(&str, &str)] = &[
    ("w", "width"),
    ("h", "height"),
    ("min-w", "min-width"),
    ("max-w", "max-width"),
    ("min-h", "min-height"),
    ("max-h", "max-height"),
    ("size", "inline-size"),
    ("p", "padding"),
    ("px", "padding-inline"),
    ("py", "padding-block"),
    ("pt", "padding-top"),
    ("pr", "padding-right"),
    ("pb", "padding-bottom"),
    ("pl", "padding-left"),
    ("m", "margin"),
    ("mx", "margin-inline"),
    ("my", "margin-block"),
    ("mt", "margin-top"),
    ("mr", "margin-right"),
    ("mb", "margin-bottom"),
    ("ml", "margin-left"),
    ("bg", "background-color"),
    ("text", "color"),
    ("rounded", "border-radius"),
    ("leading", "line-height"),
    ("tracking", "letter-spacing"),
    ("z", "z-index"),
    ("grid-cols", "grid-template-columns"),
    ("grid-rows", "grid-template-rows"),
];

/// Map a utility prefix to the CSS property it sets. Unknown prefixes are
/// taken verbatim as the property name.
///
/// `text` maps to `color`; see [`arbitrary_property`] for size values.
pub fn property_for_prefix(prefix: &str) -> &str {
    PREFIX_PROPERTIES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map_or(prefix, |&(_, property)| property)
}

/// The property an arbitrary value sets. `text-[...]` sets `font-size` when
/// the value is a size and `color` otherwise.
pub fn arbitrary_property<'a>(prefix: &'a str, value: &str) -> &'a str {
    if prefix == "text" && is_font_size(value) {
        return "font-size";
    }
    property_for_prefix(prefix)
}

fn is_font_size(value: &str) -> bool {
    const SIZE_KEYWORDS: &[&str] = &[
        "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
        "smaller", "larger",
    ];
    const SIZE_FUNCTIONS: &[&str] = &["calc(", "clamp(", "min(", "max("];

    let value = value.trim();
    value.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || SIZE_FUNCTIONS.iter().any(|f| value.starts_with(f))
        || SIZE_KEYWORDS.contains(&value)
}

/// A declaration written directly in bracket syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitraryValue {
    /// The CSS property, after prefix mapping.
    pub property: String,
    /// The value with `_` decoded to spaces.
    pub value: String,
    /// A relative selector pattern containing `&`, e.g. `& > svg`.
    pub variant_selector: Option<String>,
}

/// A utility scoped to a named container breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerQuery {
    /// The container name; empty for the nearest unnamed container.
    pub container: String,
    /// The breakpoint tier, e.g. `"md"`.
    pub breakpoint: String,
    /// The utility applied inside the query, e.g. `"p-4"`.
    pub utility: String,
}

/// All tokens of one semantic name, bucketed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedStyle {
    /// Plain utility tokens in authoring order.
    pub simple_classes: Vec<String>,
    /// Container-marker tokens: `@container`, `@container/name`.
    pub container_declarations: Vec<String>,
    /// Bracket-syntax declarations.
    pub arbitrary_values: Vec<ArbitraryValue>,
    /// Breakpoint-scoped container utilities.
    pub container_queries: Vec<ContainerQuery>,
}

impl ClassifiedStyle {
    /// Returns `true` if no token was classified into any bucket.
    pub fn is_empty(&self) -> bool {
        self.simple_classes.is_empty()
            && self.container_declarations.is_empty()
            && self.arbitrary_values.is_empty()
            && self.container_queries.is_empty()
    }
}

/// Classify every whitespace-separated token of a raw utility string.
///
/// Malformed bracket tokens (unbalanced brackets, empty property or value)
/// are dropped without a trace in the output.
pub fn classify(raw: &str) -> ClassifiedStyle {
    let mut style = ClassifiedStyle::default();

    for token in raw.split_whitespace() {
        if is_container_marker(token) {
            style.container_declarations.push(token.to_string());
        } else if let Some(query) = parse_container_query(token) {
            style.container_queries.push(query);
        } else if looks_arbitrary(token) {
            match parse_arbitrary(token) {
                Some(value) => style.arbitrary_values.push(value),
                None => tracing::trace!(token, "dropping malformed arbitrary value"),
            }
        } else {
            style.simple_classes.push(token.to_string());
        }
    }

    style
}

/// Returns the container name of a container marker: `Some("")` for
/// `@container`, `Some("card")` for `@container/card`.
pub fn container_marker_name(token: &str) -> Option<&str> {
    let captures = CONTAINER.as_ref()?.captures(token)?;
    Some(captures.get(1).map_or("", |m| m.as_str()))
}

fn is_container_marker(token: &str) -> bool {
    container_marker_name(token).is_some()
}

fn parse_container_query(token: &str) -> Option<ContainerQuery> {
    let captures = CONTAINER_QUERY.as_ref()?.captures(token)?;
    Some(ContainerQuery {
        breakpoint: captures.get(1)?.as_str().to_string(),
        container: captures.get(2).map_or("", |m| m.as_str()).to_string(),
        utility: captures.get(3)?.as_str().to_string(),
    })
}

/// A token whose leading segment is a bare property prefix followed by `[`,
/// and whose bracket group ends the token or is followed by a `:[pattern]`.
///
/// Tokens with a variant prefix (`hover:w-[3px]`) and bracketed variants
/// (`data-[open]:flex`, `max-[600px]:hidden`) are left for the engine. A
/// bracket group that never closes still counts, so the token is dropped as
/// malformed.
pub fn looks_arbitrary(token: &str) -> bool {
    let Some(open) = token.find('[') else {
        return false;
    };
    let head = &token[..open];
    let bare_prefix = head.ends_with('-')
        && head
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !bare_prefix {
        return false;
    }

    match closing_bracket(token, open) {
        Some(close) => {
            let tail = &token[close + 1..];
            tail.starts_with(":[") || !tail.starts_with([':', '/'])
        }
        None => true,
    }
}

/// Byte offset of the `]` matching the `[` at `open`.
fn closing_bracket(token: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in token[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a `property-[value]` token, with an optional `:[pattern]` suffix.
pub fn parse_arbitrary(token: &str) -> Option<ArbitraryValue> {
    if !brackets_balanced(token) {
        return None;
    }
    let captures = ARBITRARY.as_ref()?.captures(token)?;
    let prefix = captures.get(1)?.as_str();
    let value = decode_brackets(captures.get(2)?.as_str());
    if value.trim().is_empty() {
        return None;
    }

    let variant_selector = match captures.get(3) {
        Some(pattern) => Some(variant_pattern(pattern.as_str())?),
        None => None,
    };

    Some(ArbitraryValue {
        property: arbitrary_property(prefix, &value).to_string(),
        value,
        variant_selector,
    })
}

/// Decode a variant pattern; a pattern without `&` is a descendant pattern.
/// Patterns that do not parse as a selector are rejected.
fn variant_pattern(raw: &str) -> Option<String> {
    let pattern = decode_brackets(raw);
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }
    let pattern = if pattern.contains('&') {
        pattern.to_string()
    } else {
        format!("& {pattern}")
    };
    match SelectorList::parse(&pattern) {
        Ok(_) => Some(pattern),
        Err(err) => {
            tracing::trace!(%pattern, %err, "rejecting variant pattern");
            None
        }
    }
}

/// `_` → space, `\_` → `_`.
fn decode_brackets(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'_') => {
                out.push('_');
                chars.next();
            }
            '_' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

fn brackets_balanced(token: &str) -> bool {
    let mut depth = 0i32;
    for c in token.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Returns the group or peer name a marker token declares: `Some("")` for
/// `group`, `Some("card")` for `group/card`.
pub fn group_marker_name(token: &str) -> Option<&str> {
    marker_name(token, "group")
}

/// Returns `true` for `group`, `group/name`, `peer`, `peer/name`.
///
/// Markers only label an element for relative variants; the engine emits
/// no CSS for them.
pub fn is_marker(token: &str) -> bool {
    marker_name(token, "group").is_some() || marker_name(token, "peer").is_some()
}

fn marker_name<'a>(token: &'a str, kind: &str) -> Option<&'a str> {
    let rest = token.strip_prefix(kind)?;
    if rest.is_empty() {
        return Some("");
    }
    let name = rest.strip_prefix('/')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(name)
}
