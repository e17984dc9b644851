//! Selector AST: SelectorList, Selector, CompoundSelector, SelectorComponent.
//!
//! Selectors are parsed from rule preludes, transformed structurally
//! (rescoping, nesting, simplification) and serialized back. Class names keep
//! the spelling they were written with, escapes included, so untouched parts
//! of a selector round-trip byte for byte.

use std::fmt::{self, Write};

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("unexpected '{found}' at offset {offset} in selector")]
    Unexpected { offset: usize, found: char },
    #[error("unexpected end of selector: expected {0}")]
    UnexpectedEnd(&'static str),
}

/// Arguments of a functional pseudo-class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoArgs {
    /// A selector list argument, as in `:is(...)`, `:where(...)`, `:not(...)`.
    Selectors(SelectorList),
    /// Any other argument kept as text, as in `:nth-child(2n + 1)`.
    Raw(String),
}

/// A single simple selector inside a compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorComponent {
    /// Type selector: `div`, `svg`.
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector, spelled as written (escapes kept): `.hover\:bg-x`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// Attribute selector, inner text without brackets: `[data-open]`.
    Attribute(String),
    /// Pseudo-class such as `:hover` or `:is(...)`.
    PseudoClass(String, Option<PseudoArgs>),
    /// Pseudo-element such as `::before` or `::part(label)`.
    PseudoElement(String, Option<String>),
    /// Nesting selector: `&`.
    Nesting,
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Next-sibling combinator: `A + B`.
    NextSibling,
    /// Subsequent-sibling combinator: `A ~ B`.
    SubsequentSibling,
}

impl Combinator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Descendant => "",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        }
    }
}

/// A sequence of simple selectors without combinators, e.g. `button.primary:hover`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Create an empty compound selector.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Create a compound selector holding a single class.
    pub fn class(name: &str) -> Self {
        Self {
            components: vec![SelectorComponent::Class(escape_ident(name))],
        }
    }

    /// Append a component to this compound selector.
    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// Returns `true` if this selector is the universal selector `*` alone.
    pub fn is_universal(&self) -> bool {
        self.components.len() == 1 && matches!(self.components[0], SelectorComponent::Universal)
    }

    /// Returns `true` if a bare `&` appears directly in this compound.
    pub fn has_direct_nesting(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, SelectorComponent::Nesting))
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorPart {
    /// A compound selector (one or more simple selectors).
    Compound(CompoundSelector),
    /// A combinator between compound selectors.
    Combinator(Combinator),
}

/// A complex selector: compound selectors joined by combinators.
///
/// Parts alternate between compounds and combinators and end with a compound.
/// A relative selector (inside `:has(> img)` or a nested rule like `> a`)
/// starts with a combinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Returns the compound if this selector has no combinators.
    pub fn as_compound(&self) -> Option<&CompoundSelector> {
        match self.parts.as_slice() {
            [SelectorPart::Compound(c)] => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if `&` appears anywhere, including inside pseudo-class arguments.
    pub fn has_nesting(&self) -> bool {
        self.parts.iter().any(|part| match part {
            SelectorPart::Compound(c) => c.components.iter().any(|comp| match comp {
                SelectorComponent::Nesting => true,
                SelectorComponent::PseudoClass(_, Some(PseudoArgs::Selectors(list))) => {
                    list.selectors.iter().any(Selector::has_nesting)
                }
                _ => false,
            }),
            SelectorPart::Combinator(_) => false,
        })
    }

    /// Returns `true` if the first simple selector is `&`.
    pub fn starts_with_nesting(&self) -> bool {
        matches!(
            self.parts.first(),
            Some(SelectorPart::Compound(c))
                if matches!(c.components.first(), Some(SelectorComponent::Nesting))
        )
    }
}

/// A comma-separated selector list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse a selector list from text.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = SelectorParser { input, pos: 0 };
        let list = parser.parse_list(false)?;
        Ok(list)
    }

    /// Visit every compound selector, including those inside pseudo-class arguments.
    pub fn for_each_compound(&self, f: &mut dyn FnMut(&CompoundSelector)) {
        for selector in &self.selectors {
            for part in &selector.parts {
                if let SelectorPart::Compound(compound) = part {
                    for component in &compound.components {
                        if let SelectorComponent::PseudoClass(_, Some(PseudoArgs::Selectors(inner))) =
                            component
                        {
                            inner.for_each_compound(f);
                        }
                    }
                    f(compound);
                }
            }
        }
    }

    /// Mutable counterpart of [`SelectorList::for_each_compound`]; inner
    /// argument lists are visited before the compound that holds them.
    pub fn for_each_compound_mut(&mut self, f: &mut dyn FnMut(&mut CompoundSelector)) {
        for selector in &mut self.selectors {
            for part in &mut selector.parts {
                if let SelectorPart::Compound(compound) = part {
                    for component in &mut compound.components {
                        if let SelectorComponent::PseudoClass(_, Some(PseudoArgs::Selectors(inner))) =
                            component
                        {
                            inner.for_each_compound_mut(f);
                        }
                    }
                    f(compound);
                }
            }
        }
    }

    /// Every class name the list touches, raw spelling, in first-seen order.
    pub fn classes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        self.for_each_compound(&mut |compound| {
            for component in &compound.components {
                if let SelectorComponent::Class(raw) = component {
                    if !out.iter().any(|seen| seen == raw) {
                        out.push(raw.clone());
                    }
                }
            }
        });
        out
    }

    /// Replace every class exactly equal to `from` (raw or unescaped spelling)
    /// with the class `to`. Returns the number of replacements.
    ///
    /// Matching is per class token: `.p-4` never matches inside `.p-40`.
    pub fn rename_class(&mut self, from: &str, to: &str) -> usize {
        let replacement = escape_ident(to);
        let mut count = 0;
        self.for_each_compound_mut(&mut |compound| {
            for component in &mut compound.components {
                if let SelectorComponent::Class(raw) = component {
                    if class_matches(raw, from) {
                        raw.clone_from(&replacement);
                        count += 1;
                    }
                }
            }
        });
        count
    }
}

/// Returns `true` if a raw class spelling names `token`.
pub fn class_matches(raw: &str, token: &str) -> bool {
    raw == token || unescape_ident(raw) == token
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Decode CSS escapes in an identifier: `hover\:bg-x` → `hover:bg-x`,
/// `\31 0` → `10`.
pub fn unescape_ident(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        if chars.peek().is_some_and(|w| w.is_ascii_whitespace()) {
            chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .filter(|ch| *ch != '\0')
            .unwrap_or('\u{FFFD}');
        out.push(decoded);
    }
    out
}

/// Escape a name for use as a CSS identifier: `hover:bg-x` → `hover\:bg-x`.
pub fn escape_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let starts_with_dash = name.starts_with('-');
    for (i, c) in name.chars().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && starts_with_dash));
        if leading_digit {
            let _ = write!(out, "\\{:x} ", u32::from(c));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Pseudo-classes whose argument is itself a selector list.
fn takes_selector_args(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "is" | "where" | "not" | "has" | "matches" | "any" | "-webkit-any" | "host" | "host-context"
    )
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Character-level recursive descent parser for selectors.
struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl SelectorParser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                offset: self.pos,
                found,
            },
            None => SelectorError::UnexpectedEnd("selector"),
        }
    }

    /// Parse a comma-separated list. Inside a pseudo-class argument the list
    /// ends at `)`, which is left in the input.
    fn parse_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') if nested => break,
                None if !nested => break,
                None => return Err(SelectorError::UnexpectedEnd("')'")),
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Selector, SelectorError> {
        self.skip_ws();
        let mut parts = Vec::new();

        if let Some(combinator) = self.peek().and_then(Combinator::from_char) {
            self.bump();
            self.skip_ws();
            parts.push(SelectorPart::Combinator(combinator));
        }
        parts.push(SelectorPart::Compound(self.parse_compound()?));

        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                Some(c) if Combinator::from_char(c).is_some() => {
                    self.bump();
                    self.skip_ws();
                    if let Some(combinator) = Combinator::from_char(c) {
                        parts.push(SelectorPart::Combinator(combinator));
                    }
                    parts.push(SelectorPart::Compound(self.parse_compound()?));
                }
                None | Some(',' | ')') => break,
                Some(_) if had_ws => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound()?));
                }
                Some(_) => return Err(self.unexpected()),
            }
        }

        Ok(Selector { parts })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::new();

        while let Some(c) = self.peek() {
            let component = match c {
                '&' => {
                    self.bump();
                    SelectorComponent::Nesting
                }
                '*' => {
                    self.bump();
                    SelectorComponent::Universal
                }
                '.' => {
                    self.bump();
                    SelectorComponent::Class(self.ident()?)
                }
                '#' => {
                    self.bump();
                    SelectorComponent::Id(self.ident()?)
                }
                '[' => {
                    self.bump();
                    SelectorComponent::Attribute(self.until_close(']')?)
                }
                ':' => self.pseudo()?,
                c if is_ident_char(c) || c == '\\' => SelectorComponent::Type(self.ident()?),
                _ => break,
            };
            compound.push(component);
        }

        if compound.components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn pseudo(&mut self) -> Result<SelectorComponent, SelectorError> {
        self.bump();
        if self.peek() == Some(':') {
            self.bump();
            let name = self.ident()?;
            let args = if self.peek() == Some('(') {
                self.bump();
                Some(self.until_close(')')?)
            } else {
                None
            };
            return Ok(SelectorComponent::PseudoElement(name, args));
        }

        let name = self.ident()?;
        if self.peek() != Some('(') {
            return Ok(SelectorComponent::PseudoClass(name, None));
        }
        self.bump();

        let args = if takes_selector_args(&name) {
            let list = self.parse_list(true)?;
            self.bump();
            PseudoArgs::Selectors(list)
        } else {
            PseudoArgs::Raw(self.until_close(')')?)
        };
        Ok(SelectorComponent::PseudoClass(name, Some(args)))
    }

    /// Consume an identifier, escapes included, and return its raw spelling.
    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                let mut hex = 0;
                while hex < 6 && self.peek().is_some_and(|h| h.is_ascii_hexdigit()) {
                    self.bump();
                    hex += 1;
                }
                if hex == 0 {
                    if self.bump().is_none() {
                        return Err(SelectorError::UnexpectedEnd("escaped character"));
                    }
                } else if self.peek().is_some_and(|w| w.is_ascii_whitespace()) {
                    self.bump();
                }
            } else if is_ident_char(c) {
                self.bump();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// Consume raw text up to the matching `close`, tracking nested
    /// parentheses, brackets, quotes and escapes. The closer is consumed but
    /// not returned.
    fn until_close(&mut self, close: char) -> Result<String, SelectorError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.bump() {
            match (quote, c) {
                (_, '\\') => {
                    self.bump();
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(' | '[') => depth += 1,
                (None, c) if c == close && depth == 0 => {
                    let end = self.pos - c.len_utf8();
                    return Ok(self.input[start..end].to_string());
                }
                (None, ')' | ']') => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        Err(SelectorError::UnexpectedEnd(if close == ']' { "']'" } else { "')'" }))
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.write_str(name),
            Self::Universal => f.write_char('*'),
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Attribute(inner) => write!(f, "[{inner}]"),
            Self::PseudoClass(name, None) => write!(f, ":{name}"),
            Self::PseudoClass(name, Some(PseudoArgs::Selectors(list))) => {
                write!(f, ":{name}({list})")
            }
            Self::PseudoClass(name, Some(PseudoArgs::Raw(raw))) => write!(f, ":{name}({raw})"),
            Self::PseudoElement(name, None) => write!(f, "::{name}"),
            Self::PseudoElement(name, Some(args)) => write!(f, "::{name}({args})"),
            Self::Nesting => f.write_char('&'),
        }
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            match part {
                SelectorPart::Compound(c) => write!(f, "{c}")?,
                SelectorPart::Combinator(Combinator::Descendant) => f.write_char(' ')?,
                SelectorPart::Combinator(c) if i == 0 => write!(f, "{} ", c.symbol())?,
                SelectorPart::Combinator(c) => write!(f, " {} ", c.symbol())?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helper ───────────────────────────────────────────────────────

    fn parse(input: &str) -> SelectorList {
        SelectorList::parse(input).unwrap_or_else(|e| panic!("parse failed for {input:?}: {e}"))
    }

    fn round_trip(input: &str) -> String {
        parse(input).to_string()
    }

    fn first_compound(list: &SelectorList) -> &CompoundSelector {
        match &list.selectors[0].parts[0] {
            SelectorPart::Compound(c) => c,
            SelectorPart::Combinator(_) => panic!("expected compound selector at index 0"),
        }
    }

    // ── Parsing ──────────────────────────────────────────────────────

    #[test]
    fn parse_compound_selector() {
        let list = parse("button.primary:hover");
        let comps = &first_compound(&list).components;
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0], SelectorComponent::Type("button".into()));
        assert_eq!(comps[1], SelectorComponent::Class("primary".into()));
        assert_eq!(comps[2], SelectorComponent::PseudoClass("hover".into(), None));
    }

    #[test]
    fn parse_combinators() {
        let list = parse(".a .b > .c + .d ~ .e");
        let combinators: Vec<Combinator> = list.selectors[0]
            .parts
            .iter()
            .filter_map(|p| match p {
                SelectorPart::Combinator(c) => Some(*c),
                SelectorPart::Compound(_) => None,
            })
            .collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
    }

    #[test]
    fn parse_escaped_class() {
        let list = parse(r".hover\:bg-blue-600:hover");
        let comps = &first_compound(&list).components;
        assert_eq!(comps[0], SelectorComponent::Class(r"hover\:bg-blue-600".into()));
        assert_eq!(comps[1], SelectorComponent::PseudoClass("hover".into(), None));
    }

    #[test]
    fn parse_hex_escape_with_space() {
        let list = parse(r".\31 0 .x");
        let comps = &first_compound(&list).components;
        assert_eq!(comps[0], SelectorComponent::Class(r"\31 0".into()));
        assert_eq!(list.selectors[0].parts.len(), 3);
    }

    #[test]
    fn parse_selector_arguments() {
        let list = parse(r".a:is(:where(.group\/card):hover *)");
        let comps = &first_compound(&list).components;
        let SelectorComponent::PseudoClass(name, Some(PseudoArgs::Selectors(inner))) = &comps[1]
        else {
            panic!("expected :is with selector args");
        };
        assert_eq!(name, "is");
        assert_eq!(inner.selectors.len(), 1);
        assert_eq!(inner.selectors[0].parts.len(), 3);
    }

    #[test]
    fn parse_raw_arguments() {
        let list = parse("li:nth-child(2n + 1)");
        let comps = &first_compound(&list).components;
        assert_eq!(
            comps[1],
            SelectorComponent::PseudoClass("nth-child".into(), Some(PseudoArgs::Raw("2n + 1".into())))
        );
    }

    #[test]
    fn parse_attribute_with_bracket_in_quotes() {
        let list = parse(r#"[data-x="a]b"]"#);
        assert_eq!(
            first_compound(&list).components[0],
            SelectorComponent::Attribute(r#"data-x="a]b""#.into())
        );
    }

    #[test]
    fn parse_relative_selector() {
        let list = parse("> img");
        assert_eq!(
            list.selectors[0].parts[0],
            SelectorPart::Combinator(Combinator::Child)
        );
        assert_eq!(list.to_string(), "> img");
    }

    #[test]
    fn parse_nesting() {
        let list = parse("&:hover");
        assert!(list.selectors[0].starts_with_nesting());
        assert!(parse(":where(& > :not(:last-child))").selectors[0].has_nesting());
        assert!(!parse(".a .b").selectors[0].has_nesting());
    }

    #[test]
    fn parse_errors() {
        assert!(SelectorList::parse(".a:is(.b").is_err());
        assert!(SelectorList::parse(".").is_err());
        assert!(SelectorList::parse(".a )").is_err());
        assert!(SelectorList::parse("").is_err());
    }

    // ── Serialization ────────────────────────────────────────────────

    #[test]
    fn round_trip_selectors() {
        for input in [
            ".a",
            ".a, .b:hover",
            r".md\:p-8",
            ".a > .b ~ .c + .d",
            r":where(.space-y-4 > :not(:last-child))",
            "a::before",
            "::part(label)",
            "input[type=\"checkbox\"]:checked",
        ] {
            assert_eq!(round_trip(input), input);
        }
    }

    #[test]
    fn round_trip_normalizes_whitespace() {
        assert_eq!(round_trip(".a   >.b,.c"), ".a > .b, .c");
    }

    // ── Classes and rescoping ────────────────────────────────────────

    #[test]
    fn classes_include_nested_arguments() {
        let list = parse(r".group:hover .group-hover\:x, :where(.divide-y > :not(.last))");
        assert_eq!(
            list.classes(),
            vec!["group", r"group-hover\:x", "divide-y", "last"]
        );
    }

    #[test]
    fn rename_class_exact_token_only() {
        let mut list = parse(".p-4, .p-40, .p-4:hover");
        let count = list.rename_class("p-4", "Card");
        assert_eq!(count, 2);
        assert_eq!(list.to_string(), ".Card, .p-40, .Card:hover");
    }

    #[test]
    fn rename_class_matches_escaped_spelling() {
        let mut list = parse(r".hover\:bg-blue-600:hover");
        list.rename_class("hover:bg-blue-600", "Button");
        assert_eq!(list.to_string(), ".Button:hover");
    }

    #[test]
    fn rename_class_inside_arguments() {
        let mut list = parse(":where(.space-y-4 > :not(:last-child))");
        list.rename_class("space-y-4", "Stack");
        assert_eq!(list.to_string(), ":where(.Stack > :not(:last-child))");
    }

    // ── Escaping ─────────────────────────────────────────────────────

    #[test]
    fn unescape_variants() {
        assert_eq!(unescape_ident(r"hover\:bg-x"), "hover:bg-x");
        assert_eq!(unescape_ident(r"w-\[10px\]"), "w-[10px]");
        assert_eq!(unescape_ident(r"\31 0"), "10");
        assert_eq!(unescape_ident(r"group\/card"), "group/card");
        assert_eq!(unescape_ident("plain"), "plain");
    }

    #[test]
    fn escape_variants() {
        assert_eq!(escape_ident("Button"), "Button");
        assert_eq!(escape_ident("hover:bg-x"), r"hover\:bg-x");
        assert_eq!(escape_ident("w-[10px]"), r"w-\[10px\]");
        assert_eq!(escape_ident("2xl"), r"\32 xl");
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        for name in ["Button", "group/card", "md:p-8", "1col", "w-[3.5rem]"] {
            assert_eq!(unescape_ident(&escape_ident(name)), name);
        }
    }

    #[test]
    fn class_matches_both_spellings() {
        assert!(class_matches(r"md\:p-8", "md:p-8"));
        assert!(class_matches(r"md\:p-8", r"md\:p-8"));
        assert!(!class_matches(r"md\:p-80", "md:p-8"));
    }
}
