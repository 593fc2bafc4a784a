//! Locators and compound selector composition.
//!
//! A [`LocatorChain`] is an ordered, ancestor-first list of [`Locator`]s.
//! [`LocatorBuilder::compose`] folds a chain into one selector string for a
//! target [`Dialect`].
//!
//! CSS composition joins segments with the descendant combinator. A segment
//! whose raw value carries a top-level comma (an OR group) forks the
//! accumulated prefix, so `[".a", "b, c"]` composes to `.a b, .a c`.
//! XPath composition concatenates fragments verbatim.

use crate::result::{PomError, PomResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STRATEGY / LOCATOR
// =============================================================================

/// How a locator value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Raw CSS selector
    Css,
    /// Raw XPath expression
    XPath,
    /// Element id
    Id,
    /// Single class name
    Class,
    /// `name` attribute
    Name,
    /// Tag name
    Tag,
    /// Exact anchor text
    LinkText,
    /// Anchor text substring
    PartialLinkText,
}

impl Strategy {
    /// Get the strategy name as used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css selector",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Class => "class name",
            Self::Name => "name",
            Self::Tag => "tag name",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy/value pair. Equality and hashing are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Interpretation of `value`
    pub strategy: Strategy,
    /// Selector text
    pub value: String,
}

impl Locator {
    /// Create a new locator
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// CSS selector locator
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Id locator
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Class name locator
    #[must_use]
    pub fn class(value: impl Into<String>) -> Self {
        Self::new(Strategy::Class, value)
    }

    /// Name attribute locator
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// Tag name locator
    #[must_use]
    pub fn tag(value: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, value)
    }

    /// Exact link text locator
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// Partial link text locator
    #[must_use]
    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.strategy, self.value)
    }
}

// =============================================================================
// LOCATOR CHAIN
// =============================================================================

/// Ancestor-first sequence of locators.
///
/// Chains are values: deriving a child chain copies the parent's locators, so
/// later changes to a parent never leak into children built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorChain {
    locators: Vec<Locator>,
}

impl LocatorChain {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this chain with `locator` appended
    #[must_use]
    pub fn with(&self, locator: Locator) -> Self {
        let mut locators = self.locators.clone();
        locators.push(locator);
        Self { locators }
    }

    /// Append a locator in place
    pub fn push(&mut self, locator: Locator) {
        self.locators.push(locator);
    }

    /// Locators, root first
    #[must_use]
    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    /// Number of locators in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Compose this chain for `dialect`
    pub fn compose(&self, dialect: Dialect) -> PomResult<Locator> {
        LocatorBuilder::compose(&self.locators, dialect)
    }
}

impl From<Vec<Locator>> for LocatorChain {
    fn from(locators: Vec<Locator>) -> Self {
        Self { locators }
    }
}

impl FromIterator<Locator> for LocatorChain {
    fn from_iter<I: IntoIterator<Item = Locator>>(iter: I) -> Self {
        Self {
            locators: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// DIALECT / BUILDER
// =============================================================================

/// Target selector language of a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// CSS selectors
    Css,
    /// XPath 1.0 expressions
    XPath,
}

impl Dialect {
    /// Upper-case name used in error messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::XPath => "XPATH",
        }
    }

    /// Strategy of a locator composed in this dialect
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::Css => Strategy::Css,
            Self::XPath => Strategy::XPath,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pure composition of locator chains
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorBuilder;

impl LocatorBuilder {
    /// Compose `chain` into a single locator of `dialect`
    pub fn compose(chain: &[Locator], dialect: Dialect) -> PomResult<Locator> {
        let value = match dialect {
            Dialect::Css => Self::css(chain)?,
            Dialect::XPath => Self::xpath(chain)?,
        };
        Ok(Locator::new(dialect.strategy(), value))
    }

    /// Compose a CSS selector
    pub fn css(chain: &[Locator]) -> PomResult<String> {
        let mut prefix: Vec<String> = Vec::new();
        let mut alternatives: Vec<String> = Vec::new();

        for locator in chain {
            let value = &locator.value;
            let segment = match locator.strategy {
                Strategy::Id => format!("[id=\"{value}\"]"),
                Strategy::Class => format!(".{value}"),
                Strategy::Name => format!("[name=\"{value}\"]"),
                Strategy::Css | Strategy::Tag => {
                    let branches = split_top_level(value);
                    if branches.len() > 1 {
                        alternatives = fork(&prefix, alternatives, &branches, value)?;
                        continue;
                    }
                    value.clone()
                }
                Strategy::XPath | Strategy::LinkText | Strategy::PartialLinkText => {
                    return Err(PomError::contract(format!(
                        "locator {locator} has a strategy of {} which is incompatible with the CSS builder",
                        locator.strategy
                    )));
                }
            };
            if alternatives.is_empty() {
                prefix.push(segment);
            } else {
                for alt in &mut alternatives {
                    alt.push(' ');
                    alt.push_str(&segment);
                }
            }
        }

        Ok(if alternatives.is_empty() {
            prefix.join(" ")
        } else {
            alternatives.join(", ")
        })
    }

    /// Compose an XPath expression
    pub fn xpath(chain: &[Locator]) -> PomResult<String> {
        let mut out = String::new();
        for locator in chain {
            let value = &locator.value;
            match locator.strategy {
                Strategy::Css => {
                    return Err(PomError::contract(format!(
                        "locator {locator} has a strategy of {} which is incompatible with the XPATH builder",
                        locator.strategy
                    )));
                }
                Strategy::Id => out.push_str(&format!("//*[@id=\"{value}\"]")),
                Strategy::Class => out.push_str(&format!(
                    "//*[contains(concat(\" \",normalize-space(@class),\" \"),\"{value}\")]"
                )),
                Strategy::Name => out.push_str(&format!("//*[@name=\"{value}\"]")),
                Strategy::LinkText => out.push_str(&format!("//a[normalize-space()=\"{value}\"]")),
                Strategy::PartialLinkText => {
                    out.push_str(&format!("//a[contains(normalize-space(),\"{value}\")]"));
                }
                Strategy::Tag => out.push_str(&format!("//{value}")),
                Strategy::XPath => out.push_str(value),
            }
        }
        Ok(out)
    }
}

/// Expand the accumulated alternatives against every comma branch.
///
/// With no alternatives yet, each branch inherits the plain prefix. Otherwise
/// every existing alternative is extended by every branch, branch-major.
fn fork(
    prefix: &[String],
    alternatives: Vec<String>,
    branches: &[&str],
    raw: &str,
) -> PomResult<Vec<String>> {
    let mut next = Vec::with_capacity(branches.len() * alternatives.len().max(1));
    for branch in branches {
        let branch = branch.strip_prefix(' ').unwrap_or(branch);
        if branch.trim().is_empty() {
            return Err(PomError::contract(format!(
                "selector {raw:?} contains an empty comma branch"
            )));
        }
        if alternatives.is_empty() {
            let mut alt = prefix.join(" ");
            if !alt.is_empty() {
                alt.push(' ');
            }
            alt.push_str(branch);
            next.push(alt);
        } else {
            next.extend(alternatives.iter().map(|alt| format!("{alt} {branch}")));
        }
    }
    Ok(next)
}

/// Split on commas outside quotes, brackets and parentheses.
pub(crate) fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Escape a value for use inside a double-quoted CSS attribute selector
#[must_use]
pub fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
