//! Lazily built, memoized families of components addressed by a locator template.

use crate::config::PieceSettings;
use crate::locator::{Locator, LocatorChain, Strategy};
use crate::piece::Component;
use crate::result::{PomError, PomResult};
use std::collections::HashMap;
use std::fmt;

/// One value substituted into a locator template
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            // integral floats keep their ".0"
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FormatArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FormatArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for FormatArg {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FormatArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FormatArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Substitute positional placeholders.
///
/// `{}` takes the next argument, `{N}` takes argument `N`, and `{{` / `}}`
/// are literal braces. A placeholder without a matching argument is an error.
pub fn format_template(template: &str, args: &[FormatArg]) -> PomResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => index.push(d),
                        Some(other) => {
                            return Err(PomError::contract(format!(
                                "unexpected {other:?} in placeholder of template {template:?}"
                            )))
                        }
                        None => {
                            return Err(PomError::contract(format!(
                                "unclosed placeholder in template {template:?}"
                            )))
                        }
                    }
                }
                let position = if index.is_empty() {
                    next += 1;
                    next - 1
                } else {
                    index.parse().map_err(|_| {
                        PomError::contract(format!("bad placeholder index {index:?}"))
                    })?
                };
                let arg = args.get(position).ok_or_else(|| {
                    PomError::contract(format!(
                        "template {template:?} needs argument {position}, got {}",
                        args.len()
                    ))
                })?;
                out.push_str(&arg.to_string());
            }
            '}' => {
                return Err(PomError::contract(format!(
                    "unmatched '}}' in template {template:?}"
                )))
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Memoizing factory: the same formatted locator always yields the same instance
#[derive(Debug)]
pub struct ComponentCollection<V: Component> {
    strategy: Strategy,
    template: String,
    parent: LocatorChain,
    settings: PieceSettings,
    entries: HashMap<Locator, Box<V>>,
}

impl<V: Component> ComponentCollection<V> {
    /// Create an empty collection
    #[must_use]
    pub fn new(
        strategy: Strategy,
        template: impl Into<String>,
        parent: &LocatorChain,
        settings: PieceSettings,
    ) -> Self {
        Self {
            strategy,
            template: template.into(),
            parent: parent.clone(),
            settings,
            entries: HashMap::new(),
        }
    }

    /// Instance for `args`, built on first request
    pub fn get(&mut self, args: &[FormatArg]) -> PomResult<&mut V> {
        let locator = Locator::new(self.strategy, format_template(&self.template, args)?);
        let (parent, settings) = (&self.parent, &self.settings);
        let entry = self
            .entries
            .entry(locator)
            .or_insert_with_key(|key| Box::new(V::assemble(key.clone(), parent, settings.clone())));
        Ok(entry.as_mut())
    }

    /// Number of instances built so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been built yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template the locators are formatted from
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}
