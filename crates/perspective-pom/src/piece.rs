//! Component pieces: one compound locator resolved fresh on every call.
//!
//! A [`ComponentPiece`] is a stateless descriptor. It owns a copy of its
//! parent's locator chain plus its own locator, and resolves the composed
//! selector against the live document each time an accessor runs. Reads that
//! use an already-resolved handle are re-run from resolution when the handle
//! goes stale (see [`retry_on_stale`]).

use crate::config::PieceSettings;
use crate::css;
use crate::driver::{Action, Driver, ElementRef};
use crate::geometry::{Point, Rect};
use crate::locator::{Dialect, Locator, LocatorChain};
use crate::result::{PomError, PomResult};
use crate::retry::retry_on_stale;
use crate::wait::{wait_some_time, Waiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

// =============================================================================
// COMPONENT TRAIT
// =============================================================================

/// Anything that can be built from a locator, a parent chain and settings
pub trait Component: Sized {
    /// Build the component; the parent chain is copied
    fn assemble(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self;
}

// =============================================================================
// TEXT CONDITIONS
// =============================================================================

/// Comparison applied by [`ComponentPiece::wait_on_text_condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextCondition {
    /// Text equals the expected value
    Equals,
    /// Text differs from the expected value
    NotEquals,
    /// Text contains the expected value
    Contains,
    /// Text does not contain the expected value
    NotContains,
    /// Equal after removing thousands separators
    NumericEquals,
    /// Different after removing thousands separators
    NumericNotEquals,
}

impl TextCondition {
    /// Canonical name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::NumericEquals => "NUMERIC_EQUALS",
            Self::NumericNotEquals => "NUMERIC_NOT_EQUALS",
        }
    }

    /// Whether `actual` satisfies this condition against `expected`
    #[must_use]
    pub fn matches(&self, expected: &str, actual: &str) -> bool {
        let numeric = |s: &str| s.replace(',', "");
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::Contains => actual.contains(expected),
            Self::NotContains => !actual.contains(expected),
            Self::NumericEquals => numeric(actual) == numeric(expected),
            Self::NumericNotEquals => numeric(actual) != numeric(expected),
        }
    }
}

impl fmt::Display for TextCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextCondition {
    type Err = PomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUALS" => Ok(Self::Equals),
            "NOT_EQUALS" | "DOES_NOT_EQUAL" => Ok(Self::NotEquals),
            "CONTAINS" => Ok(Self::Contains),
            "NOT_CONTAINS" | "DOES_NOT_CONTAIN" => Ok(Self::NotContains),
            "NUMERIC_EQUALS" => Ok(Self::NumericEquals),
            "NUMERIC_NOT_EQUALS" | "NUMERIC_DOES_NOT_EQUAL" => Ok(Self::NumericNotEquals),
            _ => Err(PomError::UnsupportedCondition {
                condition: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// SCROLL OPTIONS
// =============================================================================

/// `scrollIntoView` behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScrollBehavior {
    /// Browser default
    #[default]
    Auto,
    /// Animated
    Smooth,
    /// Jump
    Instant,
}

/// `scrollIntoView` block/inline alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollAlignment {
    /// Align to the start edge
    Start,
    /// Center
    Center,
    /// Align to the end edge
    End,
    /// Scroll as little as possible
    Nearest,
}

impl ScrollBehavior {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

impl ScrollAlignment {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
            Self::Nearest => "nearest",
        }
    }
}

/// Arguments for [`ComponentPiece::scroll_into_view`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOptions {
    /// Animation
    pub behavior: ScrollBehavior,
    /// Vertical alignment
    pub block: ScrollAlignment,
    /// Horizontal alignment
    pub inline: ScrollAlignment,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            behavior: ScrollBehavior::Auto,
            block: ScrollAlignment::Start,
            inline: ScrollAlignment::Nearest,
        }
    }
}

impl ScrollOptions {
    fn script(&self) -> String {
        format!(
            "arguments[0].scrollIntoView({{behavior: \"{}\", block: \"{}\", inline: \"{}\"}});",
            self.behavior.as_str(),
            self.block.as_str(),
            self.inline.as_str()
        )
    }
}

// =============================================================================
// COMPONENT PIECE
// =============================================================================

/// One element reference, described by a locator under a parent chain
#[derive(Debug, Clone)]
pub struct ComponentPiece {
    locator: Locator,
    parent: LocatorChain,
    chain: LocatorChain,
    settings: PieceSettings,
}

impl Component for ComponentPiece {
    fn assemble(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        Self::new(locator, parent, settings)
    }
}

impl ComponentPiece {
    /// Create a piece under a copy of `parent`
    #[must_use]
    pub fn new(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        let parent = parent.clone();
        let chain = parent.with(locator.clone());
        Self {
            locator,
            parent,
            chain,
            settings,
        }
    }

    /// Create a piece with no parent
    #[must_use]
    pub fn root(locator: Locator, settings: PieceSettings) -> Self {
        Self::new(locator, &LocatorChain::new(), settings)
    }

    /// Piece nested under this one, sharing its settings
    #[must_use]
    pub fn child(&self, locator: Locator) -> Self {
        Self::new(locator, &self.chain, self.settings.clone())
    }

    /// Piece nested under this one with its own settings
    #[must_use]
    pub fn child_with(&self, locator: Locator, settings: PieceSettings) -> Self {
        Self::new(locator, &self.chain, settings)
    }

    /// Own locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Full chain, root first, ending with the own locator
    #[must_use]
    pub const fn chain(&self) -> &LocatorChain {
        &self.chain
    }

    /// Settings this piece resolves with
    #[must_use]
    pub const fn settings(&self) -> &PieceSettings {
        &self.settings
    }

    /// Diagnostic description
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.settings.description()
    }

    /// Driver handle
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.settings.driver().as_ref()
    }

    /// Swap the own locator; the parent chain is kept
    pub fn set_locator(&mut self, locator: Locator) {
        self.chain = self.parent.with(locator.clone());
        self.locator = locator;
    }

    /// Full CSS selector
    pub fn css_locator(&self) -> PomResult<Locator> {
        self.chain.compose(Dialect::Css)
    }

    /// Full XPath expression
    pub fn xpath_locator(&self) -> PomResult<Locator> {
        self.chain.compose(Dialect::XPath)
    }

    /// Composed CSS text for messages, falling back to the own locator
    fn display_locator(&self) -> String {
        self.css_locator()
            .map(|l| l.value)
            .unwrap_or_else(|_| self.locator.value.clone())
    }

    fn not_found(&self, dialect: Dialect, locator: &Locator) -> PomError {
        PomError::ElementNotFound {
            dialect: dialect.name(),
            locator: locator.value.clone(),
            description: self.description().map(str::to_owned),
        }
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    fn resolve(&self, dialect: Dialect, timeout: Option<Duration>) -> PomResult<Vec<ElementRef>> {
        let locator = self.chain.compose(dialect)?;
        let options = self.settings.wait_options(timeout);
        debug!(
            dialect = dialect.name(),
            locator = %locator.value,
            timeout_ms = options.timeout_ms(),
            "resolving"
        );
        Waiter::new(options)
            .poll(|| {
                let found = self.driver().find_elements(&locator)?;
                Ok((!found.is_empty()).then_some(found))
            })
            .map_err(|err| match err {
                PomError::Timeout { .. } => self.not_found(dialect, &locator),
                other => other,
            })
    }

    fn first(&self, dialect: Dialect, timeout: Option<Duration>) -> PomResult<ElementRef> {
        let mut found = self.resolve(dialect, timeout)?;
        Ok(found.swap_remove(0))
    }

    /// First match in document order, polling up to `timeout` (default when `None`)
    pub fn find(&self, timeout: Option<Duration>) -> PomResult<ElementRef> {
        self.first(Dialect::Css, timeout)
    }

    /// Every match in document order
    pub fn find_all(&self, timeout: Option<Duration>) -> PomResult<Vec<ElementRef>> {
        self.resolve(Dialect::Css, timeout)
    }

    /// [`ComponentPiece::find`] using the XPath composition
    pub fn xfind(&self, timeout: Option<Duration>) -> PomResult<ElementRef> {
        self.first(Dialect::XPath, timeout)
    }

    /// [`ComponentPiece::find_all`] using the XPath composition
    pub fn xfind_all(&self, timeout: Option<Duration>) -> PomResult<Vec<ElementRef>> {
        self.resolve(Dialect::XPath, timeout)
    }

    /// Resolve, then run `op` on the element; the whole sequence restarts on staleness
    pub fn with_element<T, F>(&self, mut op: F) -> PomResult<T>
    where
        F: FnMut(&dyn Driver, &ElementRef) -> PomResult<T>,
    {
        retry_on_stale(|| {
            let element = self.find(None)?;
            op(self.driver(), &element)
        })
    }

    /// Like [`ComponentPiece::with_element`] with an immediate lookup; a miss is `None`
    pub fn read_if_present<T, F>(&self, mut op: F) -> PomResult<Option<T>>
    where
        F: FnMut(&dyn Driver, &ElementRef) -> PomResult<T>,
    {
        retry_on_stale(|| match self.find(Some(Duration::ZERO)) {
            Ok(element) => op(self.driver(), &element).map(Some),
            Err(PomError::ElementNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        })
    }

    /// Poll until nothing matches
    pub fn wait_until_removed(&self, timeout: Option<Duration>) -> PomResult<()> {
        let locator = self.css_locator()?;
        Waiter::new(self.settings.wait_options(timeout))
            .poll(|| Ok(self.driver().find_elements(&locator)?.is_empty().then_some(())))
            .map_err(|err| match err {
                PomError::Timeout { .. } => PomError::ElementStillPresent {
                    locator: locator.value.clone(),
                    description: self.description().map(str::to_owned),
                },
                other => other,
            })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Whether the element is present and visibly rendered; never waits
    pub fn is_displayed(&self) -> PomResult<bool> {
        Ok(self.read_if_present(|d, e| d.is_displayed(e))?.unwrap_or(false))
    }

    /// Whether anything matches right now
    pub fn is_present(&self) -> PomResult<bool> {
        Ok(self.read_if_present(|_, _| Ok(()))?.is_some())
    }

    /// Visible text
    pub fn get_text(&self) -> PomResult<String> {
        self.with_element(|d, e| d.text(e))
    }

    /// Whether the visible text is exactly `text`
    pub fn has_text(&self, text: &str) -> PomResult<bool> {
        Ok(self.get_text()? == text)
    }

    /// Attribute value, `None` when absent
    pub fn get_attribute(&self, name: &str) -> PomResult<Option<String>> {
        self.with_element(|d, e| d.attribute(e, name))
    }

    /// Computed CSS property
    pub fn get_css_property(&self, property: &str) -> PomResult<String> {
        self.with_element(|d, e| d.css_value(e, property))
    }

    /// Computed height; `"auto"` falls back to the rendered height
    pub fn get_computed_height(&self, include_units: bool) -> PomResult<String> {
        self.computed_dimension("height", include_units)
    }

    /// Computed width; `"auto"` falls back to the rendered width
    pub fn get_computed_width(&self, include_units: bool) -> PomResult<String> {
        self.computed_dimension("width", include_units)
    }

    fn computed_dimension(&self, property: &str, include_units: bool) -> PomResult<String> {
        self.with_element(|d, e| {
            let value = d.css_value(e, property)?;
            if value == "auto" {
                let rect = d.rect(e)?;
                let size = if property == "height" {
                    rect.height
                } else {
                    rect.width
                };
                return Ok(css::format_dimension(size));
            }
            Ok(if include_units {
                value
            } else {
                css::strip_px(&value)
            })
        })
    }

    /// Rendered rectangle
    pub fn rect(&self) -> PomResult<Rect> {
        self.with_element(|d, e| d.rect(e))
    }

    /// Top-left corner in viewport coordinates
    pub fn get_origin(&self) -> PomResult<Point> {
        Ok(self.rect()?.origin())
    }

    /// Bottom-right corner in viewport coordinates
    pub fn get_termination(&self) -> PomResult<Point> {
        Ok(self.rect()?.termination())
    }

    /// Whether the two rendered rectangles overlap; touching is not a collision
    pub fn boundary_collision(&self, other: &Self) -> PomResult<bool> {
        Ok(self.rect()?.overlaps(&other.rect()?))
    }

    /// Wait for the text to satisfy `condition` and return the last text seen.
    ///
    /// With `expected == None` the current text is returned without waiting.
    /// When the window elapses without a match the last observed text is
    /// still returned. Only an element that was never found during the whole
    /// window is an error.
    pub fn wait_on_text_condition(
        &self,
        expected: Option<&str>,
        condition: TextCondition,
        timeout: Option<Duration>,
    ) -> PomResult<String> {
        let Some(expected) = expected else {
            return self.get_text();
        };
        let locator = self.css_locator()?;
        let mut last: Option<String> = None;
        let outcome = Waiter::new(self.settings.wait_options(timeout)).poll(|| {
            let read = retry_on_stale(|| match self.driver().find_elements(&locator)?.first() {
                Some(element) => self.driver().text(element).map(Some),
                None => Ok(None),
            })?;
            Ok(read.and_then(|text| {
                let matched = condition.matches(expected, &text);
                trace!(%condition, %text, matched, "text condition check");
                last = Some(text.clone());
                matched.then_some(text)
            }))
        });
        match outcome {
            Ok(text) => Ok(text),
            Err(PomError::Timeout { .. }) => {
                last.ok_or_else(|| self.not_found(Dialect::Css, &locator))
            }
            Err(err) => Err(err),
        }
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    /// Click once the element accepts interaction.
    ///
    /// One `timeout` window (default when `None`) covers both resolution and
    /// polling for interactability; at least one click is always attempted.
    pub fn click(&self, timeout: Option<Duration>, wait_after: Duration) -> PomResult<()> {
        let options = self.settings.wait_options(timeout);
        let window = options.timeout;
        let start = Instant::now();
        self.find(Some(window))?;
        Waiter::new(options.with_timeout(window.saturating_sub(start.elapsed())))
            .poll(|| self.try_click())
            .map_err(|err| match err {
                PomError::Timeout { .. } => PomError::NeverClickable {
                    locator: self.display_locator(),
                    description: self.description().map(str::to_owned),
                },
                other => other,
            })?;
        wait_some_time(wait_after);
        Ok(())
    }

    fn try_click(&self) -> PomResult<Option<()>> {
        retry_on_stale(|| {
            let element = self.find(Some(Duration::ZERO))?;
            match self.driver().click(&element) {
                Ok(()) => Ok(Some(())),
                Err(PomError::NotInteractable { element }) => {
                    trace!(%element, "not yet interactable");
                    Ok(None)
                }
                Err(err) => Err(self.on_intercept(&element, err)),
            }
        })
    }

    /// Click at an offset from the element's center
    pub fn click_with_offset(&self, x: i64, y: i64) -> PomResult<()> {
        self.with_element(|d, e| {
            let chain = [
                Action::MoveToOffset {
                    element: e.clone(),
                    x,
                    y,
                },
                Action::ClickAtPointer,
            ];
            d.perform(&chain).map_err(|err| self.on_intercept(e, err))
        })
    }

    /// Double-click
    pub fn double_click(&self, wait_after: Duration) -> PomResult<()> {
        self.gesture(|e| vec![Action::MoveTo(e.clone()), Action::DoubleClick(e.clone())])?;
        wait_some_time(wait_after);
        Ok(())
    }

    /// Right-click
    pub fn right_click(&self, wait_after: Duration) -> PomResult<()> {
        self.gesture(|e| vec![Action::MoveTo(e.clone()), Action::ContextClick(e.clone())])?;
        wait_some_time(wait_after);
        Ok(())
    }

    /// Move the pointer over the element
    pub fn hover(&self) -> PomResult<()> {
        self.gesture(|e| vec![Action::MoveTo(e.clone())])
    }

    /// Press on this element, move to `target` and release
    pub fn drag_to(&self, target: &Self) -> PomResult<()> {
        retry_on_stale(|| {
            let from = self.find(None)?;
            let to = target.find(None)?;
            self.driver()
                .perform(&[
                    Action::ClickAndHold(from.clone()),
                    Action::MoveTo(to),
                    Action::Release,
                ])
                .map_err(|err| self.on_intercept(&from, err))
        })
    }

    /// Scroll the element into view
    pub fn scroll_into_view(&self, options: ScrollOptions) -> PomResult<()> {
        let script = options.script();
        self.with_element(|d, e| d.execute_script(&script, std::slice::from_ref(e)).map(|_| ()))
    }

    /// Force a `blur()` on the element
    pub fn release_focus(&self) -> PomResult<()> {
        self.with_element(|d, e| {
            d.execute_script("arguments[0].blur();", std::slice::from_ref(e))
                .map(|_| ())
        })
    }

    fn gesture<F>(&self, build: F) -> PomResult<()>
    where
        F: Fn(&ElementRef) -> Vec<Action>,
    {
        self.with_element(|d, e| d.perform(&build(e)).map_err(|err| self.on_intercept(e, err)))
    }

    /// Capture a screenshot for an intercepted click and rewrap the error with the locator
    fn on_intercept(&self, element: &ElementRef, err: PomError) -> PomError {
        let message = match err {
            PomError::InteractionIntercepted { message, .. } => message,
            other => return other,
        };
        let target = self.display_locator();
        warn!(locator = %target, %message, "click intercepted");
        if let Some(sink) = self.settings.sink() {
            match self.driver().screenshot_element(element) {
                Ok(png) => {
                    if let Err(e) = sink.capture(&target, &png) {
                        warn!(error = %e, "failed to store interception screenshot");
                    }
                }
                Err(e) => warn!(error = %e, "failed to capture interception screenshot"),
            }
        }
        PomError::InteractionIntercepted { target, message }
    }
}
