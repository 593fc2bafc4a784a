//! Quality overlays and the components that can carry them.
//!
//! A quality overlay is the annotation the application draws over a
//! component whose bound data is bad or stale. [`QualityOverlay`] exposes it
//! as a capability any widget can hold; [`PerspectiveComponent`] pairs it with
//! a plain [`ComponentPiece`].

use crate::config::PieceSettings;
use crate::css;
use crate::driver::ElementRef;
use crate::geometry::Point;
use crate::locator::{Dialect, Locator, LocatorChain};
use crate::piece::{Component, ComponentPiece};
use crate::result::{PomError, PomResult};
use crate::retry::retry_on_stale;
use crate::wait::{wait_some_time, Waiter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

const STATE_TIMEOUT: Duration = Duration::from_secs(1);
const POPOVER_TIMEOUT: Duration = Duration::from_secs(1);
const POPOVER_ICON_SETTLE: Duration = Duration::from_millis(100);

/// Default window for [`QualityOverlay::wait_for_no_overlay`]
pub const DEFAULT_OVERLAY_TIMEOUT: Duration = Duration::from_secs(5);

const PARENT_ROW_SCRIPT: &str =
    "return arguments[0].parentElement.getAttribute(\"data-row-index\");";

const SUBCODE_INDEX: usize = 0;
const PROPERTY_INDEX: usize = 1;
const DESCRIPTION_INDEX: usize = 2;

/// Quality name as it appears in the overlay icon classes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityCode(String);

impl QualityCode {
    /// Wrap a quality name
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Quality name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// QUALITY OVERLAY
// =============================================================================

/// Overlay pieces derived from a host component's chain
#[derive(Debug, Clone)]
pub struct QualityOverlay {
    host: LocatorChain,
    state: ComponentPiece,
    footer: ComponentPiece,
    badges: ComponentPiece,
    micro_icons: ComponentPiece,
    popover: ComponentPiece,
    sections: ComponentPiece,
}

impl QualityOverlay {
    /// Build the overlay pieces under `host`
    #[must_use]
    pub fn new(host: &LocatorChain, settings: &PieceSettings) -> Self {
        let immediate = settings.clone().with_timeout(Duration::ZERO);
        let state = ComponentPiece::new(
            Locator::css("div.cfo-parent"),
            host,
            settings.clone().with_timeout(STATE_TIMEOUT),
        );
        let footer = state.child_with(Locator::css("div.cfo-footer"), immediate.clone());
        let header = state.child_with(Locator::css("div.cfo-header"), immediate.clone());
        let badges = header.child_with(Locator::css("div.icon-wrapper svg"), immediate.clone());
        let micro_icons = footer.child_with(Locator::css("div.micro-icon"), immediate);
        let popover = ComponentPiece::root(
            Locator::css("div.component-popover"),
            settings.clone().with_timeout(POPOVER_TIMEOUT),
        );
        let sections = popover.child_with(
            Locator::css("div.popover-body-section div.body-content"),
            settings.clone(),
        );
        Self {
            host: host.clone(),
            state,
            footer,
            badges,
            micro_icons,
            popover,
            sections,
        }
    }

    fn host_locator(&self) -> String {
        self.host
            .compose(Dialect::Css)
            .map(|l| l.value)
            .unwrap_or_default()
    }

    /// Whether an overlay is attached right now
    pub fn is_displayed(&self) -> PomResult<bool> {
        self.state.is_present()
    }

    /// Whether the overlay shows only its micro icons
    pub fn is_in_micro_mode(&self) -> PomResult<bool> {
        self.micro_icons.is_displayed()
    }

    /// Footer text; fails when there is no overlay or it is in micro mode
    pub fn footer_text(&self) -> PomResult<String> {
        self.footer.get_text()
    }

    /// Whether the footer shows any text
    pub fn footer_text_is_displayed(&self) -> PomResult<bool> {
        match self.footer_text() {
            Ok(text) => Ok(!text.is_empty()),
            Err(PomError::ElementNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether a quality popover is open anywhere in the document
    pub fn popover_is_displayed(&self) -> PomResult<bool> {
        self.popover.is_present()
    }

    /// Open the popover through the micro icon or the header badge.
    ///
    /// Always clicks: an open popover cannot be attributed to a component.
    pub fn click_popover_icon(&self) -> PomResult<()> {
        if self.is_in_micro_mode()? {
            self.micro_icons.click(None, POPOVER_ICON_SETTLE)
        } else {
            self.badges.click(None, POPOVER_ICON_SETTLE)
        }
    }

    /// Open the popover and read one of its sections
    pub fn popover_section(&self, index: usize) -> PomResult<String> {
        self.click_popover_icon()?;
        retry_on_stale(|| {
            let sections = self.sections.find_all(None)?;
            match sections.get(index) {
                Some(section) => self.sections.driver().text(section),
                None => Err(PomError::ElementNotFound {
                    dialect: Dialect::Css.name(),
                    locator: self.sections.css_locator()?.value,
                    description: Some(format!(
                        "popover section {index} of {}",
                        sections.len()
                    )),
                }),
            }
        })
    }

    /// Quality sub-code shown in the popover
    pub fn popover_subcode(&self) -> PomResult<String> {
        self.popover_section(SUBCODE_INDEX)
    }

    /// Bound property shown in the popover
    pub fn popover_property(&self) -> PomResult<String> {
        self.popover_section(PROPERTY_INDEX)
    }

    /// Description shown in the popover
    pub fn popover_description(&self) -> PomResult<String> {
        self.popover_section(DESCRIPTION_INDEX)
    }

    /// Whether an icon for `quality` is shown
    pub fn contains_quality(&self, quality: &QualityCode) -> PomResult<bool> {
        retry_on_stale(|| {
            let targets = if self.is_in_micro_mode()? {
                &self.micro_icons
            } else {
                &self.badges
            };
            let found = match targets.find_all(None) {
                Ok(found) => found,
                Err(PomError::ElementNotFound { .. }) => return Ok(false),
                Err(err) => return Err(err),
            };
            let driver = targets.driver();
            for target in &found {
                let class = driver.attribute(target, "class")?.unwrap_or_default();
                if class.contains(quality.as_str()) {
                    return driver.is_displayed(target);
                }
            }
            Ok(false)
        })
    }

    /// Wait for the overlay to go away, for [`DEFAULT_OVERLAY_TIMEOUT`] when
    /// `timeout` is `None`.
    ///
    /// Returns `Ok(false)` on timeout unless `raise` is set, in which case the
    /// timeout becomes [`PomError::QualityOverlayPresent`].
    pub fn wait_for_no_overlay(
        &self,
        timeout: Option<Duration>,
        raise: bool,
        wait_after: Duration,
    ) -> PomResult<bool> {
        let timeout = timeout.unwrap_or(DEFAULT_OVERLAY_TIMEOUT);
        let outcome = Waiter::new(self.state.settings().wait_options(Some(timeout)))
            .poll(|| Ok((!self.is_displayed()?).then_some(())));
        match outcome {
            Ok(()) => {
                wait_some_time(wait_after);
                Ok(true)
            }
            Err(PomError::Timeout { .. }) if raise => Err(PomError::QualityOverlayPresent {
                locator: self.host_locator(),
            }),
            Err(PomError::Timeout { .. }) => {
                debug!(host = %self.host_locator(), "overlay still present");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// PERSPECTIVE COMPONENT
// =============================================================================

/// A component that may carry a quality overlay
#[derive(Debug, Clone)]
pub struct PerspectiveComponent {
    piece: ComponentPiece,
    overlay: QualityOverlay,
    raise_on_overlay: bool,
}

impl Component for PerspectiveComponent {
    fn assemble(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        Self::new(locator, parent, settings)
    }
}

impl PerspectiveComponent {
    /// Create a component that ignores overlays on lookup
    #[must_use]
    pub fn new(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        let piece = ComponentPiece::new(locator, parent, settings);
        let overlay = QualityOverlay::new(piece.chain(), piece.settings());
        Self {
            piece,
            overlay,
            raise_on_overlay: false,
        }
    }

    /// Fail lookups while an overlay is displayed
    #[must_use]
    pub const fn with_raise_on_overlay(mut self, raise: bool) -> Self {
        self.raise_on_overlay = raise;
        self
    }

    /// Underlying piece
    #[must_use]
    pub const fn piece(&self) -> &ComponentPiece {
        &self.piece
    }

    /// Overlay capability
    #[must_use]
    pub const fn overlay(&self) -> &QualityOverlay {
        &self.overlay
    }

    /// Resolve the component, then check for an overlay when configured to
    pub fn find(&self, timeout: Option<Duration>) -> PomResult<ElementRef> {
        let element = self.piece.find(timeout)?;
        if self.raise_on_overlay && self.overlay.is_displayed()? {
            return Err(PomError::QualityOverlayPresent {
                locator: self.piece.css_locator()?.value,
            });
        }
        Ok(element)
    }

    /// Overlay-checked click
    pub fn click(&self, timeout: Option<Duration>, wait_after: Duration) -> PomResult<()> {
        self.find(timeout)?;
        self.piece.click(timeout, wait_after)
    }

    /// Overlay-checked text read
    pub fn get_text(&self) -> PomResult<String> {
        self.find(None)?;
        self.piece.get_text()
    }

    /// Columns spanned inside a column container
    pub fn column_span(&self) -> PomResult<u32> {
        css::grid_span(&self.piece.get_css_property("grid-column-end")?)
    }

    /// First column the component occupies inside a column container
    pub fn display_column(&self) -> PomResult<u32> {
        css::grid_start(&self.piece.get_css_property("grid-column")?)
    }

    /// Row of the column container the component sits in, read from the
    /// parent's `data-row-index`
    pub fn display_row(&self) -> PomResult<u32> {
        let value = self
            .piece
            .with_element(|d, e| d.execute_script(PARENT_ROW_SCRIPT, std::slice::from_ref(e)))?;
        let row = match &value {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        };
        row.ok_or_else(|| {
            PomError::contract(format!(
                "component is not inside a column container (data-row-index: {value})"
            ))
        })
    }

    /// Columns spanned, from the computed `span` property
    pub fn display_span(&self) -> PomResult<u32> {
        let span = self.piece.get_css_property("span")?;
        span.trim().parse().map_err(|_| {
            PomError::contract(format!(
                "component is not inside a column container (span: {span:?})"
            ))
        })
    }

    /// Origin inside the parent coordinate container, from `left`/`top`
    pub fn origin_within_coordinate_parent(&self) -> PomResult<Point> {
        let left = css::parse_px(&self.piece.get_css_property("left")?)?;
        let top = css::parse_px(&self.piece.get_css_property("top")?)?;
        Ok(Point::new(left, top))
    }

    /// Whether the inline style sizes the component in percent.
    ///
    /// Reads the `style` attribute, since computed values are always pixels.
    pub fn is_in_percent_mode(&self) -> PomResult<bool> {
        let style = self.piece.get_attribute("style")?.unwrap_or_default();
        css::width_is_percent(&style)
    }
}
