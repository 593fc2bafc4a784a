//! Perspective POM: page objects for Perspective sessions driven through a
//! browser-automation driver.
//!
//! Every page object is a stateless descriptor built from a chain of
//! locators. Calls compose the chain into one CSS or XPath selector and
//! resolve it against the live document, polling until a timeout and
//! re-running reads whose element handle went stale.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   PERSPECTIVE POM Architecture                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Tree /     │    │ Component  │    │ Driver     │            │
//! │   │ Overlay /  │───►│ Piece      │───►│ (adapter   │            │
//! │   │ Collection │    │ + Locator  │    │  or mock)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use perspective_pom::prelude::*;
//! use std::sync::Arc;
//!
//! let driver = Arc::new(MockDriver::new());
//! driver.add_element("div.view button.primary", MockElement::new().with_text("Save"));
//!
//! let settings = PieceSettings::new(driver.clone());
//! let view = ComponentPiece::root(Locator::css("div.view"), settings);
//! let button = view.child(Locator::css("button.primary"));
//! assert_eq!(button.get_text().unwrap(), "Save");
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod collection;
#[allow(clippy::missing_errors_doc)]
mod config;
#[allow(clippy::missing_errors_doc)]
pub mod css;
mod diagnostics;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod driver;
mod geometry;
#[allow(clippy::missing_errors_doc)]
mod locator;
pub mod logging;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod overlay;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
mod piece;
mod result;
#[allow(clippy::missing_errors_doc)]
mod retry;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
mod tree;
mod wait;

pub use collection::{format_template, ComponentCollection, FormatArg};
pub use config::{PieceConfig, PieceSettings, ENV_DESCRIPTION, ENV_POLL_FREQ, ENV_TIMEOUT};
pub use diagnostics::{DiagnosticSink, DirectorySink};
pub use driver::{Action, ClickEffect, Driver, ElementRef, Key, MockDriver, MockElement};
pub use geometry::{Point, Rect};
pub use locator::{escape_css_string, Dialect, Locator, LocatorBuilder, LocatorChain, Strategy};
pub use overlay::{PerspectiveComponent, QualityCode, QualityOverlay, DEFAULT_OVERLAY_TIMEOUT};
pub use piece::{
    Component, ComponentPiece, ScrollAlignment, ScrollBehavior, ScrollOptions, TextCondition,
};
pub use result::{PomError, PomResult};
pub use retry::{retry_on_stale, retry_with_backoff, RetryPolicy, STALE_ELEMENT_RETRIES};
pub use tree::{Item, PerspectiveTree, Tree, DEFAULT_EXPAND_POLICY, EXPANDED_ICON_CLASS};
pub use wait::{wait_some_time, WaitOptions, Waiter, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::collection::*;
    pub use super::config::*;
    pub use super::diagnostics::*;
    pub use super::driver::*;
    pub use super::geometry::*;
    pub use super::locator::*;
    pub use super::overlay::*;
    pub use super::piece::*;
    pub use super::result::*;
    pub use super::retry::*;
    pub use super::tree::*;
    pub use super::wait::*;
}
