//! Browser driver abstraction.
//!
//! Page objects never talk to a browser directly. They call a synchronous
//! [`Driver`] capability: single immediate lookups (polling is done by the
//! page objects themselves), element reads, primitive gestures and script
//! execution.
//!
//! ## Implementations
//!
//! - Caller adapters wrapping a real automation session
//! - [`MockDriver`] - in-memory document for unit testing

use crate::geometry::Rect;
use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// =============================================================================
// ELEMENTS AND ACTIONS
// =============================================================================

/// Opaque handle to a live element. May go stale after a re-render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(String);

impl ElementRef {
    /// Wrap a driver-specific element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver-specific element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Shift
    Shift,
    /// Control
    Control,
    /// Command (macOS)
    Command,
}

impl Key {
    /// Modifier used for discrete (non-range) multi-selection on this platform
    #[must_use]
    pub const fn platform_modifier() -> Self {
        if cfg!(target_os = "macos") {
            Self::Command
        } else {
            Self::Control
        }
    }
}

/// One step of a gesture chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move the pointer to the element's center
    MoveTo(ElementRef),
    /// Move the pointer to an offset from the element's center
    MoveToOffset {
        /// Target element
        element: ElementRef,
        /// Pixels right of center
        x: i64,
        /// Pixels below center
        y: i64,
    },
    /// Click an element
    Click(ElementRef),
    /// Click wherever the pointer is
    ClickAtPointer,
    /// Double-click an element
    DoubleClick(ElementRef),
    /// Right-click an element
    ContextClick(ElementRef),
    /// Press and hold on an element
    ClickAndHold(ElementRef),
    /// Release a held button
    Release,
    /// Press a modifier key
    KeyDown(Key),
    /// Release a modifier key
    KeyUp(Key),
    /// Pause between steps
    Pause(Duration),
}

impl Action {
    /// Element the step targets, if any
    #[must_use]
    pub const fn element(&self) -> Option<&ElementRef> {
        match self {
            Self::MoveTo(e)
            | Self::MoveToOffset { element: e, .. }
            | Self::Click(e)
            | Self::DoubleClick(e)
            | Self::ContextClick(e)
            | Self::ClickAndHold(e) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// DRIVER TRAIT
// =============================================================================

/// Synchronous browser-automation capability.
///
/// Element reads on an invalidated handle return
/// [`PomError::TransientStaleness`]. `click` on an element that is present
/// but not ready returns [`PomError::NotInteractable`], and a click received
/// by another element returns [`PomError::InteractionIntercepted`].
pub trait Driver: Send + Sync + fmt::Debug {
    /// All elements currently matching `locator`, in document order
    fn find_elements(&self, locator: &Locator) -> PomResult<Vec<ElementRef>>;

    /// Rendered rectangle
    fn rect(&self, element: &ElementRef) -> PomResult<Rect>;

    /// Visible text
    fn text(&self, element: &ElementRef) -> PomResult<String>;

    /// Attribute value, `None` when absent
    fn attribute(&self, element: &ElementRef, name: &str) -> PomResult<Option<String>>;

    /// Computed CSS property value
    fn css_value(&self, element: &ElementRef, property: &str) -> PomResult<String>;

    /// Whether the element is rendered visibly
    fn is_displayed(&self, element: &ElementRef) -> PomResult<bool>;

    /// Native click
    fn click(&self, element: &ElementRef) -> PomResult<()>;

    /// Perform a gesture chain as one atomic sequence
    fn perform(&self, actions: &[Action]) -> PomResult<()>;

    /// Run a script; `arguments[i]` is bound to `args[i]`
    fn execute_script(&self, script: &str, args: &[ElementRef]) -> PomResult<serde_json::Value>;

    /// PNG screenshot of one element
    fn screenshot_element(&self, element: &ElementRef) -> PomResult<Vec<u8>>;
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockElement {
    texts: Vec<String>,
    attributes: HashMap<String, String>,
    css: HashMap<String, String>,
    rect: Rect,
    displayed: bool,
    present: bool,
    hidden_lookups: u32,
    remove_after: Option<u32>,
    stale_reads: u32,
    not_interactable_clicks: u32,
    intercepted_by: Option<String>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            texts: vec![String::new()],
            attributes: HashMap::new(),
            css: HashMap::new(),
            rect: Rect::default(),
            displayed: true,
            present: true,
            hidden_lookups: 0,
            remove_after: None,
            stale_reads: 0,
            not_interactable_clicks: 0,
            intercepted_by: None,
        }
    }
}

impl MockElement {
    /// Create a displayed, present element with empty text
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.texts = vec![text.into()];
        self
    }

    /// Successive text reads walk this sequence; the last value sticks
    #[must_use]
    pub fn with_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts = texts.into_iter().map(Into::into).collect();
        if self.texts.is_empty() {
            self.texts.push(String::new());
        }
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS property
    #[must_use]
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Set the rendered rectangle
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Present in the DOM but not visibly rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Not in the DOM until revealed by a click effect
    #[must_use]
    pub const fn absent(mut self) -> Self {
        self.present = false;
        self
    }

    /// Missed by the first `lookups` lookups that would otherwise match it
    #[must_use]
    pub const fn appear_after(mut self, lookups: u32) -> Self {
        self.hidden_lookups = lookups;
        self
    }

    /// Leaves the DOM after matching `lookups` lookups
    #[must_use]
    pub const fn remove_after(mut self, lookups: u32) -> Self {
        self.remove_after = Some(lookups);
        self
    }

    /// The next `reads` element reads report staleness
    #[must_use]
    pub const fn stale_for(mut self, reads: u32) -> Self {
        self.stale_reads = reads;
        self
    }

    /// The next `clicks` native clicks report not-interactable
    #[must_use]
    pub const fn not_interactable_for(mut self, clicks: u32) -> Self {
        self.not_interactable_clicks = clicks;
        self
    }

    /// Every click is received by another element
    #[must_use]
    pub fn intercepted_by(mut self, message: impl Into<String>) -> Self {
        self.intercepted_by = Some(message.into());
        self
    }
}

/// DOM mutation applied when an element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Put an absent element into the DOM
    Reveal(ElementRef),
    /// Take an element out of the DOM
    Remove(ElementRef),
    /// Overwrite an attribute
    SetAttribute {
        /// Target element
        element: ElementRef,
        /// Attribute name
        name: String,
        /// New value
        value: String,
    },
    /// Overwrite the text
    SetText {
        /// Target element
        element: ElementRef,
        /// New text
        text: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    elements: HashMap<String, MockElement>,
    selectors: HashMap<String, Vec<String>>,
    effects: HashMap<String, Vec<ClickEffect>>,
    lookups: HashMap<String, u32>,
    clicks: Vec<ElementRef>,
    actions: Vec<Vec<Action>>,
    scripts: Vec<(String, Vec<ElementRef>)>,
    script_result: serde_json::Value,
    screenshot: Vec<u8>,
    call_history: Vec<String>,
}

/// Mock driver for unit testing.
///
/// Lookups match the composed selector string exactly, so tests register
/// elements under the selectors the page objects are expected to compose.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

impl MockDriver {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.lock().screenshot = PNG_MAGIC.to_vec();
        driver
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an element matched by `selector`, after any existing matches
    pub fn add_element(&self, selector: impl Into<String>, element: MockElement) -> ElementRef {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("e{}", state.next_id);
        state.elements.insert(id.clone(), element);
        state
            .selectors
            .entry(selector.into())
            .or_default()
            .push(id.clone());
        ElementRef::new(id)
    }

    /// Make an existing element also match `selector`
    pub fn alias(&self, selector: impl Into<String>, element: &ElementRef) {
        self.lock()
            .selectors
            .entry(selector.into())
            .or_default()
            .push(element.id().to_string());
    }

    /// Apply `effect` whenever `element` receives a native click
    pub fn on_click(&self, element: &ElementRef, effect: ClickEffect) {
        self.lock()
            .effects
            .entry(element.id().to_string())
            .or_default()
            .push(effect);
    }

    /// Put an element into the DOM
    pub fn reveal(&self, element: &ElementRef) {
        if let Some(el) = self.lock().elements.get_mut(element.id()) {
            el.present = true;
        }
    }

    /// Take an element out of the DOM
    pub fn remove(&self, element: &ElementRef) {
        if let Some(el) = self.lock().elements.get_mut(element.id()) {
            el.present = false;
        }
    }

    /// Overwrite an element's text
    pub fn set_text(&self, element: &ElementRef, text: impl Into<String>) {
        if let Some(el) = self.lock().elements.get_mut(element.id()) {
            el.texts = vec![text.into()];
        }
    }

    /// Value returned by every `execute_script`
    pub fn set_script_result(&self, value: serde_json::Value) {
        self.lock().script_result = value;
    }

    /// Bytes returned by `screenshot_element`
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.lock().screenshot = png;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock()
            .call_history
            .iter()
            .any(|c| c.split(':').next() == Some(method))
    }

    /// Number of lookups issued for `selector`
    #[must_use]
    pub fn lookup_count(&self, selector: &str) -> u32 {
        self.lock().lookups.get(selector).copied().unwrap_or(0)
    }

    /// Elements that received a successful native click, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<ElementRef> {
        self.lock().clicks.clone()
    }

    /// Gesture chains performed, in order
    #[must_use]
    pub fn performed(&self) -> Vec<Vec<Action>> {
        self.lock().actions.clone()
    }

    /// Scripts executed with their element arguments
    #[must_use]
    pub fn scripts(&self) -> Vec<(String, Vec<ElementRef>)> {
        self.lock().scripts.clone()
    }

    /// Current attribute value, bypassing staleness scripting
    #[must_use]
    pub fn attribute_of(&self, element: &ElementRef, name: &str) -> Option<String> {
        self.lock()
            .elements
            .get(element.id())
            .and_then(|el| el.attributes.get(name).cloned())
    }
}

impl MockState {
    fn record(&mut self, call: String) {
        self.call_history.push(call);
    }

    /// Element that is still attached and not scripted stale
    fn live(&mut self, element: &ElementRef) -> PomResult<&mut MockElement> {
        let stale = || PomError::TransientStaleness {
            element: element.to_string(),
        };
        let el = self.elements.get_mut(element.id()).ok_or_else(stale)?;
        if !el.present {
            return Err(stale());
        }
        if el.stale_reads > 0 {
            el.stale_reads -= 1;
            return Err(stale());
        }
        Ok(el)
    }

    fn apply(&mut self, effect: &ClickEffect) {
        match effect {
            ClickEffect::Reveal(e) => {
                if let Some(el) = self.elements.get_mut(e.id()) {
                    el.present = true;
                }
            }
            ClickEffect::Remove(e) => {
                if let Some(el) = self.elements.get_mut(e.id()) {
                    el.present = false;
                }
            }
            ClickEffect::SetAttribute {
                element,
                name,
                value,
            } => {
                if let Some(el) = self.elements.get_mut(element.id()) {
                    el.attributes.insert(name.clone(), value.clone());
                }
            }
            ClickEffect::SetText { element, text } => {
                if let Some(el) = self.elements.get_mut(element.id()) {
                    el.texts = vec![text.clone()];
                }
            }
        }
    }

    fn intercept(&self, element: &ElementRef) -> PomResult<()> {
        let interceptor = self
            .elements
            .get(element.id())
            .and_then(|el| el.intercepted_by.clone());
        match interceptor {
            Some(message) => Err(PomError::InteractionIntercepted {
                target: element.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}

impl Driver for MockDriver {
    fn find_elements(&self, locator: &Locator) -> PomResult<Vec<ElementRef>> {
        let mut state = self.lock();
        state.record(format!("find_elements:{}", locator.value));
        *state.lookups.entry(locator.value.clone()).or_default() += 1;
        let ids = state
            .selectors
            .get(&locator.value)
            .cloned()
            .unwrap_or_default();
        let mut found = Vec::new();
        for id in ids {
            let Some(el) = state.elements.get_mut(&id) else {
                continue;
            };
            if !el.present {
                continue;
            }
            if el.hidden_lookups > 0 {
                el.hidden_lookups -= 1;
                continue;
            }
            match el.remove_after {
                Some(0) => {
                    el.present = false;
                    continue;
                }
                Some(n) => el.remove_after = Some(n - 1),
                None => {}
            }
            found.push(ElementRef::new(id));
        }
        Ok(found)
    }

    fn rect(&self, element: &ElementRef) -> PomResult<Rect> {
        let mut state = self.lock();
        state.record(format!("rect:{element}"));
        Ok(state.live(element)?.rect)
    }

    fn text(&self, element: &ElementRef) -> PomResult<String> {
        let mut state = self.lock();
        state.record(format!("text:{element}"));
        let el = state.live(element)?;
        if el.texts.len() > 1 {
            Ok(el.texts.remove(0))
        } else {
            Ok(el.texts.first().cloned().unwrap_or_default())
        }
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> PomResult<Option<String>> {
        let mut state = self.lock();
        state.record(format!("attribute:{element}:{name}"));
        Ok(state.live(element)?.attributes.get(name).cloned())
    }

    fn css_value(&self, element: &ElementRef, property: &str) -> PomResult<String> {
        let mut state = self.lock();
        state.record(format!("css_value:{element}:{property}"));
        Ok(state
            .live(element)?
            .css
            .get(property)
            .cloned()
            .unwrap_or_default())
    }

    fn is_displayed(&self, element: &ElementRef) -> PomResult<bool> {
        let mut state = self.lock();
        state.record(format!("is_displayed:{element}"));
        Ok(state.live(element)?.displayed)
    }

    fn click(&self, element: &ElementRef) -> PomResult<()> {
        let mut state = self.lock();
        state.record(format!("click:{element}"));
        let el = state.live(element)?;
        if el.not_interactable_clicks > 0 {
            el.not_interactable_clicks -= 1;
            return Err(PomError::NotInteractable {
                element: element.to_string(),
            });
        }
        state.intercept(element)?;
        state.clicks.push(element.clone());
        let effects = state.effects.get(element.id()).cloned().unwrap_or_default();
        for effect in &effects {
            state.apply(effect);
        }
        Ok(())
    }

    fn perform(&self, actions: &[Action]) -> PomResult<()> {
        let mut state = self.lock();
        state.record(format!("perform:{}", actions.len()));
        let mut pointer: Option<ElementRef> = None;
        for action in actions {
            if let Some(element) = action.element() {
                state.live(element)?;
            }
            match action {
                Action::MoveTo(e) | Action::MoveToOffset { element: e, .. } => {
                    pointer = Some(e.clone());
                }
                Action::Click(e) | Action::DoubleClick(e) | Action::ContextClick(e) => {
                    state.intercept(e)?;
                }
                Action::ClickAtPointer => {
                    if let Some(e) = &pointer {
                        state.intercept(e)?;
                    }
                }
                _ => {}
            }
        }
        state.actions.push(actions.to_vec());
        Ok(())
    }

    fn execute_script(&self, script: &str, args: &[ElementRef]) -> PomResult<serde_json::Value> {
        let mut state = self.lock();
        state.record(format!("execute_script:{script}"));
        for arg in args {
            state.live(arg)?;
        }
        state.scripts.push((script.to_string(), args.to_vec()));
        Ok(state.script_result.clone())
    }

    fn screenshot_element(&self, element: &ElementRef) -> PomResult<Vec<u8>> {
        let mut state = self.lock();
        state.record(format!("screenshot_element:{element}"));
        state.live(element)?;
        Ok(state.screenshot.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_document_order() {
            let driver = MockDriver::new();
            let a = driver.add_element("li", MockElement::new());
            let b = driver.add_element("li", MockElement::new());
            assert_eq!(driver.find_elements(&Locator::css("li")).unwrap(), vec![a, b]);
            assert!(driver.find_elements(&Locator::css("ul")).unwrap().is_empty());
            assert_eq!(driver.lookup_count("li"), 1);
        }

        #[test]
        fn test_appear_after() {
            let driver = MockDriver::new();
            driver.add_element("div", MockElement::new().appear_after(2));
            let loc = Locator::css("div");
            assert!(driver.find_elements(&loc).unwrap().is_empty());
            assert!(driver.find_elements(&loc).unwrap().is_empty());
            assert_eq!(driver.find_elements(&loc).unwrap().len(), 1);
        }

        #[test]
        fn test_remove_after() {
            let driver = MockDriver::new();
            let el = driver.add_element("div", MockElement::new().remove_after(1));
            let loc = Locator::css("div");
            assert_eq!(driver.find_elements(&loc).unwrap(), vec![el.clone()]);
            assert!(driver.find_elements(&loc).unwrap().is_empty());
            assert!(matches!(
                driver.text(&el),
                Err(PomError::TransientStaleness { .. })
            ));
        }

        #[test]
        fn test_remove_and_reveal() {
            let driver = MockDriver::new();
            let el = driver.add_element("dialog", MockElement::new());
            let loc = Locator::css("dialog");
            driver.remove(&el);
            assert!(driver.find_elements(&loc).unwrap().is_empty());
            driver.reveal(&el);
            assert_eq!(driver.find_elements(&loc).unwrap(), vec![el]);
        }

        #[test]
        fn test_alias() {
            let driver = MockDriver::new();
            let el = driver.add_element("a", MockElement::new());
            driver.alias("b", &el);
            assert_eq!(driver.find_elements(&Locator::css("b")).unwrap(), vec![el]);
        }
    }

    mod read_tests {
        use super::*;

        #[test]
        fn test_text_sequence_sticks_on_last() {
            let driver = MockDriver::new();
            let el = driver.add_element("p", MockElement::new().with_texts(["a", "b"]));
            assert_eq!(driver.text(&el).unwrap(), "a");
            assert_eq!(driver.text(&el).unwrap(), "b");
            assert_eq!(driver.text(&el).unwrap(), "b");
        }

        #[test]
        fn test_stale_reads_then_recover() {
            let driver = MockDriver::new();
            let el = driver.add_element("p", MockElement::new().with_text("x").stale_for(1));
            assert!(matches!(
                driver.text(&el),
                Err(PomError::TransientStaleness { .. })
            ));
            assert_eq!(driver.text(&el).unwrap(), "x");
        }

        #[test]
        fn test_attributes_and_css() {
            let driver = MockDriver::new();
            let el = driver.add_element(
                "p",
                MockElement::new()
                    .with_attribute("class", "a b")
                    .with_css("fill", "red"),
            );
            assert_eq!(driver.attribute(&el, "class").unwrap().as_deref(), Some("a b"));
            assert_eq!(driver.attribute(&el, "id").unwrap(), None);
            assert_eq!(driver.css_value(&el, "fill").unwrap(), "red");
        }
    }

    mod interaction_tests {
        use super::*;

        #[test]
        fn test_not_interactable_then_click() {
            let driver = MockDriver::new();
            let el = driver.add_element("b", MockElement::new().not_interactable_for(1));
            assert!(matches!(
                driver.click(&el),
                Err(PomError::NotInteractable { .. })
            ));
            driver.click(&el).unwrap();
            assert_eq!(driver.clicks(), vec![el]);
            assert!(driver.was_called("click"));
        }

        #[test]
        fn test_click_effects() {
            let driver = MockDriver::new();
            let button = driver.add_element("b", MockElement::new());
            let panel = driver.add_element("p", MockElement::new().absent());
            driver.on_click(&button, ClickEffect::Reveal(panel.clone()));
            driver.on_click(
                &button,
                ClickEffect::SetAttribute {
                    element: button.clone(),
                    name: "class".into(),
                    value: "open".into(),
                },
            );
            assert!(driver.find_elements(&Locator::css("p")).unwrap().is_empty());
            driver.click(&button).unwrap();
            assert_eq!(driver.find_elements(&Locator::css("p")).unwrap(), vec![panel]);
            assert_eq!(driver.attribute_of(&button, "class").as_deref(), Some("open"));
        }

        #[test]
        fn test_intercepted_click() {
            let driver = MockDriver::new();
            let el = driver.add_element("b", MockElement::new().intercepted_by("div.modal"));
            let err = driver.click(&el).unwrap_err();
            assert!(matches!(err, PomError::InteractionIntercepted { .. }));
            assert!(driver.clicks().is_empty());
        }

        #[test]
        fn test_perform_records_chain() {
            let driver = MockDriver::new();
            let el = driver.add_element("b", MockElement::new());
            let chain = vec![
                Action::KeyDown(Key::Shift),
                Action::Click(el.clone()),
                Action::KeyUp(Key::Shift),
            ];
            driver.perform(&chain).unwrap();
            assert_eq!(driver.performed(), vec![chain]);
        }

        #[test]
        fn test_pointer_click_intercepted() {
            let driver = MockDriver::new();
            let el = driver.add_element("b", MockElement::new().intercepted_by("x"));
            let err = driver
                .perform(&[
                    Action::MoveToOffset {
                        element: el,
                        x: 1,
                        y: 1,
                    },
                    Action::ClickAtPointer,
                ])
                .unwrap_err();
            assert!(matches!(err, PomError::InteractionIntercepted { .. }));
            assert!(driver.performed().is_empty());
        }

        #[test]
        fn test_script_and_screenshot() {
            let driver = MockDriver::new();
            let el = driver.add_element("b", MockElement::new());
            driver.set_script_result(serde_json::json!(true));
            assert_eq!(
                driver.execute_script("return 1", &[el.clone()]).unwrap(),
                serde_json::json!(true)
            );
            assert_eq!(driver.scripts()[0].1, vec![el.clone()]);
            assert_eq!(&driver.screenshot_element(&el).unwrap()[..8], &PNG_MAGIC);
            driver.set_screenshot(vec![1, 2, 3]);
            assert_eq!(driver.screenshot_element(&el).unwrap(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_platform_modifier() {
        let key = Key::platform_modifier();
        if cfg!(target_os = "macos") {
            assert_eq!(key, Key::Command);
        } else {
            assert_eq!(key, Key::Control);
        }
    }
}
