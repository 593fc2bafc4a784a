//! Tree widgets and the label-ancestry identity of their nodes.
//!
//! Two nodes may share a label at different depths, so a node is addressed
//! by an [`Item`]: its label plus the labels of every ancestor. The item's
//! locator selects each ancestor node by exact label and ends on the tree
//! row carrying the item's own label.
//!
//! # Example
//!
//! ```ignore
//! let folder = Arc::new(Item::new("Folder", None));
//! let tag = Item::new("Tag", Some(folder));
//! tree.expand_to_item(&tag, None)?;
//! tree.click_item(&tag, Duration::ZERO)?;
//! ```

use crate::config::PieceSettings;
use crate::driver::{Action, ElementRef, Key};
use crate::locator::{escape_css_string, Locator, LocatorChain};
use crate::overlay::QualityOverlay;
use crate::piece::{Component, ComponentPiece};
use crate::result::{PomError, PomResult};
use crate::retry::{retry_on_stale, retry_with_backoff, RetryPolicy};
use crate::wait::wait_some_time;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const ITEM_SELECTOR: &str = ".tree-item";
const NODE_SELECTOR: &str = "[class*=\"-node\"]";
const LABEL_SELECTOR: &str = "div.label-wrapper-text";
const TOP_LEVEL_SELECTOR: &str = "div.tree>div>div>div.tree-row";
const EXPANSION_ICON_SELECTOR: &str = "svg.expand-icon";
const NODE_ICON_SELECTOR: &str = "svg.node-icon";
const GLYPH_SELECTOR: &str = "g";
const ICON_USE_SELECTOR: &str = "use";
const ICON_PATH_SELECTOR: &str = "path";
const ICON_NAME_ATTRIBUTE: &str = "data-icon";
const FIRST_ROW_SELECTOR: &str = "div[data-item-path=\"0\"]";

/// Class carried by the expansion icon of an expanded node
pub const EXPANDED_ICON_CLASS: &str = "ia_treeComponent__expandIcon--expanded";

const EXPANSION_GLYPH_TIMEOUT: Duration = Duration::from_secs(1);
const FIRST_ROW_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_EXPANSION_SETTLE: Duration = Duration::from_millis(500);
const DEFAULT_SELECTION_PAUSE: Duration = Duration::from_secs(1);

/// Default restart policy for [`Tree::expand_to_item`]
pub const DEFAULT_EXPAND_POLICY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));

// =============================================================================
// ITEM
// =============================================================================

/// One node of a tree, identified by its label ancestry
#[derive(Debug, Clone)]
pub struct Item {
    label: String,
    parent: Option<Arc<Item>>,
    index_path: Option<String>,
    ancestry: Vec<Arc<Item>>,
    locator: Locator,
    path: String,
}

impl Item {
    /// Create an item; ancestry, locator and path are derived immediately.
    ///
    /// An ancestor with an empty label stands for the synthetic root and ends
    /// the ancestry walk.
    #[must_use]
    pub fn new(label: impl Into<String>, parent: Option<Arc<Self>>) -> Self {
        let label = label.into();

        let mut ancestry = Vec::new();
        let mut cursor = parent.clone();
        while let Some(ancestor) = cursor {
            if ancestor.label.is_empty() {
                break;
            }
            cursor = ancestor.parent.clone();
            ancestry.push(ancestor);
        }
        ancestry.reverse();

        let labels: Vec<&str> = ancestry
            .iter()
            .map(|a| a.label.as_str())
            .chain(std::iter::once(label.as_str()))
            .collect();

        let mut segments: Vec<String> = labels
            .iter()
            .map(|l| format!("{NODE_SELECTOR}[data-label=\"{}\"]", escape_css_string(l)))
            .collect();
        segments.push(format!(
            "{ITEM_SELECTOR}[data-label=\"{}\"]",
            escape_css_string(&label)
        ));

        let path = labels.join("/");
        let locator = Locator::css(segments.join(" "));

        Self {
            label,
            parent,
            index_path: None,
            ancestry,
            locator,
            path,
        }
    }

    /// Build the whole chain from a slash-delimited label path
    pub fn from_path(path: &str) -> PomResult<Self> {
        let mut labels = path.split('/').filter(|s| !s.is_empty());
        let first = labels
            .next()
            .ok_or_else(|| PomError::contract(format!("item path {path:?} has no labels")))?;
        let item = labels.fold(Self::new(first, None), |parent, label| {
            Self::new(label, Some(Arc::new(parent)))
        });
        Ok(item)
    }

    /// Attach the zero-indexed path the tree reports for this node
    #[must_use]
    pub fn with_index_path(mut self, index_path: impl Into<String>) -> Self {
        self.index_path = Some(index_path.into());
        self
    }

    /// Own label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Direct parent
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Ancestors, root first, direct parent last
    #[must_use]
    pub fn ancestry(&self) -> &[Arc<Self>] {
        &self.ancestry
    }

    /// Locator relative to the tree
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Slash-joined label path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Zero-indexed path hint, informational only
    #[must_use]
    pub fn index_path(&self) -> Option<&str> {
        self.index_path.as_deref()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.locator == other.locator
    }
}

impl Eq for Item {}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

// =============================================================================
// TREE
// =============================================================================

/// A tree of items with per-path cached pieces
#[derive(Debug, Clone)]
pub struct Tree {
    piece: ComponentPiece,
    top_level_items: ComponentPiece,
    tree_items: ComponentPiece,
    items: HashMap<String, ComponentPiece>,
    labels: HashMap<String, ComponentPiece>,
    node_icons: HashMap<String, ComponentPiece>,
    expansion_icons: HashMap<String, ComponentPiece>,
    expand_policy: RetryPolicy,
    expansion_settle: Duration,
    selection_pause: Duration,
}

impl Component for Tree {
    fn assemble(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        Self::new(locator, parent, settings)
    }
}

impl Tree {
    /// Create a tree
    #[must_use]
    pub fn new(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        let piece = ComponentPiece::new(locator, parent, settings);
        let top_level_items = piece.child(Locator::css(TOP_LEVEL_SELECTOR));
        let tree_items = piece.child(Locator::css(ITEM_SELECTOR));
        Self {
            piece,
            top_level_items,
            tree_items,
            items: HashMap::new(),
            labels: HashMap::new(),
            node_icons: HashMap::new(),
            expansion_icons: HashMap::new(),
            expand_policy: DEFAULT_EXPAND_POLICY,
            expansion_settle: DEFAULT_EXPANSION_SETTLE,
            selection_pause: DEFAULT_SELECTION_PAUSE,
        }
    }

    /// Default restart policy for [`Tree::expand_to_item`]
    #[must_use]
    pub const fn with_expand_policy(mut self, policy: RetryPolicy) -> Self {
        self.expand_policy = policy;
        self
    }

    /// Settle time after toggling a node
    #[must_use]
    pub const fn with_expansion_settle(mut self, settle: Duration) -> Self {
        self.expansion_settle = settle;
        self
    }

    /// Pause between clicks of a multi-selection, and after it
    #[must_use]
    pub const fn with_selection_pause(mut self, pause: Duration) -> Self {
        self.selection_pause = pause;
        self
    }

    /// The tree's own piece
    #[must_use]
    pub const fn piece(&self) -> &ComponentPiece {
        &self.piece
    }

    // -------------------------------------------------------------------------
    // Cached pieces
    // -------------------------------------------------------------------------

    fn item_piece(&mut self, item: &Item) -> &ComponentPiece {
        let chain = self.piece.chain();
        let settings = self.piece.settings();
        self.items
            .entry(item.path().to_string())
            .or_insert_with(|| ComponentPiece::new(item.locator().clone(), chain, settings.clone()))
    }

    fn label_piece(&mut self, item: &Item) -> &ComponentPiece {
        let key = item.path().to_string();
        if !self.labels.contains_key(&key) {
            let label = self.item_piece(item).child(Locator::css(LABEL_SELECTOR));
            self.labels.insert(key.clone(), label);
        }
        &self.labels[&key]
    }

    fn node_icon(&mut self, item: &Item) -> &ComponentPiece {
        let key = item.path().to_string();
        if !self.node_icons.contains_key(&key) {
            let icon = self.item_piece(item).child(Locator::css(NODE_ICON_SELECTOR));
            self.node_icons.insert(key.clone(), icon);
        }
        &self.node_icons[&key]
    }

    fn expansion_icon(&mut self, item: &Item) -> &ComponentPiece {
        let key = item.path().to_string();
        if !self.expansion_icons.contains_key(&key) {
            let icon = self.item_piece(item).child(Locator::css(EXPANSION_ICON_SELECTOR));
            self.expansion_icons.insert(key.clone(), icon);
        }
        &self.expansion_icons[&key]
    }

    // -------------------------------------------------------------------------
    // State checks
    // -------------------------------------------------------------------------

    /// Whether the item is rendered right now
    pub fn item_is_displayed(&mut self, item: &Item) -> PomResult<bool> {
        self.item_piece(item).is_displayed()
    }

    /// Whether the item's expansion icon carries the expanded class
    pub fn item_is_expanded(&mut self, item: &Item) -> PomResult<bool> {
        let class = self
            .expansion_icon(item)
            .read_if_present(|d, e| d.attribute(e, "class"))?
            .flatten();
        Ok(class.is_some_and(|c| c.contains(EXPANDED_ICON_CLASS)))
    }

    /// Whether the item shows an expansion icon
    pub fn expansion_icon_is_displayed(&mut self, item: &Item) -> PomResult<bool> {
        let icon = self.expansion_icon(item).clone();
        glyph_is_displayed(&icon, EXPANSION_GLYPH_TIMEOUT)
    }

    /// Whether the item shows its folder/leaf icon
    pub fn node_icon_is_displayed(&mut self, item: &Item) -> PomResult<bool> {
        let icon = self.node_icon(item).clone();
        glyph_is_displayed(&icon, Duration::ZERO)
    }

    /// Fill color of the node icon, in whatever format the browser reports
    pub fn fill_color_of_icon(&mut self, item: &Item) -> PomResult<String> {
        self.node_icon(item).get_css_property("fill")
    }

    /// Fill color of the expansion icon
    pub fn fill_color_of_expansion_icon(&mut self, item: &Item) -> PomResult<String> {
        self.expansion_icon(item).get_css_property("fill")
    }

    /// Slash-delimited path of the node icon, such as `material/folder`
    pub fn path_of_node_icon(&mut self, item: &Item) -> PomResult<String> {
        let icon = self.node_icon(item).clone();
        icon_path(&icon)
    }

    /// Slash-delimited path of the expansion icon
    pub fn path_of_expansion_icon(&mut self, item: &Item) -> PomResult<String> {
        let icon = self.expansion_icon(item).clone();
        icon_path(&icon)
    }

    /// Text of every top-level row; empty when there are none
    pub fn text_of_top_level_items(&self) -> PomResult<Vec<String>> {
        texts_of(&self.top_level_items, None)
    }

    /// Text of every rendered item; empty when none appear within `timeout`
    pub fn text_of_all_items(&self, timeout: Option<Duration>) -> PomResult<Vec<String>> {
        texts_of(&self.tree_items, timeout)
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    /// Click the item's label
    pub fn click_item(&mut self, item: &Item, wait_after: Duration) -> PomResult<()> {
        self.label_piece(item).click(None, wait_after)
    }

    /// Click the item's expansion icon regardless of its state
    pub fn click_expansion_icon(&mut self, item: &Item, wait_after: Duration) -> PomResult<()> {
        self.expansion_icon(item).click(None, wait_after)
    }

    fn ensure_expanded(&mut self, item: &Item) -> PomResult<()> {
        if self.item_is_expanded(item)? {
            return Ok(());
        }
        debug!(path = %item, "expanding");
        let settle = self.expansion_settle;
        self.expansion_icon(item).click(None, settle)
    }

    /// Expand every ancestor of `item` until it is displayed.
    ///
    /// Any transient failure restarts the walk from the root after the
    /// policy's delay. Running out of attempts yields
    /// [`PomError::ExpansionFailed`] wrapping the last failure. The item
    /// itself is not clicked.
    pub fn expand_to_item(&mut self, item: &Item, policy: Option<RetryPolicy>) -> PomResult<()> {
        let policy = policy.unwrap_or(self.expand_policy);
        let outcome = retry_with_backoff(&policy, |attempt| {
            if attempt > 1 {
                info!(path = %item, attempt, "restarting ancestor walk");
            }
            for ancestor in item.ancestry() {
                self.ensure_expanded(ancestor)?;
            }
            if self.item_is_displayed(item)? {
                Ok(())
            } else {
                Err(PomError::ElementNotFound {
                    dialect: "CSS",
                    locator: item.locator().value.clone(),
                    description: Some(format!("tree item {item} not displayed after expansion")),
                })
            }
        });
        outcome.map_err(|err| {
            if err.is_transient() {
                PomError::ExpansionFailed {
                    path: item.path().to_string(),
                    attempts: policy.max_attempts.max(1),
                    source: Some(Box::new(err)),
                }
            } else {
                err
            }
        })
    }

    /// Expand or collapse `item`, expanding its ancestry first
    pub fn set_expansion_state(&mut self, item: &Item, expanded: bool) -> PomResult<()> {
        self.expand_to_item(item, None)?;
        if self.item_is_expanded(item)? == expanded {
            return Ok(());
        }
        let settle = self.expansion_settle;
        self.expansion_icon(item)
            .click(None, settle)
            .map_err(|err| match err {
                PomError::ElementNotFound {
                    dialect, locator, ..
                } => PomError::ElementNotFound {
                    dialect,
                    locator,
                    description: Some(format!(
                        "node {item} has no expand/collapse icon, so it cannot be toggled"
                    )),
                },
                other => other,
            })
    }

    /// Expand to `item` and click it
    pub fn select_item(
        &mut self,
        item: &Item,
        timeout: Option<Duration>,
        wait_after: Duration,
    ) -> PomResult<()> {
        self.expand_to_item(item, None)?;
        self.item_piece(item).click(timeout, wait_after)
    }

    /// Select several items in one modifier-held gesture.
    ///
    /// Every item is resolved before any input is sent. `inclusive` holds
    /// Shift for a range selection; otherwise the platform's discrete
    /// selection modifier is held. Earlier selections may be lost.
    pub fn multi_select(
        &mut self,
        items: &[Item],
        inclusive: bool,
        timeout: Option<Duration>,
    ) -> PomResult<()> {
        let elements = items
            .iter()
            .map(|item| self.item_piece(item).find(timeout))
            .collect::<PomResult<Vec<ElementRef>>>()?;

        let modifier = if inclusive {
            Key::Shift
        } else {
            Key::platform_modifier()
        };
        let mut chain = Vec::with_capacity(elements.len() * 2 + 2);
        chain.push(Action::KeyDown(modifier));
        for element in elements {
            chain.push(Action::Click(element));
            chain.push(Action::Pause(self.selection_pause));
        }
        chain.push(Action::KeyUp(modifier));

        self.piece.driver().perform(&chain)?;
        wait_some_time(self.selection_pause);
        Ok(())
    }
}

fn glyph_is_displayed(icon: &ComponentPiece, timeout: Duration) -> PomResult<bool> {
    let glyph = icon.child(Locator::css(GLYPH_SELECTOR));
    match glyph.find(Some(timeout)) {
        Ok(_) => glyph.is_displayed(),
        Err(PomError::ElementNotFound { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// The icon's `data-icon` name, else the library and fragment of its `<use>`
/// reference, else the outline of an inline `<path>`
fn icon_path(icon: &ComponentPiece) -> PomResult<String> {
    if let Some(name) = icon.get_attribute(ICON_NAME_ATTRIBUTE)? {
        if !name.is_empty() {
            return Ok(name);
        }
    }
    let reference = icon
        .child(Locator::css(ICON_USE_SELECTOR))
        .read_if_present(|d, e| match d.attribute(e, "href")? {
            Some(href) => Ok(Some(href)),
            None => d.attribute(e, "xlink:href"),
        })?
        .flatten();
    if let Some(path) = reference.as_deref().and_then(icon_path_from_href) {
        return Ok(path);
    }
    // inline svgs carry their outline directly
    icon.child(Locator::css(ICON_PATH_SELECTOR))
        .read_if_present(|d, e| d.attribute(e, "d"))?
        .flatten()
        .filter(|outline| !outline.is_empty())
        .ok_or_else(|| {
            PomError::contract(format!(
                "icon {} does not name the svg it renders",
                icon.css_locator().map(|l| l.value).unwrap_or_default()
            ))
        })
}

/// `/icons/material.svg#folder` becomes `material/folder`
fn icon_path_from_href(href: &str) -> Option<String> {
    let (file, name) = href.rsplit_once('#')?;
    if name.is_empty() {
        return None;
    }
    let library = file.rsplit('/').next().unwrap_or_default();
    let library = library.strip_suffix(".svg").unwrap_or(library);
    Some(if library.is_empty() {
        name.to_string()
    } else {
        format!("{library}/{name}")
    })
}

fn texts_of(piece: &ComponentPiece, timeout: Option<Duration>) -> PomResult<Vec<String>> {
    retry_on_stale(|| {
        let elements = match piece.find_all(timeout) {
            Ok(found) => found,
            Err(PomError::ElementNotFound { .. }) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        elements.iter().map(|e| piece.driver().text(e)).collect()
    })
}

// =============================================================================
// PERSPECTIVE TREE
// =============================================================================

/// Tree component with a quality overlay
#[derive(Debug, Clone)]
pub struct PerspectiveTree {
    tree: Tree,
    overlay: QualityOverlay,
    raise_on_overlay: bool,
}

impl Component for PerspectiveTree {
    fn assemble(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        Self::new(locator, parent, settings)
    }
}

impl PerspectiveTree {
    /// Create a tree component that ignores overlays on lookup
    #[must_use]
    pub fn new(locator: Locator, parent: &LocatorChain, settings: PieceSettings) -> Self {
        let tree = Tree::new(locator, parent, settings);
        let overlay = QualityOverlay::new(tree.piece().chain(), tree.piece().settings());
        Self {
            tree,
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

    /// Tree capability
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable tree capability, for the caching operations
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Overlay capability
    #[must_use]
    pub const fn overlay(&self) -> &QualityOverlay {
        &self.overlay
    }

    /// Resolve the tree, then check for an overlay when configured to
    pub fn find(&self, timeout: Option<Duration>) -> PomResult<ElementRef> {
        let piece = self.tree.piece();
        let element = piece.find(timeout)?;
        if self.raise_on_overlay && self.overlay.is_displayed()? {
            return Err(PomError::QualityOverlayPresent {
                locator: piece.css_locator()?.value,
            });
        }
        Ok(element)
    }

    /// Right-click the first top-level row, or the tree itself when it is empty
    pub fn right_click(&self, wait_after: Duration) -> PomResult<()> {
        let piece = self.tree.piece();
        let first_row = piece.child_with(
            Locator::css(FIRST_ROW_SELECTOR),
            piece.settings().clone().with_timeout(FIRST_ROW_TIMEOUT),
        );
        match first_row.find(None) {
            Ok(_) => first_row.right_click(wait_after),
            Err(PomError::ElementNotFound { .. }) => piece.right_click(wait_after),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::{ClickEffect, MockDriver, MockElement};

    fn node(label: &str) -> String {
        format!("[class*=\"-node\"][data-label=\"{label}\"]")
    }

    mod item_tests {
        use super::*;

        fn family() -> Item {
            let grandparent = Arc::new(Item::new("Grandparent", None));
            let parent = Arc::new(Item::new("Parent", Some(grandparent)));
            Item::new("Child", Some(parent))
        }

        #[test]
        fn test_ancestry_and_path() {
            let child = family();
            let labels: Vec<&str> = child.ancestry().iter().map(|a| a.label()).collect();
            assert_eq!(labels, vec!["Grandparent", "Parent"]);
            assert_eq!(child.path(), "Grandparent/Parent/Child");
            assert_eq!(child.to_string(), "Grandparent/Parent/Child");
            assert_eq!(child.parent().unwrap().label(), "Parent");
        }

        #[test]
        fn test_locator() {
            let child = family();
            assert_eq!(
                child.locator().value,
                format!(
                    "{} {} {} .tree-item[data-label=\"Child\"]",
                    node("Grandparent"),
                    node("Parent"),
                    node("Child")
                )
            );
        }

        #[test]
        fn test_empty_label_parent_ends_ancestry() {
            let root = Arc::new(Item::new("", None));
            let child = Item::new("Child", Some(root));
            assert!(child.ancestry().is_empty());
            assert_eq!(child.path(), "Child");

            let above = Arc::new(Item::new("Hidden", None));
            let sentinel = Arc::new(Item::new("", Some(above)));
            let leaf = Item::new("Leaf", Some(Arc::new(Item::new("Top", Some(sentinel)))));
            assert_eq!(leaf.path(), "Top/Leaf");
        }

        #[test]
        fn test_value_equality() {
            assert_eq!(family(), family());
            assert_ne!(family(), Item::new("Child", None));
        }

        #[test]
        fn test_from_path() {
            let item = Item::from_path("/Grandparent//Parent/Child/").unwrap();
            assert_eq!(item, family());
            assert!(matches!(
                Item::from_path("//"),
                Err(PomError::ContractViolation { .. })
            ));
        }

        #[test]
        fn test_index_path_and_escaping() {
            let item = Item::new("say \"hi\"", None).with_index_path("0/3");
            assert_eq!(item.index_path(), Some("0/3"));
            assert!(item.locator().value.ends_with(".tree-item[data-label=\"say \\\"hi\\\"\"]"));
        }
    }

    mod tree_tests {
        use super::*;

        const TREE: &str = "div.tree";

        struct Fixture {
            driver: Arc<MockDriver>,
            tree: Tree,
        }

        fn fixture() -> Fixture {
            let driver = Arc::new(MockDriver::new());
            let settings = PieceSettings::new(driver.clone())
                .with_timeout(Duration::from_millis(60))
                .with_poll_interval(Duration::from_millis(10));
            let tree = Tree::new(Locator::css(TREE), &LocatorChain::new(), settings)
                .with_expand_policy(RetryPolicy::new(2, Duration::ZERO))
                .with_expansion_settle(Duration::ZERO)
                .with_selection_pause(Duration::ZERO);
            Fixture { driver, tree }
        }

        fn selector(item: &Item) -> String {
            format!("{TREE} {}", item.locator().value)
        }

        fn icon_selector(item: &Item) -> String {
            format!("{} {EXPANSION_ICON_SELECTOR}", selector(item))
        }

        /// Register an item row and its collapsed expansion icon; clicking
        /// the icon marks it expanded and reveals `reveals`
        fn expandable(
            driver: &MockDriver,
            item: &Item,
            row: MockElement,
            reveals: &[ElementRef],
        ) -> (ElementRef, ElementRef) {
            let row = driver.add_element(selector(item), row);
            let icon = driver.add_element(
                icon_selector(item),
                MockElement::new().with_attribute("class", "expand-icon"),
            );
            driver.on_click(
                &icon,
                ClickEffect::SetAttribute {
                    element: icon.clone(),
                    name: "class".into(),
                    value: format!("expand-icon {EXPANDED_ICON_CLASS}"),
                },
            );
            for target in reveals {
                driver.on_click(&icon, ClickEffect::Reveal(target.clone()));
            }
            (row, icon)
        }

        #[test]
        fn test_expand_to_item_walks_ancestry() {
            let Fixture { driver, mut tree } = fixture();
            let a = Arc::new(Item::new("A", None));
            let b = Arc::new(Item::new("B", Some(a.clone())));
            let c = Item::new("C", Some(b.clone()));

            let c_row = driver.add_element(selector(&c), MockElement::new().absent());
            let (b_row, b_icon) = expandable(&driver, &b, MockElement::new().absent(), &[c_row]);
            let (_, a_icon) = expandable(&driver, &a, MockElement::new(), &[b_row]);

            assert!(!tree.item_is_displayed(&c).unwrap());
            tree.expand_to_item(&c, None).unwrap();
            assert_eq!(driver.clicks(), vec![a_icon, b_icon]);
            assert!(tree.item_is_expanded(&a).unwrap());
            assert!(tree.item_is_expanded(&b).unwrap());
            assert!(tree.item_is_displayed(&c).unwrap());

            tree.expand_to_item(&c, None).unwrap();
            assert_eq!(driver.clicks().len(), 2);
        }

        #[test]
        fn test_expand_to_item_restarts_walk() {
            let Fixture { driver, mut tree } = fixture();
            let a = Arc::new(Item::new("A", None));
            let b = Item::new("B", Some(a.clone()));
            expandable(&driver, &a, MockElement::new(), &[]);
            driver.add_element(selector(&b), MockElement::new().appear_after(1));
            tree.expand_to_item(&b, None).unwrap();
            assert_eq!(driver.clicks().len(), 1);
        }

        #[test]
        fn test_expand_to_item_exhausts_attempts() {
            let Fixture { driver, mut tree } = fixture();
            let a = Arc::new(Item::new("A", None));
            let b = Item::new("B", Some(a.clone()));
            expandable(&driver, &a, MockElement::new(), &[]);
            let err = tree
                .expand_to_item(&b, Some(RetryPolicy::new(3, Duration::ZERO)))
                .unwrap_err();
            match err {
                PomError::ExpansionFailed {
                    path,
                    attempts,
                    source,
                } => {
                    assert_eq!(path, "A/B");
                    assert_eq!(attempts, 3);
                    assert!(matches!(
                        source.as_deref(),
                        Some(PomError::ElementNotFound { .. })
                    ));
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(driver.lookup_count(&selector(&b)), 3);
        }

        #[test]
        fn test_set_expansion_state() {
            let Fixture { driver, mut tree } = fixture();
            let a = Item::new("A", None);
            let (_, icon) = expandable(&driver, &a, MockElement::new(), &[]);
            tree.set_expansion_state(&a, true).unwrap();
            tree.set_expansion_state(&a, true).unwrap();
            assert_eq!(driver.clicks(), vec![icon]);

            let leaf = Item::new("Leaf", None);
            driver.add_element(selector(&leaf), MockElement::new());
            let err = tree.set_expansion_state(&leaf, true).unwrap_err();
            assert!(matches!(err, PomError::ElementNotFound { description: Some(d), .. } if d.contains("Leaf")));
        }

        #[test]
        fn test_click_item_and_select() {
            let Fixture { driver, mut tree } = fixture();
            let a = Item::new("A", None);
            let row = driver.add_element(selector(&a), MockElement::new());
            let label = driver.add_element(
                format!("{} {LABEL_SELECTOR}", selector(&a)),
                MockElement::new(),
            );
            tree.click_item(&a, Duration::ZERO).unwrap();
            tree.select_item(&a, None, Duration::ZERO).unwrap();
            assert_eq!(driver.clicks(), vec![label, row]);
        }

        #[test]
        fn test_icons() {
            let Fixture { driver, mut tree } = fixture();
            let a = Item::new("A", None);
            driver.add_element(selector(&a), MockElement::new());
            driver.add_element(
                format!("{} {NODE_ICON_SELECTOR}", selector(&a)),
                MockElement::new().with_css("fill", "rgb(0, 0, 0)"),
            );
            driver.add_element(
                format!("{} {NODE_ICON_SELECTOR} g", selector(&a)),
                MockElement::new(),
            );
            driver.add_element(
                icon_selector(&a),
                MockElement::new().with_css("fill", "#fff"),
            );
            assert!(tree.node_icon_is_displayed(&a).unwrap());
            assert!(!tree.expansion_icon_is_displayed(&a).unwrap());
            assert_eq!(tree.fill_color_of_icon(&a).unwrap(), "rgb(0, 0, 0)");
            assert_eq!(tree.fill_color_of_expansion_icon(&a).unwrap(), "#fff");
            assert!(!tree.item_is_expanded(&a).unwrap());
        }

        #[test]
        fn test_icon_paths() {
            let Fixture { driver, mut tree } = fixture();
            let a = Item::new("A", None);
            driver.add_element(selector(&a), MockElement::new());
            driver.add_element(
                format!("{} {NODE_ICON_SELECTOR}", selector(&a)),
                MockElement::new().with_attribute(ICON_NAME_ATTRIBUTE, "material/folder"),
            );
            driver.add_element(icon_selector(&a), MockElement::new());
            driver.add_element(
                format!("{} use", icon_selector(&a)),
                MockElement::new().with_attribute("href", "/data/icons/material.svg#chevron_right"),
            );
            assert_eq!(tree.path_of_node_icon(&a).unwrap(), "material/folder");
            assert_eq!(
                tree.path_of_expansion_icon(&a).unwrap(),
                "material/chevron_right"
            );

            let b = Item::new("B", None);
            driver.add_element(icon_selector(&b), MockElement::new());
            driver.add_element(
                format!("{} path", icon_selector(&b)),
                MockElement::new().with_attribute("d", "M10 17l5-5-5-5v10z"),
            );
            assert_eq!(tree.path_of_expansion_icon(&b).unwrap(), "M10 17l5-5-5-5v10z");
        }

        #[test]
        fn test_icon_without_reference() {
            let Fixture { driver, mut tree } = fixture();
            let a = Item::new("A", None);
            driver.add_element(
                format!("{} {NODE_ICON_SELECTOR}", selector(&a)),
                MockElement::new(),
            );
            assert!(matches!(
                tree.path_of_node_icon(&a),
                Err(PomError::ContractViolation { .. })
            ));
            assert!(matches!(
                tree.path_of_expansion_icon(&a),
                Err(PomError::ElementNotFound { .. })
            ));
        }

        #[test]
        fn test_icon_path_from_href() {
            assert_eq!(icon_path_from_href("#folder").as_deref(), Some("folder"));
            assert_eq!(
                icon_path_from_href("icons/custom.svg#tag").as_deref(),
                Some("custom/tag")
            );
            assert_eq!(icon_path_from_href("icons/custom.svg"), None);
            assert_eq!(icon_path_from_href("icons/custom.svg#"), None);
        }

        #[test]
        fn test_texts() {
            let Fixture { driver, tree } = fixture();
            assert!(tree.text_of_top_level_items().unwrap().is_empty());
            assert!(tree.text_of_all_items(Some(Duration::ZERO)).unwrap().is_empty());
            for label in ["One", "Two"] {
                driver.add_element(
                    format!("{TREE} {TOP_LEVEL_SELECTOR}"),
                    MockElement::new().with_text(label),
                );
                driver.add_element(format!("{TREE} .tree-item"), MockElement::new().with_text(label));
            }
            assert_eq!(tree.text_of_top_level_items().unwrap(), vec!["One", "Two"]);
            assert_eq!(tree.text_of_all_items(None).unwrap(), vec!["One", "Two"]);
        }

        #[test]
        fn test_multi_select_single_gesture() {
            let Fixture { driver, mut tree } = fixture();
            let x = Item::new("X", None);
            let y = Item::new("Y", None);
            let ex = driver.add_element(selector(&x), MockElement::new());
            let ey = driver.add_element(selector(&y), MockElement::new());

            tree.multi_select(&[y.clone(), x.clone()], true, None).unwrap();
            assert_eq!(
                driver.performed(),
                vec![vec![
                    Action::KeyDown(Key::Shift),
                    Action::Click(ey),
                    Action::Pause(Duration::ZERO),
                    Action::Click(ex),
                    Action::Pause(Duration::ZERO),
                    Action::KeyUp(Key::Shift),
                ]]
            );

            tree.multi_select(&[x], false, None).unwrap();
            let discrete = &driver.performed()[1];
            assert_eq!(discrete[0], Action::KeyDown(Key::platform_modifier()));
            assert_eq!(discrete[3], Action::KeyUp(Key::platform_modifier()));
        }

        #[test]
        fn test_multi_select_fails_before_input() {
            let Fixture { driver, mut tree } = fixture();
            let x = Item::new("X", None);
            driver.add_element(selector(&x), MockElement::new());
            let err = tree
                .multi_select(&[x, Item::new("Missing", None)], true, Some(Duration::ZERO))
                .unwrap_err();
            assert!(matches!(err, PomError::ElementNotFound { .. }));
            assert!(driver.performed().is_empty());
        }
    }

    mod perspective_tree_tests {
        use super::*;

        fn perspective_tree() -> (Arc<MockDriver>, PerspectiveTree) {
            let driver = Arc::new(MockDriver::new());
            let settings = PieceSettings::new(driver.clone())
                .with_timeout(Duration::from_millis(50))
                .with_poll_interval(Duration::from_millis(10));
            let tree = PerspectiveTree::new(Locator::css("#T"), &LocatorChain::new(), settings);
            (driver, tree)
        }

        #[test]
        fn test_right_click_targets_first_row() {
            let (driver, tree) = perspective_tree();
            driver.add_element("#T", MockElement::new());
            let row = driver.add_element("#T div[data-item-path=\"0\"]", MockElement::new());
            tree.right_click(Duration::ZERO).unwrap();
            assert_eq!(driver.performed()[0][1], Action::ContextClick(row));
        }

        #[test]
        fn test_right_click_falls_back_to_tree() {
            let (driver, tree) = perspective_tree();
            let whole = driver.add_element("#T", MockElement::new());
            tree.right_click(Duration::ZERO).unwrap();
            assert_eq!(driver.performed()[0][1], Action::ContextClick(whole));
        }

        #[test]
        fn test_overlay_checked_find() {
            let (driver, tree) = perspective_tree();
            driver.add_element("#T", MockElement::new());
            driver.add_element("#T div.cfo-parent", MockElement::new());
            assert!(tree.find(None).is_ok());
            assert!(tree.overlay().is_displayed().unwrap());
            let strict = tree.with_raise_on_overlay(true);
            assert!(matches!(
                strict.find(None),
                Err(PomError::QualityOverlayPresent { locator }) if locator == "#T"
            ));
        }
    }
}
