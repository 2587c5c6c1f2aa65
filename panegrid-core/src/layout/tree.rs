//! Pane node types for the workspace forest
//!
//! Nodes live in a flat map keyed by [`PaneId`]; split panes refer to their
//! children by ID rather than owning them. Each node is either a leaf pane
//! (an ordered list of tabs) or a split pane (exactly two children).
//!
//! # Tree Structure
//!
//! ```text
//! Split(Horizontal, 0.5)
//! ├── Leaf(A) [query 1, query 2]
//! └── Split(Vertical, 0.3)
//!     ├── Leaf(B) [users]
//!     └── Leaf(C) []
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{PaneId, SplitDirection, TabId, TabKind};

/// Default split ratio (50% of available space to the first child).
pub const DEFAULT_SPLIT_RATIO: f64 = 0.5;

/// Minimum stored split ratio.
pub const MIN_SPLIT_RATIO: f64 = 0.1;

/// Maximum stored split ratio.
pub const MAX_SPLIT_RATIO: f64 = 0.9;

/// Clamps a ratio into `[MIN_SPLIT_RATIO, MAX_SPLIT_RATIO]`.
#[must_use]
pub fn clamp_ratio(ratio: f64) -> f64 {
    ratio.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO)
}

/// An open document inside a leaf pane.
///
/// The engine only looks at `id`, `kind` and `title`; `payload` and
/// `metadata` belong to whoever renders the tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique identifier.
    pub id: TabId,
    /// Tab type, the key into the tab registry.
    #[serde(rename = "type")]
    pub kind: TabKind,
    /// Display title.
    pub title: String,
    /// Type-specific content (query text, table reference, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Free-form metadata used for matching and titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Tab {
    /// Creates a tab with a fresh ID and no payload or metadata.
    #[must_use]
    pub fn new(kind: impl Into<TabKind>, title: impl Into<String>) -> Self {
        Self {
            id: TabId::new(),
            kind: kind.into(),
            title: title.into(),
            payload: None,
            metadata: None,
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A node in the workspace forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaneNode {
    /// A pane holding tabs.
    Leaf(LeafPane),
    /// A pane divided between two children.
    Split(SplitPane),
}

/// A leaf pane: an ordered list of tabs and the active one.
///
/// `active_tab_id` is `None` exactly when `tabs` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafPane {
    /// Unique identifier for this pane.
    pub id: PaneId,
    /// Tabs in display order.
    #[serde(default)]
    pub tabs: Vec<Tab>,
    /// Currently active tab.
    #[serde(default)]
    pub active_tab_id: Option<TabId>,
}

/// A split pane referring to exactly two children by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPane {
    /// Unique identifier for this pane.
    pub id: PaneId,
    /// Split direction.
    pub direction: SplitDirection,
    /// First child (left for horizontal, top for vertical).
    pub first: PaneId,
    /// Second child (right for horizontal, bottom for vertical).
    pub second: PaneId,
    /// Share of space given to the first child.
    pub ratio: f64,
}

impl LeafPane {
    /// Creates a new empty leaf pane with a unique ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(PaneId::new())
    }

    /// Creates a new empty leaf pane with the given ID.
    #[must_use]
    pub fn with_id(id: PaneId) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    /// Returns true if this pane has no tabs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Returns the position of a tab in this pane.
    #[must_use]
    pub fn tab_index(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    /// Returns true if the pane holds the given tab.
    #[must_use]
    pub fn contains_tab(&self, tab_id: TabId) -> bool {
        self.tab_index(tab_id).is_some()
    }

    /// Finds a tab by ID.
    #[must_use]
    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    /// Finds a tab by ID and returns a mutable reference.
    #[must_use]
    pub fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == tab_id)
    }

    /// Returns the active tab, if any.
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.tab(id))
    }

    /// Counts tabs of the given kind.
    #[must_use]
    pub fn count_of_kind(&self, kind: &TabKind) -> usize {
        self.tabs.iter().filter(|t| &t.kind == kind).count()
    }

    /// Removes a tab and re-selects the active tab if needed.
    ///
    /// When the removed tab was active, the tab now at the same index
    /// becomes active, falling back to the first tab, then to none.
    pub fn remove_tab(&mut self, tab_id: TabId) -> Option<Tab> {
        let index = self.tab_index(tab_id)?;
        let tab = self.tabs.remove(index);
        if self.active_tab_id == Some(tab_id) {
            self.active_tab_id = self
                .tabs
                .get(index)
                .or_else(|| self.tabs.first())
                .map(|t| t.id);
        }
        Some(tab)
    }

    /// Re-derives `active_tab_id` after tabs were removed in bulk.
    ///
    /// Keeps the current active tab if it is still present, otherwise
    /// selects the first tab.
    pub fn repair_active_tab(&mut self) {
        let still_present = self
            .active_tab_id
            .is_some_and(|id| self.contains_tab(id));
        if !still_present {
            self.active_tab_id = self.tabs.first().map(|t| t.id);
        }
    }
}

impl Default for LeafPane {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitPane {
    /// Creates a split with the default ratio.
    #[must_use]
    pub fn new(direction: SplitDirection, first: PaneId, second: PaneId) -> Self {
        Self {
            id: PaneId::new(),
            direction,
            first,
            second,
            ratio: DEFAULT_SPLIT_RATIO,
        }
    }

    /// Returns both children in order.
    #[must_use]
    pub const fn children(&self) -> [PaneId; 2] {
        [self.first, self.second]
    }

    /// Returns true if `pane_id` is one of the children.
    #[must_use]
    pub fn has_child(&self, pane_id: PaneId) -> bool {
        self.first == pane_id || self.second == pane_id
    }

    /// Returns the child that is not `pane_id`, if `pane_id` is a child.
    #[must_use]
    pub fn sibling_of(&self, pane_id: PaneId) -> Option<PaneId> {
        if self.first == pane_id {
            Some(self.second)
        } else if self.second == pane_id {
            Some(self.first)
        } else {
            None
        }
    }

    /// Replaces the child reference `old` with `new`.
    ///
    /// Returns `true` if a reference was patched.
    pub fn replace_child(&mut self, old: PaneId, new: PaneId) -> bool {
        if self.first == old {
            self.first = new;
            true
        } else if self.second == old {
            self.second = new;
            true
        } else {
            false
        }
    }

    /// Swaps the first and second children.
    pub fn swap_children(&mut self) {
        std::mem::swap(&mut self.first, &mut self.second);
    }
}

impl PaneNode {
    /// Creates a new empty leaf node.
    #[must_use]
    pub fn new_leaf() -> Self {
        Self::Leaf(LeafPane::new())
    }

    /// Returns the node's ID.
    #[must_use]
    pub const fn id(&self) -> PaneId {
        match self {
            Self::Leaf(leaf) => leaf.id,
            Self::Split(split) => split.id,
        }
    }

    /// Returns true if this is a leaf node.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns true if this is a split node.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        matches!(self, Self::Split(_))
    }

    /// Returns the leaf pane if this is a leaf node.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafPane> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Split(_) => None,
        }
    }

    /// Returns a mutable reference to the leaf pane if this is a leaf node.
    #[must_use]
    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafPane> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Split(_) => None,
        }
    }

    /// Returns the split pane if this is a split node.
    #[must_use]
    pub const fn as_split(&self) -> Option<&SplitPane> {
        match self {
            Self::Leaf(_) => None,
            Self::Split(split) => Some(split),
        }
    }

    /// Returns a mutable reference to the split pane if this is a split node.
    #[must_use]
    pub fn as_split_mut(&mut self) -> Option<&mut SplitPane> {
        match self {
            Self::Leaf(_) => None,
            Self::Split(split) => Some(split),
        }
    }
}
