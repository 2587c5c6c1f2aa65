//! Workspace forest: the pane tree of one connection
//!
//! The forest stores every pane in a flat map and keeps the tree shape
//! through child IDs in split panes. Structural mutations patch exactly one
//! parent reference, found by scanning the split panes; the tree invariant
//! guarantees at most one split refers to any pane.
//!
//! # Example
//!
//! ```
//! use panegrid_core::layout::{SplitDirection, WorkspaceForest};
//!
//! let mut forest = WorkspaceForest::new();
//! let root = forest.root_id();
//!
//! let outcome = forest.split_pane(root, SplitDirection::Horizontal, None).unwrap();
//! assert_eq!(forest.leaf_panes().len(), 2);
//! assert_eq!(forest.root_id(), outcome.split_id);
//!
//! forest.close_pane(outcome.new_pane_id).unwrap();
//! assert_eq!(forest.root_id(), root);
//! ```

use std::collections::{HashMap, HashSet};

use super::error::{InvariantViolation, LayoutError};
use super::tree::{
    LeafPane, MAX_SPLIT_RATIO, MIN_SPLIT_RATIO, PaneNode, SplitPane, Tab, clamp_ratio,
};
use super::types::{PaneId, SplitDirection, TabId};
use crate::registry::LifecycleEvent;

/// IDs produced by [`WorkspaceForest::split_pane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// The split pane that took the old pane's place.
    pub split_id: PaneId,
    /// The new leaf, the split's second child.
    pub new_pane_id: PaneId,
}

/// The pane tree of one workspace.
///
/// Always holds at least one pane. `active_pane` normally names a leaf;
/// [`active_pane`](Self::active_pane) returns `None` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceForest {
    pub(super) root: PaneId,
    pub(super) panes: HashMap<PaneId, PaneNode>,
    pub(super) active_pane: PaneId,
    /// Registry callbacks recorded by mutations, drained by the manager.
    pub(super) events: Vec<LifecycleEvent>,
}

impl WorkspaceForest {
    /// Creates a forest with a single empty leaf as root.
    #[must_use]
    pub fn new() -> Self {
        let leaf = LeafPane::new();
        let id = leaf.id;
        let mut panes = HashMap::new();
        panes.insert(id, PaneNode::Leaf(leaf));
        Self {
            root: id,
            panes,
            active_pane: id,
            events: Vec::new(),
        }
    }

    /// Builds a forest from stored parts, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn from_parts(
        root: PaneId,
        panes: HashMap<PaneId, PaneNode>,
        active_pane: PaneId,
    ) -> Result<Self, InvariantViolation> {
        let forest = Self::from_parts_unchecked(root, panes, active_pane);
        forest.validate()?;
        Ok(forest)
    }

    /// Builds a forest without validation. Callers guarantee the invariants.
    pub(crate) fn from_parts_unchecked(
        root: PaneId,
        panes: HashMap<PaneId, PaneNode>,
        active_pane: PaneId,
    ) -> Self {
        Self {
            root,
            panes,
            active_pane,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Readers
    // ========================================================================

    /// Returns the root pane ID.
    #[must_use]
    pub const fn root_id(&self) -> PaneId {
        self.root
    }

    /// Returns the root pane.
    #[must_use]
    pub fn root_pane(&self) -> Option<&PaneNode> {
        self.panes.get(&self.root)
    }

    /// Returns the stored active pane ID, which may not resolve to a leaf.
    #[must_use]
    pub const fn active_pane_id(&self) -> PaneId {
        self.active_pane
    }

    /// Returns the active pane if it currently resolves to a leaf.
    #[must_use]
    pub fn active_pane(&self) -> Option<&LeafPane> {
        self.leaf(self.active_pane)
    }

    /// Returns any pane by ID.
    #[must_use]
    pub fn pane(&self, pane_id: PaneId) -> Option<&PaneNode> {
        self.panes.get(&pane_id)
    }

    /// Returns a leaf pane by ID.
    #[must_use]
    pub fn leaf(&self, pane_id: PaneId) -> Option<&LeafPane> {
        self.panes.get(&pane_id).and_then(PaneNode::as_leaf)
    }

    /// Returns a split pane by ID.
    #[must_use]
    pub fn split(&self, pane_id: PaneId) -> Option<&SplitPane> {
        self.panes.get(&pane_id).and_then(PaneNode::as_split)
    }

    /// Returns the pane map.
    #[must_use]
    pub const fn panes(&self) -> &HashMap<PaneId, PaneNode> {
        &self.panes
    }

    /// Returns the number of panes, leaves and splits together.
    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Returns the total number of tabs across all leaves.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.panes
            .values()
            .filter_map(PaneNode::as_leaf)
            .map(|leaf| leaf.tabs.len())
            .sum()
    }

    /// Returns all leaf panes, depth-first from the root, first child first.
    #[must_use]
    pub fn leaf_panes(&self) -> Vec<&LeafPane> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.panes.get(&id) {
                Some(PaneNode::Leaf(leaf)) => leaves.push(leaf),
                Some(PaneNode::Split(split)) => {
                    stack.push(split.second);
                    stack.push(split.first);
                }
                None => {}
            }
        }
        leaves
    }

    /// Returns the IDs of all leaf panes in [`leaf_panes`](Self::leaf_panes) order.
    #[must_use]
    pub fn leaf_ids(&self) -> Vec<PaneId> {
        self.leaf_panes().iter().map(|leaf| leaf.id).collect()
    }

    /// Returns the split that refers to `pane_id`, if any.
    #[must_use]
    pub fn parent_of(&self, pane_id: PaneId) -> Option<PaneId> {
        self.panes
            .values()
            .filter_map(PaneNode::as_split)
            .find(|split| split.has_child(pane_id))
            .map(|split| split.id)
    }

    /// Returns the leftmost/topmost leaf under `pane_id`.
    #[must_use]
    pub fn first_leaf(&self, pane_id: PaneId) -> Option<PaneId> {
        let mut current = pane_id;
        // Bounded by the pane count so a malformed map cannot loop forever.
        for _ in 0..=self.panes.len() {
            match self.panes.get(&current)? {
                PaneNode::Leaf(leaf) => return Some(leaf.id),
                PaneNode::Split(split) => current = split.first,
            }
        }
        None
    }

    /// Finds a tab anywhere in the workspace.
    #[must_use]
    pub fn find_tab(&self, tab_id: TabId) -> Option<(PaneId, &Tab)> {
        self.leaf_panes()
            .into_iter()
            .find_map(|leaf| leaf.tab(tab_id).map(|tab| (leaf.id, tab)))
    }

    // ========================================================================
    // Structural mutations
    // ========================================================================

    /// Splits a leaf pane in two.
    ///
    /// The new split takes the leaf's place in the tree, with the old leaf
    /// as `first` and a new leaf as `second`. When `moved_tab` is given,
    /// that tab moves into the new leaf, becomes its active tab, and the
    /// new leaf becomes the active pane.
    ///
    /// # Errors
    ///
    /// - `PaneNotFound` / `NotALeaf` if `pane_id` is not a leaf
    /// - `TabNotFound` if `moved_tab` is not in the pane
    /// - `WouldEmptyPane` if `moved_tab` is the pane's only tab
    pub fn split_pane(
        &mut self,
        pane_id: PaneId,
        direction: SplitDirection,
        moved_tab: Option<TabId>,
    ) -> Result<SplitOutcome, LayoutError> {
        let leaf = self.leaf_or_err(pane_id)?;
        if let Some(tab_id) = moved_tab {
            if !leaf.contains_tab(tab_id) {
                return Err(LayoutError::TabNotFound {
                    pane: pane_id,
                    tab: tab_id,
                });
            }
            if leaf.tabs.len() <= 1 {
                return Err(LayoutError::WouldEmptyPane(pane_id));
            }
        }

        let mut new_leaf = LeafPane::new();
        let new_pane_id = new_leaf.id;
        let split = SplitPane::new(direction, pane_id, new_pane_id);
        let split_id = split.id;

        if let Some(tab_id) = moved_tab
            && let Some(tab) = self.leaf_mut(pane_id).and_then(|l| l.remove_tab(tab_id))
        {
            new_leaf.active_tab_id = Some(tab.id);
            self.events.push(LifecycleEvent::Activated(tab.clone()));
            new_leaf.tabs.push(tab);
        }

        self.replace_in_parent(pane_id, split_id);
        self.panes.insert(new_pane_id, PaneNode::Leaf(new_leaf));
        self.panes.insert(split_id, PaneNode::Split(split));

        if moved_tab.is_some() {
            self.active_pane = new_pane_id;
        }

        Ok(SplitOutcome {
            split_id,
            new_pane_id,
        })
    }

    /// Closes a pane and collapses its parent split.
    ///
    /// The pane (with its whole subtree if it is a split) and its parent
    /// are removed; the sibling takes the parent's place. Tabs discarded
    /// with the pane are reported as closed. Returns the promoted sibling.
    ///
    /// # Errors
    ///
    /// - `PaneNotFound` if the pane does not exist
    /// - `CannotCloseRoot` if the pane is the root
    pub fn close_pane(&mut self, pane_id: PaneId) -> Result<PaneId, LayoutError> {
        if !self.panes.contains_key(&pane_id) {
            return Err(LayoutError::PaneNotFound(pane_id));
        }
        if pane_id == self.root {
            return Err(LayoutError::CannotCloseRoot);
        }
        let parent_id = self
            .parent_of(pane_id)
            .ok_or(LayoutError::PaneNotFound(pane_id))?;
        let sibling = self
            .split(parent_id)
            .and_then(|split| split.sibling_of(pane_id))
            .ok_or(LayoutError::PaneNotFound(pane_id))?;

        for tab in self.remove_subtree(pane_id) {
            self.events.push(LifecycleEvent::Closed(tab));
        }
        self.panes.remove(&parent_id);
        self.replace_in_parent(parent_id, sibling);

        if !self.panes.contains_key(&self.active_pane) {
            self.active_pane = self.first_leaf(sibling).unwrap_or(sibling);
        }

        Ok(sibling)
    }

    /// Sets a split's ratio, clamped to `[0.1, 0.9]`. Returns the stored value.
    ///
    /// # Errors
    ///
    /// - `InvalidRatio` for NaN or infinite ratios
    /// - `PaneNotFound` / `NotASplit` if `split_id` is not a split
    pub fn resize_pane(&mut self, split_id: PaneId, ratio: f64) -> Result<f64, LayoutError> {
        if !ratio.is_finite() {
            return Err(LayoutError::InvalidRatio(ratio));
        }
        let split = match self.panes.get_mut(&split_id) {
            Some(PaneNode::Split(split)) => split,
            Some(PaneNode::Leaf(_)) => return Err(LayoutError::NotASplit(split_id)),
            None => return Err(LayoutError::PaneNotFound(split_id)),
        };
        split.ratio = clamp_ratio(ratio);
        Ok(split.ratio)
    }

    /// Makes a leaf the active pane.
    ///
    /// # Errors
    ///
    /// `PaneNotFound` / `NotALeaf` if `pane_id` is not a leaf.
    pub fn set_active_pane(&mut self, pane_id: PaneId) -> Result<(), LayoutError> {
        self.leaf_or_err(pane_id)?;
        self.active_pane = pane_id;
        Ok(())
    }

    /// Drains the lifecycle events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Checks every structural invariant of the forest.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (key, node) in &self.panes {
            if *key != node.id() {
                return Err(InvariantViolation::KeyMismatch {
                    key: *key,
                    id: node.id(),
                });
            }
        }
        if !self.panes.contains_key(&self.root) {
            return Err(InvariantViolation::MissingRoot(self.root));
        }

        let mut parents: HashMap<PaneId, usize> = HashMap::new();
        for split in self.panes.values().filter_map(PaneNode::as_split) {
            for child in split.children() {
                if !self.panes.contains_key(&child) {
                    return Err(InvariantViolation::DanglingChild {
                        parent: split.id,
                        child,
                    });
                }
                *parents.entry(child).or_default() += 1;
            }
            if !(MIN_SPLIT_RATIO..=MAX_SPLIT_RATIO).contains(&split.ratio) {
                return Err(InvariantViolation::RatioOutOfRange {
                    pane: split.id,
                    ratio: split.ratio,
                });
            }
        }
        if parents.contains_key(&self.root) {
            return Err(InvariantViolation::MultipleParents(self.root));
        }
        if let Some((id, _)) = parents.iter().find(|(_, count)| **count > 1) {
            return Err(InvariantViolation::MultipleParents(*id));
        }

        let mut reachable = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                return Err(InvariantViolation::MultipleParents(id));
            }
            if let Some(PaneNode::Split(split)) = self.panes.get(&id) {
                stack.extend(split.children());
            }
        }
        if let Some(id) = self.panes.keys().find(|id| !reachable.contains(id)) {
            return Err(InvariantViolation::Unreachable(*id));
        }

        let mut seen_tabs = HashSet::new();
        for leaf in self.panes.values().filter_map(PaneNode::as_leaf) {
            let consistent = match leaf.active_tab_id {
                None => leaf.tabs.is_empty(),
                Some(id) => leaf.contains_tab(id),
            };
            if !consistent {
                return Err(InvariantViolation::ActiveTabMismatch(leaf.id));
            }
            for tab in &leaf.tabs {
                if !seen_tabs.insert(tab.id) {
                    return Err(InvariantViolation::DuplicateTab(tab.id));
                }
            }
        }

        if self.leaf(self.active_pane).is_none() {
            return Err(InvariantViolation::ActivePaneNotLeaf(self.active_pane));
        }
        Ok(())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    pub(crate) fn leaf_or_err(&self, pane_id: PaneId) -> Result<&LeafPane, LayoutError> {
        match self.panes.get(&pane_id) {
            Some(PaneNode::Leaf(leaf)) => Ok(leaf),
            Some(PaneNode::Split(_)) => Err(LayoutError::NotALeaf(pane_id)),
            None => Err(LayoutError::PaneNotFound(pane_id)),
        }
    }

    pub(crate) fn leaf_mut(&mut self, pane_id: PaneId) -> Option<&mut LeafPane> {
        self.panes.get_mut(&pane_id).and_then(PaneNode::as_leaf_mut)
    }

    /// Points whatever referred to `old` (the root slot or one split) at `new`.
    fn replace_in_parent(&mut self, old: PaneId, new: PaneId) {
        if self.root == old {
            self.root = new;
            return;
        }
        if let Some(split) = self
            .panes
            .values_mut()
            .filter_map(PaneNode::as_split_mut)
            .find(|split| split.has_child(old))
        {
            split.replace_child(old, new);
        }
    }

    /// Removes `pane_id` and every pane below it, returning their tabs.
    fn remove_subtree(&mut self, pane_id: PaneId) -> Vec<Tab> {
        let mut tabs = Vec::new();
        let mut stack = vec![pane_id];
        while let Some(id) = stack.pop() {
            match self.panes.remove(&id) {
                Some(PaneNode::Leaf(leaf)) => tabs.extend(leaf.tabs),
                Some(PaneNode::Split(split)) => stack.extend(split.children()),
                None => {}
            }
        }
        tabs
    }
}

impl Default for WorkspaceForest {
    fn default() -> Self {
        Self::new()
    }
}
