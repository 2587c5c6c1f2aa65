//! Tab lifecycle within leaf panes
//!
//! Creating, closing, updating, reordering and focusing tabs. Registry hooks
//! are recorded as [`LifecycleEvent`]s on the forest and run by the caller
//! after the new state is installed.

use serde_json::Value;

use super::error::LayoutError;
use super::forest::WorkspaceForest;
use super::tree::{LeafPane, PaneNode, Tab};
use super::types::{PaneId, TabId, TabKind};
use crate::registry::{LifecycleEvent, TabRegistry};

/// Options for [`WorkspaceForest::create_tab`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabOptions {
    /// Explicit title; the registry's default title is used when `None`.
    pub title: Option<String>,
    /// Type-specific payload.
    pub payload: Option<Value>,
    /// Metadata, also passed to the registry for the default title.
    pub metadata: Option<Value>,
    /// Whether the tab and its pane become active. `None` means yes.
    pub make_active: Option<bool>,
}

impl TabOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
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

    /// Opens the tab in the background.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.make_active = Some(false);
        self
    }

    fn activates(&self) -> bool {
        self.make_active != Some(false)
    }
}

/// Kind and options of a tab to create.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSeed {
    /// Tab kind.
    pub kind: TabKind,
    /// Creation options.
    pub options: TabOptions,
}

impl TabSeed {
    /// Creates a seed with default options.
    #[must_use]
    pub fn new(kind: impl Into<TabKind>) -> Self {
        Self {
            kind: kind.into(),
            options: TabOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: TabOptions) -> Self {
        self.options = options;
        self
    }
}

/// Partial tab fields for [`WorkspaceForest::update_tab`].
///
/// Present fields replace the tab's values wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabUpdate {
    /// New title.
    pub title: Option<String>,
    /// New payload.
    pub payload: Option<Value>,
    /// New metadata.
    pub metadata: Option<Value>,
}

impl TabUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn apply(self, tab: &mut Tab) {
        if let Some(title) = self.title {
            tab.title = title;
        }
        if let Some(payload) = self.payload {
            tab.payload = Some(payload);
        }
        if let Some(metadata) = self.metadata {
            tab.metadata = Some(metadata);
        }
    }
}

impl WorkspaceForest {
    /// Appends a new tab to a leaf pane.
    ///
    /// The title comes from `options.title` or from the registry, which is
    /// told how many tabs of the same kind the pane already holds. Unless
    /// `make_active` is `Some(false)`, the tab becomes the pane's active tab
    /// and the pane becomes the active pane. A tab added to an empty pane is
    /// always its active tab.
    ///
    /// # Errors
    ///
    /// `PaneNotFound` / `NotALeaf` if `pane_id` is not a leaf.
    pub fn create_tab(
        &mut self,
        pane_id: PaneId,
        kind: TabKind,
        options: TabOptions,
        registry: &dyn TabRegistry,
    ) -> Result<TabId, LayoutError> {
        let leaf = self.leaf_or_err(pane_id)?;
        let activate = options.activates();
        let title = match options.title {
            Some(title) => title,
            None => registry.default_title(
                &kind,
                leaf.count_of_kind(&kind),
                options.metadata.as_ref(),
            ),
        };
        let tab = Tab {
            id: TabId::new(),
            kind,
            title,
            payload: options.payload,
            metadata: options.metadata,
        };
        let tab_id = tab.id;
        let pane_was_empty = leaf.active_tab_id.is_none();

        self.events.push(LifecycleEvent::Created(tab.clone()));
        if let Some(leaf) = self.leaf_mut(pane_id) {
            leaf.tabs.push(tab);
        }
        if activate || pane_was_empty {
            self.activate_tab(pane_id, tab_id);
        }
        if activate {
            self.active_pane = pane_id;
        }
        Ok(tab_id)
    }

    /// Removes a tab from its pane.
    ///
    /// If the pane is left empty it is closed, unless it is the only pane
    /// in the workspace. Returns the removed tab.
    ///
    /// # Errors
    ///
    /// `PaneNotFound` / `NotALeaf` / `TabNotFound` on a referential miss.
    pub fn close_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> Result<Tab, LayoutError> {
        let tab = self
            .leaf_mut_or_err(pane_id)?
            .remove_tab(tab_id)
            .ok_or(LayoutError::TabNotFound {
                pane: pane_id,
                tab: tab_id,
            })?;
        self.events.push(LifecycleEvent::Closed(tab.clone()));

        let now_empty = self.leaf(pane_id).is_some_and(|leaf| leaf.is_empty());
        if now_empty && pane_id != self.root {
            self.close_pane(pane_id)?;
        }
        Ok(tab)
    }

    /// Shallow-merges `update` into a tab.
    ///
    /// # Errors
    ///
    /// `PaneNotFound` / `NotALeaf` / `TabNotFound` on a referential miss.
    pub fn update_tab(
        &mut self,
        pane_id: PaneId,
        tab_id: TabId,
        update: TabUpdate,
    ) -> Result<(), LayoutError> {
        let tab = self
            .leaf_mut_or_err(pane_id)?
            .tab_mut(tab_id)
            .ok_or(LayoutError::TabNotFound {
                pane: pane_id,
                tab: tab_id,
            })?;
        update.apply(tab);
        Ok(())
    }

    /// Moves the tab at `from` to position `to`, keeping the relative order
    /// of every other tab.
    ///
    /// # Errors
    ///
    /// - `InvalidTabIndex` if either index is out of bounds
    /// - `Unchanged` if `from == to`
    pub fn reorder_tabs(
        &mut self,
        pane_id: PaneId,
        from: usize,
        to: usize,
    ) -> Result<(), LayoutError> {
        let leaf = self.leaf_mut_or_err(pane_id)?;
        let len = leaf.tabs.len();
        if let Some(index) = [from, to].into_iter().find(|index| *index >= len) {
            return Err(LayoutError::InvalidTabIndex { index, len });
        }
        if from == to {
            return Err(LayoutError::Unchanged);
        }
        let tab = leaf.tabs.remove(from);
        leaf.tabs.insert(to, tab);
        Ok(())
    }

    /// Focuses a tab: it becomes its pane's active tab and the pane becomes
    /// the active pane.
    ///
    /// # Errors
    ///
    /// `PaneNotFound` / `NotALeaf` / `TabNotFound` on a referential miss.
    pub fn set_active_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> Result<(), LayoutError> {
        if !self.leaf_or_err(pane_id)?.contains_tab(tab_id) {
            return Err(LayoutError::TabNotFound {
                pane: pane_id,
                tab: tab_id,
            });
        }
        self.activate_tab(pane_id, tab_id);
        self.active_pane = pane_id;
        Ok(())
    }

    /// Makes `tab_id` the active tab of `pane_id`, recording the
    /// deactivate/activate pair. Does nothing if it already is active.
    pub(super) fn activate_tab(&mut self, pane_id: PaneId, tab_id: TabId) {
        let Some(leaf) = self.panes.get_mut(&pane_id).and_then(PaneNode::as_leaf_mut) else {
            return;
        };
        if leaf.active_tab_id == Some(tab_id) {
            return;
        }
        let Some(next) = leaf.tab(tab_id).cloned() else {
            return;
        };
        let previous = leaf.active_tab().cloned();
        leaf.active_tab_id = Some(tab_id);

        if let Some(previous) = previous {
            self.events.push(LifecycleEvent::Deactivated(previous));
        }
        self.events.push(LifecycleEvent::Activated(next));
    }

    pub(super) fn leaf_mut_or_err(&mut self, pane_id: PaneId) -> Result<&mut LeafPane, LayoutError> {
        match self.panes.get_mut(&pane_id) {
            Some(PaneNode::Leaf(leaf)) => Ok(leaf),
            Some(PaneNode::Split(_)) => Err(LayoutError::NotALeaf(pane_id)),
            None => Err(LayoutError::PaneNotFound(pane_id)),
        }
    }
}
