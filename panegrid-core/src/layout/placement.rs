//! Drag-and-drop placement
//!
//! Turns a drop intent (tab, source pane, target pane, zone) into tree
//! operations. The center zone moves the tab into the target pane; an edge
//! zone first splits the target so an empty pane opens on that side, then
//! moves the tab into it.

use super::error::LayoutError;
use super::forest::WorkspaceForest;
use super::tree::PaneNode;
use super::types::{DropZone, PaneId, TabId};

impl WorkspaceForest {
    /// Moves a tab to a drop zone of a target pane and returns the pane
    /// that now holds the tab.
    ///
    /// Source panes left empty are closed, except the sole remaining pane.
    /// The gesture is all or nothing.
    ///
    /// # Errors
    ///
    /// - `PaneNotFound` / `NotALeaf` if either pane is not a leaf
    /// - `TabNotFound` if the tab is not in `from_pane`
    /// - `SamePane` for a center drop onto the source pane
    /// - `NothingToSplit` for an edge drop of a pane's only tab onto itself
    pub fn move_tab(
        &mut self,
        from_pane: PaneId,
        tab_id: TabId,
        to_pane: PaneId,
        zone: DropZone,
    ) -> Result<PaneId, LayoutError> {
        let source = self.leaf_or_err(from_pane)?;
        if !source.contains_tab(tab_id) {
            return Err(LayoutError::TabNotFound {
                pane: from_pane,
                tab: tab_id,
            });
        }
        let source_len = source.tabs.len();
        self.leaf_or_err(to_pane)?;

        let Some(direction) = zone.split_direction() else {
            if from_pane == to_pane {
                return Err(LayoutError::SamePane(to_pane));
            }
            self.transfer_tab(from_pane, tab_id, to_pane)?;
            return Ok(to_pane);
        };

        if from_pane == to_pane && source_len == 1 {
            return Err(LayoutError::NothingToSplit(to_pane));
        }
        let outcome = self.split_pane(to_pane, direction, None)?;
        if zone.places_first()
            && let Some(split) = self
                .panes
                .get_mut(&outcome.split_id)
                .and_then(PaneNode::as_split_mut)
        {
            split.swap_children();
        }
        self.transfer_tab(from_pane, tab_id, outcome.new_pane_id)?;
        Ok(outcome.new_pane_id)
    }

    /// Moves a tab between two distinct leaves, activates it in the target
    /// and collapses the source if it emptied.
    fn transfer_tab(
        &mut self,
        from_pane: PaneId,
        tab_id: TabId,
        to_pane: PaneId,
    ) -> Result<(), LayoutError> {
        let tab = self
            .leaf_mut_or_err(from_pane)?
            .remove_tab(tab_id)
            .ok_or(LayoutError::TabNotFound {
                pane: from_pane,
                tab: tab_id,
            })?;
        self.leaf_mut_or_err(to_pane)?.tabs.push(tab);
        self.activate_tab(to_pane, tab_id);
        self.active_pane = to_pane;

        let source_empty = self.leaf(from_pane).is_some_and(|leaf| leaf.is_empty());
        if source_empty && from_pane != self.root {
            self.close_pane(from_pane)?;
        }
        Ok(())
    }
}
