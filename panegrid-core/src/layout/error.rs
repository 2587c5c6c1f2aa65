//! Error types for layout operations
//!
//! Every mutating operation returns `Result<_, LayoutError>`. An `Err`
//! always means the forest was left exactly as it was, so callers that do
//! not care why a gesture was rejected may simply ignore it.

use super::types::{ConnectionId, PaneId, TabId};

/// Reasons a layout operation was not applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// No workspace exists for the connection.
    #[error("no workspace for connection: {0}")]
    WorkspaceNotFound(ConnectionId),

    /// The pane does not exist in the workspace.
    #[error("pane not found: {0}")]
    PaneNotFound(PaneId),

    /// The tab does not exist in the pane.
    #[error("tab {tab} not found in {pane}")]
    TabNotFound {
        /// Pane that was searched.
        pane: PaneId,
        /// Tab that was requested.
        tab: TabId,
    },

    /// The operation needs a leaf pane but got a split.
    #[error("pane is not a leaf: {0}")]
    NotALeaf(PaneId),

    /// The operation needs a split pane but got a leaf.
    #[error("pane is not a split: {0}")]
    NotASplit(PaneId),

    /// The root pane cannot be closed; a workspace keeps at least one pane.
    #[error("cannot close the root pane")]
    CannotCloseRoot,

    /// Moving the tab out would leave the pane without tabs.
    #[error("moving the tab would leave {0} empty")]
    WouldEmptyPane(PaneId),

    /// Source and target of a center drop are the same pane.
    #[error("tab is already in {0}")]
    SamePane(PaneId),

    /// Edge drop of a pane's only tab onto itself.
    #[error("nothing to split against in {0}")]
    NothingToSplit(PaneId),

    /// A tab index is outside the pane's tab list.
    #[error("tab index {index} out of bounds (len {len})")]
    InvalidTabIndex {
        /// Offending index.
        index: usize,
        /// Number of tabs in the pane.
        len: usize,
    },

    /// Reordering a tab onto its own position.
    #[error("tab order unchanged")]
    Unchanged,

    /// Split ratio is NaN or infinite.
    #[error("invalid split ratio: {0}")]
    InvalidRatio(f64),
}

impl LayoutError {
    /// Returns true if the operation targeted an ID that no longer exists.
    #[must_use]
    pub const fn is_referential_miss(&self) -> bool {
        matches!(
            self,
            Self::WorkspaceNotFound(_) | Self::PaneNotFound(_) | Self::TabNotFound { .. }
        )
    }

    /// Returns true if the operation was refused to protect an invariant.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !self.is_referential_miss()
    }
}

/// Broken structural invariants found by
/// [`WorkspaceForest::validate`](super::WorkspaceForest::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// The root ID is not in the pane map.
    #[error("root pane {0} is missing")]
    MissingRoot(PaneId),

    /// A map entry is stored under a key different from its own ID.
    #[error("pane stored under key {key} has id {id}")]
    KeyMismatch {
        /// Map key.
        key: PaneId,
        /// ID inside the node.
        id: PaneId,
    },

    /// A split refers to a child that is not in the map.
    #[error("split {parent} refers to missing child {child}")]
    DanglingChild {
        /// Split holding the reference.
        parent: PaneId,
        /// Missing child.
        child: PaneId,
    },

    /// A pane is referenced by more than one split, or the root is referenced.
    #[error("pane {0} has more than one parent")]
    MultipleParents(PaneId),

    /// A pane in the map cannot be reached from the root.
    #[error("pane {0} is unreachable from the root")]
    Unreachable(PaneId),

    /// A leaf's active tab does not match its tab list.
    #[error("leaf {0} has an inconsistent active tab")]
    ActiveTabMismatch(PaneId),

    /// The active pane is not a leaf in the map.
    #[error("active pane {0} is not a leaf")]
    ActivePaneNotLeaf(PaneId),

    /// A split ratio lies outside the allowed range.
    #[error("split {pane} has ratio {ratio} outside [0.1, 0.9]")]
    RatioOutOfRange {
        /// Split pane.
        pane: PaneId,
        /// Stored ratio.
        ratio: f64,
    },

    /// The same tab ID appears more than once in the workspace.
    #[error("tab {0} appears more than once")]
    DuplicateTab(TabId),
}
