//! Workspace pane and tab layout
//!
//! This module provides the pane tree of a single workspace and every
//! operation that reshapes it. A workspace is a binary tree of panes stored
//! in a flat map: leaf panes hold an ordered list of tabs, split panes hold
//! two child references, a direction and a ratio.
//!
//! # Architecture
//!
//! - **Flat arena**: panes are addressed by [`PaneId`], children by ID
//! - **Atomic operations**: every mutation returns `Result` and leaves the
//!   forest untouched on `Err`
//! - **Deferred hooks**: registry callbacks are recorded as events and run
//!   after the caller installs the new state
//!
//! # Module Structure
//!
//! - `types` - Identifiers and enums (`PaneId`, `TabId`, `TabKind`, `DropZone`)
//! - `tree` - Pane nodes and tabs (`PaneNode`, `LeafPane`, `SplitPane`, `Tab`)
//! - `forest` - The workspace forest and its structural operations
//! - `tabs` - Tab lifecycle (`create_tab`, `close_tab`, `reorder_tabs`, ...)
//! - `placement` - Drag-and-drop resolution (`move_tab`)
//! - `error` - Error types (`LayoutError`, `InvariantViolation`)
//!
//! # Example
//!
//! ```
//! use panegrid_core::layout::{DropZone, TabKind, TabOptions, WorkspaceForest};
//! use panegrid_core::registry::BasicTabRegistry;
//!
//! let registry = BasicTabRegistry::new();
//! let mut forest = WorkspaceForest::new();
//! let root = forest.root_id();
//!
//! let a = forest.create_tab(root, TabKind::new("query"), TabOptions::new(), &registry).unwrap();
//! forest.create_tab(root, TabKind::new("query"), TabOptions::new(), &registry).unwrap();
//!
//! // Drag the first tab to the right edge of its own pane
//! let right = forest.move_tab(root, a, root, DropZone::Right).unwrap();
//! assert_eq!(forest.leaf_ids(), vec![root, right]);
//! assert!(forest.validate().is_ok());
//! ```

mod error;
mod forest;
mod placement;
mod tabs;
mod tree;
mod types;

pub use error::{InvariantViolation, LayoutError};
pub use forest::{SplitOutcome, WorkspaceForest};
pub use tabs::{TabOptions, TabSeed, TabUpdate};
pub use tree::{
    DEFAULT_SPLIT_RATIO, LeafPane, MAX_SPLIT_RATIO, MIN_SPLIT_RATIO, PaneNode, SplitPane, Tab,
    clamp_ratio,
};
pub use types::{ConnectionId, DropZone, PaneId, SplitDirection, TabId, TabKind};
