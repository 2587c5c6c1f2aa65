//! `panegrid` Core Library
//!
//! This crate provides the workspace pane/tab layout engine: a splittable
//! grid of panes per data-source connection, the tab lifecycle inside each
//! pane, drag-and-drop placement, and versioned persistence of the whole
//! layout.
//!
//! # Crate Structure
//!
//! - [`layout`] - Pane tree, tab lifecycle and drop placement
//! - [`registry`] - The per-tab-type registry interface
//! - [`manager`] - Per-connection workspaces with atomic updates
//! - [`persistence`] - Layout document, migration and stores
//! - [`config`] - Layout settings (TOML)
//! - [`tracing`] - Logging setup and span conventions
//!
//! # Example
//!
//! ```
//! use panegrid_core::{BasicTabRegistry, ConnectionId, DropZone, LayoutManager, TabOptions};
//!
//! let conn = ConnectionId::new("pg-local");
//! let mut manager = LayoutManager::new(BasicTabRegistry::new());
//! manager.initialize_layout(&conn);
//!
//! let root = manager.workspace(&conn).unwrap().root_id();
//! let a = manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
//! manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
//!
//! // Drag the first query to the left edge of its own pane
//! let left = manager.move_tab(&conn, root, a, root, DropZone::Left).unwrap();
//! let forest = manager.workspace(&conn).unwrap();
//! assert_eq!(forest.leaf_ids(), vec![left, root]);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod layout;
pub mod manager;
pub mod persistence;
pub mod registry;
pub mod tracing;

pub use config::{LayoutSettings, LoggingSettings};
pub use error::{ConfigError, PaneGridError, PersistError, PersistResult};
pub use layout::{
    ConnectionId, DropZone, InvariantViolation, LayoutError, LeafPane, PaneId, PaneNode,
    SplitDirection, SplitOutcome, SplitPane, Tab, TabId, TabKind, TabOptions, TabSeed, TabUpdate,
    WorkspaceForest,
};
pub use manager::{DataTarget, FocusedTab, LayoutManager};
pub use persistence::{
    JsonFileStore, LAYOUT_STATE_VERSION, LayoutStore, MemoryStore, MigrationOptions,
    MigrationReport, PersistedLayout, decode_layout, migrate,
};
pub use registry::{BasicTabRegistry, LifecycleEvent, TabRegistry, TabTypeInfo};
pub use crate::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};
