//! Layout persistence
//!
//! This module provides the versioned on-disk layout document, the
//! migration that runs once per load, and the stores that hold it.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": "2026-01-01T00:00:00Z",
//!   "rootPaneId":   { "<connection>": "<pane id>" },
//!   "panes":        { "<connection>": { "<pane id>": { "kind": "leaf", ... } } },
//!   "activePaneId": { "<connection>": "<pane id>" }
//! }
//! ```

mod migrate;
mod state;
mod store;

pub use migrate::{
    LAYOUT_STATE_VERSION, MigrationOptions, MigrationReport, document_version, migrate,
    migrate_with_report, reconcile, strip_volatile_tabs,
};
pub use state::PersistedLayout;
pub use store::{JsonFileStore, LayoutStore, MemoryStore};

use crate::error::{PersistError, PersistResult};

/// Parses stored text and migrates it to the current schema.
///
/// # Errors
///
/// - `Deserialization` if the text is not a JSON object
/// - `UnsupportedVersion` if it was written by a newer schema
pub fn decode_layout(
    text: &str,
    options: &MigrationOptions,
) -> PersistResult<(PersistedLayout, MigrationReport)> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|e| PersistError::Deserialization(e.to_string()))?;
    migrate_with_report(&raw, document_version(&raw), options)
}
