//! The serialized layout document

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::migrate::{LAYOUT_STATE_VERSION, reconcile};
use crate::error::{PersistError, PersistResult};
use crate::layout::{ConnectionId, InvariantViolation, PaneId, PaneNode, WorkspaceForest};

/// All workspaces as stored on disk.
///
/// The three maps are keyed by connection. A connection present in any of
/// them is a workspace; missing entries are re-derived on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    /// Schema version of the document
    pub version: u64,
    /// When the document was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    /// Root pane of each workspace
    #[serde(default)]
    pub root_pane_id: BTreeMap<ConnectionId, PaneId>,
    /// Pane map of each workspace
    #[serde(default)]
    pub panes: BTreeMap<ConnectionId, BTreeMap<PaneId, PaneNode>>,
    /// Active pane of each workspace
    #[serde(default)]
    pub active_pane_id: BTreeMap<ConnectionId, PaneId>,
}

impl Default for PersistedLayout {
    fn default() -> Self {
        Self {
            version: LAYOUT_STATE_VERSION,
            saved_at: None,
            root_pane_id: BTreeMap::new(),
            panes: BTreeMap::new(),
            active_pane_id: BTreeMap::new(),
        }
    }
}

impl PersistedLayout {
    /// Snapshots live workspaces at the current schema version.
    #[must_use]
    pub fn capture<'a>(
        workspaces: impl IntoIterator<Item = (&'a ConnectionId, &'a WorkspaceForest)>,
    ) -> Self {
        let mut layout = Self {
            saved_at: Some(Utc::now()),
            ..Self::default()
        };
        for (connection, forest) in workspaces {
            layout.insert(connection.clone(), forest);
        }
        layout
    }

    /// Adds or replaces one workspace.
    pub fn insert(&mut self, connection: ConnectionId, forest: &WorkspaceForest) {
        self.root_pane_id.insert(connection.clone(), forest.root_id());
        self.active_pane_id
            .insert(connection.clone(), forest.active_pane_id());
        self.panes.insert(
            connection,
            forest
                .panes()
                .iter()
                .map(|(id, node)| (*id, node.clone()))
                .collect(),
        );
    }

    /// Returns every connection that has a workspace in the document.
    #[must_use]
    pub fn connections(&self) -> Vec<&ConnectionId> {
        let mut connections: Vec<_> = self
            .root_pane_id
            .keys()
            .chain(self.panes.keys())
            .chain(self.active_pane_id.keys())
            .collect();
        connections.sort();
        connections.dedup();
        connections
    }

    /// Returns the number of workspaces.
    #[must_use]
    pub fn workspace_count(&self) -> usize {
        self.connections().len()
    }

    /// Builds live forests, repairing any broken state.
    #[must_use]
    pub fn into_workspaces(mut self) -> BTreeMap<ConnectionId, WorkspaceForest> {
        let connections: Vec<ConnectionId> = self.connections().into_iter().cloned().collect();
        let mut workspaces = BTreeMap::new();
        for connection in connections {
            let root = self.root_pane_id.remove(&connection);
            let active = self.active_pane_id.remove(&connection);
            let panes = self
                .panes
                .remove(&connection)
                .unwrap_or_default()
                .into_values()
                .collect();
            let (forest, _) = reconcile(&connection, root, panes, active);
            workspaces.insert(connection, forest);
        }
        workspaces
    }

    /// Checks every workspace without repairing it.
    ///
    /// Returns one entry per workspace, in connection order.
    #[must_use]
    pub fn validate(&self) -> Vec<(ConnectionId, Result<(), InvariantViolation>)> {
        self.connections()
            .into_iter()
            .map(|connection| {
                let result = self.check_workspace(connection);
                (connection.clone(), result)
            })
            .collect()
    }

    fn check_workspace(&self, connection: &ConnectionId) -> Result<(), InvariantViolation> {
        let root = self
            .root_pane_id
            .get(connection)
            .copied()
            .ok_or_else(|| InvariantViolation::MissingRoot(PaneId::from_uuid(uuid::Uuid::nil())))?;
        let active = self
            .active_pane_id
            .get(connection)
            .copied()
            .unwrap_or(root);
        let panes = self
            .panes
            .get(connection)
            .map(|panes| panes.iter().map(|(id, node)| (*id, node.clone())).collect())
            .unwrap_or_default();
        WorkspaceForest::from_parts(root, panes, active).map(drop)
    }

    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> PersistResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PersistError::Serialization(e.to_string()))
    }

    /// Parses a document strictly, without migration or repair.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match the current schema.
    pub fn from_json(text: &str) -> PersistResult<Self> {
        serde_json::from_str(text).map_err(|e| PersistError::Deserialization(e.to_string()))
    }
}
