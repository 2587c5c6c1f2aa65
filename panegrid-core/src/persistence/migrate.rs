//! Schema migration and repair of stored layouts
//!
//! Loading runs [`migrate`] exactly once. It reads the raw document
//! leniently, strips volatile tabs, and rebuilds every workspace so that the
//! result satisfies the tree invariants whatever the stored content was.
//!
//! Repairs, applied in order:
//!
//! 1. Nodes that do not parse are dropped; a leaf with unreadable tabs keeps
//!    the readable ones
//! 2. Ratios are clamped, non-finite ones reset to the default
//! 3. A missing root is re-derived from the unreferenced pane with the
//!    largest subtree, or replaced by a fresh empty leaf
//! 4. A split with one broken child is replaced by its valid child; a split
//!    with two broken children is dropped
//! 5. Panes unreachable from the root are dropped
//! 6. Duplicate tab IDs keep their first occurrence in visual order
//! 7. Active tab and active pane are re-derived when invalid

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PersistError, PersistResult};
use crate::layout::{
    ConnectionId, DEFAULT_SPLIT_RATIO, LeafPane, PaneId, PaneNode, Tab, TabId, TabKind,
    WorkspaceForest, clamp_ratio,
};
use crate::tracing::span_names;

use super::state::PersistedLayout;

/// Current schema version written by this crate
pub const LAYOUT_STATE_VERSION: u64 = 1;

/// What [`migrate`] strips from a stored layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    volatile_tab_types: Vec<TabKind>,
}

impl MigrationOptions {
    /// Creates options that strip the given tab kinds.
    #[must_use]
    pub fn new<'a>(volatile: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            volatile_tab_types: volatile.into_iter().map(TabKind::new).collect(),
        }
    }

    /// Creates options that keep every tab.
    #[must_use]
    pub const fn keep_all() -> Self {
        Self {
            volatile_tab_types: Vec::new(),
        }
    }

    /// Returns true if tabs of `kind` are stripped on load.
    #[must_use]
    pub fn is_volatile(&self, kind: &str) -> bool {
        self.volatile_tab_types.iter().any(|k| k.is(kind))
    }
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_VOLATILE_TAB_TYPES.iter().copied())
    }
}

/// Counts of what a migration changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version of the input document
    pub from_version: u64,
    /// Volatile tabs removed
    pub stripped_tabs: usize,
    /// Structural repairs applied
    pub repairs: usize,
}

/// Returns the schema version of a raw document; documents without a
/// `version` key are version 0.
#[must_use]
pub fn document_version(raw: &Value) -> u64 {
    raw.get("version").and_then(Value::as_u64).unwrap_or(0)
}

/// Migrates a raw document to the current schema.
///
/// # Errors
///
/// - `UnsupportedVersion` if `from_version` is newer than this crate
/// - `Deserialization` if `raw` is not a JSON object
pub fn migrate(
    raw: &Value,
    from_version: u64,
    options: &MigrationOptions,
) -> PersistResult<PersistedLayout> {
    migrate_with_report(raw, from_version, options).map(|(layout, _)| layout)
}

/// Like [`migrate`], also returning what was changed.
///
/// # Errors
///
/// See [`migrate`].
pub fn migrate_with_report(
    raw: &Value,
    from_version: u64,
    options: &MigrationOptions,
) -> PersistResult<(PersistedLayout, MigrationReport)> {
    let _span = crate::trace_operation!(span_names::LAYOUT_MIGRATE, from_version).entered();

    if from_version > LAYOUT_STATE_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: from_version,
            supported: LAYOUT_STATE_VERSION,
        });
    }
    let Some(document) = raw.as_object() else {
        return Err(PersistError::Deserialization(
            "layout document is not an object".to_owned(),
        ));
    };

    // Versions 0 and 1 share one shape, so there are no per-version steps.
    let mut report = MigrationReport {
        from_version,
        ..MigrationReport::default()
    };
    let roots = id_map(document.get("rootPaneId"));
    let actives = id_map(document.get("activePaneId"));
    let mut pane_maps: BTreeMap<ConnectionId, Vec<PaneNode>> = BTreeMap::new();
    if let Some(Value::Object(by_connection)) = document.get("panes") {
        for (connection, panes) in by_connection {
            let nodes = read_panes(connection, panes, &mut report);
            pane_maps.insert(ConnectionId::new(connection.as_str()), nodes);
        }
    }

    let mut connections: Vec<ConnectionId> = roots
        .keys()
        .chain(pane_maps.keys())
        .chain(actives.keys())
        .cloned()
        .collect();
    connections.sort();
    connections.dedup();

    let mut layout = PersistedLayout {
        saved_at: document
            .get("savedAt")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        ..PersistedLayout::default()
    };
    for connection in connections {
        let mut nodes = pane_maps.remove(&connection).unwrap_or_default();
        report.stripped_tabs += strip_volatile_tabs(&mut nodes, options);
        let (forest, repairs) = reconcile(
            &connection,
            roots.get(&connection).copied(),
            nodes,
            actives.get(&connection).copied(),
        );
        report.repairs += repairs;
        layout.insert(connection, &forest);
    }

    debug!(
        from_version,
        workspaces = layout.workspace_count(),
        stripped_tabs = report.stripped_tabs,
        repairs = report.repairs,
        "Layout migrated"
    );
    Ok((layout, report))
}

/// Removes volatile tabs from every leaf. Returns the number removed.
///
/// Panes are never removed here, even when they end up empty.
pub fn strip_volatile_tabs(nodes: &mut [PaneNode], options: &MigrationOptions) -> usize {
    let mut stripped = 0;
    for leaf in nodes.iter_mut().filter_map(PaneNode::as_leaf_mut) {
        let before = leaf.tabs.len();
        leaf.tabs.retain(|tab| !options.is_volatile(tab.kind.as_str()));
        stripped += before - leaf.tabs.len();
        leaf.repair_active_tab();
    }
    stripped
}

/// Rebuilds one workspace from possibly broken parts.
///
/// The result always satisfies every tree invariant. Returns the forest and
/// the number of repairs applied.
pub fn reconcile(
    connection: &ConnectionId,
    root: Option<PaneId>,
    nodes: Vec<PaneNode>,
    active: Option<PaneId>,
) -> (WorkspaceForest, usize) {
    let mut repairs = 0;
    let mut source: HashMap<PaneId, PaneNode> = HashMap::with_capacity(nodes.len());
    for mut node in nodes {
        if let PaneNode::Split(split) = &mut node {
            let ratio = if split.ratio.is_finite() {
                clamp_ratio(split.ratio)
            } else {
                DEFAULT_SPLIT_RATIO
            };
            if (ratio - split.ratio).abs() > f64::EPSILON || !split.ratio.is_finite() {
                warn!(connection_id = %connection, pane_id = %split.id, ratio = split.ratio, "Clamped split ratio");
                split.ratio = ratio;
                repairs += 1;
            }
        }
        let id = node.id();
        if source.contains_key(&id) {
            warn!(connection_id = %connection, pane_id = %id, "Dropped duplicate pane");
            repairs += 1;
            continue;
        }
        source.insert(id, node);
    }

    let root = match root.filter(|id| source.contains_key(id)) {
        Some(id) => Some(id),
        None if source.is_empty() => None,
        None => {
            let derived = derive_root(&source);
            warn!(connection_id = %connection, root = ?derived, "Re-derived missing root");
            repairs += 1;
            derived
        }
    };

    let mut panes = HashMap::with_capacity(source.len());
    let root = root.and_then(|id| rebuild(id, &source, &mut panes, &mut repairs));
    let root = root.unwrap_or_else(|| {
        let leaf = LeafPane::new();
        let id = leaf.id;
        if !source.is_empty() {
            warn!(connection_id = %connection, "No usable panes, starting with an empty pane");
            repairs += 1;
        }
        panes.insert(id, PaneNode::Leaf(leaf));
        id
    });

    let dropped = source.keys().filter(|id| !panes.contains_key(id)).count();
    if dropped > 0 {
        warn!(connection_id = %connection, dropped, "Dropped unreachable panes");
        repairs += dropped;
    }

    let mut forest = WorkspaceForest::from_parts_unchecked(root, panes, root);
    repairs += dedupe_tabs(connection, &mut forest).total();

    let active_leaf = active.filter(|id| forest.leaf(*id).is_some());
    let active_pane = active_leaf
        .or_else(|| forest.first_leaf(root))
        .unwrap_or(root);
    if active.is_some() && active_leaf.is_none() {
        debug!(connection_id = %connection, "Active pane re-derived");
        repairs += 1;
    }
    // Both candidates are leaves of this forest.
    let _ = forest.set_active_pane(active_pane);

    debug_assert!(forest.validate().is_ok());
    (forest, repairs)
}

enum Step {
    Enter(PaneId),
    Exit(PaneId),
}

/// Copies the subtree at `root` into `out`, returning the ID that now fills
/// its slot: `root` itself, a promoted child, or `None` if nothing survived.
///
/// Walks post-order with an explicit stack. A first child is finished before
/// its sibling is entered, so a node reachable twice stays with the first
/// path that reaches it.
fn rebuild(
    root: PaneId,
    source: &HashMap<PaneId, PaneNode>,
    out: &mut HashMap<PaneId, PaneNode>,
    repairs: &mut usize,
) -> Option<PaneId> {
    let mut visited = HashSet::new();
    let mut stack = vec![Step::Enter(root)];
    let mut filled: Vec<Option<PaneId>> = Vec::new();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                if !visited.insert(id) {
                    *repairs += 1;
                    filled.push(None);
                    continue;
                }
                match source.get(&id) {
                    Some(PaneNode::Leaf(leaf)) => {
                        out.insert(id, PaneNode::Leaf(leaf.clone()));
                        filled.push(Some(id));
                    }
                    Some(PaneNode::Split(split)) => {
                        stack.push(Step::Exit(id));
                        stack.push(Step::Enter(split.second));
                        stack.push(Step::Enter(split.first));
                    }
                    None => filled.push(None),
                }
            }
            Step::Exit(id) => {
                let second = filled.pop().flatten();
                let first = filled.pop().flatten();
                let Some(PaneNode::Split(split)) = source.get(&id) else {
                    filled.push(None);
                    continue;
                };
                let slot = match (first, second) {
                    (Some(first), Some(second)) => {
                        let mut split = split.clone();
                        split.first = first;
                        split.second = second;
                        out.insert(id, PaneNode::Split(split));
                        Some(id)
                    }
                    (Some(only), None) | (None, Some(only)) => {
                        warn!(pane_id = %id, promoted = %only, "Collapsed split with a dangling child");
                        *repairs += 1;
                        Some(only)
                    }
                    (None, None) => {
                        warn!(pane_id = %id, "Dropped split without valid children");
                        *repairs += 1;
                        None
                    }
                };
                filled.push(slot);
            }
        }
    }
    filled.pop().flatten()
}

/// Picks the unreferenced pane with the largest subtree. Falls back to all
/// panes when every pane is referenced, which only happens with cycles.
fn derive_root(source: &HashMap<PaneId, PaneNode>) -> Option<PaneId> {
    let referenced: HashSet<PaneId> = source
        .values()
        .filter_map(PaneNode::as_split)
        .flat_map(|split| split.children())
        .collect();
    let mut candidates: Vec<PaneId> = source
        .keys()
        .filter(|id| !referenced.contains(id))
        .copied()
        .collect();
    if candidates.is_empty() {
        candidates = source.keys().copied().collect();
    }
    // Ties resolve to the smallest ID.
    candidates
        .into_iter()
        .max_by_key(|id| (subtree_size(*id, source), std::cmp::Reverse(*id)))
}

fn subtree_size(id: PaneId, source: &HashMap<PaneId, PaneNode>) -> usize {
    let mut seen = HashSet::new();
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(PaneNode::Split(split)) = source.get(&id) {
            stack.extend(split.children());
        }
    }
    seen.iter().filter(|id| source.contains_key(id)).count()
}

/// Tab-level repairs made by [`dedupe_tabs`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TabRepairs {
    /// Tabs dropped because an earlier pane already held their ID
    duplicates: usize,
    /// Leaves whose active tab had to be picked again
    reselected: usize,
}

impl TabRepairs {
    const fn total(self) -> usize {
        self.duplicates + self.reselected
    }
}

/// Removes repeated tab IDs, keeping the first in visual order.
fn dedupe_tabs(connection: &ConnectionId, forest: &mut WorkspaceForest) -> TabRepairs {
    let mut seen: HashSet<TabId> = HashSet::new();
    let mut counts = TabRepairs::default();
    for pane_id in forest.leaf_ids() {
        let Some(leaf) = forest.leaf_mut(pane_id) else {
            continue;
        };
        let before = leaf.tabs.len();
        leaf.tabs.retain(|tab| seen.insert(tab.id));
        let dropped = before - leaf.tabs.len();
        if dropped > 0 {
            warn!(connection_id = %connection, pane_id = %pane_id, dropped, "Dropped duplicate tabs");
            counts.duplicates += dropped;
        }
        let active = leaf.active_tab_id;
        leaf.repair_active_tab();
        if leaf.active_tab_id != active {
            debug!(connection_id = %connection, pane_id = %pane_id, "Active tab re-selected");
            counts.reselected += 1;
        }
    }
    counts
}

/// Reads a `{ connection: paneId }` map, skipping unreadable entries.
fn id_map(value: Option<&Value>) -> BTreeMap<ConnectionId, PaneId> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(connection, id)| {
            serde_json::from_value(id.clone())
                .ok()
                .map(|id| (ConnectionId::new(connection.as_str()), id))
        })
        .collect()
}

fn read_panes(connection: &str, panes: &Value, report: &mut MigrationReport) -> Vec<PaneNode> {
    let Value::Object(entries) = panes else {
        warn!(connection_id = connection, "Pane map is not an object");
        report.repairs += 1;
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(entries.len());
    for (key, node) in entries {
        match read_node(node) {
            Some(parsed) => {
                if parsed.id().0.to_string() != *key {
                    debug!(connection_id = connection, key = %key, pane_id = %parsed.id(), "Pane key differs from its id");
                }
                nodes.push(parsed);
            }
            None => {
                warn!(connection_id = connection, key = %key, "Dropped unreadable pane");
                report.repairs += 1;
            }
        }
    }
    nodes
}

/// Parses one node, salvaging the readable tabs of a damaged leaf.
fn read_node(node: &Value) -> Option<PaneNode> {
    if let Ok(parsed) = serde_json::from_value::<PaneNode>(node.clone()) {
        return Some(parsed);
    }
    if node.get("kind").and_then(Value::as_str) != Some("leaf") {
        return None;
    }
    let id: PaneId = serde_json::from_value(node.get("id")?.clone()).ok()?;
    let mut leaf = LeafPane::with_id(id);
    if let Some(Value::Array(tabs)) = node.get("tabs") {
        leaf.tabs = tabs
            .iter()
            .filter_map(|tab| serde_json::from_value::<Tab>(tab.clone()).ok())
            .collect();
    }
    leaf.active_tab_id = node
        .get("activeTabId")
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    Some(PaneNode::Leaf(leaf))
}
