//! Layout manager: one workspace forest per connection
//!
//! The manager is the entry point for UI intents. Every operation runs on a
//! copy of the target forest; the copy replaces the live forest only when
//! the operation succeeds, so a rejected gesture never leaves a half-applied
//! tree behind. After the swap the recorded lifecycle events are dispatched
//! to the registry and the layout is marked dirty.
//!
//! Nothing is written while an operation runs. The host calls
//! [`LayoutManager::flush`] when it wants pending changes on disk, for
//! example on an idle tick or after a divider drag ends; dropping the
//! manager flushes as well. A stored document that could not be loaded is
//! copied to the store's backup slot and left in place until the host saves
//! explicitly.

use std::collections::BTreeMap;

use serde_json::json;

use crate::config::LayoutSettings;
use crate::error::PersistResult;
use crate::layout::{
    ConnectionId, DropZone, LayoutError, PaneId, SplitDirection, SplitOutcome, Tab, TabId,
    TabKind, TabOptions, TabSeed, TabUpdate, WorkspaceForest,
};
use crate::persistence::{
    JsonFileStore, LayoutStore, MigrationOptions, MigrationReport, PersistedLayout, decode_layout,
};
use crate::registry::TabRegistry;
use crate::trace_operation;
use crate::tracing::span_names;

/// The tab an open-or-focus request ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusedTab {
    /// Pane holding the tab
    pub pane_id: PaneId,
    /// The tab
    pub tab_id: TabId,
    /// Whether the tab was created by this request
    pub created: bool,
}

/// A database table to show in a `table-data` tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataTarget {
    /// Schema, when the source has schemas
    pub schema: Option<String>,
    /// Table name
    pub table: String,
}

impl DataTarget {
    /// Creates a target for an unqualified table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Returns `schema.table`, or just `table` without a schema.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }

    /// Returns true if `tab` is a table data tab for this target.
    #[must_use]
    pub fn matches(&self, tab: &Tab) -> bool {
        if !tab.kind.is(TabKind::TABLE_DATA) {
            return false;
        }
        let Some(metadata) = &tab.metadata else {
            return false;
        };
        let table = metadata.get("table").and_then(serde_json::Value::as_str);
        let schema = metadata.get("schema").and_then(serde_json::Value::as_str);
        table == Some(self.table.as_str()) && schema == self.schema.as_deref()
    }

    fn seed(&self) -> TabSeed {
        let metadata = json!({ "schema": self.schema, "table": self.table });
        TabSeed::new(TabKind::TABLE_DATA).with_options(
            TabOptions::new()
                .with_title(self.qualified_name())
                .with_metadata(metadata),
        )
    }
}

/// Owns every workspace forest and applies operations to them.
pub struct LayoutManager {
    registry: Box<dyn TabRegistry>,
    workspaces: BTreeMap<ConnectionId, WorkspaceForest>,
    store: Option<Box<dyn LayoutStore>>,
    migration: MigrationOptions,
    dirty: bool,
    // Set when load discarded the stored document; flushes skip the store.
    write_back_held: bool,
}

impl LayoutManager {
    /// Creates a manager without persistence.
    #[must_use]
    pub fn new(registry: impl TabRegistry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
            workspaces: BTreeMap::new(),
            store: None,
            migration: MigrationOptions::default(),
            dirty: false,
            write_back_held: false,
        }
    }

    /// Creates a manager from settings, persisting to the configured file
    /// when `persist` is enabled. Call [`load`](Self::load) to read it.
    #[must_use]
    pub fn from_settings(settings: &LayoutSettings, registry: impl TabRegistry + 'static) -> Self {
        let manager = Self::new(registry).with_migration_options(settings.migration_options());
        if settings.persist {
            manager.with_store(JsonFileStore::new(settings.resolved_state_file()))
        } else {
            manager
        }
    }

    /// Sets the store layouts are loaded from and written to.
    #[must_use]
    pub fn with_store(mut self, store: impl LayoutStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Sets the options applied when loading.
    #[must_use]
    pub fn with_migration_options(mut self, options: MigrationOptions) -> Self {
        self.migration = options;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &dyn TabRegistry {
        self.registry.as_ref()
    }

    // ========================================================================
    // Workspace lifecycle
    // ========================================================================

    /// Replaces all workspaces with the stored layout.
    ///
    /// A missing, unreadable or future-version document yields no
    /// workspaces; loading itself never fails. A document that was read but
    /// not understood is copied to the store's backup and kept: later
    /// flushes leave it alone until [`save`](Self::save) is called. The
    /// same hold applies when the store could not be read at all.
    pub fn load(&mut self) -> MigrationReport {
        let _span = trace_operation!(span_names::LAYOUT_LOAD).entered();
        let Some(store) = &self.store else {
            return MigrationReport::default();
        };
        let text = match store.load() {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!("No saved layout");
                return MigrationReport::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved layout, write-back held");
                self.write_back_held = true;
                return MigrationReport::default();
            }
        };
        self.dirty = false;
        match decode_layout(&text, &self.migration) {
            Ok((layout, report)) => {
                self.workspaces = layout.into_workspaces();
                self.write_back_held = false;
                tracing::info!(
                    workspaces = self.workspaces.len(),
                    from_version = report.from_version,
                    stripped_tabs = report.stripped_tabs,
                    repairs = report.repairs,
                    "Layout loaded"
                );
                report
            }
            Err(e) => {
                if let Err(backup_error) = store.backup(&text) {
                    tracing::warn!(error = %backup_error, "Failed to back up unreadable layout");
                }
                tracing::warn!(error = %e, "Discarding unreadable layout, write-back held until saved");
                self.write_back_held = true;
                self.workspaces.clear();
                MigrationReport::default()
            }
        }
    }

    /// Creates the workspace for a connection with one empty pane.
    ///
    /// Returns false and keeps the existing forest if there already is one.
    pub fn initialize_layout(&mut self, connection: &ConnectionId) -> bool {
        if self.workspaces.contains_key(connection) {
            return false;
        }
        self.workspaces
            .insert(connection.clone(), WorkspaceForest::new());
        tracing::debug!(connection_id = %connection, "Workspace created");
        self.mark_dirty();
        true
    }

    /// Discards a connection's workspace. Its tabs are reported as closed.
    ///
    /// Returns false if there was none.
    pub fn clear_layout(&mut self, connection: &ConnectionId) -> bool {
        let Some(forest) = self.workspaces.remove(connection) else {
            return false;
        };
        for tab in forest.leaf_panes().into_iter().flat_map(|leaf| &leaf.tabs) {
            self.registry.on_close(tab);
        }
        tracing::debug!(connection_id = %connection, tabs = forest.tab_count(), "Workspace cleared");
        self.mark_dirty();
        true
    }

    /// Returns the forest of a connection.
    #[must_use]
    pub fn workspace(&self, connection: &ConnectionId) -> Option<&WorkspaceForest> {
        self.workspaces.get(connection)
    }

    /// Returns every connection with a workspace.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.workspaces.keys()
    }

    /// Returns all workspaces as a persistable document.
    #[must_use]
    pub fn snapshot(&self) -> PersistedLayout {
        PersistedLayout::capture(&self.workspaces)
    }

    /// Returns true if changes were made since the last write.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the current layout to the store, if there is one.
    ///
    /// This replaces the stored document even when load discarded it, and
    /// re-enables [`flush`](Self::flush) afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store fails. The layout
    /// stays dirty in that case.
    pub fn save(&mut self) -> PersistResult<()> {
        let Some(store) = &self.store else {
            self.dirty = false;
            return Ok(());
        };
        let _span = trace_operation!(span_names::LAYOUT_SAVE).entered();
        store.save(&self.snapshot().to_json()?)?;
        self.dirty = false;
        self.write_back_held = false;
        Ok(())
    }

    /// Writes pending changes, if any. Returns true if the store was written.
    ///
    /// Does nothing while write-back is held after a discarded load.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store fails.
    pub fn flush(&mut self) -> PersistResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if self.write_back_held {
            tracing::debug!("Layout write-back held, keeping stored document");
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    // ========================================================================
    // Pane operations
    // ========================================================================

    /// See [`WorkspaceForest::split_pane`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn split_pane(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        direction: SplitDirection,
        moved_tab: Option<TabId>,
    ) -> Result<SplitOutcome, LayoutError> {
        self.apply(connection, "split_pane", |forest, _| {
            forest.split_pane(pane_id, direction, moved_tab)
        })
    }

    /// See [`WorkspaceForest::close_pane`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn close_pane(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
    ) -> Result<PaneId, LayoutError> {
        self.apply(connection, "close_pane", |forest, _| forest.close_pane(pane_id))
    }

    /// See [`WorkspaceForest::resize_pane`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn resize_pane(
        &mut self,
        connection: &ConnectionId,
        split_id: PaneId,
        ratio: f64,
    ) -> Result<f64, LayoutError> {
        self.apply(connection, "resize_pane", |forest, _| {
            forest.resize_pane(split_id, ratio)
        })
    }

    /// See [`WorkspaceForest::set_active_pane`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn set_active_pane(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
    ) -> Result<(), LayoutError> {
        self.apply(connection, "set_active_pane", |forest, _| {
            forest.set_active_pane(pane_id)
        })
    }

    // ========================================================================
    // Tab operations
    // ========================================================================

    /// See [`WorkspaceForest::create_tab`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn create_tab(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        kind: TabKind,
        options: TabOptions,
    ) -> Result<TabId, LayoutError> {
        self.apply(connection, "create_tab", |forest, registry| {
            forest.create_tab(pane_id, kind, options, registry)
        })
    }

    /// See [`WorkspaceForest::close_tab`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn close_tab(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        tab_id: TabId,
    ) -> Result<Tab, LayoutError> {
        self.apply(connection, "close_tab", |forest, _| {
            forest.close_tab(pane_id, tab_id)
        })
    }

    /// See [`WorkspaceForest::update_tab`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn update_tab(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        tab_id: TabId,
        update: TabUpdate,
    ) -> Result<(), LayoutError> {
        self.apply(connection, "update_tab", |forest, _| {
            forest.update_tab(pane_id, tab_id, update)
        })
    }

    /// See [`WorkspaceForest::reorder_tabs`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn reorder_tabs(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        from: usize,
        to: usize,
    ) -> Result<(), LayoutError> {
        self.apply(connection, "reorder_tabs", |forest, _| {
            forest.reorder_tabs(pane_id, from, to)
        })
    }

    /// See [`WorkspaceForest::set_active_tab`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn set_active_tab(
        &mut self,
        connection: &ConnectionId,
        pane_id: PaneId,
        tab_id: TabId,
    ) -> Result<(), LayoutError> {
        self.apply(connection, "set_active_tab", |forest, _| {
            forest.set_active_tab(pane_id, tab_id)
        })
    }

    /// See [`WorkspaceForest::move_tab`].
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound`, or the forest's rejection.
    pub fn move_tab(
        &mut self,
        connection: &ConnectionId,
        from_pane: PaneId,
        tab_id: TabId,
        to_pane: PaneId,
        zone: DropZone,
    ) -> Result<PaneId, LayoutError> {
        self.apply(connection, "move_tab", |forest, _| {
            forest.move_tab(from_pane, tab_id, to_pane, zone)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Focuses the first tab matching `predicate`, in visual order, or
    /// creates one from `create_if_absent` in the active pane.
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound` if the connection has no workspace.
    pub fn open_or_focus_tab(
        &mut self,
        connection: &ConnectionId,
        predicate: impl Fn(&Tab) -> bool,
        create_if_absent: impl FnOnce() -> TabSeed,
    ) -> Result<FocusedTab, LayoutError> {
        self.apply(connection, "open_or_focus_tab", |forest, registry| {
            let existing = forest.leaf_panes().into_iter().find_map(|leaf| {
                leaf.tabs
                    .iter()
                    .find(|tab| predicate(tab))
                    .map(|tab| (leaf.id, tab.id))
            });
            if let Some((pane_id, tab_id)) = existing {
                forest.set_active_tab(pane_id, tab_id)?;
                return Ok(FocusedTab {
                    pane_id,
                    tab_id,
                    created: false,
                });
            }

            let pane_id = forest
                .active_pane()
                .map(|leaf| leaf.id)
                .or_else(|| forest.first_leaf(forest.root_id()))
                .ok_or(LayoutError::PaneNotFound(forest.active_pane_id()))?;
            let seed = create_if_absent();
            let tab_id = forest.create_tab(pane_id, seed.kind, seed.options, registry)?;
            Ok(FocusedTab {
                pane_id,
                tab_id,
                created: true,
            })
        })
    }

    /// Focuses or opens the `table-data` tab for a table.
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound` if the connection has no workspace.
    pub fn open_data_tab(
        &mut self,
        connection: &ConnectionId,
        target: &DataTarget,
    ) -> Result<FocusedTab, LayoutError> {
        self.open_or_focus_tab(connection, |tab| target.matches(tab), || target.seed())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Runs `operation` on a copy of the forest and installs the copy on
    /// success, then dispatches its events and marks the layout dirty.
    fn apply<T>(
        &mut self,
        connection: &ConnectionId,
        operation: &'static str,
        op: impl FnOnce(&mut WorkspaceForest, &dyn TabRegistry) -> Result<T, LayoutError>,
    ) -> Result<T, LayoutError> {
        let _span = trace_operation!(
            span_names::LAYOUT_MUTATE,
            connection_id = %connection,
            operation
        )
        .entered();

        let mut next = self
            .workspaces
            .get(connection)
            .ok_or_else(|| LayoutError::WorkspaceNotFound(connection.clone()))?
            .clone();
        let value = match op(&mut next, self.registry.as_ref()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(connection_id = %connection, operation, error = %e, "Layout operation rejected");
                return Err(e);
            }
        };

        let events = next.take_events();
        let panes = next.pane_count();
        self.workspaces.insert(connection.clone(), next);
        for event in &events {
            event.dispatch(self.registry.as_ref());
        }
        self.mark_dirty();

        tracing::debug!(
            connection_id = %connection,
            operation,
            panes,
            events = events.len(),
            "Layout updated"
        );
        Ok(value)
    }

    fn mark_dirty(&mut self) {
        if self.store.is_some() {
            self.dirty = true;
        }
    }
}

impl Drop for LayoutManager {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "Failed to persist layout");
        }
    }
}
