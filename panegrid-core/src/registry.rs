//! Tab registry interface
//!
//! The registry is the per-tab-type capability table owned by the
//! application: it supplies default titles and receives lifecycle hooks.
//! The layout engine only calls into it.
//!
//! Hooks never run in the middle of a mutation. Operations record
//! [`LifecycleEvent`]s while computing the next forest, and the
//! [`LayoutManager`](crate::LayoutManager) dispatches them once the new
//! forest is installed. Hooks receive `&Tab` only.

use std::collections::HashMap;

use serde_json::Value;

use crate::layout::{Tab, TabKind};

/// Per-tab-type capabilities consumed by the layout engine.
pub trait TabRegistry {
    /// Returns the title for a new tab of `kind`.
    ///
    /// `existing_count` is the number of tabs of the same kind already in
    /// the target pane, so the first tab gets `0`.
    fn default_title(&self, kind: &TabKind, existing_count: usize, metadata: Option<&Value>)
    -> String;

    /// Called after a tab has been created.
    fn on_create(&self, _tab: &Tab) {}

    /// Called after a tab has been removed from its pane.
    fn on_close(&self, _tab: &Tab) {}

    /// Called after a tab became the active tab of its pane.
    fn on_activate(&self, _tab: &Tab) {}

    /// Called after a tab stopped being the active tab of its pane.
    fn on_deactivate(&self, _tab: &Tab) {}
}

/// A deferred registry callback recorded during a layout transition.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A tab was created.
    Created(Tab),
    /// A tab was closed or discarded with its pane.
    Closed(Tab),
    /// A tab became active in its pane.
    Activated(Tab),
    /// A tab stopped being active in its pane.
    Deactivated(Tab),
}

impl LifecycleEvent {
    /// Returns the tab the event is about.
    #[must_use]
    pub const fn tab(&self) -> &Tab {
        match self {
            Self::Created(tab) | Self::Closed(tab) | Self::Activated(tab) | Self::Deactivated(tab) => {
                tab
            }
        }
    }

    /// Invokes the matching registry hook.
    pub fn dispatch(&self, registry: &dyn TabRegistry) {
        match self {
            Self::Created(tab) => registry.on_create(tab),
            Self::Closed(tab) => registry.on_close(tab),
            Self::Activated(tab) => registry.on_activate(tab),
            Self::Deactivated(tab) => registry.on_deactivate(tab),
        }
    }
}

/// Display information for one tab type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabTypeInfo {
    /// Singular label used in default titles ("Query").
    pub label: String,
    /// Icon name for the tab strip.
    pub icon: Option<String>,
}

impl TabTypeInfo {
    /// Creates type info with a label and no icon.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
        }
    }

    /// Sets the icon name.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Table-driven registry with numbered default titles and no hooks.
///
/// Titles are `"<label> <n>"` where `n` is one more than the number of
/// same-kind tabs in the pane. Table data tabs are titled after the
/// `table` field of their metadata when present.
#[derive(Debug, Clone)]
pub struct BasicTabRegistry {
    types: HashMap<TabKind, TabTypeInfo>,
}

impl BasicTabRegistry {
    /// Creates a registry with the built-in tab types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert(
            TabKind::new(TabKind::QUERY),
            TabTypeInfo::new("Query").with_icon("file-code"),
        );
        types.insert(
            TabKind::new(TabKind::TABLE_DATA),
            TabTypeInfo::new("Table").with_icon("table"),
        );
        types.insert(
            TabKind::new(TabKind::TERMINAL),
            TabTypeInfo::new("Terminal").with_icon("terminal"),
        );
        Self { types }
    }

    /// Registers or replaces a tab type.
    pub fn register(&mut self, kind: impl Into<TabKind>, info: TabTypeInfo) {
        self.types.insert(kind.into(), info);
    }

    /// Returns the type info for a kind.
    #[must_use]
    pub fn info(&self, kind: &TabKind) -> Option<&TabTypeInfo> {
        self.types.get(kind)
    }
}

impl Default for BasicTabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistry for BasicTabRegistry {
    fn default_title(
        &self,
        kind: &TabKind,
        existing_count: usize,
        metadata: Option<&Value>,
    ) -> String {
        if kind.is(TabKind::TABLE_DATA)
            && let Some(table) = metadata.and_then(|m| m.get("table")).and_then(Value::as_str)
        {
            return table.to_owned();
        }
        let label = self
            .types
            .get(kind)
            .map_or_else(|| kind.as_str().to_owned(), |info| info.label.clone());
        format!("{label} {}", existing_count + 1)
    }
}
