//! Core identifier types and enums for the layout engine
//!
//! This module contains the identifier newtypes and small enums used
//! throughout the pane tree, the tab lifecycle and the drop resolver.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pane node inside a workspace forest.
///
/// Pane IDs are keys into the forest's flat pane map. A pane keeps its ID
/// for its whole lifetime, even when the tree around it is restructured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(pub Uuid);

impl PaneId {
    /// Creates a new random pane ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a pane ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PaneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pane({})", self.0)
    }
}

/// Unique identifier for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub Uuid);

impl TabId {
    /// Creates a new random tab ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a tab ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tab({})", self.0)
    }
}

/// Identifier of the data-source connection a workspace belongs to.
///
/// Connection IDs are assigned by the application; the engine treats them
/// as opaque keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a connection ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Type of a tab, used as the key into the tab registry.
///
/// The engine never interprets kinds beyond equality; the well-known kinds
/// in [`TabKind::QUERY`] and friends are the ones the application ships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabKind(String);

impl TabKind {
    /// SQL/query editor tab.
    pub const QUERY: &'static str = "query";
    /// Table data browser tab.
    pub const TABLE_DATA: &'static str = "table-data";
    /// Interactive terminal bound to a live session process.
    pub const TERMINAL: &'static str = "terminal";

    /// Creates a tab kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this kind equals the given name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Split direction for dividing a pane.
///
/// `Horizontal` lays the two children out side by side (first on the left),
/// `Vertical` stacks them (first on top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Children arranged left and right.
    Horizontal,
    /// Children arranged top and bottom.
    Vertical,
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "Horizontal"),
            Self::Vertical => write!(f, "Vertical"),
        }
    }
}

/// Region of a target pane a dragged tab is released onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    /// Left edge: split horizontally, new pane on the left.
    Left,
    /// Right edge: split horizontally, new pane on the right.
    Right,
    /// Top edge: split vertically, new pane on top.
    Top,
    /// Bottom edge: split vertically, new pane at the bottom.
    Bottom,
    /// Center: move the tab into the target pane itself.
    Center,
}

impl DropZone {
    /// Returns the split direction an edge zone produces, or `None` for
    /// the center zone.
    #[must_use]
    pub const fn split_direction(self) -> Option<SplitDirection> {
        match self {
            Self::Left | Self::Right => Some(SplitDirection::Horizontal),
            Self::Top | Self::Bottom => Some(SplitDirection::Vertical),
            Self::Center => None,
        }
    }

    /// Returns true if the new pane must end up as the split's first child.
    #[must_use]
    pub const fn places_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

impl fmt::Display for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
        };
        f.write_str(name)
    }
}
