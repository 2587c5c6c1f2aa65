//! Property test modules

mod forest_tests;
mod migration_tests;
mod tab_tests;

use panegrid_core::{
    BasicTabRegistry, ConnectionId, DropZone, LayoutError, LayoutManager, PaneId, SplitDirection,
    TabId, TabKind, TabOptions, WorkspaceForest,
};
use proptest::prelude::*;

/// An operation against one workspace, addressed by index so that any
/// generated value maps onto whatever panes exist at the time.
#[derive(Debug, Clone)]
pub enum Op {
    CreateTab { pane: usize, kind: usize },
    CloseTab { pane: usize, tab: usize },
    Split { pane: usize, direction: SplitDirection, move_tab: Option<usize> },
    ClosePane { pane: usize },
    Resize { pane: usize, ratio: f64 },
    Move { from: usize, tab: usize, to: usize, zone: DropZone },
    Reorder { pane: usize, from: usize, to: usize },
    Activate { pane: usize, tab: usize },
}

const KINDS: [&str; 3] = [TabKind::QUERY, TabKind::TABLE_DATA, TabKind::TERMINAL];

pub fn direction_strategy() -> impl Strategy<Value = SplitDirection> {
    prop_oneof![
        Just(SplitDirection::Horizontal),
        Just(SplitDirection::Vertical),
    ]
}

pub fn zone_strategy() -> impl Strategy<Value = DropZone> {
    prop_oneof![
        Just(DropZone::Left),
        Just(DropZone::Right),
        Just(DropZone::Top),
        Just(DropZone::Bottom),
        Just(DropZone::Center),
    ]
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..8, 0usize..KINDS.len()).prop_map(|(pane, kind)| Op::CreateTab { pane, kind }),
        1 => (0usize..8, 0usize..8).prop_map(|(pane, tab)| Op::CloseTab { pane, tab }),
        2 => (0usize..8, direction_strategy(), proptest::option::of(0usize..8))
            .prop_map(|(pane, direction, move_tab)| Op::Split { pane, direction, move_tab }),
        1 => (0usize..8).prop_map(|pane| Op::ClosePane { pane }),
        1 => (0usize..8, 0u32..=100)
            .prop_map(|(pane, r)| Op::Resize { pane, ratio: f64::from(r) / 100.0 }),
        2 => (0usize..8, 0usize..8, 0usize..8, zone_strategy())
            .prop_map(|(from, tab, to, zone)| Op::Move { from, tab, to, zone }),
        1 => (0usize..8, 0usize..8, 0usize..8).prop_map(|(pane, from, to)| Op::Reorder { pane, from, to }),
        1 => (0usize..8, 0usize..8).prop_map(|(pane, tab)| Op::Activate { pane, tab }),
    ]
}

pub fn ops_strategy(max: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(op_strategy(), 0..=max)
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[index % items.len()])
    }
}

fn all_panes(forest: &WorkspaceForest) -> Vec<PaneId> {
    let mut ids: Vec<PaneId> = forest.panes().keys().copied().collect();
    ids.sort();
    ids
}

fn splits(forest: &WorkspaceForest) -> Vec<PaneId> {
    all_panes(forest)
        .into_iter()
        .filter(|id| forest.split(*id).is_some())
        .collect()
}

fn tabs_of(forest: &WorkspaceForest, pane: PaneId) -> Vec<TabId> {
    forest
        .leaf(pane)
        .map(|leaf| leaf.tabs.iter().map(|t| t.id).collect())
        .unwrap_or_default()
}

/// Every tab ID in the workspace, in visual order.
pub fn tab_ids(forest: &WorkspaceForest) -> Vec<TabId> {
    forest
        .leaf_panes()
        .into_iter()
        .flat_map(|leaf| leaf.tabs.iter().map(|t| t.id))
        .collect()
}

/// A manager with one empty workspace.
pub fn fresh_manager() -> (LayoutManager, ConnectionId) {
    let connection = ConnectionId::new("prop");
    let mut manager = LayoutManager::new(BasicTabRegistry::new());
    manager.initialize_layout(&connection);
    (manager, connection)
}

/// Applies `op`, resolving indices against the current forest.
///
/// Returns `None` if the indices could not be resolved.
pub fn apply(
    manager: &mut LayoutManager,
    connection: &ConnectionId,
    op: &Op,
) -> Option<Result<(), LayoutError>> {
    let forest = manager.workspace(connection)?.clone();
    let leaves = forest.leaf_ids();
    let result = match *op {
        Op::CreateTab { pane, kind } => manager
            .create_tab(connection, pick(&leaves, pane)?, KINDS[kind].into(), TabOptions::new())
            .map(drop),
        Op::CloseTab { pane, tab } => {
            let pane = pick(&leaves, pane)?;
            let tab = pick(&tabs_of(&forest, pane), tab)?;
            manager.close_tab(connection, pane, tab).map(drop)
        }
        Op::Split {
            pane,
            direction,
            move_tab,
        } => {
            let pane = pick(&leaves, pane)?;
            let moved = move_tab.and_then(|t| pick(&tabs_of(&forest, pane), t));
            manager
                .split_pane(connection, pane, direction, moved)
                .map(drop)
        }
        Op::ClosePane { pane } => manager
            .close_pane(connection, pick(&all_panes(&forest), pane)?)
            .map(drop),
        Op::Resize { pane, ratio } => manager
            .resize_pane(connection, pick(&splits(&forest), pane)?, ratio)
            .map(drop),
        Op::Move {
            from,
            tab,
            to,
            zone,
        } => {
            let from = pick(&leaves, from)?;
            let tab = pick(&tabs_of(&forest, from), tab)?;
            let to = pick(&leaves, to)?;
            manager.move_tab(connection, from, tab, to, zone).map(drop)
        }
        Op::Reorder { pane, from, to } => {
            let pane = pick(&leaves, pane)?;
            manager.reorder_tabs(connection, pane, from, to)
        }
        Op::Activate { pane, tab } => {
            let pane = pick(&leaves, pane)?;
            let tab = pick(&tabs_of(&forest, pane), tab)?;
            manager.set_active_tab(connection, pane, tab)
        }
    };
    Some(result)
}

/// Builds a workspace by applying `ops`, skipping whatever fails.
pub fn build(ops: &[Op]) -> (LayoutManager, ConnectionId) {
    let (mut manager, connection) = fresh_manager();
    for op in ops {
        let _ = apply(&mut manager, &connection, op);
    }
    (manager, connection)
}
