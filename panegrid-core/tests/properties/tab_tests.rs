//! Property-based tests for tab ordering and placement

use panegrid_core::{
    ConnectionId, DropZone, LayoutError, LayoutManager, PaneId, SplitDirection, TabId, TabOptions,
};
use proptest::prelude::*;

use super::{fresh_manager, tab_ids, zone_strategy};

/// A workspace whose root holds `count` query tabs.
fn pane_with_tabs(count: usize) -> (LayoutManager, ConnectionId, PaneId, Vec<TabId>) {
    let (mut manager, connection) = fresh_manager();
    let root = manager.workspace(&connection).unwrap().root_id();
    let tabs = (0..count)
        .map(|_| {
            manager
                .create_tab(&connection, root, "query".into(), TabOptions::new())
                .unwrap()
        })
        .collect();
    (manager, connection, root, tabs)
}

fn order(manager: &LayoutManager, connection: &ConnectionId, pane: PaneId) -> Vec<TabId> {
    manager.workspace(connection).unwrap().leaf(pane).unwrap().tabs.iter().map(|t| t.id).collect()
}

proptest! {
    /// Reordering a tab onto its own index changes nothing.
    #[test]
    fn reorder_to_same_index_is_noop(count in 1usize..8, index in 0usize..8) {
        let (mut manager, connection, root, _) = pane_with_tabs(count);
        let index = index % count;
        let before = manager.workspace(&connection).unwrap().clone();
        let result = manager.reorder_tabs(&connection, root, index, index);
        prop_assert!(matches!(result, Err(LayoutError::Unchanged)));
        prop_assert_eq!(manager.workspace(&connection).unwrap(), &before);
    }

    /// A reorder followed by its inverse restores the original order.
    #[test]
    fn reorder_then_inverse_restores_order(count in 2usize..8, from in 0usize..8, to in 0usize..8) {
        let (mut manager, connection, root, tabs) = pane_with_tabs(count);
        let (from, to) = (from % count, to % count);
        prop_assume!(from != to);

        manager.reorder_tabs(&connection, root, from, to).unwrap();
        let moved = order(&manager, &connection, root);
        prop_assert_eq!(moved[to], tabs[from]);

        manager.reorder_tabs(&connection, root, to, from).unwrap();
        prop_assert_eq!(order(&manager, &connection, root), tabs);
    }

    /// Reordering keeps the relative order of the untouched tabs.
    #[test]
    fn reorder_keeps_other_tabs_in_order(count in 2usize..8, from in 0usize..8, to in 0usize..8) {
        let (mut manager, connection, root, tabs) = pane_with_tabs(count);
        let (from, to) = (from % count, to % count);
        prop_assume!(from != to);

        manager.reorder_tabs(&connection, root, from, to).unwrap();
        let others: Vec<TabId> = order(&manager, &connection, root)
            .into_iter()
            .filter(|id| *id != tabs[from])
            .collect();
        let expected: Vec<TabId> = tabs.iter().copied().filter(|id| *id != tabs[from]).collect();
        prop_assert_eq!(others, expected);
    }

    /// Out-of-range indices are rejected with the offending index.
    #[test]
    fn reorder_rejects_out_of_range(count in 1usize..6, past in 0usize..4) {
        let (mut manager, connection, root, _) = pane_with_tabs(count);
        let result = manager.reorder_tabs(&connection, root, 0, count + past);
        prop_assert!(matches!(
            result,
            Err(LayoutError::InvalidTabIndex { index, len }) if index == count + past && len == count
        ), "unexpected result: {:?}", result);
    }

    /// Wherever a tab is dropped, it ends up active in the pane that
    /// received it, and that pane becomes the active pane.
    #[test]
    fn dropped_tab_is_focused(count in 2usize..6, pick in 0usize..6, zone in zone_strategy()) {
        let (mut manager, connection, root, tabs) = pane_with_tabs(count);
        let outcome = manager
            .split_pane(&connection, root, SplitDirection::Horizontal, Some(tabs[count - 1]))
            .unwrap();
        let source_tabs = &tabs[..count - 1];
        let tab = source_tabs[pick % source_tabs.len()];

        let target = manager
            .move_tab(&connection, root, tab, outcome.new_pane_id, zone)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        if zone == DropZone::Center {
            prop_assert_eq!(target, outcome.new_pane_id);
        }

        let forest = manager.workspace(&connection).unwrap();
        let leaf = forest.leaf(target).unwrap();
        prop_assert_eq!(leaf.active_tab_id, Some(tab));
        prop_assert_eq!(forest.active_pane_id(), target);
        prop_assert_eq!(tab_ids(forest).len(), count);
    }
}
