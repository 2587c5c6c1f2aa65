//! Property-based tests for the pane tree
//!
//! Random operation sequences must keep the tree well formed, leave a
//! workspace untouched when they fail, and never drop below one pane.

use std::collections::{HashMap, HashSet};

use panegrid_core::layout::{MAX_SPLIT_RATIO, MIN_SPLIT_RATIO};
use panegrid_core::{DropZone, PaneId, PaneNode, SplitDirection, TabOptions, WorkspaceForest};
use proptest::prelude::*;

use super::{Op, apply, build, direction_strategy, fresh_manager, ops_strategy, tab_ids};

/// Checks reachability and single-parent ownership without going through
/// `validate`, so the two can't share a bug.
fn assert_tree_shape(forest: &WorkspaceForest) {
    let root = forest.root_id();
    assert!(forest.pane(root).is_some(), "root missing");

    let mut parents: HashMap<PaneId, usize> = HashMap::new();
    for node in forest.panes().values() {
        if let PaneNode::Split(split) = node {
            for child in split.children() {
                assert!(forest.pane(child).is_some(), "dangling child {child}");
                *parents.entry(child).or_default() += 1;
            }
        }
    }
    for id in forest.panes().keys() {
        let expected = usize::from(*id != root);
        assert_eq!(parents.get(id).copied().unwrap_or(0), expected, "{id}");
    }

    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        assert!(seen.insert(id), "cycle at {id}");
        if let Some(split) = forest.split(id) {
            stack.extend(split.children());
        }
    }
    assert_eq!(seen.len(), forest.pane_count(), "unreachable panes");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every sequence of operations keeps the tree invariant.
    #[test]
    fn tree_invariant_holds_for_any_sequence(ops in ops_strategy(40)) {
        let (mut manager, connection) = fresh_manager();
        for op in &ops {
            let _ = apply(&mut manager, &connection, op);
            let forest = manager.workspace(&connection).unwrap();
            prop_assert!(forest.validate().is_ok(), "{:?} after {:?}", forest.validate(), op);
            assert_tree_shape(forest);
            prop_assert!(forest.active_pane().is_some());
        }
    }

    /// A rejected operation leaves the workspace exactly as it was.
    #[test]
    fn failed_operations_change_nothing(ops in ops_strategy(40)) {
        let (mut manager, connection) = fresh_manager();
        for op in &ops {
            let before = manager.workspace(&connection).unwrap().clone();
            if let Some(Err(_)) = apply(&mut manager, &connection, op) {
                prop_assert_eq!(manager.workspace(&connection).unwrap(), &before);
            }
        }
    }

    /// The pane count never reaches zero, and closing every tab collapses
    /// the workspace into one empty leaf.
    #[test]
    fn sole_pane_floor(ops in ops_strategy(30)) {
        let (mut manager, connection) = build(&ops);
        prop_assert!(manager.workspace(&connection).unwrap().pane_count() >= 1);

        loop {
            let forest = manager.workspace(&connection).unwrap();
            let Some((pane, tab)) = forest
                .leaf_panes()
                .into_iter()
                .find_map(|leaf| leaf.tabs.first().map(|t| (leaf.id, t.id)))
            else {
                break;
            };
            manager.close_tab(&connection, pane, tab).unwrap();
            prop_assert!(manager.workspace(&connection).unwrap().pane_count() >= 1);
        }

        let forest = manager.workspace(&connection).unwrap();
        prop_assert_eq!(forest.tab_count(), 0);
        // Leaves that never held a tab are not closed automatically.
        prop_assert!(forest.leaf_panes().iter().all(|leaf| leaf.is_empty()));
    }

    /// A workspace that is a single pane survives closing its last tab.
    #[test]
    fn closing_last_tab_of_root_keeps_root(kind_count in 1usize..6) {
        let (mut manager, connection) = fresh_manager();
        let root = manager.workspace(&connection).unwrap().root_id();
        let mut tabs = Vec::new();
        for _ in 0..kind_count {
            tabs.push(manager.create_tab(&connection, root, "query".into(), TabOptions::new()).unwrap());
        }
        for tab in tabs {
            manager.close_tab(&connection, root, tab).unwrap();
        }
        let forest = manager.workspace(&connection).unwrap();
        prop_assert_eq!(forest.pane_count(), 1);
        prop_assert_eq!(forest.root_id(), root);
        prop_assert!(forest.leaf(root).unwrap().is_empty());
    }

    /// Resizing stores the requested ratio clamped to the allowed range.
    #[test]
    fn ratio_is_clamped(ratio in -1.0e6f64..1.0e6, direction in direction_strategy()) {
        let mut forest = WorkspaceForest::new();
        let outcome = forest.split_pane(forest.root_id(), direction, None).unwrap();
        let stored = forest.resize_pane(outcome.split_id, ratio).unwrap();
        prop_assert_eq!(stored, ratio.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO));
        prop_assert_eq!(forest.split(outcome.split_id).unwrap().ratio, stored);
    }

    /// Splits and center moves keep the same set of tabs.
    #[test]
    fn split_and_center_move_conserve_tabs(
        setup in ops_strategy(20),
        moves in proptest::collection::vec(
            (0usize..8, 0usize..8, 0usize..8, direction_strategy(), any::<bool>()),
            0..20,
        ),
    ) {
        let (mut manager, connection) = build(&setup);
        let mut expected = tab_ids(manager.workspace(&connection).unwrap());
        expected.sort();

        for (from, tab, to, direction, split) in moves {
            let op = if split {
                Op::Split { pane: from, direction, move_tab: Some(tab) }
            } else {
                Op::Move { from, tab, to, zone: DropZone::Center }
            };
            let _ = apply(&mut manager, &connection, &op);

            let mut actual = tab_ids(manager.workspace(&connection).unwrap());
            actual.sort();
            prop_assert_eq!(&actual, &expected);
        }
    }
}

#[test]
fn split_direction_follows_request() {
    let mut forest = WorkspaceForest::new();
    let root = forest.root_id();
    let outcome = forest
        .split_pane(root, SplitDirection::Vertical, None)
        .unwrap();
    let split = forest.split(outcome.split_id).unwrap();
    assert_eq!(split.direction, SplitDirection::Vertical);
    assert_eq!(split.children(), [root, outcome.new_pane_id]);
    assert_eq!(forest.root_id(), outcome.split_id);
}
