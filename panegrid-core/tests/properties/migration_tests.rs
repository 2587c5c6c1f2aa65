//! Property-based tests for layout persistence and migration

use panegrid_core::{MigrationOptions, PersistedLayout, TabKind, decode_layout};
use proptest::prelude::*;

use super::{build, ops_strategy, tab_ids};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A saved workspace loads back unchanged when nothing is stripped.
    #[test]
    fn valid_layout_round_trips(ops in ops_strategy(30)) {
        let (manager, connection) = build(&ops);
        let text = manager.snapshot().to_json().unwrap();

        let (layout, report) = decode_layout(&text, &MigrationOptions::keep_all()).unwrap();
        prop_assert_eq!(report.repairs, 0);
        prop_assert_eq!(report.stripped_tabs, 0);

        let workspaces = layout.into_workspaces();
        let original = manager.workspace(&connection).unwrap();
        let loaded = &workspaces[&connection];
        prop_assert_eq!(loaded.root_id(), original.root_id());
        prop_assert_eq!(loaded.active_pane_id(), original.active_pane_id());
        prop_assert_eq!(loaded.panes(), original.panes());
    }

    /// Stripping volatile tabs removes exactly those tabs and nothing else.
    #[test]
    fn volatile_tabs_are_stripped(ops in ops_strategy(30)) {
        let (manager, connection) = build(&ops);
        let original = manager.workspace(&connection).unwrap();
        let terminals = original
            .leaf_panes()
            .iter()
            .flat_map(|leaf| leaf.tabs.iter())
            .filter(|tab| tab.kind.is(TabKind::TERMINAL))
            .count();
        let text = manager.snapshot().to_json().unwrap();

        let (layout, report) = decode_layout(&text, &MigrationOptions::default()).unwrap();
        prop_assert_eq!(report.stripped_tabs, terminals);

        let workspaces = layout.into_workspaces();
        let loaded = &workspaces[&connection];
        prop_assert!(loaded.validate().is_ok());
        prop_assert_eq!(tab_ids(loaded).len(), tab_ids(original).len() - terminals);
        prop_assert_eq!(loaded.pane_count(), original.pane_count());
    }

    /// Deleting arbitrary panes from a saved document still loads into a
    /// valid workspace.
    #[test]
    fn damaged_layout_loads_valid(ops in ops_strategy(30), drop_mask in any::<u64>()) {
        let (manager, connection) = build(&ops);
        let mut snapshot = manager.snapshot();
        if let Some(panes) = snapshot.panes.get_mut(&connection) {
            let ids: Vec<_> = panes.keys().copied().collect();
            for (bit, id) in ids.into_iter().enumerate() {
                if drop_mask & (1 << (bit % 64)) != 0 {
                    panes.remove(&id);
                }
            }
        }
        let text = snapshot.to_json().unwrap();

        let (layout, _) = decode_layout(&text, &MigrationOptions::keep_all()).unwrap();
        let results = layout.validate();
        prop_assert_eq!(results.len(), 1);
        prop_assert!(results[0].1.is_ok(), "{:?}", results[0].1);

        let reloaded = PersistedLayout::from_json(&layout.to_json().unwrap()).unwrap();
        prop_assert!(reloaded.validate().iter().all(|(_, r)| r.is_ok()));
    }
}
