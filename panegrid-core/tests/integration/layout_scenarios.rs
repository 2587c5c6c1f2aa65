//! End-to-end layout scenarios driven through `LayoutManager`

use std::cell::RefCell;
use std::rc::Rc;

use panegrid_core::{
    ConnectionId, DataTarget, DropZone, LayoutManager, PaneId, SplitDirection, Tab, TabKind,
    TabOptions, TabRegistry,
};

/// Records lifecycle hooks by tab title.
#[derive(Clone, Default)]
struct HookLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl HookLog {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

impl TabRegistry for HookLog {
    fn default_title(
        &self,
        kind: &TabKind,
        existing_count: usize,
        _metadata: Option<&serde_json::Value>,
    ) -> String {
        format!("{kind}-{}", existing_count + 1)
    }

    fn on_create(&self, tab: &Tab) {
        self.calls.borrow_mut().push(format!("create {}", tab.title));
    }

    fn on_close(&self, tab: &Tab) {
        self.calls.borrow_mut().push(format!("close {}", tab.title));
    }

    fn on_activate(&self, tab: &Tab) {
        self.calls.borrow_mut().push(format!("activate {}", tab.title));
    }

    fn on_deactivate(&self, tab: &Tab) {
        self.calls.borrow_mut().push(format!("deactivate {}", tab.title));
    }
}

fn setup() -> (LayoutManager, HookLog, ConnectionId, PaneId) {
    let log = HookLog::default();
    let connection = ConnectionId::new("analytics");
    let mut manager = LayoutManager::new(log.clone());
    assert!(manager.initialize_layout(&connection));
    let root = manager.workspace(&connection).unwrap().root_id();
    (manager, log, connection, root)
}

fn titled(title: &str) -> TabOptions {
    TabOptions::new().with_title(title)
}

#[test]
fn split_with_moved_tab() {
    let (mut manager, _, conn, root) = setup();
    let a = manager.create_tab(&conn, root, "query".into(), titled("A")).unwrap();
    let b = manager
        .create_tab(&conn, root, "query".into(), titled("B").inactive())
        .unwrap();
    assert_eq!(
        manager.workspace(&conn).unwrap().leaf(root).unwrap().active_tab_id,
        Some(a)
    );

    let outcome = manager
        .split_pane(&conn, root, SplitDirection::Horizontal, Some(b))
        .unwrap();

    let forest = manager.workspace(&conn).unwrap();
    assert_eq!(forest.root_id(), outcome.split_id);
    let split = forest.split(outcome.split_id).unwrap();
    assert_eq!(split.direction, SplitDirection::Horizontal);
    assert!((split.ratio - 0.5).abs() < f64::EPSILON);
    assert_eq!(split.children(), [root, outcome.new_pane_id]);

    let left = forest.leaf(root).unwrap();
    assert_eq!(left.tabs.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a]);
    assert_eq!(left.active_tab_id, Some(a));
    let right = forest.leaf(outcome.new_pane_id).unwrap();
    assert_eq!(right.tabs.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b]);
    assert_eq!(right.active_tab_id, Some(b));
}

#[test]
fn closing_last_tab_collapses_pane() {
    let (mut manager, log, conn, root) = setup();
    let x = manager.create_tab(&conn, root, "query".into(), titled("X")).unwrap();
    let y = manager.create_tab(&conn, root, "query".into(), titled("Y")).unwrap();
    let l2 = manager
        .split_pane(&conn, root, SplitDirection::Vertical, Some(y))
        .unwrap()
        .new_pane_id;
    log.take();

    manager.close_tab(&conn, root, x).unwrap();

    let forest = manager.workspace(&conn).unwrap();
    assert_eq!(forest.pane_count(), 1);
    assert_eq!(forest.root_id(), l2);
    let only = forest.leaf(l2).unwrap();
    assert_eq!(only.tabs.len(), 1);
    assert_eq!(only.active_tab_id, Some(y));
    assert_eq!(forest.active_pane_id(), l2);
    assert_eq!(log.take(), vec!["close X"]);
}

#[test]
fn left_drop_onto_other_pane() {
    let (mut manager, _, conn, l1) = setup();
    let t = manager.create_tab(&conn, l1, "query".into(), titled("T")).unwrap();
    manager.create_tab(&conn, l1, "query".into(), titled("U")).unwrap();
    let v = manager.create_tab(&conn, l1, "query".into(), titled("V")).unwrap();
    let l2 = manager
        .split_pane(&conn, l1, SplitDirection::Horizontal, Some(v))
        .unwrap()
        .new_pane_id;

    let new_pane = manager.move_tab(&conn, l1, t, l2, DropZone::Left).unwrap();

    let forest = manager.workspace(&conn).unwrap();
    let parent = forest.parent_of(l2).unwrap();
    let split = forest.split(parent).unwrap();
    assert_eq!(split.direction, SplitDirection::Horizontal);
    assert_eq!(split.children(), [new_pane, l2]);
    assert_eq!(forest.leaf(new_pane).unwrap().tabs[0].id, t);
    assert!(!forest.leaf(l1).unwrap().contains_tab(t));
    assert_eq!(forest.active_pane_id(), new_pane);
    assert_eq!(forest.tab_count(), 3);
    assert!(forest.validate().is_ok());
}

#[test]
fn hooks_run_after_each_transition() {
    let (mut manager, log, conn, root) = setup();
    let first = manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
    manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
    assert_eq!(
        log.take(),
        vec![
            "create query-1",
            "activate query-1",
            "create query-2",
            "deactivate query-1",
            "activate query-2",
        ]
    );

    manager.set_active_tab(&conn, root, first).unwrap();
    assert_eq!(log.take(), vec!["deactivate query-2", "activate query-1"]);

    // Rejected operations fire nothing.
    assert!(manager.close_pane(&conn, root).is_err());
    assert!(log.take().is_empty());
}

#[test]
fn open_data_tab_reuses_existing() {
    let (mut manager, _, conn, root) = setup();
    let users = DataTarget::new("users").with_schema("public");

    let opened = manager.open_data_tab(&conn, &users).unwrap();
    assert!(opened.created);
    assert_eq!(opened.pane_id, root);

    manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
    let again = manager.open_data_tab(&conn, &users).unwrap();
    assert!(!again.created);
    assert_eq!(again.tab_id, opened.tab_id);

    let forest = manager.workspace(&conn).unwrap();
    assert_eq!(forest.tab_count(), 2);
    assert_eq!(forest.leaf(root).unwrap().active_tab_id, Some(opened.tab_id));
}

#[test]
fn clear_layout_closes_every_tab() {
    let (mut manager, log, conn, root) = setup();
    manager.create_tab(&conn, root, "query".into(), titled("Q")).unwrap();
    manager.create_tab(&conn, root, "terminal".into(), titled("Shell")).unwrap();
    log.take();

    assert!(manager.clear_layout(&conn));
    assert!(manager.workspace(&conn).is_none());
    let mut calls = log.take();
    calls.sort();
    assert_eq!(calls, vec!["close Q", "close Shell"]);
    assert!(!manager.clear_layout(&conn));
}
