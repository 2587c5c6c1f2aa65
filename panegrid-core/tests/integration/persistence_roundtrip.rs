//! Persistence round-trips through `JsonFileStore`

use std::path::Path;

use panegrid_core::{
    BasicTabRegistry, ConnectionId, JsonFileStore, LAYOUT_STATE_VERSION, LayoutManager,
    LayoutSettings, MigrationOptions, PersistedLayout, SplitDirection, TabKind, TabOptions,
};

fn manager_at(path: &Path) -> LayoutManager {
    LayoutManager::new(BasicTabRegistry::new()).with_store(JsonFileStore::new(path))
}

#[test]
fn mutations_are_persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("layout.json");
    let conn = ConnectionId::new("pg-prod");

    let mut manager = manager_at(&path);
    manager.initialize_layout(&conn);
    let root = manager.workspace(&conn).unwrap().root_id();
    manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
    let moved = manager
        .create_tab(&conn, root, "query".into(), TabOptions::new())
        .unwrap();
    let outcome = manager
        .split_pane(&conn, root, SplitDirection::Vertical, Some(moved))
        .unwrap();
    manager.resize_pane(&conn, outcome.split_id, 0.3).unwrap();
    assert!(!path.exists());
    assert!(manager.flush().unwrap());
    assert!(path.exists());

    let mut reloaded = manager_at(&path);
    let report = reloaded.load();
    assert_eq!(report.from_version, LAYOUT_STATE_VERSION);
    assert_eq!(report.repairs, 0);

    let original = manager.workspace(&conn).unwrap();
    let restored = reloaded.workspace(&conn).unwrap();
    assert_eq!(restored.root_id(), original.root_id());
    assert_eq!(restored.active_pane_id(), outcome.new_pane_id);
    assert_eq!(restored.panes(), original.panes());
}

#[test]
fn terminals_do_not_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let conn = ConnectionId::new("pg");

    let mut manager = manager_at(&path);
    manager.initialize_layout(&conn);
    let root = manager.workspace(&conn).unwrap().root_id();
    let query = manager
        .create_tab(&conn, root, TabKind::QUERY.into(), TabOptions::new())
        .unwrap();
    manager
        .create_tab(&conn, root, TabKind::TERMINAL.into(), TabOptions::new())
        .unwrap();
    drop(manager);

    let mut reloaded = manager_at(&path);
    let report = reloaded.load();
    assert_eq!(report.stripped_tabs, 1);
    let leaf = reloaded.workspace(&conn).unwrap().leaf(root).unwrap();
    assert_eq!(leaf.tabs.len(), 1);
    assert_eq!(leaf.active_tab_id, Some(query));

    let mut keep_all = manager_at(&path).with_migration_options(MigrationOptions::keep_all());
    assert_eq!(keep_all.load().stripped_tabs, 0);
    assert_eq!(keep_all.workspace(&conn).unwrap().tab_count(), 2);
}

#[test]
fn unreadable_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let mut manager = manager_at(&path);
    let report = manager.load();
    assert_eq!(report.repairs, 0);
    assert_eq!(manager.connections().count(), 0);

    manager.initialize_layout(&ConnectionId::new("pg"));
    drop(manager);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ truncated");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("layout.json.bak")).unwrap(),
        "{ truncated"
    );
}

#[test]
fn legacy_document_is_upgraded_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(
        &path,
        r#"{
            "rootPaneId": { "pg": "6f1c1f0e-0000-4000-8000-000000000001" },
            "panes": { "pg": {
                "6f1c1f0e-0000-4000-8000-000000000001": {
                    "kind": "split",
                    "id": "6f1c1f0e-0000-4000-8000-000000000001",
                    "direction": "horizontal",
                    "first": "6f1c1f0e-0000-4000-8000-000000000002",
                    "second": "6f1c1f0e-0000-4000-8000-000000000099",
                    "ratio": 1.5
                },
                "6f1c1f0e-0000-4000-8000-000000000002": {
                    "kind": "leaf",
                    "id": "6f1c1f0e-0000-4000-8000-000000000002",
                    "tabs": [{ "id": "6f1c1f0e-0000-4000-8000-00000000000a", "type": "query", "title": "Q" }]
                }
            } }
        }"#,
    )
    .unwrap();

    let mut manager = manager_at(&path);
    let report = manager.load();
    assert_eq!(report.from_version, 0);
    assert!(report.repairs > 0);
    manager.save().unwrap();

    let saved = PersistedLayout::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.version, LAYOUT_STATE_VERSION);
    assert!(saved.saved_at.is_some());
    assert!(saved.validate().iter().all(|(_, result)| result.is_ok()));
    let conn = ConnectionId::new("pg");
    let forest = manager.workspace(&conn).unwrap();
    assert_eq!(forest.pane_count(), 1);
    assert_eq!(forest.tab_count(), 1);
}

#[test]
fn settings_disable_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("layout.json");
    let settings = LayoutSettings::from_toml_str(&format!(
        "persist = false\nstate_file = {:?}\n",
        state.display().to_string()
    ))
    .unwrap();

    let conn = ConnectionId::new("pg");
    let mut manager = LayoutManager::from_settings(&settings, BasicTabRegistry::new());
    manager.initialize_layout(&conn);
    let root = manager.workspace(&conn).unwrap().root_id();
    manager.create_tab(&conn, root, "query".into(), TabOptions::new()).unwrap();
    assert!(!manager.flush().unwrap());
    drop(manager);
    assert!(!state.exists());
}
