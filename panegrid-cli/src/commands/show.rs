//! Show command: prints each workspace as it would load.

use std::fmt::Write as _;
use std::path::Path;

use panegrid_core::{
    ConnectionId, LayoutSettings, PaneId, PaneNode, PersistedLayout, WorkspaceForest,
    decode_layout,
};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{layout_path, read_layout, short_id};

/// Show command handler
pub fn cmd_show(
    settings: &LayoutSettings,
    file: Option<&Path>,
    format: OutputFormat,
    connection: Option<&str>,
) -> Result<(), CliError> {
    let path = layout_path(file, settings);
    let text = read_layout(&path)?;
    let (mut layout, report) = decode_layout(&text, &settings.migration_options())?;
    tracing::debug!(
        path = %path.display(),
        from_version = report.from_version,
        repairs = report.repairs,
        "Decoded layout"
    );

    if let Some(name) = connection {
        layout = only_connection(layout, name)?;
    }

    match format {
        OutputFormat::Json => println!("{}", layout.to_json()?),
        OutputFormat::Tree => {
            let workspaces = layout.into_workspaces();
            if workspaces.is_empty() {
                println!("No workspaces.");
                return Ok(());
            }
            for (connection, forest) in &workspaces {
                print!("{}", render_forest(connection, forest));
            }
        }
    }
    Ok(())
}

fn only_connection(layout: PersistedLayout, name: &str) -> Result<PersistedLayout, CliError> {
    let connection = ConnectionId::new(name);
    let mut workspaces = layout.into_workspaces();
    let forest = workspaces
        .remove(&connection)
        .ok_or_else(|| CliError::ConnectionNotFound(name.to_owned()))?;
    let mut filtered = PersistedLayout::default();
    filtered.insert(connection, &forest);
    Ok(filtered)
}

/// Renders a workspace as an indented tree.
///
/// Splits show their direction and ratio. Leaves list their tabs, with `*`
/// on the active one and `>` on the active pane.
pub fn render_forest(connection: &ConnectionId, forest: &WorkspaceForest) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{connection} ({} panes, {} tabs)",
        forest.pane_count(),
        forest.tab_count()
    );
    let mut stack = vec![(forest.root_id(), String::new(), true)];
    while let Some((pane_id, prefix, last)) = stack.pop() {
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        if let Some(PaneNode::Split(split)) = forest.pane(pane_id) {
            stack.push((split.second, child_prefix.clone(), true));
            stack.push((split.first, child_prefix.clone(), false));
        }
        render_node(forest, pane_id, &prefix, last, &child_prefix, &mut out);
    }
    out
}

/// Writes one node's line, plus its tabs for a leaf.
fn render_node(
    forest: &WorkspaceForest,
    pane_id: PaneId,
    prefix: &str,
    last: bool,
    child_prefix: &str,
    out: &mut String,
) {
    let branch = if last { "└── " } else { "├── " };
    match forest.pane(pane_id) {
        Some(PaneNode::Split(split)) => {
            let _ = writeln!(
                out,
                "{prefix}{branch}{} split {} ({:.2})",
                split.direction,
                short_id(split.id),
                split.ratio
            );
        }
        Some(PaneNode::Leaf(leaf)) => {
            let marker = if forest.active_pane_id() == leaf.id { ">" } else { " " };
            let _ = writeln!(
                out,
                "{prefix}{branch}{marker}leaf {} [{} tabs]",
                short_id(leaf.id),
                leaf.tabs.len()
            );
            for (index, tab) in leaf.tabs.iter().enumerate() {
                let tab_branch = if index + 1 == leaf.tabs.len() { "└── " } else { "├── " };
                let active = if leaf.active_tab_id == Some(tab.id) { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "{child_prefix}{tab_branch}{active}{} \"{}\"",
                    tab.kind, tab.title
                );
            }
        }
        None => {
            let _ = writeln!(out, "{prefix}{branch}<missing {}>", short_id(pane_id));
        }
    }
}
