//! Check command: validates a layout file without repairing it.

use std::path::Path;

use panegrid_core::{LAYOUT_STATE_VERSION, LayoutSettings, PersistError, PersistedLayout};

use crate::error::CliError;
use crate::util::{layout_path, read_layout};

/// Check command handler
pub fn cmd_check(settings: &LayoutSettings, file: Option<&Path>) -> Result<(), CliError> {
    let path = layout_path(file, settings);
    let text = read_layout(&path)?;
    let results = check_text(&text)?;

    let mut failures = 0usize;
    for (connection, result) in &results {
        match result {
            Ok(()) => println!("{connection}: ok"),
            Err(violation) => {
                failures += 1;
                println!("{connection}: {violation}");
            }
        }
    }

    if failures > 0 {
        return Err(CliError::InvalidLayout(format!(
            "{failures} of {} workspaces failed validation",
            results.len()
        )));
    }
    println!("{} workspaces ok", results.len());
    Ok(())
}

/// Parses `text` strictly and reports each workspace as ok or with its
/// first violation.
fn check_text(text: &str) -> Result<Vec<(String, Result<(), String>)>, CliError> {
    let layout = PersistedLayout::from_json(text).map_err(|e| match e {
        PersistError::Deserialization(msg) => CliError::InvalidLayout(msg),
        other => other.into(),
    })?;
    if layout.version > LAYOUT_STATE_VERSION {
        return Err(CliError::InvalidLayout(format!(
            "version {} is newer than supported version {LAYOUT_STATE_VERSION}",
            layout.version
        )));
    }
    Ok(layout
        .validate()
        .into_iter()
        .map(|(connection, result)| (connection.to_string(), result.map_err(|v| v.to_string())))
        .collect())
}
