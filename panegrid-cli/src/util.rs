//! Shared utility functions used across command modules.

use std::path::{Path, PathBuf};

use panegrid_core::{JsonFileStore, LayoutSettings, LayoutStore};

use crate::error::CliError;

/// Loads settings from `--config`, or from the default location.
///
/// A missing file yields defaults.
pub fn load_settings(config_path: Option<&Path>) -> Result<LayoutSettings, CliError> {
    match config_path
        .map(Path::to_path_buf)
        .or_else(LayoutSettings::default_path)
    {
        Some(path) => Ok(LayoutSettings::load(&path)?),
        None => Ok(LayoutSettings::default()),
    }
}

/// Returns the layout file argument, or the configured state file.
pub fn layout_path(file: Option<&Path>, settings: &LayoutSettings) -> PathBuf {
    file.map_or_else(|| settings.resolved_state_file(), Path::to_path_buf)
}

/// Reads a layout file as text.
pub fn read_layout(path: &Path) -> Result<String, CliError> {
    JsonFileStore::new(path)
        .load()?
        .ok_or_else(|| CliError::LayoutNotFound(path.to_path_buf()))
}

/// Shortens a UUID-backed ID to its first eight hex digits.
pub fn short_id(id: impl std::fmt::Display) -> String {
    let full = id.to_string();
    let inner = full
        .split_once('(')
        .map_or(full.as_str(), |(_, rest)| rest.trim_end_matches(')'));
    inner.chars().take(8).collect()
}
