//! Layout settings
//!
//! Stored as TOML. Every field has a default, so a missing file or a
//! partial file both load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persistence::MigrationOptions;
use crate::tracing::{TracingConfig, TracingLevel};

/// Directory name under the platform data directory
pub const APP_DIR_NAME: &str = "panegrid";

/// Default layout file name
pub const STATE_FILE_NAME: &str = "layout.json";

/// Tab kinds stripped on load unless configured otherwise
pub const DEFAULT_VOLATILE_TAB_TYPES: &[&str] = &["terminal"];

/// Settings for the layout manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Whether layout changes are written back to disk (default: true)
    #[serde(default = "default_true")]
    pub persist: bool,
    /// Layout file; `None` means the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// Tab kinds whose backing resource does not survive a restart
    #[serde(default = "default_volatile_tab_types")]
    pub volatile_tab_types: Vec<String>,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (default: info)
    #[serde(default)]
    pub level: TracingLevel,
    /// Full filter directive, overrides `level`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn default_volatile_tab_types() -> Vec<String> {
    DEFAULT_VOLATILE_TAB_TYPES
        .iter()
        .map(|kind| (*kind).to_owned())
        .collect()
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            persist: true,
            state_file: None,
            volatile_tab_types: default_volatile_tab_types(),
            logging: LoggingSettings::default(),
        }
    }
}

impl LayoutSettings {
    /// Loads settings from a TOML file, returning defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid settings TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Renders the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns the default settings file location, if the platform has a
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("settings.toml"))
    }

    /// Returns the layout file to use.
    ///
    /// Falls back to `layout.json` in the platform data directory, or in
    /// the working directory when the platform has none.
    #[must_use]
    pub fn resolved_state_file(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(
                || PathBuf::from(STATE_FILE_NAME),
                |dir| dir.join(APP_DIR_NAME).join(STATE_FILE_NAME),
            )
        })
    }

    /// Builds the tracing configuration from the `[logging]` table.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::new().with_level(self.logging.level);
        match &self.logging.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }

    /// Builds migration options from the volatile tab list.
    #[must_use]
    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions::new(self.volatile_tab_types.iter().map(String::as_str))
    }
}
