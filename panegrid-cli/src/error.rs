//! CLI error types and exit codes.

use std::path::PathBuf;

use panegrid_core::{ConfigError, PersistError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - settings, I/O or unreadable input
    pub const GENERAL_ERROR: i32 = 1;
    /// The layout file breaks a structural invariant
    pub const INVALID_LAYOUT: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading, parsing or writing a layout failed
    #[error("Layout error: {0}")]
    Persist(#[from] PersistError),

    /// No layout file at the given path
    #[error("Layout file not found: {}", .0.display())]
    LayoutNotFound(PathBuf),

    /// The layout file is not valid
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Requested connection is not in the layout
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (settings, I/O, parse)
    /// - 2: Invalid layout (`check` found a violation)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidLayout(_) => exit_codes::INVALID_LAYOUT,
            Self::Config(_)
            | Self::Persist(_)
            | Self::LayoutNotFound(_)
            | Self::ConnectionNotFound(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
