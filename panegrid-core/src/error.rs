//! Error types for settings and persistence
//!
//! Layout mutations report [`LayoutError`](crate::layout::LayoutError);
//! everything that touches disk reports one of the types below.
//! [`PaneGridError`] wraps them all for callers that do not care which
//! layer failed.

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::{InvariantViolation, LayoutError};

/// Errors loading the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid settings TOML
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be rendered as TOML
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors reading or writing the persisted layout
#[derive(Debug, Error)]
pub enum PersistError {
    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File that was accessed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The layout could not be serialized
    #[error("Failed to serialize layout: {0}")]
    Serialization(String),

    /// The stored text is not a layout document
    #[error("Failed to parse layout: {0}")]
    Deserialization(String),

    /// The document was written by a newer schema
    #[error("Unsupported layout version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u64,
        /// Newest version this build reads
        supported: u64,
    },
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Umbrella error for the whole crate
#[derive(Debug, Error)]
pub enum PaneGridError {
    /// Settings error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persistence error
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Rejected layout operation
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Stored layout breaks a structural invariant
    #[error("Invalid layout for {connection}: {violation}")]
    Invalid {
        /// Workspace whose forest is broken
        connection: String,
        /// First violation found
        violation: InvariantViolation,
    },
}
