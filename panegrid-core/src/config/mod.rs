//! Configuration for `panegrid`
//!
//! This module provides [`LayoutSettings`], loaded from a TOML file.

pub mod settings;

pub use settings::{
    APP_DIR_NAME, DEFAULT_VOLATILE_TAB_TYPES, LayoutSettings, LoggingSettings, STATE_FILE_NAME,
};
