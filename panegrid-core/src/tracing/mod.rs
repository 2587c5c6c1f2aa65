//! Structured logging setup
//!
//! The library itself only emits `tracing` events and spans. Binaries call
//! [`init_tracing`] once at startup to install a `tracing-subscriber`
//! formatter with an `EnvFilter`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Set by the first [`init_tracing`] call.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Why the subscriber could not be installed
#[derive(Debug, Error)]
pub enum TracingError {
    /// The filter directive could not be parsed
    #[error("Invalid filter directive: {0}")]
    InvalidFilter(String),

    /// Another global subscriber is already set
    #[error("Could not install subscriber: {0}")]
    InitializationFailed(String),

    /// `init_tracing` was called before
    #[error("Logging is already set up")]
    AlreadyInitialized,

    /// Failed to open the log file
    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Result of [`init_tracing`]
pub type TracingResult<T> = Result<T, TracingError>;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Errors, warnings and info (default)
    #[default]
    Info,
    /// Everything above plus debug events
    Debug,
    /// All events
    Trace,
}

impl TracingLevel {
    const ALL: [Self; 5] = [Self::Error, Self::Warn, Self::Info, Self::Debug, Self::Trace];

    /// Returns the lowercase name used in filter directives
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Maps a `-v` count to a level, starting from `Warn`.
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("warning") {
            return Ok(Self::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
    /// Append to a file (no ANSI colors)
    File(PathBuf),
}

/// Configuration for [`init_tracing`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TracingConfig {
    /// Level applied to the `panegrid` targets
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Full `EnvFilter` directive; overrides `level` when set
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Info level to stderr
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level for the `panegrid` crates
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Where lines go
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Replaces the per-crate directive with `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Drops a custom filter so that `level` applies again.
    #[must_use]
    pub fn without_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    /// Returns the filter directive this configuration installs.
    #[must_use]
    pub fn directive(&self) -> String {
        self.filter
            .clone()
            .unwrap_or_else(|| format!("panegrid_core={0},panegrid_cli={0}", self.level))
    }
}

/// Installs the global subscriber. Only the first call can succeed.
///
/// # Errors
///
/// `AlreadyInitialized` on a second call, `InvalidFilter` for a bad
/// directive, `LogFile` if the log file cannot be opened, and
/// `InitializationFailed` if some other subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_new(config.directive())
        .map_err(|e| TracingError::InvalidFilter(e.to_string()))?;
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    let installed = match &config.output {
        TracingOutput::Stdout => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_writer(std::io::stdout))
            .try_init(),
        TracingOutput::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_writer(std::io::stderr))
            .try_init(),
        TracingOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TracingError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(false).with_writer(file))
                .try_init()
        }
    };
    installed.map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, "Tracing initialized");
    Ok(())
}

/// Opens an info-level span named by one of [`span_names`]
///
/// # Examples
///
/// ```
/// use panegrid_core::trace_operation;
/// use panegrid_core::tracing::span_names;
///
/// let span = trace_operation!(span_names::LAYOUT_LOAD, stores = 1);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        ::tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        ::tracing::info_span!($name, $($field)*)
    };
}

/// Span names used by the manager and persistence layer
pub mod span_names {
    /// Layout mutation span
    pub const LAYOUT_MUTATE: &str = "layout.mutate";
    /// Layout load span
    pub const LAYOUT_LOAD: &str = "layout.load";
    /// Layout save span
    pub const LAYOUT_SAVE: &str = "layout.save";
    /// Layout migration span
    pub const LAYOUT_MIGRATE: &str = "layout.migrate";
}
