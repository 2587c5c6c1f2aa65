//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// `panegrid` layout file tools
#[derive(Parser)]
#[command(name = "panegrid-cli")]
#[command(author, version, about = "Inspect, check and migrate panegrid layout files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, env = "PANEGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the workspaces of a layout file
    #[command(about = "Print each workspace's pane tree as it would load")]
    Show {
        /// Layout file (defaults to the configured state file)
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "tree", value_enum)]
        format: OutputFormat,

        /// Only show this connection
        #[arg(long)]
        connection: Option<String>,
    },

    /// Validate a layout file without repairing it
    #[command(about = "Check every workspace against the tree invariants")]
    Check {
        /// Layout file (defaults to the configured state file)
        file: Option<PathBuf>,
    },

    /// Migrate and repair a layout file
    #[command(about = "Rewrite a layout file at the current schema version")]
    Migrate {
        /// Layout file (defaults to the configured state file)
        file: Option<PathBuf>,

        /// Write here instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep volatile tabs instead of stripping them
        #[arg(long)]
        keep_volatile: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree
    Tree,
    /// Migrated layout document
    Json,
}
