//! Command handlers for the CLI.

mod check;
mod migrate;
mod show;

pub use check::cmd_check;
pub use migrate::cmd_migrate;
pub use show::{cmd_show, render_forest};

use panegrid_core::LayoutSettings;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatches a parsed command to its handler.
pub fn dispatch(settings: &LayoutSettings, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Show {
            file,
            format,
            connection,
        } => cmd_show(settings, file.as_deref(), format, connection.as_deref()),
        Commands::Check { file } => cmd_check(settings, file.as_deref()),
        Commands::Migrate {
            file,
            output,
            keep_volatile,
            dry_run,
        } => cmd_migrate(
            settings,
            file.as_deref(),
            output.as_deref(),
            keep_volatile,
            dry_run,
        ),
    }
}
