//! `panegrid` CLI - inspect, check and migrate layout files

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use panegrid_core::{TracingLevel, init_tracing};

use crate::cli::Cli;
use crate::error::exit_codes;

fn main() {
    let cli = Cli::parse();

    let settings = match util::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(exit_codes::GENERAL_ERROR);
        }
    };

    // Command-line flags win over the settings file's filter.
    let tracing_config = if cli.quiet {
        settings.tracing_config().without_filter().with_level(TracingLevel::Error)
    } else if cli.verbose > 0 {
        settings
            .tracing_config()
            .without_filter()
            .with_level(TracingLevel::from_verbosity(cli.verbose))
    } else {
        settings.tracing_config()
    };
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    if let Err(e) = commands::dispatch(&settings, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
