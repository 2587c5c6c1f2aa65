//! Migrate command: rewrites a layout file at the current version.

use std::path::Path;

use panegrid_core::{
    JsonFileStore, LAYOUT_STATE_VERSION, LayoutSettings, LayoutStore, MigrationOptions,
    MigrationReport, decode_layout,
};

use crate::error::CliError;
use crate::util::{layout_path, read_layout};

/// Migrate command handler
pub fn cmd_migrate(
    settings: &LayoutSettings,
    file: Option<&Path>,
    output: Option<&Path>,
    keep_volatile: bool,
    dry_run: bool,
) -> Result<(), CliError> {
    let input = layout_path(file, settings);
    let options = if keep_volatile {
        MigrationOptions::keep_all()
    } else {
        settings.migration_options()
    };
    let target = output.unwrap_or(&input);

    let report = migrate_file(&input, target, &options, dry_run)?;
    print_report(&report);
    if dry_run {
        println!("Dry run: nothing written.");
    } else {
        println!("Wrote {}", target.display());
    }
    Ok(())
}

/// Migrates `input` and writes the result to `target` unless `dry_run`.
fn migrate_file(
    input: &Path,
    target: &Path,
    options: &MigrationOptions,
    dry_run: bool,
) -> Result<MigrationReport, CliError> {
    let text = read_layout(input)?;
    let (layout, report) = decode_layout(&text, options)?;
    if !dry_run {
        JsonFileStore::new(target).save(&layout.to_json()?)?;
        tracing::info!(path = %target.display(), "Migrated layout written");
    }
    Ok(report)
}

fn print_report(report: &MigrationReport) {
    println!(
        "Version:        {} -> {LAYOUT_STATE_VERSION}",
        report.from_version
    );
    println!("Stripped tabs:  {}", report.stripped_tabs);
    println!("Repairs:        {}", report.repairs);
}
