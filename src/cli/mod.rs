//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand
//! and returns the process exit code.

mod align;
mod ids;
mod rebase;
mod scripts;
mod widgets;

pub use align::{run_align, AlignKind};
pub use ids::run_id_update;
pub use rebase::run_rebase;
pub use scripts::run_script_update;
pub use widgets::run_widget_update;

use crate::config::AppConfig;
use crate::pipeline::{BatchSummary, DirectorySnapshot, Journal};
use anyhow::{Context, Result};
use std::path::Path;

/// Open the old and new snapshot roots.
fn open_snapshots(old: &Path, new: &Path) -> Result<(DirectorySnapshot, DirectorySnapshot)> {
    let old = DirectorySnapshot::open(old).context("opening old snapshot")?;
    let new = DirectorySnapshot::open(new).context("opening new snapshot")?;
    Ok((old, new))
}

/// Print a batch summary, write the journal, and pick the exit code.
fn finish(summary: &BatchSummary, journal: &Journal, config: &AppConfig) -> Result<i32> {
    print!("{}", summary.render(config.output.format));

    if let Some(path) = &config.output.journal {
        if config.pipeline.dry_run {
            tracing::info!("Dry run; not writing {}", path.display());
        } else if journal
            .write_to(path)
            .with_context(|| format!("writing journal {}", path.display()))?
        {
            tracing::info!("Journal written to {}", path.display());
        }
    }

    Ok(summary.exit_code())
}
