//! Flat ID-table batch: follow constants naming definition rows.

use super::{write_output, BatchSummary, Journal, SnapshotSource};
use crate::config::AppConfig;
use crate::error::UpdaterError;
use crate::idmap::remap_record_ids;
use crate::model::ConstantsFile;
use anyhow::Context as _;
use std::path::Path;
use tracing::info;

/// Rewrite the ids in `constants` that name rows of `table`.
pub fn run_ids(
    constants: &Path,
    table: &str,
    old: &dyn SnapshotSource,
    new: &dyn SnapshotSource,
    config: &AppConfig,
    journal: &Journal,
) -> anyhow::Result<BatchSummary> {
    let dry_run = config.pipeline.dry_run;
    let text = std::fs::read_to_string(constants)
        .with_context(|| format!("reading {}", constants.display()))?;
    let mut file = ConstantsFile::parse(&text)
        .with_context(|| format!("parsing {}", constants.display()))?;

    let old_rows = old
        .records(table)?
        .ok_or_else(|| UpdaterError::not_found("table", table))
        .context("old snapshot")?;
    let new_rows = new
        .records(table)?
        .ok_or_else(|| UpdaterError::not_found("table", table))
        .context("new snapshot")?;
    info!(
        "Remapping {} against table {table} ({} -> {} rows)",
        constants.display(),
        old_rows.len(),
        new_rows.len()
    );

    let report = remap_record_ids(
        &mut file,
        &old_rows,
        &new_rows,
        &config.matching.record_cost(),
        config.pipeline.lost_id,
    );
    for line in report.journal_lines(table) {
        journal.log(line);
    }
    if report.is_modified() && !dry_run {
        write_output(constants, &file.render())?;
        journal.add_file(constants);
    }

    Ok(BatchSummary::from_id_report(table, dry_run, &report))
}
