//! Ids command handler.

use super::{finish, open_snapshots};
use crate::config::AppConfig;
use crate::pipeline::{run_ids, Journal};
use anyhow::Result;
use std::path::Path;

/// Remap the constants of `constants` that name rows of `table`.
pub fn run_id_update(
    constants: &Path,
    table: &str,
    old: &Path,
    new: &Path,
    config: &AppConfig,
) -> Result<i32> {
    let (old, new) = open_snapshots(old, new)?;
    let journal = Journal::new(&format!("{table} IDs"), config.pipeline.version.as_deref());

    let summary = run_ids(constants, table, &old, &new, config, &journal)?;
    finish(&summary, &journal, config)
}
