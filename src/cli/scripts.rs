//! Scripts command handler.

use super::{finish, open_snapshots};
use crate::config::AppConfig;
use crate::pipeline::{run_scripts, Journal, ScriptBatch, WorkerPool};
use anyhow::{Context, Result};
use std::path::Path;

/// Rebase every maintained script in `dir` from `old` onto `new`.
pub fn run_script_update(dir: &Path, old: &Path, new: &Path, config: &AppConfig) -> Result<i32> {
    let (old, new) = open_snapshots(old, new)?;
    let journal = Journal::new("Scripts", config.pipeline.version.as_deref());
    let pool = WorkerPool::new(config.pipeline.workers)?;
    let batch = ScriptBatch::new(&old, &new, config, &journal);

    let summary = run_scripts(dir, &batch, &pool)
        .with_context(|| format!("updating scripts in {}", dir.display()))?;
    finish(&summary, &journal, config)
}
