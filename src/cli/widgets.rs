//! Widgets command handler.

use super::{finish, open_snapshots};
use crate::config::AppConfig;
use crate::pipeline::{run_widgets, Journal, WorkerPool};
use anyhow::Result;
use std::path::Path;

/// Remap the packed widget ids of `constants` from `old` onto `new`.
pub fn run_widget_update(
    constants: &Path,
    old: &Path,
    new: &Path,
    config: &AppConfig,
) -> Result<i32> {
    let (old, new) = open_snapshots(old, new)?;
    let journal = Journal::new("Widget IDs", config.pipeline.version.as_deref());
    let pool = WorkerPool::new(config.pipeline.workers)?;

    let summary = run_widgets(constants, &old, &new, config, &pool, &journal)?;
    finish(&summary, &journal, config)
}
