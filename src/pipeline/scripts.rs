//! Script batch: carry locally modified scripts onto a new cache revision.
//!
//! A maintained script is a `<name>.rs2asm` next to a `<name>.hash` that
//! records the SHA-256 of the vanilla script it was last rebased onto.

use super::validate::validate_script;
use super::{
    write_output, BatchSummary, Journal, ObjectOutcome, Outcome, SnapshotSource, WorkerPool,
};
use crate::config::AppConfig;
use crate::error::UpdaterError;
use crate::matching::ScriptLineCost;
use crate::model::ScriptSource;
use crate::rebase::Rebaser;
use crate::utils::{content_hash, hash_matches};
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One maintained script on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    pub name: String,
    pub script: PathBuf,
    pub hash: PathBuf,
}

/// Every `<name>.hash` with a sibling `<name>.rs2asm`, sorted by name.
pub fn discover_scripts(dir: &Path) -> crate::error::Result<Vec<ScriptJob>> {
    let entries = std::fs::read_dir(dir).map_err(|e| UpdaterError::io(dir, e))?;
    let mut jobs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| UpdaterError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("hash") {
            continue;
        }
        let script = path.with_extension("rs2asm");
        if !script.is_file() {
            warn!("{} has no script next to it", path.display());
            continue;
        }
        let name = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        jobs.push(ScriptJob {
            name,
            script,
            hash: path,
        });
    }
    jobs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(jobs)
}

/// Everything a script job needs besides the job itself.
pub struct ScriptBatch<'a> {
    pub old: &'a dyn SnapshotSource,
    pub new: &'a dyn SnapshotSource,
    pub rebaser: Rebaser<ScriptLineCost>,
    pub dry_run: bool,
    pub validate_output: bool,
    pub journal: &'a Journal,
}

impl<'a> ScriptBatch<'a> {
    pub fn new(
        old: &'a dyn SnapshotSource,
        new: &'a dyn SnapshotSource,
        config: &AppConfig,
        journal: &'a Journal,
    ) -> Self {
        Self {
            old,
            new,
            rebaser: Rebaser::with_cost(config.matching.script_cost(), config.rebase.clone()),
            dry_run: config.pipeline.dry_run,
            validate_output: config.pipeline.validate_output,
            journal,
        }
    }
}

/// Rebase one maintained script.
pub fn update_script(job: &ScriptJob, batch: &ScriptBatch<'_>) -> anyhow::Result<Outcome> {
    let local_text = std::fs::read_to_string(&job.script)
        .with_context(|| format!("reading {}", job.script.display()))?;
    let old_modified = ScriptSource::parse(&local_text).context("parsing local script")?;
    let id = old_modified.id().context("reading local script id")?;
    let recorded = std::fs::read_to_string(&job.hash)
        .with_context(|| format!("reading {}", job.hash.display()))?;

    let Some(old_text) = batch.old.script(id)? else {
        warn!("Script {id} ({}) is not in the old snapshot", job.name);
        return Ok(Outcome::skipped(format!("script {id} not in old snapshot")));
    };
    let old_hash = content_hash(old_text.as_bytes());
    if !hash_matches(&recorded, &old_hash) {
        warn!(
            "Old snapshot hash does not match hash in tree for {}. {} != {}",
            job.name,
            old_hash,
            recorded.trim()
        );
        return Ok(Outcome::skipped("recorded hash does not match old snapshot"));
    }

    let Some(new_text) = batch.new.script(id)? else {
        warn!("Lost script {} ({id})", job.name);
        batch.journal.log(format!("lost script {} {id}", job.name));
        return Ok(Outcome::Lost);
    };
    let new_hash = content_hash(new_text.as_bytes());
    if new_hash == old_hash {
        info!("Not updating script {} because its hash did not change", job.name);
        return Ok(Outcome::Unchanged);
    }

    let old_vanilla = ScriptSource::parse(&old_text).context("parsing old vanilla")?;
    let new_vanilla = ScriptSource::parse(&new_text).context("parsing new vanilla")?;
    let rebased = batch.rebaser.rebase(&old_vanilla, &new_vanilla, &old_modified);
    let text = rebased.render();

    let mut notes: Vec<String> = rebased.report.notes.iter().map(ToString::to_string).collect();
    if batch.validate_output {
        for issue in validate_script(&text, batch.rebaser.options()) {
            warn!("Updated script {} {}", job.name, issue);
            notes.push(format!("check: {issue}"));
        }
    }

    if !batch.dry_run {
        write_output(&job.script, &text)?;
        write_output(&job.hash, &new_hash)?;
        batch.journal.add_file(&job.script);
        batch.journal.add_file(&job.hash);
    }
    for note in &notes {
        batch.journal.log(format!("{}: {note}", job.name));
    }
    info!(
        "Updated script {} ({} carried, {} notes)",
        job.name,
        rebased.report.carried,
        notes.len()
    );
    Ok(Outcome::Updated { notes })
}

/// Rebase every maintained script in `dir` on the pool.
pub fn run_scripts(
    dir: &Path,
    batch: &ScriptBatch<'_>,
    pool: &WorkerPool,
) -> anyhow::Result<BatchSummary> {
    let jobs = discover_scripts(dir)?;
    info!("Updating {} scripts on {} workers", jobs.len(), pool.workers());

    let results = pool.run(&jobs, |job| update_script(job, batch));
    let objects = jobs
        .iter()
        .zip(results)
        .map(|(job, result)| {
            let outcome = result.unwrap_or_else(|e| {
                warn!("Unable to update script {}: {e}", job.name);
                Outcome::Failed {
                    error: e.to_string(),
                }
            });
            ObjectOutcome::new(&job.name, outcome)
        })
        .collect();

    Ok(BatchSummary::new("Scripts", batch.dry_run, objects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_requires_both_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bank.rs2asm"), "").unwrap();
        std::fs::write(tmp.path().join("bank.hash"), "").unwrap();
        std::fs::write(tmp.path().join("orphan.hash"), "").unwrap();
        std::fs::write(tmp.path().join("unmanaged.rs2asm"), "").unwrap();

        let jobs = discover_scripts(tmp.path()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "bank.rs2asm");
        assert_eq!(jobs[0].hash, tmp.path().join("bank.hash"));
    }
}
