//! Batch orchestration over cache snapshots.
//!
//! Each batch fans one job per object (a script, a widget group) out over
//! an explicitly constructed [`WorkerPool`]. A job that errors or panics is
//! recorded as failed and never takes its siblings down. Everything a
//! batch touches is collected in a [`Journal`] that renders the commit
//! message for the update.

mod ids;
mod journal;
mod pool;
mod scripts;
mod snapshot;
mod validate;
mod widgets;

pub use ids::run_ids;
pub use journal::Journal;
pub use pool::WorkerPool;
pub use scripts::{discover_scripts, run_scripts, update_script, ScriptBatch, ScriptJob};
pub use snapshot::{DirectorySnapshot, SnapshotSource};
pub use validate::{validate_script, OutputIssue};
pub use widgets::run_widgets;

use crate::config::OutputFormat;
use crate::idmap::IdUpdateReport;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Structured pipeline error types.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    PoolStartup(#[from] rayon::ThreadPoolBuildError),

    /// A job returned an error
    #[error("{source:#}")]
    JobFailed {
        #[source]
        source: anyhow::Error,
    },

    /// A job panicked
    #[error("job panicked: {message}")]
    JobPanicked { message: String },

    /// Writing an output failed
    #[error("Write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write one output file of a batch.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<(), PipelineError> {
    std::fs::write(path, contents).map_err(|source| PipelineError::WriteFailed {
        path: path.display().to_string(),
        source,
    })
}

/// Exit codes for scripted use.
pub mod exit_codes {
    /// Every object was updated, unchanged or skipped on purpose
    pub const SUCCESS: i32 = 0;
    /// Some objects failed or were lost upstream
    pub const NEEDS_REVIEW: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

// ============================================================================
// Outcomes
// ============================================================================

/// What happened to one object of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Rewritten; notes are worth a human look
    Updated { notes: Vec<String> },
    Unchanged,
    /// Deliberately left alone
    Skipped { reason: String },
    /// The object disappeared upstream
    Lost,
    Failed { error: String },
}

impl Outcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::Unchanged => "unchanged",
            Self::Skipped { .. } => "skipped",
            Self::Lost => "lost",
            Self::Failed { .. } => "failed",
        }
    }
}

/// An outcome with the object it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectOutcome {
    pub subject: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ObjectOutcome {
    pub fn new(subject: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            subject: subject.into(),
            outcome,
        }
    }
}

/// Per-status totals of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub lost: usize,
    pub failed: usize,
}

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub batch: String,
    pub dry_run: bool,
    pub counts: BatchCounts,
    pub objects: Vec<ObjectOutcome>,
}

impl BatchSummary {
    pub fn new(batch: impl Into<String>, dry_run: bool, objects: Vec<ObjectOutcome>) -> Self {
        let mut counts = BatchCounts::default();
        for object in &objects {
            match object.outcome {
                Outcome::Updated { .. } => counts.updated += 1,
                Outcome::Unchanged => counts.unchanged += 1,
                Outcome::Skipped { .. } => counts.skipped += 1,
                Outcome::Lost => counts.lost += 1,
                Outcome::Failed { .. } => counts.failed += 1,
            }
        }
        Self {
            batch: batch.into(),
            dry_run,
            counts,
            objects,
        }
    }

    /// Summary of an id-constant rewrite, one object per constant.
    pub fn from_id_report(batch: impl Into<String>, dry_run: bool, report: &IdUpdateReport) -> Self {
        let mut objects = Vec::new();
        for change in &report.changed {
            let note = change
                .new
                .map(|new| format!("{} -> {new}", change.old))
                .unwrap_or_default();
            objects.push(ObjectOutcome::new(
                &change.name,
                Outcome::Updated { notes: vec![note] },
            ));
        }
        for change in &report.lost {
            objects.push(ObjectOutcome::new(&change.name, Outcome::Lost));
        }
        for name in &report.unchanged {
            objects.push(ObjectOutcome::new(name, Outcome::Unchanged));
        }
        for name in &report.unknown {
            objects.push(ObjectOutcome::new(
                name,
                Outcome::skipped("value names nothing in the old snapshot"),
            ));
        }
        Self::new(batch, dry_run, objects)
    }

    /// Process exit code for this batch.
    pub fn exit_code(&self) -> i32 {
        if self.counts.failed > 0 || self.counts.lost > 0 {
            exit_codes::NEEDS_REVIEW
        } else {
            exit_codes::SUCCESS
        }
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Text => self.render_text(),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let c = &self.counts;
        let _ = writeln!(
            out,
            "{}{}: {} updated, {} unchanged, {} skipped, {} lost, {} failed",
            self.batch,
            if self.dry_run { " (dry run)" } else { "" },
            c.updated,
            c.unchanged,
            c.skipped,
            c.lost,
            c.failed
        );
        for object in &self.objects {
            match &object.outcome {
                Outcome::Unchanged => {}
                Outcome::Updated { notes } => {
                    let _ = writeln!(out, "  {:<9} {}", object.outcome.label(), object.subject);
                    for note in notes {
                        let _ = writeln!(out, "            {note}");
                    }
                }
                Outcome::Skipped { reason } => {
                    let _ = writeln!(out, "  {:<9} {}: {reason}", "skipped", object.subject);
                }
                Outcome::Failed { error } => {
                    let _ = writeln!(out, "  {:<9} {}: {error}", "failed", object.subject);
                }
                Outcome::Lost => {
                    let _ = writeln!(out, "  {:<9} {}", "lost", object.subject);
                }
            }
        }
        out
    }
}
