//! Rebase command handler.
//!
//! Three-way merge of a single script, outside any snapshot layout.

use crate::config::{AppConfig, OutputFormat};
use crate::model::ScriptSource;
use crate::pipeline::{exit_codes, validate_script, OutputIssue};
use crate::rebase::{RebaseReport, Rebaser};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Serialize)]
struct RebaseOutput<'a> {
    report: &'a RebaseReport,
    issues: &'a [OutputIssue],
}

fn read_script(path: &Path) -> Result<ScriptSource> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ScriptSource::parse(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Carry the edits of `old_modified` onto `new_vanilla`.
///
/// The merged script goes to `output`, or stdout. Exits with
/// [`exit_codes::NEEDS_REVIEW`] when the merge left notes or the output
/// failed re-validation.
pub fn run_rebase(
    old_vanilla: &Path,
    new_vanilla: &Path,
    old_modified: &Path,
    output: Option<PathBuf>,
    config: &AppConfig,
) -> Result<i32> {
    let old_vanilla = read_script(old_vanilla)?;
    let new_vanilla = read_script(new_vanilla)?;
    let old_modified = read_script(old_modified)?;

    let rebaser = Rebaser::with_cost(config.matching.script_cost(), config.rebase.clone());
    let rebased = rebaser.rebase(&old_vanilla, &new_vanilla, &old_modified);
    let text = rebased.render();

    let issues = if config.pipeline.validate_output {
        validate_script(&text, rebaser.options())
    } else {
        Vec::new()
    };
    for note in &rebased.report.notes {
        warn!("{note}");
    }
    for issue in &issues {
        warn!("Rebased script {issue}");
    }

    match output {
        Some(path) if !config.pipeline.dry_run => {
            std::fs::write(&path, &text)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(
                "Wrote {} ({} local lines carried)",
                path.display(),
                rebased.report.carried
            );
            if config.output.format == OutputFormat::Json {
                let report = RebaseOutput {
                    report: &rebased.report,
                    issues: &issues,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Some(path) => info!("Dry run; not writing {}", path.display()),
        None => print!("{text}"),
    }

    if rebased.report.is_clean() && issues.is_empty() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::NEEDS_REVIEW)
    }
}
