//! Widget-ID batch: follow every packed widget constant into the new
//! revision's layout.

use super::{
    write_output, BatchSummary, Journal, ObjectOutcome, Outcome, SnapshotSource, WorkerPool,
};
use crate::config::AppConfig;
use crate::idmap::{referenced_groups, remap_widget_ids, WidgetGroupMapping};
use crate::model::ConstantsFile;
use anyhow::Context as _;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Rewrite the packed widget ids in `constants`.
///
/// Each referenced group is aligned on the pool. A group missing from the
/// new revision maps every child to lost; a group missing from the old
/// revision, or one whose alignment failed, leaves its constants alone.
pub fn run_widgets(
    constants: &Path,
    old: &dyn SnapshotSource,
    new: &dyn SnapshotSource,
    config: &AppConfig,
    pool: &WorkerPool,
    journal: &Journal,
) -> anyhow::Result<BatchSummary> {
    let dry_run = config.pipeline.dry_run;
    let text = std::fs::read_to_string(constants)
        .with_context(|| format!("reading {}", constants.display()))?;
    let mut file = ConstantsFile::parse(&text)
        .with_context(|| format!("parsing {}", constants.display()))?;

    let groups: Vec<i64> = referenced_groups(&file).into_iter().collect();
    info!("Aligning {} widget groups", groups.len());

    let results = pool.run(&groups, |&group| {
        let Some(old_nodes) = old.widget_group(group)? else {
            warn!("Widget group {group} is not in the old snapshot");
            return Ok(None);
        };
        let new_nodes = new.widget_group(group)?.unwrap_or_default();
        if new_nodes.is_empty() {
            warn!("Lost widget group {group}");
        }
        Ok(Some(WidgetGroupMapping::build(group, &old_nodes, &new_nodes)))
    });

    let mut mappings = BTreeMap::new();
    let mut failures = Vec::new();
    for (group, result) in groups.iter().zip(results) {
        match result {
            Ok(Some(mapping)) => {
                mappings.insert(*group, mapping);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Error mapping widget group {group}: {e}");
                failures.push(ObjectOutcome::new(
                    format!("group {group}"),
                    Outcome::Failed {
                        error: e.to_string(),
                    },
                ));
            }
        }
    }

    let report = remap_widget_ids(&mut file, &mappings, config.pipeline.lost_id);
    for line in report.journal_lines("widget") {
        journal.log(line);
    }
    if report.is_modified() && !dry_run {
        write_output(constants, &file.render())?;
        journal.add_file(constants);
    }

    let mut summary = BatchSummary::from_id_report("Widget IDs", dry_run, &report);
    if !failures.is_empty() {
        failures.extend(summary.objects);
        summary = BatchSummary::new("Widget IDs", dry_run, failures);
    }
    Ok(summary)
}
