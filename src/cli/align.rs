//! Align command handler.
//!
//! Shows how two versions of one artifact line up, without changing
//! anything. Useful for tuning cost weights.

use crate::align::{align, AlignedItem, AlignmentSummary, Dissimilarity, Step};
use crate::config::{AppConfig, OutputFormat};
use crate::matching::WidgetCost;
use crate::model::{parse_group, parse_records, Record, ScriptSource, Token, WidgetNode};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::{Display, Write as _};
use std::path::Path;

/// What kind of artifact the two files hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AlignKind {
    /// Assembly scripts, aligned line by line
    Script,
    /// Widget group JSON, aligned node by node
    Widgets,
    /// Definition table JSON, aligned row by row
    Records,
}

#[derive(Serialize)]
struct AlignOutput {
    summary: AlignmentSummary,
    steps: Vec<Step>,
}

/// Align `old` against `new` and print the result.
pub fn run_align(old: &Path, new: &Path, kind: AlignKind, config: &AppConfig) -> Result<i32> {
    let old_text =
        std::fs::read_to_string(old).with_context(|| format!("reading {}", old.display()))?;
    let new_text =
        std::fs::read_to_string(new).with_context(|| format!("reading {}", new.display()))?;

    let rendered = match kind {
        AlignKind::Script => {
            let old = ScriptSource::parse(&old_text).context("parsing old script")?;
            let new = ScriptSource::parse(&new_text).context("parsing new script")?;
            render(
                old.body(),
                new.body(),
                &config.matching.script_cost(),
                config.output.format,
                |t: &Token| t.to_string(),
            )
        }
        AlignKind::Widgets => {
            let old = parse_group(&old_text).context("parsing old widget group")?;
            let new = parse_group(&new_text).context("parsing new widget group")?;
            render(&old, &new, &WidgetCost, config.output.format, |w: &WidgetNode| {
                let label = w.name.as_deref().or(w.text.as_deref()).unwrap_or_default();
                format!("type {} {label}", w.kind)
            })
        }
        AlignKind::Records => {
            let old = parse_records(&old_text).context("parsing old table")?;
            let new = parse_records(&new_text).context("parsing new table")?;
            render(
                &old,
                &new,
                &config.matching.record_cost(),
                config.output.format,
                |r: &Record| format!("{} {}", r.id, r.name.as_deref().unwrap_or_default()),
            )
        }
    };

    print!("{rendered}");
    Ok(crate::pipeline::exit_codes::SUCCESS)
}

fn render<T, C, D>(
    old: &[T],
    new: &[T],
    cost: &C,
    format: OutputFormat,
    mut describe: impl FnMut(&T) -> D,
) -> String
where
    C: Dissimilarity<T>,
    D: Display,
{
    let alignment = align(old, new, cost);
    tracing::debug!(
        old = old.len(),
        new = new.len(),
        cost = alignment.cost(),
        "aligned"
    );

    if format == OutputFormat::Json {
        let output = AlignOutput {
            summary: alignment.summary(),
            steps: alignment.steps().collect(),
        };
        return serde_json::to_string_pretty(&output).unwrap_or_default() + "\n";
    }

    let mut out = String::new();
    for item in alignment.items(old, new) {
        let _ = match item {
            AlignedItem::Matched(a, b) => {
                let (a, b) = (describe(a).to_string(), describe(b).to_string());
                if a == b {
                    writeln!(out, "  {a}")
                } else {
                    writeln!(out, "~ {a}\n  => {b}")
                }
            }
            AlignedItem::OldOnly(a) => writeln!(out, "- {}", describe(a)),
            AlignedItem::NewOnly(b) => writeln!(out, "+ {}", describe(b)),
        };
    }
    let s = alignment.summary();
    let _ = writeln!(
        out,
        "{} matched, {} deleted, {} inserted, cost {:.3}",
        s.matched, s.deleted, s.inserted, s.cost
    );
    out
}
