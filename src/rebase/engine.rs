//! Three-way merge of a locally modified script onto a new upstream version.

use super::options::RebaseOptions;
use super::remap::RemapTable;
use super::report::{RebaseNote, RebaseReport};
use crate::align::{align, Dissimilarity, Step};
use crate::error::Result;
use crate::matching::ScriptLineCost;
use crate::model::{render_parts, ScriptSource, Token};
use indexmap::IndexMap;

/// The merged script, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebased {
    pub prelude: String,
    pub header: IndexMap<String, Token>,
    pub body: Vec<Token>,
    pub report: RebaseReport,
}

impl Rebased {
    pub fn render(&self) -> String {
        render_parts(&self.prelude, &self.header, &self.body)
    }

    /// Re-index the merged body.
    ///
    /// # Errors
    ///
    /// Fails when the merge produced a duplicate label.
    pub fn into_source(self) -> Result<ScriptSource> {
        ScriptSource::from_parts(self.prelude, self.header, self.body)
    }
}

/// Replays local script edits onto a new upstream version.
#[derive(Debug, Clone)]
pub struct Rebaser<C = ScriptLineCost> {
    cost: C,
    options: RebaseOptions,
}

impl Default for Rebaser {
    fn default() -> Self {
        Self::new(RebaseOptions::default())
    }
}

impl Rebaser {
    /// Rebaser using the standard script-line cost.
    pub fn new(options: RebaseOptions) -> Self {
        Self {
            cost: ScriptLineCost::default(),
            options,
        }
    }
}

impl<C: Dissimilarity<Token>> Rebaser<C> {
    pub fn with_cost(cost: C, options: RebaseOptions) -> Self {
        Self { cost, options }
    }

    pub fn options(&self) -> &RebaseOptions {
        &self.options
    }

    /// Merge `old_modified` (local edits against `old_vanilla`) onto
    /// `new_vanilla`.
    ///
    /// Every upstream line is emitted in order. A matched line takes the
    /// local trailing comment, if any. Lines inserted locally follow the
    /// line they were inserted after; when that line disappeared upstream
    /// they are emitted where it used to be, before the next surviving
    /// line. The local prelude and header are kept.
    pub fn rebase(
        &self,
        old_vanilla: &ScriptSource,
        new_vanilla: &ScriptSource,
        old_modified: &ScriptSource,
    ) -> Rebased {
        let local = align(old_vanilla.body(), old_modified.body(), &self.cost);
        let upstream = align(old_vanilla.body(), new_vanilla.body(), &self.cost);

        // Local insertions keyed by the old vanilla line they follow.
        let mut leading = Vec::new();
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); old_vanilla.len()];
        let mut last_old = None;
        for step in local.steps() {
            match step {
                Step::Matched { old, .. } | Step::OldOnly { old } => last_old = Some(old),
                Step::NewOnly { new } => match last_old {
                    Some(old) => buckets[old].push(new),
                    None => leading.push(new),
                },
            }
        }

        let (remap, mut notes) = RemapTable::build(
            old_vanilla,
            new_vanilla,
            old_modified,
            &local,
            &upstream,
            &self.options,
        );

        let mut merge = Merge {
            old_modified,
            remap: &remap,
            body: Vec::with_capacity(new_vanilla.len() + old_modified.len()),
            notes: &mut notes,
            carried: 0,
        };

        merge.flush(&leading);
        for step in upstream.steps() {
            match step {
                Step::Matched { old, new } => {
                    let mut token = new_vanilla.body()[new].clone();
                    let line = merge.body.len() + 1;
                    match local.new_for_old(old) {
                        Some(m) => {
                            let local_token = &old_modified.body()[m];
                            if let Some(comment) = &local_token.comment {
                                token.comment = Some(comment.clone());
                            }
                            if differs(&old_vanilla.body()[old], local_token) {
                                merge.notes.push(RebaseNote::DroppedLocalEdit {
                                    line,
                                    local: text_of(local_token),
                                    upstream: text_of(&token),
                                });
                            }
                        }
                        None => merge.notes.push(RebaseNote::RestoredLocalDeletion {
                            line,
                            text: text_of(&token),
                        }),
                    }
                    merge.body.push(token);
                    merge.flush(&buckets[old]);
                }
                Step::NewOnly { new } => merge.body.push(new_vanilla.body()[new].clone()),
                Step::OldOnly { old } => {
                    let orphans = &buckets[old];
                    if !orphans.is_empty() {
                        merge.notes.push(RebaseNote::OrphanedInsertions {
                            line: merge.body.len() + 1,
                            anchor: text_of(&old_vanilla.body()[old]),
                            count: orphans.len(),
                        });
                    }
                    merge.flush(orphans);
                }
            }
        }

        let body = merge.body;
        let carried = merge.carried;

        let mut header = old_modified.header().clone();
        if self.options.adjust_var_counts {
            self.adjust_counts(&mut header, &remap);
        }

        let report = RebaseReport {
            local: local.summary(),
            upstream: upstream.summary(),
            carried,
            notes,
        };
        tracing::debug!(
            local_inserted = report.local.inserted,
            upstream_matched = report.upstream.matched,
            carried = report.carried,
            notes = report.notes.len(),
            "rebased script"
        );

        Rebased {
            prelude: old_modified.prelude().to_string(),
            header,
            body,
            report,
        }
    }

    fn adjust_counts(&self, header: &mut IndexMap<String, Token>, remap: &RemapTable) {
        for (group, spec) in self.options.slot_groups() {
            let offset = remap.offset(group);
            let Some(directive) = spec.count_directive.as_deref() else {
                continue;
            };
            if offset == 0 {
                continue;
            }
            if let Some(token) = header.get_mut(directive) {
                if let Ok(count) = token.operand.trim().parse::<i64>() {
                    token.operand = (count + offset).to_string();
                }
            }
        }
    }
}

/// Emission state of one merge walk.
struct Merge<'a> {
    old_modified: &'a ScriptSource,
    remap: &'a RemapTable,
    body: Vec<Token>,
    notes: &'a mut Vec<RebaseNote>,
    carried: usize,
}

impl Merge<'_> {
    fn flush(&mut self, insertions: &[usize]) {
        for &m in insertions {
            let rewritten = self
                .remap
                .rewrite(&self.old_modified.body()[m], self.old_modified);
            if let Some(label) = rewritten.stale_label {
                self.notes.push(RebaseNote::StaleLabelReference {
                    line: self.body.len() + 1,
                    label,
                });
            }
            self.body.push(rewritten.token);
            self.carried += 1;
        }
    }
}

/// Opcode or operand changed (comments and layout are ignored).
fn differs(a: &Token, b: &Token) -> bool {
    a.opcode != b.opcode || a.operand.trim() != b.operand.trim()
}

/// Opcode and operand without layout or comment, for review notes.
fn text_of(token: &Token) -> String {
    let operand = token.operand.trim();
    match token.opcode() {
        Some(opcode) if !operand.is_empty() => format!("{opcode} {operand}"),
        Some(opcode) => opcode.to_string(),
        None => operand.to_string(),
    }
}

/// Rebase with the default cost model and options.
pub fn rebase(
    old_vanilla: &ScriptSource,
    new_vanilla: &ScriptSource,
    old_modified: &ScriptSource,
) -> Rebased {
    Rebaser::default().rebase(old_vanilla, new_vanilla, old_modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(lines: &[&str]) -> ScriptSource {
        script_with_header(".int_var_count      0\n", lines)
    }

    fn script_with_header(header: &str, lines: &[&str]) -> ScriptSource {
        let mut text = format!(".id                 77\n{header}");
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        ScriptSource::parse(&text).unwrap()
    }

    fn body_text(rebased: &Rebased) -> Vec<String> {
        rebased.body.iter().map(text_of).collect()
    }

    const A: &str = "   iconst                 1";
    const B: &str = "   sconst                 \"bank\"";
    const C: &str = "   pop_int";
    const D: &str = "   return";
    const X: &str = "   invoke                 42";

    #[test]
    fn test_insertion_is_carried() {
        let ov = script(&[A, B, C]);
        let om = script(&[A, B, X, C]);
        let nv = script(&[A, B, C, D]);

        let rebased = rebase(&ov, &nv, &om);
        assert_eq!(
            body_text(&rebased),
            vec!["iconst 1", "sconst \"bank\"", "invoke 42", "pop_int", "return"]
        );
        assert_eq!(rebased.report.carried, 1);
        assert!(rebased.report.is_clean());
    }

    #[test]
    fn test_leading_insertion() {
        let ov = script(&[A, C]);
        let om = script(&[X, A, C]);
        let nv = script(&[A, C, D]);

        let rebased = rebase(&ov, &nv, &om);
        assert_eq!(rebased.body[0].opcode(), Some("invoke"));
        assert_eq!(rebased.body.len(), 4);
    }

    #[test]
    fn test_lost_anchor_keeps_insertion() {
        let ov = script(&[A, B, C]);
        let om = script(&[A, B, X, C]);
        let nv = script(&[A, C]);

        let rebased = rebase(&ov, &nv, &om);
        let opcodes: Vec<_> = rebased.body.iter().filter_map(Token::opcode).collect();
        assert_eq!(opcodes, vec!["iconst", "invoke", "pop_int"]);
        assert_eq!(rebased.report.orphaned(), 1);
        assert_eq!(
            rebased.report.notes,
            vec![RebaseNote::OrphanedInsertions {
                line: 2,
                anchor: "sconst \"bank\"".to_string(),
                count: 1,
            }]
        );
    }

    #[test]
    fn test_branch_target_is_renamed() {
        let ov = script(&[
            "   iload                  0",
            "   if_icmpeq              LABEL3",
            "   return",
            "LABEL3:",
            "   iconst                 1",
            "   return",
        ]);
        let om = script(&[
            "   iload                  0",
            "   if_icmpeq              LABEL3",
            "   return",
            "LABEL3:",
            "   iconst                 1",
            "   jump                   LABEL3",
            "   iconst                 7",
            "   return",
        ]);
        let nv = script(&[
            "   iconst                 9",
            "   pop_int",
            "   iload                  0",
            "   if_icmpeq              LABEL5",
            "   return",
            "LABEL5:",
            "   iconst                 1",
            "   return",
        ]);

        let rebased = rebase(&ov, &nv, &om);
        let text = body_text(&rebased);
        assert_eq!(text[5], "LABEL5:");
        assert_eq!(text[7], "jump LABEL5");
        assert_eq!(text[8], "iconst 7");
        assert_eq!(text.len(), 10);
        assert!(rebased.clone().into_source().is_ok());
    }

    #[test]
    fn test_local_comment_is_reattached() {
        let ov = script(&[A, C]);
        let om = script(&["   iconst                 1 ; tab index", C]);
        let nv = script(&[A, C, D]);

        let rebased = rebase(&ov, &nv, &om);
        assert_eq!(rebased.body[0].comment.as_deref(), Some(" ; tab index"));
        assert!(rebased.render().contains("   iconst                 1 ; tab index\n"));
    }

    #[test]
    fn test_header_and_prelude_are_local() {
        let ov = script_with_header(".int_var_count      2\n", &[A, D]);
        let nv = script_with_header(".int_var_count      4\n", &[A, D]);
        let om_text = format!(
            "; hand tuned\n.id                 77\n.int_var_count      3\n{A}\n   istore                 2\n{D}\n"
        );
        let om = ScriptSource::parse(&om_text).unwrap();

        let rebased = rebase(&ov, &nv, &om);
        let rendered = rebased.render();
        assert!(rendered.starts_with("; hand tuned\n.id                 77\n.int_var_count      3\n"));
        // Slot 2 was allocated locally, past the old count of 2
        assert!(rendered.contains("   istore                 4\n"));
    }

    #[test]
    fn test_adjust_var_counts() {
        let ov = script_with_header(".int_var_count      2\n", &[A, D]);
        let nv = script_with_header(".int_var_count      4\n", &[A, D]);
        let om = script_with_header(".int_var_count      3\n", &[A, D]);

        let options = RebaseOptions {
            adjust_var_counts: true,
            ..RebaseOptions::default()
        };
        let rebased = Rebaser::new(options).rebase(&ov, &nv, &om);
        assert_eq!(
            rebased.header.get(".int_var_count").map(|t| t.operand.as_str()),
            Some("5")
        );
    }

    #[test]
    fn test_local_edit_and_deletion_are_noted() {
        let ov = script(&[A, B, C, D]);
        let om = script(&["   iconst                 2", B, D]);
        let nv = script(&[A, B, C, D]);

        let rebased = rebase(&ov, &nv, &om);
        assert_eq!(rebased.body.len(), 4);
        let kinds: Vec<_> = rebased
            .report
            .notes
            .iter()
            .map(|n| match n {
                RebaseNote::DroppedLocalEdit { line, .. } => ("edit", *line),
                RebaseNote::RestoredLocalDeletion { line, .. } => ("deletion", *line),
                _ => ("other", 0),
            })
            .collect();
        assert_eq!(kinds, vec![("edit", 1), ("deletion", 3)]);
    }

    #[test]
    fn test_identical_inputs_are_a_no_op() {
        let ov = script(&[A, B, C, D]);
        let rebased = rebase(&ov, &ov, &ov);
        assert_eq!(rebased.render(), ov.render());
        assert!(rebased.report.is_clean());
    }
}
