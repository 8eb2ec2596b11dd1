//! Operand remapping for carried-over insertions.
//!
//! Upstream revisions renumber labels and shuffle local-variable slots.
//! A line inserted locally against the old version still names the old
//! label or slot, so before it is replayed onto the new version its
//! operand is translated through a table learned from the matched lines
//! of the upstream alignment.

use super::options::RebaseOptions;
use super::report::RebaseNote;
use crate::align::Alignment;
use crate::model::{ScriptSource, Token};
use std::collections::{HashMap, HashSet};

const LABEL_PREFIX: &str = "LABEL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotRule {
    /// Slot count of the group in old vanilla
    old_count: Option<i64>,
    /// Change of that count upstream
    offset: i64,
}

/// A rewritten insertion and what could not be translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub token: Token,
    pub stale_label: Option<String>,
}

/// Translation from old-version operands to new-version operands.
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    labels_enabled: bool,
    /// old vanilla label -> new vanilla label
    labels: HashMap<String, String>,
    /// locally modified label -> old vanilla label it aligned with
    local_to_vanilla: HashMap<String, String>,
    /// locally added label -> name it is emitted under
    local_labels: HashMap<String, String>,
    /// (slot group, old operand) -> new operand
    slots: HashMap<(usize, String), String>,
    rules: HashMap<usize, SlotRule>,
    /// opcode -> slot group
    slot_opcodes: HashMap<String, usize>,
}

impl RemapTable {
    /// Learn the table from both alignments.
    ///
    /// `local` aligns old vanilla against the locally modified version,
    /// `upstream` aligns old vanilla against new vanilla. Renamed local
    /// labels are reported as notes.
    pub fn build(
        old_vanilla: &ScriptSource,
        new_vanilla: &ScriptSource,
        old_modified: &ScriptSource,
        local: &Alignment,
        upstream: &Alignment,
        options: &RebaseOptions,
    ) -> (Self, Vec<RebaseNote>) {
        let mut table = Self {
            labels_enabled: options.label_group().is_some(),
            ..Self::default()
        };
        let mut notes = Vec::new();

        for (group, spec) in options.slot_groups() {
            for opcode in &spec.opcodes {
                table.slot_opcodes.entry(opcode.clone()).or_insert(group);
            }
            let counts = spec.count_directive.as_deref().map(|directive| {
                (
                    old_vanilla.directive_int(directive).ok(),
                    new_vanilla.directive_int(directive).ok(),
                )
            });
            let rule = match counts {
                Some((Some(old), Some(new))) => SlotRule {
                    old_count: Some(old),
                    offset: new - old,
                },
                Some((old, _)) => SlotRule {
                    old_count: old,
                    offset: 0,
                },
                None => SlotRule::default(),
            };
            table.rules.insert(group, rule);
        }

        for &(o, n) in upstream.pairs() {
            table.learn(old_vanilla, new_vanilla, &old_vanilla.body()[o], &new_vanilla.body()[n]);
        }

        if table.labels_enabled {
            for &(v, m) in local.pairs() {
                let (vt, mt) = (&old_vanilla.body()[v], &old_modified.body()[m]);
                if let (Some(vn), Some(mn)) = (vt.label_name(), mt.label_name()) {
                    table
                        .local_to_vanilla
                        .insert(mn.to_string(), vn.to_string());
                }
            }
            notes.extend(table.assign_local_labels(new_vanilla, old_modified, local, options));
        }

        (table, notes)
    }

    fn learn(&mut self, ov: &ScriptSource, nv: &ScriptSource, old: &Token, new: &Token) {
        if let (Some(o), Some(n)) = (old.label_name(), new.label_name()) {
            if self.labels_enabled {
                self.labels
                    .entry(o.to_string())
                    .or_insert_with(|| n.to_string());
            }
            return;
        }
        if old.opcode != new.opcode {
            return;
        }
        let (o, n) = (old.operand.trim(), new.operand.trim());

        if let Some(&group) = old.opcode().and_then(|op| self.slot_opcodes.get(op)) {
            self.slots
                .entry((group, o.to_string()))
                .or_insert_with(|| n.to_string());
        } else if self.labels_enabled && ov.references_label(old) && nv.references_label(new) {
            let existing = self
                .labels
                .entry(o.to_string())
                .or_insert_with(|| n.to_string());
            if *existing != n {
                tracing::debug!(label = o, kept = %existing, other = n, "conflicting label mapping");
            }
        }
    }

    fn assign_local_labels(
        &mut self,
        new_vanilla: &ScriptSource,
        old_modified: &ScriptSource,
        local: &Alignment,
        options: &RebaseOptions,
    ) -> Vec<RebaseNote> {
        let mut notes = Vec::new();
        let mut next = new_vanilla
            .labels()
            .chain(old_modified.labels())
            .filter_map(|(name, _)| label_number(name))
            .max()
            .map_or(0, |n| n + 1);
        let mut taken: HashSet<String> = new_vanilla.labels().map(|(n, _)| n.to_string()).collect();

        for m in local.inserted() {
            let Some(name) = old_modified.body()[m].label_name() else {
                continue;
            };
            let emitted = if options.rename_colliding_labels && taken.contains(name) {
                let fresh = loop {
                    let candidate = format!("{LABEL_PREFIX}{next}");
                    next += 1;
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                };
                notes.push(RebaseNote::RenamedLabel {
                    from: name.to_string(),
                    to: fresh.clone(),
                });
                fresh
            } else {
                name.to_string()
            };
            taken.insert(emitted.clone());
            self.local_labels.insert(name.to_string(), emitted);
        }
        notes
    }

    /// New name of an old vanilla label.
    pub fn label(&self, old: &str) -> Option<&str> {
        self.labels.get(old).map(String::as_str)
    }

    /// New operand of an old vanilla slot.
    pub fn slot(&self, group: usize, old: &str) -> Option<&str> {
        self.slots.get(&(group, old.to_string())).map(String::as_str)
    }

    /// Upstream change of a slot group's count.
    pub fn offset(&self, group: usize) -> i64 {
        self.rules.get(&group).map_or(0, |r| r.offset)
    }

    /// Resolve a label named in the locally modified version.
    fn resolve_label(&self, name: &str) -> Option<String> {
        if let Some(emitted) = self.local_labels.get(name) {
            return Some(emitted.clone());
        }
        let vanilla = self
            .local_to_vanilla
            .get(name)
            .map_or(name, String::as_str);
        self.labels.get(vanilla).cloned()
    }

    /// Translate a locally inserted line into the new version's terms.
    ///
    /// Label definitions take their assigned name; slot operands go
    /// through the learned table, then through the count offset when the
    /// slot was allocated locally; label references follow the label
    /// table. Anything else is left as written.
    pub fn rewrite(&self, token: &Token, old_modified: &ScriptSource) -> Rewritten {
        let mut out = token.clone();
        let unchanged = |token: Token| Rewritten {
            token,
            stale_label: None,
        };

        if let Some(name) = token.label_name() {
            if let Some(emitted) = self.local_labels.get(name) {
                out.opcode = Some(format!("{emitted}:"));
            }
            return unchanged(out);
        }

        let operand = token.operand.trim();
        if let Some(&group) = token.opcode().and_then(|op| self.slot_opcodes.get(op)) {
            if let Some(mapped) = self.slot(group, operand) {
                out.operand = mapped.to_string();
            } else if let (Ok(slot), Some(rule)) = (operand.parse::<i64>(), self.rules.get(&group)) {
                let local_slot = rule.old_count.map_or(true, |count| slot >= count);
                if local_slot && rule.offset != 0 {
                    out.operand = (slot + rule.offset).to_string();
                }
            }
            return unchanged(out);
        }

        let is_switch_row = token
            .opcode()
            .is_some_and(|op| op.ends_with(':') && !operand.is_empty());
        if self.labels_enabled && (is_switch_row || old_modified.references_label(token)) {
            return match self.resolve_label(operand) {
                Some(name) => {
                    out.operand = name;
                    unchanged(out)
                }
                None => Rewritten {
                    token: out,
                    stale_label: Some(operand.to_string()),
                },
            };
        }

        unchanged(out)
    }
}

/// Trailing number of a `LABEL<n>` style name.
fn label_number(name: &str) -> Option<u64> {
    let digits = name.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
