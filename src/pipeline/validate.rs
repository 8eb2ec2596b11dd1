//! Soundness checks on a rebased script before it is written.
//!
//! Failing any of these does not block the write; the issues are logged
//! for a human to look at.

use crate::model::ScriptSource;
use crate::rebase::RebaseOptions;
use serde::Serialize;
use std::fmt;

/// A problem found in emitted script text. Lines are 1-based body lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputIssue {
    /// The text does not tokenize (including duplicate labels)
    Unparseable { error: String },
    /// A branch or switch row names a label that is not defined
    UnresolvedTarget { line: usize, label: String },
    /// A slot operand beyond the count the header declares
    SlotOutOfRange {
        line: usize,
        group: String,
        slot: i64,
        count: i64,
    },
}

impl fmt::Display for OutputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable { error } => write!(f, "does not parse: {error}"),
            Self::UnresolvedTarget { line, label } => {
                write!(f, "line {line}: branch to undefined label {label}")
            }
            Self::SlotOutOfRange {
                line,
                group,
                slot,
                count,
            } => write!(f, "line {line}: {group} slot {slot} beyond declared count {count}"),
        }
    }
}

/// Re-tokenize `text` and check what an assembler would reject.
pub fn validate_script(text: &str, options: &RebaseOptions) -> Vec<OutputIssue> {
    let source = match ScriptSource::parse(text) {
        Ok(source) => source,
        Err(e) => {
            return vec![OutputIssue::Unparseable {
                error: format!("{:#}", anyhow::Error::from(e)),
            }]
        }
    };

    let counts: Vec<(usize, Option<i64>)> = options
        .slot_groups()
        .map(|(i, group)| {
            let count = group
                .count_directive
                .as_deref()
                .and_then(|d| source.directive_int(d).ok());
            (i, count)
        })
        .collect();

    let mut issues = Vec::new();
    for (index, token) in source.body().iter().enumerate() {
        let line = index + 1;
        let Some(opcode) = token.opcode() else {
            continue;
        };
        let operand = token.operand.trim();
        if token.is_label() || operand.is_empty() {
            continue;
        }

        let is_switch_row = opcode.ends_with(':');
        if is_switch_row || options.is_branch(opcode) {
            if source.label(operand).is_none() {
                issues.push(OutputIssue::UnresolvedTarget {
                    line,
                    label: operand.to_string(),
                });
            }
            continue;
        }

        let Some(group) = options.slot_group_for(opcode) else {
            continue;
        };
        let count = counts
            .iter()
            .find(|(i, _)| *i == group)
            .and_then(|(_, count)| *count);
        if let (Some(count), Ok(slot)) = (count, operand.parse::<i64>()) {
            if slot >= count {
                issues.push(OutputIssue::SlotOutOfRange {
                    line,
                    group: options.symbol_groups[group].name.clone(),
                    slot,
                    count,
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = ".id                 12\n.int_var_count      2\n";

    fn check(body: &str) -> Vec<OutputIssue> {
        validate_script(&format!("{HEADER}{body}"), &RebaseOptions::default())
    }

    #[test]
    fn test_clean_script() {
        let issues = check(
            "   iload                  1\n   branch_if_true         LABEL4\n   switch\n   1: LABEL4\nLABEL4:\n   return\n",
        );
        assert_eq!(issues, vec![]);
    }

    #[test]
    fn test_unresolved_branch_and_switch_row() {
        let issues = check("   jump                   LABEL9\n   3: LABEL8\n   return\n");
        assert_eq!(
            issues,
            vec![
                OutputIssue::UnresolvedTarget {
                    line: 1,
                    label: "LABEL9".to_string()
                },
                OutputIssue::UnresolvedTarget {
                    line: 2,
                    label: "LABEL8".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_slot_beyond_count() {
        let issues = check("   istore                 2\n   return\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "line 1: int slot 2 beyond declared count 2"
        );
    }

    #[test]
    fn test_duplicate_label_is_unparseable() {
        let issues = check("LABEL1:\n   return\nLABEL1:\n");
        assert!(matches!(&issues[0], OutputIssue::Unparseable { error } if error.contains("LABEL1")));
    }
}
