//! Notes for human review of a rebased script.

use crate::align::AlignmentSummary;
use serde::Serialize;
use std::fmt;

/// Something the rebaser did that a human should double-check.
///
/// Line numbers are 1-based positions in the emitted body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RebaseNote {
    /// A locally edited line was matched, but the upstream text was emitted
    DroppedLocalEdit {
        line: usize,
        local: String,
        upstream: String,
    },
    /// A line deleted locally still exists upstream and was emitted again
    RestoredLocalDeletion { line: usize, text: String },
    /// Local insertions whose anchor line disappeared upstream
    OrphanedInsertions {
        line: usize,
        anchor: String,
        count: usize,
    },
    /// A locally added label collided with an upstream label
    RenamedLabel { from: String, to: String },
    /// A carried-over line names a label that no longer maps anywhere
    StaleLabelReference { line: usize, label: String },
}

impl fmt::Display for RebaseNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedLocalEdit {
                line,
                local,
                upstream,
            } => write!(
                f,
                "line {line}: local edit `{local}` replaced by upstream `{upstream}`"
            ),
            Self::RestoredLocalDeletion { line, text } => {
                write!(f, "line {line}: locally deleted `{text}` restored")
            }
            Self::OrphanedInsertions {
                line,
                anchor,
                count,
            } => write!(
                f,
                "line {line}: {count} insertion(s) after removed upstream line `{anchor}`"
            ),
            Self::RenamedLabel { from, to } => write!(f, "label {from} renamed to {to}"),
            Self::StaleLabelReference { line, label } => {
                write!(f, "line {line}: reference to unmapped label {label}")
            }
        }
    }
}

/// Summary of one rebase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RebaseReport {
    /// Old vanilla against the locally modified version
    pub local: AlignmentSummary,
    /// Old vanilla against the new vanilla version
    pub upstream: AlignmentSummary,
    /// Local insertions carried into the output
    pub carried: usize,
    pub notes: Vec<RebaseNote>,
}

impl RebaseReport {
    /// No notes worth a human look.
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn orphaned(&self) -> usize {
        self.notes
            .iter()
            .map(|n| match n {
                RebaseNote::OrphanedInsertions { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_display() {
        let note = RebaseNote::OrphanedInsertions {
            line: 12,
            anchor: "pop_int".to_string(),
            count: 2,
        };
        assert_eq!(
            note.to_string(),
            "line 12: 2 insertion(s) after removed upstream line `pop_int`"
        );
    }

    #[test]
    fn test_orphaned_total() {
        let report = RebaseReport {
            notes: vec![
                RebaseNote::OrphanedInsertions {
                    line: 1,
                    anchor: "a".to_string(),
                    count: 2,
                },
                RebaseNote::RenamedLabel {
                    from: "LABEL3".to_string(),
                    to: "LABEL9".to_string(),
                },
                RebaseNote::OrphanedInsertions {
                    line: 5,
                    anchor: "b".to_string(),
                    count: 1,
                },
            ],
            ..RebaseReport::default()
        };
        assert_eq!(report.orphaned(), 3);
        assert!(!report.is_clean());
    }
}
