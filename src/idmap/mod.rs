//! Single-lookup id remapping.
//!
//! Flat tables need no merge: one alignment of the old against the new
//! snapshot answers "what did old item X become", and every constant
//! naming an old item is rewritten to the answer. Items with no
//! counterpart get a sentinel value and are reported, never silently
//! carried over.

mod tables;
mod widgets;

pub use tables::remap_record_ids;
pub use widgets::{referenced_groups, remap_widget_ids, WidgetGroupMapping};

use crate::align::{align, Alignment, Dissimilarity};
use serde::Serialize;

/// Id written for items that disappeared upstream.
pub const DEFAULT_LOST_ID: i64 = -1;

/// Where an old item went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Index of the counterpart in the new sequence
    Mapped(usize),
    Lost,
}

/// Old-to-new lookup backed by one alignment.
#[derive(Debug, Clone)]
pub struct IdMapping {
    alignment: Alignment,
}

impl IdMapping {
    pub fn build<T, C>(old: &[T], new: &[T], cost: &C) -> Self
    where
        C: Dissimilarity<T> + ?Sized,
    {
        Self {
            alignment: align(old, new, cost),
        }
    }

    pub fn lookup(&self, old_index: usize) -> Lookup {
        match self.alignment.new_for_old(old_index) {
            Some(new) => Lookup::Mapped(new),
            None => Lookup::Lost,
        }
    }

    pub fn old_len(&self) -> usize {
        self.alignment.old_len()
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }
}

/// One rewritten constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdChange {
    pub name: String,
    pub old: i64,
    /// `None` when the item was lost
    pub new: Option<i64>,
}

/// Outcome of remapping one constants file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdUpdateReport {
    /// Constants whose value changed
    pub changed: Vec<IdChange>,
    /// Constants whose item has no counterpart upstream
    pub lost: Vec<IdChange>,
    /// Constants that matched nothing in the old snapshot and were left alone
    pub unknown: Vec<String>,
    /// Constants whose item kept its id
    pub unchanged: Vec<String>,
}

impl IdUpdateReport {
    pub fn is_modified(&self) -> bool {
        !self.changed.is_empty() || !self.lost.is_empty()
    }

    /// Journal lines describing the update.
    pub fn journal_lines(&self, kind: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for change in &self.lost {
            lines.push(format!("lost {kind} {} {}", change.name, change.old));
        }
        for change in &self.changed {
            if let Some(new) = change.new {
                lines.push(format!(
                    "{kind} {} moved {} -> {}",
                    change.name, change.old, new
                ));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Exact;

    #[test]
    fn test_lookup() {
        let mapping = IdMapping::build(&["a", "b", "c"], &["a", "c"], &Exact);
        assert_eq!(mapping.lookup(0), Lookup::Mapped(0));
        assert_eq!(mapping.lookup(2), Lookup::Mapped(1));
        assert_eq!(mapping.lookup(1), Lookup::Lost);
        assert_eq!(mapping.lookup(99), Lookup::Lost);
    }

    #[test]
    fn test_lookup_tie_keeps_diagonal() {
        // Substituting c for d costs the same as dropping b and adding d
        let mapping = IdMapping::build(&["a", "b", "c"], &["a", "c", "d"], &Exact);
        assert_eq!(mapping.lookup(1), Lookup::Mapped(1));
        assert_eq!(mapping.lookup(2), Lookup::Mapped(2));
    }

    #[test]
    fn test_journal_lines() {
        let report = IdUpdateReport {
            changed: vec![IdChange {
                name: "COINS".to_string(),
                old: 995,
                new: Some(996),
            }],
            lost: vec![IdChange {
                name: "OLD_HAT".to_string(),
                old: 10,
                new: None,
            }],
            ..IdUpdateReport::default()
        };
        assert!(report.is_modified());
        assert_eq!(
            report.journal_lines("item"),
            vec!["lost item OLD_HAT 10", "item COINS moved 995 -> 996"]
        );
    }
}
