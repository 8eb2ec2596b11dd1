//! Alignment results and their ordered traversal.

use serde::Serialize;

/// The outcome of aligning an `old` sequence against a `new` sequence.
///
/// Matches are stored as index pairs, strictly increasing on both sides,
/// so no two matches cross. Every item on either side is either matched
/// exactly once or unmatched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    old_len: usize,
    new_len: usize,
    pairs: Vec<(usize, usize)>,
    cost: f64,
    #[serde(skip)]
    old_to_new: Vec<Option<usize>>,
    #[serde(skip)]
    new_to_old: Vec<Option<usize>>,
}

/// One position in the ordered walk over an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Matched { old: usize, new: usize },
    /// Present only in `old` (deleted)
    OldOnly { old: usize },
    /// Present only in `new` (inserted)
    NewOnly { new: usize },
}

/// A [`Step`] resolved against the aligned slices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignedItem<'a, T> {
    Matched(&'a T, &'a T),
    OldOnly(&'a T),
    NewOnly(&'a T),
}

/// Counts for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AlignmentSummary {
    pub matched: usize,
    pub deleted: usize,
    pub inserted: usize,
    pub cost: f64,
}

impl Alignment {
    /// Alignment with nothing matched.
    pub(crate) fn unmatched(old_len: usize, new_len: usize) -> Self {
        Self {
            old_len,
            new_len,
            pairs: Vec::new(),
            cost: (old_len + new_len) as f64 * super::GAP_COST,
            old_to_new: vec![None; old_len],
            new_to_old: vec![None; new_len],
        }
    }

    /// Build from ascending, non-crossing pairs.
    pub(crate) fn from_pairs(
        old_len: usize,
        new_len: usize,
        pairs: Vec<(usize, usize)>,
        cost: f64,
    ) -> Self {
        let mut old_to_new = vec![None; old_len];
        let mut new_to_old = vec![None; new_len];
        for &(o, n) in &pairs {
            old_to_new[o] = Some(n);
            new_to_old[n] = Some(o);
        }
        Self {
            old_len,
            new_len,
            pairs,
            cost,
            old_to_new,
            new_to_old,
        }
    }

    pub fn old_len(&self) -> usize {
        self.old_len
    }

    pub fn new_len(&self) -> usize {
        self.new_len
    }

    /// Total path cost: match costs plus one per unmatched item.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Matched `(old, new)` index pairs, ascending on both sides.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn matched_count(&self) -> usize {
        self.pairs.len()
    }

    /// Counterpart in `new` of `old[index]`, if it was matched.
    pub fn new_for_old(&self, index: usize) -> Option<usize> {
        self.old_to_new.get(index).copied().flatten()
    }

    /// Counterpart in `old` of `new[index]`, if it was matched.
    pub fn old_for_new(&self, index: usize) -> Option<usize> {
        self.new_to_old.get(index).copied().flatten()
    }

    /// Old indices with no counterpart, ascending.
    pub fn deleted(&self) -> impl Iterator<Item = usize> + '_ {
        self.old_to_new
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.is_none().then_some(i))
    }

    /// New indices with no counterpart, ascending.
    pub fn inserted(&self) -> impl Iterator<Item = usize> + '_ {
        self.new_to_old
            .iter()
            .enumerate()
            .filter_map(|(j, m)| m.is_none().then_some(j))
    }

    /// Every item matched to the item at the same position.
    pub fn is_identity(&self) -> bool {
        self.old_len == self.new_len
            && self.pairs.len() == self.old_len
            && self.pairs.iter().all(|&(o, n)| o == n)
    }

    pub fn summary(&self) -> AlignmentSummary {
        AlignmentSummary {
            matched: self.pairs.len(),
            deleted: self.old_len - self.pairs.len(),
            inserted: self.new_len - self.pairs.len(),
            cost: self.cost,
        }
    }

    /// Walk both sequences in order.
    ///
    /// Unmatched old items are emitted before the new items that follow
    /// them, and unmatched new items are emitted as soon as the walk
    /// reaches a position the next old item does not map to. Each index
    /// on either side appears exactly once.
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            alignment: self,
            old: 0,
            new: 0,
        }
    }

    /// Like [`steps`](Self::steps), resolved against the aligned slices.
    ///
    /// `old` and `new` must be the slices this alignment was computed from.
    pub fn items<'a, T>(
        &'a self,
        old: &'a [T],
        new: &'a [T],
    ) -> impl Iterator<Item = AlignedItem<'a, T>> + 'a {
        self.steps().map(move |step| match step {
            Step::Matched { old: o, new: n } => AlignedItem::Matched(&old[o], &new[n]),
            Step::OldOnly { old: o } => AlignedItem::OldOnly(&old[o]),
            Step::NewOnly { new: n } => AlignedItem::NewOnly(&new[n]),
        })
    }
}

/// Iterator returned by [`Alignment::steps`].
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    alignment: &'a Alignment,
    old: usize,
    new: usize,
}

impl Iterator for Steps<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let a = self.alignment;
        if self.old >= a.old_len {
            if self.new >= a.new_len {
                return None;
            }
            self.new += 1;
            return Some(Step::NewOnly { new: self.new - 1 });
        }
        if self.new >= a.new_len {
            self.old += 1;
            return Some(Step::OldOnly { old: self.old - 1 });
        }

        match a.old_to_new[self.old] {
            None => {
                self.old += 1;
                Some(Step::OldOnly { old: self.old - 1 })
            }
            Some(target) if target != self.new => {
                self.new += 1;
                Some(Step::NewOnly { new: self.new - 1 })
            }
            Some(target) => {
                let step = Step::Matched {
                    old: self.old,
                    new: target,
                };
                self.old += 1;
                self.new += 1;
                Some(step)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let a = self.alignment;
        let old_left = a.old_len.saturating_sub(self.old);
        let new_left = a.new_len.saturating_sub(self.new);
        (old_left.max(new_left), Some(old_left + new_left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_order() {
        // old: a b c    new: x a c d
        let alignment = Alignment::from_pairs(3, 4, vec![(0, 1), (2, 2)], 3.0);
        let steps: Vec<Step> = alignment.steps().collect();
        assert_eq!(
            steps,
            vec![
                Step::NewOnly { new: 0 },
                Step::Matched { old: 0, new: 1 },
                Step::OldOnly { old: 1 },
                Step::Matched { old: 2, new: 2 },
                Step::NewOnly { new: 3 },
            ]
        );
    }

    #[test]
    fn test_items_resolve_against_slices() {
        let old = ["a", "b"];
        let new = ["a", "c"];
        let alignment = Alignment::from_pairs(2, 2, vec![(0, 0)], 2.0);
        let items: Vec<_> = alignment.items(&old, &new).collect();
        assert_eq!(
            items,
            vec![
                AlignedItem::Matched(&"a", &"a"),
                AlignedItem::OldOnly(&"b"),
                AlignedItem::NewOnly(&"c"),
            ]
        );
    }

    #[test]
    fn test_summary_and_lookups() {
        let alignment = Alignment::from_pairs(3, 2, vec![(1, 0)], 3.0);
        assert_eq!(alignment.new_for_old(1), Some(0));
        assert_eq!(alignment.old_for_new(0), Some(1));
        assert_eq!(alignment.new_for_old(7), None);

        let summary = alignment.summary();
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.inserted, 1);
    }

    #[test]
    fn test_unmatched_cost() {
        let alignment = Alignment::unmatched(2, 3);
        assert_eq!(alignment.cost(), 5.0);
        assert!(!alignment.is_identity());
        assert!(Alignment::unmatched(0, 0).is_identity());
    }
}
