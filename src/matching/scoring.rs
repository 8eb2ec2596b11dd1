//! Weighted per-field difference accumulation.
//!
//! Cost adapters walk an explicit list of fields, feeding each comparison
//! into a [`FieldScorer`]; the final cost is the weighted fraction of the
//! compared weight that differed.

use std::collections::HashSet;
use std::hash::Hash;

/// A field value extracted for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Int(i64),
    Bool(bool),
    Str(Option<&'a str>),
}

/// A named, weighted accessor into an item of type `T`.
pub struct Field<T> {
    pub name: &'static str,
    pub get: fn(&T) -> FieldValue<'_>,
    pub weight: f64,
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Accumulates weighted differences; see [`FieldScorer::finish`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldScorer {
    diff: f64,
    total: f64,
}

impl FieldScorer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `weight` as compared, and as differing when `a != b`.
    pub fn compare<V: PartialEq>(&mut self, a: V, b: V, weight: f64) {
        self.total += weight;
        if a != b {
            self.diff += weight;
        }
    }

    /// Compare every field of a table.
    pub fn fields<T>(&mut self, table: &[Field<T>], a: &T, b: &T) {
        for field in table {
            self.compare((field.get)(a), (field.get)(b), field.weight);
        }
    }

    /// Count `weight` as compared with a graded difference in `0..=1`.
    pub fn graded(&mut self, difference: f64, weight: f64) {
        self.total += weight;
        self.diff += difference.clamp(0.0, 1.0) * weight;
    }

    /// Add raw amounts.
    pub fn add(&mut self, diff: f64, total: f64) {
        self.diff += diff;
        self.total += total;
    }

    /// Optional collections compared as sets.
    ///
    /// `base` weight is always counted. When either side is present a
    /// further `presence` weight is counted; one side missing differs by
    /// `base + presence`, otherwise the difference is the symmetric
    /// difference over the union, scaled by `base + presence`.
    pub fn sets<V: Eq + Hash>(&mut self, a: Option<&[V]>, b: Option<&[V]>, base: f64, presence: f64) {
        self.total += base;
        match (a, b) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => {
                self.total += presence;
                self.diff += base + presence;
            }
            (Some(a), Some(b)) => {
                self.total += presence;
                self.diff += set_difference(a, b) * (base + presence);
            }
        }
    }

    pub fn diff(&self) -> f64 {
        self.diff
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Weighted fraction of differing weight; `0` when nothing was compared.
    #[must_use]
    pub fn finish(&self) -> f64 {
        if self.total > 0.0 {
            self.diff / self.total
        } else {
            0.0
        }
    }
}

/// `|A △ B| / |A ∪ B|`, or `0` for two empty sets.
#[must_use]
pub fn set_difference<V: Eq + Hash>(a: &[V], b: &[V]) -> f64 {
    let a: HashSet<&V> = a.iter().collect();
    let b: HashSet<&V> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.symmetric_difference(&b).count() as f64 / union as f64
}
