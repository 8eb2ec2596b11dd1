//! Cost model for flat definition records.

use super::scoring::FieldScorer;
use crate::align::Dissimilarity;
use crate::model::Record;
use serde_json::Value;
use std::collections::BTreeMap;

/// Weight used for fields without an explicit entry.
pub const DEFAULT_FIELD_WEIGHT: f64 = 1.0;

/// Weighted per-field record dissimilarity.
///
/// The record's `name` is scored like a field called `name`. Strings are
/// graded by normalized Levenshtein distance so a renamed row still scores
/// closer than an unrelated one; all other values compare for equality. A
/// field present on one side only counts as fully different. The `id` is
/// never compared, since ids are what shifts between versions.
#[derive(Debug, Clone, Default)]
pub struct RecordCost {
    weights: BTreeMap<String, f64>,
}

impl RecordCost {
    #[must_use]
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self { weights }
    }

    fn weight(&self, field: &str) -> f64 {
        self.weights
            .get(field)
            .copied()
            .unwrap_or(DEFAULT_FIELD_WEIGHT)
    }

    fn score_value(&self, scorer: &mut FieldScorer, field: &str, a: Option<&Value>, b: Option<&Value>) {
        let weight = self.weight(field);
        if weight <= 0.0 {
            return;
        }
        match (a, b) {
            (Some(Value::String(a)), Some(Value::String(b))) => {
                scorer.graded(string_difference(a, b), weight);
            }
            (Some(a), Some(b)) => scorer.compare(a, b, weight),
            (None, None) => {}
            _ => scorer.graded(1.0, weight),
        }
    }
}

/// `1 - normalized_levenshtein`, `0` for equal strings.
#[must_use]
pub fn string_difference(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    1.0 - strsim::normalized_levenshtein(a, b)
}

impl Dissimilarity<Record> for RecordCost {
    fn cost(&self, a: &Record, b: &Record) -> f64 {
        let mut scorer = FieldScorer::new();

        let name_a = a.name.as_deref().map(|s| Value::String(s.to_string()));
        let name_b = b.name.as_deref().map(|s| Value::String(s.to_string()));
        self.score_value(&mut scorer, "name", name_a.as_ref(), name_b.as_ref());

        let mut keys: Vec<&String> = a.fields.keys().chain(b.fields.keys()).collect();
        keys.sort();
        keys.dedup();
        for key in keys {
            self.score_value(&mut scorer, key, a.fields.get(key), b.fields.get(key));
        }

        scorer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_different_id() {
        let a = Record::new(10, Some("Rune scimitar")).with_field("members", false);
        let b = Record::new(42, Some("Rune scimitar")).with_field("members", false);
        assert_eq!(RecordCost::default().cost(&a, &b), 0.0);
    }

    #[test]
    fn test_rename_is_closer_than_unrelated() {
        let cost = RecordCost::default();
        let a = Record::new(1, Some("Rune scimitar"));
        let renamed = Record::new(2, Some("Rune scimitar (or)"));
        let other = Record::new(3, Some("Lobster"));
        assert!(cost.cost(&a, &renamed) < cost.cost(&a, &other));
    }

    #[test]
    fn test_missing_field_counts_fully() {
        let cost = RecordCost::default();
        let a = Record::new(1, None).with_field("cost", 5);
        let b = Record::new(1, None);
        assert_eq!(cost.cost(&a, &b), 1.0);
    }

    #[test]
    fn test_weights_shift_the_balance() {
        let mut weights = BTreeMap::new();
        weights.insert("name".to_string(), 0.0);
        let cost = RecordCost::new(weights);
        let a = Record::new(1, Some("A")).with_field("model", 100);
        let b = Record::new(2, Some("B")).with_field("model", 100);
        assert_eq!(cost.cost(&a, &b), 0.0);
    }
}
