//! Dissimilarity contract consumed by the aligner.

/// Weight of leaving an item unmatched on either side of an alignment.
pub const GAP_COST: f64 = 1.0;

/// Scores how different two items of the same kind are.
///
/// Implementations must be deterministic and side-effect free, return a
/// non-negative value, and score an item against itself as `0`. Values near
/// `0` mean "plausibly the same item", `1` means "confidently unrelated".
/// The scale is not bounded; anything above `2` can never beat a
/// deletion plus an insertion.
pub trait Dissimilarity<T: ?Sized> {
    fn cost(&self, old: &T, new: &T) -> f64;
}

impl<T: ?Sized, F> Dissimilarity<T> for F
where
    F: Fn(&T, &T) -> f64,
{
    fn cost(&self, old: &T, new: &T) -> f64 {
        self(old, new)
    }
}

/// Cost that only distinguishes equal from unequal items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl<T: PartialEq + ?Sized> Dissimilarity<T> for Exact {
    fn cost(&self, old: &T, new: &T) -> f64 {
        if old == new {
            0.0
        } else {
            1.0
        }
    }
}

/// Clamp a caller-supplied weight into the domain the search relies on.
///
/// Negative weights become `0`; NaN becomes infinite, so that pair is never
/// matched.
pub(crate) fn sanitize(weight: f64) -> f64 {
    if weight.is_nan() {
        f64::INFINITY
    } else {
        weight.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_dissimilarity() {
        let numeric = |a: &i32, b: &i32| f64::from((a - b).abs());
        assert_eq!(numeric.cost(&3, &5), 2.0);
    }

    #[test]
    fn test_exact() {
        assert_eq!(Exact.cost("a", "a"), 0.0);
        assert_eq!(Exact.cost("a", "b"), 1.0);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(-0.5), 0.0);
        assert_eq!(sanitize(0.25), 0.25);
        assert!(sanitize(f64::NAN).is_infinite());
    }
}
