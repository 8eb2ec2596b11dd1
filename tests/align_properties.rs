//! Property-based tests for the sequence aligner.
//!
//! Checks the structural guarantees of every alignment (no crossing
//! matches, every item accounted for exactly once) and optimality against
//! an exhaustive search on short inputs.

use cache_code_updater::align::{align, try_align, Exact, Step, GAP_COST};
use proptest::prelude::*;

/// Graded cost over small integers: 0 for equal, up to 1 for far apart.
fn graded(a: &u8, b: &u8) -> f64 {
    f64::from(a.abs_diff(*b)) / 3.0
}

/// Cheapest explanation of `old[i..]` against `new[j..]`, trying every
/// classification of every item.
fn brute_force(old: &[u8], new: &[u8]) -> f64 {
    match (old.split_first(), new.split_first()) {
        (None, _) => new.len() as f64 * GAP_COST,
        (_, None) => old.len() as f64 * GAP_COST,
        (Some((a, old_rest)), Some((b, new_rest))) => {
            let matched = graded(a, b) + brute_force(old_rest, new_rest);
            let deleted = GAP_COST + brute_force(old_rest, new);
            let inserted = GAP_COST + brute_force(old, new_rest);
            matched.min(deleted).min(inserted)
        }
    }
}

fn small_seq(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn self_alignment_is_identity(s in small_seq(30)) {
        let alignment = align(&s, &s, &graded);
        prop_assert!(alignment.is_identity());
        prop_assert_eq!(alignment.cost(), 0.0);
    }

    #[test]
    fn matches_never_cross(old in small_seq(20), new in small_seq(20)) {
        let alignment = align(&old, &new, &graded);
        for pair in alignment.pairs().windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
            prop_assert!(pair[0].1 < pair[1].1);
        }
    }

    #[test]
    fn every_item_accounted_for(old in small_seq(20), new in small_seq(20)) {
        let alignment = align(&old, &new, &graded);
        let summary = alignment.summary();
        prop_assert_eq!(summary.matched + summary.deleted, old.len());
        prop_assert_eq!(summary.matched + summary.inserted, new.len());
        prop_assert_eq!(alignment.deleted().count(), summary.deleted);
        prop_assert_eq!(alignment.inserted().count(), summary.inserted);

        let mut seen_old = vec![0; old.len()];
        let mut seen_new = vec![0; new.len()];
        for step in alignment.steps() {
            match step {
                Step::Matched { old, new } => {
                    seen_old[old] += 1;
                    seen_new[new] += 1;
                }
                Step::OldOnly { old } => seen_old[old] += 1,
                Step::NewOnly { new } => seen_new[new] += 1,
            }
        }
        prop_assert!(seen_old.iter().all(|&n| n == 1));
        prop_assert!(seen_new.iter().all(|&n| n == 1));
    }

    #[test]
    fn steps_visit_in_order(old in small_seq(20), new in small_seq(20)) {
        let alignment = align(&old, &new, &graded);
        let (mut next_old, mut next_new) = (0, 0);
        for step in alignment.steps() {
            match step {
                Step::Matched { old, new } => {
                    prop_assert_eq!((old, new), (next_old, next_new));
                    next_old += 1;
                    next_new += 1;
                }
                Step::OldOnly { old } => {
                    prop_assert_eq!(old, next_old);
                    next_old += 1;
                }
                Step::NewOnly { new } => {
                    prop_assert_eq!(new, next_new);
                    next_new += 1;
                }
            }
        }
    }

    #[test]
    fn cost_is_sum_of_its_parts(old in small_seq(20), new in small_seq(20)) {
        let alignment = align(&old, &new, &graded);
        let summary = alignment.summary();
        let matched: f64 = alignment
            .pairs()
            .iter()
            .map(|&(o, n)| graded(&old[o], &new[n]))
            .sum();
        let expected = matched + (summary.deleted + summary.inserted) as f64 * GAP_COST;
        prop_assert!((alignment.cost() - expected).abs() < 1e-9);
    }

    #[test]
    fn cost_is_optimal(old in small_seq(5), new in small_seq(5)) {
        let alignment = align(&old, &new, &graded);
        let best = brute_force(&old, &new);
        prop_assert!(
            (alignment.cost() - best).abs() < 1e-9,
            "aligner found {} but {} is possible",
            alignment.cost(),
            best
        );
    }

    #[test]
    fn lookups_agree_with_pairs(old in small_seq(20), new in small_seq(20)) {
        let alignment = align(&old, &new, &Exact);
        for &(o, n) in alignment.pairs() {
            prop_assert_eq!(alignment.new_for_old(o), Some(n));
            prop_assert_eq!(alignment.old_for_new(n), Some(o));
        }
    }
}

#[test]
fn empty_sides_are_trivially_unmatched() {
    let alignment = align(&[] as &[u8], &[1, 2, 3], &graded);
    assert_eq!(alignment.matched_count(), 0);
    assert_eq!(alignment.cost(), 3.0);
    assert_eq!(
        alignment.steps().collect::<Vec<_>>(),
        vec![
            Step::NewOnly { new: 0 },
            Step::NewOnly { new: 1 },
            Step::NewOnly { new: 2 }
        ]
    );

    let alignment = align(&[1, 2], &[] as &[u8], &graded);
    assert_eq!(alignment.deleted().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn removed_item_in_the_middle() {
    let alignment = align(&[1, 2, 3, 4], &[1, 2, 4], &Exact);
    assert_eq!(alignment.pairs(), &[(0, 0), (1, 1), (3, 2)]);
    assert_eq!(alignment.cost(), 1.0);
}

#[test]
fn duplicate_run_keeps_earliest_match() {
    // Deleting either copy costs the same; the first copy stays matched.
    let alignment = align(&["a", "a"], &["a"], &Exact);
    assert_eq!(alignment.pairs(), &[(0, 0)]);

    let alignment = align(&["a"], &["a", "a"], &Exact);
    assert_eq!(alignment.pairs(), &[(0, 0)]);
}

#[test]
fn equal_cost_prefers_match_over_gaps() {
    // A match costing 2 ties with a deletion plus an insertion.
    let costly = |_: &char, _: &char| 2.0;
    let alignment = align(&['x'], &['y'], &costly);
    assert_eq!(alignment.pairs(), &[(0, 0)]);
    assert_eq!(alignment.cost(), 2.0);
}

#[test]
fn equal_cost_prefers_insertion_before_deletion() {
    // Keeping either letter costs 2; the winning path inserts the new b
    // before it deletes the old one.
    let far = |a: &char, b: &char| if a == b { 0.0 } else { 3.0 };
    let alignment = align(&['a', 'b'], &['b', 'a'], &far);
    assert_eq!(alignment.pairs(), &[(0, 1)]);
    assert_eq!(alignment.cost(), 2.0);
    assert_eq!(
        alignment.steps().collect::<Vec<_>>(),
        vec![
            Step::NewOnly { new: 0 },
            Step::Matched { old: 0, new: 1 },
            Step::OldOnly { old: 1 },
        ]
    );
}

#[test]
fn nan_cost_never_matches() {
    let broken = |_: &u8, _: &u8| f64::NAN;
    let alignment = align(&[1], &[1], &broken);
    assert_eq!(alignment.matched_count(), 0);
    assert_eq!(alignment.cost(), 2.0);
}

#[test]
fn try_align_propagates_cost_errors() {
    let result = try_align(&[1, 2], &[1, 3], |a: &u8, b: &u8| {
        if a == b {
            Ok(0.0)
        } else {
            Err(format!("cannot compare {a} and {b}"))
        }
    });
    assert!(result.unwrap_err().contains("cannot compare"));
}
