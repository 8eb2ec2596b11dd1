//! Shortest-path alignment over the implicit edit grid.
//!
//! Node `(i, j)` means "the first `i` old items and the first `j` new items
//! are explained". From every node three edges leave, offered in this fixed
//! order:
//!
//! - diagonal to `(i + 1, j + 1)`, weight `cost(old[i], new[j])` (match)
//! - insert to `(i, j + 1)`, weight [`GAP_COST`] (`new[j]` unmatched)
//! - delete to `(i + 1, j)`, weight [`GAP_COST`] (`old[i]` unmatched)
//!
//! A node's predecessor is only replaced on a strictly cheaper path, and
//! equal-cost frontier entries pop in the order they were pushed. Together
//! this makes ties resolve as match > insert > delete, which downstream
//! merges depend on for runs of identical items.

use super::cost::{sanitize, Dissimilarity, GAP_COST};
use super::result::Alignment;
use pathfinding::matrix::Matrix;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Diagonal,
    Insert,
    Delete,
}

const EDGE_ORDER: [Edge; 3] = [Edge::Diagonal, Edge::Insert, Edge::Delete];

/// Frontier entry; the heap pops the cheapest, oldest entry first.
#[derive(Debug)]
struct Frontier {
    cost: f64,
    seq: u64,
    old: usize,
    new: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Align `old` against `new` under `cost`.
///
/// Total over finite inputs; the worst case explains everything as
/// unmatched for `old.len() + new.len()`.
pub fn align<T, C>(old: &[T], new: &[T], cost: &C) -> Alignment
where
    C: Dissimilarity<T> + ?Sized,
{
    match try_align(old, new, |a, b| Ok::<_, Infallible>(cost.cost(a, b))) {
        Ok(alignment) => alignment,
        Err(never) => match never {},
    }
}

/// Align with a cost function that may fail.
///
/// The first error aborts the search and is returned unchanged.
pub fn try_align<T, E, F>(old: &[T], new: &[T], mut cost: F) -> Result<Alignment, E>
where
    F: FnMut(&T, &T) -> Result<f64, E>,
{
    if old.is_empty() || new.is_empty() {
        return Ok(Alignment::unmatched(old.len(), new.len()));
    }

    let rows = old.len() + 1;
    let columns = new.len() + 1;
    let target = (old.len(), new.len());

    let mut dist = Matrix::new(rows, columns, f64::INFINITY);
    let mut prev: Matrix<Option<Edge>> = Matrix::new(rows, columns, None);
    let mut settled = Matrix::new(rows, columns, false);
    let mut frontier = BinaryHeap::new();
    let mut seq = 0_u64;

    dist[(0, 0)] = 0.0;
    frontier.push(Frontier {
        cost: 0.0,
        seq,
        old: 0,
        new: 0,
    });

    while let Some(Frontier {
        cost: reached,
        old: i,
        new: j,
        ..
    }) = frontier.pop()
    {
        if settled[(i, j)] {
            continue;
        }
        settled[(i, j)] = true;
        if (i, j) == target {
            break;
        }

        for edge in EDGE_ORDER {
            let (vi, vj) = match edge {
                Edge::Diagonal if i < old.len() && j < new.len() => (i + 1, j + 1),
                Edge::Insert if j < new.len() => (i, j + 1),
                Edge::Delete if i < old.len() => (i + 1, j),
                _ => continue,
            };
            if settled[(vi, vj)] {
                continue;
            }

            let weight = match edge {
                Edge::Diagonal => sanitize(cost(&old[i], &new[j])?),
                Edge::Insert | Edge::Delete => GAP_COST,
            };
            let alt = reached + weight;
            if alt < dist[(vi, vj)] {
                dist[(vi, vj)] = alt;
                prev[(vi, vj)] = Some(edge);
                seq += 1;
                frontier.push(Frontier {
                    cost: alt,
                    seq,
                    old: vi,
                    new: vj,
                });
            }
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = target;
    while (i, j) != (0, 0) {
        let Some(edge) = prev[(i, j)] else {
            debug_assert!(false, "edit grid target unreachable at ({i}, {j})");
            break;
        };
        match edge {
            Edge::Diagonal => {
                pairs.push((i - 1, j - 1));
                i -= 1;
                j -= 1;
            }
            Edge::Insert => j -= 1,
            Edge::Delete => i -= 1,
        }
    }
    pairs.reverse();

    let total = dist[target];
    tracing::trace!(
        old = old.len(),
        new = new.len(),
        matched = pairs.len(),
        cost = total,
        "aligned sequences"
    );

    Ok(Alignment::from_pairs(old.len(), new.len(), pairs, total))
}
