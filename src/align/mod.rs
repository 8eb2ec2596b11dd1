//! Fuzzy structural alignment of two item sequences.
//!
//! Given an `old` and a `new` snapshot of an ordered collection with no
//! reliable cross-version key, the aligner explains `new` as the cheapest
//! combination of matches, deletions and insertions under a caller-supplied
//! [`Dissimilarity`] model.
//!
//! # Architecture
//!
//! - [`align`] / [`try_align`]: shortest-path search over the implicit
//!   `(old, new)` edit grid
//! - [`Dissimilarity`]: the cost contract (`0` = same, `1` = unrelated)
//! - [`Alignment`]: the result, with point lookups and an ordered
//!   [`Step`] traversal
//!
//! # Example
//!
//! ```
//! use cache_code_updater::align::{align, Exact, Step};
//!
//! let old = ["a", "b", "c"];
//! let new = ["a", "c", "d"];
//! let alignment = align(&old, &new, &Exact);
//!
//! assert_eq!(alignment.new_for_old(2), Some(1));
//! assert_eq!(alignment.new_for_old(1), None);
//! assert!(alignment.steps().any(|s| s == Step::NewOnly { new: 2 }));
//! ```

mod cost;
mod engine;
mod result;

pub use cost::{Dissimilarity, Exact, GAP_COST};
pub use engine::{align, try_align};
pub use result::{AlignedItem, Alignment, AlignmentSummary, Step, Steps};
