//! **Carry hand-maintained code across game-cache revisions.**
//!
//! A game client ships a new cache every week or so. Projects that keep
//! annotated copies of its scripts, or generated tables of widget and
//! definition ids, have to bring those along each time. Nothing in the
//! cache carries a stable key across revisions, so `cache-code-updater`
//! lines the old and new versions up by structure instead.
//!
//! ## Core Concepts & Modules
//!
//! - **[`align`]**: the fuzzy sequence aligner. Given two ordered
//!   sequences and a [`Dissimilarity`](align::Dissimilarity), it finds the
//!   cheapest explanation of `new` in terms of `old` as non-crossing
//!   matches plus insertions and deletions.
//! - **[`model`]**: tokenized scripts, widget nodes, definition records and
//!   the generated constants files that name them.
//! - **[`matching`]**: the cost functions for each of those item kinds.
//! - **[`rebase`]**: the three-way [`Rebaser`] that replays local script
//!   edits onto a new upstream version, remapping labels and variable
//!   slots.
//! - **[`idmap`]**: single-alignment lookups for id constants.
//! - **[`pipeline`]**: snapshot directories, the worker pool, per-object
//!   batches and the commit-message [`Journal`].
//!
//! ## Aligning Two Sequences
//!
//! ```
//! use cache_code_updater::align::{align, Exact};
//!
//! let old = ["iconst", "invoke", "return"];
//! let new = ["iconst", "pop_int", "invoke", "return"];
//! let alignment = align(&old, &new, &Exact);
//!
//! assert_eq!(alignment.new_for_old(1), Some(2));
//! assert_eq!(alignment.inserted().collect::<Vec<_>>(), vec![1]);
//! ```
//!
//! ## Rebasing a Script
//!
//! ```
//! use cache_code_updater::{Rebaser, ScriptSource};
//!
//! let old = ScriptSource::parse(".id 5\n   iconst 1\n   return\n")?;
//! let mine = ScriptSource::parse(".id 5\n   iconst 1 ; one\n   return\n")?;
//! let new = ScriptSource::parse(".id 5\n   iconst 2\n   iconst 1\n   return\n")?;
//!
//! let merged = Rebaser::default().rebase(&old, &new, &mine);
//! assert!(merged.render().contains("; one"));
//! # Ok::<(), cache_code_updater::UpdaterError>(())
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `cache-code-updater` binary wraps these in the `align`, `rebase`,
//! `scripts`, `widgets` and `ids` subcommands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Index/length casts between usize, i64 and f64 are bounded by input sizes
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod align;
pub mod cli;
pub mod config;
pub mod error;
pub mod idmap;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod rebase;
pub mod utils;

// Re-export main types for convenience
pub use align::{align, try_align, Alignment, Dissimilarity, Step};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use error::{ErrorContext, Result, UpdaterError};
pub use idmap::{IdMapping, IdUpdateReport, Lookup};
pub use matching::{RecordCost, ScriptLineCost, WidgetCost};
pub use model::{ConstantsFile, Record, ScriptSource, Token, WidgetNode};
pub use pipeline::{BatchSummary, DirectorySnapshot, Journal, Outcome, SnapshotSource, WorkerPool};
pub use rebase::{RebaseOptions, RebaseReport, Rebased, Rebaser};
