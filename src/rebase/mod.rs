//! Patch rebasing: carry hand-made script edits across an upstream revision.
//!
//! Two alignments drive the merge:
//!
//! - old vanilla against the locally modified script, which tells which
//!   lines were added locally and which upstream line each one follows
//! - old vanilla against new vanilla, which tells where each old line went
//!
//! The new vanilla body is then walked in order and the local insertions
//! are replayed after their anchors, with labels and variable slots
//! translated through a [`RemapTable`].
//!
//! # Example
//!
//! ```
//! use cache_code_updater::model::ScriptSource;
//! use cache_code_updater::rebase::rebase;
//!
//! let old = ScriptSource::parse(".id 1\n   iconst 1\n   return\n")?;
//! let local = ScriptSource::parse(".id 1\n   iconst 1\n   invoke 9\n   return\n")?;
//! let new = ScriptSource::parse(".id 1\n   iconst 1\n   pop_int\n   return\n")?;
//!
//! let merged = rebase(&old, &new, &local);
//! let opcodes: Vec<_> = merged.body.iter().filter_map(|t| t.opcode()).collect();
//! assert_eq!(opcodes, ["iconst", "invoke", "pop_int", "return"]);
//! # Ok::<(), cache_code_updater::UpdaterError>(())
//! ```

mod engine;
mod options;
mod remap;
mod report;

pub use engine::{rebase, Rebased, Rebaser};
pub use options::{RebaseOptions, SymbolGroup, SymbolKind};
pub use remap::{RemapTable, Rewritten};
pub use report::{RebaseNote, RebaseReport};
