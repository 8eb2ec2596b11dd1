//! Domain cost functions for the aligner.
//!
//! Each adapter implements [`Dissimilarity`](crate::align::Dissimilarity)
//! for one item kind:
//!
//! - [`ScriptLineCost`]: script lines (opcode and operand agreement)
//! - [`WidgetCost`]: widget nodes (per-type field tables)
//! - [`RecordCost`]: flat definition rows (configurable field weights)
//!
//! Shared accumulation lives in [`scoring`].

mod record;
pub mod scoring;
mod script;
mod widget;

pub use record::{string_difference, RecordCost, DEFAULT_FIELD_WEIGHT};
pub use scoring::{set_difference, Field, FieldScorer, FieldValue};
pub use script::ScriptLineCost;
pub use widget::WidgetCost;
