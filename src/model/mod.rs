//! Item models for the three kinds of artifacts the updater maintains.
//!
//! - [`ScriptSource`] / [`Token`]: tokenized assembly-like scripts
//! - [`WidgetNode`]: widget layout definitions, grouped per interface
//! - [`Record`]: flat definition rows behind generated ID tables
//! - [`ConstantsFile`]: the generated `int NAME = value;` sources that
//!   reference those ids

mod constants;
mod record;
mod script;
mod widget;

pub use constants::*;
pub use record::*;
pub use script::*;
pub use widget::*;
