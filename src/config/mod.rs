//! Configuration for cache-code-updater.
//!
//! - Type-safe configuration structures with defaults
//! - Validation reporting every problem at once
//! - YAML config file loading and discovery
//! - JSON schema for editor support
//!
//! # Configuration File
//!
//! Place a `.cache-code-updater.yaml` file in your project root or
//! `~/.config/cache-code-updater/`:
//!
//! ```yaml
//! pipeline:
//!   workers: 4
//!   version: '231'
//! output:
//!   journal: ./COMMIT_MSG
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{DEFAULT_OPCODE_WEIGHT, DEFAULT_OPERAND_WEIGHT};
pub use types::{
    AppConfig, AppConfigBuilder, MatchingConfig, OutputConfig, OutputFormat, PipelineConfig,
    ScriptWeights,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

/// JSON Schema of the config file format.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
