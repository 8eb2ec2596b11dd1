//! Configuration types for cache-code-updater runs.

use crate::matching::{RecordCost, ScriptLineCost};
use crate::rebase::RebaseOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a YAML file and layered with CLI
/// flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Cost-function weights
    pub matching: MatchingConfig,
    /// Operand groups and label handling for script rebasing
    pub rebase: RebaseOptions,
    /// Batch orchestration
    pub pipeline: PipelineConfig,
    /// Journal and report output
    pub output: OutputConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Fluent construction, mostly for layering CLI flags over file config.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Start from an already loaded config.
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub const fn workers(mut self, workers: Option<usize>) -> Self {
        self.config.pipeline.workers = workers;
        self
    }

    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.pipeline.dry_run = dry_run;
        self
    }

    pub const fn validate_output(mut self, validate: bool) -> Self {
        self.config.pipeline.validate_output = validate;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.pipeline.version = Some(version.into());
        self
    }

    pub fn journal(mut self, path: PathBuf) -> Self {
        self.config.output.journal = Some(path);
        self
    }

    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub const fn adjust_var_counts(mut self, adjust: bool) -> Self {
        self.config.rebase.adjust_var_counts = adjust;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Cost-function weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchingConfig {
    /// Script line weights
    pub script: ScriptWeights,
    /// Per-field weights for flat definition records; unlisted fields weigh 1.0
    pub record_fields: BTreeMap<String, f64>,
}

impl MatchingConfig {
    pub fn script_cost(&self) -> ScriptLineCost {
        ScriptLineCost::new(self.script.opcode, self.script.operand)
    }

    pub fn record_cost(&self) -> RecordCost {
        RecordCost::new(self.record_fields.clone())
    }
}

/// Similarity earned by agreeing opcodes, and additionally by agreeing
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScriptWeights {
    pub opcode: f64,
    pub operand: f64,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Batch orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker threads; unset uses the available parallelism
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Compute everything but write nothing
    pub dry_run: bool,
    /// Re-tokenize and check every rebased script before writing
    pub validate_output: bool,
    /// Value written for ids whose object disappeared upstream
    pub lost_id: i64,
    /// Cache revision named in the journal subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Output
// ============================================================================

/// Report format for batch summaries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Journal and report output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the commit message for a batch is written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<PathBuf>,
    pub format: OutputFormat,
}
