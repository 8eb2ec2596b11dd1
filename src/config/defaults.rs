//! Default values.

use super::types::{PipelineConfig, ScriptWeights};
use crate::idmap::DEFAULT_LOST_ID;

/// Similarity earned by an agreeing opcode.
pub const DEFAULT_OPCODE_WEIGHT: f64 = 0.7;

/// Similarity earned by an agreeing operand on top of the opcode.
pub const DEFAULT_OPERAND_WEIGHT: f64 = 0.3;

impl Default for ScriptWeights {
    fn default() -> Self {
        Self {
            opcode: DEFAULT_OPCODE_WEIGHT,
            operand: DEFAULT_OPERAND_WEIGHT,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            dry_run: false,
            validate_output: true,
            lost_id: DEFAULT_LOST_ID,
            version: None,
        }
    }
}
