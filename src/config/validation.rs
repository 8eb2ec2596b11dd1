//! Configuration validation.

use super::types::{AppConfig, MatchingConfig, OutputConfig, PipelineConfig};
use crate::rebase::{RebaseOptions, SymbolKind};
use std::collections::HashSet;

// ============================================================================
// Configuration Error
// ============================================================================

/// One problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Every problem found, not just the first.
    fn validate(&self) -> Vec<ConfigError>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.matching.validate());
        errors.extend(self.rebase.validate());
        errors.extend(self.pipeline.validate());
        errors.extend(self.output.validate());
        errors
    }
}

fn check_weight(errors: &mut Vec<ConfigError>, field: &str, weight: f64) {
    if !weight.is_finite() || weight < 0.0 {
        errors.push(ConfigError::new(
            field,
            format!("Weight must be a non-negative number, got {weight}"),
        ));
    }
}

impl Validatable for MatchingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let script = &self.script;
        check_weight(&mut errors, "matching.script.opcode", script.opcode);
        check_weight(&mut errors, "matching.script.operand", script.operand);

        let sum = script.opcode + script.operand;
        if errors.is_empty() && !(sum > 0.0 && sum <= 1.0) {
            errors.push(ConfigError::new(
                "matching.script",
                format!("opcode + operand must be in (0, 1], got {sum}"),
            ));
        }

        for (field, &weight) in &self.record_fields {
            check_weight(&mut errors, &format!("matching.record_fields.{field}"), weight);
        }
        errors
    }
}

impl Validatable for RebaseOptions {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();
        let mut claimed = HashSet::new();

        for (i, group) in self.symbol_groups.iter().enumerate() {
            let field = format!("rebase.symbol_groups[{i}]");
            if !names.insert(group.name.as_str()) {
                errors.push(ConfigError::new(
                    &field,
                    format!("Duplicate group name '{}'", group.name),
                ));
            }
            match group.kind {
                SymbolKind::Slot if group.opcodes.is_empty() => {
                    errors.push(ConfigError::new(&field, "Slot group lists no opcodes"));
                }
                SymbolKind::Label if !group.opcodes.is_empty() => {
                    errors.push(ConfigError::new(
                        &field,
                        "Label groups are recognized by label syntax and take no opcodes",
                    ));
                }
                _ => {}
            }
            for opcode in &group.opcodes {
                if !claimed.insert(opcode.as_str()) {
                    errors.push(ConfigError::new(
                        &field,
                        format!("Opcode '{opcode}' already belongs to another group"),
                    ));
                }
            }
        }

        let labels = self
            .symbol_groups
            .iter()
            .filter(|g| g.kind == SymbolKind::Label)
            .count();
        if labels > 1 {
            errors.push(ConfigError::new(
                "rebase.symbol_groups",
                format!("At most one label group allowed, found {labels}"),
            ));
        }
        errors
    }
}

impl Validatable for PipelineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.workers == Some(0) {
            errors.push(ConfigError::new(
                "pipeline.workers",
                "Worker count must be at least 1",
            ));
        }
        if self.lost_id >= 0 {
            errors.push(ConfigError::new(
                "pipeline.lost_id",
                format!("Lost-id sentinel must be negative, got {}", self.lost_id),
            ));
        }
        if self.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ConfigError::new("pipeline.version", "Version is empty"));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(parent) = self.journal.as_deref().and_then(std::path::Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                errors.push(ConfigError::new(
                    "output.journal",
                    format!("Parent directory does not exist: {}", parent.display()),
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebase::SymbolGroup;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_script_weights_must_leave_room() {
        let mut config = MatchingConfig::default();
        config.script.opcode = 0.9;
        config.script.operand = 0.3;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "matching.script");
    }

    #[test]
    fn test_negative_record_weight() {
        let mut config = MatchingConfig::default();
        config.record_fields.insert("name".to_string(), -1.0);
        let errors = config.validate();
        assert_eq!(errors[0].field, "matching.record_fields.name");
    }

    #[test]
    fn test_overlapping_slot_groups() {
        let mut options = RebaseOptions::default();
        options
            .symbol_groups
            .push(SymbolGroup::slots("more_ints", &["iload"], ".int_var_count"));
        options.symbol_groups.push(SymbolGroup::label("label"));
        let errors = options.validate();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert!(messages.iter().any(|m| m.contains("'iload' already belongs")));
        assert!(messages.iter().any(|m| m.contains("Duplicate group name 'label'")));
        assert!(messages.iter().any(|m| m.contains("At most one label group")));
    }

    #[test]
    fn test_pipeline_bounds() {
        let config = PipelineConfig {
            workers: Some(0),
            lost_id: 5,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate().len(), 2);
    }
}
