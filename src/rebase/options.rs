//! Tunables for the rebaser.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the operands of a symbolic group are recognized and remapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Branch targets and switch-table rows naming a label
    Label,
    /// Numbered local-variable slots
    Slot,
}

/// A family of operands whose identities can shift between versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SymbolGroup {
    pub name: String,
    pub kind: SymbolKind,
    /// Opcodes whose operand belongs to this group (slot groups only)
    #[serde(default)]
    pub opcodes: Vec<String>,
    /// Header directive holding the number of slots in this group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_directive: Option<String>,
}

impl SymbolGroup {
    pub fn label(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Label,
            opcodes: Vec::new(),
            count_directive: None,
        }
    }

    pub fn slots(name: &str, opcodes: &[&str], count_directive: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Slot,
            opcodes: opcodes.iter().map(|s| (*s).to_string()).collect(),
            count_directive: Some(count_directive.to_string()),
        }
    }

    pub fn covers(&self, opcode: &str) -> bool {
        self.opcodes.iter().any(|o| o == opcode)
    }
}

/// Rebase configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RebaseOptions {
    /// Operand groups remapped in carried-over insertions
    pub symbol_groups: Vec<SymbolGroup>,
    /// Opcodes whose operand must name a defined label
    pub branch_opcodes: Vec<String>,
    /// Give locally added labels a fresh name when upstream now uses theirs
    pub rename_colliding_labels: bool,
    /// Shift slot-count directives of the emitted header by the upstream
    /// change in slot count; off keeps the local header verbatim
    pub adjust_var_counts: bool,
}

impl Default for RebaseOptions {
    fn default() -> Self {
        Self {
            symbol_groups: vec![
                SymbolGroup::label("label"),
                SymbolGroup::slots("int", &["iload", "istore"], ".int_var_count"),
                SymbolGroup::slots("string", &["sload", "sstore"], ".string_var_count"),
            ],
            branch_opcodes: [
                "jump",
                "if_icmpeq",
                "if_icmpne",
                "if_icmplt",
                "if_icmpgt",
                "if_icmple",
                "if_icmpge",
                "branch_if_true",
                "branch_if_false",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            rename_colliding_labels: true,
            adjust_var_counts: false,
        }
    }
}

impl RebaseOptions {
    /// The label group, if labels are remapped at all.
    pub fn label_group(&self) -> Option<&SymbolGroup> {
        self.symbol_groups
            .iter()
            .find(|g| g.kind == SymbolKind::Label)
    }

    /// Slot groups with their position in [`symbol_groups`](Self::symbol_groups).
    pub fn slot_groups(&self) -> impl Iterator<Item = (usize, &SymbolGroup)> {
        self.symbol_groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.kind == SymbolKind::Slot)
    }

    /// Slot group an opcode's operand belongs to.
    pub fn slot_group_for(&self, opcode: &str) -> Option<usize> {
        self.slot_groups()
            .find(|(_, g)| g.covers(opcode))
            .map(|(i, _)| i)
    }

    pub fn is_branch(&self, opcode: &str) -> bool {
        self.branch_opcodes.iter().any(|o| o == opcode)
    }
}
