//! Cost model for script lines.

use crate::align::Dissimilarity;
use crate::model::Token;

/// Opcode/operand weighting for [`ScriptLineCost`].
///
/// A line pair earns `opcode` when the mnemonics agree and additionally
/// `operand` when the operands agree too; the cost is one minus the earned
/// weight. Comments never contribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptLineCost {
    pub opcode: f64,
    pub operand: f64,
}

impl Default for ScriptLineCost {
    fn default() -> Self {
        Self {
            opcode: 0.7,
            operand: 0.3,
        }
    }
}

impl ScriptLineCost {
    #[must_use]
    pub fn new(opcode: f64, operand: f64) -> Self {
        Self { opcode, operand }
    }
}

impl Dissimilarity<Token> for ScriptLineCost {
    fn cost(&self, old: &Token, new: &Token) -> f64 {
        // Label definitions are one kind; the name plays the operand, so
        // renumbered labels still pair up.
        let (same_kind, same_operand) = match (old.label_name(), new.label_name()) {
            (Some(a), Some(b)) => (true, a == b),
            (None, None) => (old.opcode == new.opcode, old.operand == new.operand),
            _ => (false, false),
        };

        let mut similarity = 0.0;
        if same_kind {
            similarity += self.opcode;
            if same_operand {
                similarity += self.operand;
            }
        }
        1.0 - similarity
    }
}
