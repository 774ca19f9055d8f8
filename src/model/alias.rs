use serde::{Deserialize, Serialize};

/// A second name bound to an existing register, optionally to one
/// indexed entry of a register file.
///
/// Resolves transparently wherever the underlying register would be
/// used: encoding, assembly syntax, and RTL references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAlias {
    pub alias_name: String,
    pub target_reg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<u32>,
}

impl RegisterAlias {
    pub fn is_indexed(&self) -> bool {
        self.target_index.is_some()
    }
}

/// A secondary mnemonic that desugars, at assembly time, to a target
/// mnemonic with possibly rewritten operand names.
///
/// Transparent to the interpreter: it only ever sees the target
/// instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionAlias {
    pub alias_mnemonic: String,
    pub target_mnemonic: String,
    /// Renames operands of the alias (in order) to the target
    /// instruction's operand names. Empty means the operand names are
    /// passed through unchanged.
    #[serde(default)]
    pub operand_rewrite: Vec<(String, String)>,
}
