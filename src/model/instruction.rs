use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rtl::RtlBlock;

/// Fixed-bit assignments for a format's fields: field name -> value.
pub type Encoding = BTreeMap<String, u64>;

/// One instruction: its encoding shape, its operands, and its RTL
/// behavior.
///
/// A bundle instruction (`is_bundle == true`) carries `bundle_format`
/// and `bundle_slots` instead of executing RTL directly; it has no
/// `behavior` of its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub operands: Vec<String>,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<RtlBlock>,
    #[serde(default)]
    pub external_behavior: bool,
    #[serde(default)]
    pub is_bundle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_format: Option<String>,
    /// One referenced sub-instruction mnemonic per slot, in slot order.
    #[serde(default)]
    pub bundle_slots: Vec<String>,
}

impl Instruction {
    pub fn is_bundle(&self) -> bool {
        self.is_bundle
    }

    /// Whether this instruction must carry a non-empty `behavior`
    /// block to pass validation.
    pub fn requires_behavior(&self) -> bool {
        !self.is_bundle() && !self.external_behavior
    }
}
