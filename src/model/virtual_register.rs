use serde::{Deserialize, Serialize};

/// One fragment of a [`VirtualRegister`]: either a whole register, or
/// (when `index` is set) a single indexed entry of a register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualComponent {
    pub reg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl VirtualComponent {
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}

/// A synthetic name aggregating a list of register fragments.
///
/// Purely a naming/view construct: a virtual register has no
/// independent storage of its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VirtualRegister {
    pub name: String,
    pub width: u32,
    #[serde(default)]
    pub components: Vec<VirtualComponent>,
}
