use serde::{Deserialize, Serialize};

/// A sub-instruction placement within a [`BundleFormat`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub msb: u32,
    pub lsb: u32,
}

impl Slot {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

/// A VLIW container packing several sub-instruction words into one
/// bundle word.
///
/// `discriminator_slot` names, by index into `slots`, which slot a
/// bundle instruction's identifier format is matched against. Defaults
/// to `0`, the first declared slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleFormat {
    pub name: String,
    pub width: u32,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_format: Option<String>,
    #[serde(default)]
    pub discriminator_slot: usize,
}

impl BundleFormat {
    pub fn get_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }
}
