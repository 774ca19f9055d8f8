use serde::{Deserialize, Serialize};

/// One named bit range within an [`InstructionFormat`].
///
/// A field with `constant_value` set is a fixed opcode/subopcode
/// discriminator shared by every instruction that uses the format; it
/// may not be supplied as an operand or overridden by an instruction's
/// encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub msb: u32,
    pub lsb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<u64>,
}

impl Field {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }

    pub fn is_constant(&self) -> bool {
        self.constant_value.is_some()
    }
}

/// A named bit layout shared by a family of instructions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstructionFormat {
    pub name: String,
    pub width: u32,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl InstructionFormat {
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn total_field_width(&self) -> u32 {
        self.fields.iter().map(Field::width).sum()
    }
}
