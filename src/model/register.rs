use serde::{Deserialize, Serialize};

/// What kind of storage a [`Register`] represents.
///
/// `Other` carries forward any kind name a source ISA file uses that
/// isn't one of the well-known ones (e.g. "control", "predicate").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegisterKind {
    GeneralPurpose,
    SpecialFunction,
    Vector,
    Other(String),
}

/// A named, contiguous bit range within a register's width.
///
/// Field width is `msb - lsb + 1`; `msb` and `lsb` are both inclusive
/// bit indices, least-significant bit numbered `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    pub name: String,
    pub msb: u32,
    pub lsb: u32,
}

impl BitField {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

/// One register, register file, or vector register in an ISA.
///
/// A register is a *file* iff `count` is set to a value greater than
/// zero; a *vector* iff its `kind` is [`RegisterKind::Vector`];
/// otherwise it is a plain scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    pub kind: RegisterKind,
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default)]
    pub fields: Vec<BitField>,
}

impl Register {
    pub fn is_file(&self) -> bool {
        matches!(self.count, Some(n) if n > 0)
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.kind, RegisterKind::Vector)
    }

    pub fn get_field(&self, name: &str) -> Option<&BitField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
