//! The in-memory algebraic description of an ISA: registers, formats,
//! fields, instructions, the RTL AST, aliases and bundles, plus name
//! resolution across all of them.

mod alias;
mod bundle;
mod format;
mod instruction;
mod register;
mod rtl;
mod virtual_register;

pub use alias::{InstructionAlias, RegisterAlias};
pub use bundle::{BundleFormat, Slot};
pub use format::{Field, InstructionFormat};
pub use instruction::{Encoding, Instruction};
pub use register::{BitField, Register, RegisterKind};
pub use rtl::{BinaryOp, RtlBlock, RtlExpr, RtlStmt, UnaryOp};
pub use virtual_register::{VirtualComponent, VirtualRegister};

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Byte order an ISA uses for multi-byte memory accesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Little
    }
}

/// A register actually backing some name: either one real register
/// (optionally at a specific file index), or a virtual register's
/// concatenation of component fragments.
#[derive(Clone, Debug)]
pub enum Resolved<'a> {
    Register { register: &'a Register, index: Option<u32> },
    Virtual(&'a VirtualRegister),
}

/// Failure resolving a name to a concrete register.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown register '{0}'")]
    Unknown(String),
    #[error("alias cycle involving '{0}'")]
    AliasCycle(String),
}

/// Name -> position lookup tables, built once at construction time so
/// hot lookup paths (`get_register`, `get_instruction`, ...) are O(1)
/// rather than a linear scan of the owning `Vec`.
#[derive(Debug, Default, Clone)]
struct Index {
    registers: HashMap<String, usize>,
    virtual_registers: HashMap<String, usize>,
    register_aliases: HashMap<String, usize>,
    formats: HashMap<String, usize>,
    bundle_formats: HashMap<String, usize>,
    instructions: HashMap<String, usize>,
    instruction_aliases: HashMap<String, usize>,
}

impl Index {
    fn build(isa: &Isa) -> Index {
        let by_name = |items: &[String]| -> HashMap<String, usize> {
            items
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect()
        };

        Index {
            registers: by_name(
                &isa.registers.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            ),
            virtual_registers: by_name(
                &isa.virtual_registers
                    .iter()
                    .map(|r| r.name.clone())
                    .collect::<Vec<_>>(),
            ),
            register_aliases: by_name(
                &isa.register_aliases
                    .iter()
                    .map(|a| a.alias_name.clone())
                    .collect::<Vec<_>>(),
            ),
            formats: by_name(&isa.formats.iter().map(|f| f.name.clone()).collect::<Vec<_>>()),
            bundle_formats: by_name(
                &isa.bundle_formats
                    .iter()
                    .map(|f| f.name.clone())
                    .collect::<Vec<_>>(),
            ),
            instructions: by_name(
                &isa.instructions
                    .iter()
                    .map(|i| i.mnemonic.clone())
                    .collect::<Vec<_>>(),
            ),
            instruction_aliases: by_name(
                &isa.instruction_aliases
                    .iter()
                    .map(|a| a.alias_mnemonic.clone())
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

/// Top-level, immutable description of an ISA.
///
/// Constructed either directly via [`Isa::new`], or by deserializing
/// (e.g. via `isa-loader`) and then calling [`Isa::finalize`] to build
/// the name-resolution index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Isa {
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    pub word_size: u32,
    #[serde(default)]
    pub endianness: Endianness,
    #[serde(default)]
    pub registers: Vec<Register>,
    #[serde(default)]
    pub virtual_registers: Vec<VirtualRegister>,
    #[serde(default)]
    pub register_aliases: Vec<RegisterAlias>,
    #[serde(default)]
    pub formats: Vec<InstructionFormat>,
    #[serde(default)]
    pub bundle_formats: Vec<BundleFormat>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub instruction_aliases: Vec<InstructionAlias>,
    #[serde(skip)]
    index: Index,
}

impl Isa {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        word_size: u32,
        endianness: Endianness,
        registers: Vec<Register>,
        virtual_registers: Vec<VirtualRegister>,
        register_aliases: Vec<RegisterAlias>,
        formats: Vec<InstructionFormat>,
        bundle_formats: Vec<BundleFormat>,
        instructions: Vec<Instruction>,
        instruction_aliases: Vec<InstructionAlias>,
    ) -> Isa {
        let mut isa = Isa {
            name: name.into(),
            properties: BTreeMap::new(),
            word_size,
            endianness,
            registers,
            virtual_registers,
            register_aliases,
            formats,
            bundle_formats,
            instructions,
            instruction_aliases,
            index: Index::default(),
        };
        isa.finalize();
        isa
    }

    /// (Re)builds the name-resolution index. Must be called after any
    /// out-of-band mutation of the collections (e.g. right after
    /// deserializing), otherwise lookups silently find nothing.
    pub fn finalize(&mut self) {
        self.index = Index::build(self);
    }

    pub fn get_register(&self, name: &str) -> Option<&Register> {
        self.index.registers.get(name).map(|&i| &self.registers[i])
    }

    pub fn get_virtual_register(&self, name: &str) -> Option<&VirtualRegister> {
        self.index
            .virtual_registers
            .get(name)
            .map(|&i| &self.virtual_registers[i])
    }

    pub fn get_register_alias(&self, name: &str) -> Option<&RegisterAlias> {
        self.index
            .register_aliases
            .get(name)
            .map(|&i| &self.register_aliases[i])
    }

    pub fn get_format(&self, name: &str) -> Option<&InstructionFormat> {
        self.index.formats.get(name).map(|&i| &self.formats[i])
    }

    pub fn get_bundle_format(&self, name: &str) -> Option<&BundleFormat> {
        self.index
            .bundle_formats
            .get(name)
            .map(|&i| &self.bundle_formats[i])
    }

    pub fn get_instruction(&self, mnemonic: &str) -> Option<&Instruction> {
        self.index
            .instructions
            .get(mnemonic)
            .map(|&i| &self.instructions[i])
    }

    pub fn get_instruction_alias(&self, mnemonic: &str) -> Option<&InstructionAlias> {
        self.index
            .instruction_aliases
            .get(mnemonic)
            .map(|&i| &self.instruction_aliases[i])
    }

    /// Resolves `name` to the concrete register (or virtual register)
    /// it denotes, transparently following register-alias chains.
    ///
    /// Alias-chain traversal is bounded by a visited-set sized to the
    /// number of declared aliases, so a cycle among aliases fails with
    /// [`ResolveError::AliasCycle`] rather than recursing forever.
    pub fn resolve(&self, name: &str) -> Result<Resolved<'_>, ResolveError> {
        let mut current = name.to_string();
        let mut index_override: Option<u32> = None;
        let mut visited = HashSet::new();

        loop {
            if let Some(register) = self.get_register(&current) {
                return Ok(Resolved::Register {
                    register,
                    index: index_override,
                });
            }
            if let Some(vreg) = self.get_virtual_register(&current) {
                if index_override.is_some() {
                    // A virtual register has no single file index; an
                    // alias can't meaningfully index into it.
                    return Err(ResolveError::Unknown(name.to_string()));
                }
                return Ok(Resolved::Virtual(vreg));
            }
            if let Some(alias) = self.get_register_alias(&current) {
                if !visited.insert(current.clone()) {
                    return Err(ResolveError::AliasCycle(name.to_string()));
                }
                if visited.len() > self.register_aliases.len() {
                    return Err(ResolveError::AliasCycle(name.to_string()));
                }
                index_override = alias.target_index.or(index_override);
                current = alias.target_reg_name.clone();
                continue;
            }
            return Err(ResolveError::Unknown(name.to_string()));
        }
    }

    /// All register-alias cycles, each reported as the ordered list of
    /// alias names that form the cycle.
    pub fn alias_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut globally_seen = HashSet::new();

        for alias in &self.register_aliases {
            if globally_seen.contains(&alias.alias_name) {
                continue;
            }

            let mut path = Vec::new();
            let mut current = alias.alias_name.clone();
            let mut on_path = HashSet::new();

            loop {
                if self.get_register(&current).is_some() {
                    break;
                }
                let Some(next) = self.get_register_alias(&current) else {
                    break;
                };
                if !on_path.insert(current.clone()) {
                    if let Some(start) = path.iter().position(|n| *n == current) {
                        cycles.push(path[start..].to_vec());
                    }
                    break;
                }
                path.push(current.clone());
                current = next.target_reg_name.clone();
                if path.len() > self.register_aliases.len() + 1 {
                    break;
                }
            }

            globally_seen.extend(path);
        }

        cycles
    }
}
