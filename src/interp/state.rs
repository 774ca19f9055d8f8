//! The interpreter's externally-owned register/memory state.

use std::collections::HashMap;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::ExecError;
use crate::model::{Endianness, Isa};

use super::value::RegisterValue;

/// Register-name -> value map, plus a sparse byte-addressable memory.
///
/// Never materializes an entry for an address that hasn't been
/// written; reads of such addresses simply return zero.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub registers: HashMap<String, RegisterValue>,
    pub memory: HashMap<u64, u8>,
}

/// The address mask an ISA's `word_size`-bit address space wraps
/// under (`2^word_size - 1`, or all ones for `word_size >= 64`).
fn address_mask(word_size: u32) -> u64 {
    if word_size >= 64 {
        u64::MAX
    } else {
        (1u64 << word_size) - 1
    }
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    /// A state with every declared register zeroed (files get
    /// `count` zero entries) and empty memory: the synthetic state
    /// the validator's RTL dry-run executes against.
    pub fn zeroed(isa: &Isa) -> State {
        let mut registers = HashMap::new();
        for reg in &isa.registers {
            let value = if reg.is_file() {
                RegisterValue::zero_file(reg.count.unwrap_or(0))
            } else {
                RegisterValue::zero_scalar()
            };
            registers.insert(reg.name.clone(), value);
        }
        State {
            registers,
            memory: HashMap::new(),
        }
    }

    pub fn get_scalar(&self, name: &str) -> Result<u64, ExecError> {
        match self.registers.get(name) {
            Some(RegisterValue::Scalar(v)) => Ok(*v),
            Some(RegisterValue::File(_)) => Err(ExecError::type_mismatch(format!(
                "register '{}' is a file, not a scalar",
                name
            ))),
            None => Err(ExecError::unknown_reference(format!("register '{}'", name))),
        }
    }

    pub fn set_scalar(&mut self, name: &str, value: u64) -> Result<(), ExecError> {
        match self.registers.get_mut(name) {
            Some(RegisterValue::Scalar(v)) => {
                *v = value;
                Ok(())
            }
            Some(RegisterValue::File(_)) => Err(ExecError::type_mismatch(format!(
                "register '{}' is a file, not a scalar",
                name
            ))),
            None => Err(ExecError::unknown_reference(format!("register '{}'", name))),
        }
    }

    pub fn get_indexed(&self, name: &str, index: u32) -> Result<u64, ExecError> {
        match self.registers.get(name) {
            Some(RegisterValue::File(entries)) => entries
                .get(index as usize)
                .copied()
                .ok_or_else(|| ExecError::index_out_of_range(format!("{}[{}]", name, index))),
            Some(RegisterValue::Scalar(_)) => Err(ExecError::type_mismatch(format!(
                "register '{}' is not a file or vector",
                name
            ))),
            None => Err(ExecError::unknown_reference(format!("register '{}'", name))),
        }
    }

    pub fn set_indexed(&mut self, name: &str, index: u32, value: u64) -> Result<(), ExecError> {
        match self.registers.get_mut(name) {
            Some(RegisterValue::File(entries)) => {
                let slot = entries
                    .get_mut(index as usize)
                    .ok_or_else(|| ExecError::index_out_of_range(format!("{}[{}]", name, index)))?;
                *slot = value;
                Ok(())
            }
            Some(RegisterValue::Scalar(_)) => Err(ExecError::type_mismatch(format!(
                "register '{}' is not a file or vector",
                name
            ))),
            None => Err(ExecError::unknown_reference(format!("register '{}'", name))),
        }
    }

    /// Reads `size` bytes at byte address `addr` as a single integer,
    /// in the ISA's endianness. Unwritten addresses read as zero.
    ///
    /// Bytes are gathered in address order (`addr`, `addr+1`, ...) and
    /// handed to `ByteOrder::read_uint`, which interprets that many
    /// bytes as little- or big-endian depending on the type parameter,
    /// so address order naturally means "least significant first"
    /// under `LittleEndian` and "most significant first" under
    /// `BigEndian`.
    pub fn read_memory(&self, isa: &Isa, addr: u64, size: u32) -> u64 {
        let mask = address_mask(isa.word_size);
        let base = addr & mask;
        let n = size.min(8) as usize;
        let mut buf = [0u8; 8];
        for (i, slot) in buf.iter_mut().take(n).enumerate() {
            let a = base.wrapping_add(i as u64) & mask;
            *slot = self.memory.get(&a).copied().unwrap_or(0);
        }
        match isa.endianness {
            Endianness::Little => LittleEndian::read_uint(&buf[..n], n),
            Endianness::Big => BigEndian::read_uint(&buf[..n], n),
        }
    }

    /// Writes the low `size` bytes of `value` at byte address `addr`,
    /// in the ISA's endianness.
    pub fn write_memory(&mut self, isa: &Isa, addr: u64, size: u32, value: u64) {
        let mask = address_mask(isa.word_size);
        let base = addr & mask;
        let n = size.min(8) as usize;
        let mut buf = [0u8; 8];
        match isa.endianness {
            Endianness::Little => LittleEndian::write_uint(&mut buf[..n], value, n),
            Endianness::Big => BigEndian::write_uint(&mut buf[..n], value, n),
        }
        for (i, byte) in buf.iter().take(n).enumerate() {
            let a = base.wrapping_add(i as u64) & mask;
            self.memory.insert(a, *byte);
        }
    }
}
