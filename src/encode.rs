//! The encoder/decoder (component **E**): packs operand values into
//! instruction words and bundle words, and reverses the process.

use std::collections::HashMap;

use crate::error::EncodeError;
use crate::model::{BundleFormat, Instruction, InstructionFormat, Isa};

/// Toggles whether [`encode`] truncates an overflowing operand value
/// silently (the default, matching the source behavior) or rejects it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub strict: bool,
}

fn bit_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn format_of<'a>(isa: &'a Isa, instruction: &Instruction) -> Result<&'a InstructionFormat, EncodeError> {
    let name = instruction
        .format
        .as_ref()
        .ok_or_else(|| EncodeError::UnknownFormat(instruction.mnemonic.clone()))?;
    isa.get_format(name).ok_or_else(|| EncodeError::UnknownFormat(name.clone()))
}

/// Packs `operands` (and the instruction's fixed encoding, and any
/// constant format fields) into a single word of `format.width` bits.
///
/// Resolution order per field: the instruction's own `encoding` entry,
/// else a supplied operand value, else the field's constant, else
/// zero. Each placed value is masked to the field's width and shifted
/// to `lsb` before being OR-combined with the rest.
pub fn encode(
    isa: &Isa,
    instruction: &Instruction,
    operands: &HashMap<String, u64>,
    options: EncodeOptions,
) -> Result<u64, EncodeError> {
    let format = format_of(isa, instruction)?;
    let mut word: u64 = 0;

    for field in &format.fields {
        let raw = if let Some(&fixed) = instruction.encoding.get(&field.name) {
            fixed
        } else if let Some(&operand_value) = operands.get(&field.name) {
            if options.strict && operand_value > bit_mask(field.width()) {
                return Err(EncodeError::OperandOverflow {
                    operand: field.name.clone(),
                    value: operand_value,
                    width: field.width(),
                });
            }
            operand_value
        } else if let Some(constant) = field.constant_value {
            constant
        } else {
            0
        };
        word |= (raw & bit_mask(field.width())) << field.lsb;
    }

    Ok(word)
}

/// Extracts `{operand-name -> value}` for every non-constant field
/// named as an operand of `instruction`, from a previously encoded or
/// externally supplied word.
pub fn decode(isa: &Isa, instruction: &Instruction, word: u64) -> Result<HashMap<String, u64>, EncodeError> {
    let format = format_of(isa, instruction)?;
    let mut out = HashMap::new();
    for operand in &instruction.operands {
        let field = format
            .get_field(operand)
            .ok_or_else(|| EncodeError::UnknownField(operand.clone()))?;
        let value = (word >> field.lsb) & bit_mask(field.width());
        out.insert(operand.clone(), value);
    }
    Ok(out)
}

/// Whether `word` matches `instruction`: every field fixed by the
/// instruction's own encoding, and every constant format field, equals
/// its required value when extracted from `word`.
pub fn matches(isa: &Isa, instruction: &Instruction, word: u64) -> Result<bool, EncodeError> {
    let format = format_of(isa, instruction)?;

    for field in &format.fields {
        let required = if let Some(&fixed) = instruction.encoding.get(&field.name) {
            Some(fixed)
        } else {
            field.constant_value
        };
        if let Some(required) = required {
            let extracted = (word >> field.lsb) & bit_mask(field.width());
            if extracted != (required & bit_mask(field.width())) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Packs `{slot-name -> sub-instruction word}` into a bundle word by
/// shifting each slot's word to its `lsb` and OR-combining them.
pub fn encode_bundle(
    bundle_format: &BundleFormat,
    slots: &HashMap<String, u64>,
) -> Result<u64, EncodeError> {
    let mut word: u64 = 0;
    for slot in &bundle_format.slots {
        let value = slots.get(&slot.name).copied().unwrap_or(0);
        word |= (value & bit_mask(slot.width())) << slot.lsb;
    }
    Ok(word)
}

/// Extracts the sub-instruction word placed in `slot_name` of `word`.
pub fn extract_slot(bundle_format: &BundleFormat, word: u64, slot_name: &str) -> Result<u64, EncodeError> {
    let slot = bundle_format
        .get_slot(slot_name)
        .ok_or_else(|| EncodeError::UnknownSlot(slot_name.to_string()))?;
    Ok((word >> slot.lsb) & bit_mask(slot.width()))
}

/// Whether `word` carries `bundle_instruction`: the sub-word at the
/// bundle format's `discriminator_slot` matches the bundle
/// instruction's identifier format.
pub fn bundle_matches(
    isa: &Isa,
    bundle_format: &BundleFormat,
    identifier_instruction: &Instruction,
    word: u64,
) -> Result<bool, EncodeError> {
    let slot = bundle_format
        .slots
        .get(bundle_format.discriminator_slot)
        .ok_or_else(|| EncodeError::UnknownSlot(format!("slot index {}", bundle_format.discriminator_slot)))?;
    let sub_word = (word >> slot.lsb) & bit_mask(slot.width());
    matches(isa, identifier_instruction, sub_word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Encoding, Endianness, Field, Instruction};

    fn r_type_isa() -> Isa {
        let format = InstructionFormat {
            name: "R_TYPE".into(),
            width: 32,
            fields: vec![
                Field { name: "opcode".into(), msb: 31, lsb: 26, constant_value: None },
                Field { name: "rd".into(), msb: 25, lsb: 21, constant_value: None },
                Field { name: "rs".into(), msb: 20, lsb: 16, constant_value: None },
                Field { name: "funct".into(), msb: 15, lsb: 0, constant_value: Some(0) },
            ],
        };
        Isa::new(
            "test",
            32,
            Endianness::Little,
            vec![],
            vec![],
            vec![],
            vec![format],
            vec![],
            vec![],
            vec![],
        )
    }

    fn add_instruction() -> Instruction {
        let mut encoding = Encoding::new();
        encoding.insert("opcode".into(), 1);
        Instruction {
            mnemonic: "ADD".into(),
            format: Some("R_TYPE".into()),
            operands: vec!["rd".into(), "rs".into()],
            encoding,
            behavior: None,
            external_behavior: true,
            is_bundle: false,
            bundle_format: None,
            bundle_slots: vec![],
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let isa = r_type_isa();
        let instruction = add_instruction();
        let mut operands = HashMap::new();
        operands.insert("rd".to_string(), 3u64);
        operands.insert("rs".to_string(), 5u64);

        let word = encode(&isa, &instruction, &operands, EncodeOptions::default()).unwrap();
        let decoded = decode(&isa, &instruction, word).unwrap();

        assert_eq!(decoded.get("rd"), Some(&3));
        assert_eq!(decoded.get("rs"), Some(&5));
        assert!(matches(&isa, &instruction, word).unwrap());
    }

    #[test]
    fn strict_mode_rejects_overflow() {
        let isa = r_type_isa();
        let instruction = add_instruction();
        let mut operands = HashMap::new();
        operands.insert("rd".to_string(), 0xFF);
        operands.insert("rs".to_string(), 0);

        let err = encode(&isa, &instruction, &operands, EncodeOptions { strict: true }).unwrap_err();
        assert!(matches!(err, EncodeError::OperandOverflow { .. }));
    }
}
