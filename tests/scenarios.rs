//! End-to-end scenarios over a small RISC-like fixture ISA: 32-bit
//! words, 16 general-purpose registers `R[0..15]`, one instruction
//! format `R_TYPE` with fields `opcode[5:0]`, `rd[10:6]`, `rs1[15:11]`,
//! `rs2[20:16]`.
//!
//! Built directly via the model constructors rather than `isa-loader`,
//! so these fixtures don't depend on file I/O.

use std::collections::HashMap;

use isa_model::encode::{self, EncodeOptions};
use isa_model::error::DiagnosticKind;
use isa_model::interp::{self, State};
use isa_model::model::{
    BinaryOp, BundleFormat, Encoding, Endianness, Field, Instruction, InstructionFormat, Isa,
    Register, RegisterKind, RtlBlock, RtlExpr, RtlStmt, Slot,
};
use isa_model::validate;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn r_type() -> InstructionFormat {
    InstructionFormat {
        name: "R_TYPE".into(),
        width: 32,
        fields: vec![
            Field { name: "opcode".into(), msb: 5, lsb: 0, constant_value: None },
            Field { name: "rd".into(), msb: 10, lsb: 6, constant_value: None },
            Field { name: "rs1".into(), msb: 15, lsb: 11, constant_value: None },
            Field { name: "rs2".into(), msb: 20, lsb: 16, constant_value: None },
        ],
    }
}

fn gpr_file() -> Register {
    Register {
        name: "R".into(),
        kind: RegisterKind::GeneralPurpose,
        width: 32,
        count: Some(16),
        fields: vec![],
    }
}

/// `R[rd] <- R[rs1] + R[rs2]`, where `rd`/`rs1`/`rs2` are operand
/// names that themselves resolve to index values.
fn add_behavior() -> RtlBlock {
    let indexed = |operand: &str| RtlExpr::Register {
        name: "R".into(),
        index: Some(Box::new(RtlExpr::Register { name: operand.into(), index: None, lane: None })),
        lane: None,
    };
    RtlBlock {
        statements: vec![RtlStmt::Assign {
            target: indexed("rd"),
            value: RtlExpr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(indexed("rs1")),
                rhs: Box::new(indexed("rs2")),
            },
        }],
    }
}

fn add_instruction() -> Instruction {
    let mut encoding = Encoding::new();
    encoding.insert("opcode".into(), 1);
    Instruction {
        mnemonic: "ADD".into(),
        format: Some("R_TYPE".into()),
        operands: vec!["rd".into(), "rs1".into(), "rs2".into()],
        encoding,
        behavior: Some(add_behavior()),
        external_behavior: false,
        is_bundle: false,
        bundle_format: None,
        bundle_slots: vec![],
    }
}

fn fixture_isa(instructions: Vec<Instruction>) -> Isa {
    Isa::new(
        "toy-risc",
        32,
        Endianness::Little,
        vec![gpr_file()],
        vec![],
        vec![],
        vec![r_type()],
        vec![],
        instructions,
        vec![],
    )
}

#[test]
fn s1_add_encode() {
    let isa = fixture_isa(vec![add_instruction()]);
    let instruction = isa.get_instruction("ADD").unwrap();

    let mut operands = HashMap::new();
    operands.insert("rd".to_string(), 1u64);
    operands.insert("rs1".to_string(), 2u64);
    operands.insert("rs2".to_string(), 3u64);

    let word = encode::encode(&isa, instruction, &operands, EncodeOptions::default()).unwrap();
    let expected = (3u64 << 16) | (2u64 << 11) | (1u64 << 6) | 1u64;
    assert_eq!(word, expected);
}

#[test]
fn s2_add_decode() {
    let isa = fixture_isa(vec![add_instruction()]);
    let instruction = isa.get_instruction("ADD").unwrap();

    let word = (3u64 << 16) | (2u64 << 11) | (1u64 << 6) | 1u64;
    let decoded = encode::decode(&isa, instruction, word).unwrap();

    assert_eq!(decoded.get("rd"), Some(&1));
    assert_eq!(decoded.get("rs1"), Some(&2));
    assert_eq!(decoded.get("rs2"), Some(&3));
}

#[test]
fn s3_add_execute() {
    init();
    let isa = fixture_isa(vec![add_instruction()]);
    let instruction = isa.get_instruction("ADD").unwrap();

    let mut state = State::zeroed(&isa);
    state.set_indexed("R", 2, 10).unwrap();
    state.set_indexed("R", 3, 5).unwrap();

    let mut operands = HashMap::new();
    operands.insert("rd".to_string(), 1u64);
    operands.insert("rs1".to_string(), 2u64);
    operands.insert("rs2".to_string(), 3u64);

    interp::execute(&isa, instruction, &operands, &mut state).unwrap();

    assert_eq!(state.get_indexed("R", 1).unwrap(), 15);
    assert_eq!(state.get_indexed("R", 2).unwrap(), 10);
    assert_eq!(state.get_indexed("R", 3).unwrap(), 5);
}

#[test]
fn s4_truncation() {
    let isa = fixture_isa(vec![add_instruction()]);
    let instruction = isa.get_instruction("ADD").unwrap();

    let mut state = State::zeroed(&isa);
    state.set_indexed("R", 2, 1u64 << 31).unwrap();
    state.set_indexed("R", 3, 1u64 << 31).unwrap();

    let mut operands = HashMap::new();
    operands.insert("rd".to_string(), 1u64);
    operands.insert("rs1".to_string(), 2u64);
    operands.insert("rs2".to_string(), 3u64);

    interp::execute(&isa, instruction, &operands, &mut state).unwrap();

    assert_eq!(state.get_indexed("R", 1).unwrap(), 0);
}

#[test]
fn s5_encoding_conflict_diagnostic() {
    let mut add = add_instruction();
    add.behavior = Some(add_behavior());
    let mut sub = add_instruction();
    sub.mnemonic = "SUB".into();
    sub.behavior = Some(add_behavior());

    let isa = fixture_isa(vec![add, sub]);
    let diagnostics = validate::validate(&isa);

    let conflicts: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Conflict && d.message.contains("ADD") && d.message.contains("SUB"))
        .collect();
    assert_eq!(conflicts.len(), 1);
}

#[test]
fn s6_missing_behavior_diagnostic() {
    let mut instruction = add_instruction();
    instruction.behavior = None;
    let isa = fixture_isa(vec![instruction]);

    let diagnostics = validate::validate(&isa);
    let semantic: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Semantic && d.location.contains("ADD"))
        .collect();
    assert_eq!(semantic.len(), 1);
}

#[test]
fn s7_bundle_slot_extraction() {
    let bundle_format = BundleFormat {
        name: "BUNDLE_64".into(),
        width: 64,
        slots: vec![
            Slot { name: "slot0".into(), msb: 31, lsb: 0 },
            Slot { name: "slot1".into(), msb: 63, lsb: 32 },
        ],
        identifier_format: None,
        discriminator_slot: 0,
    };

    let word = 0xDEADBEEFu64 | (0xCAFEBABEu64 << 32);

    assert_eq!(encode::extract_slot(&bundle_format, word, "slot0").unwrap(), 0xDEADBEEF);
    assert_eq!(encode::extract_slot(&bundle_format, word, "slot1").unwrap(), 0xCAFEBABE);
}
