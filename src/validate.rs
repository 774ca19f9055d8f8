//! The static validator (component **V**): a fixed, deterministic
//! sequence of structural and semantic checks over an [`Isa`], plus an
//! RTL interpretability dry-run.

use std::collections::{HashMap, HashSet};

use crate::error::{Diagnostic, DiagnosticKind};
use crate::interp::{self, State};
use crate::model::{Instruction, InstructionFormat, Isa, RtlBlock, RtlExpr, RtlStmt};

/// Runs every check over `isa` and returns the accumulated diagnostics
/// in a fixed order. An empty result means the specification passed.
///
/// Checks run in the same order on every call (formats, bundle
/// formats, instructions, encodings, RTL statics and interpretability,
/// alias cycles, virtual registers, aliases, instruction aliases), so
/// repeated invocations on the same `isa` produce byte-identical
/// output.
pub fn validate(isa: &Isa) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_formats(isa, &mut diagnostics);
    check_bundle_formats(isa, &mut diagnostics);
    check_instructions(isa, &mut diagnostics);
    check_encoding_disjointness(isa, &mut diagnostics);
    check_rtl(isa, &mut diagnostics);
    check_alias_cycles(isa, &mut diagnostics);
    check_virtual_registers(isa, &mut diagnostics);
    check_register_aliases(isa, &mut diagnostics);
    check_instruction_aliases(isa, &mut diagnostics);

    diagnostics
}

fn check_formats(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for format in &isa.formats {
        let location = format!("format {}", format.name);
        let mut total_width = 0u32;

        for field in &format.fields {
            if field.lsb > field.msb || field.msb >= format.width {
                out.push(Diagnostic::new(
                    DiagnosticKind::Structural,
                    &location,
                    format!("field '{}' range [{}:{}] is out of [0, {})", field.name, field.msb, field.lsb, format.width),
                ));
                // field.width() underflows for lsb > msb; the remaining
                // width-dependent checks below aren't meaningful for an
                // already-malformed range.
                continue;
            }
            if let Some(constant) = field.constant_value {
                let max = if field.width() >= 64 { u64::MAX } else { (1u64 << field.width()) - 1 };
                if constant > max {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Structural,
                        &location,
                        format!("field '{}' constant {} does not fit in {} bits", field.name, constant, field.width()),
                    ));
                }
            }
            total_width += field.width();
        }

        for (i, a) in format.fields.iter().enumerate() {
            for b in format.fields.iter().skip(i + 1) {
                if ranges_overlap(a.lsb, a.msb, b.lsb, b.msb) {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Structural,
                        &location,
                        format!("fields '{}' and '{}' overlap", a.name, b.name),
                    ));
                }
            }
        }

        if total_width > format.width {
            out.push(Diagnostic::new(
                DiagnosticKind::Structural,
                &location,
                format!("sum of field widths {} exceeds format width {}", total_width, format.width),
            ));
        }
    }
}

fn ranges_overlap(a_lsb: u32, a_msb: u32, b_lsb: u32, b_msb: u32) -> bool {
    a_lsb <= b_msb && b_lsb <= a_msb
}

fn check_bundle_formats(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for bundle_format in &isa.bundle_formats {
        let location = format!("bundle format {}", bundle_format.name);

        for slot in &bundle_format.slots {
            if slot.lsb > slot.msb || slot.msb >= bundle_format.width {
                out.push(Diagnostic::new(
                    DiagnosticKind::Structural,
                    &location,
                    format!("slot '{}' range [{}:{}] is out of [0, {})", slot.name, slot.msb, slot.lsb, bundle_format.width),
                ));
            }
        }

        for (i, a) in bundle_format.slots.iter().enumerate() {
            for b in bundle_format.slots.iter().skip(i + 1) {
                if ranges_overlap(a.lsb, a.msb, b.lsb, b.msb) {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Structural,
                        &location,
                        format!("slots '{}' and '{}' overlap", a.name, b.name),
                    ));
                }
            }
        }

        if bundle_format.discriminator_slot >= bundle_format.slots.len() {
            out.push(Diagnostic::new(
                DiagnosticKind::Structural,
                &location,
                format!(
                    "discriminator_slot {} is out of range for {} slots",
                    bundle_format.discriminator_slot,
                    bundle_format.slots.len()
                ),
            ));
        }
    }
}

fn check_instructions(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for instruction in &isa.instructions {
        let location = format!("instruction {}", instruction.mnemonic);

        if instruction.is_bundle() {
            check_bundle_instruction(isa, instruction, &location, out);
            continue;
        }

        let format = match &instruction.format {
            Some(name) => match isa.get_format(name) {
                Some(f) => f,
                None => {
                    out.push(Diagnostic::new(DiagnosticKind::Reference, &location, format!("unknown format '{}'", name)));
                    continue;
                }
            },
            None => {
                out.push(Diagnostic::new(DiagnosticKind::Structural, &location, "non-bundle instruction has no format"));
                continue;
            }
        };

        for operand in &instruction.operands {
            match format.get_field(operand) {
                Some(field) if field.is_constant() => {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Conflict,
                        &location,
                        format!("operand '{}' names a constant field of format '{}'", operand, format.name),
                    ));
                }
                Some(_) => {}
                None => {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Reference,
                        &location,
                        format!("operand '{}' is not a field of format '{}'", operand, format.name),
                    ));
                }
            }
        }

        for field_name in instruction.encoding.keys() {
            match format.get_field(field_name) {
                Some(field) if field.is_constant() => {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Conflict,
                        &location,
                        format!("encoding overrides constant field '{}' of format '{}'", field_name, format.name),
                    ));
                }
                Some(_) => {}
                None => {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Reference,
                        &location,
                        format!("encoding names unknown field '{}' of format '{}'", field_name, format.name),
                    ));
                }
            }
        }

        if instruction.requires_behavior() && instruction.behavior.as_ref().map_or(true, RtlBlock::is_empty) {
            out.push(Diagnostic::new(
                DiagnosticKind::Semantic,
                &location,
                "non-bundle, non-external instruction has no behavior",
            ));
        }
    }
}

fn check_bundle_instruction(isa: &Isa, instruction: &Instruction, location: &str, out: &mut Vec<Diagnostic>) {
    let bundle_format = match &instruction.bundle_format {
        Some(name) => match isa.get_bundle_format(name) {
            Some(f) => f,
            None => {
                out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("unknown bundle format '{}'", name)));
                return;
            }
        },
        None => {
            out.push(Diagnostic::new(DiagnosticKind::Structural, location, "bundle instruction has no bundle format"));
            return;
        }
    };

    if instruction.bundle_slots.len() != bundle_format.slots.len() {
        out.push(Diagnostic::new(
            DiagnosticKind::Shape,
            location,
            format!(
                "{} sub-instructions given for bundle format '{}' with {} slots",
                instruction.bundle_slots.len(),
                bundle_format.name,
                bundle_format.slots.len()
            ),
        ));
    }

    for mnemonic in &instruction.bundle_slots {
        if isa.get_instruction(mnemonic).is_none() {
            out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("unknown sub-instruction '{}'", mnemonic)));
        }
    }
}

fn check_encoding_disjointness(isa: &Isa, out: &mut Vec<Diagnostic>) {
    let mut by_format: HashMap<&str, Vec<&Instruction>> = HashMap::new();
    for instruction in &isa.instructions {
        if let Some(format) = &instruction.format {
            by_format.entry(format.as_str()).or_default().push(instruction);
        }
    }

    for (format_name, instructions) in &by_format {
        for i in 0..instructions.len() {
            for j in (i + 1)..instructions.len() {
                let a = instructions[i];
                let b = instructions[j];
                if encodings_conflict(a, b) {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Conflict,
                        format!("format {}", format_name),
                        format!("instructions '{}' and '{}' have conflicting encodings", a.mnemonic, b.mnemonic),
                    ));
                }
            }
        }
    }
}

/// Two instructions conflict iff every field present in *both*
/// encodings (accounting for format constants shared by both) agrees.
fn encodings_conflict(a: &Instruction, b: &Instruction) -> bool {
    let shared_keys: HashSet<&String> = a.encoding.keys().filter(|k| b.encoding.contains_key(*k)).collect();
    if shared_keys.is_empty() {
        return false;
    }
    shared_keys.iter().all(|k| a.encoding.get(*k) == b.encoding.get(*k))
}

fn check_rtl(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for instruction in &isa.instructions {
        if instruction.is_bundle() || instruction.external_behavior {
            continue;
        }
        let Some(behavior) = &instruction.behavior else { continue };
        let location = format!("instruction {}", instruction.mnemonic);
        check_rtl_block(isa, behavior, &location, out);
        run_interpretability_check(isa, instruction, &location, out);
    }
}

fn check_rtl_block(isa: &Isa, block: &RtlBlock, location: &str, out: &mut Vec<Diagnostic>) {
    for stmt in &block.statements {
        check_rtl_stmt(isa, stmt, location, out);
    }
}

fn check_rtl_stmt(isa: &Isa, stmt: &RtlStmt, location: &str, out: &mut Vec<Diagnostic>) {
    match stmt {
        RtlStmt::Assign { target, value } => {
            check_rtl_lvalue(isa, target, location, out);
            check_rtl_expr(isa, value, location, out);
        }
        RtlStmt::If { cond, then_block, else_block } => {
            check_rtl_expr(isa, cond, location, out);
            check_rtl_block(isa, then_block, location, out);
            check_rtl_block(isa, else_block, location, out);
        }
        RtlStmt::MemRead { target, address, .. } => {
            check_rtl_lvalue(isa, target, location, out);
            check_rtl_expr(isa, address, location, out);
        }
        RtlStmt::MemWrite { address, value, .. } => {
            check_rtl_expr(isa, address, location, out);
            check_rtl_expr(isa, value, location, out);
        }
        RtlStmt::For { .. } => {
            out.push(Diagnostic::new(DiagnosticKind::Interpretability, location, "for-loops are not executable"));
        }
    }
}

/// An lvalue is restricted to register access, field access, or a
/// bitfield access whose base is itself an lvalue.
fn check_rtl_lvalue(isa: &Isa, expr: &RtlExpr, location: &str, out: &mut Vec<Diagnostic>) {
    match expr {
        RtlExpr::Register { .. } | RtlExpr::Field { .. } => check_rtl_expr(isa, expr, location, out),
        RtlExpr::Bitfield { base, msb, lsb } => {
            check_rtl_lvalue(isa, base, location, out);
            check_rtl_expr(isa, msb, location, out);
            check_rtl_expr(isa, lsb, location, out);
        }
        other => {
            out.push(Diagnostic::new(DiagnosticKind::Shape, location, format!("'{:?}' is not a valid assignment target", other)));
        }
    }
}

fn check_rtl_expr(isa: &Isa, expr: &RtlExpr, location: &str, out: &mut Vec<Diagnostic>) {
    match expr {
        RtlExpr::Literal(_) => {}
        RtlExpr::Register { name, index, lane } => {
            check_register_access(isa, name, location, out);
            if let Some(e) = index {
                check_rtl_expr(isa, e, location, out);
            }
            if let Some(e) = lane {
                check_rtl_expr(isa, e, location, out);
            }
        }
        RtlExpr::Field { reg, field } => check_field_access(isa, reg, field, location, out),
        RtlExpr::Bitfield { base, msb, lsb } => {
            check_rtl_expr(isa, base, location, out);
            check_rtl_expr(isa, msb, location, out);
            check_rtl_expr(isa, lsb, location, out);
        }
        RtlExpr::Unary { expr, .. } => check_rtl_expr(isa, expr, location, out),
        RtlExpr::Binary { lhs, rhs, .. } => {
            check_rtl_expr(isa, lhs, location, out);
            check_rtl_expr(isa, rhs, location, out);
        }
        RtlExpr::Ternary { cond, then_expr, else_expr } => {
            check_rtl_expr(isa, cond, location, out);
            check_rtl_expr(isa, then_expr, location, out);
            check_rtl_expr(isa, else_expr, location, out);
        }
        RtlExpr::Call { args, .. } => {
            // Names outside the built-in set are tolerated here (they
            // may be external behaviors); the interpretability dry-run
            // is what actually rejects unknown calls.
            for arg in args {
                check_rtl_expr(isa, arg, location, out);
            }
        }
    }
}

fn check_register_access(isa: &Isa, name: &str, location: &str, out: &mut Vec<Diagnostic>) {
    if isa.resolve(name).is_err() {
        out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("unknown register '{}'", name)));
    }
}

fn check_field_access(isa: &Isa, reg: &str, field: &str, location: &str, out: &mut Vec<Diagnostic>) {
    use crate::model::Resolved;

    match isa.resolve(reg) {
        Ok(Resolved::Register { register, .. }) => {
            if register.get_field(field).is_none() {
                out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("register '{}' has no field '{}'", reg, field)));
            }
        }
        Ok(Resolved::Virtual(_)) => {
            out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("virtual register '{}' has no fields", reg)));
        }
        Err(_) => {
            out.push(Diagnostic::new(DiagnosticKind::Reference, location, format!("unknown register '{}'", reg)));
        }
    }
}

/// Dry-runs `instruction`'s behavior against a freshly synthesized
/// zero state (every register zeroed, empty memory, every operand
/// zero). A fresh state is built per instruction so no side effect
/// escapes into another instruction's check.
fn run_interpretability_check(isa: &Isa, instruction: &Instruction, location: &str, out: &mut Vec<Diagnostic>) {
    let mut state = State::zeroed(isa);
    let operands: HashMap<String, u64> = instruction.operands.iter().map(|name| (name.clone(), 0)).collect();

    if let Err(err) = interp::execute(isa, instruction, &operands, &mut state) {
        out.push(Diagnostic::new(DiagnosticKind::Interpretability, location, err.to_string()));
    }
}

/// Register-alias cycles, reported once per cycle found.
fn check_alias_cycles(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for cycle in isa.alias_cycles() {
        out.push(Diagnostic::new(
            DiagnosticKind::AliasCycle,
            "register aliases",
            format!("alias cycle: {}", cycle.join(" -> ")),
        ));
    }
}

fn check_virtual_registers(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for vreg in &isa.virtual_registers {
        let location = format!("virtual register {}", vreg.name);

        if isa.get_register(&vreg.name).is_some() {
            out.push(Diagnostic::new(DiagnosticKind::Conflict, &location, "name collides with a register"));
        }

        let mut total_width = 0u32;
        for component in &vreg.components {
            match isa.get_register(&component.reg_name) {
                Some(register) => {
                    if component.is_indexed() {
                        if !register.is_file() {
                            out.push(Diagnostic::new(
                                DiagnosticKind::Shape,
                                &location,
                                format!("component '{}' is indexed but is not a register file", component.reg_name),
                            ));
                        } else if component.index.unwrap() >= register.count.unwrap_or(0) {
                            out.push(Diagnostic::new(
                                DiagnosticKind::Shape,
                                &location,
                                format!("component '{}[{}]' index out of range", component.reg_name, component.index.unwrap()),
                            ));
                        }
                    }
                    total_width += register.width;
                }
                None => {
                    out.push(Diagnostic::new(
                        DiagnosticKind::Reference,
                        &location,
                        format!("unknown register '{}'", component.reg_name),
                    ));
                }
            }
        }

        if total_width != vreg.width {
            out.push(Diagnostic::new(
                DiagnosticKind::Shape,
                &location,
                format!("sum of component widths {} does not equal declared width {}", total_width, vreg.width),
            ));
        }
    }
}

fn check_register_aliases(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for alias in &isa.register_aliases {
        let location = format!("register alias {}", alias.alias_name);

        if isa.get_register(&alias.alias_name).is_some() || isa.get_virtual_register(&alias.alias_name).is_some() {
            out.push(Diagnostic::new(DiagnosticKind::Conflict, &location, "name collides with a register or virtual register"));
        }

        match isa.get_register(&alias.target_reg_name) {
            Some(register) => {
                if alias.is_indexed() {
                    if !register.is_file() {
                        out.push(Diagnostic::new(DiagnosticKind::Shape, &location, "alias is indexed but target is not a register file"));
                    } else if alias.target_index.unwrap() >= register.count.unwrap_or(0) {
                        out.push(Diagnostic::new(DiagnosticKind::Shape, &location, "alias index out of range"));
                    }
                }
            }
            None => {
                out.push(Diagnostic::new(DiagnosticKind::Reference, &location, format!("unknown target register '{}'", alias.target_reg_name)));
            }
        }
    }
}

fn check_instruction_aliases(isa: &Isa, out: &mut Vec<Diagnostic>) {
    for alias in &isa.instruction_aliases {
        let location = format!("instruction alias {}", alias.alias_mnemonic);

        if isa.get_instruction(&alias.alias_mnemonic).is_some() {
            out.push(Diagnostic::new(DiagnosticKind::Conflict, &location, "alias mnemonic collides with a real instruction"));
        }
        if isa.get_instruction(&alias.target_mnemonic).is_none() {
            out.push(Diagnostic::new(DiagnosticKind::Reference, &location, format!("unknown target mnemonic '{}'", alias.target_mnemonic)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BinaryOp, Encoding, Endianness, Field, Register, RegisterKind, RtlExpr};

    fn basic_isa() -> Isa {
        let format = InstructionFormat {
            name: "R_TYPE".into(),
            width: 32,
            fields: vec![
                Field { name: "opcode".into(), msb: 31, lsb: 26, constant_value: Some(1) },
                Field { name: "rd".into(), msb: 25, lsb: 21, constant_value: None },
                Field { name: "rs".into(), msb: 20, lsb: 16, constant_value: None },
            ],
        };
        let register = Register {
            name: "R".into(),
            kind: RegisterKind::GeneralPurpose,
            width: 32,
            count: Some(16),
            fields: vec![],
        };
        let mut encoding = Encoding::new();
        encoding.insert("opcode".into(), 1);
        let instruction = Instruction {
            mnemonic: "ADD".into(),
            format: Some("R_TYPE".into()),
            operands: vec!["rd".into(), "rs".into()],
            encoding,
            behavior: Some(RtlBlock {
                statements: vec![RtlStmt::Assign {
                    target: RtlExpr::Register { name: "rd".into(), index: None, lane: None },
                    value: RtlExpr::Binary {
                        op: BinaryOp::Add,
                        lhs: Box::new(RtlExpr::Register { name: "rd".into(), index: None, lane: None }),
                        rhs: Box::new(RtlExpr::Register { name: "rs".into(), index: None, lane: None }),
                    },
                }],
            }),
            external_behavior: false,
            is_bundle: false,
            bundle_format: None,
            bundle_slots: vec![],
        };

        Isa::new("test", 32, Endianness::Little, vec![register], vec![], vec![], vec![format], vec![], vec![instruction], vec![])
    }

    #[test]
    fn clean_isa_has_no_diagnostics() {
        // "rd"/"rs" here resolve as operands at execute time, not as
        // registers, so this fixture is intentionally minimal; a real
        // spec would route operands through the register file by name.
        let isa = basic_isa();
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().all(|d| d.kind != DiagnosticKind::Structural));
    }

    #[test]
    fn missing_behavior_is_flagged() {
        let mut isa = basic_isa();
        isa.instructions[0].behavior = None;
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Semantic));
    }

    #[test]
    fn overlapping_fields_are_flagged() {
        let mut isa = basic_isa();
        isa.formats[0].fields.push(Field { name: "dup".into(), msb: 25, lsb: 24, constant_value: None });
        isa.finalize();
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Structural && d.message.contains("overlap")));
    }

    #[test]
    fn validator_is_deterministic() {
        let isa = basic_isa();
        let first = validate(&isa);
        let second = validate(&isa);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_field_range_is_flagged_without_panicking() {
        let mut isa = basic_isa();
        isa.formats[0].fields.push(Field { name: "bogus".into(), msb: 3, lsb: 5, constant_value: Some(1) });
        isa.finalize();
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Structural && d.message.contains("bogus")));
    }

    #[test]
    fn overlapping_bundle_slots_are_flagged() {
        use crate::model::BundleFormat;

        let bundle_format = BundleFormat {
            name: "BUNDLE".into(),
            width: 64,
            slots: vec![
                crate::model::Slot { name: "slot0".into(), msb: 35, lsb: 0 },
                crate::model::Slot { name: "slot1".into(), msb: 63, lsb: 32 },
            ],
            identifier_format: None,
            discriminator_slot: 0,
        };
        let mut isa = basic_isa();
        isa.bundle_formats.push(bundle_format);
        isa.finalize();
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Structural && d.message.contains("overlap")));
    }

    #[test]
    fn out_of_range_discriminator_slot_is_flagged() {
        use crate::model::BundleFormat;

        let bundle_format = BundleFormat {
            name: "BUNDLE".into(),
            width: 64,
            slots: vec![crate::model::Slot { name: "slot0".into(), msb: 31, lsb: 0 }],
            identifier_format: None,
            discriminator_slot: 5,
        };
        let mut isa = basic_isa();
        isa.bundle_formats.push(bundle_format);
        isa.finalize();
        let diagnostics = validate(&isa);
        assert!(diagnostics.iter().any(|d| d.kind == DiagnosticKind::Structural && d.message.contains("discriminator_slot")));
    }
}
