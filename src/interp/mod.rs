//! The RTL interpreter (component **I**): evaluates a parsed
//! instruction's behavior block against externally owned register and
//! memory state.

mod state;
mod value;

pub use state::State;
pub use value::RegisterValue;

use std::collections::HashMap;

use crate::error::ExecError;
use crate::model::{BinaryOp, Instruction, Isa, RtlBlock, RtlExpr, RtlStmt, UnaryOp};

use value::{bit_mask_u64, mask, Value};

/// Runs `instruction`'s behavior block over `state`.
///
/// `operands` supplies a value for every operand name the instruction
/// declares; an RTL reference to an operand name is looked up there
/// first, then falls back to a same-named register.
///
/// `execute` is atomic only in the sense that it runs to completion or
/// fails outright: if it fails partway through, any mutations already
/// applied to `state` remain (see the crate's concurrency notes).
pub fn execute(
    isa: &Isa,
    instruction: &Instruction,
    operands: &HashMap<String, u64>,
    state: &mut State,
) -> Result<(), ExecError> {
    log::debug!("execute: entering '{}'", instruction.mnemonic);
    let block = instruction
        .behavior
        .as_ref()
        .ok_or_else(|| ExecError::unsupported(format!("'{}' has no behavior to execute", instruction.mnemonic)))?;

    let mut ctx = Ctx { isa, operands, state };
    let result = exec_block(&mut ctx, block);
    log::debug!("execute: leaving '{}' ({})", instruction.mnemonic, if result.is_ok() { "ok" } else { "error" });
    result
}

struct Ctx<'a> {
    isa: &'a Isa,
    operands: &'a HashMap<String, u64>,
    state: &'a mut State,
}

fn exec_block(ctx: &mut Ctx, block: &RtlBlock) -> Result<(), ExecError> {
    for stmt in &block.statements {
        exec_stmt(ctx, stmt)?;
    }
    Ok(())
}

fn exec_stmt(ctx: &mut Ctx, stmt: &RtlStmt) -> Result<(), ExecError> {
    match stmt {
        RtlStmt::Assign { target, value } => {
            log::trace!("assign {:?} <- {:?}", target, value);
            let v = eval_expr(ctx, value)?;
            assign_lvalue(ctx, target, v.as_u64())
        }
        RtlStmt::If { cond, then_block, else_block } => {
            let c = eval_expr(ctx, cond)?;
            log::trace!("if {:?} -> {}", cond, c.is_truthy());
            if c.is_truthy() {
                exec_block(ctx, then_block)
            } else {
                exec_block(ctx, else_block)
            }
        }
        RtlStmt::MemRead { target, address, size } => {
            let addr = eval_expr(ctx, address)?.as_u64();
            log::trace!("mem_read [{:#x}, {} bytes]", addr, size);
            let v = ctx.state.read_memory(ctx.isa, addr, *size);
            assign_lvalue(ctx, target, v)
        }
        RtlStmt::MemWrite { address, size, value } => {
            let addr = eval_expr(ctx, address)?.as_u64();
            let v = eval_expr(ctx, value)?.as_u64();
            log::trace!("mem_write [{:#x}, {} bytes] <- {:#x}", addr, size, v);
            ctx.state.write_memory(ctx.isa, addr, *size, v);
            Ok(())
        }
        RtlStmt::For { .. } => Err(ExecError::unsupported("for-loops are not executable")),
    }
}

/// Resolves a register-name reference through operands, then aliases
/// and virtual registers, to a concrete storage location and reads it.
fn read_register_name(ctx: &Ctx, name: &str) -> Result<Value, ExecError> {
    if let Some(v) = ctx.operands.get(name) {
        return Ok(Value::literal(*v));
    }
    read_resolved(ctx, name, None)
}

fn read_resolved(ctx: &Ctx, name: &str, index: Option<u32>) -> Result<Value, ExecError> {
    use crate::model::Resolved;

    let resolved = ctx
        .isa
        .resolve(name)
        .map_err(|e| ExecError::unknown_reference(e.to_string()))?;

    match resolved {
        Resolved::Register { register, index: alias_index } => {
            let effective_index = index.or(alias_index);
            match effective_index {
                Some(i) => {
                    let v = ctx.state.get_indexed(&register.name, i)?;
                    Ok(Value::new(v as u128, register.width))
                }
                None => {
                    if register.is_file() {
                        Err(ExecError::type_mismatch(format!(
                            "register file '{}' accessed without an index",
                            name
                        )))
                    } else {
                        let v = ctx.state.get_scalar(&register.name)?;
                        Ok(Value::new(v as u128, register.width))
                    }
                }
            }
        }
        Resolved::Virtual(vreg) => {
            if index.is_some() {
                return Err(ExecError::type_mismatch(format!(
                    "virtual register '{}' cannot be indexed",
                    name
                )));
            }
            let mut acc: u128 = 0;
            let mut shift = 0u32;
            for component in vreg.components.iter().rev() {
                let reg = ctx.isa.get_register(&component.reg_name).ok_or_else(|| {
                    ExecError::unknown_reference(format!("register '{}'", component.reg_name))
                })?;
                let raw = match component.index {
                    Some(i) => ctx.state.get_indexed(&reg.name, i)?,
                    None => ctx.state.get_scalar(&reg.name)?,
                };
                acc |= (raw as u128) << shift;
                shift += reg.width;
            }
            Ok(Value::new(acc, vreg.width))
        }
    }
}

/// Resolves a register-field access's base name (e.g. `PSW` in
/// `PSW.carry`) through aliases to a concrete register and optional
/// file index, the same way a plain register reference would.
fn resolve_field_base(ctx: &Ctx, name: &str) -> Result<(crate::model::Register, Option<u32>), ExecError> {
    use crate::model::Resolved;

    let resolved = ctx
        .isa
        .resolve(name)
        .map_err(|e| ExecError::unknown_reference(e.to_string()))?;

    match resolved {
        Resolved::Register { register, index } => Ok((register.clone(), index)),
        Resolved::Virtual(_) => Err(ExecError::type_mismatch(format!(
            "virtual register '{}' has no fields",
            name
        ))),
    }
}

fn write_resolved(ctx: &mut Ctx, name: &str, index: Option<u32>, value: u64) -> Result<(), ExecError> {
    use crate::model::Resolved;

    let resolved = ctx
        .isa
        .resolve(name)
        .map_err(|e| ExecError::unknown_reference(e.to_string()))?;

    match resolved {
        Resolved::Register { register, index: alias_index } => {
            let effective_index = index.or(alias_index);
            let width = register.width;
            let truncated = mask(value as u128, width) as u64;
            let reg_name = register.name.clone();
            match effective_index {
                Some(i) => ctx.state.set_indexed(&reg_name, i, truncated),
                None => {
                    if register.is_file() {
                        Err(ExecError::type_mismatch(format!(
                            "register file '{}' assigned without an index",
                            name
                        )))
                    } else {
                        ctx.state.set_scalar(&reg_name, truncated)
                    }
                }
            }
        }
        Resolved::Virtual(vreg) => {
            if index.is_some() {
                return Err(ExecError::type_mismatch(format!(
                    "virtual register '{}' cannot be indexed",
                    name
                )));
            }
            let mut shift = 0u32;
            let components = vreg.components.clone();
            for component in components.iter().rev() {
                let reg = ctx
                    .isa
                    .get_register(&component.reg_name)
                    .ok_or_else(|| ExecError::unknown_reference(format!("register '{}'", component.reg_name)))?
                    .clone();
                let lane = ((value as u128) >> shift) as u64 & bit_mask_u64(reg.width);
                match component.index {
                    Some(i) => ctx.state.set_indexed(&reg.name, i, lane)?,
                    None => ctx.state.set_scalar(&reg.name, lane)?,
                }
                shift += reg.width;
            }
            Ok(())
        }
    }
}

fn eval_expr(ctx: &Ctx, expr: &RtlExpr) -> Result<Value, ExecError> {
    match expr {
        RtlExpr::Literal(v) => Ok(Value::literal(*v)),
        RtlExpr::Register { name, index, lane } => {
            let idx = match (index, lane) {
                (Some(e), _) => Some(eval_expr(ctx, e)?.as_u64() as u32),
                (None, Some(e)) => Some(eval_expr(ctx, e)?.as_u64() as u32),
                (None, None) => None,
            };
            if idx.is_none() && ctx.operands.contains_key(name) {
                return read_register_name(ctx, name);
            }
            read_resolved(ctx, name, idx)
        }
        RtlExpr::Field { reg, field } => {
            let (register, index) = resolve_field_base(ctx, reg)?;
            let bitfield = register
                .get_field(field)
                .ok_or_else(|| ExecError::unknown_reference(format!("field '{}.{}'", reg, field)))?;
            let whole = match index {
                Some(i) => ctx.state.get_indexed(&register.name, i)?,
                None => ctx.state.get_scalar(&register.name)?,
            };
            let v = (whole >> bitfield.lsb) & bit_mask_u64(bitfield.width());
            Ok(Value::new(v as u128, bitfield.width()))
        }
        RtlExpr::Bitfield { base, msb, lsb } => {
            let base_v = eval_expr(ctx, base)?;
            let msb_v = eval_expr(ctx, msb)?.as_u64() as u32;
            let lsb_v = eval_expr(ctx, lsb)?.as_u64() as u32;
            if msb_v < lsb_v {
                return Err(ExecError::index_out_of_range(format!(
                    "bitfield msb {} < lsb {}",
                    msb_v, lsb_v
                )));
            }
            let width = msb_v - lsb_v + 1;
            let v = (base_v.as_u64() >> lsb_v) & bit_mask_u64(width);
            Ok(Value::new(v as u128, width))
        }
        RtlExpr::Unary { op, expr } => {
            let v = eval_expr(ctx, expr)?;
            let width = v.effective_width();
            let bits = match op {
                UnaryOp::Neg => (!v.bits).wrapping_add(1),
                UnaryOp::Not => !v.bits,
                UnaryOp::LogicalNot => (!v.is_truthy()) as u128,
            };
            let out_width = if matches!(op, UnaryOp::LogicalNot) { 1 } else { width };
            Ok(Value::new(bits, out_width))
        }
        RtlExpr::Binary { op, lhs, rhs } => eval_binary(ctx, *op, lhs, rhs),
        RtlExpr::Ternary { cond, then_expr, else_expr } => {
            if eval_expr(ctx, cond)?.is_truthy() {
                eval_expr(ctx, then_expr)
            } else {
                eval_expr(ctx, else_expr)
            }
        }
        RtlExpr::Call { name, args } => eval_call(ctx, name, args),
    }
}

fn eval_binary(ctx: &Ctx, op: BinaryOp, lhs: &RtlExpr, rhs: &RtlExpr) -> Result<Value, ExecError> {
    let l = eval_expr(ctx, lhs)?;
    let r = eval_expr(ctx, rhs)?;
    let width = Value::joint_width(&l, &r);

    let comparison = |v: bool| Ok(Value::new(v as u128, 1));

    match op {
        BinaryOp::Add => Ok(Value::new(l.bits.wrapping_add(r.bits), width)),
        BinaryOp::Sub => Ok(Value::new(l.bits.wrapping_sub(r.bits), width)),
        BinaryOp::Mul => Ok(Value::new(l.bits.wrapping_mul(r.bits), width)),
        BinaryOp::Div => {
            if r.bits == 0 {
                Err(ExecError::arithmetic_trap("division by zero"))
            } else {
                Ok(Value::new(l.bits / r.bits, width))
            }
        }
        BinaryOp::Mod => {
            if r.bits == 0 {
                Err(ExecError::arithmetic_trap("modulo by zero"))
            } else {
                Ok(Value::new(l.bits % r.bits, width))
            }
        }
        BinaryOp::And => Ok(Value::new(l.bits & r.bits, width)),
        BinaryOp::Or => Ok(Value::new(l.bits | r.bits, width)),
        BinaryOp::Xor => Ok(Value::new(l.bits ^ r.bits, width)),
        BinaryOp::Shl => Ok(Value::new(l.bits.wrapping_shl(r.bits as u32), width)),
        BinaryOp::Shr => Ok(Value::new(l.bits.wrapping_shr(r.bits as u32), width)),
        BinaryOp::AShr => {
            let w = l.effective_width();
            let signed = to_signed_i128(l.as_u64(), w);
            let shifted = signed >> (r.bits as u32).min(127);
            Ok(Value::new((shifted as u128) & mask(u128::MAX, w), w))
        }
        BinaryOp::Eq => comparison(l.as_u64() == r.as_u64()),
        BinaryOp::Ne => comparison(l.as_u64() != r.as_u64()),
        BinaryOp::Lt => comparison(l.as_u64() < r.as_u64()),
        BinaryOp::Le => comparison(l.as_u64() <= r.as_u64()),
        BinaryOp::Gt => comparison(l.as_u64() > r.as_u64()),
        BinaryOp::Ge => comparison(l.as_u64() >= r.as_u64()),
        BinaryOp::LogicalAnd => comparison(l.is_truthy() && r.is_truthy()),
        BinaryOp::LogicalOr => comparison(l.is_truthy() || r.is_truthy()),
        BinaryOp::Concat => {
            let rw = r.effective_width();
            let lw = l.effective_width();
            Ok(Value::new((l.bits << rw) | r.bits, lw + rw))
        }
    }
}

fn to_signed_i128(v: u64, width: u32) -> i128 {
    if width == 0 || width >= 128 {
        return v as i128;
    }
    let sign_bit = 1u128 << (width - 1);
    let v = v as u128;
    if v & sign_bit != 0 {
        (v as i128) - (1i128 << width)
    } else {
        v as i128
    }
}

/// Evaluates one of the closed set of built-in call names
/// (case-insensitive). Any other name is an unsupported feature.
fn eval_call(ctx: &Ctx, name: &str, args: &[RtlExpr]) -> Result<Value, ExecError> {
    let argv: Result<Vec<Value>, ExecError> = args.iter().map(|a| eval_expr(ctx, a)).collect();
    let argv = argv?;

    match name.to_ascii_lowercase().as_str() {
        "sign_extend" | "sext" | "sx" => {
            let (v, from_w, to_w) = extend_args(&argv)?;
            let signed = to_signed_i128(v, from_w);
            Ok(Value::new((signed as u128) & mask(u128::MAX, to_w), to_w))
        }
        "zero_extend" | "zext" | "zx" => {
            let (v, from_w, to_w) = extend_args(&argv)?;
            Ok(Value::new((v as u128) & mask(u128::MAX, from_w), to_w))
        }
        "extract_bits" => {
            let v = arg_u64(&argv, 0)?;
            let msb = arg_u64(&argv, 1)? as u32;
            let lsb = arg_u64(&argv, 2)? as u32;
            if msb < lsb {
                return Err(ExecError::index_out_of_range(format!("extract_bits msb {} < lsb {}", msb, lsb)));
            }
            let width = msb - lsb + 1;
            Ok(Value::new(((v >> lsb) & bit_mask_u64(width)) as u128, width))
        }
        "to_signed" => {
            let v = arg_u64(&argv, 0)?;
            let w = arg_width(&argv, 0, 1)?;
            let signed = to_signed_i128(v, w);
            Ok(Value::new((signed as u128) & mask(u128::MAX, w), w))
        }
        "to_unsigned" => {
            let v = arg_u64(&argv, 0)?;
            let w = arg_width(&argv, 0, 1)?;
            Ok(Value::new((v as u128) & mask(u128::MAX, w), w))
        }
        "ssov" => {
            let v = arg_u64(&argv, 0)?;
            let from_w = argv.get(0).map(Value::effective_width).unwrap_or(64);
            let to_w = arg_width(&argv, 0, 1)?;
            if to_w == 0 {
                return Err(ExecError::type_mismatch("ssov target width must be at least 1 bit"));
            }
            let signed = to_signed_i128(v, from_w);
            let max = (1i128 << (to_w - 1)) - 1;
            let min = -(1i128 << (to_w - 1));
            let clamped = signed.clamp(min, max);
            Ok(Value::new((clamped as u128) & mask(u128::MAX, to_w), to_w))
        }
        "suov" => {
            let v = arg_u64(&argv, 0)?;
            let to_w = arg_width(&argv, 0, 1)?;
            let max = bit_mask_u64(to_w);
            Ok(Value::new(v.min(max) as u128, to_w))
        }
        "carry" => {
            let a = arg_u64(&argv, 0)?;
            let b = arg_u64(&argv, 1)?;
            let w = arg_width(&argv, 0, 2)?;
            let sum = (a as u128) + (b as u128);
            Ok(Value::new(((sum >> w) & 1) as u128, 1))
        }
        "borrow" => {
            let a = arg_u64(&argv, 0)?;
            let b = arg_u64(&argv, 1)?;
            Ok(Value::bool_value(a < b))
        }
        "reverse16" => {
            let v = arg_u64(&argv, 0)? as u16;
            Ok(Value::new(v.reverse_bits() as u128, 16))
        }
        "leading_ones" => {
            let v = arg_u64(&argv, 0)?;
            let w = arg_width(&argv, 0, 1)?;
            Ok(Value::new(count_leading(v, w, true) as u128, 32))
        }
        "leading_zeros" => {
            let v = arg_u64(&argv, 0)?;
            let w = arg_width(&argv, 0, 1)?;
            Ok(Value::new(count_leading(v, w, false) as u128, 32))
        }
        "leading_signs" => {
            let v = arg_u64(&argv, 0)?;
            let w = arg_width(&argv, 0, 1)?;
            if w == 0 {
                return Ok(Value::new(0, 32));
            }
            let sign = (v >> (w - 1)) & 1 == 1;
            let run = count_leading(v, w, sign) as u64;
            Ok(Value::new(run.saturating_sub(1) as u128, 32))
        }
        other => Err(ExecError::unsupported(format!("unknown intrinsic '{}'", other))),
    }
}

fn count_leading(v: u64, width: u32, ones: bool) -> u32 {
    let mut n = 0;
    for i in (0..width).rev() {
        let bit = (v >> i) & 1 == 1;
        if bit == ones {
            n += 1;
        } else {
            break;
        }
    }
    n
}

fn arg_u64(argv: &[Value], i: usize) -> Result<u64, ExecError> {
    argv.get(i)
        .map(Value::as_u64)
        .ok_or_else(|| ExecError::type_mismatch(format!("missing argument {}", i)))
}

/// Resolves an explicit width argument at `width_idx`, falling back to
/// the effective width of the value argument at `value_idx` if absent.
fn arg_width(argv: &[Value], value_idx: usize, width_idx: usize) -> Result<u32, ExecError> {
    match argv.get(width_idx) {
        Some(v) => Ok(v.as_u64() as u32),
        None => Ok(argv
            .get(value_idx)
            .map(Value::effective_width)
            .unwrap_or(64)),
    }
}

fn extend_args(argv: &[Value]) -> Result<(u64, u32, u32), ExecError> {
    let v = arg_u64(argv, 0)?;
    let from_w = match argv.get(1) {
        Some(w) => w.as_u64() as u32,
        None => argv[0].effective_width(),
    };
    let to_w = match argv.get(2) {
        Some(w) => w.as_u64() as u32,
        None => return Err(ExecError::type_mismatch("extend requires a target width")),
    };
    Ok((v, from_w, to_w))
}

/// Writes a value through an lvalue expression: plain register
/// (scalar, file-indexed, or vector-lane), field (read-modify-write),
/// or bitfield (read-modify-write of the underlying base).
fn assign_lvalue(ctx: &mut Ctx, target: &RtlExpr, value: u64) -> Result<(), ExecError> {
    match target {
        RtlExpr::Register { name, index, lane } => {
            let idx = match (index, lane) {
                (Some(e), _) => Some(eval_expr(ctx, e)?.as_u64() as u32),
                (None, Some(e)) => Some(eval_expr(ctx, e)?.as_u64() as u32),
                (None, None) => None,
            };
            write_resolved(ctx, name, idx, value)
        }
        RtlExpr::Field { reg, field } => {
            let (register, index) = resolve_field_base(ctx, reg)?;
            let bitfield = register
                .get_field(field)
                .ok_or_else(|| ExecError::unknown_reference(format!("field '{}.{}'", reg, field)))?
                .clone();
            let w = bitfield.width();
            let shifted = (value & bit_mask_u64(w)) << bitfield.lsb;
            match index {
                Some(i) => {
                    let whole = ctx.state.get_indexed(&register.name, i)?;
                    let preserved = whole & !(bit_mask_u64(w) << bitfield.lsb);
                    ctx.state.set_indexed(&register.name, i, preserved | shifted)
                }
                None => {
                    let whole = ctx.state.get_scalar(&register.name)?;
                    let preserved = whole & !(bit_mask_u64(w) << bitfield.lsb);
                    ctx.state.set_scalar(&register.name, preserved | shifted)
                }
            }
        }
        RtlExpr::Bitfield { base, msb, lsb } => {
            let msb_v = eval_expr(ctx, msb)?.as_u64() as u32;
            let lsb_v = eval_expr(ctx, lsb)?.as_u64() as u32;
            if msb_v < lsb_v {
                return Err(ExecError::index_out_of_range(format!(
                    "bitfield msb {} < lsb {}",
                    msb_v, lsb_v
                )));
            }
            let w = msb_v - lsb_v + 1;
            let current = eval_expr(ctx, base)?.as_u64();
            let shifted = (value & bit_mask_u64(w)) << lsb_v;
            let preserved = current & !(bit_mask_u64(w) << lsb_v);
            assign_lvalue(ctx, base, preserved | shifted)
        }
        other => Err(ExecError::type_mismatch(format!("'{:?}' is not an lvalue", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BitField, Endianness, Isa, Register, RegisterKind, RtlBlock, RtlExpr, RtlStmt};

    fn gpr_isa() -> Isa {
        Isa::new(
            "test",
            32,
            Endianness::Little,
            vec![Register {
                name: "R".into(),
                kind: RegisterKind::GeneralPurpose,
                width: 32,
                count: Some(4),
                fields: vec![],
            }],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn assignment_truncates_to_register_width() {
        let isa = gpr_isa();
        let mut state = State::zeroed(&isa);
        let block = RtlBlock {
            statements: vec![RtlStmt::Assign {
                target: RtlExpr::Register {
                    name: "R".into(),
                    index: Some(Box::new(RtlExpr::Literal(0))),
                    lane: None,
                },
                value: RtlExpr::Literal(0xFFFF_FFFF_0000_0001),
            }],
        };
        let instruction = Instruction {
            mnemonic: "NOP".into(),
            format: None,
            operands: vec![],
            encoding: Default::default(),
            behavior: Some(block),
            external_behavior: false,
            is_bundle: false,
            bundle_format: None,
            bundle_slots: vec![],
        };
        execute(&isa, &instruction, &HashMap::new(), &mut state).unwrap();
        assert_eq!(state.get_indexed("R", 0).unwrap(), 1);
    }

    #[test]
    fn division_by_zero_traps() {
        let isa = gpr_isa();
        let mut state = State::zeroed(&isa);
        let ctx = &mut Ctx {
            isa: &isa,
            operands: &HashMap::new(),
            state: &mut state,
        };
        let err = eval_binary(ctx, BinaryOp::Div, &RtlExpr::Literal(1), &RtlExpr::Literal(0)).unwrap_err();
        assert_eq!(err.kind, crate::error::ExecErrorKind::ArithmeticTrap);
    }

    #[test]
    fn bitfield_rmw_identity() {
        let isa = Isa::new(
            "test",
            32,
            Endianness::Little,
            vec![Register {
                name: "PSW".into(),
                kind: RegisterKind::SpecialFunction,
                width: 32,
                count: None,
                fields: vec![BitField { name: "carry".into(), msb: 3, lsb: 3 }],
            }],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        let mut state = State::zeroed(&isa);
        state.set_scalar("PSW", 0b1010).unwrap();
        let mut ctx = Ctx {
            isa: &isa,
            operands: &HashMap::new(),
            state: &mut state,
        };
        let read = eval_expr(&ctx, &RtlExpr::Field { reg: "PSW".into(), field: "carry".into() }).unwrap();
        assign_lvalue(
            &mut ctx,
            &RtlExpr::Field { reg: "PSW".into(), field: "carry".into() },
            read.as_u64(),
        )
        .unwrap();
        assert_eq!(state.get_scalar("PSW").unwrap(), 0b1010);
    }

    #[test]
    fn field_access_resolves_through_alias() {
        use crate::model::RegisterAlias;

        let isa = Isa::new(
            "test",
            32,
            Endianness::Little,
            vec![Register {
                name: "PSW".into(),
                kind: RegisterKind::SpecialFunction,
                width: 32,
                count: None,
                fields: vec![BitField { name: "carry".into(), msb: 3, lsb: 3 }],
            }],
            vec![],
            vec![RegisterAlias { alias_name: "FLAGS".into(), target_reg_name: "PSW".into(), target_index: None }],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        let mut state = State::zeroed(&isa);
        state.set_scalar("PSW", 0b1010).unwrap();
        let ctx = Ctx {
            isa: &isa,
            operands: &HashMap::new(),
            state: &mut state,
        };
        let via_alias = eval_expr(&ctx, &RtlExpr::Field { reg: "FLAGS".into(), field: "carry".into() }).unwrap();
        let via_target = eval_expr(&ctx, &RtlExpr::Field { reg: "PSW".into(), field: "carry".into() }).unwrap();
        assert_eq!(via_alias.as_u64(), via_target.as_u64());
        assert_eq!(via_alias.as_u64(), 1);
    }

    #[test]
    fn ssov_rejects_zero_width_instead_of_panicking() {
        let isa = gpr_isa();
        let mut state = State::zeroed(&isa);
        let ctx = Ctx {
            isa: &isa,
            operands: &HashMap::new(),
            state: &mut state,
        };
        let args = vec![RtlExpr::Literal(5), RtlExpr::Literal(0)];
        let err = eval_call(&ctx, "ssov", &args).unwrap_err();
        assert_eq!(err.kind, crate::error::ExecErrorKind::TypeMismatch);
    }
}
