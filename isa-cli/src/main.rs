//! Thin host tool mirroring the original `isa_dsl` CLI's
//! `info`/`validate`/`exec` surface: load a spec file, run the
//! validator, optionally execute one instruction against a zero state.

use std::collections::HashMap;
use std::fmt;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use isa_model::interp::{self, RegisterValue, State};
use isa_model::validate;

#[derive(Parser)]
#[command(name = "isa-cli", about = "ISA toolchain core CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display registers, formats and instructions in a spec file.
    Info { isa_file: String },
    /// Validate a spec file and print any diagnostics.
    Validate { isa_file: String },
    /// Execute one instruction against a zero-initialized state.
    Exec {
        isa_file: String,
        mnemonic: String,
        /// Operand assignment `name=value` (decimal or 0x-prefixed hex).
        #[arg(long = "operand", value_name = "NAME=VALUE")]
        operand: Vec<String>,
    },
}

/// Aggregates the failure surfaces `main` can report. Plain enum with
/// a hand-rolled `Display`, since it's only ever printed, never
/// matched on by another crate.
enum CliError {
    Loader(isa_loader::LoaderError),
    Validation(usize),
    UnknownInstruction(String),
    BadOperand(String),
    Exec(isa_model::ExecError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Loader(e) => write!(f, "{}", e),
            CliError::Validation(n) => write!(f, "{} validation error(s) found", n),
            CliError::UnknownInstruction(m) => write!(f, "unknown instruction '{}'", m),
            CliError::BadOperand(spec) => write!(f, "malformed operand '{}', expected NAME=VALUE", spec),
            CliError::Exec(e) => write!(f, "{}", e),
        }
    }
}

impl From<isa_loader::LoaderError> for CliError {
    fn from(e: isa_loader::LoaderError) -> CliError {
        CliError::Loader(e)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Info { isa_file } => run_info(&isa_file),
        Command::Validate { isa_file } => run_validate(&isa_file),
        Command::Exec { isa_file, mnemonic, operand } => run_exec(&isa_file, &mnemonic, &operand),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_info(isa_file: &str) -> Result<(), CliError> {
    let isa = isa_loader::load_file(isa_file)?;

    println!("ISA: {}", isa.name);
    println!("  Registers: {}", isa.registers.len());
    println!("  Formats: {}", isa.formats.len());
    println!("  Instructions: {}", isa.instructions.len());

    println!("\nRegisters:");
    for reg in &isa.registers {
        if reg.is_file() {
            println!("  {}: {:?} [{}] x {} bits", reg.name, reg.kind, reg.count.unwrap_or(0), reg.width);
        } else {
            println!("  {}: {:?} {} bits", reg.name, reg.kind, reg.width);
        }
    }

    println!("\nInstruction formats:");
    for format in &isa.formats {
        println!("  {}: {} bits, {} fields", format.name, format.width, format.fields.len());
    }

    println!("\nInstructions:");
    for instruction in &isa.instructions {
        let operands = if instruction.operands.is_empty() {
            "none".to_string()
        } else {
            instruction.operands.join(", ")
        };
        println!("  {}: {}", instruction.mnemonic, operands);
    }

    Ok(())
}

fn run_validate(isa_file: &str) -> Result<(), CliError> {
    let isa = isa_loader::load_file(isa_file)?;
    let diagnostics = validate::validate(&isa);

    if diagnostics.is_empty() {
        println!("Validation passed! No errors found.");
        Ok(())
    } else {
        eprintln!("Found {} validation error(s):", diagnostics.len());
        for diagnostic in &diagnostics {
            eprintln!("  [{}] {}: {}", diagnostic.kind.as_str(), diagnostic.location, diagnostic.message);
        }
        Err(CliError::Validation(diagnostics.len()))
    }
}

fn run_exec(isa_file: &str, mnemonic: &str, operand_specs: &[String]) -> Result<(), CliError> {
    let isa = isa_loader::load_file(isa_file)?;

    let diagnostics = validate::validate(&isa);
    if !diagnostics.is_empty() {
        eprintln!("Found {} validation error(s); aborting exec:", diagnostics.len());
        for diagnostic in &diagnostics {
            eprintln!("  [{}] {}: {}", diagnostic.kind.as_str(), diagnostic.location, diagnostic.message);
        }
        return Err(CliError::Validation(diagnostics.len()));
    }

    let instruction = isa
        .get_instruction(mnemonic)
        .ok_or_else(|| CliError::UnknownInstruction(mnemonic.to_string()))?;

    let mut operands = HashMap::new();
    for spec in operand_specs {
        let (name, value) = parse_operand(spec)?;
        operands.insert(name, value);
    }

    let mut state = State::zeroed(&isa);
    let before = state.registers.clone();
    interp::execute(&isa, instruction, &operands, &mut state).map_err(CliError::Exec)?;

    println!("Executed '{}'.", mnemonic);
    for reg in &isa.registers {
        match (before.get(&reg.name), state.registers.get(&reg.name)) {
            (Some(RegisterValue::Scalar(old)), Some(RegisterValue::Scalar(new))) if old != new => {
                println!("  {} = {:#x}", reg.name, new);
            }
            (Some(RegisterValue::File(old_entries)), Some(RegisterValue::File(new_entries))) => {
                for (i, (old, new)) in old_entries.iter().zip(new_entries.iter()).enumerate() {
                    if old != new {
                        println!("  {}[{}] = {:#x}", reg.name, i, new);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn parse_operand(spec: &str) -> Result<(String, u64), CliError> {
    let (name, value) = spec.split_once('=').ok_or_else(|| CliError::BadOperand(spec.to_string()))?;
    let value = if let Some(hex) = value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        value.parse::<u64>()
    }
    .map_err(|_| CliError::BadOperand(spec.to_string()))?;
    Ok((name.to_string(), value))
}
