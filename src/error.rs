//! Error and diagnostic types for the static (validator) and dynamic
//! (interpreter, encoder) surfaces.

use thiserror::Error;

/// The closed set of ways a specification can fail static validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Structural,
    Reference,
    Shape,
    Conflict,
    Semantic,
    Interpretability,
    AliasCycle,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Structural => "structural",
            DiagnosticKind::Reference => "reference",
            DiagnosticKind::Shape => "shape",
            DiagnosticKind::Conflict => "conflict",
            DiagnosticKind::Semantic => "semantic",
            DiagnosticKind::Interpretability => "interpretability",
            DiagnosticKind::AliasCycle => "alias-cycle",
        }
    }
}

/// One static validation finding: a kind, a human-readable message,
/// and a location tag (e.g. `"instruction ADD"`, `"format R_TYPE"`).
///
/// `validate` accumulates these non-fatally; an empty list means the
/// specification passed every check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("[{kind}] {location}: {message}", kind = self.kind.as_str())]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind,
            message: message.into(),
            location: location.into(),
        }
    }
}

/// The closed set of ways a single `execute` call can fail at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecErrorKind {
    Unsupported,
    UnknownReference,
    IndexOutOfRange,
    TypeMismatch,
    ArithmeticTrap,
}

impl ExecErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecErrorKind::Unsupported => "unsupported",
            ExecErrorKind::UnknownReference => "unknown-reference",
            ExecErrorKind::IndexOutOfRange => "index-out-of-range",
            ExecErrorKind::TypeMismatch => "type-mismatch",
            ExecErrorKind::ArithmeticTrap => "arithmetic-trap",
        }
    }
}

/// A single typed failure from the interpreter. Execution is not
/// partially recoverable: the first `ExecError` short-circuits the
/// remainder of the instruction's behavior block.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("[{kind}] {message}", kind = self.kind.as_str())]
pub struct ExecError {
    pub kind: ExecErrorKind,
    pub message: String,
}

impl ExecError {
    pub fn new(kind: ExecErrorKind, message: impl Into<String>) -> ExecError {
        ExecError {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> ExecError {
        ExecError::new(ExecErrorKind::Unsupported, message)
    }

    pub fn unknown_reference(message: impl Into<String>) -> ExecError {
        ExecError::new(ExecErrorKind::UnknownReference, message)
    }

    pub fn index_out_of_range(message: impl Into<String>) -> ExecError {
        ExecError::new(ExecErrorKind::IndexOutOfRange, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> ExecError {
        ExecError::new(ExecErrorKind::TypeMismatch, message)
    }

    pub fn arithmetic_trap(message: impl Into<String>) -> ExecError {
        ExecError::new(ExecErrorKind::ArithmeticTrap, message)
    }
}

/// Failure encoding an instruction's operands into a word.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("unknown format '{0}'")]
    UnknownFormat(String),
    #[error("operand '{operand}' value {value:#x} overflows its {width}-bit field")]
    OperandOverflow { operand: String, value: u64, width: u32 },
    #[error("no such operand or field '{0}'")]
    UnknownField(String),
    #[error("unknown slot '{0}'")]
    UnknownSlot(String),
}
