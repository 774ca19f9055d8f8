//! Semantic model, static validator, RTL interpreter and encoder for
//! declaratively specified instruction set architectures.
//!
//! An [`model::Isa`] is the in-memory description of an ISA: its
//! registers, instruction formats, instructions and their
//! register-transfer-level behavior, plus aliases and VLIW bundles.
//! [`validate::validate`] runs static checks over it, [`interp::execute`]
//! runs one instruction's behavior against externally owned state, and
//! [`encode`] packs/unpacks operand values into instruction and bundle
//! words.

pub mod encode;
pub mod error;
pub mod interp;
pub mod model;
pub mod validate;

pub use error::{Diagnostic, DiagnosticKind, EncodeError, ExecError, ExecErrorKind};
pub use model::Isa;
