use serde::{Deserialize, Serialize};

/// Unary operators available in an RTL expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    LogicalNot,
}

/// Binary operators available in an RTL expression, spanning
/// arithmetic, bitwise, comparison, logical and concatenation forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AShr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
    Concat,
}

/// One node of the RTL expression AST.
///
/// This is a closed sum type: every traversal (validation, execution,
/// pretty-printing) switches on it exhaustively rather than relying on
/// runtime type inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RtlExpr {
    Literal(u64),
    /// A register access, e.g. `R[3]` or, for a vector register, a
    /// lane-indexed access `V.lane[2]`.
    Register {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<Box<RtlExpr>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lane: Option<Box<RtlExpr>>,
    },
    /// A named bit-field access on a register, e.g. `PSW.carry`.
    Field { reg: String, field: String },
    /// `base[msb:lsb]`.
    Bitfield {
        base: Box<RtlExpr>,
        msb: Box<RtlExpr>,
        lsb: Box<RtlExpr>,
    },
    Unary { op: UnaryOp, expr: Box<RtlExpr> },
    Binary {
        op: BinaryOp,
        lhs: Box<RtlExpr>,
        rhs: Box<RtlExpr>,
    },
    Ternary {
        cond: Box<RtlExpr>,
        then_expr: Box<RtlExpr>,
        else_expr: Box<RtlExpr>,
    },
    Call { name: String, args: Vec<RtlExpr> },
}

/// One RTL statement.
///
/// `For` is part of the closed variant set but is never executable:
/// the interpreter rejects it with an unsupported-feature error,
/// deliberately, so that any ISA spec using it fails the RTL
/// interpretability check during validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RtlStmt {
    Assign { target: RtlExpr, value: RtlExpr },
    If {
        cond: RtlExpr,
        then_block: RtlBlock,
        #[serde(default)]
        else_block: RtlBlock,
    },
    MemRead {
        target: RtlExpr,
        address: RtlExpr,
        size: u32,
    },
    MemWrite {
        address: RtlExpr,
        size: u32,
        value: RtlExpr,
    },
    For {
        var: String,
        start: RtlExpr,
        end: RtlExpr,
        body: RtlBlock,
    },
}

/// An ordered sequence of statements, evaluated sequentially.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RtlBlock {
    #[serde(default)]
    pub statements: Vec<RtlStmt>,
}

impl RtlBlock {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
