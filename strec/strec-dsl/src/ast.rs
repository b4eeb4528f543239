//! The abstract syntax tree produced by [crate::parser].
//!
//! Local-variable occurrences are left as names here; the embedding crate
//! resolves them to stack slots when it lowers the AST for execution.

use enum_as_inner::EnumAsInner;
use serde::Serialize;
use strum::AsRefStr;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

/// Read-only bindings provided by the streaming context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ContextVar {
    Nr,
    Fnr,
    Nf,
    Filename,
    Filenum,
    MPi,
    ME,
    Ips,
    Ifs,
    Irs,
    Ops,
    Ofs,
    Ors,
}

impl ContextVar {
    pub fn from_name(name: &str) -> Option<ContextVar> {
        use ContextVar::*;
        Some(match name {
            "NR" => Nr,
            "FNR" => Fnr,
            "NF" => Nf,
            "FILENAME" => Filename,
            "FILENUM" => Filenum,
            "M_PI" => MPi,
            "M_E" => ME,
            "IPS" => Ips,
            "IFS" => Ifs,
            "IRS" => Irs,
            "OPS" => Ops,
            "OFS" => Ofs,
            "ORS" => Ors,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
pub enum UnaryOp {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "~")]
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
pub enum BinaryOp {
    #[strum(serialize = "||")]
    Or,
    #[strum(serialize = "^^")]
    Xor,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "=~")]
    Match,
    #[strum(serialize = "!~")]
    NotMatch,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "|")]
    BitOr,
    #[strum(serialize = "^")]
    BitXor,
    #[strum(serialize = "&")]
    BitAnd,
    #[strum(serialize = "<<")]
    Shl,
    #[strum(serialize = ">>")]
    Shr,
    #[strum(serialize = ".")]
    Concat,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "//")]
    IntDiv,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Pow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
pub enum ExprKind {
    Literal(Literal),
    /// `$name`
    Field(String),
    /// `$*`, map-valued; legal only where a map is expected (for/emit/tee/dump)
    FullRecord,
    /// `@name[index]...`
    Oosvar { name: String, indices: Vec<Expr> },
    /// `@*`
    FullOosvar,
    /// A bare identifier: a local variable read
    Local(String),
    ContextVar(ContextVar),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        pass: Box<Expr>,
        fail: Box<Expr>,
    },
    /// Builtin or user-defined function call
    Call { name: String, args: Vec<Expr> },
}

/// Assignment / unset target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Lvalue {
    Field(String),
    FullRecord,
    Oosvar { name: String, indices: Vec<Expr> },
    FullOosvar,
    Local(String),
}

/// Type constraint on a declared local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TypeDecl {
    Var,
    Str,
    Num,
    Int,
    Float,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectMode {
    /// `> target`: truncate on first open
    Write,
    /// `>> target`: append on first open
    Append,
    /// `| target`: pipe to a shell command
    Pipe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redirect {
    pub mode: RedirectMode,
    pub target: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmitStyle {
    /// `emit`: unslotted levels land in the leaf map
    Emit,
    /// `emitp`: unslotted index labels are concatenated into compound keys
    EmitP,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub type_decl: Option<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
pub enum StmtKind {
    /// Executed once, before the first record.
    Begin(Vec<Stmt>),
    /// Executed once, after the last record.
    End(Vec<Stmt>),
    FuncDef {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    SubrDef {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    CallSubr {
        name: String,
        args: Vec<Expr>,
    },
    VarDecl {
        type_decl: TypeDecl,
        name: String,
        rhs: Option<Expr>,
    },
    Assignment {
        lhs: Lvalue,
        /// `Some(op)` for compound assignment, e.g. `+=`
        op: Option<BinaryOp>,
        rhs: Expr,
    },
    Unset(Vec<Lvalue>),
    /// `cond { ... }`
    CondBlock {
        cond: Expr,
        body: Vec<Stmt>,
    },
    If {
        /// `if` plus any `elif` arms, in order
        arms: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        cond: Expr,
    },
    ForLoop {
        init: Box<Stmt>,
        cond: Expr,
        step: Box<Stmt>,
        body: Vec<Stmt>,
    },
    /// `for ((k1, k2), v in target) { ... }`; one key name for the single-key
    /// form
    ForMap {
        keys: Vec<String>,
        value: String,
        target: Expr,
        body: Vec<Stmt>,
    },
    /// `filter expr`: gate the current record
    Filter(Expr),
    Emit {
        style: EmitStyle,
        redirect: Option<Redirect>,
        target: Expr,
        names: Vec<Expr>,
    },
    EmitF {
        redirect: Option<Redirect>,
        names: Vec<Expr>,
    },
    Tee {
        redirect: Redirect,
        expr: Expr,
    },
    Print {
        redirect: Option<Redirect>,
        expr: Option<Expr>,
        newline: bool,
        stderr: bool,
    },
    Dump {
        redirect: Option<Redirect>,
        stderr: bool,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    /// A bare expression; the last one decides record fate under `filter`
    Expression(Expr),
}

pub(crate) fn into_expr(kind: ExprKind, span: std::ops::Range<usize>) -> Expr {
    Expr {
        kind,
        span: span.into(),
    }
}

pub(crate) fn into_stmt(kind: StmtKind, span: std::ops::Range<usize>) -> Stmt {
    Stmt {
        kind,
        span: span.into(),
    }
}
