//! Lowering from the parsed AST to the executable concrete syntax tree.
//!
//! This is where names die: every local-variable occurrence becomes an
//! absolute slot index via the two-pass allocator in [super::stack], every
//! function name becomes a table index, and every builtin name becomes a
//! [BuiltinFn]. Structural errors (emit targets that are not out-of-stream
//! variables, assignments to built-in bindings, arity mismatches) are
//! reported here, before any record flows.

use strec_dsl::ast::{
    self, BinaryOp, ContextVar, EmitStyle, Lvalue, RedirectMode, Stmt, StmtKind, TypeDecl, UnaryOp,
};
use strec_dsl::error::{Error as DslError, Errors};
use strec_dsl::WithErrorInfo;

use indexmap::IndexMap;

use super::builtins::{self, BuiltinFn};
use super::stack::{LocalRef, StackAllocator, StackLayout};
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum CExpr {
    Literal(Value),
    /// String literals stay distinct: they are subject to `\1`..`\9`
    /// capture substitution while a match is live.
    StrLiteral(String),
    Field(String),
    Oosvar {
        name: String,
        indices: Vec<CExpr>,
    },
    Local(usize),
    ContextVar(ContextVar),
    Unary(UnaryOp, Box<CExpr>),
    Binary(BinaryOp, Box<CExpr>, Box<CExpr>),
    Ternary(Box<CExpr>, Box<CExpr>, Box<CExpr>),
    Builtin(BuiltinFn, Vec<CExpr>),
    CallFunc {
        func: usize,
        args: Vec<CExpr>,
    },
}

#[derive(Debug, Clone)]
pub enum CLvalue {
    Field(String),
    FullRecord,
    Oosvar {
        name: String,
        indices: Vec<CExpr>,
    },
    FullOosvar,
    Local(usize),
}

/// A frame's absolute slot extent, cleared back to absent on entry. The
/// node id is a lowering-time artifact resolved by [resolve_stmts].
#[derive(Debug, Clone)]
pub struct FrameExtent {
    node: usize,
    pub base: usize,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct CRedirect {
    pub mode: RedirectMode,
    pub target: CExpr,
}

#[derive(Debug, Clone)]
pub struct CEmitTarget {
    /// Empty name with `all` set means `@*`.
    pub name: String,
    pub indices: Vec<CExpr>,
    pub all: bool,
}

#[derive(Debug, Clone)]
pub enum ForTarget {
    Oosvar { name: String, indices: Vec<CExpr> },
    FullOosvar,
    FullRecord,
}

#[derive(Debug, Clone)]
pub enum CStmt {
    ClearFrame(FrameExtent),
    Assign {
        lhs: CLvalue,
        op: Option<BinaryOp>,
        rhs: CExpr,
    },
    Unset(Vec<CLvalue>),
    CondBlock {
        cond: CExpr,
        body: Vec<CStmt>,
    },
    If {
        arms: Vec<(CExpr, Vec<CStmt>)>,
        else_body: Vec<CStmt>,
    },
    While {
        cond: CExpr,
        body: Vec<CStmt>,
    },
    DoWhile {
        body: Vec<CStmt>,
        cond: CExpr,
    },
    ForLoop {
        frame: FrameExtent,
        init: Box<CStmt>,
        cond: CExpr,
        step: Box<CStmt>,
        body: Vec<CStmt>,
    },
    ForMap {
        frame: FrameExtent,
        key_slots: Vec<usize>,
        value_slot: usize,
        target: ForTarget,
        body: Vec<CStmt>,
    },
    Filter(CExpr),
    Emit {
        style: EmitStyle,
        redirect: Option<CRedirect>,
        target: CEmitTarget,
        names: Vec<CExpr>,
    },
    EmitF {
        redirect: Option<CRedirect>,
        names: Vec<String>,
    },
    TeeStmt {
        redirect: CRedirect,
    },
    Print {
        redirect: Option<CRedirect>,
        expr: Option<CExpr>,
        newline: bool,
        stderr: bool,
    },
    Dump {
        redirect: Option<CRedirect>,
        stderr: bool,
    },
    CallSubr {
        func: usize,
        args: Vec<CExpr>,
    },
    Return(Option<CExpr>),
    Break,
    Continue,
    Expression(CExpr),
}

pub struct Function {
    pub name: String,
    pub is_subr: bool,
    pub param_slots: Vec<usize>,
    pub param_types: Vec<TypeDecl>,
    pub body: Vec<CStmt>,
    pub stack_size: usize,
    pub local_types: Vec<TypeDecl>,
}

pub struct Program {
    pub begin: Vec<CStmt>,
    pub main: Vec<CStmt>,
    pub end: Vec<CStmt>,
    pub funcs: Vec<Function>,
    pub stack_size: usize,
    pub local_types: Vec<TypeDecl>,
}

struct FuncSig {
    index: usize,
    arity: usize,
    is_subr: bool,
}

pub fn lower(stmts: Vec<Stmt>) -> Result<Program, Errors> {
    // collect function signatures first so definition order does not matter
    let mut signatures: IndexMap<String, FuncSig> = IndexMap::new();
    let mut errors = Vec::new();
    for stmt in &stmts {
        match &stmt.kind {
            StmtKind::FuncDef { name, params, .. } | StmtKind::SubrDef { name, params, .. } => {
                let is_subr = matches!(stmt.kind, StmtKind::SubrDef { .. });
                if builtins::from_name(name).is_some() {
                    errors.push(
                        DslError::new_simple(format!("'{name}' shadows a built-in function"))
                            .with_span(Some(stmt.span)),
                    );
                }
                if signatures
                    .insert(
                        name.clone(),
                        FuncSig {
                            index: signatures.len(),
                            arity: params.len(),
                            is_subr,
                        },
                    )
                    .is_some()
                {
                    errors.push(
                        DslError::new_simple(format!("'{name}' is defined more than once"))
                            .with_span(Some(stmt.span)),
                    );
                }
            }
            _ => {}
        }
    }

    let mut funcs = Vec::new();
    let mut begin_ast = Vec::new();
    let mut end_ast = Vec::new();
    let mut main_ast = Vec::new();
    for stmt in stmts {
        match stmt.kind {
            StmtKind::FuncDef { name, params, body }
            | StmtKind::SubrDef { name, params, body } => {
                let is_subr = funcs_is_subr(&signatures, &name);
                match lower_function(&signatures, name, params, body, is_subr) {
                    Ok(f) => funcs.push(f),
                    Err(mut e) => errors.append(&mut e),
                }
            }
            StmtKind::Begin(body) => begin_ast.push(body),
            StmtKind::End(body) => end_ast.push(body),
            _ => main_ast.push(stmt),
        }
    }

    let mut lowerer = Lowerer {
        alloc: StackAllocator::new(),
        signatures: &signatures,
        errors: Vec::new(),
    };
    let begin = begin_ast
        .into_iter()
        .flat_map(|body| lowerer.lower_block(body))
        .collect();
    let main = lowerer.lower_stmts(main_ast);
    let end = end_ast
        .into_iter()
        .flat_map(|body| lowerer.lower_block(body))
        .collect();
    errors.append(&mut lowerer.errors);

    if !errors.is_empty() {
        return Err(Errors(errors));
    }

    let layout = lowerer.alloc.finalize();
    let mut program = Program {
        begin,
        main,
        end,
        funcs,
        stack_size: layout.stack_size,
        local_types: layout.types.clone(),
    };
    resolve_stmts(&mut program.begin, &layout);
    resolve_stmts(&mut program.main, &layout);
    resolve_stmts(&mut program.end, &layout);
    Ok(program)
}

fn funcs_is_subr(signatures: &IndexMap<String, FuncSig>, name: &str) -> bool {
    signatures.get(name).map(|s| s.is_subr).unwrap_or(false)
}

fn lower_function(
    signatures: &IndexMap<String, FuncSig>,
    name: String,
    params: Vec<ast::Param>,
    body: Vec<Stmt>,
    is_subr: bool,
) -> Result<Function, Vec<DslError>> {
    let mut lowerer = Lowerer {
        alloc: StackAllocator::new(),
        signatures,
        errors: Vec::new(),
    };
    let mut param_refs = Vec::new();
    let mut param_types = Vec::new();
    for p in &params {
        let t = p.type_decl.unwrap_or(TypeDecl::Var);
        param_refs.push(lowerer.alloc.declare(&p.name, t));
        param_types.push(t);
    }
    let body = lowerer.lower_stmts(body);
    if !lowerer.errors.is_empty() {
        return Err(lowerer.errors);
    }
    let layout = lowerer.alloc.finalize();
    let mut f = Function {
        name,
        is_subr,
        param_slots: param_refs.iter().map(|r| layout.resolve(*r)).collect(),
        param_types,
        body,
        stack_size: layout.stack_size,
        local_types: layout.types.clone(),
    };
    resolve_stmts(&mut f.body, &layout);
    Ok(f)
}

struct Lowerer<'a> {
    alloc: StackAllocator,
    signatures: &'a IndexMap<String, FuncSig>,
    errors: Vec<DslError>,
}

impl Lowerer<'_> {
    fn error(&mut self, span: strec_dsl::Span, msg: impl ToString) {
        self.errors
            .push(DslError::new_simple(msg).with_span(Some(span)));
    }

    /// Lower a `{ }` body: new frame, cleared on entry.
    fn lower_block(&mut self, body: Vec<Stmt>) -> Vec<CStmt> {
        let node = self.alloc.enter_frame();
        let mut out = vec![CStmt::ClearFrame(FrameExtent {
            node,
            base: 0,
            len: 0,
        })];
        out.extend(self.lower_stmts(body));
        self.alloc.exit_frame();
        out
    }

    fn lower_stmts(&mut self, stmts: Vec<Stmt>) -> Vec<CStmt> {
        stmts.into_iter().filter_map(|s| self.lower_stmt(s)).collect()
    }

    fn lower_stmt(&mut self, stmt: Stmt) -> Option<CStmt> {
        let span = stmt.span;
        Some(match stmt.kind {
            StmtKind::Begin(_) | StmtKind::End(_) => {
                self.error(span, "begin/end blocks are only allowed at the top level");
                return None;
            }
            StmtKind::FuncDef { .. } | StmtKind::SubrDef { .. } => {
                self.error(span, "function definitions are only allowed at the top level");
                return None;
            }
            StmtKind::VarDecl {
                type_decl,
                name,
                rhs,
            } => {
                let slot = self.alloc.declare(&name, type_decl);
                let rhs = match rhs {
                    Some(e) => self.lower_expr(e),
                    None => CExpr::Literal(Value::Absent),
                };
                CStmt::Assign {
                    lhs: CLvalue::Local(slot.0),
                    op: None,
                    rhs,
                }
            }
            StmtKind::Assignment { lhs, op, rhs } => {
                let rhs = self.lower_expr(rhs);
                let lhs = self.lower_lvalue(lhs, span);
                CStmt::Assign { lhs, op, rhs }
            }
            StmtKind::Unset(targets) => CStmt::Unset(
                targets
                    .into_iter()
                    .map(|t| self.lower_lvalue(t, span))
                    .collect(),
            ),
            StmtKind::CondBlock { cond, body } => CStmt::CondBlock {
                cond: self.lower_expr(cond),
                body: self.lower_block(body),
            },
            StmtKind::If { arms, else_body } => CStmt::If {
                arms: arms
                    .into_iter()
                    .map(|(cond, body)| (self.lower_expr(cond), self.lower_block(body)))
                    .collect(),
                else_body: else_body
                    .map(|body| self.lower_block(body))
                    .unwrap_or_default(),
            },
            StmtKind::While { cond, body } => CStmt::While {
                cond: self.lower_expr(cond),
                body: self.lower_block(body),
            },
            StmtKind::DoWhile { body, cond } => CStmt::DoWhile {
                body: self.lower_block(body),
                cond: self.lower_expr(cond),
            },
            StmtKind::ForLoop {
                init,
                cond,
                step,
                body,
            } => {
                let node = self.alloc.enter_frame();
                let init = self.lower_stmt(*init)?;
                let cond = self.lower_expr(cond);
                let step = self.lower_stmt(*step)?;
                let body = self.lower_stmts(body);
                self.alloc.exit_frame();
                CStmt::ForLoop {
                    frame: FrameExtent {
                        node,
                        base: 0,
                        len: 0,
                    },
                    init: Box::new(init),
                    cond,
                    step: Box::new(step),
                    body,
                }
            }
            StmtKind::ForMap {
                keys,
                value,
                target,
                body,
            } => {
                let target = match target.kind {
                    ast::ExprKind::Oosvar { name, indices } => ForTarget::Oosvar {
                        name,
                        indices: indices.into_iter().map(|e| self.lower_expr(e)).collect(),
                    },
                    ast::ExprKind::FullOosvar => ForTarget::FullOosvar,
                    ast::ExprKind::FullRecord => ForTarget::FullRecord,
                    _ => {
                        self.error(span, "for-loop target must be $*, @*, or an @-variable");
                        return None;
                    }
                };
                let node = self.alloc.enter_frame();
                let key_slots: Vec<usize> = keys
                    .iter()
                    .map(|k| self.alloc.declare(k, TypeDecl::Var).0)
                    .collect();
                let value_slot = self.alloc.declare(&value, TypeDecl::Var).0;
                let body = self.lower_stmts(body);
                self.alloc.exit_frame();
                CStmt::ForMap {
                    frame: FrameExtent {
                        node,
                        base: 0,
                        len: 0,
                    },
                    key_slots,
                    value_slot,
                    target,
                    body,
                }
            }
            StmtKind::Filter(e) => CStmt::Filter(self.lower_expr(e)),
            StmtKind::Emit {
                style,
                redirect,
                target,
                names,
            } => {
                let target = match target.kind {
                    ast::ExprKind::Oosvar { name, indices } => CEmitTarget {
                        name,
                        indices: indices.into_iter().map(|e| self.lower_expr(e)).collect(),
                        all: false,
                    },
                    ast::ExprKind::FullOosvar => CEmitTarget {
                        name: String::new(),
                        indices: Vec::new(),
                        all: true,
                    },
                    _ => {
                        self.error(span, "emit target must be an @-variable");
                        return None;
                    }
                };
                CStmt::Emit {
                    style,
                    redirect: redirect.map(|r| self.lower_redirect(r)),
                    target,
                    names: names.into_iter().map(|e| self.lower_expr(e)).collect(),
                }
            }
            StmtKind::EmitF { redirect, names } => {
                let mut plain = Vec::new();
                for e in names {
                    match e.kind {
                        ast::ExprKind::Oosvar { name, indices } if indices.is_empty() => {
                            plain.push(name);
                        }
                        _ => {
                            self.error(e.span, "emitf takes non-indexed @-variables");
                        }
                    }
                }
                CStmt::EmitF {
                    redirect: redirect.map(|r| self.lower_redirect(r)),
                    names: plain,
                }
            }
            StmtKind::Tee { redirect, expr } => {
                if !matches!(expr.kind, ast::ExprKind::FullRecord) {
                    self.error(span, "tee writes $*; use emit for @-variables");
                    return None;
                }
                CStmt::TeeStmt {
                    redirect: self.lower_redirect(redirect),
                }
            }
            StmtKind::Print {
                redirect,
                expr,
                newline,
                stderr,
            } => {
                if stderr && redirect.is_some() {
                    self.error(span, "eprint writes to stderr and takes no redirect");
                    return None;
                }
                CStmt::Print {
                    redirect: redirect.map(|r| self.lower_redirect(r)),
                    expr: expr.map(|e| self.lower_expr(e)),
                    newline,
                    stderr,
                }
            }
            StmtKind::Dump { redirect, stderr } => CStmt::Dump {
                redirect: redirect.map(|r| self.lower_redirect(r)),
                stderr,
            },
            StmtKind::CallSubr { name, args } => match self.signatures.get(&name) {
                Some(sig) if sig.is_subr => {
                    if sig.arity != args.len() {
                        self.error(
                            span,
                            format!("subroutine '{name}' takes {} arguments", sig.arity),
                        );
                    }
                    CStmt::CallSubr {
                        func: sig.index,
                        args: args.into_iter().map(|e| self.lower_expr(e)).collect(),
                    }
                }
                _ => {
                    self.error(span, format!("unknown subroutine '{name}'"));
                    return None;
                }
            },
            StmtKind::Return(e) => CStmt::Return(e.map(|e| self.lower_expr(e))),
            StmtKind::Break => CStmt::Break,
            StmtKind::Continue => CStmt::Continue,
            StmtKind::Expression(e) => CStmt::Expression(self.lower_expr(e)),
        })
    }

    fn lower_redirect(&mut self, r: ast::Redirect) -> CRedirect {
        CRedirect {
            mode: r.mode,
            target: self.lower_expr(*r.target),
        }
    }

    fn lower_lvalue(&mut self, lv: Lvalue, span: strec_dsl::Span) -> CLvalue {
        match lv {
            Lvalue::Field(name) => CLvalue::Field(name),
            Lvalue::FullRecord => CLvalue::FullRecord,
            Lvalue::Oosvar { name, indices } => CLvalue::Oosvar {
                name,
                indices: indices.into_iter().map(|e| self.lower_expr(e)).collect(),
            },
            Lvalue::FullOosvar => CLvalue::FullOosvar,
            Lvalue::Local(name) => {
                if ContextVar::from_name(&name).is_some() {
                    self.error(span, format!("cannot assign to built-in binding {name}"));
                }
                CLvalue::Local(self.alloc.write(&name).0)
            }
        }
    }

    fn lower_expr(&mut self, e: ast::Expr) -> CExpr {
        let span = e.span;
        match e.kind {
            ast::ExprKind::Literal(lit) => match lit {
                ast::Literal::Int(i) => CExpr::Literal(Value::Int(i)),
                ast::Literal::Float(f) => CExpr::Literal(Value::Float(f)),
                ast::Literal::Bool(b) => CExpr::Literal(Value::Bool(b)),
                ast::Literal::String(s) => CExpr::StrLiteral(s),
            },
            ast::ExprKind::Field(name) => CExpr::Field(name),
            ast::ExprKind::FullRecord => {
                self.error(span, "$* is not a scalar; use it in for/tee/emit positions");
                CExpr::Literal(Value::Error)
            }
            ast::ExprKind::Oosvar { name, indices } => CExpr::Oosvar {
                name,
                indices: indices.into_iter().map(|e| self.lower_expr(e)).collect(),
            },
            ast::ExprKind::FullOosvar => {
                self.error(span, "@* is not a scalar; use it in for/emit positions");
                CExpr::Literal(Value::Error)
            }
            ast::ExprKind::Local(name) => CExpr::Local(self.alloc.read(&name).0),
            ast::ExprKind::ContextVar(cv) => CExpr::ContextVar(cv),
            ast::ExprKind::Unary { op, expr } => {
                CExpr::Unary(op, Box::new(self.lower_expr(*expr)))
            }
            ast::ExprKind::Binary { op, left, right } => CExpr::Binary(
                op,
                Box::new(self.lower_expr(*left)),
                Box::new(self.lower_expr(*right)),
            ),
            ast::ExprKind::Ternary { cond, pass, fail } => CExpr::Ternary(
                Box::new(self.lower_expr(*cond)),
                Box::new(self.lower_expr(*pass)),
                Box::new(self.lower_expr(*fail)),
            ),
            ast::ExprKind::Call { name, args } => {
                let nargs = args.len();
                let args: Vec<CExpr> = args.into_iter().map(|e| self.lower_expr(e)).collect();
                if let Some(f) = builtins::from_name(&name) {
                    let (lo, hi) = builtins::arity(f);
                    if nargs < lo || nargs > hi {
                        self.error(span, format!("'{name}' takes {lo} or more arguments; got {nargs}"));
                    }
                    CExpr::Builtin(f, args)
                } else if let Some(sig) = self.signatures.get(&name) {
                    if sig.is_subr {
                        self.error(span, format!("'{name}' is a subroutine; use call"));
                    }
                    if sig.arity != nargs {
                        self.error(
                            span,
                            format!("function '{name}' takes {} arguments", sig.arity),
                        );
                    }
                    CExpr::CallFunc {
                        func: sig.index,
                        args,
                    }
                } else {
                    self.error(span, format!("unknown function '{name}'"));
                    CExpr::Literal(Value::Error)
                }
            }
        }
    }
}

// ----------------------------------------------------------------
// pass 2: rewrite occurrence ids into absolute indices

fn resolve_stmts(stmts: &mut Vec<CStmt>, layout: &StackLayout) {
    for stmt in stmts {
        resolve_stmt(stmt, layout);
    }
}

fn resolve_stmt(stmt: &mut CStmt, layout: &StackLayout) {
    match stmt {
        CStmt::ClearFrame(frame) => resolve_frame(frame, layout),
        CStmt::Assign { lhs, rhs, .. } => {
            resolve_lvalue(lhs, layout);
            resolve_expr(rhs, layout);
        }
        CStmt::Unset(targets) => {
            for t in targets {
                resolve_lvalue(t, layout);
            }
        }
        CStmt::CondBlock { cond, body } => {
            resolve_expr(cond, layout);
            resolve_stmts(body, layout);
        }
        CStmt::If { arms, else_body } => {
            for (cond, body) in arms {
                resolve_expr(cond, layout);
                resolve_stmts(body, layout);
            }
            resolve_stmts(else_body, layout);
        }
        CStmt::While { cond, body } => {
            resolve_expr(cond, layout);
            resolve_stmts(body, layout);
        }
        CStmt::DoWhile { body, cond } => {
            resolve_stmts(body, layout);
            resolve_expr(cond, layout);
        }
        CStmt::ForLoop {
            frame,
            init,
            cond,
            step,
            body,
        } => {
            resolve_frame(frame, layout);
            resolve_stmt(init, layout);
            resolve_expr(cond, layout);
            resolve_stmt(step, layout);
            resolve_stmts(body, layout);
        }
        CStmt::ForMap {
            frame,
            key_slots,
            value_slot,
            target,
            body,
        } => {
            resolve_frame(frame, layout);
            for slot in key_slots.iter_mut() {
                *slot = layout.resolve(LocalRef(*slot));
            }
            *value_slot = layout.resolve(LocalRef(*value_slot));
            match target {
                ForTarget::Oosvar { indices, .. } => {
                    for e in indices {
                        resolve_expr(e, layout);
                    }
                }
                ForTarget::FullOosvar | ForTarget::FullRecord => {}
            }
            resolve_stmts(body, layout);
        }
        CStmt::Filter(e) | CStmt::Expression(e) => resolve_expr(e, layout),
        CStmt::Emit {
            redirect,
            target,
            names,
            ..
        } => {
            if let Some(r) = redirect {
                resolve_expr(&mut r.target, layout);
            }
            for e in &mut target.indices {
                resolve_expr(e, layout);
            }
            for e in names {
                resolve_expr(e, layout);
            }
        }
        CStmt::EmitF { redirect, .. } => {
            if let Some(r) = redirect {
                resolve_expr(&mut r.target, layout);
            }
        }
        CStmt::TeeStmt { redirect } => resolve_expr(&mut redirect.target, layout),
        CStmt::Print { redirect, expr, .. } => {
            if let Some(r) = redirect {
                resolve_expr(&mut r.target, layout);
            }
            if let Some(e) = expr {
                resolve_expr(e, layout);
            }
        }
        CStmt::Dump { redirect, .. } => {
            if let Some(r) = redirect {
                resolve_expr(&mut r.target, layout);
            }
        }
        CStmt::CallSubr { args, .. } => {
            for e in args {
                resolve_expr(e, layout);
            }
        }
        CStmt::Return(e) => {
            if let Some(e) = e {
                resolve_expr(e, layout);
            }
        }
        CStmt::Break | CStmt::Continue => {}
    }
}

fn resolve_frame(frame: &mut FrameExtent, layout: &StackLayout) {
    let (base, len) = layout.frame_extent(frame.node);
    frame.base = base;
    frame.len = len;
}

fn resolve_lvalue(lv: &mut CLvalue, layout: &StackLayout) {
    match lv {
        CLvalue::Local(slot) => *slot = layout.resolve(LocalRef(*slot)),
        CLvalue::Oosvar { indices, .. } => {
            for e in indices {
                resolve_expr(e, layout);
            }
        }
        CLvalue::Field(_) | CLvalue::FullRecord | CLvalue::FullOosvar => {}
    }
}

fn resolve_expr(e: &mut CExpr, layout: &StackLayout) {
    match e {
        CExpr::Local(slot) => *slot = layout.resolve(LocalRef(*slot)),
        CExpr::Oosvar { indices, .. } => {
            for i in indices {
                resolve_expr(i, layout);
            }
        }
        CExpr::Unary(_, inner) => resolve_expr(inner, layout),
        CExpr::Binary(_, a, b) => {
            resolve_expr(a, layout);
            resolve_expr(b, layout);
        }
        CExpr::Ternary(a, b, c) => {
            resolve_expr(a, layout);
            resolve_expr(b, layout);
            resolve_expr(c, layout);
        }
        CExpr::Builtin(_, args) | CExpr::CallFunc { args, .. } => {
            for a in args {
                resolve_expr(a, layout);
            }
        }
        CExpr::Literal(_) | CExpr::StrLiteral(_) | CExpr::Field(_) | CExpr::ContextVar(_) => {}
    }
}
