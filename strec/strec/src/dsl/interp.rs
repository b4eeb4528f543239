//! Execution of lowered DSL programs.
//!
//! The machine walks the concrete syntax tree with a flat, pre-sized local
//! slot array; all name resolution happened at lowering. Runtime type
//! errors never abort the stream: they produce the error value, which
//! poisons whatever touches it and serializes as `(error)`.

use strec_dsl::ast::{BinaryOp, ContextVar, EmitStyle, RedirectMode, TypeDecl, UnaryOp};

use regex::Regex;

use super::builtins;
use super::lower::{
    CEmitTarget, CExpr, CLvalue, CRedirect, CStmt, ForTarget, FrameExtent, Program,
};
use super::oosvar::{OosMap, OosValue};
use super::redirect::RedirectCache;
use crate::context::Context;
use crate::errors::Result;
use crate::options::{ReaderOpts, WriterOpts};
use crate::record::Record;
use crate::value::{self, Value};

/// Process-wide DSL state: everything that outlives a single record.
pub struct DslState {
    pub oosvars: OosMap,
    pub captures: Vec<String>,
    pub redirects: RedirectCache,
    /// Records published by emit statements, drained downstream by the verb.
    pub emitted: Vec<Record>,
    /// Verdict of the last boolean bare expression / `filter` statement.
    pub filter_result: Option<bool>,
}

impl DslState {
    pub fn new(writer_opts: WriterOpts) -> DslState {
        DslState {
            oosvars: OosMap::new(),
            captures: Vec::new(),
            redirects: RedirectCache::new(writer_opts),
            emitted: Vec::new(),
            filter_result: None,
        }
    }
}

enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

struct Frame<'f> {
    slots: &'f mut Vec<Value>,
    types: &'f [TypeDecl],
}

pub struct Machine<'e> {
    program: &'e Program,
    ctx: &'e Context,
    reader_opts: &'e ReaderOpts,
    writer_opts: &'e WriterOpts,
    state: &'e mut DslState,
    rec: Option<&'e mut Record>,
}

/// Run one phase (begin stmts, per-record main stmts, or end stmts).
pub fn exec_phase(
    program: &Program,
    stmts: &[CStmt],
    ctx: &Context,
    reader_opts: &ReaderOpts,
    writer_opts: &WriterOpts,
    state: &mut DslState,
    rec: Option<&mut Record>,
) -> Result<()> {
    let mut machine = Machine {
        program,
        ctx,
        reader_opts,
        writer_opts,
        state,
        rec,
    };
    let mut slots = vec![Value::Absent; program.stack_size];
    let mut frame = Frame {
        slots: &mut slots,
        types: &program.local_types,
    };
    for stmt in stmts {
        match machine.exec_stmt(stmt, &mut frame)? {
            Flow::Normal => {}
            // break/continue/return at the top level end the phase
            _ => break,
        }
        // regex captures live to the end of the statement that set them
        machine.state.captures.clear();
    }
    Ok(())
}

impl Machine<'_> {
    fn ofmt(&self) -> &str {
        &self.writer_opts.ofmt
    }

    fn exec_block(&mut self, stmts: &[CStmt], fr: &mut Frame<'_>) -> Result<Flow> {
        for stmt in stmts {
            match self.exec_stmt(stmt, fr)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn clear_frame(&self, frame: &FrameExtent, fr: &mut Frame<'_>) {
        for slot in &mut fr.slots[frame.base..frame.base + frame.len] {
            *slot = Value::Absent;
        }
    }

    fn exec_stmt(&mut self, stmt: &CStmt, fr: &mut Frame<'_>) -> Result<Flow> {
        match stmt {
            CStmt::ClearFrame(frame) => {
                self.clear_frame(frame, fr);
            }
            CStmt::Assign { lhs, op, rhs } => {
                let rhs = self.eval(rhs, fr);
                let value = match op {
                    None => rhs,
                    Some(op) => {
                        let current = self.read_lvalue(lhs, fr);
                        self.binary(*op, current, rhs, fr)
                    }
                };
                self.write_lvalue(lhs, value, fr);
            }
            CStmt::Unset(targets) => {
                for t in targets {
                    self.unset_lvalue(t, fr);
                }
            }
            CStmt::CondBlock { cond, body } => {
                if self.eval(cond, fr).is_truthy() {
                    return self.exec_block(body, fr);
                }
            }
            CStmt::If { arms, else_body } => {
                for (cond, body) in arms {
                    if self.eval(cond, fr).is_truthy() {
                        return self.exec_block(body, fr);
                    }
                }
                return self.exec_block(else_body, fr);
            }
            CStmt::While { cond, body } => {
                while self.eval(cond, fr).is_truthy() {
                    match self.exec_block(body, fr)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                        ret => return Ok(ret),
                    }
                }
            }
            CStmt::DoWhile { body, cond } => loop {
                match self.exec_block(body, fr)? {
                    Flow::Break => break,
                    Flow::Continue | Flow::Normal => {}
                    ret => return Ok(ret),
                }
                if !self.eval(cond, fr).is_truthy() {
                    break;
                }
            },
            CStmt::ForLoop {
                frame,
                init,
                cond,
                step,
                body,
            } => {
                self.clear_frame(frame, fr);
                self.exec_stmt(init, fr)?;
                while self.eval(cond, fr).is_truthy() {
                    match self.exec_block(body, fr)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                        ret => return Ok(ret),
                    }
                    self.exec_stmt(step, fr)?;
                }
            }
            CStmt::ForMap {
                frame,
                key_slots,
                value_slot,
                target,
                body,
            } => {
                return self.exec_for_map(frame, key_slots, *value_slot, target, body, fr);
            }
            CStmt::Filter(e) => {
                let v = self.eval(e, fr);
                self.state.filter_result = Some(v.is_truthy());
            }
            CStmt::Emit {
                style,
                redirect,
                target,
                names,
            } => {
                self.exec_emit(*style, redirect.as_ref(), target, names, fr)?;
            }
            CStmt::EmitF { redirect, names } => {
                let mut rec = Record::new();
                for name in names {
                    let v = match self.state.oosvars.get(name) {
                        Some(OosValue::Scalar(v)) => v.clone(),
                        _ => Value::Absent,
                    };
                    rec.put(name.clone(), v.format(self.ofmt()));
                }
                self.publish(rec, redirect.as_ref(), fr)?;
            }
            CStmt::TeeStmt { redirect } => {
                let copy = self.rec.as_deref().cloned();
                if let Some(copy) = copy {
                    let (mode, target) = self.eval_redirect(redirect, fr);
                    self.state.redirects.write_record(mode, &target, &copy)?;
                }
            }
            CStmt::Print {
                redirect,
                expr,
                newline,
                stderr,
            } => {
                let mut text = match expr {
                    Some(e) => {
                        let v = self.eval(e, fr);
                        if v.is_absent() {
                            String::new()
                        } else {
                            v.format(self.ofmt())
                        }
                    }
                    None => String::new(),
                };
                if *newline {
                    text.push('\n');
                }
                match (redirect, stderr) {
                    (_, true) => {
                        self.state
                            .redirects
                            .write_text(RedirectMode::Write, "stderr", &text)?;
                    }
                    (Some(r), false) => {
                        let (mode, target) = self.eval_redirect(r, fr);
                        self.state.redirects.write_text(mode, &target, &text)?;
                    }
                    (None, false) => {
                        self.state
                            .redirects
                            .write_text(RedirectMode::Write, "stdout", &text)?;
                    }
                }
            }
            CStmt::Dump { redirect, stderr } => {
                let mut text = self.state.oosvars.to_json();
                text.push('\n');
                match (redirect, stderr) {
                    (_, true) => {
                        self.state
                            .redirects
                            .write_text(RedirectMode::Write, "stderr", &text)?;
                    }
                    (Some(r), false) => {
                        let (mode, target) = self.eval_redirect(r, fr);
                        self.state.redirects.write_text(mode, &target, &text)?;
                    }
                    (None, false) => {
                        self.state
                            .redirects
                            .write_text(RedirectMode::Write, "stdout", &text)?;
                    }
                }
            }
            CStmt::CallSubr { func, args } => {
                let args: Vec<Value> = args.iter().map(|a| self.eval(a, fr)).collect();
                self.call_function(*func, args)?;
            }
            CStmt::Return(e) => {
                let v = match e {
                    Some(e) => self.eval(e, fr),
                    None => Value::Absent,
                };
                return Ok(Flow::Return(v));
            }
            CStmt::Break => return Ok(Flow::Break),
            CStmt::Continue => return Ok(Flow::Continue),
            CStmt::Expression(e) => {
                let v = self.eval(e, fr);
                if let Value::Bool(b) = v {
                    self.state.filter_result = Some(b);
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_for_map(
        &mut self,
        frame: &FrameExtent,
        key_slots: &[usize],
        value_slot: usize,
        target: &ForTarget,
        body: &[CStmt],
        fr: &mut Frame<'_>,
    ) -> Result<Flow> {
        // snapshot the iterated structure so the body may mutate it
        let snapshot: OosMap = match target {
            ForTarget::FullRecord => {
                let mut m = OosMap::new();
                if let Some(rec) = self.rec.as_deref() {
                    for (k, v) in rec.iter() {
                        m.insert(k.to_string(), OosValue::Scalar(Value::from_field(v)));
                    }
                }
                m
            }
            ForTarget::FullOosvar => self.state.oosvars.clone(),
            ForTarget::Oosvar { name, indices } => {
                let path = self.oosvar_path(name, indices, fr);
                match self.state.oosvars.get_path(&path) {
                    Some(OosValue::Map(m)) => m.clone(),
                    _ => return Ok(Flow::Normal),
                }
            }
        };
        self.iterate_map(&snapshot, key_slots, value_slot, frame, body, fr)
    }

    fn iterate_map(
        &mut self,
        map: &OosMap,
        key_slots: &[usize],
        value_slot: usize,
        frame: &FrameExtent,
        body: &[CStmt],
        fr: &mut Frame<'_>,
    ) -> Result<Flow> {
        if key_slots.is_empty() {
            return Ok(Flow::Normal);
        }
        let mut key_values = Vec::with_capacity(key_slots.len());
        match self.iterate_level(map, key_slots, value_slot, frame, body, fr, &mut key_values)? {
            // break exits the whole loop nest
            Flow::Break => Ok(Flow::Normal),
            other => Ok(other),
        }
    }

    /// One level of a multi-key map iteration. The accumulated key values
    /// are re-bound into their slots at every leaf, after the frame clear.
    #[allow(clippy::too_many_arguments)]
    fn iterate_level(
        &mut self,
        map: &OosMap,
        key_slots: &[usize],
        value_slot: usize,
        frame: &FrameExtent,
        body: &[CStmt],
        fr: &mut Frame<'_>,
        key_values: &mut Vec<Value>,
    ) -> Result<Flow> {
        let depth = key_values.len();
        let leaf = depth + 1 == key_slots.len();
        for (key, node) in map.iter() {
            key_values.push(Value::from_field(key));
            let flow = if leaf {
                self.clear_frame(frame, fr);
                for (slot, kv) in key_slots.iter().zip(key_values.iter()) {
                    fr.slots[*slot] = kv.clone();
                }
                fr.slots[value_slot] = match node {
                    OosValue::Scalar(v) => v.clone(),
                    OosValue::Map(_) => Value::Absent,
                };
                self.exec_block(body, fr)?
            } else {
                match node {
                    // scalars above the leaf depth have nothing to bind below
                    OosValue::Scalar(_) => Flow::Normal,
                    OosValue::Map(inner) => self.iterate_level(
                        inner, key_slots, value_slot, frame, body, fr, key_values,
                    )?,
                }
            };
            key_values.pop();
            match flow {
                Flow::Continue | Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    // ------------------------------------------------------------
    // lvalues

    fn oosvar_path(&mut self, name: &str, indices: &[CExpr], fr: &mut Frame<'_>) -> Vec<String> {
        let mut path = vec![name.to_string()];
        for idx in indices {
            let v = self.eval(idx, fr);
            path.push(v.format(self.ofmt()));
        }
        path
    }

    fn read_lvalue(&mut self, lv: &CLvalue, fr: &mut Frame<'_>) -> Value {
        match lv {
            CLvalue::Field(name) => match self.rec.as_deref() {
                Some(rec) => match rec.get(name) {
                    Some(text) => Value::from_field(text),
                    None => Value::Absent,
                },
                None => Value::Error,
            },
            CLvalue::Oosvar { name, indices } => {
                let path = self.oosvar_path(name, indices, fr);
                match self.state.oosvars.get_path(&path) {
                    Some(OosValue::Scalar(v)) => v.clone(),
                    _ => Value::Absent,
                }
            }
            CLvalue::Local(slot) => fr.slots[*slot].clone(),
            CLvalue::FullRecord | CLvalue::FullOosvar => Value::Error,
        }
    }

    fn write_lvalue(&mut self, lv: &CLvalue, value: Value, fr: &mut Frame<'_>) {
        // assignments of absent are no-ops, so `$y = $nonesuch` does not
        // create an empty field
        if value.is_absent() {
            return;
        }
        match lv {
            CLvalue::Field(name) => {
                let text = value.format(self.ofmt());
                if let Some(rec) = self.rec.as_deref_mut() {
                    rec.put(name.clone(), text);
                } else {
                    log::debug!("ignoring $-assignment outside the record stream");
                }
            }
            CLvalue::Oosvar { name, indices } => {
                let path = self.oosvar_path(name, indices, fr);
                self.state.oosvars.put_path(&path, value);
            }
            CLvalue::Local(slot) => {
                let checked = if type_allows(fr.types[*slot], &value) {
                    value
                } else {
                    log::warn!(
                        "type mismatch assigning {} to {} local",
                        value.type_name(),
                        fr.types[*slot].as_ref()
                    );
                    Value::Error
                };
                fr.slots[*slot] = checked;
            }
            CLvalue::FullRecord | CLvalue::FullOosvar => {
                log::debug!("ignoring assignment to aggregate lvalue");
            }
        }
    }

    fn unset_lvalue(&mut self, lv: &CLvalue, fr: &mut Frame<'_>) {
        match lv {
            CLvalue::Field(name) => {
                if let Some(rec) = self.rec.as_deref_mut() {
                    rec.remove(name);
                }
            }
            CLvalue::FullRecord => {
                if let Some(rec) = self.rec.as_deref_mut() {
                    *rec = Record::new();
                }
            }
            CLvalue::Oosvar { name, indices } => {
                let path = self.oosvar_path(name, indices, fr);
                self.state.oosvars.unset_path(&path);
            }
            CLvalue::FullOosvar => self.state.oosvars.clear(),
            CLvalue::Local(slot) => fr.slots[*slot] = Value::Absent,
        }
    }

    // ------------------------------------------------------------
    // emit

    fn publish(
        &mut self,
        rec: Record,
        redirect: Option<&CRedirect>,
        fr: &mut Frame<'_>,
    ) -> Result<()> {
        match redirect {
            Some(r) => {
                let (mode, target) = self.eval_redirect(r, fr);
                self.state.redirects.write_record(mode, &target, &rec)
            }
            None => {
                self.state.emitted.push(rec);
                Ok(())
            }
        }
    }

    fn eval_redirect(&mut self, r: &CRedirect, fr: &mut Frame<'_>) -> (RedirectMode, String) {
        let target = self.eval(&r.target, fr).format(self.ofmt());
        (r.mode, target)
    }

    fn exec_emit(
        &mut self,
        style: EmitStyle,
        redirect: Option<&CRedirect>,
        target: &CEmitTarget,
        names: &[CExpr],
        fr: &mut Frame<'_>,
    ) -> Result<()> {
        let name_keys: Vec<String> = names
            .iter()
            .map(|e| {
                let v = self.eval(e, fr);
                v.format(self.ofmt())
            })
            .collect();

        let (node, prefix) = if target.all {
            (
                Some(OosValue::Map(self.state.oosvars.clone())),
                Vec::new(),
            )
        } else {
            let path = self.oosvar_path(&target.name, &target.indices, fr);
            (self.state.oosvars.get_path(&path).cloned(), path)
        };
        let Some(node) = node else {
            return Ok(());
        };

        let sep = self.writer_opts.oosvar_flatten_separator.clone();
        let ofmt = self.ofmt().to_string();
        let base_name = if target.all {
            String::new()
        } else {
            target.name.clone()
        };

        let mut records = Vec::new();
        build_emit_records(
            &node,
            style,
            &name_keys,
            &mut Vec::new(),
            &base_name,
            &prefix,
            &sep,
            &ofmt,
            &mut records,
        );
        for rec in records {
            self.publish(rec, redirect, fr)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // expressions

    fn eval(&mut self, e: &CExpr, fr: &mut Frame<'_>) -> Value {
        match e {
            CExpr::Literal(v) => v.clone(),
            CExpr::StrLiteral(s) => {
                if self.state.captures.is_empty() {
                    Value::from_field(s)
                } else {
                    Value::from_field_owned(substitute_captures(s, &self.state.captures))
                }
            }
            CExpr::Field(name) => match self.rec.as_deref() {
                Some(rec) => match rec.get(name) {
                    Some(text) => Value::from_field(text),
                    None => Value::Absent,
                },
                None => Value::Error,
            },
            CExpr::Oosvar { name, indices } => {
                let path = self.oosvar_path(name, indices, fr);
                match self.state.oosvars.get_path(&path) {
                    Some(OosValue::Scalar(v)) => v.clone(),
                    _ => Value::Absent,
                }
            }
            CExpr::Local(slot) => fr.slots[*slot].clone(),
            CExpr::ContextVar(cv) => self.context_var(*cv),
            CExpr::Unary(op, inner) => {
                let v = self.eval(inner, fr);
                match op {
                    UnaryOp::Plus => value::unary_plus(&v),
                    UnaryOp::Minus => value::negate(&v),
                    UnaryOp::Not => value::logical_not(&v),
                    UnaryOp::BitNot => value::bit_not(&v),
                }
            }
            CExpr::Binary(op, a, b) => {
                // && and || short-circuit around absent-tolerant logic
                let left = self.eval(a, fr);
                match (op, &left) {
                    (BinaryOp::And, Value::Bool(false)) => return Value::Bool(false),
                    (BinaryOp::Or, Value::Bool(true)) => return Value::Bool(true),
                    _ => {}
                }
                let right = self.eval(b, fr);
                self.binary(*op, left, right, fr)
            }
            CExpr::Ternary(cond, pass, fail) => {
                if self.eval(cond, fr).is_truthy() {
                    self.eval(pass, fr)
                } else {
                    self.eval(fail, fr)
                }
            }
            CExpr::Builtin(f, args) => {
                let args: Vec<Value> = args.iter().map(|a| self.eval(a, fr)).collect();
                builtins::eval(*f, args, self.ofmt())
            }
            CExpr::CallFunc { func, args } => {
                let args: Vec<Value> = args.iter().map(|a| self.eval(a, fr)).collect();
                match self.call_function(*func, args) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("function call failed: {e}");
                        Value::Error
                    }
                }
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, a: Value, b: Value, _fr: &mut Frame<'_>) -> Value {
        match op {
            BinaryOp::Add => value::add(&a, &b),
            BinaryOp::Sub => value::subtract(&a, &b),
            BinaryOp::Mul => value::multiply(&a, &b),
            BinaryOp::Div => value::divide(&a, &b),
            BinaryOp::IntDiv => value::int_divide(&a, &b),
            BinaryOp::Mod => value::modulo(&a, &b),
            BinaryOp::Pow => value::power(&a, &b),
            BinaryOp::Concat => value::concat(&a, &b, self.ofmt()),
            BinaryOp::And => value::logical_and(&a, &b),
            BinaryOp::Or => value::logical_or(&a, &b),
            BinaryOp::Xor => value::logical_xor(&a, &b),
            BinaryOp::Eq => value::eq(&a, &b),
            BinaryOp::Ne => value::ne(&a, &b),
            BinaryOp::Lt => value::lt(&a, &b),
            BinaryOp::Le => value::le(&a, &b),
            BinaryOp::Gt => value::gt(&a, &b),
            BinaryOp::Ge => value::ge(&a, &b),
            BinaryOp::BitAnd => value::bit_and(&a, &b),
            BinaryOp::BitOr => value::bit_or(&a, &b),
            BinaryOp::BitXor => value::bit_xor(&a, &b),
            BinaryOp::Shl => value::shift_left(&a, &b),
            BinaryOp::Shr => value::shift_right(&a, &b),
            BinaryOp::Match => self.regex_match(&a, &b, false),
            BinaryOp::NotMatch => self.regex_match(&a, &b, true),
        }
    }

    fn regex_match(&mut self, subject: &Value, pattern: &Value, negate: bool) -> Value {
        if subject.is_absent() || pattern.is_absent() {
            return Value::Absent;
        }
        if subject.is_error() || pattern.is_error() {
            return Value::Error;
        }
        let subject = subject.format(self.ofmt());
        let pattern = pattern.format(self.ofmt());
        let Ok(re) = Regex::new(&pattern) else {
            return Value::Error;
        };
        if negate {
            return Value::Bool(!re.is_match(&subject));
        }
        match re.captures(&subject) {
            Some(caps) => {
                self.state.captures = caps
                    .iter()
                    .map(|c| c.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                Value::Bool(true)
            }
            None => {
                self.state.captures.clear();
                Value::Bool(false)
            }
        }
    }

    fn context_var(&self, cv: ContextVar) -> Value {
        match cv {
            ContextVar::Nr => Value::Int(self.ctx.nr as i64),
            ContextVar::Fnr => Value::Int(self.ctx.fnr as i64),
            ContextVar::Nf => match self.rec.as_deref() {
                Some(rec) => Value::Int(rec.len() as i64),
                None => Value::Error,
            },
            ContextVar::Filename => Value::String(self.ctx.filename.clone()),
            ContextVar::Filenum => Value::Int(self.ctx.filenum as i64),
            ContextVar::MPi => Value::Float(std::f64::consts::PI),
            ContextVar::ME => Value::Float(std::f64::consts::E),
            ContextVar::Ips => Value::String(self.reader_opts.ips.clone()),
            ContextVar::Ifs => Value::String(self.reader_opts.ifs.clone()),
            ContextVar::Irs => Value::String(self.reader_opts.irs.clone()),
            ContextVar::Ops => Value::String(self.writer_opts.ops.clone()),
            ContextVar::Ofs => Value::String(self.writer_opts.ofs.clone()),
            ContextVar::Ors => Value::String(self.writer_opts.ors.clone()),
        }
    }

    fn call_function(&mut self, func: usize, args: Vec<Value>) -> Result<Value> {
        let program = self.program;
        let f = &program.funcs[func];
        let mut slots = vec![Value::Absent; f.stack_size];
        for ((slot, t), arg) in f.param_slots.iter().zip(&f.param_types).zip(args) {
            slots[*slot] = if type_allows(*t, &arg) { arg } else { Value::Error };
        }
        let mut frame = Frame {
            slots: &mut slots,
            types: &f.local_types,
        };
        let mut inner = Machine {
            program,
            ctx: self.ctx,
            reader_opts: self.reader_opts,
            writer_opts: self.writer_opts,
            state: &mut *self.state,
            rec: self.rec.as_deref_mut(),
        };
        match inner.exec_block(&f.body, &mut frame)? {
            Flow::Return(v) => Ok(v),
            _ => Ok(Value::Absent),
        }
    }
}

fn type_allows(t: TypeDecl, v: &Value) -> bool {
    if v.is_absent() || v.is_error() {
        return true;
    }
    match t {
        TypeDecl::Var => true,
        TypeDecl::Str => matches!(v, Value::String(_) | Value::Empty),
        TypeDecl::Num => v.is_numeric(),
        TypeDecl::Int => matches!(v.numeric(), Some(value::Num::Int(_))),
        TypeDecl::Float => v.is_numeric(),
        TypeDecl::Bool => {
            matches!(v, Value::Bool(_))
                || matches!(v, Value::String(s) if s == "true" || s == "false")
        }
    }
}

/// `\1`..`\9` in string literals refer to the live match's capture groups.
fn substitute_captures(s: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                if (1..=9).contains(&d) {
                    chars.next();
                    if let Some(group) = captures.get(d as usize) {
                        out.push_str(group);
                    }
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Synthesize the records for an emit statement.
#[allow(clippy::too_many_arguments)]
fn build_emit_records(
    node: &OosValue,
    style: EmitStyle,
    name_keys: &[String],
    labels: &mut Vec<(String, String)>, // (record key, level label)
    base_name: &str,
    base_path: &[String],
    sep: &str,
    ofmt: &str,
    out: &mut Vec<Record>,
) {
    if let Some((first_key, rest_keys)) = name_keys.split_first() {
        if let OosValue::Map(m) = node {
            for (level_label, sub) in m.iter() {
                labels.push((first_key.clone(), level_label.clone()));
                build_emit_records(
                    sub, style, rest_keys, labels, base_name, base_path, sep, ofmt, out,
                );
                labels.pop();
            }
        }
        return;
    }

    let mut rec = Record::new();
    for (key, label) in labels.iter() {
        rec.put(key.clone(), label.clone());
    }
    match node {
        OosValue::Scalar(v) => {
            let key = match style {
                EmitStyle::Emit => {
                    if base_name.is_empty() {
                        "value".to_string()
                    } else {
                        base_name.to_string()
                    }
                }
                EmitStyle::EmitP => base_path.join(sep),
            };
            rec.put(key, v.format(ofmt));
        }
        OosValue::Map(m) => {
            if m.is_empty() {
                return;
            }
            for (path, leaf) in m.flatten() {
                // emitp concatenates the unslotted index labels onto the
                // base path; levels consumed by emit names are already
                // slotted as leading pairs and stay out of the key
                let key = match style {
                    EmitStyle::Emit => path.join(sep),
                    EmitStyle::EmitP => {
                        let mut full: Vec<String> = base_path.to_vec();
                        if full.is_empty() && !base_name.is_empty() {
                            full.push(base_name.to_string());
                        }
                        full.extend(path);
                        full.join(sep)
                    }
                };
                rec.put(key, leaf.format(ofmt));
            }
        }
    }
    out.push(rec);
}
