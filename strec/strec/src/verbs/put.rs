//! `put` and `filter`: run a DSL program against the record stream.
//!
//! `put` mutates records and may publish extra ones via emit; `-q`
//! suppresses the stream records themselves. `filter` runs the same
//! machinery and gates each record on the program's final boolean verdict
//! (`-x` inverts it). Emits during begin/end blocks land downstream of the
//! verb, before the first record and after the last respectively.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::dsl::{self, DslState, Program};
use crate::errors::{Error, Result};
use crate::options::{Options, ReaderOpts, WriterOpts};
use crate::pipeline::StreamItem;

pub struct Put {
    program: Program,
    state: DslState,
    reader_opts: ReaderOpts,
    writer_opts: WriterOpts,
    suppress: bool,
    is_filter: bool,
    invert: bool,
    began: bool,
}

pub fn parse_put(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    parse_common(args, opts, false)
}

pub fn parse_filter(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    parse_common(args, opts, true)
}

fn parse_common(args: &mut VerbArgs, opts: &Options, is_filter: bool) -> Result<Box<dyn Verb>> {
    let mut suppress = false;
    let mut invert = false;
    let mut source: Option<String> = None;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-q" => suppress = true,
            "-x" if is_filter => invert = true,
            "-e" => source = Some(args.value("-e")?),
            "-f" => {
                let path = args.value("-f")?;
                source = Some(std::fs::read_to_string(&path).map_err(|e| {
                    Error::Io(std::io::Error::new(e.kind(), format!("{path}: {e}")))
                })?);
            }
            other => return Err(args.unknown_flag(other)),
        }
    }
    let source = match source {
        Some(s) => s,
        None => args.positional("expression")?,
    };
    let program = dsl::compile(&source).map_err(|errors| {
        let rendered: Vec<String> = errors.0.iter().map(|e| e.display(&source)).collect();
        Error::parse(format!(
            "{}: {}",
            args.verb(),
            rendered.join("; ")
        ))
    })?;
    Ok(Box::new(Put {
        program,
        state: DslState::new(opts.writer.clone()),
        reader_opts: opts.reader.clone(),
        writer_opts: opts.writer.clone(),
        suppress,
        is_filter,
        invert,
        began: false,
    }))
}

impl Put {
    fn ensure_begin(&mut self, ctx: &Context, out: &mut Vec<StreamItem>) -> Result<()> {
        if self.began {
            return Ok(());
        }
        self.began = true;
        dsl::exec_phase(
            &self.program,
            &self.program.begin,
            ctx,
            &self.reader_opts,
            &self.writer_opts,
            &mut self.state,
            None,
        )?;
        self.drain_emitted(out);
        Ok(())
    }

    fn drain_emitted(&mut self, out: &mut Vec<StreamItem>) {
        for rec in self.state.emitted.drain(..) {
            out.push(StreamItem::Record(rec));
        }
    }
}

impl Verb for Put {
    fn process(
        &mut self,
        item: StreamItem,
        ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                self.ensure_begin(ctx, out)?;
                self.state.filter_result = None;
                dsl::exec_phase(
                    &self.program,
                    &self.program.main,
                    ctx,
                    &self.reader_opts,
                    &self.writer_opts,
                    &mut self.state,
                    Some(&mut rec),
                )?;
                self.drain_emitted(out);
                let mut keep = if self.is_filter {
                    self.state.filter_result.unwrap_or(true)
                } else {
                    self.state.filter_result != Some(false)
                };
                if self.invert {
                    keep = !keep;
                }
                if keep && !self.suppress {
                    out.push(StreamItem::Record(rec));
                }
            }
            StreamItem::End => {
                self.ensure_begin(ctx, out)?;
                dsl::exec_phase(
                    &self.program,
                    &self.program.end,
                    ctx,
                    &self.reader_opts,
                    &self.writer_opts,
                    &mut self.state,
                    None,
                )?;
                self.drain_emitted(out);
                self.state.redirects.close_all()?;
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
