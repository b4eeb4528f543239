//! `bar`: replace numeric fields with ASCII bars scaled between `--lo` and
//! `--hi`. Out-of-range values are marked at the clipped end.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::value::{infer_number, Num};

const DEFAULT_WIDTH: usize = 40;

pub struct Bar {
    fields: Vec<String>,
    lo: f64,
    hi: f64,
    width: usize,
    fill: char,
    blank: char,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut fields = Vec::new();
    let mut lo = 0.0;
    let mut hi = 100.0;
    let mut width = DEFAULT_WIDTH;
    let mut fill = '*';
    let mut blank = '.';
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => fields = args.list_value("-f")?,
            "--lo" => lo = args.float_value("--lo")?,
            "--hi" => hi = args.float_value("--hi")?,
            "-w" => width = args.int_value("-w")?.max(1) as usize,
            "-c" => fill = args.value("-c")?.chars().next().unwrap_or('*'),
            "-x" => blank = args.value("-x")?.chars().next().unwrap_or('.'),
            other => return Err(args.unknown_flag(other)),
        }
    }
    if fields.is_empty() {
        return Err(Error::usage("bar: -f is required"));
    }
    if hi <= lo {
        return Err(Error::usage("bar: --hi must exceed --lo"));
    }
    Ok(Box::new(Bar {
        fields,
        lo,
        hi,
        width,
        fill,
        blank,
    }))
}

impl Bar {
    fn render(&self, x: f64) -> String {
        let frac = (x - self.lo) / (self.hi - self.lo);
        let clipped = frac.clamp(0.0, 1.0);
        let n = (clipped * self.width as f64).round() as usize;
        let mut s = String::with_capacity(self.width + 2);
        if frac < 0.0 {
            s.push('[');
        }
        for i in 0..self.width {
            s.push(if i < n { self.fill } else { self.blank });
        }
        if frac > 1.0 {
            s.push(']');
        }
        s
    }
}

impl Verb for Bar {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                for field in &self.fields {
                    let Some(text) = rec.get(field) else { continue };
                    let x = match infer_number(text) {
                        Some(Num::Int(i)) => i as f64,
                        Some(Num::Float(f)) => f,
                        None => continue,
                    };
                    rec.put(field.clone(), self.render(x));
                }
                out.push(StreamItem::Record(rec));
            }
            end => out.push(end),
        }
        Ok(())
    }
}
