//! `sort`: buffer-all stable sort over a chain of keys, each lexical or
//! numeric, ascending or descending. Records tie on every key stay in input
//! order; records missing a sort key order after those that have it.

use std::cmp::Ordering;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;
use crate::value::{infer_number, Num};

#[derive(Clone, Copy)]
enum KeyKind {
    Lexical,
    Numeric,
}

struct SortKey {
    field: String,
    kind: KeyKind,
    descending: bool,
}

pub struct Sort {
    keys: Vec<SortKey>,
    buffer: Vec<Record>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut keys = Vec::new();
    while let Some(flag) = args.next_flag() {
        let (kind, descending) = match flag.as_str() {
            "-f" => (KeyKind::Lexical, false),
            "-r" => (KeyKind::Lexical, true),
            "-nf" => (KeyKind::Numeric, false),
            "-nr" => (KeyKind::Numeric, true),
            other => return Err(args.unknown_flag(other)),
        };
        for field in args.list_value(&flag)? {
            keys.push(SortKey {
                field,
                kind,
                descending,
            });
        }
    }
    if keys.is_empty() {
        return Err(Error::usage("sort: at least one of -f/-r/-nf/-nr is required"));
    }
    Ok(Box::new(Sort {
        keys,
        buffer: Vec::new(),
    }))
}

fn numeric_of(text: &str) -> Option<f64> {
    infer_number(text).map(|n| match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    })
}

fn compare_on(key: &SortKey, a: &Record, b: &Record) -> Ordering {
    let av = a.get(&key.field);
    let bv = b.get(&key.field);
    let ord = match (av, bv) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(x), Some(y)) => match key.kind {
            KeyKind::Lexical => x.cmp(y),
            KeyKind::Numeric => match (numeric_of(x), numeric_of(y)) {
                (Some(nx), Some(ny)) => nx.partial_cmp(&ny).unwrap_or(Ordering::Equal),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            },
        },
    };
    if key.descending {
        ord.reverse()
    } else {
        ord
    }
}

impl Verb for Sort {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => self.buffer.push(rec),
            StreamItem::End => {
                let keys = std::mem::take(&mut self.keys);
                self.buffer.sort_by(|a, b| {
                    for key in &keys {
                        let ord = compare_on(key, a, b);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                });
                self.keys = keys;
                for rec in self.buffer.drain(..) {
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
