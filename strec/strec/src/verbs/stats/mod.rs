//! `stats1`: group-by-then-accumulate over the listed value fields. At end
//! of stream each group emits one record: the group key pairs first, then
//! `{field}_{accumulator}` outputs, groups in first-seen order regardless
//! of which accumulators were requested.

pub mod acc;

use indexmap::IndexMap;

use self::acc::{parse_acc_list, AccKind, AccSet};
use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Stats1 {
    accs: Vec<AccKind>,
    value_fields: Vec<String>,
    group_by: Vec<String>,
    ofmt: String,
    // per group: one AccSet per value field
    groups: IndexMap<Vec<String>, Vec<AccSet>>,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut accs = Vec::new();
    let mut value_fields = Vec::new();
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-a" => accs = parse_acc_list(&args.list_value("-a")?)?,
            "-f" => value_fields = args.list_value("-f")?,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if accs.is_empty() || value_fields.is_empty() {
        return Err(Error::usage("stats1: -a and -f are required"));
    }
    Ok(Box::new(Stats1 {
        accs,
        value_fields,
        group_by,
        ofmt: opts.writer.ofmt.clone(),
        groups: IndexMap::new(),
    }))
}

impl Verb for Stats1 {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let mut key = Vec::with_capacity(self.group_by.len());
                for f in &self.group_by {
                    match rec.get(f) {
                        Some(v) => key.push(v.to_string()),
                        None => return Ok(()), // missing group-by field: skip
                    }
                }
                let accs = &self.accs;
                let nfields = self.value_fields.len();
                let sets = self
                    .groups
                    .entry(key)
                    .or_insert_with(|| (0..nfields).map(|_| AccSet::new(accs)).collect());
                for (fi, field) in self.value_fields.iter().enumerate() {
                    if let Some(text) = rec.get(field) {
                        sets[fi].ingest(text);
                    }
                }
            }
            StreamItem::End => {
                for (key, mut sets) in self.groups.drain(..) {
                    let mut rec = Record::new();
                    for (f, v) in self.group_by.iter().zip(key) {
                        rec.put(f.clone(), v);
                    }
                    for (fi, field) in self.value_fields.iter().enumerate() {
                        for kind in &self.accs {
                            let value = sets[fi].emit(kind);
                            rec.put(
                                format!("{field}_{}", kind.output_name()),
                                value.format(&self.ofmt),
                            );
                        }
                    }
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
