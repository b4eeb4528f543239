//! `reshape`: wide-to-long (`-i`/`-r` input fields, `-o key,value` output
//! names) streams one record per reshaped field; long-to-wide (`-s
//! key,value`) buffers by the remaining fields and spreads at end of
//! stream.

use indexmap::IndexMap;
use regex::Regex;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

enum Mode {
    WideToLong {
        fields: Vec<String>,
        patterns: Vec<Regex>,
        key_name: String,
        value_name: String,
    },
    LongToWide {
        key_field: String,
        value_field: String,
        groups: IndexMap<Vec<(String, String)>, Record>,
    },
}

pub struct Reshape {
    mode: Mode,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut input_fields = Vec::new();
    let mut patterns = Vec::new();
    let mut output_names = Vec::new();
    let mut spread = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-i" => input_fields = args.list_value("-i")?,
            "-r" => {
                for p in args.list_value("-r")? {
                    patterns.push(Regex::new(&p).map_err(|e| {
                        Error::usage(format!("reshape: bad regular expression: {e}"))
                    })?);
                }
            }
            "-o" => output_names = args.list_value("-o")?,
            "-s" => spread = args.list_value("-s")?,
            other => return Err(args.unknown_flag(other)),
        }
    }

    let mode = if !spread.is_empty() {
        if spread.len() != 2 {
            return Err(Error::usage("reshape: -s takes key,value field names"));
        }
        Mode::LongToWide {
            key_field: spread[0].clone(),
            value_field: spread[1].clone(),
            groups: IndexMap::new(),
        }
    } else {
        if input_fields.is_empty() && patterns.is_empty() {
            return Err(Error::usage("reshape: one of -i/-r/-s is required"));
        }
        if output_names.len() != 2 {
            return Err(Error::usage("reshape: -o takes key,value output names"));
        }
        Mode::WideToLong {
            fields: input_fields,
            patterns,
            key_name: output_names[0].clone(),
            value_name: output_names[1].clone(),
        }
    };
    Ok(Box::new(Reshape { mode }))
}

impl Verb for Reshape {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match (&mut self.mode, item) {
            (
                Mode::WideToLong {
                    fields,
                    patterns,
                    key_name,
                    value_name,
                },
                StreamItem::Record(rec),
            ) => {
                let selected: Vec<String> = rec
                    .keys()
                    .filter(|k| {
                        fields.iter().any(|f| f == k)
                            || patterns.iter().any(|p| p.is_match(k))
                    })
                    .map(|k| k.to_string())
                    .collect();
                if selected.is_empty() {
                    out.push(StreamItem::Record(rec));
                    return Ok(());
                }
                for sel in &selected {
                    let mut long = Record::new();
                    for (k, v) in rec.iter() {
                        if !selected.iter().any(|s| s == k) {
                            long.put(k, v);
                        }
                    }
                    long.put(key_name.clone(), sel.clone());
                    long.put(value_name.clone(), rec.get(sel).unwrap_or(""));
                    out.push(StreamItem::Record(long));
                }
            }
            (
                Mode::LongToWide {
                    key_field,
                    value_field,
                    groups,
                },
                StreamItem::Record(rec),
            ) => {
                let (Some(key), Some(value)) = (rec.get(key_field), rec.get(value_field)) else {
                    out.push(StreamItem::Record(rec));
                    return Ok(());
                };
                let key = key.to_string();
                let value = value.to_string();
                let others: Vec<(String, String)> = rec
                    .iter()
                    .filter(|(k, _)| *k != key_field.as_str() && *k != value_field.as_str())
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let wide = groups
                    .entry(others.clone())
                    .or_insert_with(|| Record::from_pairs(others));
                wide.put(key, value);
            }
            (Mode::WideToLong { .. }, StreamItem::End) => out.push(StreamItem::End),
            (Mode::LongToWide { groups, .. }, StreamItem::End) => {
                for (_, rec) in groups.drain(..) {
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
