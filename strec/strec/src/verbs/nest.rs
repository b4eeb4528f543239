//! `nest`: explode a delimited field across records or across new fields,
//! as bare values or as key-value pairs; or the inverse implode of values
//! across records.
//!
//! Explode variants stream; implode buffers groups of records identical
//! except for the nested field and flushes at end of stream.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

#[derive(Clone, Copy, PartialEq)]
enum Operation {
    ExplodeValuesAcrossRecords,
    ExplodeValuesAcrossFields,
    ExplodePairsAcrossRecords,
    ExplodePairsAcrossFields,
    ImplodeValuesAcrossRecords,
}

pub struct Nest {
    op: Operation,
    field: String,
    nested_fs: String,
    nested_ps: String,
    // implode state: group key -> (template record, collected values)
    groups: IndexMap<Vec<(String, String)>, (Record, Vec<String>)>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut explode = None;
    let mut pairs = None;
    let mut across_records = None;
    let mut field = None;
    let mut nested_fs = ";".to_string();
    let mut nested_ps = ":".to_string();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "--explode" => explode = Some(true),
            "--implode" => explode = Some(false),
            "--values" => pairs = Some(false),
            "--pairs" => pairs = Some(true),
            "--across-records" => across_records = Some(true),
            "--across-fields" => across_records = Some(false),
            "-f" => field = Some(args.value("-f")?),
            "--nested-fs" => nested_fs = crate::separators::resolve(&args.value("--nested-fs")?),
            "--nested-ps" => nested_ps = crate::separators::resolve(&args.value("--nested-ps")?),
            other => return Err(args.unknown_flag(other)),
        }
    }
    let field = field.ok_or_else(|| Error::usage("nest: -f is required"))?;
    let op = match (explode, pairs, across_records) {
        (Some(true), Some(false) | None, Some(true) | None) => {
            Operation::ExplodeValuesAcrossRecords
        }
        (Some(true), Some(false) | None, Some(false)) => Operation::ExplodeValuesAcrossFields,
        (Some(true), Some(true), Some(true) | None) => Operation::ExplodePairsAcrossRecords,
        (Some(true), Some(true), Some(false)) => Operation::ExplodePairsAcrossFields,
        (Some(false), Some(true), _) => {
            return Err(Error::usage("nest: --implode supports --values only"))
        }
        (Some(false), _, _) => Operation::ImplodeValuesAcrossRecords,
        (None, _, _) => return Err(Error::usage("nest: --explode or --implode is required")),
    };
    Ok(Box::new(Nest {
        op,
        field,
        nested_fs,
        nested_ps,
        groups: IndexMap::new(),
    }))
}

impl Nest {
    /// Rebuild `rec` with `field` replaced by the given pairs, in place.
    fn with_replacement(rec: &Record, field: &str, replacement: &[(String, String)]) -> Record {
        let mut rebuilt = Record::new();
        for (k, v) in rec.iter() {
            if k == field {
                for (rk, rv) in replacement {
                    rebuilt.put(rk.clone(), rv.clone());
                }
            } else {
                rebuilt.put(k, v);
            }
        }
        rebuilt
    }
}

impl Verb for Nest {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let Some(joined) = rec.get(&self.field).map(|v| v.to_string()) else {
                    out.push(StreamItem::Record(rec));
                    return Ok(());
                };
                match self.op {
                    Operation::ExplodeValuesAcrossRecords => {
                        for piece in joined.split(self.nested_fs.as_str()) {
                            let mut clone = rec.clone();
                            clone.put(self.field.clone(), piece);
                            out.push(StreamItem::Record(clone));
                        }
                    }
                    Operation::ExplodeValuesAcrossFields => {
                        let replacement: Vec<(String, String)> = joined
                            .split(self.nested_fs.as_str())
                            .enumerate()
                            .map(|(i, piece)| {
                                (format!("{}_{}", self.field, i + 1), piece.to_string())
                            })
                            .collect();
                        out.push(StreamItem::Record(Self::with_replacement(
                            &rec,
                            &self.field,
                            &replacement,
                        )));
                    }
                    Operation::ExplodePairsAcrossRecords => {
                        for piece in joined.split(self.nested_fs.as_str()) {
                            let (k, v) =
                                piece.split_once(self.nested_ps.as_str()).unwrap_or((piece, ""));
                            let replacement = vec![(k.to_string(), v.to_string())];
                            out.push(StreamItem::Record(Self::with_replacement(
                                &rec,
                                &self.field,
                                &replacement,
                            )));
                        }
                    }
                    Operation::ExplodePairsAcrossFields => {
                        let replacement: Vec<(String, String)> = joined
                            .split(self.nested_fs.as_str())
                            .map(|piece| {
                                let (k, v) = piece
                                    .split_once(self.nested_ps.as_str())
                                    .unwrap_or((piece, ""));
                                (k.to_string(), v.to_string())
                            })
                            .collect();
                        out.push(StreamItem::Record(Self::with_replacement(
                            &rec,
                            &self.field,
                            &replacement,
                        )));
                    }
                    Operation::ImplodeValuesAcrossRecords => {
                        let key: Vec<(String, String)> = rec
                            .iter()
                            .filter(|(k, _)| *k != self.field.as_str())
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect();
                        let entry = self
                            .groups
                            .entry(key)
                            .or_insert_with(|| (rec.clone(), Vec::new()));
                        entry.1.push(joined);
                    }
                }
            }
            StreamItem::End => {
                for (_, (template, values)) in self.groups.drain(..) {
                    let mut rec = template;
                    rec.put(self.field.clone(), values.join(&self.nested_fs));
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    fn run(argv: Vec<String>, recs: Vec<Record>) -> Vec<Record> {
        let mut verb = make_verb("nest", argv, &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for rec in recs {
            verb.process(StreamItem::Record(rec), &ctx, &mut out).unwrap();
        }
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        out.into_iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r),
                StreamItem::End => None,
            })
            .collect()
    }

    #[test]
    fn test_explode_values_across_records() {
        let out = run(
            vec![
                "--explode".into(),
                "--values".into(),
                "--across-records".into(),
                "-f".into(),
                "x".into(),
            ],
            vec![Record::from_pairs([("x", "a;b;c"), ("y", "1")])],
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].get("x"), Some("b"));
        assert_eq!(out[1].get("y"), Some("1"));
    }

    #[test]
    fn test_explode_values_across_fields() {
        let out = run(
            vec![
                "--explode".into(),
                "--values".into(),
                "--across-fields".into(),
                "-f".into(),
                "x".into(),
            ],
            vec![Record::from_pairs([("x", "a;b"), ("y", "1")])],
        );
        assert_eq!(out[0].key_list(), vec!["x_1", "x_2", "y"]);
    }

    #[test]
    fn test_explode_pairs_across_records() {
        let out = run(
            vec![
                "--explode".into(),
                "--pairs".into(),
                "--across-records".into(),
                "-f".into(),
                "x".into(),
            ],
            vec![Record::from_pairs([("x", "a:1;b:2")])],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("a"), Some("1"));
        assert_eq!(out[1].get("b"), Some("2"));
    }

    #[test]
    fn test_implode_inverts_explode() {
        let out = run(
            vec![
                "--implode".into(),
                "--values".into(),
                "--across-records".into(),
                "-f".into(),
                "x".into(),
            ],
            vec![
                Record::from_pairs([("x", "a"), ("y", "1")]),
                Record::from_pairs([("x", "b"), ("y", "1")]),
                Record::from_pairs([("x", "c"), ("y", "2")]),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("x"), Some("a;b"));
        assert_eq!(out[1].get("x"), Some("c"));
    }
}
