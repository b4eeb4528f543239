//! `top`: keep the `-n` largest (or `--min` smallest) numeric values per
//! value field per group; emit at end of stream as `top_idx`-indexed
//! records. With `-a` the whole winning records are emitted instead (single
//! value field).

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;
use crate::value::{infer_number, Num};

struct Keeper {
    /// sorted best-first; at most `n` entries
    entries: Vec<(f64, Record)>,
}

pub struct Top {
    fields: Vec<String>,
    group_by: Vec<String>,
    n: usize,
    want_min: bool,
    full_records: bool,
    // per group, per value-field keepers
    groups: IndexMap<Vec<String>, Vec<Keeper>>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut fields = Vec::new();
    let mut group_by = Vec::new();
    let mut n = 1;
    let mut want_min = false;
    let mut full_records = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => fields = args.list_value("-f")?,
            "-g" => group_by = args.list_value("-g")?,
            "-n" => n = args.int_value("-n")?.max(1) as usize,
            "--min" => want_min = true,
            "--max" => want_min = false,
            "-a" => full_records = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if fields.is_empty() {
        return Err(Error::usage("top: -f is required"));
    }
    if full_records && fields.len() != 1 {
        return Err(Error::usage("top: -a takes exactly one -f field"));
    }
    Ok(Box::new(Top {
        fields,
        group_by,
        n,
        want_min,
        full_records,
        groups: IndexMap::new(),
    }))
}

impl Verb for Top {
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
                        None => return Ok(()),
                    }
                }
                let nfields = self.fields.len();
                let want_min = self.want_min;
                let better = |a: f64, b: f64| if want_min { a < b } else { a > b };
                let keepers = self.groups.entry(key).or_insert_with(|| {
                    (0..nfields)
                        .map(|_| Keeper {
                            entries: Vec::new(),
                        })
                        .collect()
                });
                for (fi, field) in self.fields.iter().enumerate() {
                    let Some(x) = rec.get(field).and_then(infer_number) else {
                        continue;
                    };
                    let x = match x {
                        Num::Int(i) => i as f64,
                        Num::Float(f) => f,
                    };
                    let keeper = &mut keepers[fi];
                    let pos = keeper
                        .entries
                        .iter()
                        .position(|(y, _)| better(x, *y))
                        .unwrap_or(keeper.entries.len());
                    if pos < self.n {
                        keeper.entries.insert(pos, (x, rec.clone()));
                        keeper.entries.truncate(self.n);
                    }
                }
            }
            StreamItem::End => {
                for (key, keepers) in self.groups.drain(..) {
                    if self.full_records {
                        for (_, rec) in &keepers[0].entries {
                            out.push(StreamItem::Record(rec.clone()));
                        }
                        continue;
                    }
                    for idx in 0..self.n {
                        let any = keepers.iter().any(|k| idx < k.entries.len());
                        if !any {
                            break;
                        }
                        let mut rec = Record::new();
                        for (f, v) in self.group_by.iter().zip(&key) {
                            rec.put(f.clone(), v.clone());
                        }
                        rec.put("top_idx", (idx + 1).to_string());
                        for (fi, field) in self.fields.iter().enumerate() {
                            if let Some((x, _)) = keepers[fi].entries.get(idx) {
                                rec.put(format!("{field}_top"), fmt(*x));
                            }
                        }
                        out.push(StreamItem::Record(rec));
                    }
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

fn fmt(x: f64) -> String {
    if x == x.floor() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    fn run(argv: Vec<String>, values: &[(&str, &str)]) -> Vec<Record> {
        let mut verb = make_verb("top", argv, &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for (g, v) in values {
            verb.process(
                StreamItem::Record(Record::from_pairs([("g", *g), ("x", *v)])),
                &ctx,
                &mut out,
            )
            .unwrap();
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
    fn test_top_two_per_group() {
        let out = run(
            vec![
                "-f".into(),
                "x".into(),
                "-g".into(),
                "g".into(),
                "-n".into(),
                "2".into(),
            ],
            &[("a", "5"), ("a", "9"), ("a", "7"), ("b", "1")],
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].get("g"), Some("a"));
        assert_eq!(out[0].get("top_idx"), Some("1"));
        assert_eq!(out[0].get("x_top"), Some("9"));
        assert_eq!(out[1].get("x_top"), Some("7"));
        assert_eq!(out[2].get("g"), Some("b"));
    }

    #[test]
    fn test_full_records_min() {
        let out = run(
            vec!["-f".into(), "x".into(), "-a".into(), "--min".into()],
            &[("a", "5"), ("a", "2"), ("a", "7")],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("x"), Some("2"));
    }
}
