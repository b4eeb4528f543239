//! `uniq` and `count-distinct`: group by the listed fields, count
//! repetitions, and at end of stream emit one record per distinct group in
//! first-seen order. `-c` adds the count column, `-n` emits only the number
//! of distinct groups. `count-distinct -f` is `uniq -g -c`.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Uniq {
    group_by: Vec<String>,
    show_counts: bool,
    distinct_count_only: bool,
    counts: IndexMap<Vec<String>, u64>,
}

pub fn parse_uniq(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut group_by = Vec::new();
    let mut show_counts = false;
    let mut distinct_count_only = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            // -f is a synonym for -g here
            "-g" | "-f" => group_by = args.list_value(&flag)?,
            "-c" => show_counts = true,
            "-n" => distinct_count_only = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if group_by.is_empty() {
        return Err(Error::usage("uniq: -g is required"));
    }
    Ok(Box::new(Uniq {
        group_by,
        show_counts,
        distinct_count_only,
        counts: IndexMap::new(),
    }))
}

pub fn parse_count_distinct(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut group_by = Vec::new();
    let mut distinct_count_only = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => group_by = args.list_value("-f")?,
            "-n" => distinct_count_only = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if group_by.is_empty() {
        return Err(Error::usage("count-distinct: -f is required"));
    }
    Ok(Box::new(Uniq {
        group_by,
        show_counts: true,
        distinct_count_only,
        counts: IndexMap::new(),
    }))
}

impl Verb for Uniq {
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
                *self.counts.entry(key).or_insert(0) += 1;
            }
            StreamItem::End => {
                if self.distinct_count_only {
                    let mut rec = Record::new();
                    rec.put("count", self.counts.len().to_string());
                    out.push(StreamItem::Record(rec));
                } else {
                    for (key, count) in self.counts.drain(..) {
                        let mut rec = Record::new();
                        for (f, v) in self.group_by.iter().zip(key) {
                            rec.put(f.clone(), v);
                        }
                        if self.show_counts {
                            rec.put("count", count.to_string());
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

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    fn run(argv: Vec<String>, values: &[&str]) -> Vec<Record> {
        let mut verb = make_verb("uniq", argv, &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for v in values {
            verb.process(
                StreamItem::Record(Record::from_pairs([("a", *v)])),
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
    fn test_uniq_with_counts() {
        let out = run(
            vec!["-g".into(), "a".into(), "-c".into()],
            &["1", "2", "1", "1"],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("a"), Some("1"));
        assert_eq!(out[0].get("count"), Some("3"));
        assert_eq!(out[1].get("a"), Some("2"));
        assert_eq!(out[1].get("count"), Some("1"));
    }

    #[test]
    fn test_uniq_is_idempotent() {
        let out = run(vec!["-g".into(), "a".into()], &["1", "2", "1"]);
        let values: Vec<&str> = out.iter().map(|r| r.get("a").unwrap()).collect();
        assert_eq!(values, vec!["1", "2"]);
        // running again over its own output changes nothing
        let mut verb = make_verb("uniq", vec!["-g".into(), "a".into()], &Options::default())
            .unwrap();
        let ctx = Context::default();
        let mut out2 = Vec::new();
        for rec in &out {
            verb.process(StreamItem::Record(rec.clone()), &ctx, &mut out2)
                .unwrap();
        }
        verb.process(StreamItem::End, &ctx, &mut out2).unwrap();
        let values2: Vec<String> = out2
            .iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r.get("a").unwrap().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(values2, vec!["1", "2"]);
    }

    #[test]
    fn test_distinct_count_only() {
        let out = run(vec!["-g".into(), "a".into(), "-n".into()], &["1", "2", "1"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("count"), Some("2"));
    }
}
