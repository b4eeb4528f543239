//! The ordering verbs that buffer by key:
//! - `group-by`: gather records into contiguous runs by the values of the
//!   listed fields (records missing any listed field are dropped);
//! - `group-like`: gather records into contiguous runs by key-set;
//! - `regularize`: reorder each record's keys to the first-seen order for
//!   its key-set, streaming.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct GroupBy {
    fields: Vec<String>,
    groups: IndexMap<Vec<String>, Vec<Record>>,
}

pub fn parse_group_by(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    let fields: Vec<String> = args
        .positional("comma-separated field list")?
        .split(',')
        .map(|s| s.to_string())
        .collect();
    if fields.is_empty() {
        return Err(Error::usage("group-by: field list is required"));
    }
    Ok(Box::new(GroupBy {
        fields,
        groups: IndexMap::new(),
    }))
}

impl Verb for GroupBy {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let mut key = Vec::with_capacity(self.fields.len());
                for f in &self.fields {
                    match rec.get(f) {
                        Some(v) => key.push(v.to_string()),
                        None => return Ok(()), // missing group-by field: skip
                    }
                }
                self.groups.entry(key).or_default().push(rec);
            }
            StreamItem::End => {
                for (_, group) in self.groups.drain(..) {
                    for rec in group {
                        out.push(StreamItem::Record(rec));
                    }
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

pub struct GroupLike {
    groups: IndexMap<Vec<String>, Vec<Record>>,
}

pub fn parse_group_like(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(GroupLike {
        groups: IndexMap::new(),
    }))
}

impl Verb for GroupLike {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                self.groups.entry(rec.key_list()).or_default().push(rec);
            }
            StreamItem::End => {
                for (_, group) in self.groups.drain(..) {
                    for rec in group {
                        out.push(StreamItem::Record(rec));
                    }
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

pub struct Regularize {
    /// sorted key list -> first-seen field order
    orders: IndexMap<Vec<String>, Vec<String>>,
}

pub fn parse_regularize(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(Regularize {
        orders: IndexMap::new(),
    }))
}

impl Verb for Regularize {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                let mut sorted = rec.key_list();
                sorted.sort();
                match self.orders.get(&sorted) {
                    Some(order) => rec.reorder_to(order),
                    None => {
                        self.orders.insert(sorted, rec.key_list());
                    }
                }
                out.push(StreamItem::Record(rec));
            }
            end => out.push(end),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    fn run(verb: &mut dyn Verb, recs: Vec<Record>) -> Vec<Record> {
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
    fn test_group_by_first_seen_order() {
        let mut verb = make_verb("group-by", vec!["g".into()], &Options::default()).unwrap();
        let out = run(
            verb.as_mut(),
            vec![
                Record::from_pairs([("g", "x"), ("i", "1")]),
                Record::from_pairs([("g", "y"), ("i", "2")]),
                Record::from_pairs([("g", "x"), ("i", "3")]),
                Record::from_pairs([("i", "4")]), // no group field: dropped
            ],
        );
        let ids: Vec<&str> = out.iter().map(|r| r.get("i").unwrap()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_group_like() {
        let mut verb = make_verb("group-like", vec![], &Options::default()).unwrap();
        let out = run(
            verb.as_mut(),
            vec![
                Record::from_pairs([("a", "1")]),
                Record::from_pairs([("b", "2")]),
                Record::from_pairs([("a", "3")]),
            ],
        );
        let keys: Vec<Vec<String>> = out.iter().map(|r| r.key_list()).collect();
        assert_eq!(keys, vec![vec!["a"], vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_regularize() {
        let mut verb = make_verb("regularize", vec![], &Options::default()).unwrap();
        let out = run(
            verb.as_mut(),
            vec![
                Record::from_pairs([("a", "1"), ("b", "2")]),
                Record::from_pairs([("b", "4"), ("a", "3")]),
            ],
        );
        assert_eq!(out[1].key_list(), vec!["a", "b"]);
        assert_eq!(out[1].get("a"), Some("3"));
    }
}
