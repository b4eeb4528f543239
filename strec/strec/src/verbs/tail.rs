//! `tail`: a ring buffer of the last `-n` records per group, flushed at end
//! of stream in group first-seen order.

use std::collections::VecDeque;

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Tail {
    n: usize,
    group_by: Vec<String>,
    rings: IndexMap<Vec<String>, VecDeque<Record>>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut n = 10;
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => n = args.int_value("-n")?.max(0) as usize,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Tail {
        n,
        group_by,
        rings: IndexMap::new(),
    }))
}

impl Verb for Tail {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let key: Vec<String> = self
                    .group_by
                    .iter()
                    .filter_map(|f| rec.get(f).map(|v| v.to_string()))
                    .collect();
                let ring = self.rings.entry(key).or_default();
                if ring.len() == self.n {
                    ring.pop_front();
                }
                if self.n > 0 {
                    ring.push_back(rec);
                }
            }
            StreamItem::End => {
                for (_, ring) in self.rings.drain(..) {
                    for rec in ring {
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

    #[test]
    fn test_tail_keeps_last() {
        let mut verb =
            make_verb("tail", vec!["-n".into(), "2".into()], &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for i in 1..=5 {
            verb.process(
                StreamItem::Record(Record::from_pairs([("i", i.to_string().as_str())])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        assert!(out.is_empty());
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        assert_eq!(out.len(), 3); // two records plus the marker
        match &out[0] {
            StreamItem::Record(r) => assert_eq!(r.get("i"), Some("4")),
            _ => panic!(),
        }
        assert!(matches!(out[2], StreamItem::End));
    }
}
