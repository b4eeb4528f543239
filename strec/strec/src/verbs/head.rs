//! `head`: pass the first `-n` records (per group under `-g`), absorb the
//! rest.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;

pub struct Head {
    n: u64,
    group_by: Vec<String>,
    counts: IndexMap<Vec<String>, u64>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut n = 10;
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => n = args.int_value("-n")?.max(0) as u64,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Head {
        n,
        group_by,
        counts: IndexMap::new(),
    }))
}

impl Verb for Head {
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
                let count = self.counts.entry(key).or_insert(0);
                *count += 1;
                if *count <= self.n {
                    out.push(StreamItem::Record(rec));
                }
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
    use crate::record::Record;

    #[test]
    fn test_head_per_group() {
        let mut verb = make_verb(
            "head",
            vec!["-n".into(), "1".into(), "-g".into(), "g".into()],
            &Options::default(),
        )
        .unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for g in ["x", "y", "x"] {
            verb.process(
                StreamItem::Record(Record::from_pairs([("g", g)])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        let recs: Vec<_> = out
            .iter()
            .filter(|it| matches!(it, StreamItem::Record(_)))
            .collect();
        assert_eq!(recs.len(), 2);
    }
}
