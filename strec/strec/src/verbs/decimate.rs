//! `decimate`: pass one record in every `-n`, counted per group under `-g`.
//! `-e` keeps the last of each batch (the default), `-b` the first.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;

pub struct Decimate {
    n: u64,
    keep_first: bool,
    group_by: Vec<String>,
    counters: IndexMap<Vec<String>, u64>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut n = 10;
    let mut keep_first = false;
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => n = args.int_value("-n")?.max(1) as u64,
            "-b" => keep_first = true,
            "-e" => keep_first = false,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Decimate {
        n,
        keep_first,
        group_by,
        counters: IndexMap::new(),
    }))
}

impl Verb for Decimate {
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
                let counter = self.counters.entry(key).or_insert(0);
                *counter += 1;
                let keep = if self.keep_first {
                    *counter % self.n == 1 || self.n == 1
                } else {
                    *counter % self.n == 0
                };
                if keep {
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
    fn test_every_second_record() {
        let mut verb =
            make_verb("decimate", vec!["-n".into(), "2".into()], &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for i in 1..=4 {
            verb.process(
                StreamItem::Record(Record::from_pairs([("i", i.to_string().as_str())])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        let kept: Vec<String> = out
            .iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r.get("i").unwrap().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(kept, vec!["2", "4"]);
    }
}
