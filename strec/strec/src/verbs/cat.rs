//! `cat`: pass records through, optionally numbering them (`-n`, `-N name`),
//! with per-group numbering under `-g`.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;

pub struct Cat {
    number: Option<String>,
    group_by: Vec<String>,
    counters: IndexMap<Vec<String>, u64>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut number = None;
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => number = Some("n".to_string()),
            "-N" => number = Some(args.value("-N")?),
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Cat {
        number,
        group_by,
        counters: IndexMap::new(),
    }))
}

impl Verb for Cat {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                if let Some(name) = &self.number {
                    let key: Vec<String> = self
                        .group_by
                        .iter()
                        .filter_map(|f| rec.get(f).map(|v| v.to_string()))
                        .collect();
                    let counter = self.counters.entry(key).or_insert(0);
                    *counter += 1;
                    rec.prepend(name.clone(), counter.to_string());
                }
                out.push(StreamItem::Record(rec));
            }
            end => out.push(end),
        }
        Ok(())
    }
}
