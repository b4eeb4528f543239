//! `label`: rename the first fields positionally from a comma-separated
//! name list, leaving later fields alone.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Label {
    names: Vec<String>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    let names = args
        .positional("comma-separated name list")?
        .split(',')
        .map(|s| s.to_string())
        .collect();
    Ok(Box::new(Label { names }))
}

impl Verb for Label {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let mut relabeled = Record::new();
                for (i, (k, v)) in rec.iter().enumerate() {
                    match self.names.get(i) {
                        Some(name) => relabeled.put(name.clone(), v),
                        None => relabeled.put(k, v),
                    }
                }
                out.push(StreamItem::Record(relabeled));
            }
            end => out.push(end),
        }
        Ok(())
    }
}
