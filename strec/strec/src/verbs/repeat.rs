//! `repeat`: emit each record `-n` times, or as many times as the value of
//! the `-f` field says.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::value::{infer_number, Num};

enum Count {
    Constant(u64),
    FromField(String),
}

pub struct Repeat {
    count: Count,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut count = Count::Constant(1);
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => count = Count::Constant(args.int_value("-n")?.max(0) as u64),
            "-f" => count = Count::FromField(args.value("-f")?),
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Repeat { count }))
}

impl Verb for Repeat {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let k = match &self.count {
                    Count::Constant(n) => *n,
                    Count::FromField(f) => match rec.get(f).and_then(infer_number) {
                        Some(Num::Int(i)) => i.max(0) as u64,
                        Some(Num::Float(x)) => x.max(0.0) as u64,
                        None => 0,
                    },
                };
                for _ in 0..k {
                    out.push(StreamItem::Record(rec.clone()));
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
    fn test_count_from_field() {
        let mut verb = make_verb("repeat", vec!["-f".into(), "k".into()], &Options::default())
            .unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("k", "3")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        assert_eq!(out.len(), 3);
    }
}
