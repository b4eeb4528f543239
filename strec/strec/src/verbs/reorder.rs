//! `reorder`: move the listed fields to the front (or, with `-e`, to the
//! end), leaving the rest in their current order.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;

pub struct Reorder {
    fields: Vec<String>,
    to_end: bool,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut fields = Vec::new();
    let mut to_end = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => fields = args.list_value("-f")?,
            "-e" => to_end = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Reorder { fields, to_end }))
}

impl Verb for Reorder {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                if self.to_end {
                    rec.move_to_end(&self.fields);
                } else {
                    rec.move_to_front(&self.fields);
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
    use crate::record::Record;

    #[test]
    fn test_front_and_end() {
        let mut verb = make_verb(
            "reorder",
            vec!["-f".into(), "c".into()],
            &Options::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("a", "1"), ("b", "2"), ("c", "3")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        match &out[0] {
            StreamItem::Record(r) => assert_eq!(r.key_list(), vec!["c", "a", "b"]),
            _ => panic!(),
        }

        let mut verb = make_verb(
            "reorder",
            vec!["-e".into(), "-f".into(), "a".into()],
            &Options::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("a", "1"), ("b", "2")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        match &out[0] {
            StreamItem::Record(r) => assert_eq!(r.key_list(), vec!["b", "a"]),
            _ => panic!(),
        }
    }
}
