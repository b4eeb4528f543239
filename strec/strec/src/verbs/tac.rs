//! `tac`: buffer everything, emit in reverse at end of stream.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Tac {
    buffer: Vec<Record>,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(Tac { buffer: Vec::new() }))
}

impl Verb for Tac {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => self.buffer.push(rec),
            StreamItem::End => {
                while let Some(rec) = self.buffer.pop() {
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
