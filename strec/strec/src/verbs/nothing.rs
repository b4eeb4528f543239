//! `nothing` absorbs every record; `check` does the same, existing to force
//! a full parse of the input (reader errors are fatal, so reaching end of
//! stream means the file was well-formed).

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;

pub struct Nothing;

pub fn parse_nothing(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(Nothing))
}

pub fn parse_check(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(Nothing))
}

impl Verb for Nothing {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        if let StreamItem::End = item {
            out.push(StreamItem::End);
        }
        Ok(())
    }
}
