//! `seqgen`: synthesize records `f=start`, `f=start+step`, ... through
//! `stop`. Input records are ignored; the sequence emits at end of stream,
//! so the usual invocation reads no input at all (`-n`).

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Seqgen {
    field: String,
    start: i64,
    stop: i64,
    step: i64,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut field = "i".to_string();
    let mut start = 1;
    let mut stop = 100;
    let mut step = 1;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => field = args.value("-f")?,
            "--start" => start = args.int_value("--start")?,
            "--stop" => stop = args.int_value("--stop")?,
            "--step" => step = args.int_value("--step")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if step == 0 && start != stop {
        return Err(Error::usage("seqgen: --step 0 only valid when start equals stop"));
    }
    Ok(Box::new(Seqgen {
        field,
        start,
        stop,
        step,
    }))
}

impl Verb for Seqgen {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(_) => {}
            StreamItem::End => {
                let mut i = self.start;
                loop {
                    let in_range = if self.step >= 0 {
                        i <= self.stop
                    } else {
                        i >= self.stop
                    };
                    if !in_range {
                        break;
                    }
                    let mut rec = Record::new();
                    rec.put(self.field.clone(), i.to_string());
                    out.push(StreamItem::Record(rec));
                    if self.step == 0 {
                        break;
                    }
                    i += self.step;
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}
