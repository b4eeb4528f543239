//! `tee` (verb form): write a copy of each record to a side file using the
//! main output format, passing records through unchanged. `-a` appends.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::output::{make_writer, RecordWriter};
use crate::pipeline::StreamItem;

pub struct Tee {
    writer: Box<dyn RecordWriter>,
    sink: BufWriter<std::fs::File>,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut append = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-a" => append = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    let path = args.positional("output file name")?;
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(&path)?;
    Ok(Box::new(Tee {
        writer: make_writer(&opts.writer),
        sink: BufWriter::new(file),
    }))
}

impl Verb for Tee {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                self.writer.write(&rec, &mut self.sink)?;
                out.push(StreamItem::Record(rec));
            }
            StreamItem::End => {
                self.writer.finish(&mut self.sink)?;
                self.sink.flush()?;
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
    use crate::record::Record;

    #[test]
    fn test_copies_and_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.dkvp");
        let mut verb = make_verb(
            "tee",
            vec![path.to_str().unwrap().into()],
            &Options::default(),
        )
        .unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("a", "1")])),
            &ctx,
            &mut out,
        )
        .unwrap();
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a=1\n");
    }
}
