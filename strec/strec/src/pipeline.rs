//! The pipeline driver: the sole progress engine.
//!
//! For each record pulled from the reader the driver calls the first verb,
//! cascades its output list through subsequent verbs, and hands survivors to
//! the writer. At end of input a single [StreamItem::End] marker is injected
//! and propagates through every verb, so buffered verbs can flush; the
//! marker reaching the writer closes it. A verb's output list must keep the
//! marker last.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use crate::context::Context;
use crate::errors::Result;
use crate::input::make_reader;
use crate::options::Options;
use crate::output::{make_writer, RecordWriter};
use crate::record::Record;
use crate::verbs::Verb;

#[derive(Debug)]
pub enum StreamItem {
    Record(Record),
    /// The end-of-stream marker. Injected once by the driver; verbs forward
    /// it after flushing whatever they buffered.
    End,
}

/// Run a pipeline over the files named in `opts` (stdin for `-`).
pub fn run(opts: &Options, verbs: Vec<Box<dyn Verb>>, out: &mut dyn Write) -> Result<()> {
    let mut sources: Vec<(String, Box<dyn BufRead>)> = Vec::new();
    if !opts.no_input {
        if opts.files.is_empty() {
            sources.push(("(stdin)".to_string(), Box::new(BufReader::new(std::io::stdin()))));
        } else {
            for name in &opts.files {
                if name == "-" {
                    sources
                        .push(("(stdin)".to_string(), Box::new(BufReader::new(std::io::stdin()))));
                } else {
                    let file = File::open(name)?;
                    sources.push((name.clone(), Box::new(BufReader::new(file))));
                }
            }
        }
    }
    run_with_sources(opts, verbs, sources, out)
}

/// Run a pipeline over explicit byte sources; the library and test entry.
pub fn run_with_sources(
    opts: &Options,
    mut verbs: Vec<Box<dyn Verb>>,
    sources: Vec<(String, Box<dyn BufRead>)>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut writer = make_writer(&opts.writer);
    let mut ctx = Context::default();

    for (name, src) in sources {
        ctx.start_file(&name);
        let mut reader = make_reader(&opts.reader, src)?;
        while let Some(rec) = reader.next_record()? {
            ctx.count_record();
            feed(&mut verbs, StreamItem::Record(rec), &ctx, writer.as_mut(), out)?;
        }
    }

    feed(&mut verbs, StreamItem::End, &ctx, writer.as_mut(), out)
}

fn feed(
    verbs: &mut [Box<dyn Verb>],
    item: StreamItem,
    ctx: &Context,
    writer: &mut dyn RecordWriter,
    out: &mut dyn Write,
) -> Result<()> {
    let mut items = vec![item];
    for verb in verbs.iter_mut() {
        let mut next = Vec::new();
        for it in items {
            verb.process(it, ctx, &mut next)?;
        }
        items = next;
        if items.is_empty() {
            return Ok(());
        }
    }
    for it in items {
        match it {
            StreamItem::Record(rec) => writer.write(&rec, out)?,
            StreamItem::End => writer.finish(out)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Format, Options};
    use std::io::Cursor;

    fn source(input: &str) -> Vec<(String, Box<dyn BufRead>)> {
        vec![(
            "test".to_string(),
            Box::new(Cursor::new(input.to_string())) as Box<dyn BufRead>,
        )]
    }

    #[test]
    fn test_reader_to_writer_with_no_verbs() {
        let opts = Options::default();
        let mut out = Vec::new();
        run_with_sources(&opts, Vec::new(), source("a=1,b=2\na=3,b=4\n"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a=1,b=2\na=3,b=4\n");
    }

    #[test]
    fn test_format_conversion() {
        let mut opts = Options::default();
        opts.reader = crate::options::ReaderOpts::for_format(Format::Csv);
        opts.writer = crate::options::WriterOpts::for_format(Format::Json);
        let mut out = Vec::new();
        run_with_sources(
            &opts,
            Vec::new(),
            source("a,b,c\r\n1,2,3\r\n4,5,6\r\n"),
            &mut out,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"a\":\"1\",\"b\":\"2\",\"c\":\"3\"}\n{\"a\":\"4\",\"b\":\"5\",\"c\":\"6\"}\n"
        );
    }
}
