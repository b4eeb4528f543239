//! Writer codecs: serialize records onto a byte sink.
//!
//! Streaming writers emit as records arrive; the buffered ones (pprint, the
//! list-wrapped JSON form) hold output until [RecordWriter::finish], which
//! the pipeline driver calls when the end-of-stream marker reaches the
//! writer.

mod csv_writer;
mod dkvp;
mod json;
mod markdown;
mod nidx;
mod pprint;
mod xtab;

use std::io::Write;

use crate::errors::Result;
use crate::options::{Format, WriterOpts};
use crate::record::Record;

pub(crate) use json::escape_json as json_escape;

pub use csv_writer::{CsvLiteWriter, CsvWriter};
pub use dkvp::DkvpWriter;
pub use json::JsonWriter;
pub use markdown::MarkdownWriter;
pub use nidx::NidxWriter;
pub use pprint::PprintWriter;
pub use xtab::XtabWriter;

pub trait RecordWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()>;

    /// End-of-stream: flush anything deferred.
    fn finish(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

pub fn make_writer(opts: &WriterOpts) -> Box<dyn RecordWriter> {
    match opts.format {
        Format::Dkvp => Box::new(DkvpWriter::new(opts.clone())),
        Format::Nidx => Box::new(NidxWriter::new(opts.clone())),
        Format::Csv => Box::new(CsvWriter::new(opts.clone())),
        Format::CsvLite => Box::new(CsvLiteWriter::new(opts.clone())),
        Format::Json => Box::new(JsonWriter::new(opts.clone())),
        Format::Pprint => Box::new(PprintWriter::new(opts.clone())),
        Format::Xtab => Box::new(XtabWriter::new(opts.clone())),
        Format::Markdown => Box::new(MarkdownWriter::new(opts.clone())),
    }
}

/// Serialize a full record stream; test and library convenience.
pub fn write_all(
    writer: &mut dyn RecordWriter,
    records: &[Record],
    out: &mut dyn Write,
) -> Result<()> {
    for rec in records {
        writer.write(rec, out)?;
    }
    writer.finish(out)
}
