//! Reader codecs: parse a byte source into a lazy, finite, non-restartable
//! sequence of records.
//!
//! A reader is constructed per input file, which is also what lets the CSV
//! family re-read a header at a file boundary while a schema change inside
//! one file stays an error. Parse errors are fatal to the stream.

mod csv_reader;
mod dkvp;
mod json;
mod nidx;
mod pprint;
mod xtab;

use std::io::BufRead;

use crate::errors::{Error, Result};
use crate::options::{Format, ReaderOpts};
use crate::record::Record;

pub use csv_reader::{CsvLiteReader, CsvReader};
pub use dkvp::DkvpReader;
pub use json::JsonReader;
pub use nidx::NidxReader;
pub use pprint::PprintReader;
pub use xtab::XtabReader;

pub trait RecordReader {
    /// The next record, or `None` at end of input.
    fn next_record(&mut self) -> Result<Option<Record>>;
}

pub fn make_reader(
    opts: &ReaderOpts,
    src: Box<dyn BufRead>,
) -> Result<Box<dyn RecordReader>> {
    Ok(match opts.format {
        Format::Dkvp => Box::new(DkvpReader::new(opts.clone(), src)),
        Format::Nidx => Box::new(NidxReader::new(opts.clone(), src)),
        Format::Csv => Box::new(CsvReader::new(opts.clone(), src)),
        Format::CsvLite => Box::new(CsvLiteReader::new(opts.clone(), src)),
        Format::Json => Box::new(JsonReader::new(opts.clone(), src)),
        Format::Pprint => Box::new(PprintReader::new(opts.clone(), src)),
        Format::Xtab => Box::new(XtabReader::new(opts.clone(), src)),
        Format::Markdown => {
            return Err(Error::usage("markdown is an output-only format"));
        }
    })
}

/// Splits a byte source on a possibly multi-byte record separator. When the
/// separator is CRLF a bare LF is accepted too, so Unix-edited CSV files
/// still read.
pub(crate) struct LineSplitter {
    src: Box<dyn BufRead>,
    sep: Vec<u8>,
    done: bool,
}

impl LineSplitter {
    pub(crate) fn new(src: Box<dyn BufRead>, sep: &str) -> LineSplitter {
        LineSplitter {
            src,
            sep: sep.as_bytes().to_vec(),
            done: false,
        }
    }

    pub(crate) fn next_line(&mut self) -> Result<Option<String>> {
        if self.done {
            return Ok(None);
        }
        let last = *self.sep.last().unwrap_or(&b'\n');
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let n = self.src.read_until(last, &mut buf)?;
            if n == 0 {
                self.done = true;
                if buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
            }
            if buf.ends_with(&self.sep) {
                buf.truncate(buf.len() - self.sep.len());
                return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
            }
            // CRLF-separated input with a stray LF line ending
            if self.sep == b"\r\n" && buf.ends_with(b"\n") {
                buf.pop();
                return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
            }
            // the last byte matched mid-separator, or EOF comes next; keep
            // reading
        }
    }
}

/// Split one line into fields on a literal separator, optionally collapsing
/// separator runs (and ignoring leading separators when collapsing, which is
/// what right-aligned fixed-width input needs).
pub(crate) fn split_fields<'a>(line: &'a str, fs: &str, repeat_fs: bool) -> Vec<&'a str> {
    if line.is_empty() {
        return Vec::new();
    }
    let mut fields: Vec<&str> = line.split(fs).collect();
    if repeat_fs {
        fields.retain(|f| !f.is_empty());
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(input: &str, sep: &str) -> Vec<String> {
        let mut splitter = LineSplitter::new(Box::new(Cursor::new(input.to_string())), sep);
        let mut out = Vec::new();
        while let Some(line) = splitter.next_line().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_single_byte_separator() {
        assert_eq!(lines("a\nb\nc\n", "\n"), vec!["a", "b", "c"]);
        // no trailing separator: final fragment still yielded
        assert_eq!(lines("a\nb", "\n"), vec!["a", "b"]);
        assert_eq!(lines("", "\n"), Vec::<String>::new());
    }

    #[test]
    fn test_crlf_separator() {
        assert_eq!(lines("a\r\nb\r\n", "\r\n"), vec!["a", "b"]);
        // tolerate a bare LF in CRLF mode
        assert_eq!(lines("a\nb\r\n", "\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_multibyte_separator() {
        assert_eq!(lines("a;;b;;c", ";;"), vec!["a", "b", "c"]);
        // single ';' is not a separator
        assert_eq!(lines("a;b;;c", ";;"), vec!["a;b", "c"]);
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("a,b,,c", ",", false), vec!["a", "b", "", "c"]);
        assert_eq!(split_fields("a  b   c", " ", true), vec!["a", "b", "c"]);
        assert_eq!(split_fields("", ",", false), Vec::<&str>::new());
    }
}
