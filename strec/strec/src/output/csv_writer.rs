//! CSV output.
//!
//! The strict writer quotes per the selected [QuoteMode]:
//! - `minimal` (default): quote exactly when the value contains the output
//!   field separator, a carriage return or newline, or a double quote;
//! - `all` / `none`: always / never;
//! - `numeric`: quote fields that parse as numbers;
//! - `original`: quote fields whose input was quoted (plus anything
//!   `minimal` would quote, so output always re-parses); the flag is not
//!   sticky across computed fields.
//!
//! A key-set change mid-stream is an error in strict CSV; the lite writer
//! instead closes the block with a blank line and emits the new header.

use std::io::Write;

use itertools::Itertools;

use super::RecordWriter;
use crate::errors::{Error, Result};
use crate::options::{QuoteMode, WriterOpts};
use crate::record::Record;
use crate::value::infer_number;

pub struct CsvWriter {
    opts: WriterOpts,
    header: Option<Vec<String>>,
}

impl CsvWriter {
    pub fn new(opts: WriterOpts) -> CsvWriter {
        CsvWriter { opts, header: None }
    }

    fn quote_field(&self, text: &str, was_quoted: bool) -> String {
        let must = text.contains(self.opts.ofs.as_str())
            || text.contains('"')
            || text.contains('\n')
            || text.contains('\r');
        let quote = match self.opts.quote_mode {
            QuoteMode::All => true,
            QuoteMode::None => false,
            QuoteMode::Minimal => must,
            QuoteMode::Numeric => infer_number(text).is_some(),
            QuoteMode::Original => was_quoted || must,
        };
        if quote {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text.to_string()
        }
    }

    fn write_line(&self, fields: &[String], out: &mut dyn Write) -> Result<()> {
        out.write_all(fields.iter().join(&self.opts.ofs).as_bytes())?;
        out.write_all(self.opts.ors.as_bytes())?;
        Ok(())
    }
}

impl RecordWriter for CsvWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let keys = rec.key_list();
        match &self.header {
            None => {
                if !self.opts.headerless_csv_output {
                    let header_fields = keys
                        .iter()
                        .map(|k| self.quote_field(k, false))
                        .collect_vec();
                    self.write_line(&header_fields, out)?;
                }
                self.header = Some(keys);
            }
            Some(header) => {
                if *header != keys {
                    return Err(Error::parse(format!(
                        "CSV schema change: first keys {}; current keys {}",
                        header.iter().join(","),
                        keys.iter().join(",")
                    )));
                }
            }
        }
        let fields = rec
            .iter()
            .map(|(k, v)| self.quote_field(v, rec.was_quoted(k)))
            .collect_vec();
        self.write_line(&fields, out)
    }
}

pub struct CsvLiteWriter {
    opts: WriterOpts,
    header: Option<Vec<String>>,
}

impl CsvLiteWriter {
    pub fn new(opts: WriterOpts) -> CsvLiteWriter {
        CsvLiteWriter { opts, header: None }
    }

    fn write_line(&self, fields: &[&str], out: &mut dyn Write) -> Result<()> {
        out.write_all(fields.iter().join(&self.opts.ofs).as_bytes())?;
        out.write_all(self.opts.ors.as_bytes())?;
        Ok(())
    }
}

impl RecordWriter for CsvLiteWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let keys = rec.key_list();
        let changed = self.header.as_ref() != Some(&keys);
        if changed {
            if self.header.is_some() {
                out.write_all(self.opts.ors.as_bytes())?;
            }
            if !self.opts.headerless_csv_output {
                let key_refs: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
                self.write_line(&key_refs, out)?;
            }
            self.header = Some(keys);
        }
        let values: Vec<&str> = rec.iter().map(|(_, v)| v).collect();
        self.write_line(&values, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;

    fn render(records: &[Record], opts: WriterOpts) -> String {
        let mut w = CsvWriter::new(opts);
        let mut out = Vec::new();
        for rec in records {
            w.write(rec, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_then_rows() {
        let recs = vec![
            Record::from_pairs([("a", "1"), ("b", "2")]),
            Record::from_pairs([("a", "3"), ("b", "4")]),
        ];
        assert_eq!(
            render(&recs, WriterOpts::for_format(Format::Csv)),
            "a,b\r\n1,2\r\n3,4\r\n"
        );
    }

    #[test]
    fn test_minimal_quoting() {
        let recs = vec![Record::from_pairs([("a", "x,y"), ("b", "z\"w"), ("c", "p")])];
        assert_eq!(
            render(&recs, WriterOpts::for_format(Format::Csv)),
            "a,b,c\r\n\"x,y\",\"z\"\"w\",p\r\n"
        );
    }

    #[test]
    fn test_quote_all_and_numeric() {
        let recs = vec![Record::from_pairs([("a", "7"), ("b", "x")])];
        let mut opts = WriterOpts::for_format(Format::Csv);
        opts.quote_mode = QuoteMode::All;
        assert_eq!(render(&recs, opts.clone()), "\"a\",\"b\"\r\n\"7\",\"x\"\r\n");
        opts.quote_mode = QuoteMode::Numeric;
        assert_eq!(render(&recs, opts), "a,b\r\n\"7\",x\r\n");
    }

    #[test]
    fn test_quote_original_not_sticky() {
        let mut rec = Record::new();
        rec.put_quoted("a", "plain");
        rec.put("b", "computed");
        let mut opts = WriterOpts::for_format(Format::Csv);
        opts.quote_mode = QuoteMode::Original;
        let mut w = CsvWriter::new(opts);
        let mut out = Vec::new();
        w.write(&rec, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\r\n\"plain\",computed\r\n");
    }

    #[test]
    fn test_schema_change_is_fatal() {
        let mut w = CsvWriter::new(WriterOpts::for_format(Format::Csv));
        let mut out = Vec::new();
        w.write(&Record::from_pairs([("a", "1")]), &mut out).unwrap();
        assert!(w
            .write(&Record::from_pairs([("b", "1")]), &mut out)
            .is_err());
    }

    #[test]
    fn test_headerless() {
        let mut opts = WriterOpts::for_format(Format::Csv);
        opts.headerless_csv_output = true;
        let recs = vec![Record::from_pairs([("a", "1"), ("b", "2")])];
        assert_eq!(render(&recs, opts), "1,2\r\n");
    }

    #[test]
    fn test_lite_new_block_on_schema_change() {
        let mut w = CsvLiteWriter::new(WriterOpts::for_format(Format::CsvLite));
        let mut out = Vec::new();
        w.write(&Record::from_pairs([("a", "1")]), &mut out).unwrap();
        w.write(&Record::from_pairs([("b", "2")]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\n1\n\nb\n2\n");
    }
}
