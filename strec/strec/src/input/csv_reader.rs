//! The CSV family.
//!
//! [CsvReader] is RFC-4180-strict: double-quoted fields may contain embedded
//! IFS and IRS, a doubled double-quote is a literal quote, and malformed
//! quoting is fatal. The header row names the columns; a row with a
//! different column count is a schema change, which is an error within one
//! file (a new reader is built per file, so a new header may be read across
//! files).
//!
//! [CsvLiteReader] skips the quoting grammar entirely: separators are taken
//! at byte level, and a blank line closes the current schema block so the
//! next line is read as a fresh header.

use std::collections::VecDeque;
use std::io::{BufRead, Read};

use super::{split_fields, LineSplitter, RecordReader};
use crate::errors::{Error, Result};
use crate::options::ReaderOpts;
use crate::record::Record;

// ----------------------------------------------------------------
// strict reader

pub struct CsvReader {
    opts: ReaderOpts,
    scan: ByteScanner,
    header: Option<Vec<String>>,
    done: bool,
}

impl CsvReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> CsvReader {
        CsvReader {
            opts,
            scan: ByteScanner::new(src),
            header: None,
            done: false,
        }
    }

    /// One raw CSV row: (text, was-quoted) per field.
    fn next_row(&mut self) -> Result<Option<Vec<(String, bool)>>> {
        let ifs = self.opts.ifs.as_bytes().to_vec();
        let irs = self.opts.irs.as_bytes().to_vec();

        if self.scan.at_eof()? {
            return Ok(None);
        }

        let mut fields: Vec<(String, bool)> = Vec::new();
        let mut cur: Vec<u8> = Vec::new();

        loop {
            // start of a field
            if self.scan.try_consume(b"\"")? {
                // quoted field
                loop {
                    match self.scan.next()? {
                        None => {
                            return Err(Error::parse(
                                "unexpected end of input inside a quoted CSV field",
                            ));
                        }
                        Some(b'"') => {
                            if self.scan.try_consume(b"\"")? {
                                cur.push(b'"');
                            } else {
                                break;
                            }
                        }
                        Some(b) => cur.push(b),
                    }
                }
                fields.push((String::from_utf8_lossy(&cur).into_owned(), true));
                cur.clear();
                if self.scan.try_consume(&ifs)? {
                    continue;
                }
                if self.consume_record_end(&irs)? || self.scan.at_eof()? {
                    return Ok(Some(fields));
                }
                return Err(Error::parse(
                    "malformed CSV: closing quote not followed by a separator",
                ));
            }

            // unquoted field
            loop {
                if self.scan.try_consume(&ifs)? {
                    fields.push((String::from_utf8_lossy(&cur).into_owned(), false));
                    cur.clear();
                    break;
                }
                if self.consume_record_end(&irs)? {
                    fields.push((String::from_utf8_lossy(&cur).into_owned(), false));
                    return Ok(Some(fields));
                }
                match self.scan.next()? {
                    None => {
                        fields.push((String::from_utf8_lossy(&cur).into_owned(), false));
                        return Ok(Some(fields));
                    }
                    Some(b'"') => {
                        return Err(Error::parse(
                            "malformed CSV: double quote inside an unquoted field",
                        ));
                    }
                    Some(b) => cur.push(b),
                }
            }
        }
    }

    fn consume_record_end(&mut self, irs: &[u8]) -> Result<bool> {
        if self.scan.try_consume(irs)? {
            return Ok(true);
        }
        if irs == b"\r\n" && self.scan.try_consume(b"\n")? {
            return Ok(true);
        }
        Ok(false)
    }
}

impl RecordReader for CsvReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        loop {
            let Some(row) = self.next_row()? else {
                self.done = true;
                return Ok(None);
            };

            // a final blank line is a terminator, not a one-field record
            if row.len() == 1 && row[0].0.is_empty() && !row[0].1 && self.scan.at_eof()? {
                self.done = true;
                return Ok(None);
            }

            if self.header.is_none() {
                if self.opts.implicit_csv_header {
                    self.header = Some((1..=row.len()).map(|i| i.to_string()).collect());
                    // fall through: this row is data
                } else {
                    self.header = Some(row.into_iter().map(|(t, _)| t).collect());
                    continue;
                }
            }

            let header = self.header.as_ref().unwrap();
            if row.len() != header.len() {
                return Err(Error::parse(format!(
                    "CSV schema change within a file: header has {} fields, data row has {}",
                    header.len(),
                    row.len()
                )));
            }
            let mut rec = Record::new();
            for (key, (text, quoted)) in header.iter().zip(row) {
                if quoted {
                    rec.put_quoted(key.clone(), text);
                } else {
                    rec.put(key.clone(), text);
                }
            }
            return Ok(Some(rec));
        }
    }
}

/// Byte-at-a-time scanner with enough lookahead to match multi-byte
/// separators.
struct ByteScanner {
    src: Box<dyn BufRead>,
    peeked: VecDeque<u8>,
}

impl ByteScanner {
    fn new(src: Box<dyn BufRead>) -> ByteScanner {
        ByteScanner {
            src,
            peeked: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Result<Option<u8>> {
        if let Some(b) = self.peeked.pop_front() {
            return Ok(Some(b));
        }
        let mut byte = [0u8; 1];
        match self.src.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn fill(&mut self, n: usize) -> Result<()> {
        while self.peeked.len() < n {
            let mut byte = [0u8; 1];
            match self.src.read(&mut byte)? {
                0 => break,
                _ => self.peeked.push_back(byte[0]),
            }
        }
        Ok(())
    }

    /// Consume `pat` if it is next in the stream.
    fn try_consume(&mut self, pat: &[u8]) -> Result<bool> {
        if pat.is_empty() {
            return Ok(false);
        }
        self.fill(pat.len())?;
        if self.peeked.len() >= pat.len() && pat.iter().enumerate().all(|(i, b)| self.peeked[i] == *b)
        {
            for _ in 0..pat.len() {
                self.peeked.pop_front();
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn at_eof(&mut self) -> Result<bool> {
        self.fill(1)?;
        Ok(self.peeked.is_empty())
    }
}

// ----------------------------------------------------------------
// lite reader

pub struct CsvLiteReader {
    opts: ReaderOpts,
    lines: LineSplitter,
    header: Option<Vec<String>>,
}

impl CsvLiteReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> CsvLiteReader {
        let lines = LineSplitter::new(src, &opts.irs);
        CsvLiteReader {
            opts,
            lines,
            header: None,
        }
    }
}

impl RecordReader for CsvLiteReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            let Some(line) = self.lines.next_line()? else {
                return Ok(None);
            };
            if line.is_empty() {
                // blank line closes the schema block
                self.header = None;
                continue;
            }
            let fields = split_fields(&line, &self.opts.ifs, false);

            if self.header.is_none() && !self.opts.implicit_csv_header {
                self.header = Some(fields.into_iter().map(|s| s.to_string()).collect());
                continue;
            }

            let keys: Vec<String> = match &self.header {
                Some(h) => {
                    if fields.len() != h.len() {
                        return Err(Error::parse(format!(
                            "data line has {} fields, header has {}",
                            fields.len(),
                            h.len()
                        )));
                    }
                    h.clone()
                }
                None => (1..=fields.len()).map(|i| i.to_string()).collect(),
            };
            let mut rec = Record::new();
            for (k, v) in keys.into_iter().zip(fields) {
                rec.put(k, v);
            }
            return Ok(Some(rec));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;
    use std::io::Cursor;

    fn strict(input: &str) -> CsvReader {
        CsvReader::new(
            ReaderOpts::for_format(Format::Csv),
            Box::new(Cursor::new(input.to_string())),
        )
    }

    fn read_all(rdr: &mut dyn RecordReader) -> Vec<Record> {
        let mut out = Vec::new();
        while let Some(rec) = rdr.next_record().unwrap() {
            out.push(rec);
        }
        out
    }

    #[test]
    fn test_header_names_columns() {
        let recs = read_all(&mut strict("a,b,c\r\n1,2,3\r\n4,5,6\r\n"));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("a"), Some("1"));
        assert_eq!(recs[1].get("c"), Some("6"));
    }

    #[test]
    fn test_quoting() {
        let recs = read_all(&mut strict("a,b\r\n\"x,y\",\"z\"\"w\"\r\n"));
        assert_eq!(recs[0].get("a"), Some("x,y"));
        assert_eq!(recs[0].get("b"), Some("z\"w"));
        assert!(recs[0].was_quoted("a"));
    }

    #[test]
    fn test_embedded_record_separator() {
        let recs = read_all(&mut strict("a\r\n\"line1\r\nline2\"\r\n"));
        assert_eq!(recs[0].get("a"), Some("line1\r\nline2"));
    }

    #[test]
    fn test_schema_change_is_fatal() {
        let mut rdr = strict("a,b\r\n1,2\r\n1,2,3\r\n");
        assert!(rdr.next_record().is_ok());
        assert!(rdr.next_record().is_err());
    }

    #[test]
    fn test_unterminated_quote_is_fatal() {
        let mut rdr = strict("a\r\n\"oops\r\n");
        assert!(rdr.next_record().is_err());
    }

    #[test]
    fn test_implicit_header() {
        let mut opts = ReaderOpts::for_format(Format::Csv);
        opts.implicit_csv_header = true;
        let mut rdr = CsvReader::new(opts, Box::new(Cursor::new("7,8\r\n".to_string())));
        let recs = read_all(&mut rdr);
        assert_eq!(recs[0].key_list(), vec!["1", "2"]);
        assert_eq!(recs[0].get("1"), Some("7"));
    }

    #[test]
    fn test_lite_schema_blocks() {
        let mut opts = ReaderOpts::for_format(Format::CsvLite);
        opts.irs = "\n".to_string();
        let mut rdr = CsvLiteReader::new(
            opts,
            Box::new(Cursor::new("a,b\n1,2\n\nc\n9\n".to_string())),
        );
        let recs = read_all(&mut rdr);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("a"), Some("1"));
        assert_eq!(recs[1].get("c"), Some("9"));
    }

    #[test]
    fn test_lite_no_quote_handling() {
        let mut opts = ReaderOpts::for_format(Format::CsvLite);
        opts.irs = "\n".to_string();
        let mut rdr =
            CsvLiteReader::new(opts, Box::new(Cursor::new("a,b\n\"1,2\n".to_string())));
        let recs = read_all(&mut rdr);
        assert_eq!(recs[0].get("a"), Some("\"1"));
    }
}
