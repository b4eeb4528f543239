//! Delimited key-value pairs, the default input format: records separated by
//! IRS, fields by IFS, key from value by the first IPS. A field with no IPS
//! gets its 1-up position as its key.

use std::io::BufRead;

use super::{split_fields, LineSplitter, RecordReader};
use crate::errors::Result;
use crate::options::ReaderOpts;
use crate::record::Record;

pub struct DkvpReader {
    opts: ReaderOpts,
    lines: LineSplitter,
}

impl DkvpReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> DkvpReader {
        let lines = LineSplitter::new(src, &opts.irs);
        DkvpReader { opts, lines }
    }
}

impl RecordReader for DkvpReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(line) = self.lines.next_line()? else {
            return Ok(None);
        };
        let mut rec = Record::new();
        for (i, field) in split_fields(&line, &self.opts.ifs, self.opts.allow_repeat_ifs)
            .into_iter()
            .enumerate()
        {
            match field.split_once(&self.opts.ips) {
                Some((k, v)) => rec.put(k, v),
                None => rec.put((i + 1).to_string(), field),
            }
        }
        Ok(Some(rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;
    use std::io::Cursor;

    fn read_all(input: &str, opts: ReaderOpts) -> Vec<Record> {
        let mut rdr = DkvpReader::new(opts, Box::new(Cursor::new(input.to_string())));
        let mut out = Vec::new();
        while let Some(rec) = rdr.next_record().unwrap() {
            out.push(rec);
        }
        out
    }

    #[test]
    fn test_basic() {
        let recs = read_all("a=1,b=2\na=3,b=4\n", ReaderOpts::for_format(Format::Dkvp));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("a"), Some("1"));
        assert_eq!(recs[1].get("b"), Some("4"));
        assert_eq!(recs[0].key_list(), vec!["a", "b"]);
    }

    #[test]
    fn test_positional_key_when_no_pair_separator() {
        let recs = read_all("a=1,naked,b=2\n", ReaderOpts::for_format(Format::Dkvp));
        assert_eq!(recs[0].get("2"), Some("naked"));
        assert_eq!(recs[0].key_list(), vec!["a", "2", "b"]);
    }

    #[test]
    fn test_custom_separators() {
        let mut opts = ReaderOpts::for_format(Format::Dkvp);
        opts.ifs = ";".to_string();
        opts.ips = ":".to_string();
        let recs = read_all("a:1;b:2\n", opts);
        assert_eq!(recs[0].get("b"), Some("2"));
    }

    #[test]
    fn test_repeated_ifs() {
        let mut opts = ReaderOpts::for_format(Format::Dkvp);
        opts.allow_repeat_ifs = true;
        let recs = read_all("a=1,,,b=2\n", opts);
        assert_eq!(recs[0].len(), 2);
    }
}
