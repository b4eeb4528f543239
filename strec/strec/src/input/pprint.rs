//! Pretty-printed input: fixed-width columns separated by runs of spaces,
//! first row naming the columns. A blank line starts a new header group, as
//! produced by the pprint writer on a key-set change.

use std::io::BufRead;

use super::{split_fields, LineSplitter, RecordReader};
use crate::errors::{Error, Result};
use crate::options::ReaderOpts;
use crate::record::Record;

pub struct PprintReader {
    opts: ReaderOpts,
    lines: LineSplitter,
    header: Option<Vec<String>>,
}

impl PprintReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> PprintReader {
        let lines = LineSplitter::new(src, &opts.irs);
        PprintReader {
            opts,
            lines,
            header: None,
        }
    }
}

impl RecordReader for PprintReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            let Some(line) = self.lines.next_line()? else {
                return Ok(None);
            };
            if line.is_empty() {
                self.header = None;
                continue;
            }
            let fields = split_fields(&line, &self.opts.ifs, self.opts.allow_repeat_ifs);

            let Some(header) = &self.header else {
                self.header = Some(fields.into_iter().map(|s| s.to_string()).collect());
                continue;
            };
            if fields.len() != header.len() {
                return Err(Error::parse(format!(
                    "pprint data row has {} fields, header has {}",
                    fields.len(),
                    header.len()
                )));
            }
            let mut rec = Record::new();
            for (k, v) in header.iter().zip(fields) {
                rec.put(k.clone(), v);
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

    #[test]
    fn test_aligned_columns() {
        let input = "a   bee c\n1   2   3\n44  5   6\n";
        let opts = ReaderOpts::for_format(Format::Pprint);
        let mut rdr = PprintReader::new(opts, Box::new(Cursor::new(input.to_string())));
        let rec = rdr.next_record().unwrap().unwrap();
        assert_eq!(rec.key_list(), vec!["a", "bee", "c"]);
        assert_eq!(rec.get("bee"), Some("2"));
        let rec = rdr.next_record().unwrap().unwrap();
        assert_eq!(rec.get("a"), Some("44"));
    }

    #[test]
    fn test_new_group_after_blank() {
        let input = "a b\n1 2\n\nc\n9\n";
        let opts = ReaderOpts::for_format(Format::Pprint);
        let mut rdr = PprintReader::new(opts, Box::new(Cursor::new(input.to_string())));
        assert_eq!(rdr.next_record().unwrap().unwrap().get("b"), Some("2"));
        assert_eq!(rdr.next_record().unwrap().unwrap().get("c"), Some("9"));
    }
}
