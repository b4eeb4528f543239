//! Numerically indexed input: headerless, each field keyed by its 1-up
//! position. The default IFS is a space with run-collapsing available for
//! loosely aligned input.

use std::io::BufRead;

use super::{split_fields, LineSplitter, RecordReader};
use crate::errors::Result;
use crate::options::ReaderOpts;
use crate::record::Record;

pub struct NidxReader {
    opts: ReaderOpts,
    lines: LineSplitter,
}

impl NidxReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> NidxReader {
        let lines = LineSplitter::new(src, &opts.irs);
        NidxReader { opts, lines }
    }
}

impl RecordReader for NidxReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(line) = self.lines.next_line()? else {
            return Ok(None);
        };
        let mut rec = Record::new();
        for (i, field) in split_fields(&line, &self.opts.ifs, self.opts.allow_repeat_ifs)
            .into_iter()
            .enumerate()
        {
            rec.put((i + 1).to_string(), field);
        }
        Ok(Some(rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;
    use std::io::Cursor;

    #[test]
    fn test_positions_as_keys() {
        let opts = ReaderOpts::for_format(Format::Nidx);
        let mut rdr = NidxReader::new(opts, Box::new(Cursor::new("the quick brown\n".to_string())));
        let rec = rdr.next_record().unwrap().unwrap();
        assert_eq!(rec.key_list(), vec!["1", "2", "3"]);
        assert_eq!(rec.get("2"), Some("quick"));
    }

    #[test]
    fn test_multichar_fs() {
        let mut opts = ReaderOpts::for_format(Format::Nidx);
        opts.ifs = "::".to_string();
        let mut rdr = NidxReader::new(opts, Box::new(Cursor::new("a::b\n".to_string())));
        let rec = rdr.next_record().unwrap().unwrap();
        assert_eq!(rec.get("1"), Some("a"));
        assert_eq!(rec.get("2"), Some("b"));
    }
}
