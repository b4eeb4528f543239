//! Delimited key-value output. A value containing the output field
//! separator is escaped with a backslash so the line re-parses under the
//! same separators.

use std::io::Write;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct DkvpWriter {
    opts: WriterOpts,
}

impl DkvpWriter {
    pub fn new(opts: WriterOpts) -> DkvpWriter {
        DkvpWriter { opts }
    }
}

impl RecordWriter for DkvpWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let ofs = &self.opts.ofs;
        let mut line = String::new();
        for (i, (k, v)) in rec.iter().enumerate() {
            if i > 0 {
                line.push_str(ofs);
            }
            line.push_str(k);
            line.push_str(&self.opts.ops);
            if v.contains(ofs.as_str()) {
                line.push_str(&v.replace(ofs.as_str(), &format!("\\{ofs}")));
            } else {
                line.push_str(v);
            }
        }
        line.push_str(&self.opts.ors);
        out.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Format, WriterOpts};

    fn render(rec: &Record) -> String {
        let mut w = DkvpWriter::new(WriterOpts::for_format(Format::Dkvp));
        let mut out = Vec::new();
        w.write(rec, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_basic() {
        let rec = Record::from_pairs([("a", "1"), ("b", "2")]);
        assert_eq!(render(&rec), "a=1,b=2\n");
    }

    #[test]
    fn test_ofs_in_value_is_escaped() {
        let rec = Record::from_pairs([("a", "x,y"), ("b", "z\"w")]);
        assert_eq!(render(&rec), "a=x\\,y,b=z\"w\n");
    }

    #[test]
    fn test_empty_record_is_blank_line() {
        assert_eq!(render(&Record::new()), "\n");
    }
}
