//! Positional output: values joined by OFS, keys dropped.

use std::io::Write;

use itertools::Itertools;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct NidxWriter {
    opts: WriterOpts,
}

impl NidxWriter {
    pub fn new(opts: WriterOpts) -> NidxWriter {
        NidxWriter { opts }
    }
}

impl RecordWriter for NidxWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let line = rec.iter().map(|(_, v)| v).join(&self.opts.ofs);
        out.write_all(line.as_bytes())?;
        out.write_all(self.opts.ors.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;

    #[test]
    fn test_values_only() {
        let mut w = NidxWriter::new(WriterOpts::for_format(Format::Nidx));
        let mut out = Vec::new();
        w.write(&Record::from_pairs([("a", "1"), ("b", "2")]), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 2\n");
    }
}
