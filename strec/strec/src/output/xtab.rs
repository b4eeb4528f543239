//! Vertical-tabular output: one `key value` line per field with the value
//! column aligned past the widest key, blank line between records.

use std::io::Write;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct XtabWriter {
    opts: WriterOpts,
    wrote_any: bool,
}

impl XtabWriter {
    pub fn new(opts: WriterOpts) -> XtabWriter {
        XtabWriter {
            opts,
            wrote_any: false,
        }
    }
}

impl RecordWriter for XtabWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        if self.wrote_any {
            out.write_all(b"\n")?;
        }
        let width = rec
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(0);
        let ps = self.opts.ops.chars().next().unwrap_or(' ');
        for (k, v) in rec.iter() {
            let mut line = String::new();
            line.push_str(k);
            for _ in 0..=width.saturating_sub(k.chars().count()) {
                line.push(ps);
            }
            line.push_str(v);
            line.push('\n');
            out.write_all(line.as_bytes())?;
        }
        self.wrote_any = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;
    use crate::output::write_all;

    #[test]
    fn test_alignment_and_blank_line() {
        let recs = vec![
            Record::from_pairs([("a", "1"), ("bee", "2")]),
            Record::from_pairs([("a", "3"), ("bee", "4")]),
        ];
        let mut w = XtabWriter::new(WriterOpts::for_format(Format::Xtab));
        let mut out = Vec::new();
        write_all(&mut w, &recs, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a   1\nbee 2\n\na   3\nbee 4\n"
        );
    }
}
