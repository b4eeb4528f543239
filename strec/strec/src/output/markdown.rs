//! Markdown table output (output-only format): a header row, a dashed
//! separator row, then data rows. Pipes inside cells are escaped. A key-set
//! change starts a fresh table.

use std::io::Write;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct MarkdownWriter {
    opts: WriterOpts,
    keys: Option<Vec<String>>,
}

impl MarkdownWriter {
    pub fn new(opts: WriterOpts) -> MarkdownWriter {
        MarkdownWriter { opts, keys: None }
    }

    fn row(cells: impl Iterator<Item = String>) -> String {
        format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
    }

    fn escape(cell: &str) -> String {
        cell.replace('|', "\\|")
    }
}

impl RecordWriter for MarkdownWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let keys = rec.key_list();
        if self.keys.as_ref() != Some(&keys) {
            if self.keys.is_some() {
                out.write_all(self.opts.ors.as_bytes())?;
            }
            let header = Self::row(keys.iter().map(|k| Self::escape(k)));
            let dashes = Self::row(keys.iter().map(|_| "---".to_string()));
            out.write_all(header.as_bytes())?;
            out.write_all(self.opts.ors.as_bytes())?;
            out.write_all(dashes.as_bytes())?;
            out.write_all(self.opts.ors.as_bytes())?;
            self.keys = Some(keys);
        }
        let row = Self::row(rec.iter().map(|(_, v)| Self::escape(v)));
        out.write_all(row.as_bytes())?;
        out.write_all(self.opts.ors.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;

    #[test]
    fn test_table() {
        let mut w = MarkdownWriter::new(WriterOpts::for_format(Format::Markdown));
        let mut out = Vec::new();
        w.write(&Record::from_pairs([("a", "1"), ("b", "x|y")]), &mut out)
            .unwrap();
        w.write(&Record::from_pairs([("a", "2"), ("b", "z")]), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "| a | b |\n| --- | --- |\n| 1 | x\\|y |\n| 2 | z |\n"
        );
    }
}
