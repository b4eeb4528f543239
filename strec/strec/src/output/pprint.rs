//! Pretty-printed output with deferred alignment: records buffer per
//! key-set group, and each column is sized to its widest value (or header)
//! within the group. A key-set change closes the group with a blank line.
//!
//! The field separator is emitted repeated for padding, so it must be a
//! single character.

use std::io::Write;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct PprintWriter {
    opts: WriterOpts,
    group: Vec<Record>,
    keys: Vec<String>,
    wrote_any_group: bool,
}

impl PprintWriter {
    pub fn new(opts: WriterOpts) -> PprintWriter {
        PprintWriter {
            opts,
            group: Vec::new(),
            keys: Vec::new(),
            wrote_any_group: false,
        }
    }

    fn cell(value: &str) -> &str {
        if value.is_empty() {
            "-"
        } else {
            value
        }
    }

    fn flush_group(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.group.is_empty() {
            return Ok(());
        }
        if self.wrote_any_group {
            out.write_all(self.opts.ors.as_bytes())?;
        }

        let mut widths: Vec<usize> = self.keys.iter().map(|k| k.chars().count()).collect();
        for rec in &self.group {
            for (i, (_, v)) in rec.iter().enumerate() {
                let w = Self::cell(v).chars().count();
                if w > widths[i] {
                    widths[i] = w;
                }
            }
        }

        let fs = self.opts.ofs.chars().next().unwrap_or(' ');
        let key_cells: Vec<&str> = self.keys.iter().map(|k| k.as_str()).collect();
        self.write_row(&key_cells, &widths, fs, out)?;
        for rec in &self.group {
            let cells: Vec<&str> = rec.iter().map(|(_, v)| Self::cell(v)).collect();
            self.write_row(&cells, &widths, fs, out)?;
        }

        self.group.clear();
        self.wrote_any_group = true;
        Ok(())
    }

    fn write_row(
        &self,
        cells: &[&str],
        widths: &[usize],
        fs: char,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut line = String::new();
        let last = cells.len().saturating_sub(1);
        for (i, cell) in cells.iter().enumerate() {
            let pad = widths[i].saturating_sub(cell.chars().count());
            if self.opts.right_align {
                for _ in 0..pad {
                    line.push(fs);
                }
                line.push_str(cell);
                if i < last {
                    line.push(fs);
                }
            } else {
                line.push_str(cell);
                if i < last {
                    for _ in 0..=pad {
                        line.push(fs);
                    }
                }
            }
        }
        out.write_all(line.as_bytes())?;
        out.write_all(self.opts.ors.as_bytes())?;
        Ok(())
    }
}

impl RecordWriter for PprintWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let keys = rec.key_list();
        if !self.group.is_empty() && keys != self.keys {
            self.flush_group(out)?;
        }
        if self.group.is_empty() {
            self.keys = keys;
        }
        self.group.push(rec.clone());
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<()> {
        self.flush_group(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Format;
    use crate::output::write_all;

    fn render(records: &[Record], opts: WriterOpts) -> String {
        let mut w = PprintWriter::new(opts);
        let mut out = Vec::new();
        write_all(&mut w, records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_alignment() {
        let recs = vec![
            Record::from_pairs([("a", "1"), ("bee", "2")]),
            Record::from_pairs([("a", "4444"), ("bee", "5")]),
        ];
        assert_eq!(
            render(&recs, WriterOpts::for_format(Format::Pprint)),
            "a    bee\n1    2\n4444 5\n"
        );
    }

    #[test]
    fn test_empty_value_placeholder() {
        let recs = vec![Record::from_pairs([("a", ""), ("b", "2")])];
        assert_eq!(
            render(&recs, WriterOpts::for_format(Format::Pprint)),
            "a b\n- 2\n"
        );
    }

    #[test]
    fn test_key_set_change_starts_new_group() {
        let recs = vec![
            Record::from_pairs([("a", "1")]),
            Record::from_pairs([("b", "2")]),
        ];
        assert_eq!(
            render(&recs, WriterOpts::for_format(Format::Pprint)),
            "a\n1\n\nb\n2\n"
        );
    }

    #[test]
    fn test_right_align() {
        let mut opts = WriterOpts::for_format(Format::Pprint);
        opts.right_align = true;
        let recs = vec![
            Record::from_pairs([("a", "1"), ("bee", "2")]),
            Record::from_pairs([("a", "4444"), ("bee", "5")]),
        ];
        assert_eq!(render(&recs, opts), "   a bee\n   1   2\n4444   5\n");
    }
}
