//! Tabular JSON output: one object per record. Field values are strings in
//! the record model, and they serialize as JSON strings; numeric-looking
//! text is not silently retyped on the way out.
//!
//! `--jlistwrap` produces one outer array with commas between records;
//! `--jvstack` writes one key per line.

use std::io::Write;

use super::RecordWriter;
use crate::errors::Result;
use crate::options::WriterOpts;
use crate::record::Record;

pub struct JsonWriter {
    opts: WriterOpts,
    wrote_any: bool,
}

impl JsonWriter {
    pub fn new(opts: WriterOpts) -> JsonWriter {
        JsonWriter {
            opts,
            wrote_any: false,
        }
    }

    fn render(&self, rec: &Record) -> String {
        if self.opts.json_vertical_stack {
            let mut s = String::from("{\n");
            let n = rec.len();
            for (i, (k, v)) in rec.iter().enumerate() {
                s.push_str("  \"");
                s.push_str(&escape_json(k));
                s.push_str("\": \"");
                s.push_str(&escape_json(v));
                s.push('"');
                if i + 1 < n {
                    s.push(',');
                }
                s.push('\n');
            }
            s.push('}');
            s
        } else {
            let mut s = String::from("{");
            for (i, (k, v)) in rec.iter().enumerate() {
                if i > 0 {
                    s.push(',');
                }
                s.push('"');
                s.push_str(&escape_json(k));
                s.push_str("\":\"");
                s.push_str(&escape_json(v));
                s.push('"');
            }
            s.push('}');
            s
        }
    }
}

impl RecordWriter for JsonWriter {
    fn write(&mut self, rec: &Record, out: &mut dyn Write) -> Result<()> {
        let body = self.render(rec);
        if self.opts.json_list_wrap {
            if !self.wrote_any {
                out.write_all(b"[\n")?;
            } else {
                out.write_all(b",\n")?;
            }
            out.write_all(body.as_bytes())?;
        } else {
            out.write_all(body.as_bytes())?;
            out.write_all(b"\n")?;
        }
        self.wrote_any = true;
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.opts.json_list_wrap {
            if self.wrote_any {
                out.write_all(b"\n]\n")?;
            } else {
                out.write_all(b"[\n]\n")?;
            }
        }
        Ok(())
    }
}

pub(crate) fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
