//! Vertical-tabular input: records are blocks of `key PS value` lines
//! separated by one or more blank lines. Runs of the pair separator collapse
//! by default, which is what aligned xtab output produces.

use std::io::BufRead;

use super::{LineSplitter, RecordReader};
use crate::errors::Result;
use crate::options::ReaderOpts;
use crate::record::Record;

pub struct XtabReader {
    opts: ReaderOpts,
    lines: LineSplitter,
}

impl XtabReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> XtabReader {
        let lines = LineSplitter::new(src, "\n");
        XtabReader { opts, lines }
    }
}

impl RecordReader for XtabReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut rec = Record::new();
        let mut started = false;
        loop {
            match self.lines.next_line()? {
                None => {
                    return Ok(if started { Some(rec) } else { None });
                }
                Some(line) if line.is_empty() => {
                    if started {
                        return Ok(Some(rec));
                    }
                    // leading blank lines before the first block
                }
                Some(line) => {
                    started = true;
                    let ips = &self.opts.ips;
                    match line.split_once(ips.as_str()) {
                        Some((key, rest)) => {
                            let value = if self.opts.allow_repeat_ips {
                                rest.trim_start_matches(ips.as_str())
                            } else {
                                rest
                            };
                            rec.put(key, value);
                        }
                        None => rec.put(line, ""),
                    }
                }
            }
        }
    }
}
