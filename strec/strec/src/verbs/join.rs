//! `join`: the left file is fully loaded into buckets keyed by the join
//! field values; the main input streams as the right side and probes. Emits
//! paired records as the right side streams, and unpaired left records at
//! end of stream when `--ul` asks for them.
//!
//! The left file's format may differ from the main input (`-i`); when it
//! matches, unspecified separators inherit from the main reader options,
//! otherwise the format's own defaults apply.

use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::input::make_reader;
use crate::options::{Format, Options, ReaderOpts};
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Join {
    join_fields_left: Vec<String>,
    join_fields_right: Vec<String>,
    output_names: Vec<String>,
    emit_paired: bool,
    emit_unpaired_left: bool,
    emit_unpaired_right: bool,
    buckets: IndexMap<Vec<String>, (Vec<Record>, bool)>,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut left_file = None;
    let mut join_names = vec!["id".to_string()];
    let mut left_names = None;
    let mut right_names = None;
    let mut emit_paired = true;
    let mut emit_unpaired_left = false;
    let mut emit_unpaired_right = false;
    let mut left_format = None;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => left_file = Some(args.value("-f")?),
            "-j" => join_names = args.list_value("-j")?,
            "-l" => left_names = Some(args.list_value("-l")?),
            "-r" => right_names = Some(args.list_value("-r")?),
            "--np" => emit_paired = false,
            "--ul" => emit_unpaired_left = true,
            "--ur" => emit_unpaired_right = true,
            "-i" => {
                let name = args.value("-i")?;
                left_format = Some(Format::from_str(&name).map_err(|_| {
                    Error::usage(format!("join: unknown format '{name}'"))
                })?);
            }
            other => return Err(args.unknown_flag(other)),
        }
    }
    let left_file = left_file.ok_or_else(|| Error::usage("join: -f is required"))?;

    let join_fields_left = left_names.unwrap_or_else(|| join_names.clone());
    let join_fields_right = right_names.unwrap_or_else(|| join_names.clone());
    if join_fields_left.len() != join_names.len() || join_fields_right.len() != join_names.len() {
        return Err(Error::usage("join: -j/-l/-r lists must have equal lengths"));
    }

    // per-side reader options: same format inherits the main separators,
    // a different format starts from its own defaults
    let reader_opts = match left_format {
        None => opts.reader.clone(),
        Some(f) if f == opts.reader.format => opts.reader.clone(),
        Some(f) => ReaderOpts::for_format(f),
    };

    let mut buckets: IndexMap<Vec<String>, (Vec<Record>, bool)> = IndexMap::new();
    let file = File::open(&left_file)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{left_file}: {e}"))))?;
    let mut reader = make_reader(&reader_opts, Box::new(BufReader::new(file)))?;
    while let Some(rec) = reader.next_record()? {
        let mut key = Vec::with_capacity(join_fields_left.len());
        let mut complete = true;
        for f in &join_fields_left {
            match rec.get(f) {
                Some(v) => key.push(v.to_string()),
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            buckets.entry(key).or_default().0.push(rec);
        }
    }

    Ok(Box::new(Join {
        join_fields_left,
        join_fields_right,
        output_names: join_names,
        emit_paired,
        emit_unpaired_left,
        emit_unpaired_right,
        buckets,
    }))
}

impl Join {
    fn pair(&self, left: &Record, right: &Record, key: &[String]) -> Record {
        let mut rec = Record::new();
        for (name, value) in self.output_names.iter().zip(key) {
            rec.put(name.clone(), value.clone());
        }
        for (k, v) in left.iter() {
            if !self.join_fields_left.iter().any(|f| f == k) {
                rec.put(k, v);
            }
        }
        for (k, v) in right.iter() {
            if !self.join_fields_right.iter().any(|f| f == k) {
                rec.put(k, v);
            }
        }
        rec
    }
}

impl Verb for Join {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let mut key = Vec::with_capacity(self.join_fields_right.len());
                for f in &self.join_fields_right {
                    match rec.get(f) {
                        Some(v) => key.push(v.to_string()),
                        None => {
                            if self.emit_unpaired_right {
                                out.push(StreamItem::Record(rec));
                            }
                            return Ok(());
                        }
                    }
                }
                let lefts = match self.buckets.get_mut(&key) {
                    Some((lefts, paired)) => {
                        *paired = true;
                        if self.emit_paired {
                            lefts.clone()
                        } else {
                            Vec::new()
                        }
                    }
                    None => {
                        if self.emit_unpaired_right {
                            out.push(StreamItem::Record(rec));
                        }
                        return Ok(());
                    }
                };
                for left in &lefts {
                    out.push(StreamItem::Record(self.pair(left, &rec, &key)));
                }
            }
            StreamItem::End => {
                if self.emit_unpaired_left {
                    for (_, (lefts, paired)) in self.buckets.drain(..) {
                        if !paired {
                            for rec in lefts {
                                out.push(StreamItem::Record(rec));
                            }
                        }
                    }
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;
    use std::io::Write as _;

    fn left_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn run(argv: Vec<String>, rights: Vec<Record>) -> Vec<Record> {
        let mut verb = make_verb("join", argv, &Options::default()).unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for rec in rights {
            verb.process(StreamItem::Record(rec), &ctx, &mut out).unwrap();
        }
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        out.into_iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r),
                StreamItem::End => None,
            })
            .collect()
    }

    #[test]
    fn test_inner_join() {
        let f = left_file("id=1,name=ann\nid=2,name=bob\n");
        let out = run(
            vec!["-f".into(), f.path().to_str().unwrap().into(), "-j".into(), "id".into()],
            vec![
                Record::from_pairs([("id", "1"), ("x", "10")]),
                Record::from_pairs([("id", "3"), ("x", "30")]),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("id"), Some("1"));
        assert_eq!(out[0].get("name"), Some("ann"));
        assert_eq!(out[0].get("x"), Some("10"));
    }

    #[test]
    fn test_left_and_right_unpaired() {
        let f = left_file("id=1,name=ann\nid=2,name=bob\n");
        let out = run(
            vec![
                "-f".into(),
                f.path().to_str().unwrap().into(),
                "-j".into(),
                "id".into(),
                "--np".into(),
                "--ul".into(),
                "--ur".into(),
            ],
            vec![
                Record::from_pairs([("id", "1"), ("x", "10")]),
                Record::from_pairs([("id", "3"), ("x", "30")]),
            ],
        );
        // unpaired right (id=3) streams through; unpaired left (id=2) at end
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("id"), Some("3"));
        assert_eq!(out[1].get("name"), Some("bob"));
    }

    #[test]
    fn test_renamed_join_fields() {
        let f = left_file("lid=1,name=ann\n");
        let out = run(
            vec![
                "-f".into(),
                f.path().to_str().unwrap().into(),
                "-j".into(),
                "id".into(),
                "-l".into(),
                "lid".into(),
                "-r".into(),
                "rid".into(),
            ],
            vec![Record::from_pairs([("rid", "1"), ("x", "10")])],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key_list(), vec!["id", "name", "x"]);
    }
}
