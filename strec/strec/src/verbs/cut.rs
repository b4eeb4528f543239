//! `cut`: keep the listed fields (or drop them with `-c`). `-o` emits the
//! kept fields in the order given rather than record order; `-r` treats the
//! list entries as regular expressions.

use regex::Regex;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Cut {
    fields: Vec<String>,
    patterns: Vec<Regex>,
    complement: bool,
    ordered: bool,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut fields = Vec::new();
    let mut complement = false;
    let mut ordered = false;
    let mut use_regex = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => fields = args.list_value("-f")?,
            "-c" => complement = true,
            "-o" => ordered = true,
            "-r" => use_regex = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if fields.is_empty() {
        return Err(Error::usage("cut: -f is required"));
    }
    let mut patterns = Vec::new();
    if use_regex {
        for f in &fields {
            patterns.push(
                Regex::new(f)
                    .map_err(|e| Error::usage(format!("cut: bad regular expression: {e}")))?,
            );
        }
    }
    Ok(Box::new(Cut {
        fields,
        patterns,
        complement,
        ordered,
    }))
}

impl Cut {
    fn selected(&self, key: &str) -> bool {
        if self.patterns.is_empty() {
            self.fields.iter().any(|f| f == key)
        } else {
            self.patterns.iter().any(|p| p.is_match(key))
        }
    }
}

impl Verb for Cut {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                if self.ordered && !self.complement && self.patterns.is_empty() {
                    let mut picked = Record::new();
                    for f in &self.fields {
                        if let Some(v) = rec.get(f) {
                            picked.put(f.clone(), v.to_string());
                        }
                    }
                    out.push(StreamItem::Record(picked));
                } else {
                    let complement = self.complement;
                    let keep: Vec<String> = rec
                        .keys()
                        .filter(|k| self.selected(k) != complement)
                        .map(|k| k.to_string())
                        .collect();
                    rec.retain(|k| keep.iter().any(|f| f == k));
                    out.push(StreamItem::Record(rec));
                }
            }
            end => out.push(end),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    fn run_one(argv: Vec<String>, rec: Record) -> Record {
        let mut verb = make_verb("cut", argv, &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(StreamItem::Record(rec), &Context::default(), &mut out)
            .unwrap();
        match out.into_iter().next().unwrap() {
            StreamItem::Record(r) => r,
            _ => panic!(),
        }
    }

    #[test]
    fn test_keep_in_record_order() {
        let rec = run_one(
            vec!["-f".into(), "c,a".into()],
            Record::from_pairs([("a", "1"), ("b", "2"), ("c", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["a", "c"]);
    }

    #[test]
    fn test_ordered_output() {
        let rec = run_one(
            vec!["-o".into(), "-f".into(), "c,a".into()],
            Record::from_pairs([("a", "1"), ("b", "2"), ("c", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["c", "a"]);
    }

    #[test]
    fn test_complement() {
        let rec = run_one(
            vec!["-c".into(), "-f".into(), "b".into()],
            Record::from_pairs([("a", "1"), ("b", "2"), ("c", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["a", "c"]);
    }

    #[test]
    fn test_regex_selection() {
        let rec = run_one(
            vec!["-r".into(), "-f".into(), "^x_".into()],
            Record::from_pairs([("x_a", "1"), ("y_b", "2"), ("x_c", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["x_a", "x_c"]);
    }
}
