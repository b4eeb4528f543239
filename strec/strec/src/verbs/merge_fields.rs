//! `merge-fields`: horizontal accumulation within each record. Inputs are
//! chosen by exact names (`-f`), regexes (`-r`), or by collapsing away a
//! name substring (`-c`); outputs are `{name}_{accumulator}` fields. Input
//! fields are removed unless `-k` is given.

use indexmap::IndexMap;
use regex::Regex;

use super::stats::acc::{parse_acc_list, AccKind, AccSet};
use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

enum Selection {
    Names(Vec<String>, String),
    Patterns(Vec<Regex>, String),
    Collapse(Vec<String>),
}

pub struct MergeFields {
    accs: Vec<AccKind>,
    selection: Selection,
    keep_inputs: bool,
    ofmt: String,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut accs = Vec::new();
    let mut selection = None;
    let mut keep_inputs = false;
    let mut output_name = None;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-a" => accs = parse_acc_list(&args.list_value("-a")?)?,
            "-f" => selection = Some(("f", args.list_value("-f")?)),
            "-r" => selection = Some(("r", args.list_value("-r")?)),
            "-c" => selection = Some(("c", args.list_value("-c")?)),
            "-o" => output_name = Some(args.value("-o")?),
            "-k" => keep_inputs = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if accs.is_empty() {
        return Err(Error::usage("merge-fields: -a is required"));
    }
    let selection = match selection {
        Some(("f", names)) => {
            Selection::Names(names, output_name.unwrap_or_else(|| "out".to_string()))
        }
        Some(("r", patterns)) => {
            let mut regexes = Vec::new();
            for p in &patterns {
                regexes.push(Regex::new(p).map_err(|e| {
                    Error::usage(format!("merge-fields: bad regular expression: {e}"))
                })?);
            }
            Selection::Patterns(regexes, output_name.unwrap_or_else(|| "out".to_string()))
        }
        Some(("c", subs)) => Selection::Collapse(subs),
        _ => return Err(Error::usage("merge-fields: one of -f/-r/-c is required")),
    };
    Ok(Box::new(MergeFields {
        accs,
        selection,
        keep_inputs,
        ofmt: opts.writer.ofmt.clone(),
    }))
}

impl MergeFields {
    /// Group the record's fields into output-name buckets.
    fn buckets(&self, rec: &Record) -> IndexMap<String, Vec<String>> {
        let mut buckets: IndexMap<String, Vec<String>> = IndexMap::new();
        match &self.selection {
            Selection::Names(names, out) => {
                let matched: Vec<String> = rec
                    .keys()
                    .filter(|k| names.iter().any(|n| n == k))
                    .map(|k| k.to_string())
                    .collect();
                if !matched.is_empty() {
                    buckets.insert(out.clone(), matched);
                }
            }
            Selection::Patterns(regexes, out) => {
                let matched: Vec<String> = rec
                    .keys()
                    .filter(|k| regexes.iter().any(|re| re.is_match(k)))
                    .map(|k| k.to_string())
                    .collect();
                if !matched.is_empty() {
                    buckets.insert(out.clone(), matched);
                }
            }
            Selection::Collapse(subs) => {
                for key in rec.keys() {
                    for sub in subs {
                        if key.contains(sub.as_str()) {
                            let base = key.replacen(sub.as_str(), "", 1);
                            buckets.entry(base).or_default().push(key.to_string());
                            break;
                        }
                    }
                }
            }
        }
        buckets
    }
}

impl Verb for MergeFields {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                for (base, inputs) in self.buckets(&rec) {
                    let mut acc = AccSet::new(&self.accs);
                    for key in &inputs {
                        if let Some(text) = rec.get(key) {
                            acc.ingest(text);
                        }
                    }
                    if !self.keep_inputs {
                        for key in &inputs {
                            rec.remove(key);
                        }
                    }
                    for kind in &self.accs {
                        let value = acc.emit(kind);
                        rec.put(
                            format!("{base}_{}", kind.output_name()),
                            value.format(&self.ofmt),
                        );
                    }
                }
                out.push(StreamItem::Record(rec));
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
        let mut verb = make_verb("merge-fields", argv, &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(StreamItem::Record(rec), &Context::default(), &mut out)
            .unwrap();
        match out.into_iter().next().unwrap() {
            StreamItem::Record(r) => r,
            _ => panic!(),
        }
    }

    #[test]
    fn test_explicit_names() {
        let rec = run_one(
            vec![
                "-a".into(),
                "sum".into(),
                "-f".into(),
                "a,b".into(),
                "-o".into(),
                "ab".into(),
            ],
            Record::from_pairs([("a", "1"), ("b", "2"), ("c", "5")]),
        );
        assert_eq!(rec.key_list(), vec!["c", "ab_sum"]);
        assert_eq!(rec.get("ab_sum"), Some("3"));
    }

    #[test]
    fn test_collapse() {
        let rec = run_one(
            vec!["-a".into(), "sum".into(), "-c".into(), "_in,_out".into()],
            Record::from_pairs([
                ("x_in", "1"),
                ("x_out", "2"),
                ("y_in", "10"),
                ("y_out", "20"),
            ]),
        );
        assert_eq!(rec.get("x_sum"), Some("3"));
        assert_eq!(rec.get("y_sum"), Some("30"));
    }

    #[test]
    fn test_keep_inputs() {
        let rec = run_one(
            vec![
                "-k".into(),
                "-a".into(),
                "max".into(),
                "-f".into(),
                "a,b".into(),
            ],
            Record::from_pairs([("a", "1"), ("b", "2")]),
        );
        assert_eq!(rec.key_list(), vec!["a", "b", "out_max"]);
        assert_eq!(rec.get("out_max"), Some("2"));
    }
}
