//! `rename`: per-key pairs (`old,new,old,new,...`), or `-r` for
//! regex-to-replacement with `\1`..`\9` captures (`-g` replaces every match
//! within a name). Regex renames apply in field-iteration order.

use regex::Regex;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;

enum Mode {
    Pairs(Vec<(String, String)>),
    Regex {
        pattern: Regex,
        replacement: String,
        global: bool,
    },
}

pub struct Rename {
    mode: Mode,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut use_regex = false;
    let mut global = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-r" => use_regex = true,
            "-g" => global = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    let spec = args.positional("rename list")?;

    let mode = if use_regex {
        let (pattern, replacement) = spec.split_once(',').unwrap_or((spec.as_str(), ""));
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::usage(format!("rename: bad regular expression: {e}")))?;
        Mode::Regex {
            pattern,
            replacement: replacement.to_string(),
            global,
        }
    } else {
        let parts: Vec<&str> = spec.split(',').collect();
        if parts.len() % 2 != 0 || parts.is_empty() {
            return Err(Error::usage(
                "rename: name list must have an even number of comma-separated entries",
            ));
        }
        Mode::Pairs(
            parts
                .chunks(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect(),
        )
    };
    Ok(Box::new(Rename { mode }))
}

impl Verb for Rename {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                match &self.mode {
                    Mode::Pairs(pairs) => {
                        for (old, new) in pairs {
                            rec.rename(old, new);
                        }
                    }
                    Mode::Regex {
                        pattern,
                        replacement,
                        global,
                    } => {
                        rec.rename_regex(pattern, replacement, *global);
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
    use crate::record::Record;

    fn run_one(argv: Vec<String>, rec: Record) -> Record {
        let mut verb = make_verb("rename", argv, &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(StreamItem::Record(rec), &Context::default(), &mut out)
            .unwrap();
        match out.into_iter().next().unwrap() {
            StreamItem::Record(r) => r,
            _ => panic!(),
        }
    }

    #[test]
    fn test_pairwise() {
        let rec = run_one(
            vec!["a,x,b,y".into()],
            Record::from_pairs([("a", "1"), ("b", "2"), ("c", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["x", "y", "c"]);
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let rec0 = Record::from_pairs([("a", "1"), ("b", "2")]);
        let once = run_one(vec!["a,b,b,a".into()], rec0.clone());
        let twice = run_one(vec!["a,b,b,a".into()], once);
        assert_eq!(twice.key_list(), rec0.key_list());
    }

    #[test]
    fn test_regex_rename() {
        let rec = run_one(
            vec!["-r".into(), "^t_(.*)$,\\1".into()],
            Record::from_pairs([("t_a", "1"), ("t_b", "2"), ("z", "3")]),
        );
        assert_eq!(rec.key_list(), vec!["a", "b", "z"]);
    }
}
