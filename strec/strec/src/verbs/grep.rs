//! `grep`: regex-match against a DKVP-style rendering of each record
//! (default separators), independent of the actual output format. `-i`
//! matches case-insensitively, `-v` inverts.

use regex::RegexBuilder;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

pub struct Grep {
    pattern: regex::Regex,
    invert: bool,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut case_insensitive = false;
    let mut invert = false;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-i" => case_insensitive = true,
            "-v" => invert = true,
            other => return Err(args.unknown_flag(other)),
        }
    }
    let pattern = args.positional("regular expression")?;
    let pattern = RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| Error::usage(format!("grep: bad regular expression: {e}")))?;
    Ok(Box::new(Grep { pattern, invert }))
}

fn render(rec: &Record) -> String {
    let mut s = String::new();
    for (i, (k, v)) in rec.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        s.push_str(k);
        s.push('=');
        s.push_str(v);
    }
    s
}

impl Verb for Grep {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                if self.pattern.is_match(&render(&rec)) != self.invert {
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

    fn keeps(argv: Vec<String>, rec: Record) -> bool {
        let mut verb = make_verb("grep", argv, &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(StreamItem::Record(rec), &Context::default(), &mut out)
            .unwrap();
        !out.is_empty()
    }

    #[test]
    fn test_matches_rendered_pairs() {
        assert!(keeps(
            vec!["a=1".into()],
            Record::from_pairs([("a", "1"), ("b", "2")])
        ));
        assert!(!keeps(
            vec!["a=2".into()],
            Record::from_pairs([("a", "1"), ("b", "2")])
        ));
    }

    #[test]
    fn test_invert_and_case() {
        assert!(keeps(
            vec!["-v".into(), "x".into()],
            Record::from_pairs([("a", "1")])
        ));
        assert!(keeps(
            vec!["-i".into(), "HELLO".into()],
            Record::from_pairs([("greeting", "hello")])
        ));
    }
}
