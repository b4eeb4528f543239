//! `having-fields`: pass records by a boolean test on which keys are
//! present.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

enum Criterion {
    /// all listed fields present
    AtLeast(Vec<String>),
    /// record keys are a subset of the listed fields
    AtMost(Vec<String>),
    /// all listed fields present with non-empty values
    AllDefined(Vec<String>),
    /// at least one listed field present with a non-empty value
    AnyDefined(Vec<String>),
    /// none of the listed fields present
    NoneDefined(Vec<String>),
}

pub struct HavingFields {
    criterion: Criterion,
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut criterion = None;
    while let Some(flag) = args.next_flag() {
        let list = args.list_value(&flag)?;
        criterion = Some(match flag.as_str() {
            "--at-least" => Criterion::AtLeast(list),
            "--at-most" => Criterion::AtMost(list),
            "--all-defined" => Criterion::AllDefined(list),
            "--any-defined" => Criterion::AnyDefined(list),
            "--none-defined" => Criterion::NoneDefined(list),
            other => return Err(args.unknown_flag(other)),
        });
    }
    let criterion =
        criterion.ok_or_else(|| Error::usage("having-fields: a criterion flag is required"))?;
    Ok(Box::new(HavingFields { criterion }))
}

fn defined(rec: &Record, field: &str) -> bool {
    rec.get(field).is_some_and(|v| !v.is_empty())
}

impl HavingFields {
    fn keep(&self, rec: &Record) -> bool {
        match &self.criterion {
            Criterion::AtLeast(fields) => fields.iter().all(|f| rec.contains_key(f)),
            Criterion::AtMost(fields) => rec.keys().all(|k| fields.iter().any(|f| f == k)),
            Criterion::AllDefined(fields) => fields.iter().all(|f| defined(rec, f)),
            Criterion::AnyDefined(fields) => fields.iter().any(|f| defined(rec, f)),
            Criterion::NoneDefined(fields) => !fields.iter().any(|f| rec.contains_key(f)),
        }
    }
}

impl Verb for HavingFields {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                if self.keep(&rec) {
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
        let mut verb = make_verb("having-fields", argv, &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(StreamItem::Record(rec), &Context::default(), &mut out)
            .unwrap();
        !out.is_empty()
    }

    #[test]
    fn test_criteria() {
        let rec = Record::from_pairs([("a", "1"), ("b", "")]);
        assert!(keeps(vec!["--at-least".into(), "a,b".into()], rec.clone()));
        assert!(!keeps(vec!["--at-least".into(), "a,c".into()], rec.clone()));
        assert!(keeps(vec!["--at-most".into(), "a,b,c".into()], rec.clone()));
        assert!(!keeps(vec!["--all-defined".into(), "a,b".into()], rec.clone()));
        assert!(keeps(vec!["--any-defined".into(), "a,b".into()], rec.clone()));
        assert!(keeps(vec!["--none-defined".into(), "x,y".into()], rec));
    }
}
