//! `sec2gmt` / `sec2gmtdate`: convert epoch-seconds fields to GMT
//! timestamps or dates. Non-numeric values pass through untouched.

use chrono::{DateTime, Utc};

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::value::{infer_number, Num};

pub struct Sec2Gmt {
    fields: Vec<String>,
    date_only: bool,
}

pub fn parse_sec2gmt(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    parse_common(args, false)
}

pub fn parse_sec2gmtdate(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    parse_common(args, true)
}

fn parse_common(args: &mut VerbArgs, date_only: bool) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    let fields = args
        .positional("comma-separated field list")?
        .split(',')
        .map(|s| s.to_string())
        .collect();
    Ok(Box::new(Sec2Gmt { fields, date_only }))
}

pub(crate) fn sec2gmt_string(seconds: f64, date_only: bool) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(seconds.floor() as i64, 0)?;
    Some(if date_only {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    })
}

impl Verb for Sec2Gmt {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                for field in &self.fields {
                    let Some(text) = rec.get(field) else {
                        continue;
                    };
                    let seconds = match infer_number(text) {
                        Some(Num::Int(i)) => i as f64,
                        Some(Num::Float(f)) => f,
                        None => continue,
                    };
                    if let Some(formatted) = sec2gmt_string(seconds, self.date_only) {
                        rec.put(field.clone(), formatted);
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

    #[test]
    fn test_timestamp_and_date() {
        let mut verb = make_verb("sec2gmt", vec!["t".into()], &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("t", "0"), ("x", "keep")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        match &out[0] {
            StreamItem::Record(r) => {
                assert_eq!(r.get("t"), Some("1970-01-01T00:00:00Z"));
                assert_eq!(r.get("x"), Some("keep"));
            }
            _ => panic!(),
        }

        let mut verb = make_verb("sec2gmtdate", vec!["t".into()], &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("t", "86400")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        match &out[0] {
            StreamItem::Record(r) => assert_eq!(r.get("t"), Some("1970-01-02")),
            _ => panic!(),
        }
    }

    #[test]
    fn test_non_numeric_passes_through() {
        let mut verb = make_verb("sec2gmt", vec!["t".into()], &Options::default()).unwrap();
        let mut out = Vec::new();
        verb.process(
            StreamItem::Record(Record::from_pairs([("t", "hello")])),
            &Context::default(),
            &mut out,
        )
        .unwrap();
        match &out[0] {
            StreamItem::Record(r) => assert_eq!(r.get("t"), Some("hello")),
            _ => panic!(),
        }
    }
}
