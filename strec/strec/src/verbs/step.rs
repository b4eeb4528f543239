//! `step`: per-record derived columns from the previous record's values:
//! `delta`, `shift`, `from-first`, `ratio`, `counter`, `rsum`, computed per
//! group under `-g`.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::value::{self, Value};

#[derive(Clone, Copy, PartialEq)]
enum Stepper {
    Delta,
    Shift,
    FromFirst,
    Ratio,
    Counter,
    Rsum,
}

fn stepper_of(name: &str) -> Option<Stepper> {
    Some(match name {
        "delta" => Stepper::Delta,
        "shift" => Stepper::Shift,
        "from-first" => Stepper::FromFirst,
        "ratio" => Stepper::Ratio,
        "counter" => Stepper::Counter,
        "rsum" => Stepper::Rsum,
        _ => return None,
    })
}

fn stepper_name(s: Stepper) -> &'static str {
    match s {
        Stepper::Delta => "delta",
        Stepper::Shift => "shift",
        Stepper::FromFirst => "from_first",
        Stepper::Ratio => "ratio",
        Stepper::Counter => "counter",
        Stepper::Rsum => "rsum",
    }
}

#[derive(Default)]
struct FieldState {
    prev: Option<Value>,
    first: Option<Value>,
    counter: u64,
    rsum: Value,
}

pub struct Step {
    steppers: Vec<Stepper>,
    fields: Vec<String>,
    group_by: Vec<String>,
    states: IndexMap<(Vec<String>, String), FieldState>,
    ofmt: String,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut steppers = Vec::new();
    let mut fields = Vec::new();
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-a" => {
                for name in args.list_value("-a")? {
                    steppers.push(stepper_of(&name).ok_or_else(|| {
                        Error::usage(format!("step: unknown stepper '{name}'"))
                    })?);
                }
            }
            "-f" => fields = args.list_value("-f")?,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if steppers.is_empty() || fields.is_empty() {
        return Err(Error::usage("step: -a and -f are required"));
    }
    Ok(Box::new(Step {
        steppers,
        fields,
        group_by,
        states: IndexMap::new(),
        ofmt: opts.writer.ofmt.clone(),
    }))
}

impl Verb for Step {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(mut rec) => {
                let key: Vec<String> = self
                    .group_by
                    .iter()
                    .filter_map(|f| rec.get(f).map(|v| v.to_string()))
                    .collect();
                for field in &self.fields {
                    let Some(text) = rec.get(field) else { continue };
                    let cur = Value::from_field(text);
                    let state = self
                        .states
                        .entry((key.clone(), field.clone()))
                        .or_default();
                    state.counter += 1;
                    state.rsum = value::add(&state.rsum, &cur);
                    if state.first.is_none() {
                        state.first = Some(cur.clone());
                    }

                    for stepper in &self.steppers {
                        let name = format!("{field}_{}", stepper_name(*stepper));
                        let out_value = match stepper {
                            Stepper::Delta => match &state.prev {
                                Some(prev) => value::subtract(&cur, prev),
                                None => Value::Int(0),
                            },
                            Stepper::Shift => match &state.prev {
                                Some(prev) => prev.clone(),
                                None => Value::Empty,
                            },
                            Stepper::FromFirst => {
                                value::subtract(&cur, state.first.as_ref().unwrap())
                            }
                            Stepper::Ratio => match &state.prev {
                                Some(prev) => value::divide(&cur, prev),
                                None => Value::Empty,
                            },
                            Stepper::Counter => Value::Int(state.counter as i64),
                            Stepper::Rsum => state.rsum.clone(),
                        };
                        rec.put(name, out_value.format(&self.ofmt));
                    }
                    state.prev = Some(cur);
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
    fn test_delta_shift_rsum() {
        let mut verb = make_verb(
            "step",
            vec!["-a".into(), "delta,shift,rsum".into(), "-f".into(), "x".into()],
            &Options::default(),
        )
        .unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for v in ["3", "5", "4"] {
            verb.process(
                StreamItem::Record(Record::from_pairs([("x", v)])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        let recs: Vec<&Record> = out
            .iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(recs[0].get("x_delta"), Some("0"));
        assert_eq!(recs[0].get("x_shift"), Some(""));
        assert_eq!(recs[0].get("x_rsum"), Some("3"));
        assert_eq!(recs[1].get("x_delta"), Some("2"));
        assert_eq!(recs[1].get("x_shift"), Some("3"));
        assert_eq!(recs[2].get("x_delta"), Some("-1"));
        assert_eq!(recs[2].get("x_rsum"), Some("12"));
    }
}
