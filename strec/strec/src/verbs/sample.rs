//! The randomized verbs: `sample` (reservoir sampling of `-k` records per
//! group), `shuffle` (buffer-all permutation) and `bootstrap` (resample with
//! replacement).

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::Result;
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;

struct Reservoir {
    seen: u64,
    kept: Vec<Record>,
}

pub struct Sample {
    k: usize,
    group_by: Vec<String>,
    reservoirs: IndexMap<Vec<String>, Reservoir>,
}

pub fn parse_sample(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut k = 1;
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-k" => k = args.int_value("-k")?.max(0) as usize,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Sample {
        k,
        group_by,
        reservoirs: IndexMap::new(),
    }))
}

impl Verb for Sample {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let key: Vec<String> = self
                    .group_by
                    .iter()
                    .filter_map(|f| rec.get(f).map(|v| v.to_string()))
                    .collect();
                let res = self.reservoirs.entry(key).or_insert_with(|| Reservoir {
                    seen: 0,
                    kept: Vec::new(),
                });
                res.seen += 1;
                if res.kept.len() < self.k {
                    res.kept.push(rec);
                } else if self.k > 0 {
                    let j = rand::thread_rng().gen_range(0..res.seen);
                    if (j as usize) < self.k {
                        res.kept[j as usize] = rec;
                    }
                }
            }
            StreamItem::End => {
                for (_, res) in self.reservoirs.drain(..) {
                    for rec in res.kept {
                        out.push(StreamItem::Record(rec));
                    }
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

pub struct Shuffle {
    buffer: Vec<Record>,
}

pub fn parse_shuffle(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    if let Some(flag) = args.next_flag() {
        return Err(args.unknown_flag(&flag));
    }
    Ok(Box::new(Shuffle { buffer: Vec::new() }))
}

impl Verb for Shuffle {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => self.buffer.push(rec),
            StreamItem::End => {
                self.buffer.shuffle(&mut rand::thread_rng());
                for rec in self.buffer.drain(..) {
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

pub struct Bootstrap {
    n: Option<usize>,
    buffer: Vec<Record>,
}

pub fn parse_bootstrap(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut n = None;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-n" => n = Some(args.int_value("-n")?.max(0) as usize),
            other => return Err(args.unknown_flag(other)),
        }
    }
    Ok(Box::new(Bootstrap {
        n,
        buffer: Vec::new(),
    }))
}

impl Verb for Bootstrap {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => self.buffer.push(rec),
            StreamItem::End => {
                let n = self.n.unwrap_or(self.buffer.len());
                if !self.buffer.is_empty() {
                    let mut rng = rand::thread_rng();
                    for _ in 0..n {
                        let j = rng.gen_range(0..self.buffer.len());
                        out.push(StreamItem::Record(self.buffer[j].clone()));
                    }
                }
                self.buffer.clear();
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

    fn records(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::from_pairs([("i", i.to_string().as_str())]))
            .collect()
    }

    fn run(verb: &mut dyn Verb, recs: Vec<Record>) -> Vec<Record> {
        let ctx = Context::default();
        let mut out = Vec::new();
        for rec in recs {
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
    fn test_sample_size_is_bounded() {
        let mut verb =
            make_verb("sample", vec!["-k".into(), "3".into()], &Options::default()).unwrap();
        let out = run(verb.as_mut(), records(50));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut verb = make_verb("shuffle", vec![], &Options::default()).unwrap();
        let out = run(verb.as_mut(), records(20));
        assert_eq!(out.len(), 20);
        let mut seen: Vec<i64> = out
            .iter()
            .map(|r| r.get("i").unwrap().parse().unwrap())
            .collect();
        seen.sort();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_bootstrap_default_size() {
        let mut verb = make_verb("bootstrap", vec![], &Options::default()).unwrap();
        let out = run(verb.as_mut(), records(10));
        assert_eq!(out.len(), 10);
    }
}
