//! `histogram`: bin numeric fields between `--lo` and `--hi` into
//! `--nbins` equal-width bins; one output record per bin at end of stream.
//! Out-of-range values are ignored.

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;
use crate::value::{infer_number, Num};

pub struct Histogram {
    fields: Vec<String>,
    lo: f64,
    hi: f64,
    nbins: usize,
    counts: Vec<Vec<u64>>, // per field, per bin
}

pub fn parse(args: &mut VerbArgs, _opts: &Options) -> Result<Box<dyn Verb>> {
    let mut fields = Vec::new();
    let mut lo = 0.0;
    let mut hi = 100.0;
    let mut nbins = 20;
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-f" => fields = args.list_value("-f")?,
            "--lo" => lo = args.float_value("--lo")?,
            "--hi" => hi = args.float_value("--hi")?,
            "--nbins" => nbins = args.int_value("--nbins")?.max(1) as usize,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if fields.is_empty() {
        return Err(Error::usage("histogram: -f is required"));
    }
    if hi <= lo {
        return Err(Error::usage("histogram: --hi must exceed --lo"));
    }
    let counts = vec![vec![0; nbins]; fields.len()];
    Ok(Box::new(Histogram {
        fields,
        lo,
        hi,
        nbins,
        counts,
    }))
}

impl Verb for Histogram {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                for (fi, field) in self.fields.iter().enumerate() {
                    let Some(x) = rec.get(field).and_then(infer_number) else {
                        continue;
                    };
                    let x = match x {
                        Num::Int(i) => i as f64,
                        Num::Float(f) => f,
                    };
                    if x < self.lo || x > self.hi {
                        continue;
                    }
                    let width = (self.hi - self.lo) / self.nbins as f64;
                    let mut bin = ((x - self.lo) / width) as usize;
                    if bin == self.nbins {
                        bin -= 1; // x == hi lands in the last bin
                    }
                    self.counts[fi][bin] += 1;
                }
            }
            StreamItem::End => {
                let width = (self.hi - self.lo) / self.nbins as f64;
                for bin in 0..self.nbins {
                    let mut rec = Record::new();
                    rec.put("bin_lo", fmt_bound(self.lo + bin as f64 * width));
                    rec.put("bin_hi", fmt_bound(self.lo + (bin + 1) as f64 * width));
                    for (fi, field) in self.fields.iter().enumerate() {
                        rec.put(format!("{field}_count"), self.counts[fi][bin].to_string());
                    }
                    out.push(StreamItem::Record(rec));
                }
                out.push(StreamItem::End);
            }
        }
        Ok(())
    }
}

fn fmt_bound(x: f64) -> String {
    if x == x.floor() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::super::make_verb;
    use super::*;

    #[test]
    fn test_binning() {
        let mut verb = make_verb(
            "histogram",
            vec![
                "-f".into(),
                "x".into(),
                "--lo".into(),
                "0".into(),
                "--hi".into(),
                "4".into(),
                "--nbins".into(),
                "2".into(),
            ],
            &Options::default(),
        )
        .unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for v in ["0", "1", "3", "4", "9"] {
            verb.process(
                StreamItem::Record(Record::from_pairs([("x", v)])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        let recs: Vec<&Record> = out
            .iter()
            .filter_map(|it| match it {
                StreamItem::Record(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get("bin_lo"), Some("0"));
        assert_eq!(recs[0].get("x_count"), Some("2"));
        // 3, plus 4 landing inclusively in the last bin; 9 ignored
        assert_eq!(recs[1].get("x_count"), Some("2"));
    }
}
