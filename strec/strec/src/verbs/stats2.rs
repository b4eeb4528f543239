//! `stats2`: bivariate statistics over field pairs: `corr`, `cov`, `r2`,
//! `linreg-ols`, `linreg-pca`. Fields come in pairs on `-f x,y,x2,y2,...`;
//! a record contributes to a pair only when both values are numeric.

use indexmap::IndexMap;

use super::{Verb, VerbArgs};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;
use crate::record::Record;
use crate::value::{format_float, infer_number, Num};

#[derive(Clone, Copy, PartialEq)]
enum Stat2 {
    Corr,
    Cov,
    R2,
    LinregOls,
    LinregPca,
}

fn stat2_of(name: &str) -> Option<Stat2> {
    Some(match name {
        "corr" => Stat2::Corr,
        "cov" => Stat2::Cov,
        "r2" => Stat2::R2,
        "linreg-ols" => Stat2::LinregOls,
        "linreg-pca" => Stat2::LinregPca,
        _ => return None,
    })
}

#[derive(Default, Clone)]
struct PairSums {
    n: u64,
    sumx: f64,
    sumy: f64,
    sumxy: f64,
    sumx2: f64,
    sumy2: f64,
}

impl PairSums {
    fn ingest(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sumx += x;
        self.sumy += y;
        self.sumxy += x * y;
        self.sumx2 += x * x;
        self.sumy2 += y * y;
    }

    fn corr(&self) -> Option<f64> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let num = n * self.sumxy - self.sumx * self.sumy;
        let den =
            ((n * self.sumx2 - self.sumx * self.sumx) * (n * self.sumy2 - self.sumy * self.sumy))
                .sqrt();
        if den == 0.0 {
            None
        } else {
            Some(num / den)
        }
    }

    fn cov(&self) -> Option<f64> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        Some((self.sumxy - self.sumx * self.sumy / n) / (n - 1.0))
    }

    fn ols(&self) -> Option<(f64, f64)> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let den = n * self.sumx2 - self.sumx * self.sumx;
        if den == 0.0 {
            return None;
        }
        let m = (n * self.sumxy - self.sumx * self.sumy) / den;
        let b = (self.sumy - m * self.sumx) / n;
        Some((m, b))
    }

    fn pca(&self) -> Option<(f64, f64)> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let xbar = self.sumx / n;
        let ybar = self.sumy / n;
        let varx = self.sumx2 / n - xbar * xbar;
        let vary = self.sumy2 / n - ybar * ybar;
        let covxy = self.sumxy / n - xbar * ybar;
        if covxy == 0.0 {
            return None;
        }
        let lambda =
            ((varx + vary) + ((varx - vary) * (varx - vary) + 4.0 * covxy * covxy).sqrt()) / 2.0;
        // slope of the principal axis through the centroid
        let m = (lambda - varx) / covxy;
        let b = ybar - m * xbar;
        Some((m, b))
    }
}

pub struct Stats2 {
    stats: Vec<Stat2>,
    pairs: Vec<(String, String)>,
    group_by: Vec<String>,
    ofmt: String,
    groups: IndexMap<Vec<String>, Vec<PairSums>>,
}

pub fn parse(args: &mut VerbArgs, opts: &Options) -> Result<Box<dyn Verb>> {
    let mut stats = Vec::new();
    let mut fields = Vec::new();
    let mut group_by = Vec::new();
    while let Some(flag) = args.next_flag() {
        match flag.as_str() {
            "-a" => {
                for name in args.list_value("-a")? {
                    stats.push(
                        stat2_of(&name)
                            .ok_or_else(|| Error::usage(format!("stats2: unknown statistic '{name}'")))?,
                    );
                }
            }
            "-f" => fields = args.list_value("-f")?,
            "-g" => group_by = args.list_value("-g")?,
            other => return Err(args.unknown_flag(other)),
        }
    }
    if stats.is_empty() || fields.is_empty() {
        return Err(Error::usage("stats2: -a and -f are required"));
    }
    if fields.len() % 2 != 0 {
        return Err(Error::usage("stats2: -f takes field pairs"));
    }
    let pairs = fields
        .chunks(2)
        .map(|c| (c[0].clone(), c[1].clone()))
        .collect();
    Ok(Box::new(Stats2 {
        stats,
        pairs,
        group_by,
        ofmt: opts.writer.ofmt.clone(),
        groups: IndexMap::new(),
    }))
}

impl Stats2 {
    fn put_opt(&self, rec: &mut Record, name: String, value: Option<f64>) {
        match value {
            Some(x) => rec.put(name, format_float(&self.ofmt, x)),
            None => rec.put(name, ""),
        }
    }
}

impl Verb for Stats2 {
    fn process(
        &mut self,
        item: StreamItem,
        _ctx: &Context,
        out: &mut Vec<StreamItem>,
    ) -> Result<()> {
        match item {
            StreamItem::Record(rec) => {
                let mut key = Vec::with_capacity(self.group_by.len());
                for f in &self.group_by {
                    match rec.get(f) {
                        Some(v) => key.push(v.to_string()),
                        None => return Ok(()),
                    }
                }
                let npairs = self.pairs.len();
                let sums = self
                    .groups
                    .entry(key)
                    .or_insert_with(|| vec![PairSums::default(); npairs]);
                for (pi, (fx, fy)) in self.pairs.iter().enumerate() {
                    let x = rec.get(fx).and_then(infer_number);
                    let y = rec.get(fy).and_then(infer_number);
                    if let (Some(x), Some(y)) = (x, y) {
                        let xf = match x {
                            Num::Int(i) => i as f64,
                            Num::Float(f) => f,
                        };
                        let yf = match y {
                            Num::Int(i) => i as f64,
                            Num::Float(f) => f,
                        };
                        sums[pi].ingest(xf, yf);
                    }
                }
            }
            StreamItem::End => {
                for (key, sums) in self.groups.drain(..).collect::<Vec<_>>() {
                    let mut rec = Record::new();
                    for (f, v) in self.group_by.iter().zip(key) {
                        rec.put(f.clone(), v);
                    }
                    for ((fx, fy), ps) in self.pairs.iter().zip(&sums) {
                        let prefix = format!("{fx}_{fy}");
                        for stat in &self.stats {
                            match stat {
                                Stat2::Corr => {
                                    self.put_opt(&mut rec, format!("{prefix}_corr"), ps.corr());
                                }
                                Stat2::Cov => {
                                    self.put_opt(&mut rec, format!("{prefix}_cov"), ps.cov());
                                }
                                Stat2::R2 => {
                                    self.put_opt(
                                        &mut rec,
                                        format!("{prefix}_r2"),
                                        ps.corr().map(|r| r * r),
                                    );
                                }
                                Stat2::LinregOls => {
                                    let mb = ps.ols();
                                    self.put_opt(
                                        &mut rec,
                                        format!("{prefix}_m"),
                                        mb.map(|(m, _)| m),
                                    );
                                    self.put_opt(
                                        &mut rec,
                                        format!("{prefix}_b"),
                                        mb.map(|(_, b)| b),
                                    );
                                    rec.put(format!("{prefix}_n"), ps.n.to_string());
                                }
                                Stat2::LinregPca => {
                                    let mb = ps.pca();
                                    self.put_opt(
                                        &mut rec,
                                        format!("{prefix}_pca_m"),
                                        mb.map(|(m, _)| m),
                                    );
                                    self.put_opt(
                                        &mut rec,
                                        format!("{prefix}_pca_b"),
                                        mb.map(|(_, b)| b),
                                    );
                                    rec.put(format!("{prefix}_pca_n"), ps.n.to_string());
                                }
                            }
                        }
                    }
                    out.push(StreamItem::Record(rec));
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

    #[test]
    fn test_perfect_line() {
        let mut verb = make_verb(
            "stats2",
            vec![
                "-a".into(),
                "corr,linreg-ols".into(),
                "-f".into(),
                "x,y".into(),
            ],
            &Options::default(),
        )
        .unwrap();
        let ctx = Context::default();
        let mut out = Vec::new();
        for (x, y) in [(1, 3), (2, 5), (3, 7)] {
            verb.process(
                StreamItem::Record(Record::from_pairs([
                    ("x", x.to_string().as_str()),
                    ("y", y.to_string().as_str()),
                ])),
                &ctx,
                &mut out,
            )
            .unwrap();
        }
        verb.process(StreamItem::End, &ctx, &mut out).unwrap();
        let rec = match &out[0] {
            StreamItem::Record(r) => r,
            _ => panic!(),
        };
        // y = 2x + 1 exactly
        assert_eq!(rec.get("x_y_corr"), Some("1.000000"));
        assert_eq!(rec.get("x_y_m"), Some("2.000000"));
        assert_eq!(rec.get("x_y_b"), Some("1.000000"));
        assert_eq!(rec.get("x_y_n"), Some("3"));
    }
}
