//! The accumulator bundle shared by `stats1` and `merge-fields`.
//!
//! One [AccSet] exists per (group, value-field). All percentile requests
//! share the single sorted keeper, so `p10,p50,p90` costs one buffer. Ties
//! in `mode` go to the first-seen value. Values are ingested when present
//! and non-empty; `sum` and friends follow the value model's arithmetic, so
//! non-numeric text poisons them to the error value rather than aborting
//! the stream.

use indexmap::IndexMap;

use crate::errors::{Error, Result};
use crate::value::{self, compare, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum AccKind {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Var,
    Stddev,
    MeanEb,
    Mode,
    Percentile(f64),
}

impl AccKind {
    pub fn from_name(name: &str) -> Result<AccKind> {
        Ok(match name {
            "count" => AccKind::Count,
            "sum" => AccKind::Sum,
            "mean" => AccKind::Mean,
            "min" => AccKind::Min,
            "max" => AccKind::Max,
            "var" => AccKind::Var,
            "stddev" => AccKind::Stddev,
            "meaneb" => AccKind::MeanEb,
            "mode" => AccKind::Mode,
            _ => {
                if let Some(digits) = name.strip_prefix('p') {
                    if let Ok(p) = digits.parse::<f64>() {
                        if (0.0..=100.0).contains(&p) {
                            return Ok(AccKind::Percentile(p));
                        }
                    }
                }
                return Err(Error::usage(format!("unknown accumulator '{name}'")));
            }
        })
    }

    /// The `{field}_{name}` suffix in output records.
    pub fn output_name(&self) -> String {
        match self {
            AccKind::Count => "count".to_string(),
            AccKind::Sum => "sum".to_string(),
            AccKind::Mean => "mean".to_string(),
            AccKind::Min => "min".to_string(),
            AccKind::Max => "max".to_string(),
            AccKind::Var => "var".to_string(),
            AccKind::Stddev => "stddev".to_string(),
            AccKind::MeanEb => "meaneb".to_string(),
            AccKind::Mode => "mode".to_string(),
            AccKind::Percentile(p) => {
                if *p == p.floor() {
                    format!("p{}", *p as i64)
                } else {
                    format!("p{p}")
                }
            }
        }
    }
}

pub fn parse_acc_list(names: &[String]) -> Result<Vec<AccKind>> {
    names.iter().map(|n| AccKind::from_name(n)).collect()
}

/// Per-field statistics state. Construction notes which statistics are
/// wanted so the keeper is only kept when a percentile asks for it.
#[derive(Debug)]
pub struct AccSet {
    count: u64,
    sum: Value,
    sumsq: f64,
    sumf: f64,
    nf: u64,
    min: Value,
    max: Value,
    mode_counts: IndexMap<String, u64>,
    keeper: Option<Vec<Value>>,
    want_mode: bool,
}

impl AccSet {
    pub fn new(kinds: &[AccKind]) -> AccSet {
        let want_keeper = kinds.iter().any(|k| matches!(k, AccKind::Percentile(_)));
        let want_mode = kinds.iter().any(|k| matches!(k, AccKind::Mode));
        AccSet {
            count: 0,
            sum: Value::Absent,
            sumsq: 0.0,
            sumf: 0.0,
            nf: 0,
            min: Value::Absent,
            max: Value::Absent,
            mode_counts: IndexMap::new(),
            keeper: if want_keeper { Some(Vec::new()) } else { None },
            want_mode,
        }
    }

    pub fn ingest(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.count += 1;
        let v = Value::from_field(text);
        self.sum = value::add(&self.sum, &v);
        if let Some(n) = v.numeric() {
            let x = match n {
                value::Num::Int(i) => i as f64,
                value::Num::Float(f) => f,
            };
            self.nf += 1;
            self.sumf += x;
            self.sumsq += x * x;
            if self.min.is_absent() || compare(&v, &self.min) == Some(std::cmp::Ordering::Less) {
                self.min = v.clone();
            }
            if self.max.is_absent() || compare(&v, &self.max) == Some(std::cmp::Ordering::Greater)
            {
                self.max = v.clone();
            }
            if let Some(keeper) = &mut self.keeper {
                keeper.push(v.clone());
            }
        }
        if self.want_mode {
            *self.mode_counts.entry(text.to_string()).or_insert(0) += 1;
        }
    }

    fn variance(&self) -> Option<f64> {
        if self.nf < 2 {
            return None;
        }
        let n = self.nf as f64;
        let mean = self.sumf / n;
        Some((self.sumsq - n * mean * mean) / (n - 1.0))
    }

    fn percentile(&mut self, p: f64) -> Value {
        let Some(keeper) = &mut self.keeper else {
            return Value::Error;
        };
        if keeper.is_empty() {
            return Value::Absent;
        }
        keeper.sort_by(|a, b| compare(a, b).unwrap_or(std::cmp::Ordering::Equal));
        let n = keeper.len();
        let mut idx = ((p / 100.0) * n as f64) as usize;
        if idx >= n {
            idx = n - 1;
        }
        keeper[idx].clone()
    }

    pub fn emit(&mut self, kind: &AccKind) -> Value {
        match kind {
            AccKind::Count => Value::Int(self.count as i64),
            AccKind::Sum => self.sum.clone(),
            AccKind::Mean => {
                if self.count == 0 {
                    Value::Absent
                } else {
                    value::divide(&self.sum, &Value::Int(self.count as i64))
                }
            }
            AccKind::Min => self.min.clone(),
            AccKind::Max => self.max.clone(),
            AccKind::Var => self.variance().map(Value::Float).unwrap_or(Value::Absent),
            AccKind::Stddev => self
                .variance()
                .map(|v| Value::Float(v.sqrt()))
                .unwrap_or(Value::Absent),
            AccKind::MeanEb => self
                .variance()
                .map(|v| Value::Float((v / self.nf as f64).sqrt()))
                .unwrap_or(Value::Absent),
            AccKind::Mode => {
                let mut best: Option<(&String, u64)> = None;
                for (value, count) in &self.mode_counts {
                    match best {
                        // strictly-greater keeps the first-seen winner on ties
                        Some((_, best_count)) if *count <= best_count => {}
                        _ => best = Some((value, *count)),
                    }
                }
                match best {
                    Some((value, _)) => Value::from_field(value),
                    None => Value::Absent,
                }
            }
            AccKind::Percentile(p) => self.percentile(*p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(kinds: &[AccKind], values: &[&str]) -> AccSet {
        let mut acc = AccSet::new(kinds);
        for v in values {
            acc.ingest(v);
        }
        acc
    }

    #[test]
    fn test_int_sum_stays_int() {
        let mut acc = set(&[AccKind::Sum], &["1", "3"]);
        assert_eq!(acc.emit(&AccKind::Sum), Value::Int(4));
    }

    #[test]
    fn test_mean_uses_exact_division() {
        let mut acc = set(&[AccKind::Mean], &["1", "3"]);
        assert_eq!(acc.emit(&AccKind::Mean), Value::Int(2));
        let mut acc = set(&[AccKind::Mean], &["1", "2"]);
        assert_eq!(acc.emit(&AccKind::Mean), Value::Float(1.5));
    }

    #[test]
    fn test_min_max_numeric() {
        let mut acc = set(&[AccKind::Min, AccKind::Max], &["10", "9", "2.5"]);
        assert_eq!(acc.emit(&AccKind::Min), Value::Float(2.5));
        assert_eq!(acc.emit(&AccKind::Max), Value::from_field("10"));
    }

    #[test]
    fn test_var_stddev() {
        let mut acc = set(&[AccKind::Var], &["1", "2", "3", "4"]);
        match acc.emit(&AccKind::Var) {
            Value::Float(v) => assert!((v - 5.0 / 3.0).abs() < 1e-12),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_mode_first_seen_tie() {
        let mut acc = set(&[AccKind::Mode], &["b", "a", "a", "b"]);
        assert_eq!(acc.emit(&AccKind::Mode), Value::from_field("b"));
    }

    #[test]
    fn test_shared_percentile_keeper() {
        let kinds = [
            AccKind::Percentile(10.0),
            AccKind::Percentile(50.0),
            AccKind::Percentile(90.0),
        ];
        let mut acc = set(&kinds, &["1", "2", "3", "4"]);
        assert_eq!(acc.emit(&AccKind::Percentile(50.0)), Value::from_field("3"));
        assert_eq!(acc.emit(&AccKind::Percentile(10.0)), Value::from_field("1"));
        assert_eq!(acc.emit(&AccKind::Percentile(90.0)), Value::from_field("4"));
    }

    #[test]
    fn test_acc_names() {
        assert!(AccKind::from_name("p50").is_ok());
        assert!(AccKind::from_name("p99.9").is_ok());
        assert!(AccKind::from_name("p101").is_err());
        assert!(AccKind::from_name("median").is_err());
        assert_eq!(AccKind::Percentile(25.0).output_name(), "p25");
        assert_eq!(AccKind::Percentile(99.9).output_name(), "p99.9");
    }
}
