//! The typed scalar flowing through the DSL and the statistical verbs.
//!
//! Record fields are plain strings; a [Value] is what computations see. Type
//! inference is on demand: a `Value::String` is re-read as a number at the
//! moment an arithmetic operator needs one, never at construction.
//!
//! Dispositions, in decreasing priority:
//! - `Error` is sticky: any operation over an error yields an error.
//! - `Absent` disappears from `+ - * /` and the boolean combinators, so that
//!   `@sum += $x` needs no seeding. Comparisons against absent yield absent.
//! - `Empty` (a present, empty string) absorbs arithmetic: `"" + 1` is empty.
//! - Booleans participate only in logical and comparison operators.

use enum_as_inner::EnumAsInner;

#[derive(Debug, Clone, PartialEq, Default, EnumAsInner)]
pub enum Value {
    #[default]
    Absent,
    Empty,
    Error,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// On-demand numeric reading of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn to_value(self) -> Value {
        match self {
            Num::Int(i) => Value::Int(i),
            Num::Float(f) => Value::Float(f),
        }
    }
}

/// Parse the way field data is inferred: decimal or hex integers first, then
/// floats. Leading/trailing whitespace is not tolerated; the whole text must
/// be numeric.
pub fn infer_number(text: &str) -> Option<Num> {
    if text.is_empty() {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Num::Int(i));
    }
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix("-0x").map(|_| &text[3..]));
    if let Some(h) = hex {
        if let Ok(u) = u64::from_str_radix(h, 16) {
            let i = u as i64;
            return Some(Num::Int(if text.starts_with('-') { -i } else { i }));
        }
    }
    match text.parse::<f64>() {
        // f64::parse accepts "inf", "nan" and similar words; field data that
        // spells those is kept as a string.
        Ok(f) if text.bytes().any(|b| b.is_ascii_digit()) => Some(Num::Float(f)),
        _ => None,
    }
}

impl Value {
    /// A value from record-field text. Empty text is the distinguished
    /// `Empty` variant; everything else stays a string until an operator
    /// asks for a number.
    pub fn from_field(text: &str) -> Value {
        if text.is_empty() {
            Value::Empty
        } else {
            Value::String(text.to_string())
        }
    }

    pub fn from_field_owned(text: String) -> Value {
        if text.is_empty() {
            Value::Empty
        } else {
            Value::String(text)
        }
    }

    /// The numeric reading, if there is one.
    pub fn numeric(&self) -> Option<Num> {
        match self {
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Float(f) => Some(Num::Float(*f)),
            Value::String(s) => infer_number(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric().is_some()
    }

    /// Type name as surfaced by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Empty => "empty",
            Value::Error => "error",
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
        }
    }

    /// Truthiness for pattern-action conditions and `filter`: only a true
    /// boolean (or the string "true") passes; absent does not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        }
    }

    /// Render for insertion into a record field. Floats honor `ofmt`.
    pub fn format(&self, ofmt: &str) -> String {
        match self {
            Value::Absent => "(absent)".to_string(),
            Value::Empty => String::new(),
            Value::Error => "(error)".to_string(),
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(ofmt, *f),
            Value::Bool(b) => b.to_string(),
        }
    }
}

/// A small printf-subset for `--ofmt`-style float formats: `%lf`, `%.6lf`,
/// `%e`, `%g`, `%d` and friends. Unrecognized formats fall back to `%lf`.
pub fn format_float(ofmt: &str, x: f64) -> String {
    let Some(percent) = ofmt.find('%') else {
        return format_float("%lf", x);
    };
    let spec = &ofmt[percent + 1..];
    let prefix = &ofmt[..percent];

    let mut precision: Option<usize> = None;
    let mut rest = spec;
    // skip flags and width; only precision matters for the Rust formatter
    while rest.starts_with(|c: char| c == '0' || c == '-' || c == '+' || c.is_ascii_digit()) {
        rest = &rest[1..];
    }
    if let Some(dot) = rest.strip_prefix('.') {
        let digits: String = dot.chars().take_while(|c| c.is_ascii_digit()).collect();
        precision = digits.parse().ok();
        rest = &dot[digits.len()..];
    }
    let conv = rest.trim_start_matches('l');

    let body = match conv.chars().next() {
        Some('d') => format!("{}", x as i64),
        Some('x') => format!("{:x}", x as i64),
        Some('X') => format!("{:X}", x as i64),
        Some('e') => format!("{:.*e}", precision.unwrap_or(6), x),
        Some('g') => {
            let s = format!("{x}");
            s
        }
        Some('f') => format!("{:.*}", precision.unwrap_or(6), x),
        _ => format!("{:.6}", x),
    };
    if prefix.is_empty() {
        body
    } else {
        format!("{prefix}{body}")
    }
}

// ----------------------------------------------------------------
// Arithmetic

enum Operands {
    Sticky(Value),
    BothAbsent,
    LeftAbsent,
    RightAbsent,
    Numbers(Num, Num),
}

/// Shared dispatch for the arithmetic operators: error is sticky, absent
/// disappears, empty absorbs, non-numeric text and booleans poison.
fn arith_operands(a: &Value, b: &Value) -> Operands {
    if a.is_error() || b.is_error() {
        return Operands::Sticky(Value::Error);
    }
    match (a.is_absent(), b.is_absent()) {
        (true, true) => return Operands::BothAbsent,
        (true, false) => {
            if b.is_empty() {
                return Operands::Sticky(Value::Empty);
            }
            return match b.numeric() {
                Some(_) => Operands::LeftAbsent,
                None => Operands::Sticky(Value::Error),
            };
        }
        (false, true) => {
            if a.is_empty() {
                return Operands::Sticky(Value::Empty);
            }
            return match a.numeric() {
                Some(_) => Operands::RightAbsent,
                None => Operands::Sticky(Value::Error),
            };
        }
        (false, false) => {}
    }
    if a.is_empty() || b.is_empty() {
        return Operands::Sticky(Value::Empty);
    }
    match (a.numeric(), b.numeric()) {
        (Some(x), Some(y)) => Operands::Numbers(x, y),
        _ => Operands::Sticky(Value::Error),
    }
}

fn promote_add(x: Num, y: Num) -> Value {
    match (x, y) {
        (Num::Int(a), Num::Int(b)) => match a.checked_add(b) {
            Some(s) => Value::Int(s),
            None => Value::Float(a as f64 + b as f64),
        },
        _ => Value::Float(x.as_f64() + y.as_f64()),
    }
}

pub fn add(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::Numbers(x, y) => promote_add(x, y),
    }
}

pub fn subtract(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        // the present operand passes through untouched; this keeps
        // `@x -= $missing` a no-op
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) => match a.checked_sub(b) {
                Some(d) => Value::Int(d),
                None => Value::Float(a as f64 - b as f64),
            },
            _ => Value::Float(x.as_f64() - y.as_f64()),
        },
    }
}

pub fn multiply(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) => match a.checked_mul(b) {
                Some(p) => Value::Int(p),
                None => Value::Float(a as f64 * b as f64),
            },
            _ => Value::Float(x.as_f64() * y.as_f64()),
        },
    }
}

/// `/` divides exactly when two ints divide evenly; otherwise floats.
pub fn divide(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) => {
                if b != 0 && a % b == 0 {
                    Value::Int(a / b)
                } else {
                    Value::Float(a as f64 / b as f64)
                }
            }
            _ => Value::Float(x.as_f64() / y.as_f64()),
        },
    }
}

/// `//` floor division.
pub fn int_divide(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) => {
                if b == 0 {
                    Value::Float((a as f64 / b as f64).floor())
                } else {
                    Value::Int(a.div_euclid(b))
                }
            }
            _ => Value::Float((x.as_f64() / y.as_f64()).floor()),
        },
    }
}

/// `%` in the mathematically canonical form: the result carries the sign of
/// the divisor, so `-5 % 3` is `1`.
pub fn modulo(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(0)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) => {
                if b == 0 {
                    Value::Error
                } else {
                    let mut m = a % b;
                    if m != 0 && (m < 0) != (b < 0) {
                        m += b;
                    }
                    Value::Int(m)
                }
            }
            _ => {
                let (a, b) = (x.as_f64(), y.as_f64());
                let mut m = a % b;
                if m != 0.0 && (m < 0.0) != (b < 0.0) {
                    m += b;
                }
                Value::Float(m)
            }
        },
    }
}

pub fn power(a: &Value, b: &Value) -> Value {
    match arith_operands(a, b) {
        Operands::Sticky(v) => v,
        Operands::BothAbsent => Value::Absent,
        Operands::LeftAbsent => b.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::RightAbsent => a.numeric().unwrap_or(Num::Int(1)).to_value(),
        Operands::Numbers(x, y) => match (x, y) {
            (Num::Int(a), Num::Int(b)) if b >= 0 => match a.checked_pow(b.min(u32::MAX as i64) as u32)
            {
                Some(p) => Value::Int(p),
                None => Value::Float((a as f64).powf(b as f64)),
            },
            _ => Value::Float(x.as_f64().powf(y.as_f64())),
        },
    }
}

pub fn negate(a: &Value) -> Value {
    match a {
        Value::Error => Value::Error,
        Value::Absent => Value::Absent,
        Value::Empty => Value::Empty,
        _ => match a.numeric() {
            Some(Num::Int(i)) => Value::Int(-i),
            Some(Num::Float(f)) => Value::Float(-f),
            None => Value::Error,
        },
    }
}

pub fn unary_plus(a: &Value) -> Value {
    match a {
        Value::Error => Value::Error,
        Value::Absent => Value::Absent,
        Value::Empty => Value::Empty,
        _ => match a.numeric() {
            Some(n) => n.to_value(),
            None => Value::Error,
        },
    }
}

// ----------------------------------------------------------------
// Bitwise: int-valued operands only.

fn int_operand(v: &Value) -> Option<i64> {
    match v.numeric() {
        Some(Num::Int(i)) => Some(i),
        _ => None,
    }
}

fn bitwise(a: &Value, b: &Value, f: impl Fn(i64, i64) -> i64) -> Value {
    if a.is_error() || b.is_error() {
        return Value::Error;
    }
    if a.is_absent() && b.is_absent() {
        return Value::Absent;
    }
    if a.is_absent() {
        return int_operand(b).map(Value::Int).unwrap_or(Value::Error);
    }
    if b.is_absent() {
        return int_operand(a).map(Value::Int).unwrap_or(Value::Error);
    }
    match (int_operand(a), int_operand(b)) {
        (Some(x), Some(y)) => Value::Int(f(x, y)),
        _ => Value::Error,
    }
}

pub fn bit_and(a: &Value, b: &Value) -> Value {
    bitwise(a, b, |x, y| x & y)
}

pub fn bit_or(a: &Value, b: &Value) -> Value {
    bitwise(a, b, |x, y| x | y)
}

pub fn bit_xor(a: &Value, b: &Value) -> Value {
    bitwise(a, b, |x, y| x ^ y)
}

pub fn shift_left(a: &Value, b: &Value) -> Value {
    bitwise(a, b, |x, y| x.wrapping_shl(y as u32))
}

pub fn shift_right(a: &Value, b: &Value) -> Value {
    bitwise(a, b, |x, y| x.wrapping_shr(y as u32))
}

pub fn bit_not(a: &Value) -> Value {
    match a {
        Value::Error => Value::Error,
        Value::Absent => Value::Absent,
        _ => int_operand(a).map(|x| Value::Int(!x)).unwrap_or(Value::Error),
    }
}

// ----------------------------------------------------------------
// Logical: booleans with absent as identity.

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn logical(a: &Value, b: &Value, f: impl Fn(bool, bool) -> bool) -> Value {
    if a.is_error() || b.is_error() {
        return Value::Error;
    }
    match (a.is_absent(), b.is_absent()) {
        (true, true) => return Value::Absent,
        (true, false) => return as_bool(b).map(Value::Bool).unwrap_or(Value::Error),
        (false, true) => return as_bool(a).map(Value::Bool).unwrap_or(Value::Error),
        (false, false) => {}
    }
    match (as_bool(a), as_bool(b)) {
        (Some(x), Some(y)) => Value::Bool(f(x, y)),
        _ => Value::Error,
    }
}

pub fn logical_and(a: &Value, b: &Value) -> Value {
    logical(a, b, |x, y| x && y)
}

pub fn logical_or(a: &Value, b: &Value) -> Value {
    logical(a, b, |x, y| x || y)
}

pub fn logical_xor(a: &Value, b: &Value) -> Value {
    logical(a, b, |x, y| x ^ y)
}

pub fn logical_not(a: &Value) -> Value {
    match a {
        Value::Error => Value::Error,
        Value::Absent => Value::Absent,
        _ => as_bool(a).map(|b| Value::Bool(!b)).unwrap_or(Value::Error),
    }
}

// ----------------------------------------------------------------
// Comparison: numbers numerically, otherwise lexically; absent propagates
// (three-valued logic).

use std::cmp::Ordering;

/// Total ordering over present values, used by comparison operators and the
/// numeric accumulators.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_absent() || b.is_absent() || a.is_error() || b.is_error() {
        return None;
    }
    if let (Some(x), Some(y)) = (a.numeric(), b.numeric()) {
        return x.as_f64().partial_cmp(&y.as_f64());
    }
    Some(a.format("%lf").cmp(&b.format("%lf")))
}

fn compare_op(a: &Value, b: &Value, f: impl Fn(Ordering) -> bool) -> Value {
    if a.is_error() || b.is_error() {
        return Value::Error;
    }
    if a.is_absent() || b.is_absent() {
        return Value::Absent;
    }
    match compare(a, b) {
        Some(ord) => Value::Bool(f(ord)),
        None => Value::Error,
    }
}

pub fn eq(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o == Ordering::Equal)
}

pub fn ne(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o != Ordering::Equal)
}

pub fn lt(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o == Ordering::Less)
}

pub fn le(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o != Ordering::Greater)
}

pub fn gt(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o == Ordering::Greater)
}

pub fn ge(a: &Value, b: &Value) -> Value {
    compare_op(a, b, |o| o != Ordering::Less)
}

// ----------------------------------------------------------------
// String concatenation: never numerifies.

pub fn concat(a: &Value, b: &Value, ofmt: &str) -> Value {
    if a.is_error() || b.is_error() {
        return Value::Error;
    }
    if a.is_absent() && b.is_absent() {
        return Value::Empty;
    }
    let left = if a.is_absent() {
        String::new()
    } else {
        a.format(ofmt)
    };
    let right = if b.is_absent() {
        String::new()
    } else {
        b.format(ofmt)
    };
    Value::from_field_owned(left + &right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_is_lazy() {
        let v = Value::from_field("3");
        assert!(matches!(v, Value::String(_)));
        assert_eq!(v.numeric(), Some(Num::Int(3)));
        assert_eq!(Value::from_field("3.5").numeric(), Some(Num::Float(3.5)));
        assert_eq!(Value::from_field("0xff").numeric(), Some(Num::Int(255)));
        assert_eq!(Value::from_field("three").numeric(), None);
        assert_eq!(Value::from_field("inf").numeric(), None);
    }

    #[test]
    fn test_absent_is_identity() {
        assert_eq!(add(&Value::Absent, &Value::Int(5)), Value::Int(5));
        assert_eq!(add(&Value::Int(5), &Value::Absent), Value::Int(5));
        assert_eq!(add(&Value::Absent, &Value::Absent), Value::Absent);
        assert_eq!(subtract(&Value::Int(5), &Value::Absent), Value::Int(5));
        assert_eq!(multiply(&Value::Absent, &Value::Int(7)), Value::Int(7));
    }

    #[test]
    fn test_error_is_sticky() {
        assert_eq!(add(&Value::Error, &Value::Int(1)), Value::Error);
        assert_eq!(multiply(&Value::Error, &Value::Absent), Value::Error);
        assert_eq!(
            add(&add(&Value::from_field("x"), &Value::Int(1)), &Value::Int(1)),
            Value::Error
        );
    }

    #[test]
    fn test_division_exactness() {
        assert_eq!(divide(&Value::Int(6), &Value::Int(3)), Value::Int(2));
        assert_eq!(divide(&Value::Int(7), &Value::Int(2)), Value::Float(3.5));
        assert_eq!(int_divide(&Value::Int(7), &Value::Int(2)), Value::Int(3));
        assert_eq!(int_divide(&Value::Int(-7), &Value::Int(2)), Value::Int(-4));
    }

    #[test]
    fn test_modulo_sign_of_divisor() {
        assert_eq!(modulo(&Value::Int(5), &Value::Int(3)), Value::Int(2));
        assert_eq!(modulo(&Value::Int(-5), &Value::Int(3)), Value::Int(1));
        assert_eq!(modulo(&Value::Int(5), &Value::Int(-3)), Value::Int(-1));
    }

    #[test]
    fn test_int_overflow_promotes() {
        assert_eq!(
            add(&Value::Int(i64::MAX), &Value::Int(1)),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(lt(&Value::Int(2), &Value::Float(2.5)), Value::Bool(true));
        // numeric strings compare numerically: "10" > "9"
        assert_eq!(
            gt(&Value::from_field("10"), &Value::from_field("9")),
            Value::Bool(true)
        );
        // non-numeric strings compare lexically
        assert_eq!(
            lt(&Value::from_field("abc"), &Value::from_field("abd")),
            Value::Bool(true)
        );
        assert_eq!(eq(&Value::Absent, &Value::Int(1)), Value::Absent);
    }

    #[test]
    fn test_concat_never_numerifies() {
        assert_eq!(
            concat(&Value::from_field("1"), &Value::from_field("2"), "%lf"),
            Value::String("12".to_string())
        );
        assert_eq!(
            concat(&Value::Absent, &Value::Absent, "%lf"),
            Value::Empty
        );
    }

    #[test]
    fn test_logical_absent_identity() {
        assert_eq!(
            logical_and(&Value::Absent, &Value::Bool(true)),
            Value::Bool(true)
        );
        assert_eq!(
            logical_or(&Value::Bool(false), &Value::Absent),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float("%lf", 2.0), "2.000000");
        assert_eq!(format_float("%.2lf", 2.345), "2.35");
        assert_eq!(format_float("%d", 2.9), "2");
    }

    #[test]
    fn test_empty_absorbs() {
        assert_eq!(add(&Value::Empty, &Value::Int(1)), Value::Empty);
        assert_eq!(add(&Value::Int(1), &Value::Empty), Value::Empty);
    }
}
