//! Out-of-stream variables: one process-wide nested map, keyed by strings
//! (index expressions stringify on the way in), with scalar leaves. Owned
//! by the DSL state and published into the record stream by the emit
//! statements.

use indexmap::IndexMap;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum OosValue {
    Scalar(Value),
    Map(OosMap),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OosMap {
    entries: IndexMap<String, OosValue>,
}

impl OosMap {
    pub fn new() -> OosMap {
        OosMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&OosValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OosValue)> {
        self.entries.iter()
    }

    pub fn insert(&mut self, key: String, value: OosValue) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.shift_remove(key);
    }

    /// Read the value at `path`; absent when any level is missing.
    pub fn get_path(&self, path: &[String]) -> Option<&OosValue> {
        let (first, rest) = path.split_first()?;
        let node = self.entries.get(first)?;
        if rest.is_empty() {
            return Some(node);
        }
        match node {
            OosValue::Map(m) => m.get_path(rest),
            OosValue::Scalar(_) => None,
        }
    }

    /// Write a scalar at `path`, creating intermediate maps and overwriting
    /// scalars that stand in the way.
    pub fn put_path(&mut self, path: &[String], value: Value) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.entries.insert(first.clone(), OosValue::Scalar(value));
            return;
        }
        let node = self
            .entries
            .entry(first.clone())
            .or_insert_with(|| OosValue::Map(OosMap::new()));
        if let OosValue::Scalar(_) = node {
            *node = OosValue::Map(OosMap::new());
        }
        match node {
            OosValue::Map(m) => m.put_path(rest, value),
            OosValue::Scalar(_) => unreachable!(),
        }
    }

    /// Remove the subtree at `path`.
    pub fn unset_path(&mut self, path: &[String]) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.entries.shift_remove(first);
            return;
        }
        if let Some(OosValue::Map(m)) = self.entries.get_mut(first) {
            m.unset_path(rest);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Leaves of the subtree, with their key paths relative to this map.
    pub fn flatten(&self) -> Vec<(Vec<String>, Value)> {
        let mut out = Vec::new();
        self.flatten_into(&mut Vec::new(), &mut out);
        out
    }

    fn flatten_into(&self, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
        for (k, v) in &self.entries {
            prefix.push(k.clone());
            match v {
                OosValue::Scalar(s) => out.push((prefix.clone(), s.clone())),
                OosValue::Map(m) => m.flatten_into(prefix, out),
            }
            prefix.pop();
        }
    }

    /// JSON rendering for `dump`; two-space indentation, scalars typed by
    /// their numeric reading.
    pub fn to_json(&self) -> String {
        let mut s = String::new();
        self.write_json(&mut s, 0);
        s
    }

    fn write_json(&self, out: &mut String, depth: usize) {
        if self.entries.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push_str("{\n");
        let pad = "  ".repeat(depth + 1);
        let n = self.entries.len();
        for (i, (k, v)) in self.entries.iter().enumerate() {
            out.push_str(&pad);
            out.push('"');
            out.push_str(&crate::output::json_escape(k));
            out.push_str("\": ");
            match v {
                OosValue::Map(m) => m.write_json(out, depth + 1),
                OosValue::Scalar(s) => write_json_scalar(out, s),
            }
            if i + 1 < n {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
        out.push('}');
    }
}

fn write_json_scalar(out: &mut String, v: &Value) {
    match v {
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format!("{f}")),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::String(s) => match v.numeric() {
            Some(_) => out.push_str(s),
            None => {
                out.push('"');
                out.push_str(&crate::output::json_escape(s));
                out.push('"');
            }
        },
        other => {
            out.push('"');
            out.push_str(&crate::output::json_escape(&other.format("%lf")));
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_put_get_unset() {
        let mut m = OosMap::new();
        m.put_path(&path(&["a", "b"]), Value::Int(1));
        m.put_path(&path(&["a", "c"]), Value::Int(2));
        assert_eq!(
            m.get_path(&path(&["a", "b"])),
            Some(&OosValue::Scalar(Value::Int(1)))
        );
        assert!(m.get_path(&path(&["a", "x"])).is_none());

        // writing through a scalar replaces it with a map
        m.put_path(&path(&["a", "b", "deep"]), Value::Int(3));
        assert!(matches!(
            m.get_path(&path(&["a", "b"])),
            Some(OosValue::Map(_))
        ));

        m.unset_path(&path(&["a", "c"]));
        assert!(m.get_path(&path(&["a", "c"])).is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut m = OosMap::new();
        m.put_path(&path(&["z"]), Value::Int(1));
        m.put_path(&path(&["a"]), Value::Int(2));
        let keys: Vec<&String> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_flatten() {
        let mut m = OosMap::new();
        m.put_path(&path(&["s", "p"]), Value::Int(4));
        m.put_path(&path(&["s", "q"]), Value::Int(2));
        let flat = m.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].0, path(&["s", "p"]));
        assert_eq!(flat[0].1, Value::Int(4));
    }

    #[test]
    fn test_dump_json() {
        let mut m = OosMap::new();
        m.put_path(&path(&["count"]), Value::Int(3));
        m.put_path(&path(&["name"]), Value::String("ann".to_string()));
        assert_eq!(
            m.to_json(),
            "{\n  \"count\": 3,\n  \"name\": \"ann\"\n}"
        );
    }
}
