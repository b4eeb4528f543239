//! The unit of flow: an insertion-ordered sequence of named string fields.
//!
//! Keys are unique within a record; a put on an existing key replaces the
//! value in place, keeping the field's position. Readers set the per-field
//! `was_quoted` flag so the CSV writer's `original` quote mode can round-trip
//! quoting; the flag is not sticky across computed fields.

use indexmap::IndexMap;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Default)]
struct Field {
    value: String,
    was_quoted: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    pub fn new() -> Record {
        Record::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|f| f.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn was_quoted(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|f| f.was_quoted)
    }

    /// Replace in place when the key exists, append otherwise.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(
            key.into(),
            Field {
                value: value.into(),
                was_quoted: false,
            },
        );
    }

    pub fn put_quoted(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(
            key.into(),
            Field {
                value: value.into(),
                was_quoted: true,
            },
        );
    }

    /// Insert at the front, preserving relative order of the rest.
    pub fn prepend(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.fields.shift_remove(&key);
        let mut rebuilt = IndexMap::with_capacity(self.fields.len() + 1);
        rebuilt.insert(
            key,
            Field {
                value: value.into(),
                was_quoted: false,
            },
        );
        rebuilt.extend(self.fields.drain(..));
        self.fields = rebuilt;
    }

    /// Remove by key, shifting later fields up. Returns the value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.shift_remove(key).map(|f| f.value)
    }

    /// Rename in place, preserving the field's position. A rename onto an
    /// existing key replaces that other field's value and drops this slot.
    pub fn rename(&mut self, old: &str, new: &str) {
        if old == new || !self.fields.contains_key(old) {
            return;
        }
        if self.fields.contains_key(new) {
            let value = self.fields.shift_remove(old).unwrap();
            self.fields.insert(new.to_string(), value);
            return;
        }
        let mut rebuilt = IndexMap::with_capacity(self.fields.len());
        for (k, v) in self.fields.drain(..) {
            if k == old {
                rebuilt.insert(new.to_string(), v);
            } else {
                rebuilt.insert(k, v);
            }
        }
        self.fields = rebuilt;
    }

    /// Rename every key matching `pattern`, in field order. `\1`..`\9` in the
    /// replacement refer to capture groups; with `global` the pattern is
    /// replaced everywhere within the name, otherwise once.
    pub fn rename_regex(&mut self, pattern: &Regex, replacement: &str, global: bool) {
        let mut converted = String::with_capacity(replacement.len());
        let mut chars = replacement.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' && chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                converted.push_str("${");
                converted.push(chars.next().unwrap());
                converted.push('}');
            } else {
                converted.push(c);
            }
        }
        let replacement = converted;
        let mut rebuilt = IndexMap::with_capacity(self.fields.len());
        for (k, v) in self.fields.drain(..) {
            let new = if pattern.is_match(&k) {
                if global {
                    pattern.replace_all(&k, replacement.as_str()).into_owned()
                } else {
                    pattern.replace(&k, replacement.as_str()).into_owned()
                }
            } else {
                k
            };
            rebuilt.insert(new, v);
        }
        self.fields = rebuilt;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f.value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn key_list(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// First `n` keys, for positional relabeling.
    pub fn nth_key(&self, n: usize) -> Option<&str> {
        self.fields.get_index(n).map(|(k, _)| k.as_str())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.fields.retain(|k, _| keep(k));
    }

    /// Rebuild with the given keys first (in the given order), the rest
    /// following in their current order. Keys not present are skipped.
    pub fn move_to_front(&mut self, keys: &[String]) {
        let mut rebuilt = IndexMap::with_capacity(self.fields.len());
        for k in keys {
            if let Some(v) = self.fields.shift_remove(k) {
                rebuilt.insert(k.clone(), v);
            }
        }
        rebuilt.extend(self.fields.drain(..));
        self.fields = rebuilt;
    }

    /// Rebuild with the given keys last, in the given order.
    pub fn move_to_end(&mut self, keys: &[String]) {
        let mut tail = Vec::with_capacity(keys.len());
        for k in keys {
            if let Some(v) = self.fields.shift_remove(k) {
                tail.push((k.clone(), v));
            }
        }
        self.fields.extend(tail);
    }

    /// Reorder fields to match `order`; keys absent from `order` keep their
    /// relative position after the ordered ones.
    pub fn reorder_to(&mut self, order: &[String]) {
        self.move_to_front(order);
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Record {
        let mut rec = Record::new();
        for (k, v) in pairs {
            rec.put(k, v);
        }
        rec
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
