//! Tabular JSON input: a stream of objects, or arrays of objects, in any
//! concatenation. Nested objects are flattened to compound keys joined by
//! the flatten separator; nested arrays are skipped or fatal, by option.
//! Numbers keep their original source text.

use std::collections::VecDeque;
use std::io::BufRead;

use super::RecordReader;
use crate::errors::{Error, Result};
use crate::options::ReaderOpts;
use crate::record::Record;

pub struct JsonReader {
    opts: ReaderOpts,
    stream: serde_json::StreamDeserializer<
        'static,
        serde_json::de::IoRead<Box<dyn BufRead>>,
        serde_json::Value,
    >,
    pending: VecDeque<serde_json::Value>,
}

impl JsonReader {
    pub fn new(opts: ReaderOpts, src: Box<dyn BufRead>) -> JsonReader {
        JsonReader {
            opts,
            stream: serde_json::Deserializer::from_reader(src).into_iter(),
            pending: VecDeque::new(),
        }
    }

    fn record_of_object(&self, value: &serde_json::Value) -> Result<Record> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::parse(
                "non-tabular JSON: input must be objects or arrays of objects",
            ));
        };
        let mut rec = Record::new();
        self.flatten_into(&mut rec, "", map)?;
        Ok(rec)
    }

    fn flatten_into(
        &self,
        rec: &mut Record,
        prefix: &str,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        for (k, v) in map {
            let key = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}{}{k}", self.opts.json_flatten_separator)
            };
            match v {
                serde_json::Value::Object(m) => self.flatten_into(rec, &key, m)?,
                serde_json::Value::Array(_) => {
                    if self.opts.json_skip_arrays {
                        log::debug!("skipping array-valued JSON key {key}");
                        continue;
                    }
                    return Err(Error::parse(format!(
                        "non-tabular JSON: array value at key {key}"
                    )));
                }
                serde_json::Value::String(s) => rec.put(key, s.clone()),
                serde_json::Value::Number(n) => rec.put(key, n.to_string()),
                serde_json::Value::Bool(b) => rec.put(key, if *b { "true" } else { "false" }),
                serde_json::Value::Null => rec.put(key, ""),
            }
        }
        Ok(())
    }
}

impl RecordReader for JsonReader {
    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(v) = self.pending.pop_front() {
                return Ok(Some(self.record_of_object(&v)?));
            }
            match self.stream.next() {
                None => return Ok(None),
                Some(Err(e)) => {
                    return Err(Error::parse(format!("non-tabular JSON: {e}")));
                }
                Some(Ok(serde_json::Value::Array(items))) => {
                    self.pending.extend(items);
                }
                Some(Ok(v)) => return Ok(Some(self.record_of_object(&v)?)),
            }
        }
    }
}
