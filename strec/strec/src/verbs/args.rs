//! Per-verb argument scanning: each verb pulls its flags off the front of
//! its segment; whatever is left belongs to the caller (trailing file names
//! on the final segment).

use crate::errors::{Error, Result};

pub struct VerbArgs {
    verb: String,
    args: Vec<String>,
    pos: usize,
}

impl VerbArgs {
    pub fn new(verb: &str, args: Vec<String>) -> VerbArgs {
        VerbArgs {
            verb: verb.to_string(),
            args,
            pos: 0,
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    fn peek(&self) -> Option<&str> {
        self.args.get(self.pos).map(|s| s.as_str())
    }

    /// Consume and return the next token if it looks like a flag.
    pub fn next_flag(&mut self) -> Option<String> {
        match self.peek() {
            Some(tok) if tok.starts_with('-') && tok.len() > 1 => {
                self.pos += 1;
                Some(self.args[self.pos - 1].clone())
            }
            _ => None,
        }
    }

    /// The value following a flag.
    pub fn value(&mut self, flag: &str) -> Result<String> {
        match self.args.get(self.pos) {
            Some(v) => {
                self.pos += 1;
                Ok(v.clone())
            }
            None => Err(Error::usage(format!(
                "{}: flag {flag} requires a value",
                self.verb
            ))),
        }
    }

    pub fn int_value(&mut self, flag: &str) -> Result<i64> {
        let v = self.value(flag)?;
        v.parse().map_err(|_| {
            Error::usage(format!("{}: {flag} wants an integer, got '{v}'", self.verb))
        })
    }

    pub fn float_value(&mut self, flag: &str) -> Result<f64> {
        let v = self.value(flag)?;
        v.parse()
            .map_err(|_| Error::usage(format!("{}: {flag} wants a number, got '{v}'", self.verb)))
    }

    /// A comma-separated list value.
    pub fn list_value(&mut self, flag: &str) -> Result<Vec<String>> {
        Ok(self
            .value(flag)?
            .split(',')
            .map(|s| s.to_string())
            .collect())
    }

    /// A required positional argument (e.g. the `put` expression).
    pub fn positional(&mut self, what: &str) -> Result<String> {
        match self.args.get(self.pos) {
            Some(v) => {
                self.pos += 1;
                Ok(v.clone())
            }
            None => Err(Error::usage(format!("{}: missing {what}", self.verb))),
        }
    }

    pub fn unknown_flag(&self, flag: &str) -> Error {
        Error::usage(format!("{}: unknown flag {flag}", self.verb))
    }

    /// Everything not consumed, for the CLI's trailing-file-name rule.
    pub fn into_rest(self) -> Vec<String> {
        self.args[self.pos..].to_vec()
    }

    /// Assert nothing is left; used when a verb is built programmatically.
    pub fn finish(self) -> Result<()> {
        if self.pos == self.args.len() {
            Ok(())
        } else {
            Err(Error::usage(format!(
                "{}: unexpected arguments: {}",
                self.verb,
                self.args[self.pos..].join(" ")
            )))
        }
    }
}
