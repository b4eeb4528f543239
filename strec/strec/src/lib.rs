//! # strec
//!
//! A stream processor for name-indexed records. Pipelines of verbs, chained
//! on the command line with `then`, transform records drawn from delimited
//! key-value, CSV, positional, pretty-printed, vertical-tabular or tabular
//! JSON input, and write them back out in any of those formats.
//!
//! ```ascii
//!   bytes ──reader──► records ──verb₀──► ... ──verbₙ──► records ──writer──► bytes
//! ```
//!
//! The library surface mirrors that flow:
//! - [record::Record] and [value::Value] are the data model;
//! - [input] and [output] hold the per-format codecs;
//! - [verbs] holds the record transformers and their CLI registry;
//! - [dsl] compiles and executes the expression language used by the `put`
//!   and `filter` verbs;
//! - [pipeline] drives reader → verbs → writer and owns end-of-stream
//!   signalling.
//!
//! The `cli` feature (default) adds the command-line front-end.

#![forbid(unsafe_code)]

pub mod context;
pub mod dsl;
pub mod errors;
pub mod input;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod separators;
pub mod value;
pub mod verbs;

#[cfg(feature = "cli")]
pub mod cli;

pub use context::Context;
pub use errors::{Error, Result};
pub use options::{Format, Options, QuoteMode, ReaderOpts, WriterOpts};
pub use record::Record;
pub use value::Value;
