//! The verb library: record transformers and their command-line registry.
//!
//! Every verb implements [Verb]: take one stream item, push zero or more
//! onto the output list. Streaming verbs mutate and forward; buffered verbs
//! absorb records and flush when the end-of-stream marker arrives; the
//! marker must stay last in any output list that contains it.

mod args;
mod bar;
mod cat;
mod cut;
mod decimate;
mod grep;
mod group;
mod having_fields;
mod head;
mod histogram;
mod join;
mod label;
mod merge_fields;
mod nest;
mod nothing;
mod put;
mod rename;
mod reorder;
mod repeat;
mod reshape;
mod sample;
mod sec2gmt;
mod seqgen;
mod sort;
mod stats;
mod stats2;
mod step;
mod tac;
mod tail;
mod tee;
mod top;
mod uniq;

use crate::context::Context;
use crate::errors::{Error, Result};
use crate::options::Options;
use crate::pipeline::StreamItem;

pub use args::VerbArgs;
pub(crate) use sec2gmt::sec2gmt_string;

pub trait Verb {
    fn process(&mut self, item: StreamItem, ctx: &Context, out: &mut Vec<StreamItem>)
        -> Result<()>;
}

type ParseFn = fn(&mut VerbArgs, &Options) -> Result<Box<dyn Verb>>;

pub struct VerbSpec {
    pub name: &'static str,
    parse: ParseFn,
}

/// The verb lookup table, alphabetical like the usage listing.
pub static VERB_TABLE: &[VerbSpec] = &[
    VerbSpec { name: "bar", parse: bar::parse },
    VerbSpec { name: "bootstrap", parse: sample::parse_bootstrap },
    VerbSpec { name: "cat", parse: cat::parse },
    VerbSpec { name: "check", parse: nothing::parse_check },
    VerbSpec { name: "count-distinct", parse: uniq::parse_count_distinct },
    VerbSpec { name: "cut", parse: cut::parse },
    VerbSpec { name: "decimate", parse: decimate::parse },
    VerbSpec { name: "filter", parse: put::parse_filter },
    VerbSpec { name: "grep", parse: grep::parse },
    VerbSpec { name: "group-by", parse: group::parse_group_by },
    VerbSpec { name: "group-like", parse: group::parse_group_like },
    VerbSpec { name: "having-fields", parse: having_fields::parse },
    VerbSpec { name: "head", parse: head::parse },
    VerbSpec { name: "histogram", parse: histogram::parse },
    VerbSpec { name: "join", parse: join::parse },
    VerbSpec { name: "label", parse: label::parse },
    VerbSpec { name: "merge-fields", parse: merge_fields::parse },
    VerbSpec { name: "nest", parse: nest::parse },
    VerbSpec { name: "nothing", parse: nothing::parse_nothing },
    VerbSpec { name: "put", parse: put::parse_put },
    VerbSpec { name: "regularize", parse: group::parse_regularize },
    VerbSpec { name: "rename", parse: rename::parse },
    VerbSpec { name: "reorder", parse: reorder::parse },
    VerbSpec { name: "repeat", parse: repeat::parse },
    VerbSpec { name: "reshape", parse: reshape::parse },
    VerbSpec { name: "sample", parse: sample::parse_sample },
    VerbSpec { name: "sec2gmt", parse: sec2gmt::parse_sec2gmt },
    VerbSpec { name: "sec2gmtdate", parse: sec2gmt::parse_sec2gmtdate },
    VerbSpec { name: "seqgen", parse: seqgen::parse },
    VerbSpec { name: "shuffle", parse: sample::parse_shuffle },
    VerbSpec { name: "sort", parse: sort::parse },
    VerbSpec { name: "stats1", parse: stats::parse },
    VerbSpec { name: "stats2", parse: stats2::parse },
    VerbSpec { name: "step", parse: step::parse },
    VerbSpec { name: "tac", parse: tac::parse },
    VerbSpec { name: "tail", parse: tail::parse },
    VerbSpec { name: "tee", parse: tee::parse },
    VerbSpec { name: "top", parse: top::parse },
    VerbSpec { name: "uniq", parse: uniq::parse_uniq },
];

pub fn verb_names() -> Vec<&'static str> {
    VERB_TABLE.iter().map(|s| s.name).collect()
}

/// Build one verb from its argument list.
pub fn make_verb(name: &str, args: Vec<String>, opts: &Options) -> Result<Box<dyn Verb>> {
    let spec = VERB_TABLE
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::usage(format!("unknown verb '{name}'")))?;
    let mut verb_args = VerbArgs::new(name, args);
    let verb = (spec.parse)(&mut verb_args, opts)?;
    verb_args.finish()?;
    Ok(verb)
}

/// Parse a full `verb [opts] then verb [opts] ...` chain. Returns the verbs
/// plus any trailing non-flag arguments of the final segment, which the CLI
/// treats as input file names.
pub fn make_chain(
    tokens: &[String],
    opts: &Options,
) -> Result<(Vec<Box<dyn Verb>>, Vec<String>)> {
    let mut segments: Vec<Vec<String>> = vec![Vec::new()];
    for tok in tokens {
        if tok == "then" {
            segments.push(Vec::new());
        } else {
            segments.last_mut().unwrap().push(tok.clone());
        }
    }

    let mut verbs = Vec::new();
    let mut files = Vec::new();
    let last = segments.len() - 1;
    for (i, mut segment) in segments.into_iter().enumerate() {
        if segment.is_empty() {
            return Err(Error::usage("empty verb before or after 'then'"));
        }
        let name = segment.remove(0);
        let spec = VERB_TABLE
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::usage(format!("unknown verb '{name}'")))?;
        let mut verb_args = VerbArgs::new(&name, segment);
        let verb = (spec.parse)(&mut verb_args, opts)?;
        let leftover = verb_args.into_rest();
        if i == last {
            files = leftover;
        } else if !leftover.is_empty() {
            return Err(Error::usage(format!(
                "extra arguments to verb '{name}': {}",
                leftover.join(" ")
            )));
        }
        verbs.push(verb);
    }
    Ok((verbs, files))
}
