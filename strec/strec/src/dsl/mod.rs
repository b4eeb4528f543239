//! The expression language behind `put` and `filter`.
//!
//! Surface syntax and parsing live in the `strec-dsl` crate; this module
//! owns everything after the AST: lowering with local-slot allocation
//! ([lower], [stack]), the out-of-stream variable tree ([oosvar]), the
//! redirection handle cache ([redirect]), the builtin catalog ([builtins])
//! and the executor ([interp]).
//!
//! A program runs in three phases: `begin` blocks before the first record,
//! the remaining top-level statements once per record, `end` blocks after
//! the last — with `NR` frozen at its final value and `$`-access an error.
//! Records published by emit statements go downstream of the verb.

pub mod builtins;
pub mod interp;
pub mod lower;
pub mod oosvar;
pub mod redirect;
pub mod stack;

pub use interp::{exec_phase, DslState};
pub use lower::Program;

use strec_dsl::error::Errors;

/// Parse and lower a DSL program.
pub fn compile(source: &str) -> Result<Program, Errors> {
    let stmts = strec_dsl::parse_program(source).map_err(Errors)?;
    lower::lower(stmts)
}
