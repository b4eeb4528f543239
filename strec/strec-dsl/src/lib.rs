//! Lexer and parser for the strec expression language, the small imperative
//! language behind the `put` and `filter` verbs.
//!
//! This crate owns the surface syntax only: [lexer] turns source text into
//! tokens, [parser] turns tokens into the AST in [ast]. Compilation to an
//! executable form (local-slot allocation, the runtime value model) lives in
//! the `strec` crate.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use error::{Error, Reason, WithErrorInfo};
pub use span::Span;

/// Lex and parse a DSL program into a list of top-level statements.
pub fn parse_program(source: &str) -> Result<Vec<ast::Stmt>, Vec<Error>> {
    let tokens = lexer::lex(source)?;
    parser::parse(source, tokens)
}
