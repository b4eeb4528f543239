//! Token-level parser for DSL programs.

mod common;
mod expr;
mod stmt;
#[cfg(test)]
mod test;

use chumsky::error::SimpleReason;
use chumsky::{Parser, Stream};
use itertools::Itertools;

use crate::ast::Stmt;
use crate::error::{Error, Reason, WithErrorInfo};
use crate::lexer::Token;

/// Parse a lexed program into statements.
pub fn parse(
    source: &str,
    tokens: Vec<(Token, std::ops::Range<usize>)>,
) -> Result<Vec<Stmt>, Vec<Error>> {
    let len = source.chars().count();
    let stream = Stream::from_iter(len..len + 1, tokens.into_iter());

    stmt::program().parse(stream).map_err(|errors| {
        log::debug!("parse failed with {} errors", errors.len());
        errors.into_iter().map(convert_error).collect_vec()
    })
}

fn convert_error(e: chumsky::prelude::Simple<Token>) -> Error {
    let span = Some(e.span().into());

    if let SimpleReason::Custom(message) = e.reason() {
        return Error::new_simple(message).with_span(span);
    }

    let expected = e
        .expected()
        .filter_map(|t| t.as_ref().map(|t| t.to_string()))
        .collect_vec();

    let found = e
        .found()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "end of input".to_string());

    if expected.is_empty() || expected.len() > 10 {
        Error::new(Reason::Unexpected { found })
    } else {
        Error::new(Reason::Expected {
            who: None,
            expected: expected.join(", "),
            found,
        })
    }
    .with_span(span)
}
