use chumsky::prelude::*;

use crate::ast::BinaryOp;
use crate::lexer::Token;

pub(crate) type PError = Simple<Token>;

pub(crate) fn ctrl(c: char) -> impl Parser<Token, (), Error = PError> + Clone {
    just(Token::Control(c)).ignored()
}

pub(crate) fn keyword(kw: &'static str) -> impl Parser<Token, (), Error = PError> + Clone {
    just(Token::Keyword(kw.to_string())).ignored()
}

pub(crate) fn ident_part() -> impl Parser<Token, String, Error = PError> + Clone {
    select! {
        Token::Ident(ident) => ident,
    }
}

/// The operator half of a compound assignment token, e.g. `+` out of `+=`.
pub(crate) fn assign_op_from_str(op: &str) -> Option<BinaryOp> {
    Some(match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "//" => BinaryOp::IntDiv,
        "%" => BinaryOp::Mod,
        "**" => BinaryOp::Pow,
        "." => BinaryOp::Concat,
        "&&" => BinaryOp::And,
        "||" => BinaryOp::Or,
        "^^" => BinaryOp::Xor,
        "&" => BinaryOp::BitAnd,
        "|" => BinaryOp::BitOr,
        "^" => BinaryOp::BitXor,
        "<<" => BinaryOp::Shl,
        ">>" => BinaryOp::Shr,
        _ => return None,
    })
}
