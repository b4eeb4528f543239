use chumsky::prelude::*;

use super::common::*;
use crate::ast::*;
use crate::lexer::Token;
use crate::span::Span;

pub(crate) fn expr() -> impl Parser<Token, Expr, Error = PError> + Clone {
    recursive(|expr| {
        let literal = select! { Token::Literal(lit) => ExprKind::Literal(lit) };

        let field = select! {
            Token::Field(name) => if name == "*" {
                ExprKind::FullRecord
            } else {
                ExprKind::Field(name)
            },
        };

        let oosvar = select! { Token::Oosvar(name) => name }
            .then(
                expr.clone()
                    .delimited_by(ctrl('['), ctrl(']'))
                    .repeated(),
            )
            .validate(|(name, indices), span, emit| {
                if name == "*" {
                    if !indices.is_empty() {
                        emit(Simple::custom(span, "@* cannot be indexed"));
                    }
                    ExprKind::FullOosvar
                } else {
                    ExprKind::Oosvar { name, indices }
                }
            });

        let call = ident_part()
            .then(
                expr.clone()
                    .separated_by(ctrl(','))
                    .allow_trailing()
                    .delimited_by(ctrl('('), ctrl(')')),
            )
            .map(|(name, args)| ExprKind::Call { name, args });

        let local = ident_part().map(|name| match ContextVar::from_name(&name) {
            Some(cv) => ExprKind::ContextVar(cv),
            None => ExprKind::Local(name),
        });

        let term = choice((literal, field, oosvar, call, local))
            .map_with_span(into_expr)
            .or(expr.clone().delimited_by(ctrl('('), ctrl(')')))
            .boxed();

        // `**` binds tighter than unary and is right-associative: `-2 ** 2`
        // is `-(2 ** 2)` and `2 ** 3 ** 2` is `2 ** (3 ** 2)`.
        let unary_term = recursive(|unary_term: Recursive<Token, Expr, PError>| {
            let pow = term
                .clone()
                .then(just(Token::Pow).ignore_then(unary_term.clone()).or_not())
                .map(|(base, exp)| match exp {
                    Some(exp) => {
                        let span = Span::merge(base.span, exp.span);
                        Expr {
                            kind: ExprKind::Binary {
                                op: BinaryOp::Pow,
                                left: Box::new(base),
                                right: Box::new(exp),
                            },
                            span,
                        }
                    }
                    None => base,
                });

            let unary_op = choice((
                ctrl('!').to(UnaryOp::Not),
                ctrl('~').to(UnaryOp::BitNot),
                ctrl('+').to(UnaryOp::Plus),
                ctrl('-').to(UnaryOp::Minus),
            ));

            unary_op
                .map_with_span(|op, span: std::ops::Range<usize>| (op, span))
                .repeated()
                .then(pow)
                .foldr(|(op, op_span), inner| {
                    let span = Span::merge(op_span.into(), inner.span);
                    Expr {
                        kind: ExprKind::Unary {
                            op,
                            expr: Box::new(inner),
                        },
                        span,
                    }
                })
        })
        .boxed();

        // Binary levels, tightest first.
        let e = binary_op_parser(unary_term, ctrl('%').to(BinaryOp::Mod));
        let e = binary_op_parser(
            e,
            choice((
                ctrl('*').to(BinaryOp::Mul),
                ctrl('/').to(BinaryOp::Div),
                just(Token::DivInt).to(BinaryOp::IntDiv),
            )),
        );
        let e = binary_op_parser(
            e,
            ctrl('+').to(BinaryOp::Add).or(ctrl('-').to(BinaryOp::Sub)),
        );
        let e = binary_op_parser(e, ctrl('.').to(BinaryOp::Concat));
        let e = binary_op_parser(
            e,
            just(Token::Shl)
                .to(BinaryOp::Shl)
                .or(just(Token::Shr).to(BinaryOp::Shr)),
        );
        let e = binary_op_parser(e, ctrl('&').to(BinaryOp::BitAnd));
        let e = binary_op_parser(e, ctrl('^').to(BinaryOp::BitXor));
        let e = binary_op_parser(e, ctrl('|').to(BinaryOp::BitOr));
        let e = binary_op_parser(
            e,
            choice((
                just(Token::Le).to(BinaryOp::Le),
                just(Token::Ge).to(BinaryOp::Ge),
                ctrl('<').to(BinaryOp::Lt),
                ctrl('>').to(BinaryOp::Gt),
            )),
        );
        let e = binary_op_parser(
            e,
            choice((
                just(Token::EqEq).to(BinaryOp::Eq),
                just(Token::Ne).to(BinaryOp::Ne),
                just(Token::Match).to(BinaryOp::Match),
                just(Token::NotMatch).to(BinaryOp::NotMatch),
            )),
        );
        let e = binary_op_parser(e, just(Token::And).to(BinaryOp::And));
        let e = binary_op_parser(e, just(Token::Xor).to(BinaryOp::Xor));
        let e = binary_op_parser(e, just(Token::Or).to(BinaryOp::Or));

        // Ternary, right-associative through the recursive branches.
        e.clone()
            .then(
                ctrl('?')
                    .ignore_then(expr.clone())
                    .then_ignore(ctrl(':'))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((pass, fail)) => {
                    let span = Span::merge(cond.span, fail.span);
                    Expr {
                        kind: ExprKind::Ternary {
                            cond: Box::new(cond),
                            pass: Box::new(pass),
                            fail: Box::new(fail),
                        },
                        span,
                    }
                }
                None => cond,
            })
            .boxed()
    })
}

fn binary_op_parser<'a, Term, Op>(
    term: Term,
    op: Op,
) -> BoxedParser<'a, Token, Expr, PError>
where
    Term: Parser<Token, Expr, Error = PError> + Clone + 'a,
    Op: Parser<Token, BinaryOp, Error = PError> + 'a,
{
    term.clone()
        .then(op.then(term).repeated())
        .foldl(|left, (op, right)| {
            let span = Span::merge(left.span, right.span);
            Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            }
        })
        .boxed()
}
