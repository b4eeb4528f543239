use std::fmt;

use chumsky::{error::Cheap, prelude::*};

use crate::ast::Literal;
use crate::error::{Error, Reason, WithErrorInfo};

/// Reserved words. `true` and `false` lex as boolean literals instead.
const KEYWORDS: &[&str] = &[
    "begin", "end", "if", "elif", "else", "while", "do", "for", "in", "break", "continue", "func",
    "subr", "call", "return", "var", "str", "num", "int", "float", "bool", "unset", "filter",
    "emit", "emitp", "emitf", "tee", "dump", "edump", "print", "printn", "eprint", "eprintn",
];

#[derive(Clone, PartialEq, Debug)]
pub enum Token {
    Ident(String),
    Keyword(String),
    /// `$name`, `${name}`; `$*` lexes as `Field("*")`
    Field(String),
    /// `@name`, `@{name}`; `@*` lexes as `Oosvar("*")`
    Oosvar(String),
    Literal(Literal),

    /// single-char control and operator tokens
    Control(char),

    /// compound assignment, carrying the operator text without the `=`
    OpAssign(String),

    Pow,      // **
    DivInt,   // //
    Shl,      // <<
    Shr,      // >>
    Le,       // <=
    Ge,       // >=
    EqEq,     // ==
    Ne,       // !=
    Match,    // =~
    NotMatch, // !~
    And,      // &&
    Or,       // ||
    Xor,      // ^^
}

pub fn lex(source: &str) -> Result<Vec<(Token, std::ops::Range<usize>)>, Vec<Error>> {
    lexer().parse(source).map_err(|errors| {
        errors
            .into_iter()
            .map(|e| {
                Error::new(Reason::Unexpected {
                    found: "character".to_string(),
                })
                .with_span(Some(e.span().into()))
            })
            .collect()
    })
}

pub fn lexer() -> impl Parser<char, Vec<(Token, std::ops::Range<usize>)>, Error = Cheap<char>> {
    let whitespace = filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .ignored();

    let comment = just('#')
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored();

    let ignored = whitespace.or(comment).repeated().ignored();

    // Compound assignments first so e.g. `**=` never lexes as `**` `=`.
    let op_assign = choice((
        just("**="),
        just("//="),
        just("<<="),
        just(">>="),
        just("&&="),
        just("||="),
        just("^^="),
        just("+="),
        just("-="),
        just("*="),
        just("/="),
        just("%="),
        just(".="),
        just("&="),
        just("|="),
        just("^="),
    ))
    .map(|s: &str| Token::OpAssign(s[..s.len() - 1].to_string()));

    let control_multi = choice((
        just("**").to(Token::Pow),
        just("//").to(Token::DivInt),
        just("<<").to(Token::Shl),
        just(">>").to(Token::Shr),
        just("<=").to(Token::Le),
        just(">=").to(Token::Ge),
        just("==").to(Token::EqEq),
        just("!=").to(Token::Ne),
        just("=~").to(Token::Match),
        just("!~").to(Token::NotMatch),
        just("&&").to(Token::And),
        just("||").to(Token::Or),
        just("^^").to(Token::Xor),
    ));

    let control = one_of("+-*/%.&|^~!<>=?:;,(){}[]").map(Token::Control);

    let field = just('$')
        .ignore_then(sigil_name())
        .map(Token::Field);

    let oosvar = just('@')
        .ignore_then(sigil_name())
        .map(Token::Oosvar);

    let ident = filter(|c: &char| c.is_alphabetic() || *c == '_')
        .chain(filter(|c: &char| c.is_alphanumeric() || *c == '_').repeated())
        .collect::<String>()
        .map(|s| match s.as_str() {
            "true" => Token::Literal(Literal::Bool(true)),
            "false" => Token::Literal(Literal::Bool(false)),
            _ if KEYWORDS.contains(&s.as_str()) => Token::Keyword(s),
            _ => Token::Ident(s),
        });

    let literal = literal().map(Token::Literal);

    let token = choice((
        op_assign,
        control_multi,
        field,
        oosvar,
        literal,
        ident,
        control,
    ));

    ignored
        .clone()
        .ignore_then(token.map_with_span(|tok, span| (tok, span)))
        .repeated()
        .then_ignore(ignored)
        .then_ignore(end())
}

/// The name after a `$` or `@` sigil: plain, braced, or `*`.
fn sigil_name() -> impl Parser<char, String, Error = Cheap<char>> {
    choice((
        just('*').to("*".to_string()),
        filter(|c: &char| c.is_alphabetic() || *c == '_')
            .chain(filter(|c: &char| c.is_alphanumeric() || *c == '_').repeated())
            .collect(),
        none_of('}')
            .repeated()
            .at_least(1)
            .delimited_by(just('{'), just('}'))
            .collect(),
    ))
}

fn literal() -> impl Parser<char, Literal, Error = Cheap<char>> {
    let digits = filter(|c: &char| c.is_ascii_digit()).repeated().at_least(1);

    let exp = one_of("eE").chain(one_of("+-").or_not().chain::<char, _, _>(digits.clone()));

    let frac = just('.').chain::<char, _, _>(digits.clone());

    let number = digits
        .clone()
        .chain::<char, _, _>(frac.or_not().flatten())
        .chain::<char, _, _>(exp.or_not().flatten())
        .collect::<String>()
        .try_map(|str, span| {
            if let Ok(i) = str.parse::<i64>() {
                Ok(Literal::Int(i))
            } else if let Ok(f) = str.parse::<f64>() {
                Ok(Literal::Float(f))
            } else {
                Err(Cheap::expected_input_found(span, None, None))
            }
        })
        .labelled("number");

    let hex = just("0x")
        .or(just("0X"))
        .ignore_then(
            filter(|c: &char| c.is_ascii_hexdigit())
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .try_map(|str, span| {
            u64::from_str_radix(&str, 16)
                .map(|u| Literal::Int(u as i64))
                .map_err(|_| Cheap::expected_input_found(span, None, None))
        });

    let string = quoted_string().map(Literal::String);

    choice((hex, number, string))
}

/// A double-quoted string. Standard escapes are decoded; any other
/// backslash pair (notably `\1`..`\9` capture references and regex escapes
/// like `\.`) is kept verbatim for the regex machinery downstream.
fn quoted_string() -> impl Parser<char, String, Error = Cheap<char>> {
    let escaped = just('\\').ignore_then(choice((
        just('"').to(vec!['"']),
        just('\\').to(vec!['\\']),
        just('n').to(vec!['\n']),
        just('t').to(vec!['\t']),
        just('r').to(vec!['\r']),
        any().map(|c| vec!['\\', c]),
    )));

    let plain = none_of("\"\\").map(|c| vec![c]);

    escaped
        .or(plain)
        .repeated()
        .flatten()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
        .labelled("string")
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "`{s}`"),
            Token::Keyword(s) => write!(f, "keyword `{s}`"),
            Token::Field(s) => write!(f, "${s}"),
            Token::Oosvar(s) => write!(f, "@{s}"),
            Token::Literal(Literal::Int(i)) => write!(f, "{i}"),
            Token::Literal(Literal::Float(x)) => write!(f, "{x}"),
            Token::Literal(Literal::String(s)) => write!(f, "\"{s}\""),
            Token::Literal(Literal::Bool(b)) => write!(f, "{b}"),
            Token::Control(c) => write!(f, "{c}"),
            Token::OpAssign(op) => write!(f, "{op}="),
            Token::Pow => f.write_str("**"),
            Token::DivInt => f.write_str("//"),
            Token::Shl => f.write_str("<<"),
            Token::Shr => f.write_str(">>"),
            Token::Le => f.write_str("<="),
            Token::Ge => f.write_str(">="),
            Token::EqEq => f.write_str("=="),
            Token::Ne => f.write_str("!="),
            Token::Match => f.write_str("=~"),
            Token::NotMatch => f.write_str("!~"),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
            Token::Xor => f.write_str("^^"),
        }
    }
}

// Literal::Float(f64) does not implement Hash, so we cannot simply derive it.
// chumsky::Error needs Hash for the Token so it can deduplicate tokens in
// error messages; hashing the discriminant may merge a few of those, which is
// acceptable.
#[allow(clippy::derived_hash_with_manual_eq)]
impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
    }
}

impl std::cmp::Eq for Token {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            lex_kinds("$a += 1"),
            vec![
                Token::Field("a".to_string()),
                Token::OpAssign("+".to_string()),
                Token::Literal(Literal::Int(1)),
            ]
        );
        assert_eq!(
            lex_kinds("@s[$k] ** 2 // 3"),
            vec![
                Token::Oosvar("s".to_string()),
                Token::Control('['),
                Token::Field("k".to_string()),
                Token::Control(']'),
                Token::Pow,
                Token::Literal(Literal::Int(2)),
                Token::DivInt,
                Token::Literal(Literal::Int(3)),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex_kinds("7"), vec![Token::Literal(Literal::Int(7))]);
        assert_eq!(
            lex_kinds("1.25"),
            vec![Token::Literal(Literal::Float(1.25))]
        );
        assert_eq!(
            lex_kinds("2e3"),
            vec![Token::Literal(Literal::Float(2000.0))]
        );
        assert_eq!(lex_kinds("0xff"), vec![Token::Literal(Literal::Int(255))]);
    }

    #[test]
    fn test_strings_keep_capture_escapes() {
        assert_eq!(
            lex_kinds(r#""a\tb""#),
            vec![Token::Literal(Literal::String("a\tb".to_string()))]
        );
        // \1 survives for downstream capture substitution
        assert_eq!(
            lex_kinds(r#""x_\1""#),
            vec![Token::Literal(Literal::String(r"x_\1".to_string()))]
        );
    }

    #[test]
    fn test_fields_and_oosvars() {
        assert_eq!(
            lex_kinds("${a b} @* $*"),
            vec![
                Token::Field("a b".to_string()),
                Token::Oosvar("*".to_string()),
                Token::Field("*".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokens_with_spans() {
        use insta::assert_debug_snapshot;

        assert_debug_snapshot!(lex("$a = 1").unwrap(), @r###"
        [
            (
                Field(
                    "a",
                ),
                0..2,
            ),
            (
                Control(
                    '=',
                ),
                3..4,
            ),
            (
                Literal(
                    Int(
                        1,
                    ),
                ),
                5..6,
            ),
        ]
        "###);
    }

    #[test]
    fn test_keywords_and_comments() {
        assert_eq!(
            lex_kinds("emit @x # trailing\n"),
            vec![
                Token::Keyword("emit".to_string()),
                Token::Oosvar("x".to_string()),
            ]
        );
        assert_eq!(
            lex_kinds("true false truth"),
            vec![
                Token::Literal(Literal::Bool(true)),
                Token::Literal(Literal::Bool(false)),
                Token::Ident("truth".to_string()),
            ]
        );
    }
}
