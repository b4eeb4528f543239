use chumsky::prelude::*;

use super::common::*;
use super::expr::expr;
use crate::ast::*;
use crate::lexer::Token;

pub(crate) fn program() -> impl Parser<Token, Vec<Stmt>, Error = PError> {
    let semis = ctrl(';').repeated().ignored();
    semis
        .clone()
        .ignore_then(stmt().then_ignore(semis).repeated())
        .then_ignore(end())
}

fn stmt() -> impl Parser<Token, Stmt, Error = PError> + Clone {
    recursive(|stmt| {
        let ex = expr();
        let semis = ctrl(';').repeated().ignored();

        let block = semis
            .clone()
            .ignore_then(stmt.clone().then_ignore(semis).repeated())
            .delimited_by(ctrl('{'), ctrl('}'))
            .boxed();

        let indices = ex
            .clone()
            .delimited_by(ctrl('['), ctrl(']'))
            .repeated()
            .boxed();

        let lvalue = choice((
            select! { Token::Field(name) => name }.map(|name| {
                if name == "*" {
                    Lvalue::FullRecord
                } else {
                    Lvalue::Field(name)
                }
            }),
            select! { Token::Oosvar(name) => name }
                .then(indices.clone())
                .map(|(name, indices)| {
                    if name == "*" {
                        Lvalue::FullOosvar
                    } else {
                        Lvalue::Oosvar { name, indices }
                    }
                }),
            ident_part().map(Lvalue::Local),
        ))
        .boxed();

        let redirect = choice((
            just(Token::Shr).to(RedirectMode::Append),
            ctrl('>').to(RedirectMode::Write),
            ctrl('|').to(RedirectMode::Pipe),
        ))
        .then(ex.clone())
        .map(|(mode, target)| Redirect {
            mode,
            target: Box::new(target),
        })
        .boxed();

        let type_decl = choice((
            keyword("var").to(TypeDecl::Var),
            keyword("str").to(TypeDecl::Str),
            keyword("num").to(TypeDecl::Num),
            keyword("int").to(TypeDecl::Int),
            keyword("float").to(TypeDecl::Float),
            keyword("bool").to(TypeDecl::Bool),
        ))
        .boxed();

        let assign_op = ctrl('=')
            .map(|_| None)
            .or(
                select! { Token::OpAssign(op) => op }.try_map(|op, span| {
                    assign_op_from_str(&op)
                        .map(Some)
                        .ok_or_else(|| Simple::custom(span, "unknown assignment operator"))
                }),
            )
            .boxed();

        let assignment = lvalue
            .clone()
            .then(assign_op)
            .then(ex.clone())
            .map(|((lhs, op), rhs)| StmtKind::Assignment { lhs, op, rhs })
            .boxed();

        let var_decl = type_decl
            .then(ident_part())
            .then(ctrl('=').ignore_then(ex.clone()).or_not())
            .map(|((type_decl, name), rhs)| StmtKind::VarDecl {
                type_decl,
                name,
                rhs,
            })
            .boxed();

        let params = type_decl_param()
            .separated_by(ctrl(','))
            .allow_trailing()
            .delimited_by(ctrl('('), ctrl(')'))
            .boxed();

        let cond_parens = ex
            .clone()
            .delimited_by(ctrl('('), ctrl(')'))
            .boxed();

        let begin_block = keyword("begin")
            .ignore_then(block.clone())
            .map(StmtKind::Begin);

        let end_block = keyword("end").ignore_then(block.clone()).map(StmtKind::End);

        let func_def = keyword("func")
            .ignore_then(ident_part())
            .then(params.clone())
            .then(block.clone())
            .map(|((name, params), body)| StmtKind::FuncDef { name, params, body });

        let subr_def = keyword("subr")
            .ignore_then(ident_part())
            .then(params)
            .then(block.clone())
            .map(|((name, params), body)| StmtKind::SubrDef { name, params, body });

        let call_subr = keyword("call")
            .ignore_then(ident_part())
            .then(
                ex.clone()
                    .separated_by(ctrl(','))
                    .allow_trailing()
                    .delimited_by(ctrl('('), ctrl(')')),
            )
            .map(|(name, args)| StmtKind::CallSubr { name, args });

        let return_stmt = keyword("return")
            .ignore_then(ex.clone().or_not())
            .map(StmtKind::Return);

        let unset = keyword("unset")
            .ignore_then(lvalue.clone().separated_by(ctrl(',')).at_least(1))
            .map(StmtKind::Unset);

        let filter_stmt = keyword("filter")
            .ignore_then(ex.clone())
            .map(StmtKind::Filter);

        let if_stmt = keyword("if")
            .ignore_then(cond_parens.clone().then(block.clone()))
            .then(
                keyword("elif")
                    .ignore_then(cond_parens.clone().then(block.clone()))
                    .repeated(),
            )
            .then(keyword("else").ignore_then(block.clone()).or_not())
            .map(|((first, rest), else_body)| {
                let mut arms = vec![first];
                arms.extend(rest);
                StmtKind::If { arms, else_body }
            });

        let while_stmt = keyword("while")
            .ignore_then(cond_parens.clone())
            .then(block.clone())
            .map(|(cond, body)| StmtKind::While { cond, body });

        let do_while = keyword("do")
            .ignore_then(block.clone())
            .then_ignore(keyword("while"))
            .then(cond_parens.clone())
            .map(|(body, cond)| StmtKind::DoWhile { body, cond });

        // `for ((k1, k2), v in @m) { ... }` or `for (k, v in $*) { ... }`
        let key_list = ident_part()
            .map(|k| vec![k])
            .or(ident_part()
                .separated_by(ctrl(','))
                .at_least(1)
                .delimited_by(ctrl('('), ctrl(')')))
            .boxed();

        let for_map = keyword("for")
            .ignore_then(
                ctrl('(')
                    .ignore_then(key_list)
                    .then_ignore(ctrl(','))
                    .then(ident_part())
                    .then_ignore(keyword("in"))
                    .then(ex.clone())
                    .then_ignore(ctrl(')')),
            )
            .then(block.clone())
            .map(|(((keys, value), target), body)| StmtKind::ForMap {
                keys,
                value,
                target,
                body,
            });

        let simple_stmt = var_decl
            .clone()
            .or(assignment.clone())
            .map_with_span(into_stmt)
            .boxed();

        let for_c = keyword("for")
            .ignore_then(
                ctrl('(')
                    .ignore_then(simple_stmt.clone())
                    .then_ignore(ctrl(';'))
                    .then(ex.clone())
                    .then_ignore(ctrl(';'))
                    .then(simple_stmt)
                    .then_ignore(ctrl(')')),
            )
            .then(block.clone())
            .map(|(((init, cond), step), body)| StmtKind::ForLoop {
                init: Box::new(init),
                cond,
                step: Box::new(step),
                body,
            });

        let emit_stmt = choice((
            keyword("emit").to(EmitStyle::Emit),
            keyword("emitp").to(EmitStyle::EmitP),
        ))
        .then(redirect.clone().then_ignore(ctrl(',')).or_not())
        .then(ex.clone())
        .then(ctrl(',').ignore_then(ex.clone()).repeated())
        .map(|(((style, redirect), target), names)| StmtKind::Emit {
            style,
            redirect,
            target,
            names,
        });

        let emitf = keyword("emitf")
            .ignore_then(redirect.clone().then_ignore(ctrl(',')).or_not())
            .then(ex.clone().separated_by(ctrl(',')).at_least(1))
            .map(|(redirect, names)| StmtKind::EmitF { redirect, names });

        let tee_stmt = keyword("tee")
            .ignore_then(redirect.clone())
            .then_ignore(ctrl(','))
            .then(ex.clone())
            .map(|(redirect, expr)| StmtKind::Tee { redirect, expr });

        let print_stmt = choice((
            keyword("print").to((false, true)),
            keyword("printn").to((false, false)),
            keyword("eprint").to((true, true)),
            keyword("eprintn").to((true, false)),
        ))
        .then(redirect.clone().then_ignore(ctrl(',')).or_not())
        .then(ex.clone().or_not())
        .map(|(((stderr, newline), redirect), expr)| StmtKind::Print {
            redirect,
            expr,
            newline,
            stderr,
        });

        let dump_stmt = keyword("dump")
            .to(false)
            .or(keyword("edump").to(true))
            .then(redirect.or_not())
            .map(|(stderr, redirect)| StmtKind::Dump { redirect, stderr });

        let cond_block = ex
            .clone()
            .then(block)
            .map(|(cond, body)| StmtKind::CondBlock { cond, body });

        let bare_expr = ex.map(StmtKind::Expression);

        choice((
            begin_block.boxed(),
            end_block.boxed(),
            func_def.boxed(),
            subr_def.boxed(),
            call_subr.boxed(),
            return_stmt.boxed(),
            keyword("break").to(StmtKind::Break).boxed(),
            keyword("continue").to(StmtKind::Continue).boxed(),
            var_decl.boxed(),
            unset.boxed(),
            filter_stmt.boxed(),
            if_stmt.boxed(),
            while_stmt.boxed(),
            do_while.boxed(),
            for_map.boxed(),
            for_c.boxed(),
            emit_stmt.boxed(),
            emitf.boxed(),
            tee_stmt.boxed(),
            print_stmt.boxed(),
            dump_stmt.boxed(),
            assignment.boxed(),
            cond_block.boxed(),
            bare_expr.boxed(),
        ))
        .map_with_span(into_stmt)
    })
}

fn type_decl_param() -> impl Parser<Token, Param, Error = PError> + Clone {
    choice((
        keyword("var").to(TypeDecl::Var),
        keyword("str").to(TypeDecl::Str),
        keyword("num").to(TypeDecl::Num),
        keyword("int").to(TypeDecl::Int),
        keyword("float").to(TypeDecl::Float),
        keyword("bool").to(TypeDecl::Bool),
    ))
    .or_not()
    .then(ident_part())
    .map(|(type_decl, name)| Param { name, type_decl })
}
