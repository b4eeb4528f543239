use similar_asserts::assert_eq;

use crate::ast::*;
use crate::parse_program;

fn parse_one(source: &str) -> StmtKind {
    let stmts = parse_program(source).unwrap();
    assert_eq!(stmts.len(), 1, "expected one statement from {source:?}");
    stmts.into_iter().next().unwrap().kind
}

fn parse_expr(source: &str) -> ExprKind {
    match parse_one(source) {
        StmtKind::Expression(e) => e.kind,
        other => panic!("expected bare expression, got {other:?}"),
    }
}

#[test]
fn test_assignment() {
    match parse_one("$y = $x + 1") {
        StmtKind::Assignment { lhs, op, rhs } => {
            assert_eq!(lhs, Lvalue::Field("y".to_string()));
            assert_eq!(op, None);
            assert!(matches!(
                rhs.kind,
                ExprKind::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_compound_assignment_with_index() {
    match parse_one("@s[$k] += $x") {
        StmtKind::Assignment { lhs, op, .. } => {
            match lhs {
                Lvalue::Oosvar { name, indices } => {
                    assert_eq!(name, "s");
                    assert_eq!(indices.len(), 1);
                    assert!(matches!(indices[0].kind, ExprKind::Field(ref f) if f == "k"));
                }
                other => panic!("{other:?}"),
            }
            assert_eq!(op, Some(BinaryOp::Add));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_precedence() {
    // * binds tighter than +
    match parse_expr("1 + 2 * 3") {
        ExprKind::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } => {
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }

    // ** is right-associative
    match parse_expr("2 ** 3 ** 2") {
        ExprKind::Binary {
            op: BinaryOp::Pow,
            left,
            right,
        } => {
            assert!(matches!(left.kind, ExprKind::Literal(Literal::Int(2))));
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::Pow,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }

    // ** binds tighter than unary minus
    match parse_expr("-2 ** 2") {
        ExprKind::Unary {
            op: UnaryOp::Minus,
            expr,
        } => {
            assert!(matches!(
                expr.kind,
                ExprKind::Binary {
                    op: BinaryOp::Pow,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }

    // dot-concatenation binds looser than arithmetic
    match parse_expr(r#"$a . $b + 1"#) {
        ExprKind::Binary {
            op: BinaryOp::Concat,
            right,
            ..
        } => {
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_ternary() {
    match parse_expr(r#"$a > 1 ? "big" : "small""#) {
        ExprKind::Ternary { cond, .. } => {
            assert!(matches!(
                cond.kind,
                ExprKind::Binary {
                    op: BinaryOp::Gt,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_context_vars() {
    assert!(matches!(
        parse_expr("NR"),
        ExprKind::ContextVar(ContextVar::Nr)
    ));
    // not a reserved name, so a plain local
    assert!(matches!(parse_expr("nr"), ExprKind::Local(ref n) if n == "nr"));
}

#[test]
fn test_begin_end_emit() {
    let prog = r#"@s[$k] += $x; end { emit @s, "k" }"#;
    let stmts = parse_program(prog).unwrap();
    assert_eq!(stmts.len(), 2);
    match &stmts[1].kind {
        StmtKind::End(body) => match &body[0].kind {
            StmtKind::Emit {
                style,
                redirect,
                target,
                names,
            } => {
                assert_eq!(*style, EmitStyle::Emit);
                assert!(redirect.is_none());
                assert!(matches!(target.kind, ExprKind::Oosvar { ref name, .. } if name == "s"));
                assert_eq!(names.len(), 1);
            }
            other => panic!("{other:?}"),
        },
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_emit_with_redirect() {
    match parse_one(r#"emit > "out.dat", @v"#) {
        StmtKind::Emit { redirect, .. } => {
            let r = redirect.unwrap();
            assert_eq!(r.mode, RedirectMode::Write);
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_if_elif_else() {
    match parse_one("if ($a == 1) { $b = 2 } elif ($a == 3) { $b = 4 } else { $b = 5 }") {
        StmtKind::If { arms, else_body } => {
            assert_eq!(arms.len(), 2);
            assert!(else_body.is_some());
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_for_variants() {
    match parse_one("for (k, v in @m) { print k }") {
        StmtKind::ForMap { keys, value, .. } => {
            assert_eq!(keys, vec!["k".to_string()]);
            assert_eq!(value, "v");
        }
        other => panic!("{other:?}"),
    }

    match parse_one("for ((k1, k2), v in @m) { print k1 }") {
        StmtKind::ForMap { keys, .. } => {
            assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);
        }
        other => panic!("{other:?}"),
    }

    match parse_one("for (int i = 0; i < 10; i += 1) { @n += i }") {
        StmtKind::ForLoop { init, cond, .. } => {
            assert!(matches!(init.kind, StmtKind::VarDecl { .. }));
            assert!(matches!(
                cond.kind,
                ExprKind::Binary {
                    op: BinaryOp::Lt,
                    ..
                }
            ));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_pattern_action_and_filter() {
    match parse_one("NR > 1 { $seen = 1 }") {
        StmtKind::CondBlock { body, .. } => assert_eq!(body.len(), 1),
        other => panic!("{other:?}"),
    }

    assert!(matches!(
        parse_one("filter $a + $b > 5"),
        StmtKind::Filter(_)
    ));
}

#[test]
fn test_func_def_and_call() {
    let prog = "func f(num x) { return x * 2 } $y = f($x)";
    let stmts = parse_program(prog).unwrap();
    match &stmts[0].kind {
        StmtKind::FuncDef { name, params, body } => {
            assert_eq!(name, "f");
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].type_decl, Some(TypeDecl::Num));
            assert!(matches!(body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("{other:?}"),
    }
    match &stmts[1].kind {
        StmtKind::Assignment { rhs, .. } => {
            assert!(matches!(rhs.kind, ExprKind::Call { ref name, .. } if name == "f"));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_unset_and_tee() {
    match parse_one("unset $a, @b[1]") {
        StmtKind::Unset(targets) => assert_eq!(targets.len(), 2),
        other => panic!("{other:?}"),
    }

    match parse_one(r#"tee > "copy.dat", $*"#) {
        StmtKind::Tee { expr, .. } => {
            assert!(matches!(expr.kind, ExprKind::FullRecord));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn test_parse_error_has_span() {
    let errs = parse_program("$a = ").unwrap_err();
    assert!(!errs.is_empty());
    assert!(errs[0].span.is_some());
}
