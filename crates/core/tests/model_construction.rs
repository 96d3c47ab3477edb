use slicebench_core::{version, BenchError, BinOp, Expr, Function, Slot, Stmt, StmtKind};

fn v(name: &str) -> Expr {
    Expr::var(name)
}

fn c(value: i64) -> Expr {
    Expr::Const(value)
}

fn malformed_reason(result: Result<Function, BenchError>) -> (String, String) {
    match result {
        Err(BenchError::MalformedProgram { function, reason }) => (function, reason),
        Err(other) => panic!("expected MalformedProgram, got {other}"),
        Ok(f) => panic!("expected MalformedProgram, got function `{}`", f.name()),
    }
}

#[test]
fn version_is_non_empty() {
    assert!(!version().is_empty());
}

#[test]
fn statements_are_numbered_in_preorder() {
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("a", v("x")),
            Stmt::if_else(
                Expr::binary(BinOp::Gt, v("x"), c(0)),
                vec![Stmt::assign("a", c(1))],
                vec![Stmt::assign("a", c(2)), Stmt::assign("b", c(3))],
            ),
            Stmt::repeat(
                c(2),
                Some("i".into()),
                vec![Stmt::assign("a", Expr::binary(BinOp::Add, v("a"), v("i")))],
            ),
            Stmt::ret(v("a")),
        ],
    )
    .expect("valid function");

    assert_eq!(f.statement_count(), 8);
    let ids: Vec<usize> = f.statements().iter().map(|s| s.id()).collect();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());
    assert!(matches!(f.statement(1).unwrap().kind(), StmtKind::If { .. }));
    assert!(matches!(
        f.statement(4).unwrap().kind(),
        StmtKind::Assign { target, .. } if target == "b"
    ));
    assert!(matches!(f.statement(5).unwrap().kind(), StmtKind::Loop { .. }));
    assert_eq!(f.return_stmt().id(), 7);
    assert!(f.statement(8).is_none());

    let names: Vec<&str> = f.variables().iter().map(|var| var.name.as_str()).collect();
    assert_eq!(names, vec!["x", "a", "b", "i"]);
    assert!(f.variables().iter().all(|var| var.owner == "f"));
}

#[test]
fn two_returns_are_rejected() {
    let (function, reason) =
        malformed_reason(Function::new("f", vec![], vec![Stmt::ret(c(1)), Stmt::ret(c(2))]));
    assert_eq!(function, "f");
    assert!(reason.contains("2 return statements"), "unexpected reason: {reason}");
}

#[test]
fn a_return_inside_a_branch_counts_as_a_second_return() {
    let body = vec![
        Stmt::if_else(v("x"), vec![Stmt::ret(c(1))], vec![]),
        Stmt::ret(c(2)),
    ];
    let (_, reason) = malformed_reason(Function::new("f", vec!["x".into()], body));
    assert!(reason.contains("exactly one"), "unexpected reason: {reason}");
}

#[test]
fn missing_return_is_rejected() {
    let (_, reason) = malformed_reason(Function::new("f", vec![], vec![Stmt::assign("a", c(1))]));
    assert!(reason.contains("no return"), "unexpected reason: {reason}");
}

#[test]
fn return_must_be_the_last_top_level_statement() {
    let body = vec![Stmt::ret(c(1)), Stmt::assign("a", c(1))];
    let (_, reason) = malformed_reason(Function::new("f", vec![], body));
    assert!(reason.contains("last top-level statement"), "unexpected reason: {reason}");
}

#[test]
fn reading_an_undeclared_variable_is_rejected() {
    let body = vec![Stmt::assign("a", v("b")), Stmt::ret(v("a"))];
    let (_, reason) = malformed_reason(Function::new("f", vec![], body));
    assert!(reason.contains("reads `b` before it is declared"), "unexpected reason: {reason}");
}

#[test]
fn names_first_assigned_in_a_branch_do_not_escape_it() {
    let body = vec![
        Stmt::if_else(v("x"), vec![Stmt::assign("t", c(1))], vec![]),
        Stmt::ret(v("t")),
    ];
    let (_, reason) = malformed_reason(Function::new("f", vec!["x".into()], body));
    assert!(reason.contains("`t`"), "unexpected reason: {reason}");
}

#[test]
fn loop_counter_is_scoped_to_the_body() {
    let ok = Function::new(
        "f",
        vec![],
        vec![
            Stmt::assign("s", c(0)),
            Stmt::repeat(
                c(3),
                Some("i".into()),
                vec![Stmt::assign("s", Expr::binary(BinOp::Add, v("s"), v("i")))],
            ),
            Stmt::ret(v("s")),
        ],
    );
    assert!(ok.is_ok());

    let body = vec![Stmt::repeat(c(3), Some("i".into()), vec![]), Stmt::ret(v("i"))];
    let (_, reason) = malformed_reason(Function::new("f", vec![], body));
    assert!(reason.contains("`i`"), "unexpected reason: {reason}");
}

#[test]
fn duplicate_parameters_are_rejected() {
    let (_, reason) =
        malformed_reason(Function::new("f", vec!["x".into(), "x".into()], vec![Stmt::ret(v("x"))]));
    assert!(reason.contains("declared twice"), "unexpected reason: {reason}");
}

#[test]
fn call_ids_must_be_unique_and_are_readable() {
    let body = vec![
        Stmt::call(None, "g", vec![]).with_call_id("k"),
        Stmt::call(None, "g", vec![]).with_call_id("k"),
        Stmt::ret(c(0)),
    ];
    let (_, reason) = malformed_reason(Function::new("f", vec![], body));
    assert!(reason.contains("@k"), "unexpected reason: {reason}");

    let f = Function::new(
        "f",
        vec![],
        vec![Stmt::call(None, "g", vec![]).with_call_id("k"), Stmt::ret(Expr::call_result("k"))],
    )
    .expect("call result read after the call");
    assert_eq!(f.return_stmt().reads(), vec![Slot::CallId("k".into())]);
    assert_eq!(f.body()[0].defines(), vec![Slot::CallId("k".into())]);
    assert_eq!(f.call_sites(), vec![(0, "g", 0)]);
}

#[test]
fn empty_names_are_rejected_for_assigns_and_calls() {
    let (_, reason) =
        malformed_reason(Function::new("f", vec![], vec![Stmt::assign("", c(1)), Stmt::ret(c(0))]));
    assert!(reason.contains("assigns to an empty name"), "unexpected reason: {reason}");

    let (function, reason) = malformed_reason(Function::new(
        "f",
        vec![],
        vec![Stmt::call(Some(" ".into()), "g", vec![]), Stmt::ret(c(0))],
    ));
    assert_eq!(function, "f");
    assert!(reason.contains("call result in an empty name"), "unexpected reason: {reason}");

    let (_, reason) = malformed_reason(Function::new(
        "f",
        vec![],
        vec![Stmt::call(None, "g", vec![]).with_call_id(""), Stmt::ret(c(0))],
    ));
    assert!(reason.contains("empty call id"), "unexpected reason: {reason}");
}

#[test]
fn empty_function_name_is_rejected() {
    let (function, _) = malformed_reason(Function::new(" ", vec![], vec![Stmt::ret(c(0))]));
    assert_eq!(function, "<unnamed>");
}

#[test]
fn expressions_render_with_parentheses_for_nested_operators() {
    let expr = Expr::binary(BinOp::Mul, Expr::binary(BinOp::Add, v("a"), v("b")), c(2));
    assert_eq!(expr.to_string(), "(a + b) * 2");
    assert_eq!(expr.reads(), vec![Slot::Var("a".into()), Slot::Var("b".into())]);

    let call = Stmt::call(Some("r".into()), "g", vec![v("x"), c(1)]).with_call_id("k");
    assert_eq!(call.summary(), "r = g(x, 1) as @k");
    assert_eq!(Stmt::repeat(v("n"), Some("i".into()), vec![]).summary(), "loop i < n");
    assert_eq!(Stmt::ret(Expr::call_result("k")).summary(), "return @k");
}

#[test]
fn binary_operators_are_total() {
    assert_eq!(BinOp::Div.apply(7, 0), 0);
    assert_eq!(BinOp::Rem.apply(7, 0), 0);
    assert_eq!(BinOp::Div.apply(i64::MIN, -1), 0);
    assert_eq!(BinOp::Add.apply(i64::MAX, 1), i64::MIN);
    assert_eq!(BinOp::Div.apply(-7, 2), -3);
    assert_eq!(BinOp::Lt.apply(1, 2), 1);
    assert_eq!(BinOp::Ge.apply(1, 2), 0);
    assert_eq!(BinOp::And.apply(3, 0), 0);
    assert_eq!(BinOp::Or.apply(0, -4), 1);
}
