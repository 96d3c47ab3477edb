use slicebench_core::{BinOp, DataflowGraph, DepKind, Expr, Function, Slot, Stmt};

fn v(name: &str) -> Expr {
    Expr::var(name)
}

fn c(value: i64) -> Expr {
    Expr::Const(value)
}

fn data(name: &str) -> DepKind {
    DepKind::Data(Slot::Var(name.into()))
}

#[test]
fn straight_line_def_use_edges() {
    // inner(x): y = x + 1; z = x * 99; return y
    let inner = Function::new(
        "inner",
        vec!["x".into()],
        vec![
            Stmt::assign("y", Expr::binary(BinOp::Add, v("x"), c(1))),
            Stmt::assign("z", Expr::binary(BinOp::Mul, v("x"), c(99))),
            Stmt::ret(v("y")),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&inner);
    assert_eq!(graph.function(), "inner");
    assert_eq!(graph.statement_count(), 3);
    assert_eq!(graph.return_id(), 2);
    assert_eq!(graph.edges(), vec![(0, 2, data("y"))]);
}

#[test]
fn redefinition_kills_earlier_definitions() {
    let f = Function::new(
        "f",
        vec![],
        vec![Stmt::assign("a", c(1)), Stmt::assign("a", c(2)), Stmt::ret(v("a"))],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    assert!(graph.has_edge(1, 2));
    assert!(!graph.has_edge(0, 2));
}

#[test]
fn branches_merge_reaching_definitions_and_add_control_edges() {
    // a = 1; if x > 0 { a = 2 } else { b = 3 }; return a
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("a", c(1)),
            Stmt::if_else(
                Expr::binary(BinOp::Gt, v("x"), c(0)),
                vec![Stmt::assign("a", c(2))],
                vec![Stmt::assign("b", c(3))],
            ),
            Stmt::ret(v("a")),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    assert_eq!(
        graph.edges(),
        vec![
            (0, 4, data("a")),
            (1, 2, DepKind::Control),
            (1, 3, DepKind::Control),
            (2, 4, data("a")),
        ]
    );
}

#[test]
fn loops_carry_definitions_around_the_back_edge() {
    // s = 0; loop n as i { s = s + i }; return s
    let f = Function::new(
        "f",
        vec!["n".into()],
        vec![
            Stmt::assign("s", c(0)),
            Stmt::repeat(
                v("n"),
                Some("i".into()),
                vec![Stmt::assign("s", Expr::binary(BinOp::Add, v("s"), v("i")))],
            ),
            Stmt::ret(v("s")),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    let edges = graph.edges();
    assert!(edges.contains(&(0, 2, data("s"))));
    assert!(edges.contains(&(2, 2, data("s"))), "loop-carried self edge missing: {edges:?}");
    assert!(edges.contains(&(1, 2, data("i"))), "counter edge missing: {edges:?}");
    assert!(edges.contains(&(1, 2, DepKind::Control)));
    // Zero iterations keep the pre-loop definition alive.
    assert!(edges.contains(&(0, 3, data("s"))));
    assert!(edges.contains(&(2, 3, data("s"))));
    assert_eq!(edges.len(), 6);
}

#[test]
fn calls_define_their_target_and_call_id() {
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::call(Some("r".into()), "g", vec![v("x")]).with_call_id("k"),
            Stmt::ret(Expr::binary(BinOp::Add, v("r"), Expr::call_result("k"))),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    assert_eq!(
        graph.edges(),
        vec![(0, 1, data("r")), (0, 1, DepKind::Data(Slot::CallId("k".into())))]
    );
}

#[test]
fn nested_statements_depend_only_on_their_direct_parent() {
    // if x { loop 2 { a = 1 } }; return 0
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::if_else(
                v("x"),
                vec![Stmt::repeat(c(2), None, vec![Stmt::assign("a", c(1))])],
                vec![],
            ),
            Stmt::ret(c(0)),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    assert!(graph.has_edge(0, 1));
    assert!(graph.has_edge(1, 2));
    assert!(!graph.has_edge(0, 2));
    assert!(!graph.has_edge(0, 3));
}
