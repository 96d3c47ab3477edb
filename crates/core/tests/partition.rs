use slicebench_core::{
    compose, partition, partition_chain, partition_from, slice_from, BenchError, BinOp,
    DataflowGraph, Expr, Function, SliceDirection, Stmt,
};

fn v(name: &str) -> Expr {
    Expr::var(name)
}

fn c(value: i64) -> Expr {
    Expr::Const(value)
}

fn inner() -> Function {
    Function::new(
        "inner",
        vec!["x".into()],
        vec![
            Stmt::assign("y", Expr::binary(BinOp::Add, v("x"), c(1))),
            Stmt::assign("z", Expr::binary(BinOp::Mul, v("x"), c(99))),
            Stmt::ret(v("y")),
        ],
    )
    .unwrap()
}

#[test]
fn unused_computation_is_dead() {
    let live = partition(&DataflowGraph::build(&inner()));
    assert_eq!(live.function(), "inner");
    assert_eq!(live.as_slice(), &[true, false, true]);
    assert_eq!(live.live_ids(), vec![0, 2]);
    assert_eq!(live.dead_ids(), vec![1]);
    assert!(!live.is_live(99));
}

#[test]
fn both_arms_of_a_conditional_are_kept() {
    // a = 0; if x > 0 { a = 1 } else { a = 2 }; return a
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("a", c(0)),
            Stmt::if_else(
                Expr::binary(BinOp::Gt, v("x"), c(0)),
                vec![Stmt::assign("a", c(1))],
                vec![Stmt::assign("a", c(2))],
            ),
            Stmt::ret(v("a")),
        ],
    )
    .unwrap();

    let live = partition(&DataflowGraph::build(&f));
    // The initial `a = 0` is overwritten on every path.
    assert_eq!(live.as_slice(), &[false, true, true, true, true]);
}

#[test]
fn condition_inputs_of_a_live_branch_are_live() {
    // flag = x > 3; r = 1; if flag { r = 2 }; return r
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("flag", Expr::binary(BinOp::Gt, v("x"), c(3))),
            Stmt::assign("r", c(1)),
            Stmt::if_else(v("flag"), vec![Stmt::assign("r", c(2))], vec![]),
            Stmt::ret(v("r")),
        ],
    )
    .unwrap();

    let live = partition(&DataflowGraph::build(&f));
    assert_eq!(live.live_count(), 5);
}

#[test]
fn dead_to_dead_chains_stay_dead() {
    // d1 = x * 2; d2 = d1 + 1; d3 = d2 * d1; r = x + 1; return r
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("d1", Expr::binary(BinOp::Mul, v("x"), c(2))),
            Stmt::assign("d2", Expr::binary(BinOp::Add, v("d1"), c(1))),
            Stmt::assign("d3", Expr::binary(BinOp::Mul, v("d2"), v("d1"))),
            Stmt::assign("r", Expr::binary(BinOp::Add, v("x"), c(1))),
            Stmt::ret(v("r")),
        ],
    )
    .unwrap();

    let graph = DataflowGraph::build(&f);
    let live = partition(&graph);
    assert_eq!(live.as_slice(), &[false, false, false, true, true]);

    // From a different criterion the same chain is live.
    let from_d2 = partition_from(&graph, 1).expect("criterion in range");
    assert_eq!(from_d2.live_ids(), vec![0, 1]);
}

#[test]
fn forward_slices_follow_uses_of_the_criterion() {
    // d1 = x * 2; d2 = d1 + 1; d3 = d2 * d1; r = x + 1; return r
    let f = Function::new(
        "f",
        vec!["x".into()],
        vec![
            Stmt::assign("d1", Expr::binary(BinOp::Mul, v("x"), c(2))),
            Stmt::assign("d2", Expr::binary(BinOp::Add, v("d1"), c(1))),
            Stmt::assign("d3", Expr::binary(BinOp::Mul, v("d2"), v("d1"))),
            Stmt::assign("r", Expr::binary(BinOp::Add, v("x"), c(1))),
            Stmt::ret(v("r")),
        ],
    )
    .unwrap();
    let graph = DataflowGraph::build(&f);

    let from_d1 = slice_from(&graph, 0, SliceDirection::Forward).expect("criterion in range");
    assert_eq!(from_d1.live_ids(), vec![0, 1, 2]);
    let from_r = slice_from(&graph, 3, SliceDirection::Forward).expect("criterion in range");
    assert_eq!(from_r.live_ids(), vec![3, 4]);

    assert_eq!(
        slice_from(&graph, 2, SliceDirection::Backward).unwrap(),
        partition_from(&graph, 2).unwrap()
    );
    assert_eq!(SliceDirection::default(), SliceDirection::Backward);
    assert!(slice_from(&graph, 5, SliceDirection::Forward).is_err());
}

#[test]
fn forward_slices_include_statements_nested_under_the_criterion() {
    // s = 0; loop n as i { s = s + i; junk = i * 2 }; return s
    let f = Function::new(
        "f",
        vec!["n".into()],
        vec![
            Stmt::assign("s", c(0)),
            Stmt::repeat(
                v("n"),
                Some("i".into()),
                vec![
                    Stmt::assign("s", Expr::binary(BinOp::Add, v("s"), v("i"))),
                    Stmt::assign("junk", Expr::binary(BinOp::Mul, v("i"), c(2))),
                ],
            ),
            Stmt::ret(v("s")),
        ],
    )
    .unwrap();
    let graph = DataflowGraph::build(&f);

    let from_loop = slice_from(&graph, 1, SliceDirection::Forward).unwrap();
    assert_eq!(from_loop.live_ids(), vec![1, 2, 3, 4]);
    let from_init = slice_from(&graph, 0, SliceDirection::Forward).unwrap();
    assert_eq!(from_init.live_ids(), vec![0, 2, 4]);
}

#[test]
fn loop_bookkeeping_is_dead_but_the_accumulator_is_live() {
    // s = 0; loop n as i { s = s + i; junk = i * 2 }; return s
    let f = Function::new(
        "f",
        vec!["n".into()],
        vec![
            Stmt::assign("s", c(0)),
            Stmt::repeat(
                v("n"),
                Some("i".into()),
                vec![
                    Stmt::assign("s", Expr::binary(BinOp::Add, v("s"), v("i"))),
                    Stmt::assign("junk", Expr::binary(BinOp::Mul, v("i"), c(2))),
                ],
            ),
            Stmt::ret(v("s")),
        ],
    )
    .unwrap();

    let live = partition(&DataflowGraph::build(&f));
    assert_eq!(live.as_slice(), &[true, true, true, false, true]);
}

#[test]
fn partitioning_is_idempotent() {
    let graph = DataflowGraph::build(&inner());
    let first = partition(&graph);
    let second = partition(&DataflowGraph::build(&inner()));
    assert_eq!(first, second);
    assert_eq!(first, partition(&graph));
}

#[test]
fn out_of_range_criterion_is_malformed() {
    let graph = DataflowGraph::build(&inner());
    match partition_from(&graph, 3) {
        Err(BenchError::MalformedProgram { function, reason }) => {
            assert_eq!(function, "inner");
            assert!(reason.contains("out of range"), "unexpected reason: {reason}");
        }
        other => panic!("expected MalformedProgram, got {other:?}"),
    }
}

#[test]
fn callee_liveness_follows_the_call_result() {
    let main = Function::new(
        "main",
        vec![],
        vec![Stmt::call(Some("r".into()), "inner", vec![c(4)]), Stmt::ret(v("r"))],
    )
    .unwrap();
    let chain = compose("main", &[main, inner()]).unwrap();

    let live = partition_chain(&chain);
    assert_eq!(live.entry(), "main");
    assert_eq!(live.get("main").unwrap().as_slice(), &[true, true]);
    assert_eq!(live.get("inner").unwrap().as_slice(), &[true, false, true]);
    assert!(live.is_live("inner", 2));
    assert_eq!(live.live_count(), 4);
}

#[test]
fn unused_call_results_leave_the_callee_dead() {
    let main = Function::new(
        "main",
        vec![],
        vec![Stmt::call(Some("r".into()), "inner", vec![c(4)]), Stmt::ret(c(7))],
    )
    .unwrap();
    let chain = compose("main", &[main, inner()]).unwrap();

    let live = partition_chain(&chain);
    assert_eq!(live.get("main").unwrap().as_slice(), &[false, true]);
    assert_eq!(live.get("inner").unwrap().as_slice(), &[false, false, false]);
}

#[test]
fn liveness_propagates_across_several_layers() {
    // main -> f -> g; g's return feeds f's return feeds main's return.
    let g = Function::new(
        "g",
        vec!["a".into()],
        vec![
            Stmt::assign("noise", Expr::binary(BinOp::Mul, v("a"), c(3))),
            Stmt::ret(Expr::binary(BinOp::Sub, v("a"), c(1))),
        ],
    )
    .unwrap();
    let f = Function::new(
        "f",
        vec!["a".into()],
        vec![
            Stmt::call(None, "g", vec![v("a")]).with_call_id("g1"),
            Stmt::call(Some("ignored".into()), "g", vec![c(0)]),
            Stmt::ret(Expr::binary(BinOp::Mul, Expr::call_result("g1"), c(2))),
        ],
    )
    .unwrap();
    let main = Function::new(
        "main",
        vec![],
        vec![Stmt::call(Some("out".into()), "f", vec![c(5)]), Stmt::ret(v("out"))],
    )
    .unwrap();
    let chain = compose("main", &[g, f, main]).unwrap();

    let live = partition_chain(&chain);
    assert_eq!(live.get("f").unwrap().as_slice(), &[true, false, true]);
    assert_eq!(live.get("g").unwrap().as_slice(), &[false, true]);
    let order: Vec<&str> = live.functions().iter().map(|l| l.function()).collect();
    assert_eq!(order, vec!["main", "f", "g"]);
}
