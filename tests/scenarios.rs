//! The concrete scenarios from `spec.md` §8, each run through both
//! execution paths and asserted equal.

use duallang::ast::{BinOp, Definition, Expr, Pattern, Program, Stmt};
use duallang::{run_ast, run_sm};

fn assert_both_paths(program: &Program, input: Vec<i64>, expected: &[i64]) {
    assert_eq!(
        run_ast(program, input.clone()).unwrap(),
        expected,
        "run_ast produced the wrong output"
    );
    assert_eq!(
        run_sm(program, input).unwrap(),
        expected,
        "run_sm produced the wrong output"
    );
}

fn var(name: &str) -> Expr {
    Expr::Var(name.to_owned())
}

fn write(arg: Expr) -> Stmt {
    Stmt::Call("write".to_owned(), vec![arg])
}

fn seq(stmts: Vec<Stmt>) -> Stmt {
    stmts
        .into_iter()
        .rev()
        .reduce(|acc, s| Stmt::Seq(Box::new(s), Box::new(acc)))
        .unwrap_or(Stmt::Skip)
}

#[test]
fn hello_arithmetic() {
    // write((2 + 3) * 4)
    let body = write(Expr::Binop(
        BinOp::Mul,
        Box::new(Expr::Binop(BinOp::Add, Box::new(Expr::Const(2)), Box::new(Expr::Const(3)))),
        Box::new(Expr::Const(4)),
    ));
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![], &[20]);
}

#[test]
fn echo() {
    // x := read(); write(x)
    let body = seq(vec![
        Stmt::Assign("x".to_owned(), vec![], Expr::Call("read".to_owned(), vec![])),
        write(var("x")),
    ]);
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![7], &[7]);
}

#[test]
fn factorial_via_while() {
    // n := read(); r := 1; while n > 0 do r := r * n; n := n - 1 od; write(r)
    let body = seq(vec![
        Stmt::Assign("n".to_owned(), vec![], Expr::Call("read".to_owned(), vec![])),
        Stmt::Assign("r".to_owned(), vec![], Expr::Const(1)),
        Stmt::While(
            Expr::Binop(BinOp::Gt, Box::new(var("n")), Box::new(Expr::Const(0))),
            Box::new(seq(vec![
                Stmt::Assign(
                    "r".to_owned(),
                    vec![],
                    Expr::Binop(BinOp::Mul, Box::new(var("r")), Box::new(var("n"))),
                ),
                Stmt::Assign(
                    "n".to_owned(),
                    vec![],
                    Expr::Binop(BinOp::Sub, Box::new(var("n")), Box::new(Expr::Const(1))),
                ),
            ])),
        ),
        write(var("r")),
    ]);
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![5], &[120]);
}

#[test]
fn array_indexing_and_length() {
    // a := [10, 20, 30]; write(a[1]); write(a.length)
    let body = seq(vec![
        Stmt::Assign(
            "a".to_owned(),
            vec![],
            Expr::Array(vec![Expr::Const(10), Expr::Const(20), Expr::Const(30)]),
        ),
        write(Expr::Elem(Box::new(var("a")), Box::new(Expr::Const(1)))),
        write(Expr::Length(Box::new(var("a")))),
    ]);
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![], &[20, 3]);
}

#[test]
fn pattern_match_on_sexp() {
    // x := `Pair(1, `Nil); case x of `Pair(a, _) -> write(a) | _ -> write(0) esac
    let body = seq(vec![
        Stmt::Assign(
            "x".to_owned(),
            vec![],
            Expr::Sexp("Pair".to_owned(), vec![Expr::Const(1), Expr::Sexp("Nil".to_owned(), vec![])]),
        ),
        Stmt::Case(
            var("x"),
            vec![
                (
                    Pattern::Sexp("Pair".to_owned(), vec![Pattern::Ident("a".to_owned()), Pattern::Wildcard]),
                    write(var("a")),
                ),
                (Pattern::Wildcard, write(Expr::Const(0))),
            ],
        ),
    ]);
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![], &[1]);
}

#[test]
fn repeat_semantics() {
    // i := 0; repeat i := i + 1 until i == 3; write(i)
    let body = seq(vec![
        Stmt::Assign("i".to_owned(), vec![], Expr::Const(0)),
        Stmt::Repeat(
            Expr::Binop(BinOp::Eq, Box::new(var("i")), Box::new(Expr::Const(3))),
            Box::new(Stmt::Assign(
                "i".to_owned(),
                vec![],
                Expr::Binop(BinOp::Add, Box::new(var("i")), Box::new(Expr::Const(1))),
            )),
        ),
        write(var("i")),
    ]);
    let program = Program {
        definitions: vec![],
        main_body: body,
    };
    assert_both_paths(&program, vec![], &[3]);
}

#[test]
fn user_defined_function_via_both_paths() {
    // fun double(n) { return n * 2 } ; write(double(read()))
    let double = Definition {
        name: "double".to_owned(),
        arg_names: vec!["n".to_owned()],
        local_names: vec![],
        body: Stmt::Return(Some(Expr::Binop(BinOp::Mul, Box::new(var("n")), Box::new(Expr::Const(2))))),
    };
    let program = Program {
        definitions: vec![double],
        main_body: write(Expr::Call("double".to_owned(), vec![Expr::Call("read".to_owned(), vec![])])),
    };
    assert_both_paths(&program, vec![21], &[42]);
}

#[test]
fn multi_argument_call_evaluates_arguments_left_to_right_on_both_paths() {
    // fun sub(a, b) { return a - b } ; write(sub(read(), read()))
    let sub = Definition {
        name: "sub".to_owned(),
        arg_names: vec!["a".to_owned(), "b".to_owned()],
        local_names: vec![],
        body: Stmt::Return(Some(Expr::Binop(BinOp::Sub, Box::new(var("a")), Box::new(var("b"))))),
    };
    let program = Program {
        definitions: vec![sub],
        main_body: write(Expr::Call(
            "sub".to_owned(),
            vec![Expr::Call("read".to_owned(), vec![]), Expr::Call("read".to_owned(), vec![])],
        )),
    };
    // Input is consumed left-to-right: a = 10, b = 3.
    assert_both_paths(&program, vec![10, 3], &[7]);
}
