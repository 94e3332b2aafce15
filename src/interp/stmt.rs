//! Statement evaluation with an AST continuation (`spec.md` §4.5, §9).
//!
//! `exec` is written as an explicit loop over a mutable `(current, k)` pair
//! rather than native recursion, so a deeply right-nested `Seq` spine does
//! not grow the native Rust call stack — the "loop with mutable
//! current-stmt/current-k" encoding `spec.md` §9 recommends. Function calls
//! (via [`Interpreter::call`]) still recurse natively, one level per nested
//! call, bounded by the shared `ResourceTracker`.

use std::collections::HashSet;
use std::mem;

use crate::ast::{BinOp, Expr, Stmt};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::pattern::{match_pattern, MatchFrame};
use crate::value::Value;

/// `s ⋄ k` from `spec.md` §4.5: `Skip` is the identity, otherwise sequence.
fn join(s: Stmt, k: Stmt) -> Stmt {
    if matches!(k, Stmt::Skip) {
        s
    } else {
        Stmt::Seq(Box::new(s), Box::new(k))
    }
}

impl Interpreter<'_> {
    /// `eval(env, config, k, stmt) → config` from `spec.md` §4.5. The
    /// initial call passes `k = Skip`.
    pub(crate) fn exec(&mut self, mut config: Config, stmt: Stmt, k: Stmt) -> Result<Config> {
        let mut current = stmt;
        let mut k = k;
        loop {
            match current {
                Stmt::Assign(name, indices, rhs) if indices.is_empty() => {
                    config = self.eval_expr(config, &rhs)?;
                    let v = take_value(&mut config)?;
                    config.state.update(&name, v);
                    current = Stmt::Skip;
                }
                Stmt::Assign(name, indices, rhs) => {
                    let mut idx_values = Vec::with_capacity(indices.len());
                    for idx_expr in &indices {
                        config = self.eval_expr(config, idx_expr)?;
                        idx_values.push(take_value(&mut config)?.to_int()?);
                    }
                    config = self.eval_expr(config, &rhs)?;
                    let v = take_value(&mut config)?;
                    let root = config.state.eval(&name)?;
                    let updated = crate::value::update_path(&root, &idx_values, v)?;
                    config.state.update(&name, updated);
                    current = Stmt::Skip;
                }
                Stmt::Seq(s1, s2) => {
                    k = join(*s2, k);
                    current = *s1;
                }
                Stmt::Skip => {
                    if matches!(k, Stmt::Skip) {
                        return Ok(config);
                    }
                    current = mem::replace(&mut k, Stmt::Skip);
                }
                Stmt::If(cond, t, e) => {
                    config = self.eval_expr(config, &cond)?;
                    let c = take_value(&mut config)?.to_int()?;
                    current = if c != 0 { *t } else { *e };
                }
                Stmt::While(cond, body) => {
                    config = self.eval_expr(config, &cond)?;
                    let c = take_value(&mut config)?.to_int()?;
                    if c == 0 {
                        current = Stmt::Skip;
                    } else {
                        let while_node = Stmt::While(cond, body.clone());
                        k = join(while_node, k);
                        current = *body;
                    }
                }
                Stmt::Repeat(cond, body) => {
                    let post_test = Stmt::While(
                        Expr::Binop(BinOp::Eq, Box::new(cond), Box::new(Expr::Const(0))),
                        body.clone(),
                    );
                    current = Stmt::Seq(body, Box::new(post_test));
                }
                Stmt::Call(name, args) => {
                    let mut values = Vec::with_capacity(args.len());
                    for arg in &args {
                        config = self.eval_expr(config, arg)?;
                        values.push(take_value(&mut config)?);
                    }
                    config = self.call(&name, values, config)?;
                    config.last_value = None;
                    current = Stmt::Skip;
                }
                Stmt::Return(None) => {
                    config.last_value = None;
                    return Ok(config);
                }
                Stmt::Return(Some(e)) => {
                    return self.eval_expr(config, &e);
                }
                Stmt::Case(scrutinee, branches) => {
                    config = self.eval_expr(config, &scrutinee)?;
                    let v = take_value(&mut config)?;
                    let matched = branches
                        .into_iter()
                        .find_map(|(pat, body)| match_pattern(&pat, &v, MatchFrame::new()).map(|frame| (pat, body, frame)));
                    match matched {
                        Some((pat, body, frame)) => {
                            let scope: HashSet<String> = pat.vars().into_iter().collect();
                            config.state.push(scope);
                            for (name, value) in frame {
                                config.state.update(&name, value);
                            }
                            current = Stmt::Seq(Box::new(body), Box::new(Stmt::Leave));
                        }
                        None => {
                            current = Stmt::Skip;
                        }
                    }
                }
                Stmt::Leave => {
                    config.state.drop_frame()?;
                    current = Stmt::Skip;
                }
            }
        }
    }
}

fn take_value(config: &mut Config) -> Result<Value> {
    config
        .last_value
        .take()
        .ok_or_else(|| Error::Internal("expected last_value to be defined".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use std::collections::HashMap;

    fn run_stmt(stmt: Stmt, input: Vec<i64>) -> Result<Vec<i64>> {
        let defs = HashMap::new();
        let mut tracker = crate::resource::NoLimitTracker;
        let mut interp = Interpreter::new(&defs, &mut tracker);
        let config = Config::new(State::empty(), input);
        let config = interp.exec(config, stmt, Stmt::Skip)?;
        Ok(config.output)
    }

    #[test]
    fn while_loop_computes_factorial() {
        // n := read(); r := 1; while n > 0 do r := r * n; n := n - 1 od; write(r)
        let body = Stmt::Seq(
            Box::new(Stmt::Assign("n".to_owned(), vec![], Expr::Call("read".to_owned(), vec![]))),
            Box::new(Stmt::Seq(
                Box::new(Stmt::Assign("r".to_owned(), vec![], Expr::Const(1))),
                Box::new(Stmt::Seq(
                    Box::new(Stmt::While(
                        Expr::Binop(BinOp::Gt, Box::new(Expr::Var("n".to_owned())), Box::new(Expr::Const(0))),
                        Box::new(Stmt::Seq(
                            Box::new(Stmt::Assign(
                                "r".to_owned(),
                                vec![],
                                Expr::Binop(BinOp::Mul, Box::new(Expr::Var("r".to_owned())), Box::new(Expr::Var("n".to_owned()))),
                            )),
                            Box::new(Stmt::Assign(
                                "n".to_owned(),
                                vec![],
                                Expr::Binop(BinOp::Sub, Box::new(Expr::Var("n".to_owned())), Box::new(Expr::Const(1))),
                            )),
                        )),
                    )),
                    Box::new(Stmt::Call("write".to_owned(), vec![Expr::Var("r".to_owned())])),
                )),
            )),
        );
        assert_eq!(run_stmt(body, vec![5]).unwrap(), vec![120]);
    }

    #[test]
    fn repeat_executes_body_at_least_once() {
        // i := 0; repeat i := i + 1 until i == 3; write(i)
        let body = Stmt::Seq(
            Box::new(Stmt::Assign("i".to_owned(), vec![], Expr::Const(0))),
            Box::new(Stmt::Seq(
                Box::new(Stmt::Repeat(
                    Expr::Binop(BinOp::Eq, Box::new(Expr::Var("i".to_owned())), Box::new(Expr::Const(3))),
                    Box::new(Stmt::Assign(
                        "i".to_owned(),
                        vec![],
                        Expr::Binop(BinOp::Add, Box::new(Expr::Var("i".to_owned())), Box::new(Expr::Const(1))),
                    )),
                )),
                Box::new(Stmt::Call("write".to_owned(), vec![Expr::Var("i".to_owned())])),
            )),
        );
        assert_eq!(run_stmt(body, vec![]).unwrap(), vec![3]);
    }

    #[test]
    fn case_with_no_matching_branch_is_silent_no_op() {
        // case `Nil of `Pair(a, b) -> write(1) esac ; write(2)
        let body = Stmt::Seq(
            Box::new(Stmt::Case(
                Expr::Sexp("Nil".to_owned(), vec![]),
                vec![(
                    crate::ast::Pattern::Sexp(
                        "Pair".to_owned(),
                        vec![crate::ast::Pattern::Wildcard, crate::ast::Pattern::Wildcard],
                    ),
                    Stmt::Call("write".to_owned(), vec![Expr::Const(1)]),
                )],
            )),
            Box::new(Stmt::Call("write".to_owned(), vec![Expr::Const(2)])),
        );
        assert_eq!(run_stmt(body, vec![]).unwrap(), vec![2]);
    }

    #[test]
    fn case_binds_pattern_variables_then_leaves_frame() {
        // x := `Pair(1, `Nil); case x of `Pair(a, _) -> write(a) | _ -> write(0) esac
        let body = Stmt::Seq(
            Box::new(Stmt::Assign(
                "x".to_owned(),
                vec![],
                Expr::Sexp(
                    "Pair".to_owned(),
                    vec![Expr::Const(1), Expr::Sexp("Nil".to_owned(), vec![])],
                ),
            )),
            Box::new(Stmt::Case(
                Expr::Var("x".to_owned()),
                vec![
                    (
                        crate::ast::Pattern::Sexp(
                            "Pair".to_owned(),
                            vec![
                                crate::ast::Pattern::Ident("a".to_owned()),
                                crate::ast::Pattern::Wildcard,
                            ],
                        ),
                        Stmt::Call("write".to_owned(), vec![Expr::Var("a".to_owned())]),
                    ),
                    (
                        crate::ast::Pattern::Wildcard,
                        Stmt::Call("write".to_owned(), vec![Expr::Const(0)]),
                    ),
                ],
            )),
        );
        assert_eq!(run_stmt(body, vec![]).unwrap(), vec![1]);
    }

    #[test]
    fn indexed_assignment_updates_array_element() {
        // a := [10, 20, 30]; a[1] := 99; write(a[1])
        let body = Stmt::Seq(
            Box::new(Stmt::Assign(
                "a".to_owned(),
                vec![],
                Expr::Array(vec![Expr::Const(10), Expr::Const(20), Expr::Const(30)]),
            )),
            Box::new(Stmt::Seq(
                Box::new(Stmt::Assign("a".to_owned(), vec![Expr::Const(1)], Expr::Const(99))),
                Box::new(Stmt::Call(
                    "write".to_owned(),
                    vec![Expr::Elem(Box::new(Expr::Var("a".to_owned())), Box::new(Expr::Const(1)))],
                )),
            )),
        );
        assert_eq!(run_stmt(body, vec![]).unwrap(), vec![99]);
    }

    #[test]
    fn deeply_nested_seq_does_not_blow_the_native_stack() {
        let mut body = Stmt::Call("write".to_owned(), vec![Expr::Const(0)]);
        for _ in 0..10_000 {
            body = Stmt::Seq(Box::new(Stmt::Skip), Box::new(body));
        }
        assert_eq!(run_stmt(body, vec![]).unwrap(), vec![0]);
    }
}
