//! The AST interpreter: direct execution of `Expr`/`Stmt` over a `Config`.
//!
//! Grounded on the top-level shape of `src/run.rs` (`Runner`/`Executor`:
//! validate once, then execute against fresh state), generalized to this
//! spec's continuation-as-AST statement evaluator (`spec.md` §4.5, §9),
//! which has no teacher analogue (the teacher compiles straight to
//! bytecode and has no tree-walking path left in the retrieved slice).

mod expr;
mod stmt;

use std::collections::{HashMap, HashSet};

use crate::ast::{Definition, Program, Stmt};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::ResourceTracker;
use crate::state::State;

/// Holds the definition table and the shared recursion-depth tracker for one
/// run. Not part of `Config`: call depth is an ambient resource-accounting
/// concern (`spec.md` §4.10), not part of the language's observable state.
pub(crate) struct Interpreter<'a> {
    definitions: &'a HashMap<String, Definition>,
    tracker: &'a mut dyn ResourceTracker,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(definitions: &'a HashMap<String, Definition>, tracker: &'a mut dyn ResourceTracker) -> Self {
        Self {
            definitions,
            tracker,
            depth: 0,
        }
    }

    /// Dispatches a call to either a user-defined function or a builtin
    /// (this is `env.definition` from `spec.md` §4.4/§4.5).
    pub(crate) fn call(&mut self, name: &str, args: Vec<crate::value::Value>, mut config: Config) -> Result<Config> {
        if let Some(def) = self.definitions.get(name) {
            if def.arg_names.len() != args.len() {
                return Err(Error::Dispatch(format!(
                    "`{name}` expects {} argument(s), got {}",
                    def.arg_names.len(),
                    args.len()
                )));
            }
            self.depth += 1;
            let depth_check = self.tracker.check_recursion_depth(self.depth);
            if let Err(e) = depth_check {
                self.depth -= 1;
                return Err(e.into());
            }

            let caller_state = config.state.clone();
            let scope: HashSet<String> = def
                .arg_names
                .iter()
                .chain(def.local_names.iter())
                .cloned()
                .collect();
            config.state = config.state.enter(scope);
            for (arg_name, value) in def.arg_names.iter().zip(args) {
                config.state.update(arg_name, value);
            }

            config = self.exec(config, def.body.clone(), Stmt::Skip)?;
            config.state = State::leave(&caller_state, config.state);
            self.depth -= 1;
            Ok(config)
        } else if crate::builtins::is_builtin(name) {
            let result = crate::builtins::call(name, args, &mut config)?;
            config.last_value = result;
            Ok(config)
        } else {
            Err(Error::Dispatch(format!("call to unknown function `{name}`")))
        }
    }
}

fn definition_table(program: &Program) -> HashMap<String, Definition> {
    program
        .definitions
        .iter()
        .map(|d| (d.name.clone(), d.clone()))
        .collect()
}

/// Runs `program` via direct AST execution (`spec.md` §6's `run`, the
/// AST-interpreter half). Uses no recursion-depth limit; see
/// [`run_ast_with_tracker`] to bound it.
pub fn run_ast(program: &Program, input: Vec<i64>) -> Result<Vec<i64>> {
    let mut tracker = crate::resource::NoLimitTracker;
    run_ast_with_tracker(program, input, &mut tracker)
}

/// As [`run_ast`], but takes an explicit `ResourceTracker` to bound call depth.
pub fn run_ast_with_tracker(program: &Program, input: Vec<i64>, tracker: &mut dyn ResourceTracker) -> Result<Vec<i64>> {
    crate::ast::validate(program)?;
    let definitions = definition_table(program);
    let mut interp = Interpreter::new(&definitions, tracker);
    let config = Config::new(State::empty(), input);
    let config = interp.exec(config, program.main_body.clone(), Stmt::Skip)?;
    Ok(config.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr};

    fn def(name: &str, args: &[&str], locals: &[&str], body: Stmt) -> Definition {
        Definition {
            name: name.to_owned(),
            arg_names: args.iter().map(|s| (*s).to_owned()).collect(),
            local_names: locals.iter().map(|s| (*s).to_owned()).collect(),
            body,
        }
    }

    #[test]
    fn echo_program_reads_and_writes() {
        // x := read(); write(x)
        let body = Stmt::Seq(
            Box::new(Stmt::Assign("x".to_owned(), vec![], Expr::Call("read".to_owned(), vec![]))),
            Box::new(Stmt::Call("write".to_owned(), vec![Expr::Var("x".to_owned())])),
        );
        let program = Program {
            definitions: vec![],
            main_body: body,
        };
        assert_eq!(run_ast(&program, vec![7]).unwrap(), vec![7]);
    }

    #[test]
    fn user_function_call_and_return() {
        // fun inc(n) { return n + 1 } ; write(inc(41))
        let inc = def(
            "inc",
            &["n"],
            &[],
            Stmt::Return(Some(Expr::Binop(
                BinOp::Add,
                Box::new(Expr::Var("n".to_owned())),
                Box::new(Expr::Const(1)),
            ))),
        );
        let main_body = Stmt::Call(
            "write".to_owned(),
            vec![Expr::Call("inc".to_owned(), vec![Expr::Const(41)])],
        );
        let program = Program {
            definitions: vec![inc],
            main_body,
        };
        assert_eq!(run_ast(&program, vec![]).unwrap(), vec![42]);
    }

    #[test]
    fn overlapping_arg_and_local_names_is_rejected() {
        let bad = def("f", &["x"], &["x"], Stmt::Skip);
        let program = Program {
            definitions: vec![bad],
            main_body: Stmt::Skip,
        };
        assert!(matches!(run_ast(&program, vec![]), Err(Error::Internal(_))));
    }

    #[test]
    fn deep_recursion_is_bounded_by_tracker() {
        // fun loop(n) { return loop(n + 1) } ; loop(0)  -- never terminates on its own
        let rec = def(
            "loop",
            &["n"],
            &[],
            Stmt::Return(Some(Expr::Call(
                "loop".to_owned(),
                vec![Expr::Binop(
                    BinOp::Add,
                    Box::new(Expr::Var("n".to_owned())),
                    Box::new(Expr::Const(1)),
                )],
            ))),
        );
        let program = Program {
            definitions: vec![rec],
            main_body: Stmt::Call("loop".to_owned(), vec![Expr::Const(0)]),
        };
        let mut tracker = crate::resource::LimitedTracker::new(50);
        let result = run_ast_with_tracker(&program, vec![], &mut tracker);
        assert!(matches!(result, Err(Error::Resource(_))));
    }
}
