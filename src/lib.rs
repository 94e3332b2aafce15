//! An AST interpreter and stack-machine compiler/interpreter for a small
//! imperative language with arrays, strings, and S-expressions (`spec.md`).
//!
//! Two execution paths, observationally equivalent on any well-formed
//! program (`spec.md` §1, P1): direct tree-walking interpretation
//! ([`run_ast`]) and AST-to-bytecode compilation followed by stack-machine
//! interpretation ([`run_sm`], [`compile`] + [`bytecode::run`]). Both produce
//! the same `Vec<i64>` of integers written by the source program's `write`
//! calls, given the same integer input queue.

pub mod ast;
pub mod builtins;
pub mod bytecode;
pub mod config;
pub mod error;
mod interp;
pub mod pattern;
pub mod resource;
pub mod state;
pub mod tracer;
pub mod value;

pub use bytecode::{compile, Program};
pub use error::{Error, Result};
pub use interp::{run_ast, run_ast_with_tracker};
pub use resource::{LimitedTracker, NoLimitTracker, ResourceTracker, RunConfig};
pub use tracer::{NoopTracer, SmTracer, StderrTracer};

/// As [`run_ast`], but takes an explicit [`RunConfig`] (`spec.md` §4.12)
/// instead of `RunConfig::default()`'s unlimited recursion depth.
pub fn run_ast_with_config(program: &ast::Program, input: Vec<i64>, config: &mut RunConfig) -> Result<Vec<i64>> {
    run_ast_with_tracker(program, input, config.tracker.as_mut())
}

/// As [`run_sm`], but takes an explicit [`RunConfig`].
pub fn run_sm_with_config(program: &ast::Program, input: Vec<i64>, config: &mut RunConfig) -> Result<Vec<i64>> {
    let mut tracer = NoopTracer;
    run_sm_with_tracker(program, input, config.tracker.as_mut(), &mut tracer)
}

/// Runs `program` via compile-then-interpret (`spec.md` §6's `run`, the
/// stack-machine half). Uses no recursion-depth limit and discards any
/// trace; see [`run_sm_with_tracker`] to control either.
pub fn run_sm(program: &ast::Program, input: Vec<i64>) -> Result<Vec<i64>> {
    let mut tracker = NoLimitTracker;
    let mut tracer = NoopTracer;
    run_sm_with_tracker(program, input, &mut tracker, &mut tracer)
}

/// As [`run_sm`], but takes an explicit `ResourceTracker` to bound call
/// depth and an `SmTracer` to observe execution. Generic over `Tr: SmTracer`
/// so a `NoopTracer` caller (as [`run_sm`] and [`run_sm_with_config`] are)
/// monomorphizes its hooks away entirely.
pub fn run_sm_with_tracker<Tr: SmTracer>(
    program: &ast::Program,
    input: Vec<i64>,
    tracker: &mut dyn ResourceTracker,
    tracer: &mut Tr,
) -> Result<Vec<i64>> {
    let compiled = compile(program)?;
    bytecode::run(&compiled, input, tracker, tracer)
}
