//! The compiled stack-machine half of the crate (`spec.md` §4.7/§4.8).

mod compiler;
mod instr;
mod vm;

use crate::ast;
use crate::error::Result;
use crate::resource::ResourceTracker;
use crate::tracer::SmTracer;

pub use instr::{Instr, JumpCond};

/// A flat, already-resolved stack-machine instruction stream, ready to feed
/// to [`vm::run`] as many times as needed against fresh input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub instrs: Vec<Instr>,
}

/// Lowers `program` to a stack-machine [`Program`] (`spec.md` §4.8). Callers
/// that will run the same program against many inputs should compile once
/// and call [`run`] repeatedly, rather than go through [`crate::run_sm`]
/// each time.
pub fn compile(program: &ast::Program) -> Result<Program> {
    ast::validate(program)?;
    Ok(Program {
        instrs: compiler::compile(program),
    })
}

/// Runs an already-compiled `program` to completion against `input`.
///
/// Generic over `Tr: SmTracer` so the common case — `NoopTracer` — inlines
/// its hooks away entirely; see [`vm::run`].
pub fn run<Tr: SmTracer>(
    program: &Program,
    input: Vec<i64>,
    tracker: &mut dyn ResourceTracker,
    tracer: &mut Tr,
) -> Result<Vec<i64>> {
    vm::run(program, input, tracker, tracer)
}
