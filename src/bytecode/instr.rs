//! The stack-machine instruction set (`spec.md` §4.7).

use crate::ast::BinOp;

/// Which way a conditional jump fires: on a zero top-of-stack `Int`, or a
/// non-zero one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpCond {
    Zero,
    NonZero,
}

/// One stack-machine instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Binop(BinOp),
    Const(i64),
    StringLit(Vec<u8>),
    Sexp(String, usize),
    Ld(String),
    St(String),
    /// Indexed assignment: pop a value, then `n` indices (already in
    /// source order — indices and the value are compiled left-to-right),
    /// update the composite bound to `x` at that path.
    Sta(String, usize),
    /// No-op; jumps land on the instruction *after* this one.
    Label(String),
    Jmp(String),
    CJmp(JumpCond, String),
    /// Enter a new call frame scoped to `args ∪ locals`, then pop and bind
    /// `args.len()` values to `args` in order.
    Begin(String, Vec<String>, Vec<String>),
    /// Unconditional frame exit with no return value (used for the
    /// implicit "fell off the end of the function body" case).
    End,
    Call(String, usize, bool),
    Ret(bool),
    Drop,
    Dup,
    Swap,
    /// Tests whether the popped value is `Sexp` with the given tag.
    /// Pushes `Int(1)`/`Int(0)`; never errors on a non-`Sexp` input (a
    /// type mismatch is just a failed tag test, matching `spec.md` §4.6's
    /// "any other shape mismatch → None").
    Tag(String),
    /// Pops `names.len()` values and pushes a new pattern-match frame
    /// (`State::push`) scoped to `names`.
    Enter(Vec<String>),
    /// Pops the most recently pushed pattern-match frame (`State::drop_frame`).
    Leave,
}
