//! Scoped lexical environments with a distinguished global tail.
//!
//! Mirrors the shape of the teacher's `Namespaces` (`src/namespace.rs`): a
//! stack of frames with a mandatory bottom frame that outlives every call.
//! The teacher indexes into an arena of heap-allocated, reference-counted
//! namespaces (because closures can capture them); this spec's values are
//! value-typed and there are no closures, so frames here are plain owned
//! data and "functional update" falls out of ordinary `&mut self` mutation
//! or whole-`State` replacement — no arena, no indices, no `Rc`.
//!
//! Invariants I1–I6 from `spec.md` §3 map onto the methods below:
//! - I1: [`State::empty`] always starts with exactly one (global) frame and
//!   no locals; every other constructor preserves a single global frame.
//! - I2/I3: [`State::update`]/[`State::eval`] search `locals` innermost-first,
//!   falling through to `global`.
//! - I4: [`State::enter`] discards `locals` entirely and starts a fresh
//!   single local frame — the call's frame sits directly on the global tail.
//! - I5: [`State::leave`] takes the (possibly mutated) global frame from the
//!   callee and the local chain from the caller.
//! - I6: [`State::push`]/[`State::drop_frame`] are a LIFO atop whatever
//!   `locals` currently holds, independent of I4/I5.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::value::Value;

/// One lexical frame: a fixed name set (`scope`) and a partial bindings map
/// over that set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    scope: HashSet<String>,
    bindings: HashMap<String, Value>,
}

impl Frame {
    #[must_use]
    pub fn new(scope: HashSet<String>) -> Self {
        Self {
            scope,
            bindings: HashMap::new(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &HashSet<String> {
        &self.scope
    }

    fn contains(&self, name: &str) -> bool {
        self.scope.contains(name)
    }
}

/// A stack of lexical frames with a mandatory global frame at the bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    global: HashMap<String, Value>,
    locals: Vec<Frame>,
}

impl State {
    /// `State.empty` (I1): no bindings anywhere, no local frames.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            global: HashMap::new(),
            locals: Vec::new(),
        }
    }

    /// The scope names and depth of the local chain, used to check I4/P4
    /// (state-stack discipline across calls).
    #[must_use]
    pub fn local_shape(&self) -> Vec<&HashSet<String>> {
        self.locals.iter().map(Frame::scope).collect()
    }

    /// I3: reads `name` from the innermost frame whose scope contains it,
    /// falling through to global. Undefined names are a hard failure.
    pub fn eval(&self, name: &str) -> Result<Value> {
        for frame in self.locals.iter().rev() {
            if frame.contains(name) {
                return frame
                    .bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::Name(name.to_owned()));
            }
        }
        self.global
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Name(name.to_owned()))
    }

    /// I2: writes `v` into the innermost frame whose scope contains `name`,
    /// falling through to global (which accepts any name).
    pub fn update(&mut self, name: &str, v: Value) {
        for frame in self.locals.iter_mut().rev() {
            if frame.contains(name) {
                frame.bindings.insert(name.to_owned(), v);
                return;
            }
        }
        self.global.insert(name.to_owned(), v);
    }

    /// I4: pushes a new frame scoped to `scope_names` directly onto the
    /// global frame, discarding every existing local frame. This is the
    /// calling-convention frame for function entry.
    #[must_use]
    pub fn enter(&self, scope_names: HashSet<String>) -> Self {
        Self {
            global: self.global.clone(),
            locals: vec![Frame::new(scope_names)],
        }
    }

    /// I5: restores the local chain of `caller` atop the (possibly mutated)
    /// global frame reached from `callee`.
    #[must_use]
    pub fn leave(caller: &Self, callee: Self) -> Self {
        Self {
            global: callee.global,
            locals: caller.locals.clone(),
        }
    }

    /// I6: pushes a frame scoped to `scope_names` on top of the current
    /// local chain (used for `case` pattern-match frames). Preserves the
    /// global tail and every existing local frame.
    pub fn push(&mut self, scope_names: HashSet<String>) {
        self.locals.push(Frame::new(scope_names));
    }

    /// I6: pops the most recently pushed frame.
    ///
    /// # Errors
    /// Returns `Error::Internal` if there is no local frame to pop — this
    /// signals a compiler/codegen bug (an unmatched `Leave`/`LEAVE`), not a
    /// data error in the source program (`spec.md` §7).
    pub fn drop_frame(&mut self) -> Result<()> {
        self.locals
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::Internal("drop_frame: no local frame to pop".to_owned()))
    }
}
