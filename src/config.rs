//! `Config`: the 4-tuple threaded through every evaluation step.

use std::collections::VecDeque;

use crate::state::State;
use crate::value::Value;

/// `(State, input_queue, output_log, last_value)` from `spec.md` §3.
///
/// `input` is the untouched suffix of the program's input stream; `output`
/// only ever grows (P2); `last_value` is the `Value` produced by the most
/// recently evaluated expression, or `None` before any expression has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub state: State,
    pub input: VecDeque<i64>,
    pub output: Vec<i64>,
    pub last_value: Option<Value>,
}

impl Config {
    #[must_use]
    pub fn new(state: State, input: Vec<i64>) -> Self {
        Self {
            state,
            input: input.into(),
            output: Vec::new(),
            last_value: None,
        }
    }
}
