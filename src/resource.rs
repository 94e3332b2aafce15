//! Recursion-depth accounting shared by the AST evaluator and the SM interpreter.
//!
//! Both execution paths recurse on user function calls (native recursion in
//! the AST evaluator, control-stack growth in the SM interpreter). Without a
//! limit, a runaway recursive program overflows the *native* Rust stack,
//! which aborts the process uncatchably rather than surfacing as a normal
//! `Error`. `ResourceTracker` turns that into an ordinary `Result` failure.

use std::fmt;

/// A resource limit was exceeded during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// Maximum call/control-stack depth exceeded.
    Recursion { limit: usize, depth: usize },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursion { limit, depth } => {
                write!(f, "maximum recursion depth exceeded: {depth} > {limit}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// Tracks call/control-stack depth and rejects further growth past a limit.
pub trait ResourceTracker: fmt::Debug {
    /// Called whenever the evaluator is about to descend one level deeper
    /// (enter a function call). `depth` is the depth *after* descending.
    fn check_recursion_depth(&mut self, depth: usize) -> Result<(), ResourceError>;
}

/// A tracker with no limit; every depth is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    fn check_recursion_depth(&mut self, _depth: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// A tracker that rejects any depth greater than `max_depth`.
#[derive(Debug, Clone, Copy)]
pub struct LimitedTracker {
    pub max_depth: usize,
}

impl LimitedTracker {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl ResourceTracker for LimitedTracker {
    fn check_recursion_depth(&mut self, depth: usize) -> Result<(), ResourceError> {
        if depth > self.max_depth {
            Err(ResourceError::Recursion {
                limit: self.max_depth,
                depth,
            })
        } else {
            Ok(())
        }
    }
}

/// Caller-supplied knobs for one `run_ast`/`run_sm`/`compile` call
/// (`spec.md` §4.12). The only configurable concern this crate exposes is
/// the recursion-depth limit, so this is a thin wrapper around a tracker;
/// `Default` carries none (`NoLimitTracker`).
pub struct RunConfig {
    pub tracker: Box<dyn ResourceTracker>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tracker: Box::new(NoLimitTracker),
        }
    }
}
