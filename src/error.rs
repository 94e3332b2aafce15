//! Crate-wide error type.
//!
//! All failures in this crate are fatal at the language level (see `spec.md`
//! §7): there is no exception handling in source programs, only abort with a
//! message. `Error` separates failures by the taxonomy the spec lays out so
//! callers can at least distinguish *kinds* of failure programmatically.

use std::fmt;

use crate::resource::ResourceError;

/// A fatal evaluation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Referencing an unbound name in any reachable frame.
    Name(String),
    /// Coercing a `Value` to a variant it does not inhabit.
    Type {
        expected: &'static str,
        found: &'static str,
    },
    /// An index or structural shape was invalid (`.elem`/`STA` out of
    /// bounds, `BINOP` on a non-`Int`, pattern arity mismatch at a call
    /// site that required a match).
    Structural(String),
    /// `read` was called against an empty input queue.
    Io(String),
    /// `CALL`/`Call` named a function that is neither a user definition nor
    /// a built-in.
    Dispatch(String),
    /// An invariant the compiler/codegen is responsible for was violated
    /// (empty value-stack pop, unmatched `LEAVE`, `CJMP` on an empty stack).
    /// These signal bugs in this crate, not in the source program.
    Internal(String),
    /// A resource limit (currently: recursion depth) was exceeded.
    Resource(ResourceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name error: unbound name `{name}`"),
            Self::Type { expected, found } => {
                write!(f, "type error: expected {expected}, found {found}")
            }
            Self::Structural(msg) => write!(f, "structural error: {msg}"),
            Self::Io(msg) => write!(f, "i/o error: {msg}"),
            Self::Dispatch(msg) => write!(f, "dispatch error: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Resource(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ResourceError> for Error {
    fn from(err: ResourceError) -> Self {
        Self::Resource(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
