//! Fixed dispatch table of primitive operations over `Value` and the I/O streams.
//!
//! Grounded on `src/builtins/mod.rs`'s name-keyed dispatch over
//! already-evaluated arguments; this table is much smaller since this spec's
//! builtin set is the closed seven-entry list in `spec.md` §4.3, not an
//! open Python builtin namespace.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::value::Value;

/// Names reserved for the fixed builtin table (`spec.md` §6: "their names
/// are reserved").
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "read" | "write" | ".elem" | ".length" | ".array" | "isArray" | "isString"
    )
}

/// Invokes builtin `name` with already-evaluated `args`, threading `config`
/// for `read`/`write`. Returns `None` when the builtin produces no result
/// (`write`) — callers in expression position must treat that as an error
/// (`spec.md` §4.3/§9).
pub fn call(name: &str, args: Vec<Value>, config: &mut Config) -> Result<Option<Value>> {
    match name {
        "read" => {
            expect_arity(name, &args, 0)?;
            let i = config
                .input
                .pop_front()
                .ok_or_else(|| Error::Io("read: input queue is empty".to_owned()))?;
            Ok(Some(Value::Int(i)))
        }
        "write" => {
            let [arg] = one(name, args)?;
            config.output.push(arg.to_int()?);
            Ok(None)
        }
        ".elem" => {
            let [container, index] = two(name, args)?;
            Ok(Some(container.elem(index.to_int()?)?))
        }
        ".length" => {
            let [arg] = one(name, args)?;
            Ok(Some(Value::Int(arg.length()?)))
        }
        ".array" => Ok(Some(Value::Array(args))),
        "isArray" => {
            let [arg] = one(name, args)?;
            Ok(Some(Value::Int(i64::from(arg.is_array()))))
        }
        "isString" => {
            let [arg] = one(name, args)?;
            Ok(Some(Value::Int(i64::from(arg.is_string()))))
        }
        other => Err(Error::Dispatch(format!("unknown builtin `{other}`"))),
    }
}

fn expect_arity(name: &str, args: &[Value], n: usize) -> Result<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(Error::Dispatch(format!(
            "builtin `{name}` expects {n} argument(s), got {}",
            args.len()
        )))
    }
}

fn one(name: &str, args: Vec<Value>) -> Result<[Value; 1]> {
    expect_arity(name, &args, 1)?;
    Ok(args.try_into().unwrap())
}

fn two(name: &str, args: Vec<Value>) -> Result<[Value; 2]> {
    expect_arity(name, &args, 2)?;
    Ok(args.try_into().unwrap())
}
