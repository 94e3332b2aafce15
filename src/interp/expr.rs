//! Expression evaluation (`spec.md` §4.4).
//!
//! `eval_expr` always leaves `config.last_value` defined for a well-formed
//! expression. Evaluation order is strictly left-to-right; `Binop` forces
//! both operands unconditionally (`&&`/`||` are **not** short-circuiting,
//! per the boundary behavior in `spec.md` §8).

use crate::ast::{BinOp, Expr};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::value::Value;

impl Interpreter<'_> {
    pub(crate) fn eval_expr(&mut self, mut config: Config, expr: &Expr) -> Result<Config> {
        match expr {
            Expr::Const(i) => {
                config.last_value = Some(Value::Int(*i));
            }
            Expr::String(bytes) => {
                config.last_value = Some(Value::Str(bytes.clone()));
            }
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    config = self.eval_expr(config, item)?;
                    values.push(take_value(&mut config)?);
                }
                config.last_value = Some(Value::Array(values));
            }
            Expr::Sexp(tag, items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    config = self.eval_expr(config, item)?;
                    values.push(take_value(&mut config)?);
                }
                config.last_value = Some(Value::Sexp(tag.clone(), values));
            }
            Expr::Var(name) => {
                let v = config.state.eval(name)?;
                config.last_value = Some(v);
            }
            Expr::Binop(op, l, r) => {
                config = self.eval_expr(config, l)?;
                let lv = binop_operand(take_value(&mut config)?)?;
                config = self.eval_expr(config, r)?;
                let rv = binop_operand(take_value(&mut config)?)?;
                config.last_value = Some(Value::Int(apply_binop(*op, lv, rv)?));
            }
            Expr::Elem(container, index) => {
                config = self.eval_expr(config, container)?;
                let container_v = take_value(&mut config)?;
                config = self.eval_expr(config, index)?;
                let index_v = take_value(&mut config)?.to_int()?;
                config.last_value = Some(container_v.elem(index_v)?);
            }
            Expr::Length(e) => {
                config = self.eval_expr(config, e)?;
                let v = take_value(&mut config)?;
                config.last_value = Some(Value::Int(v.length()?));
            }
            Expr::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    config = self.eval_expr(config, arg)?;
                    values.push(take_value(&mut config)?);
                }
                config = self.call(name, values, config)?;
                if config.last_value.is_none() {
                    return Err(Error::Dispatch(format!(
                        "call to `{name}` produced no value but was used as an expression"
                    )));
                }
            }
        }
        Ok(config)
    }
}

fn take_value(config: &mut Config) -> Result<Value> {
    config
        .last_value
        .take()
        .ok_or_else(|| Error::Internal("expected last_value to be defined".to_owned()))
}

/// Coerces a `BINOP` operand to `Int`, reported as `Structural` rather than
/// `Type` (`spec.md` §7 carves this one coercion failure out of the general
/// "coercing a Value to a variant it does not inhabit" `Type` bucket).
fn binop_operand(v: Value) -> Result<i64> {
    v.to_int().map_err(|_| {
        Error::Structural(format!("BINOP requires Int operands, found {}", v.type_name()))
    })
}

fn apply_binop(op: BinOp, l: i64, r: i64) -> Result<i64> {
    match op {
        BinOp::Add => Ok(l.wrapping_add(r)),
        BinOp::Sub => Ok(l.wrapping_sub(r)),
        BinOp::Mul => Ok(l.wrapping_mul(r)),
        BinOp::Div => {
            if r == 0 {
                Err(Error::Structural("division by zero".to_owned()))
            } else {
                Ok(l.wrapping_div(r))
            }
        }
        BinOp::Mod => {
            if r == 0 {
                Err(Error::Structural("division by zero".to_owned()))
            } else {
                Ok(l.wrapping_rem(r))
            }
        }
        BinOp::Lt => Ok(i64::from(l < r)),
        BinOp::Le => Ok(i64::from(l <= r)),
        BinOp::Gt => Ok(i64::from(l > r)),
        BinOp::Ge => Ok(i64::from(l >= r)),
        BinOp::Eq => Ok(i64::from(l == r)),
        BinOp::Ne => Ok(i64::from(l != r)),
        BinOp::And => Ok(i64::from(l != 0 && r != 0)),
        BinOp::Or => Ok(i64::from(l != 0 || r != 0)),
    }
}
