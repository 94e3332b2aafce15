//! The stack-machine interpreter (`spec.md` §4.7).
//!
//! Grounded on `src/bytecode/vm/mod.rs`'s cached-frame run loop (a `Vec`
//! instruction stream plus an instruction pointer, dispatched in a
//! `Result`-propagating `loop`) and `src/bytecode/vm/call.rs`'s
//! control-stack push/pop for call/return.

use std::collections::HashMap;

use crate::ast::BinOp;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::ResourceTracker;
use crate::state::State;
use crate::tracer::SmTracer;
use crate::value::Value;

use super::instr::{Instr, JumpCond};
use super::Program;

/// One entry on the control stack: where to resume, whose local state to
/// restore through (`State::leave`), and whether the caller is waiting on
/// a return value (an expression-context `CALL`) or will discard it (a
/// statement-context `CALL`, `is_proc = true`).
struct ControlFrame {
    resume_ip: usize,
    caller_state: State,
    expects_value: bool,
}

/// Resolves every `Label` to the index of the instruction right after it
/// ("jumps land on the instruction after `LABEL`", `spec.md` §4.7). Used
/// both for jump targets and for deciding whether a `CALL` name is a user
/// function or a built-in.
fn label_targets(instrs: &[Instr]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, instr) in instrs.iter().enumerate() {
        if let Instr::Label(name) = instr {
            map.insert(name.clone(), i + 1);
        }
    }
    map
}

/// Runs `program` to completion against `input`, starting from `State::empty()`.
///
/// Generic over `Tr: SmTracer` rather than `&mut dyn SmTracer`, so a
/// `NoopTracer` caller monomorphizes to a version of this function with every
/// `tracer.on_*` call inlined away to nothing — the same zero-cost-tracer
/// shape as the teacher's `VM<'a, T, P, Tr: VmTracer>`.
pub(crate) fn run<Tr: SmTracer>(program: &Program, input: Vec<i64>, tracker: &mut dyn ResourceTracker, tracer: &mut Tr) -> Result<Vec<i64>> {
    let labels = label_targets(&program.instrs);
    let mut config = Config::new(State::empty(), input);
    let mut value_stack: Vec<Value> = Vec::new();
    let mut control_stack: Vec<ControlFrame> = Vec::new();
    let mut ip = 0usize;

    loop {
        let Some(instr) = program.instrs.get(ip) else {
            return Err(Error::Internal(format!("instruction pointer {ip} ran off the end of the program")));
        };
        tracer.on_instr(ip, instr);

        match instr {
            Instr::Binop(op) => {
                let r = binop_operand(pop(&mut value_stack)?)?;
                let l = binop_operand(pop(&mut value_stack)?)?;
                value_stack.push(Value::Int(apply_binop(*op, l, r)?));
                ip += 1;
            }
            Instr::Const(i) => {
                value_stack.push(Value::Int(*i));
                ip += 1;
            }
            Instr::StringLit(bytes) => {
                value_stack.push(Value::Str(bytes.clone()));
                ip += 1;
            }
            Instr::Sexp(tag, n) => {
                let children = pop_n(&mut value_stack, *n)?;
                value_stack.push(Value::Sexp(tag.clone(), children));
                ip += 1;
            }
            Instr::Ld(name) => {
                value_stack.push(config.state.eval(name)?);
                ip += 1;
            }
            Instr::St(name) => {
                let v = pop(&mut value_stack)?;
                config.state.update(name, v);
                ip += 1;
            }
            Instr::Sta(name, n) => {
                let v = pop(&mut value_stack)?;
                let indices: Vec<i64> = pop_n(&mut value_stack, *n)?
                    .into_iter()
                    .map(|idx| idx.to_int())
                    .collect::<Result<_>>()?;
                let root = config.state.eval(name)?;
                let updated = crate::value::update_path(&root, &indices, v)?;
                config.state.update(name, updated);
                ip += 1;
            }
            Instr::Label(_) => {
                ip += 1;
            }
            Instr::Jmp(label) => {
                ip = *resolve(&labels, label)?;
            }
            Instr::CJmp(cond, label) => {
                let c = pop(&mut value_stack)?.to_int()?;
                let take = match cond {
                    JumpCond::Zero => c == 0,
                    JumpCond::NonZero => c != 0,
                };
                ip = if take { *resolve(&labels, label)? } else { ip + 1 };
            }
            Instr::Begin(name, args, locals) => {
                tracer.on_call(name);
                let scope: std::collections::HashSet<String> = args.iter().chain(locals.iter()).cloned().collect();
                config.state = config.state.enter(scope);
                let values = pop_n(&mut value_stack, args.len())?;
                for (arg_name, v) in args.iter().zip(values) {
                    config.state.update(arg_name, v);
                }
                ip += 1;
            }
            Instr::End | Instr::Ret(_) => {
                let has_value = matches!(instr, Instr::Ret(true));
                let Some(frame) = control_stack.pop() else {
                    return Ok(config.output);
                };
                tracer.on_return();
                config.state = State::leave(&frame.caller_state, std::mem::take(&mut config.state));
                match (has_value, frame.expects_value) {
                    (true, true) => {}
                    (true, false) => {
                        pop(&mut value_stack)?;
                    }
                    (false, true) => {
                        return Err(Error::Dispatch(
                            "function returned without a value but was used as an expression".to_owned(),
                        ));
                    }
                    (false, false) => {}
                }
                ip = frame.resume_ip;
            }
            Instr::Call(name, n, is_proc) => {
                tracer.on_call(name);
                if let Some(&target) = labels.get(name) {
                    let depth = control_stack.len() + 1;
                    tracker.check_recursion_depth(depth)?;
                    control_stack.push(ControlFrame {
                        resume_ip: ip + 1,
                        caller_state: config.state.clone(),
                        expects_value: !is_proc,
                    });
                    ip = target;
                } else {
                    let builtin_name = name.strip_prefix('L').unwrap_or(name);
                    let args = pop_n(&mut value_stack, *n)?;
                    let result = crate::builtins::call(builtin_name, args, &mut config)?;
                    match result {
                        Some(v) if !is_proc => value_stack.push(v),
                        Some(_) => {}
                        None if !is_proc => {
                            return Err(Error::Dispatch(format!(
                                "call to `{builtin_name}` produced no value but was used as an expression"
                            )));
                        }
                        None => {}
                    }
                    ip += 1;
                }
            }
            Instr::Drop => {
                pop(&mut value_stack)?;
                ip += 1;
            }
            Instr::Dup => {
                let v = top(&value_stack)?.clone();
                value_stack.push(v);
                ip += 1;
            }
            Instr::Swap => {
                let len = value_stack.len();
                if len < 2 {
                    return Err(Error::Internal("SWAP on a stack with fewer than 2 values".to_owned()));
                }
                value_stack.swap(len - 1, len - 2);
                ip += 1;
            }
            Instr::Tag(tag) => {
                let v = pop(&mut value_stack)?;
                let matches = matches!(&v, Value::Sexp(t, _) if t == tag);
                value_stack.push(Value::Int(i64::from(matches)));
                ip += 1;
            }
            Instr::Enter(names) => {
                let values = pop_n(&mut value_stack, names.len())?;
                let scope: std::collections::HashSet<String> = names.iter().cloned().collect();
                config.state.push(scope);
                for (name, v) in names.iter().zip(values) {
                    config.state.update(name, v);
                }
                ip += 1;
            }
            Instr::Leave => {
                config.state.drop_frame()?;
                ip += 1;
            }
        }
    }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value> {
    stack.pop().ok_or_else(|| Error::Internal("value stack underflow".to_owned()))
}

fn top(stack: &[Value]) -> Result<&Value> {
    stack.last().ok_or_else(|| Error::Internal("value stack underflow".to_owned()))
}

/// Pops `n` values off the top of `stack`, returned in source order (the
/// order they were pushed in, ascending index — `split_off` does not
/// reverse). The compiler always pushes call arguments and composite
/// children left-to-right, so this is also argument/child order with no
/// further reversal needed at any call site.
fn pop_n(stack: &mut Vec<Value>, n: usize) -> Result<Vec<Value>> {
    if stack.len() < n {
        return Err(Error::Internal("value stack underflow".to_owned()));
    }
    Ok(stack.split_off(stack.len() - n))
}

fn resolve<'a>(labels: &'a HashMap<String, usize>, name: &str) -> Result<&'a usize> {
    labels.get(name).ok_or_else(|| Error::Internal(format!("unresolved label `{name}`")))
}

/// Coerces a `BINOP` operand to `Int`, reported as `Structural` rather than
/// `Type` (`spec.md` §7 carves this one coercion failure out of the general
/// "coercing a Value to a variant it does not inhabit" `Type` bucket) —
/// matching the AST evaluator's `binop_operand` (`src/interp/expr.rs`).
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
