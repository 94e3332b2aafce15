//! AST-to-bytecode lowering (`spec.md` §4.8).
//!
//! Grounded on `src/bytecode/builder.rs`'s fresh-label-and-patch discipline:
//! a single monotonic counter hands out both jump labels (`"L<n>"`) and the
//! scratch variable names the `case` lowering needs, so nothing here ever
//! has to patch an instruction after the fact — every label is resolved by
//! [`super::label_targets`] in one pass over the finished instruction list.
//!
//! `case` compiles differently from the DUP/SWAP choreography `spec.md`
//! §4.8 sketches in prose: instead of keeping the scrutinee (and every
//! nested child under test) alive as extra copies threaded across
//! conditional jumps, the scrutinee is stashed in one compiler-private
//! scratch variable (scoped by its own pattern-match frame, so it never
//! leaks into the surrounding scope) and every test/binding step reloads
//! the value it needs, fresh, via a path of `.elem` calls from that
//! scratch variable. This is simpler to get right — every reload is a
//! self-contained push/test/pop, so no jump target ever needs to land at a
//! stack depth that depends on how far a nested pattern test got before
//! failing — and is behaviorally identical (see `DESIGN.md`).

use crate::ast::{Definition, Expr, Pattern, Program, Stmt};

use super::instr::{Instr, JumpCond};

/// Hands out globally unique label and scratch-variable names.
struct Labeler {
    next: usize,
}

impl Labeler {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn fresh_label(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("L{n}")
    }

    fn fresh_scratch(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("%case{n}")
    }
}

/// Compiles `program` to a flat stack-machine instruction list (`spec.md`
/// §4.8's "compile main body first, append `END`, then concatenate all
/// definition blocks").
#[must_use]
pub fn compile(program: &Program) -> Vec<Instr> {
    let mut labeler = Labeler::new();
    let mut out = compile_stmt(&program.main_body, &mut labeler);
    out.push(Instr::End);
    for def in &program.definitions {
        out.extend(compile_definition(def, &mut labeler));
    }
    out
}

fn compile_definition(def: &Definition, labeler: &mut Labeler) -> Vec<Instr> {
    let mut out = vec![
        Instr::Label(format!("L{}", def.name)),
        Instr::Begin(def.name.clone(), def.arg_names.clone(), def.local_names.clone()),
    ];
    out.extend(compile_stmt(&def.body, labeler));
    out.push(Instr::End);
    out
}

fn compile_expr(expr: &Expr, labeler: &mut Labeler) -> Vec<Instr> {
    match expr {
        Expr::Const(i) => vec![Instr::Const(*i)],
        Expr::String(bytes) => vec![Instr::StringLit(bytes.clone())],
        Expr::Var(name) => vec![Instr::Ld(name.clone())],
        Expr::Array(items) => {
            let mut out: Vec<Instr> = items.iter().flat_map(|e| compile_expr(e, labeler)).collect();
            out.push(Instr::Call(".array".to_owned(), items.len(), false));
            out
        }
        Expr::Sexp(tag, items) => {
            let mut out: Vec<Instr> = items.iter().flat_map(|e| compile_expr(e, labeler)).collect();
            out.push(Instr::Sexp(tag.clone(), items.len()));
            out
        }
        Expr::Elem(container, index) => {
            let mut out = compile_expr(container, labeler);
            out.extend(compile_expr(index, labeler));
            out.push(Instr::Call(".elem".to_owned(), 2, false));
            out
        }
        Expr::Length(e) => {
            let mut out = compile_expr(e, labeler);
            out.push(Instr::Call(".length".to_owned(), 1, false));
            out
        }
        Expr::Binop(op, l, r) => {
            let mut out = compile_expr(l, labeler);
            out.extend(compile_expr(r, labeler));
            out.push(Instr::Binop(*op));
            out
        }
        Expr::Call(name, args) => compile_call(name, args, false, labeler),
    }
}

/// Shared by `Expr::Call` and `Stmt::Call`: arguments are compiled
/// left-to-right, the same convention `Sexp`/`Array`/`Elem` use, so the VM's
/// `Begin`/built-in dispatch never has to special-case which compiled form
/// produced a given `Call` (see `DESIGN.md` for why this departs from the
/// "push args in reverse" convention `spec.md` §4.7/§4.8 sketches: a single
/// shared left-to-right convention is simpler and, unlike the reversed one,
/// keeps multi-argument user calls with side-effecting arguments exactly
/// equivalent between the AST and SM execution paths). The target is always
/// emitted as `"L" + name`; the VM decides at dispatch time whether that
/// resolves to a user label or is a built-in name with the `L` stripped
/// back off (`super::vm`).
fn compile_call(name: &str, args: &[Expr], is_proc: bool, labeler: &mut Labeler) -> Vec<Instr> {
    let mut out: Vec<Instr> = args.iter().flat_map(|e| compile_expr(e, labeler)).collect();
    out.push(Instr::Call(format!("L{name}"), args.len(), is_proc));
    out
}

fn compile_stmt(stmt: &Stmt, labeler: &mut Labeler) -> Vec<Instr> {
    match stmt {
        Stmt::Skip => vec![],
        Stmt::Assign(name, indices, rhs) if indices.is_empty() => {
            let mut out = compile_expr(rhs, labeler);
            out.push(Instr::St(name.clone()));
            out
        }
        Stmt::Assign(name, indices, rhs) => {
            let mut out: Vec<Instr> = indices.iter().flat_map(|e| compile_expr(e, labeler)).collect();
            out.extend(compile_expr(rhs, labeler));
            out.push(Instr::Sta(name.clone(), indices.len()));
            out
        }
        Stmt::Seq(s1, s2) => {
            let mut out = compile_stmt(s1, labeler);
            out.extend(compile_stmt(s2, labeler));
            out
        }
        Stmt::If(cond, t, e) => {
            let l_else = labeler.fresh_label();
            let l_fi = labeler.fresh_label();
            let mut out = compile_expr(cond, labeler);
            out.push(Instr::CJmp(JumpCond::Zero, l_else.clone()));
            out.extend(compile_stmt(t, labeler));
            out.push(Instr::Jmp(l_fi.clone()));
            out.push(Instr::Label(l_else));
            out.extend(compile_stmt(e, labeler));
            out.push(Instr::Label(l_fi));
            out
        }
        Stmt::While(cond, body) => {
            let l_check = labeler.fresh_label();
            let l_loop = labeler.fresh_label();
            let mut out = vec![Instr::Jmp(l_check.clone()), Instr::Label(l_loop.clone())];
            out.extend(compile_stmt(body, labeler));
            out.push(Instr::Label(l_check));
            out.extend(compile_expr(cond, labeler));
            out.push(Instr::CJmp(JumpCond::NonZero, l_loop));
            out
        }
        Stmt::Repeat(cond, body) => {
            let l_loop = labeler.fresh_label();
            let mut out = vec![Instr::Label(l_loop.clone())];
            out.extend(compile_stmt(body, labeler));
            out.extend(compile_expr(cond, labeler));
            out.push(Instr::CJmp(JumpCond::Zero, l_loop));
            out
        }
        Stmt::Call(name, args) => compile_call(name, args, true, labeler),
        Stmt::Return(None) => vec![Instr::Ret(false)],
        Stmt::Return(Some(e)) => {
            let mut out = compile_expr(e, labeler);
            out.push(Instr::Ret(true));
            out
        }
        Stmt::Case(scrutinee, branches) => compile_case(scrutinee, branches, labeler),
        Stmt::Leave => vec![Instr::Leave],
    }
}

/// Loads the value reachable from scratch variable `scratch` by following
/// `path` (a sequence of `.elem` indices from the root). An empty path
/// loads `scratch` itself.
fn load_path(scratch: &str, path: &[i64]) -> Vec<Instr> {
    let mut out = vec![Instr::Ld(scratch.to_owned())];
    for idx in path {
        out.push(Instr::Const(*idx));
        out.push(Instr::Call(".elem".to_owned(), 2, false));
    }
    out
}

/// Emits a pure boolean test: does the value at `path` (relative to
/// `scratch`) match `pattern`? Every reachable instruction sequence here
/// pushes exactly what it pops before falling through or jumping to
/// `fail`, so no jump ever crosses a stack-depth change.
fn compile_pattern_test(pattern: &Pattern, scratch: &str, path: &[i64], fail: &str) -> Vec<Instr> {
    match pattern {
        Pattern::Wildcard | Pattern::Ident(_) => vec![],
        Pattern::Sexp(tag, children) => {
            let mut out = load_path(scratch, path);
            out.push(Instr::Tag(tag.clone()));
            out.push(Instr::CJmp(JumpCond::Zero, fail.to_owned()));
            out.extend(load_path(scratch, path));
            out.push(Instr::Call(".length".to_owned(), 1, false));
            out.push(Instr::Const(children.len() as i64));
            out.push(Instr::Binop(crate::ast::BinOp::Eq));
            out.push(Instr::CJmp(JumpCond::Zero, fail.to_owned()));
            for (i, child) in children.iter().enumerate() {
                let mut child_path = path.to_vec();
                child_path.push(i as i64);
                out.extend(compile_pattern_test(child, scratch, &child_path, fail));
            }
            out
        }
    }
}

/// Collects `(path, name)` for every `Ident` in `pattern`, left to right
/// (matching `Pattern::vars`'s traversal order, so a duplicate name's
/// later occurrence is loaded — and bound — last).
fn collect_var_paths(pattern: &Pattern, path: &mut Vec<i64>, out: &mut Vec<(Vec<i64>, String)>) {
    match pattern {
        Pattern::Wildcard => {}
        Pattern::Ident(name) => out.push((path.clone(), name.clone())),
        Pattern::Sexp(_, children) => {
            for (i, child) in children.iter().enumerate() {
                path.push(i as i64);
                collect_var_paths(child, path, out);
                path.pop();
            }
        }
    }
}

fn compile_case(scrutinee: &Expr, branches: &[(Pattern, Stmt)], labeler: &mut Labeler) -> Vec<Instr> {
    let scratch = labeler.fresh_scratch();
    let l_end = labeler.fresh_label();

    let mut out = compile_expr(scrutinee, labeler);
    out.push(Instr::Enter(vec![scratch.clone()]));

    let last = branches.len().saturating_sub(1);
    for (i, (pattern, body)) in branches.iter().enumerate() {
        let l_fail = if i == last { l_end.clone() } else { labeler.fresh_label() };

        out.extend(compile_pattern_test(pattern, &scratch, &[], &l_fail));

        let mut var_paths = Vec::new();
        collect_var_paths(pattern, &mut Vec::new(), &mut var_paths);
        for (path, _) in &var_paths {
            out.extend(load_path(&scratch, path));
        }
        let names: Vec<String> = var_paths.into_iter().map(|(_, name)| name).collect();
        out.push(Instr::Enter(names));
        out.extend(compile_stmt(body, labeler));
        out.push(Instr::Leave);

        if i != last {
            out.push(Instr::Jmp(l_end.clone()));
            out.push(Instr::Label(l_fail));
        }
    }
    out.push(Instr::Label(l_end));
    out.push(Instr::Leave);
    out
}
