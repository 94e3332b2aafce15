//! The source-language AST shared by both execution paths (`spec.md` §3).
//!
//! These types are produced by an external parser (out of scope, §1);
//! callers of this crate build them directly.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Binary operators, in the precedence table of `spec.md` §6 (informal
/// grammar only — this enum carries no precedence, the parser does).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Expression AST (`spec.md` §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(i64),
    String(Vec<u8>),
    Array(Vec<Expr>),
    Sexp(String, Vec<Expr>),
    Var(String),
    Binop(BinOp, Box<Expr>, Box<Expr>),
    Elem(Box<Expr>, Box<Expr>),
    Length(Box<Expr>),
    Call(String, Vec<Expr>),
}

/// Statement AST (`spec.md` §3). `Leave` is emitted by the `case` compiler
/// lowering and the case-branch evaluator (§4.5), never by a parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Empty `indices` is a plain assignment; non-empty is an indexed
    /// assignment into a composite value.
    Assign(String, Vec<Expr>, Expr),
    Seq(Box<Stmt>, Box<Stmt>),
    Skip,
    If(Expr, Box<Stmt>, Box<Stmt>),
    While(Expr, Box<Stmt>),
    /// Post-test loop: run the body, then loop while the condition is zero.
    Repeat(Expr, Box<Stmt>),
    Case(Expr, Vec<(Pattern, Stmt)>),
    Return(Option<Expr>),
    Call(String, Vec<Expr>),
    /// Pops one pattern-match frame pushed by a matched `Case` branch.
    Leave,
}

/// Pattern AST (`spec.md` §3/§4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Wildcard,
    Ident(String),
    Sexp(String, Vec<Pattern>),
}

impl Pattern {
    /// Variables bound by this pattern, in left-to-right traversal order,
    /// duplicates retained (a later binding for the same name simply wins,
    /// per `spec.md` §4.6).
    #[must_use]
    pub fn vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Self::Wildcard => {}
            Self::Ident(name) => out.push(name.clone()),
            Self::Sexp(_, children) => {
                for child in children {
                    child.collect_vars(out);
                }
            }
        }
    }
}

/// `(name, arg_names, local_names, body)`. `arg_names` and `local_names`
/// must be disjoint; their union is the scope of the call frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub arg_names: Vec<String>,
    pub local_names: Vec<String>,
    pub body: Stmt,
}

/// `(definitions, main_body)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub definitions: Vec<Definition>,
    pub main_body: Stmt,
}

impl Default for Stmt {
    fn default() -> Self {
        Self::Skip
    }
}

/// Checks `spec.md` §3's `Definition` invariant — `arg_names`/`local_names`
/// disjoint — once, shared by both `run_ast` and `bytecode::compile` so a
/// malformed definition is rejected identically by either path.
pub(crate) fn validate(program: &Program) -> Result<()> {
    for def in &program.definitions {
        let args: HashSet<&String> = def.arg_names.iter().collect();
        if def.local_names.iter().any(|n| args.contains(n)) {
            return Err(Error::Internal(format!(
                "definition `{}` has overlapping arg/local names",
                def.name
            )));
        }
    }
    Ok(())
}
