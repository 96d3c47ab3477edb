//! Expression/statement model for benchmark functions.
//!
//! A [`Function`] is an ordered list of [`Stmt`]s with exactly one trailing
//! `Return`. Statements are numbered in pre-order (an `If` before its
//! then-block, then its else-block; a `Loop` before its body), and that number
//! is the [`StmtId`] every other layer uses: graph nodes, LiveSet entries and
//! the `statementIndex` of external candidate files.
//!
//! Everything here is immutable once [`Function::new`] has accepted it.

mod scope;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BenchResult;

/// Pre-order index of a statement within its function.
pub type StmtId = usize;

/// Binary operators over `i64` values.
///
/// Comparisons and logical operators yield `0`/`1`. Arithmetic wraps, and
/// division/remainder by zero yield `0` so that every expression is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            BinOp::Add => lhs.wrapping_add(rhs),
            BinOp::Sub => lhs.wrapping_sub(rhs),
            BinOp::Mul => lhs.wrapping_mul(rhs),
            BinOp::Div => lhs.checked_div(rhs).unwrap_or(0),
            BinOp::Rem => lhs.checked_rem(rhs).unwrap_or(0),
            BinOp::Lt => (lhs < rhs) as i64,
            BinOp::Le => (lhs <= rhs) as i64,
            BinOp::Gt => (lhs > rhs) as i64,
            BinOp::Ge => (lhs >= rhs) as i64,
            BinOp::Eq => (lhs == rhs) as i64,
            BinOp::Ne => (lhs != rhs) as i64,
            BinOp::And => (lhs != 0 && rhs != 0) as i64,
            BinOp::Or => (lhs != 0 || rhs != 0) as i64,
        }
    }
}

/// Expression tree. Each expression is owned by exactly one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(i64),
    Var(String),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// Result of the `Call` statement carrying this call id.
    CallResult(String),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn call_result(id: impl Into<String>) -> Self {
        Expr::CallResult(id.into())
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// Every variable / call id this expression reads, left to right.
    pub fn reads(&self) -> Vec<Slot> {
        let mut out = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads(&self, out: &mut Vec<Slot>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(name) => out.push(Slot::Var(name.clone())),
            Expr::CallResult(id) => out.push(Slot::CallId(id.clone())),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_reads(out);
                rhs.collect_reads(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{v}"),
            Expr::Var(name) => f.write_str(name),
            Expr::CallResult(id) => write!(f, "@{id}"),
            Expr::Binary { op, lhs, rhs } => {
                write_operand(f, lhs)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Binary { .. } => write!(f, "({expr})"),
        other => write!(f, "{other}"),
    }
}

/// A storage location a statement can define and an expression can read:
/// either a named variable or the result slot of an identified call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Var(String),
    CallId(String),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Var(name) => f.write_str(name),
            Slot::CallId(id) => write!(f, "@{id}"),
        }
    }
}

/// Declared type of a variable. The benchmark domain only has integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: VarType,
    pub owner: String,
}

/// One statement plus its pre-order id.
///
/// Ids handed to the constructors are placeholders; [`Function::new`]
/// renumbers the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    id: StmtId,
    kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Assign { target: String, expr: Expr },
    If { cond: Expr, then_block: Vec<Stmt>, else_block: Vec<Stmt> },
    Loop { bound: Expr, counter: Option<String>, body: Vec<Stmt> },
    Call { target: Option<String>, callee: String, args: Vec<Expr>, id: Option<String> },
    Return(Expr),
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self { id: 0, kind }
    }

    pub fn assign(target: impl Into<String>, expr: Expr) -> Self {
        Self::new(StmtKind::Assign { target: target.into(), expr })
    }

    pub fn if_else(cond: Expr, then_block: Vec<Stmt>, else_block: Vec<Stmt>) -> Self {
        Self::new(StmtKind::If { cond, then_block, else_block })
    }

    pub fn repeat(bound: Expr, counter: Option<String>, body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Loop { bound, counter, body })
    }

    pub fn call(target: Option<String>, callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(StmtKind::Call { target, callee: callee.into(), args, id: None })
    }

    /// Builder-style helper to attach a call id to a `Call` statement.
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        if let StmtKind::Call { id, .. } = &mut self.kind {
            *id = Some(call_id.into());
        }
        self
    }

    pub fn ret(expr: Expr) -> Self {
        Self::new(StmtKind::Return(expr))
    }

    pub fn id(&self) -> StmtId {
        self.id
    }

    pub fn kind(&self) -> &StmtKind {
        &self.kind
    }

    /// Slots this statement itself reads (conditions, bounds, arguments,
    /// right-hand sides). Nested statements are not included.
    pub fn reads(&self) -> Vec<Slot> {
        match &self.kind {
            StmtKind::Assign { expr, .. } | StmtKind::Return(expr) => expr.reads(),
            StmtKind::If { cond, .. } => cond.reads(),
            StmtKind::Loop { bound, .. } => bound.reads(),
            StmtKind::Call { args, .. } => args.iter().flat_map(Expr::reads).collect(),
        }
    }

    /// Slots this statement defines.
    pub fn defines(&self) -> Vec<Slot> {
        match &self.kind {
            StmtKind::Assign { target, .. } => vec![Slot::Var(target.clone())],
            StmtKind::Loop { counter: Some(counter), .. } => vec![Slot::Var(counter.clone())],
            StmtKind::Call { target, id, .. } => {
                let mut out = Vec::new();
                if let Some(target) = target {
                    out.push(Slot::Var(target.clone()));
                }
                if let Some(id) = id {
                    out.push(Slot::CallId(id.clone()));
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// Directly nested blocks (then/else for `If`, the body for `Loop`).
    pub fn blocks(&self) -> Vec<&[Stmt]> {
        match &self.kind {
            StmtKind::If { then_block, else_block, .. } => {
                vec![then_block.as_slice(), else_block.as_slice()]
            }
            StmtKind::Loop { body, .. } => vec![body.as_slice()],
            _ => Vec::new(),
        }
    }

    /// One-line rendering used in reports; nested blocks are elided.
    pub fn summary(&self) -> String {
        match &self.kind {
            StmtKind::Assign { target, expr } => format!("{target} = {expr}"),
            StmtKind::If { cond, .. } => format!("if {cond}"),
            StmtKind::Loop { bound, counter: Some(counter), .. } => {
                format!("loop {counter} < {bound}")
            }
            StmtKind::Loop { bound, counter: None, .. } => format!("loop {bound}"),
            StmtKind::Call { target, callee, args, id } => {
                let args = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                let call = format!("{callee}({args})");
                let call = match id {
                    Some(id) => format!("{call} as @{id}"),
                    None => call,
                };
                match target {
                    Some(target) => format!("{target} = {call}"),
                    None => call,
                }
            }
            StmtKind::Return(expr) => format!("return {expr}"),
        }
    }

    fn renumber(&mut self, next: &mut StmtId) {
        self.id = *next;
        *next += 1;
        match &mut self.kind {
            StmtKind::If { then_block, else_block, .. } => {
                then_block.iter_mut().for_each(|s| s.renumber(next));
                else_block.iter_mut().for_each(|s| s.renumber(next));
            }
            StmtKind::Loop { body, .. } => body.iter_mut().for_each(|s| s.renumber(next)),
            _ => {}
        }
    }
}

/// A benchmark function: parameters, body and a single trailing `Return`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    params: Vec<String>,
    body: Vec<Stmt>,
    variables: Vec<Variable>,
    statement_count: usize,
}

impl Function {
    /// Construct a function, renumbering its statements and checking the
    /// construction invariants (single trailing return, declare-before-use,
    /// unique parameters and call ids).
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        mut body: Vec<Stmt>,
    ) -> BenchResult<Self> {
        let name = name.into();
        let mut next = 0;
        body.iter_mut().for_each(|s| s.renumber(&mut next));

        let variables = scope::check_function(&name, &params, &body)?;

        Ok(Self { name, params, body, variables, statement_count: next })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &[Stmt] {
        &self.body
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn statement_count(&self) -> usize {
        self.statement_count
    }

    /// The trailing `Return` statement. Its presence is a construction invariant.
    pub fn return_stmt(&self) -> &Stmt {
        &self.body[self.body.len() - 1]
    }

    /// All statements in pre-order, so `statements()[id].id() == id`.
    pub fn statements(&self) -> Vec<&Stmt> {
        fn walk<'a>(block: &'a [Stmt], out: &mut Vec<&'a Stmt>) {
            for stmt in block {
                out.push(stmt);
                for nested in stmt.blocks() {
                    walk(nested, out);
                }
            }
        }
        let mut out = Vec::with_capacity(self.statement_count);
        walk(&self.body, &mut out);
        out
    }

    pub fn statement(&self, id: StmtId) -> Option<&Stmt> {
        self.statements().into_iter().find(|s| s.id() == id)
    }

    /// Call sites in pre-order: `(statement id, callee name, argument count)`.
    pub fn call_sites(&self) -> Vec<(StmtId, &str, usize)> {
        self.statements()
            .into_iter()
            .filter_map(|s| match s.kind() {
                StmtKind::Call { callee, args, .. } => Some((s.id(), callee.as_str(), args.len())),
                _ => None,
            })
            .collect()
    }
}
