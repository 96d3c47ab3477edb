//! Reference interpreter for call chains.
//!
//! Used to check the partitioner's contract: running only the live
//! statements (a [`ChainLiveSet`] mask) must return what the full program
//! returns. Masked-out statements are skipped outright, including whole
//! `If`/`Loop`/`Call` structures.

use std::collections::HashMap;

use thiserror::Error;

use crate::chain::CallChain;
use crate::model::{Expr, Slot, Stmt, StmtKind};
use crate::partition::{ChainLiveSet, LiveSet};

/// Default statement budget for one top-level invocation.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Function `{0}` is not part of the chain")]
    UnknownFunction(String),

    #[error("Function `{function}` takes {expected} argument(s), got {found}")]
    ArityMismatch { function: String, expected: usize, found: usize },

    #[error("Function `{function}` read `{slot}` before any statement defined it")]
    UnboundVariable { function: String, slot: String },

    #[error("Function `{0}` finished without reaching a live return")]
    MissingReturn(String),

    #[error("Step budget of {limit} exhausted")]
    StepBudgetExhausted { limit: u64 },
}

pub struct Interpreter<'a> {
    chain: &'a CallChain,
    mask: Option<&'a ChainLiveSet>,
    max_steps: u64,
}

struct Frame<'a> {
    function: &'a str,
    env: HashMap<Slot, i64>,
    live: Option<&'a LiveSet>,
}

impl Frame<'_> {
    fn runs(&self, stmt: &Stmt) -> bool {
        self.live.map_or(true, |l| l.is_live(stmt.id()))
    }

    fn read(&self, slot: &Slot) -> Result<i64, EvalError> {
        self.env.get(slot).copied().ok_or_else(|| EvalError::UnboundVariable {
            function: self.function.to_string(),
            slot: slot.to_string(),
        })
    }
}

impl<'a> Interpreter<'a> {
    pub fn new(chain: &'a CallChain) -> Self {
        Self { chain, mask: None, max_steps: DEFAULT_MAX_STEPS }
    }

    /// Execute only the statements `mask` marks live.
    pub fn with_mask(mut self, mask: &'a ChainLiveSet) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the chain's entry function.
    pub fn run(&self, args: &[i64]) -> Result<i64, EvalError> {
        self.call(self.chain.entry(), args)
    }

    /// Run any function of the chain.
    pub fn call(&self, function: &str, args: &[i64]) -> Result<i64, EvalError> {
        let mut steps = 0;
        self.invoke(function, args, &mut steps)
    }

    fn invoke(&self, name: &str, args: &[i64], steps: &mut u64) -> Result<i64, EvalError> {
        let function =
            self.chain.function(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        if function.params().len() != args.len() {
            return Err(EvalError::ArityMismatch {
                function: name.to_string(),
                expected: function.params().len(),
                found: args.len(),
            });
        }

        let mut frame = Frame {
            function: function.name(),
            env: function
                .params()
                .iter()
                .zip(args)
                .map(|(p, &v)| (Slot::Var(p.clone()), v))
                .collect(),
            live: self.mask.and_then(|m| m.get(name)),
        };

        self.block(function.body(), &mut frame, steps)?
            .ok_or_else(|| EvalError::MissingReturn(name.to_string()))
    }

    fn tick(&self, steps: &mut u64) -> Result<(), EvalError> {
        *steps += 1;
        if *steps > self.max_steps {
            return Err(EvalError::StepBudgetExhausted { limit: self.max_steps });
        }
        Ok(())
    }

    fn block(
        &self,
        block: &[Stmt],
        frame: &mut Frame<'_>,
        steps: &mut u64,
    ) -> Result<Option<i64>, EvalError> {
        for stmt in block {
            if !frame.runs(stmt) {
                continue;
            }
            self.tick(steps)?;
            match stmt.kind() {
                StmtKind::Assign { target, expr } => {
                    let value = eval(expr, frame)?;
                    frame.env.insert(Slot::Var(target.clone()), value);
                }
                StmtKind::If { cond, then_block, else_block } => {
                    let taken = if eval(cond, frame)? != 0 { then_block } else { else_block };
                    if let Some(value) = self.block(taken, frame, steps)? {
                        return Ok(Some(value));
                    }
                }
                StmtKind::Loop { bound, counter, body } => {
                    let iterations = eval(bound, frame)?.max(0);
                    for i in 0..iterations {
                        self.tick(steps)?;
                        if let Some(counter) = counter {
                            frame.env.insert(Slot::Var(counter.clone()), i);
                        }
                        if let Some(value) = self.block(body, frame, steps)? {
                            return Ok(Some(value));
                        }
                    }
                }
                StmtKind::Call { target, callee, args, id } => {
                    let values =
                        args.iter().map(|a| eval(a, frame)).collect::<Result<Vec<_>, _>>()?;
                    let result = self.invoke(callee, &values, steps)?;
                    if let Some(target) = target {
                        frame.env.insert(Slot::Var(target.clone()), result);
                    }
                    if let Some(id) = id {
                        frame.env.insert(Slot::CallId(id.clone()), result);
                    }
                }
                StmtKind::Return(expr) => return eval(expr, frame).map(Some),
            }
        }
        Ok(None)
    }
}

fn eval(expr: &Expr, frame: &Frame<'_>) -> Result<i64, EvalError> {
    match expr {
        Expr::Const(v) => Ok(*v),
        Expr::Var(name) => frame.read(&Slot::Var(name.clone())),
        Expr::CallResult(id) => frame.read(&Slot::CallId(id.clone())),
        Expr::Binary { op, lhs, rhs } => Ok(op.apply(eval(lhs, frame)?, eval(rhs, frame)?)),
    }
}
