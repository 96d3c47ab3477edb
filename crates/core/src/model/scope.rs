use std::collections::HashSet;

use crate::error::{BenchError, BenchResult};

use super::{Slot, Stmt, StmtKind, VarType, Variable};

/// Check the construction invariants of a function body and collect its
/// variables.
///
/// Blocks open a scope: a name first assigned inside a branch or loop body is
/// not visible after that block, so every read in an accepted function has a
/// value on every path.
pub(super) fn check_function(
    name: &str,
    params: &[String],
    body: &[Stmt],
) -> BenchResult<Vec<Variable>> {
    if name.trim().is_empty() {
        return Err(BenchError::malformed("<unnamed>", "function name is empty"));
    }

    let mut checker = ScopeChecker::new(name);
    for param in params {
        if param.trim().is_empty() {
            return Err(checker.error("parameter name is empty"));
        }
        let slot = Slot::Var(param.clone());
        if checker.is_declared(&slot) {
            return Err(checker.error(format!("parameter `{param}` is declared twice")));
        }
        checker.define(slot);
    }

    checker.check_block(body)?;

    match checker.returns {
        0 => return Err(checker.error("function has no return statement")),
        1 => {}
        n => {
            return Err(checker.error(format!(
                "function has {n} return statements; exactly one is required"
            )))
        }
    }
    if !matches!(body.last().map(Stmt::kind), Some(StmtKind::Return(_))) {
        return Err(checker.error(
            "the return statement must be the last top-level statement so it is reached on every path",
        ));
    }

    Ok(checker.variables)
}

struct ScopeChecker<'a> {
    function: &'a str,
    scopes: Vec<HashSet<Slot>>,
    call_ids: HashSet<String>,
    variables: Vec<Variable>,
    returns: usize,
}

impl<'a> ScopeChecker<'a> {
    fn new(function: &'a str) -> Self {
        Self {
            function,
            scopes: vec![HashSet::new()],
            call_ids: HashSet::new(),
            variables: Vec::new(),
            returns: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> BenchError {
        BenchError::malformed(self.function, reason)
    }

    fn is_declared(&self, slot: &Slot) -> bool {
        self.scopes.iter().any(|scope| scope.contains(slot))
    }

    /// Declare `slot` in the innermost scope unless an enclosing scope already has it.
    fn define(&mut self, slot: Slot) {
        if self.is_declared(&slot) {
            return;
        }
        if let Slot::Var(name) = &slot {
            if !self.variables.iter().any(|v| &v.name == name) {
                self.variables.push(Variable {
                    name: name.clone(),
                    ty: VarType::Int,
                    owner: self.function.to_string(),
                });
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(slot);
        }
    }

    fn check_block(&mut self, block: &[Stmt]) -> BenchResult<()> {
        for stmt in block {
            for slot in stmt.reads() {
                if !self.is_declared(&slot) {
                    return Err(self.error(format!(
                        "statement {} reads `{slot}` before it is declared",
                        stmt.id()
                    )));
                }
            }

            match stmt.kind() {
                StmtKind::Assign { target, .. } => {
                    if target.trim().is_empty() {
                        return Err(self.error(format!(
                            "statement {} assigns to an empty name",
                            stmt.id()
                        )));
                    }
                    self.define(Slot::Var(target.clone()));
                }
                StmtKind::Call { target, id, callee, .. } => {
                    if callee.trim().is_empty() {
                        return Err(
                            self.error(format!("statement {} calls an empty name", stmt.id()))
                        );
                    }
                    if let Some(id) = id {
                        if id.trim().is_empty() {
                            return Err(
                                self.error(format!("statement {} has an empty call id", stmt.id()))
                            );
                        }
                        if !self.call_ids.insert(id.clone()) {
                            return Err(self.error(format!(
                                "call id `@{id}` is used by more than one call"
                            )));
                        }
                        self.define(Slot::CallId(id.clone()));
                    }
                    if let Some(target) = target {
                        if target.trim().is_empty() {
                            return Err(self.error(format!(
                                "statement {} stores a call result in an empty name",
                                stmt.id()
                            )));
                        }
                        self.define(Slot::Var(target.clone()));
                    }
                }
                StmtKind::If { then_block, else_block, .. } => {
                    self.check_nested(then_block, None)?;
                    self.check_nested(else_block, None)?;
                }
                StmtKind::Loop { counter, body, .. } => {
                    self.check_nested(body, counter.as_deref())?;
                }
                StmtKind::Return(_) => self.returns += 1,
            }
        }
        Ok(())
    }

    fn check_nested(&mut self, block: &[Stmt], counter: Option<&str>) -> BenchResult<()> {
        self.scopes.push(HashSet::new());
        if let Some(counter) = counter {
            self.define(Slot::Var(counter.to_string()));
        }
        let result = self.check_block(block);
        self.scopes.pop();
        result
    }
}
