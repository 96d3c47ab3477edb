use thiserror::Error;

use crate::model::StmtId;

/// Structural failures for a benchmark chain.
///
/// Every variant is fatal to the chain it was raised for; nothing is partially
/// processed. Live/dead disagreements found by the validator are *not* errors
/// and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// Structural violation: missing/duplicate return, use-before-def,
    /// misaligned candidate LiveSet, unparsable document.
    #[error("Malformed program in `{function}`: {reason}")]
    MalformedProgram { function: String, reason: String },

    /// A call site names a function that is not declared.
    #[error("Unresolved call in `{caller}` at statement {statement}: no function named `{callee}`")]
    UnresolvedCall { caller: String, statement: StmtId, callee: String },

    /// Resolving a call site would close a cycle in the call graph.
    #[error("Cyclic call graph: `{caller}` calls `{callee}` at statement {statement}, which leads back to `{caller}`")]
    CyclicCallGraph { caller: String, statement: StmtId, callee: String },
}

impl BenchError {
    pub(crate) fn malformed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        BenchError::MalformedProgram { function: function.into(), reason: reason.into() }
    }

    /// Short, stable tag for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BenchError::MalformedProgram { .. } => "malformed_program",
            BenchError::UnresolvedCall { .. } => "unresolved_call",
            BenchError::CyclicCallGraph { .. } => "cyclic_call_graph",
        }
    }
}

/// Convenience result type for model/composition/validation operations.
pub type BenchResult<T> = Result<T, BenchError>;
