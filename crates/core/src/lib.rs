//! slicebench-core
//!
//! Core library for layered live/dead dataflow slicing benchmarks.
//!
//! This crate defines the statement model, per-function and chain-level
//! dataflow graphs, the live/dead partitioner, call-chain composition, the
//! validator that scores an external slicer against the computed ground
//! truth, a reference interpreter, and the bench-root config/history store.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, harness scripts, etc.).

pub mod chain;
pub mod db;
pub mod document;
pub mod error;
pub mod graph;
pub mod interp;
pub mod model;
pub mod partition;
pub mod validate;

pub use chain::{compose, CallChain, CallLink};
pub use error::{BenchError, BenchResult};
pub use graph::{ChainGraph, DataflowGraph, DepKind, StmtRef};
pub use model::{BinOp, Expr, Function, Slot, Stmt, StmtId, StmtKind, VarType, Variable};
pub use partition::{
    partition, partition_chain, partition_from, slice_from, ChainLiveSet, LiveSet, SliceDirection,
};
pub use validate::{validate, validate_against, CandidateLiveSet, ValidationReport, Verdict};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
