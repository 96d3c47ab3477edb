//! Live/dead partitioning by backward reachability, plus forward slices
//! from an arbitrary statement.
//!
//! A statement is live iff a path of def-use (or control) edges connects it to
//! the slicing criterion. The walk is static: both arms of a conditional are
//! kept whenever either holds a live definition, regardless of which arm a
//! given input would take.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::CallChain;
use crate::error::{BenchError, BenchResult};
use crate::graph::{ChainGraph, DataflowGraph};
use crate::model::StmtId;
use crate::validate::CandidateLiveSet;

/// Per-statement live/dead labeling of one function, indexed by [`StmtId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSet {
    function: String,
    live: Vec<bool>,
}

impl LiveSet {
    pub fn new(function: impl Into<String>, live: Vec<bool>) -> Self {
        Self { function: function.into(), live }
    }

    fn all_dead(function: impl Into<String>, len: usize) -> Self {
        Self::new(function, vec![false; len])
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Out-of-range ids are dead.
    pub fn is_live(&self, id: StmtId) -> bool {
        self.live.get(id).copied().unwrap_or(false)
    }

    pub fn live_ids(&self) -> Vec<StmtId> {
        self.live.iter().enumerate().filter(|(_, &l)| l).map(|(i, _)| i).collect()
    }

    pub fn dead_ids(&self) -> Vec<StmtId> {
        self.live.iter().enumerate().filter(|(_, &l)| !l).map(|(i, _)| i).collect()
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.live
    }
}

/// Partition a function against its own `Return`.
pub fn partition(graph: &DataflowGraph) -> LiveSet {
    let mut live = vec![false; graph.statement_count()];
    if let Some(start) = graph.node(graph.return_id()) {
        for node in backward_reachable(graph.graph(), start) {
            live[graph.graph()[node]] = true;
        }
    }
    let set = LiveSet::new(graph.function(), live);
    debug!(
        function = graph.function(),
        live = set.live_count(),
        total = set.len(),
        "partitioned function"
    );
    set
}

/// Which way a slice walks the dependence edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceDirection {
    /// Statements the criterion depends on.
    #[default]
    Backward,
    /// Statements that depend on the criterion.
    Forward,
}

/// Partition a function against an arbitrary statement.
pub fn partition_from(graph: &DataflowGraph, criterion: StmtId) -> BenchResult<LiveSet> {
    slice_from(graph, criterion, SliceDirection::Backward)
}

/// Slice a function from `criterion` in either direction. The criterion
/// itself is always in the slice.
pub fn slice_from(
    graph: &DataflowGraph,
    criterion: StmtId,
    direction: SliceDirection,
) -> BenchResult<LiveSet> {
    let Some(start) = graph.node(criterion) else {
        return Err(BenchError::malformed(
            graph.function(),
            format!(
                "slicing criterion {criterion} is out of range ({} statements)",
                graph.statement_count()
            ),
        ));
    };
    let reached = match direction {
        SliceDirection::Backward => backward_reachable(graph.graph(), start),
        SliceDirection::Forward => forward_reachable(graph.graph(), start),
    };
    let mut live = vec![false; graph.statement_count()];
    for node in reached {
        live[graph.graph()[node]] = true;
    }
    Ok(LiveSet::new(graph.function(), live))
}

/// LiveSets for every function of a chain, in chain order, computed against
/// the entry function's `Return`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLiveSet {
    entry: String,
    functions: Vec<LiveSet>,
}

impl ChainLiveSet {
    pub fn new(entry: impl Into<String>, functions: Vec<LiveSet>) -> Self {
        Self { entry: entry.into(), functions }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn functions(&self) -> &[LiveSet] {
        &self.functions
    }

    pub fn get(&self, function: &str) -> Option<&LiveSet> {
        self.functions.iter().find(|l| l.function() == function)
    }

    pub fn is_live(&self, function: &str, id: StmtId) -> bool {
        self.get(function).is_some_and(|l| l.is_live(id))
    }

    pub fn live_count(&self) -> usize {
        self.functions.iter().map(LiveSet::live_count).sum()
    }

    /// Render as a candidate document, e.g. to publish an oracle file.
    pub fn to_candidate(&self) -> CandidateLiveSet {
        let mut candidate = CandidateLiveSet::default();
        for set in &self.functions {
            candidate.functions.insert(set.function().to_string(), set.as_slice().to_vec());
        }
        candidate
    }
}

/// Chain-level partition: backward reachability from the entry's `Return`
/// over the chain graph, so a callee's statements are live only through a
/// live call whose result reaches the entry's return.
pub fn partition_chain(chain: &CallChain) -> ChainLiveSet {
    let graph = ChainGraph::build(chain);
    let mut functions: Vec<LiveSet> = chain
        .functions()
        .iter()
        .map(|f| LiveSet::all_dead(f.name(), f.statement_count()))
        .collect();

    if let Some(start) = graph.node(graph.entry_return()) {
        for node in backward_reachable(graph.graph(), start) {
            let stmt = &graph.graph()[node];
            if let Some(set) = functions.iter_mut().find(|s| s.function == stmt.function) {
                set.live[stmt.stmt] = true;
            }
        }
    }

    let result = ChainLiveSet { entry: chain.entry().to_string(), functions };
    debug!(
        entry = chain.entry(),
        live = result.live_count(),
        total = chain.statement_count(),
        "partitioned chain"
    );
    result
}

fn backward_reachable<N, E>(graph: &DiGraph<N, E>, start: NodeIndex) -> Vec<NodeIndex> {
    let reversed = Reversed(graph);
    let mut bfs = Bfs::new(reversed, start);
    let mut out = Vec::new();
    while let Some(node) = bfs.next(reversed) {
        out.push(node);
    }
    out
}

fn forward_reachable<N, E>(graph: &DiGraph<N, E>, start: NodeIndex) -> Vec<NodeIndex> {
    let mut bfs = Bfs::new(graph, start);
    let mut out = Vec::new();
    while let Some(node) = bfs.next(graph) {
        out.push(node);
    }
    out
}
