use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::CallChain;
use crate::graph::{DataflowGraph, DepKind};
use crate::model::StmtId;

/// A statement addressed across a whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtRef {
    pub function: String,
    pub stmt: StmtId,
}

impl StmtRef {
    pub fn new(function: impl Into<String>, stmt: StmtId) -> Self {
        Self { function: function.into(), stmt }
    }
}

/// Union of every chain function's dataflow graph, plus one
/// [`DepKind::CallReturn`] edge per resolved call site running from the
/// callee's `Return` into the `Call`.
#[derive(Debug, Clone)]
pub struct ChainGraph {
    graph: DiGraph<StmtRef, DepKind>,
    index: HashMap<StmtRef, NodeIndex>,
    entry_return: StmtRef,
}

impl ChainGraph {
    pub fn build(chain: &CallChain) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for function in chain.functions() {
            let local = DataflowGraph::build(function);
            let mut nodes = Vec::with_capacity(local.statement_count());
            for stmt in 0..local.statement_count() {
                let key = StmtRef::new(function.name(), stmt);
                let node = graph.add_node(key.clone());
                index.insert(key, node);
                nodes.push(node);
            }
            for (from, to, kind) in local.edges() {
                graph.add_edge(nodes[from], nodes[to], kind);
            }
        }

        for link in chain.links() {
            let Some(callee) = chain.function(&link.callee) else {
                continue;
            };
            let ret = StmtRef::new(&link.callee, callee.return_stmt().id());
            let call = StmtRef::new(&link.caller, link.statement);
            if let (Some(&from), Some(&to)) = (index.get(&ret), index.get(&call)) {
                graph.add_edge(from, to, DepKind::CallReturn);
            }
        }

        let entry_return = match chain.function(chain.entry()) {
            Some(entry) => StmtRef::new(chain.entry(), entry.return_stmt().id()),
            None => StmtRef::new(chain.entry(), 0),
        };

        debug!(
            entry = chain.entry(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built chain graph"
        );

        Self { graph, index, entry_return }
    }

    pub fn graph(&self) -> &DiGraph<StmtRef, DepKind> {
        &self.graph
    }

    pub fn node(&self, stmt: &StmtRef) -> Option<NodeIndex> {
        self.index.get(stmt).copied()
    }

    /// The chain-level slicing criterion: the entry function's `Return`.
    pub fn entry_return(&self) -> &StmtRef {
        &self.entry_return
    }

    pub fn has_edge(&self, from: &StmtRef, to: &StmtRef) -> bool {
        match (self.node(from), self.node(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }
}
