//! Def-use graphs over benchmark functions.
//!
//! Nodes are statements; an edge `a -> b` means "`a` defines something `b`
//! reads" (or, for control edges, "`a` decides whether `b` runs"). The
//! partitioner walks these edges backwards from the slicing criterion.
//!
//! The builder is a single forward pass over the body that keeps, per slot,
//! the set of statements whose definition may reach the current point:
//! - the two arms of an `If` start from the same state and are unioned after;
//! - a loop body is iterated to a fixpoint, and the pre-loop state is unioned
//!   in as well because the bound may be zero. This holds for constant nonzero
//!   bounds too: the model stays path-insensitive.

pub mod chain;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::model::{Function, Slot, Stmt, StmtId, StmtKind};

pub use chain::{ChainGraph, StmtRef};

/// Why one statement depends on another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepKind {
    /// The source defines `slot` and the target reads it.
    Data(Slot),
    /// The source is the `If`/`Loop` directly enclosing the target.
    Control,
    /// The source is a callee's `Return`, the target the `Call` receiving it.
    CallReturn,
}

/// Def-use graph of one function.
#[derive(Debug, Clone)]
pub struct DataflowGraph {
    function: String,
    graph: DiGraph<StmtId, DepKind>,
    nodes: Vec<NodeIndex>,
    return_id: StmtId,
}

type Reaching = BTreeMap<Slot, BTreeSet<StmtId>>;

impl DataflowGraph {
    pub fn build(function: &Function) -> Self {
        let mut graph = DiGraph::with_capacity(function.statement_count(), 0);
        let nodes: Vec<NodeIndex> =
            (0..function.statement_count()).map(|id| graph.add_node(id)).collect();

        let mut builder = Builder { graph: &mut graph, nodes: &nodes, seen: HashSet::new() };
        let mut state = Reaching::new();
        builder.block(function.body(), None, &mut state);

        debug!(
            function = function.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built dataflow graph"
        );

        Self {
            function: function.name().to_string(),
            graph,
            nodes,
            return_id: function.return_stmt().id(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn graph(&self) -> &DiGraph<StmtId, DepKind> {
        &self.graph
    }

    pub fn node(&self, id: StmtId) -> Option<NodeIndex> {
        self.nodes.get(id).copied()
    }

    /// The default slicing criterion.
    pub fn return_id(&self) -> StmtId {
        self.return_id
    }

    pub fn statement_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_edge(&self, from: StmtId, to: StmtId) -> bool {
        match (self.node(from), self.node(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// All edges as `(from, to, kind)`, sorted.
    pub fn edges(&self) -> Vec<(StmtId, StmtId, DepKind)> {
        let mut out: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((self.graph[a], self.graph[b], self.graph[e].clone()))
            })
            .collect();
        out.sort();
        out
    }
}

struct Builder<'a> {
    graph: &'a mut DiGraph<StmtId, DepKind>,
    nodes: &'a [NodeIndex],
    seen: HashSet<(StmtId, StmtId, DepKind)>,
}

impl Builder<'_> {
    fn link(&mut self, from: StmtId, to: StmtId, kind: DepKind) {
        if self.seen.insert((from, to, kind.clone())) {
            self.graph.add_edge(self.nodes[from], self.nodes[to], kind);
        }
    }

    fn block(&mut self, block: &[Stmt], parent: Option<StmtId>, state: &mut Reaching) {
        for stmt in block {
            self.statement(stmt, parent, state);
        }
    }

    fn statement(&mut self, stmt: &Stmt, parent: Option<StmtId>, state: &mut Reaching) {
        let id = stmt.id();
        if let Some(parent) = parent {
            self.link(parent, id, DepKind::Control);
        }
        for slot in stmt.reads() {
            let defs: Vec<StmtId> =
                state.get(&slot).map(|d| d.iter().copied().collect()).unwrap_or_default();
            for def in defs {
                self.link(def, id, DepKind::Data(slot.clone()));
            }
        }

        match stmt.kind() {
            StmtKind::Assign { .. } | StmtKind::Call { .. } => {
                for slot in stmt.defines() {
                    state.insert(slot, BTreeSet::from([id]));
                }
            }
            StmtKind::If { then_block, else_block, .. } => {
                let mut then_state = state.clone();
                self.block(then_block, Some(id), &mut then_state);
                let mut else_state = state.clone();
                self.block(else_block, Some(id), &mut else_state);
                merge_into(&mut then_state, else_state);
                *state = then_state;
            }
            StmtKind::Loop { counter, body, .. } => {
                let mut entry = state.clone();
                loop {
                    let mut iteration = entry.clone();
                    if let Some(counter) = counter {
                        iteration.insert(Slot::Var(counter.clone()), BTreeSet::from([id]));
                    }
                    self.block(body, Some(id), &mut iteration);

                    let mut next = entry.clone();
                    merge_into(&mut next, iteration);
                    if next == entry {
                        break;
                    }
                    entry = next;
                }
                *state = entry;
            }
            StmtKind::Return(_) => {}
        }
    }
}

fn merge_into(into: &mut Reaching, other: Reaching) {
    for (slot, defs) in other {
        into.entry(slot).or_default().extend(defs);
    }
}
