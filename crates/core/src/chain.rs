//! Chain composition: resolve call sites from an entry function and order the
//! reachable functions caller-before-callee.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BenchError, BenchResult};
use crate::model::{Function, StmtId};

/// A resolved call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLink {
    pub caller: String,
    pub statement: StmtId,
    pub callee: String,
}

/// Acyclic layering of the functions reachable from one entry point.
#[derive(Debug, Clone)]
pub struct CallChain {
    entry: String,
    functions: Vec<Function>,
    links: Vec<CallLink>,
    layers: Vec<usize>,
    index: HashMap<String, usize>,
}

impl CallChain {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Functions in topological order; the entry comes first.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn links(&self) -> &[CallLink] {
        &self.links
    }

    /// Names of the functions `caller` calls, in call-site order, without repeats.
    pub fn callees_of(&self, caller: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for link in self.links.iter().filter(|l| l.caller == caller) {
            if !out.contains(&link.callee.as_str()) {
                out.push(&link.callee);
            }
        }
        out
    }

    /// Layer of a function: the length of the longest call path from the entry.
    pub fn layer_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&i| self.layers[i])
    }

    /// Function names grouped by layer, entry layer first.
    pub fn layers(&self) -> Vec<Vec<&str>> {
        let depth = self.layers.iter().copied().max().map_or(0, |d| d + 1);
        let mut out = vec![Vec::new(); depth];
        for (function, &layer) in self.functions.iter().zip(&self.layers) {
            out[layer].push(function.name());
        }
        out
    }

    pub fn statement_count(&self) -> usize {
        self.functions.iter().map(Function::statement_count).sum()
    }
}

/// Resolve every call site reachable from `entry` against `declared`.
///
/// Fails with `UnresolvedCall` for an unknown callee, `CyclicCallGraph` when
/// the reachable call graph has a cycle, and `MalformedProgram` for an
/// undeclared entry, duplicate declarations, or an arity mismatch.
pub fn compose(entry: &str, declared: &[Function]) -> BenchResult<CallChain> {
    let mut by_name: HashMap<&str, &Function> = HashMap::new();
    for function in declared {
        if by_name.insert(function.name(), function).is_some() {
            return Err(BenchError::malformed(
                function.name(),
                "function is declared more than once",
            ));
        }
    }
    if !by_name.contains_key(entry) {
        return Err(BenchError::malformed(entry, "entry function is not declared"));
    }

    let mut graph: DiGraph<&str, StmtId> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
    let mut links = Vec::new();
    let mut queue = VecDeque::from([entry]);
    nodes.insert(entry, graph.add_node(entry));

    while let Some(caller_name) = queue.pop_front() {
        let caller = by_name[caller_name];
        for (statement, callee_name, arg_count) in caller.call_sites() {
            let Some(&callee) = by_name.get(callee_name) else {
                return Err(BenchError::UnresolvedCall {
                    caller: caller_name.to_string(),
                    statement,
                    callee: callee_name.to_string(),
                });
            };
            if callee.params().len() != arg_count {
                return Err(BenchError::malformed(
                    caller_name,
                    format!(
                        "statement {statement} passes {arg_count} argument(s) to `{callee_name}`, which takes {}",
                        callee.params().len()
                    ),
                ));
            }

            let callee_key = callee.name();
            let to = match nodes.get(callee_key) {
                Some(&node) => node,
                None => {
                    let node = graph.add_node(callee_key);
                    nodes.insert(callee_key, node);
                    queue.push_back(callee_key);
                    node
                }
            };
            graph.add_edge(nodes[caller_name], to, statement);
            links.push(CallLink {
                caller: caller_name.to_string(),
                statement,
                callee: callee_key.to_string(),
            });
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| cycle_error(&graph, cycle.node_id()))?;

    let mut layers: HashMap<NodeIndex, usize> = HashMap::new();
    for &node in &order {
        let here = layers.get(&node).copied().unwrap_or(0);
        for next in graph.neighbors(node) {
            let slot = layers.entry(next).or_insert(0);
            *slot = (*slot).max(here + 1);
        }
        layers.entry(node).or_insert(here);
    }

    let functions: Vec<Function> = order.iter().map(|&n| by_name[graph[n]].clone()).collect();
    let layer_list: Vec<usize> =
        order.iter().map(|n| layers.get(n).copied().unwrap_or(0)).collect();
    let index = functions.iter().enumerate().map(|(i, f)| (f.name().to_string(), i)).collect();

    let skipped = declared.len() - functions.len();
    if skipped > 0 {
        warn!(entry, skipped, "functions unreachable from the entry are not part of the chain");
    }
    debug!(entry, functions = functions.len(), calls = links.len(), "composed call chain");

    Ok(CallChain { entry: entry.to_string(), functions, links, layers: layer_list, index })
}

/// Pick a call site on the cycle through `node`: an outgoing edge whose target
/// shares `node`'s strongly connected component (a self-call included).
fn cycle_error(graph: &DiGraph<&str, StmtId>, node: NodeIndex) -> BenchError {
    let component =
        kosaraju_scc(graph).into_iter().find(|scc| scc.contains(&node)).unwrap_or_default();

    let site = graph
        .edges(node)
        .filter(|e| component.contains(&e.target()))
        .map(|e| (*e.weight(), e.target()))
        .min_by_key(|(statement, _)| *statement);

    match site {
        Some((statement, target)) => BenchError::CyclicCallGraph {
            caller: graph[node].to_string(),
            statement,
            callee: graph[target].to_string(),
        },
        None => BenchError::CyclicCallGraph {
            caller: graph[node].to_string(),
            statement: 0,
            callee: graph[node].to_string(),
        },
    }
}
