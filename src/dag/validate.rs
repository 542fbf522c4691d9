// src/dag/validate.rs

//! Pre-run structural checks.
//!
//! The reachability check alone only proves every task hangs off some root;
//! it lets cycles that are reachable from a root, and tasks with one
//! satisfied and one unregistered dependency, through. Strict validation adds
//! explicit checks for both.

use std::collections::VecDeque;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::dag::graph::{DependencyGraph, TaskIndex};
use crate::errors::{Result, RundagError};
use crate::types::TaskKey;

/// Run the checks selected by `strict` over every registered task.
pub fn validate_graph<T: TaskKey>(graph: &DependencyGraph<T>, strict: bool) -> Result<()> {
    let pending: Vec<TaskIndex> = graph.registered_indices().collect();
    verify_reachability(graph, &pending)?;

    if strict {
        verify_known_dependencies(graph)?;
        verify_acyclic(graph)?;
    }

    debug!(tasks = pending.len(), strict, "task graph validated");
    Ok(())
}

/// Fail with [`RundagError::Unreachable`] naming the first pending task that
/// cannot be reached from any root over the downstream relation.
pub(crate) fn verify_reachability<T: TaskKey>(
    graph: &DependencyGraph<T>,
    pending: &[TaskIndex],
) -> Result<()> {
    let reachable = reachable_from_roots(graph);

    for &task in pending {
        if !reachable[task.index()] {
            return Err(RundagError::Unreachable {
                task: graph.id(task).to_string(),
            });
        }
    }

    Ok(())
}

/// Breadth-first walk from every root at once; a node reached from any root
/// is marked.
fn reachable_from_roots<T: TaskKey>(graph: &DependencyGraph<T>) -> Vec<bool> {
    let mut seen = vec![false; graph.node_count()];
    let mut queue: VecDeque<TaskIndex> = VecDeque::new();

    for root in graph.root_indices() {
        seen[root.index()] = true;
        queue.push_back(root);
    }

    while let Some(node) = queue.pop_front() {
        for &child in graph.downstream(node) {
            if !seen[child.index()] {
                seen[child.index()] = true;
                queue.push_back(child);
            }
        }
    }

    seen
}

fn verify_known_dependencies<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    for task in graph.registered_indices() {
        if let Some(&missing) = graph
            .upstream(task)
            .iter()
            .find(|&&dep| !graph.is_registered_index(dep))
        {
            return Err(RundagError::UnknownDependency {
                task: graph.id(task).to_string(),
                dependency: graph.id(missing).to_string(),
            });
        }
    }

    Ok(())
}

fn verify_acyclic<T: TaskKey>(graph: &DependencyGraph<T>) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut dag: DiGraph<TaskIndex, ()> = DiGraph::with_capacity(graph.node_count(), 0);
    let nodes: Vec<NodeIndex> = graph.indices().map(|idx| dag.add_node(idx)).collect();

    for task in graph.registered_indices() {
        for &dep in graph.upstream(task) {
            dag.add_edge(nodes[dep.index()], nodes[task.index()], ());
        }
    }

    match toposort(&dag, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let task = dag[cycle.node_id()];
            Err(RundagError::Cycle {
                task: graph.id(task).to_string(),
            })
        }
    }
}
