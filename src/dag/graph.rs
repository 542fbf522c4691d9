// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::types::TaskKey;

/// Unit of work registered for a task.
///
/// `Fn` rather than `FnOnce` so the same graph can be run more than once.
pub type Work = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Dense index assigned to every identifier the graph has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskIndex(usize);

impl TaskIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Internal node structure: identifier, work and both adjacency views.
#[derive(Clone)]
struct TaskNode<T> {
    id: T,
    /// `None` while the identifier has only been named as a dependency.
    work: Option<Work>,
    /// Direct dependencies: tasks that must complete before this one can run.
    upstream: BTreeSet<TaskIndex>,
    /// Direct dependents: tasks that list this one as a dependency.
    downstream: BTreeSet<TaskIndex>,
}

/// In-memory dependency graph keyed by task identifier.
///
/// Identifiers are interned to [`TaskIndex`] values the first time they are
/// mentioned, either as a registered task or as somebody's dependency. Both
/// adjacency views are updated by the same [`register`](Self::register) call,
/// so an edge "A depends on B" is always present in `upstream(A)` and
/// `downstream(B)`.
///
/// The graph has no interior mutability. Registration takes `&mut self`;
/// during a run the executor shares it immutably behind an `Arc`.
#[derive(Clone)]
pub struct DependencyGraph<T> {
    index: HashMap<T, TaskIndex>,
    nodes: Vec<TaskNode<T>>,
    registered: usize,
}

impl<T: TaskKey> DependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            registered: 0,
        }
    }

    /// Register `id` with its dependencies and work.
    ///
    /// Registering the same id again replaces its work and adds the new
    /// dependencies to the ones declared earlier.
    pub fn register<I>(&mut self, id: T, depends_on: I, work: Work) -> TaskIndex
    where
        I: IntoIterator<Item = T>,
    {
        let task = self.intern(id);

        for dep in depends_on {
            let dep = self.intern(dep);
            self.nodes[task.0].upstream.insert(dep);
            self.nodes[dep.0].downstream.insert(task);
        }

        let node = &mut self.nodes[task.0];
        if node.work.is_none() {
            self.registered += 1;
        }
        node.work = Some(work);

        task
    }

    fn intern(&mut self, id: T) -> TaskIndex {
        if let Some(&existing) = self.index.get(&id) {
            return existing;
        }

        let idx = TaskIndex(self.nodes.len());
        self.nodes.push(TaskNode {
            id: id.clone(),
            work: None,
            upstream: BTreeSet::new(),
            downstream: BTreeSet::new(),
        });
        self.index.insert(id, idx);
        idx
    }

    /// Index of `id`, if it was ever mentioned.
    pub fn lookup(&self, id: &T) -> Option<TaskIndex> {
        self.index.get(id).copied()
    }

    /// Whether `id` was mentioned at all (registered or named as a dependency).
    pub fn contains(&self, id: &T) -> bool {
        self.index.contains_key(id)
    }

    /// Whether `id` was registered with work.
    pub fn is_registered(&self, id: &T) -> bool {
        self.lookup(id)
            .is_some_and(|idx| self.nodes[idx.0].work.is_some())
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.registered
    }

    pub fn is_empty(&self) -> bool {
        self.registered == 0
    }

    /// Registered task ids, in the order they were first mentioned.
    pub fn task_ids(&self) -> impl Iterator<Item = &T> {
        self.nodes
            .iter()
            .filter(|n| n.work.is_some())
            .map(|n| &n.id)
    }

    /// Immediate dependencies of a task. Unknown ids have none.
    pub fn upstream_of(&self, id: &T) -> Vec<&T> {
        self.lookup(id)
            .map(|idx| self.ids_of(&self.nodes[idx.0].upstream))
            .unwrap_or_default()
    }

    /// Immediate dependents of a task. Unknown ids have none.
    pub fn downstream_of(&self, id: &T) -> Vec<&T> {
        self.lookup(id)
            .map(|idx| self.ids_of(&self.nodes[idx.0].downstream))
            .unwrap_or_default()
    }

    /// Every registered task with no declared dependency.
    pub fn roots_with_no_upstream(&self) -> Vec<&T> {
        self.root_indices().into_iter().map(|idx| self.id(idx)).collect()
    }

    fn ids_of(&self, set: &BTreeSet<TaskIndex>) -> Vec<&T> {
        set.iter().map(|idx| &self.nodes[idx.0].id).collect()
    }

    // Index-level accessors used by validation and dispatch.

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn id(&self, idx: TaskIndex) -> &T {
        &self.nodes[idx.0].id
    }

    pub(crate) fn work(&self, idx: TaskIndex) -> Option<&Work> {
        self.nodes[idx.0].work.as_ref()
    }

    pub(crate) fn is_registered_index(&self, idx: TaskIndex) -> bool {
        self.nodes[idx.0].work.is_some()
    }

    pub(crate) fn upstream(&self, idx: TaskIndex) -> &BTreeSet<TaskIndex> {
        &self.nodes[idx.0].upstream
    }

    pub(crate) fn downstream(&self, idx: TaskIndex) -> &BTreeSet<TaskIndex> {
        &self.nodes[idx.0].downstream
    }

    pub(crate) fn indices(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        (0..self.nodes.len()).map(TaskIndex)
    }

    pub(crate) fn registered_indices(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.work.is_some())
            .map(|(i, _)| TaskIndex(i))
    }

    pub(crate) fn root_indices(&self) -> Vec<TaskIndex> {
        self.registered_indices()
            .filter(|&idx| self.nodes[idx.0].upstream.is_empty())
            .collect()
    }
}

impl<T: TaskKey> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TaskKey> fmt::Debug for DependencyGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for node in &self.nodes {
            let deps: Vec<&T> = self.ids_of(&node.upstream);
            map.entry(&node.id, &deps);
        }
        map.finish()
    }
}
