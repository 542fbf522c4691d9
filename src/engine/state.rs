// src/engine/state.rs

//! Per-run shared state.
//!
//! A [`RunContext`] is created fresh for every run and shared (behind an
//! `Arc`) between the thread that started the run and the workers executing
//! task bodies. One mutex guards the run-state sets and the failure slot; one
//! condition variable wakes the single waiter when the run settles.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::dag::{DependencyGraph, TaskIndex};
use crate::errors::TaskFailure;
use crate::types::TaskKey;

/// Run-state sets for one run.
///
/// Every registered task is in exactly one of `pending` / `completed`;
/// `in_flight` is a subset of `pending`.
#[derive(Debug)]
struct RunState {
    pending: HashSet<TaskIndex>,
    completed: HashSet<TaskIndex>,
    in_flight: HashSet<TaskIndex>,
    completion_order: Vec<TaskIndex>,
    failure: Option<TaskFailure>,
    /// Set by the first failure and never cleared for this run, even after
    /// the failure itself has been taken.
    aborted: bool,
}

impl RunState {
    fn is_settled(&self) -> bool {
        self.pending.is_empty() || self.failure.is_some()
    }

    /// `Ok(())` if `task` may be submitted now, otherwise the first
    /// dependency that has not completed yet (or the task itself when it is
    /// not waiting to run at all).
    fn check_eligible<T: TaskKey>(
        &self,
        task: TaskIndex,
        graph: &DependencyGraph<T>,
    ) -> Result<(), Option<TaskIndex>> {
        if !self.pending.contains(&task) || self.in_flight.contains(&task) {
            return Err(None);
        }

        match graph
            .upstream(task)
            .iter()
            .find(|dep| !self.completed.contains(dep))
        {
            Some(&missing) => Err(Some(missing)),
            None => Ok(()),
        }
    }
}

/// What happened when a task was recorded as completed.
#[derive(Debug, Default)]
pub(crate) struct Completion {
    /// Dependents that became eligible; already marked in-flight.
    pub eligible: Vec<TaskIndex>,
    /// Dependents still waiting, paired with a dependency they wait on.
    pub deferred: Vec<(TaskIndex, TaskIndex)>,
    /// `pending` became empty with this completion.
    pub drained: bool,
    /// The run had already failed; nothing was made eligible.
    pub aborted: bool,
}

/// How a run settled, as seen by the waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settled {
    Drained,
    Failed,
}

/// Completion synchronizer and failure sink for a single run.
#[derive(Debug)]
pub(crate) struct RunContext {
    state: Mutex<RunState>,
    settled: Condvar,
}

impl RunContext {
    pub fn new(pending: impl IntoIterator<Item = TaskIndex>) -> Self {
        let pending: HashSet<TaskIndex> = pending.into_iter().collect();
        Self {
            state: Mutex::new(RunState {
                completion_order: Vec::with_capacity(pending.len()),
                pending,
                completed: HashSet::new(),
                in_flight: HashSet::new(),
                failure: None,
                aborted: false,
            }),
            settled: Condvar::new(),
        }
    }

    // Task bodies never run under this lock, so a poisoned guard can only come
    // from a panic in our own bookkeeping; the sets are still consistent.
    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    /// Mark a root task in-flight. Returns `false` if it must not be
    /// submitted (already in-flight, not pending, or the run has failed).
    pub fn try_begin(&self, task: TaskIndex) -> bool {
        let mut state = self.lock();
        if state.aborted || !state.pending.contains(&task) {
            return false;
        }
        state.in_flight.insert(task)
    }

    /// Move `task` to `completed` and claim every dependent that became
    /// eligible because of it.
    ///
    /// Claiming (the in-flight check-and-set) happens under the same guard
    /// as the completion, so concurrent completions of two dependencies of
    /// the same task can never both submit it.
    pub fn on_task_completed<T: TaskKey>(
        &self,
        task: TaskIndex,
        graph: &DependencyGraph<T>,
    ) -> Completion {
        let mut state = self.lock();

        state.in_flight.remove(&task);
        if state.pending.remove(&task) {
            state.completed.insert(task);
            state.completion_order.push(task);
        }

        let mut completion = Completion {
            drained: state.pending.is_empty(),
            aborted: state.aborted,
            ..Completion::default()
        };

        if completion.drained {
            self.settled.notify_all();
        }

        if state.aborted {
            return completion;
        }

        for &dependent in graph.downstream(task) {
            match state.check_eligible(dependent, graph) {
                Ok(()) => {
                    state.in_flight.insert(dependent);
                    completion.eligible.push(dependent);
                }
                Err(Some(missing)) => completion.deferred.push((dependent, missing)),
                Err(None) => {}
            }
        }

        completion
    }

    /// Mark the run as failed. Returns `true` for the first caller only; that
    /// caller is expected to follow up with [`record_failure`](Self::record_failure).
    pub fn abort(&self) -> bool {
        let mut state = self.lock();
        !std::mem::replace(&mut state.aborted, true)
    }

    /// Store `failure` unless a failure is already stored, then wake the
    /// waiter either way. Returns whether the failure was stored.
    pub fn record_failure(&self, failure: TaskFailure) -> bool {
        let mut state = self.lock();
        state.aborted = true;

        let stored = state.failure.is_none();
        if stored {
            state.failure = Some(failure);
        }

        self.settled.notify_all();
        stored
    }

    /// Block until every pending task completed or a failure was recorded.
    ///
    /// The condition is re-checked under the guard, so a run that settles
    /// before this is called returns immediately.
    pub fn wait_for_completion(&self) -> Settled {
        let guard = self.lock();
        let state = self
            .settled
            .wait_while(guard, |state| !state.is_settled())
            .unwrap_or_else(PoisonError::into_inner);

        if state.failure.is_some() {
            Settled::Failed
        } else {
            Settled::Drained
        }
    }

    /// Read and clear the captured failure.
    pub fn take_failure(&self) -> Option<TaskFailure> {
        self.lock().failure.take()
    }

    /// Completed tasks, in the order their completion was recorded.
    pub fn completion_order(&self) -> Vec<TaskIndex> {
        self.lock().completion_order.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }
}
