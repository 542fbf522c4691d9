// src/engine/dispatcher.rs

//! Runtime graph walk: submit roots, then submit dependents as their
//! dependencies complete.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use anyhow::anyhow;
use tracing::trace;

use crate::dag::{DependencyGraph, TaskIndex};
use crate::engine::observer::RunObserver;
use crate::engine::state::RunContext;
use crate::errors::TaskFailure;
use crate::exec::WorkerPool;
use crate::types::TaskKey;

/// Drives one run.
///
/// Shared between the thread that started the run and every submitted job.
/// Jobs that are still running after a failed run keep their own `Arc`, so
/// the graph and run context outlive the `run` call that created them.
pub(crate) struct Dispatcher<T> {
    graph: Arc<DependencyGraph<T>>,
    pool: Arc<dyn WorkerPool>,
    observer: Arc<dyn RunObserver<T>>,
    context: Arc<RunContext>,
}

impl<T: TaskKey> Dispatcher<T> {
    pub fn new(
        graph: Arc<DependencyGraph<T>>,
        pool: Arc<dyn WorkerPool>,
        observer: Arc<dyn RunObserver<T>>,
        context: Arc<RunContext>,
    ) -> Arc<Self> {
        Arc::new(Self {
            graph,
            pool,
            observer,
            context,
        })
    }

    /// Mark every root in-flight and submit it. Stops early if the run fails
    /// while roots are still being submitted. Returns how many were submitted.
    pub fn schedule_roots(self: &Arc<Self>) -> usize {
        let roots = self.graph.root_indices();

        let root_ids: Vec<T> = roots.iter().map(|&r| self.graph.id(r).clone()).collect();
        self.observer.roots_discovered(&root_ids);

        let mut submitted = 0;
        for root in roots {
            if !self.context.try_begin(root) {
                if self.context.is_aborted() {
                    break;
                }
                continue;
            }
            self.submit(root);
            submitted += 1;
        }

        submitted
    }

    /// Hand an already-claimed task to the pool.
    ///
    /// A pool can accept a job and then drop it without running it (for
    /// example a Tokio runtime that is shutting down). The job carries a
    /// [`JobGuard`] so that case fails the task instead of leaving it
    /// in-flight forever.
    fn submit(self: &Arc<Self>, task: TaskIndex) {
        self.observer.scheduled(self.graph.id(task));

        let state = Arc::new(AtomicU8::new(SUBMITTING));
        let guard = JobGuard {
            dispatcher: Some(Arc::clone(self)),
            task,
            state: Arc::clone(&state),
        };

        match self.pool.submit(Box::new(move || guard.run())) {
            Err(err) => self.fail(task, anyhow!("worker pool rejected task: {err}")),
            Ok(()) => {
                // Dropped while the pool call was still on our stack.
                if state
                    .compare_exchange(SUBMITTING, ACCEPTED, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    self.fail(task, anyhow!("worker pool dropped task before it ran"));
                }
            }
        }
    }

    /// Body of a submitted job; runs on a worker thread.
    fn execute(self: &Arc<Self>, task: TaskIndex) {
        let id = self.graph.id(task);
        self.observer.started(id);

        let Some(work) = self.graph.work(task) else {
            self.fail(task, anyhow!("no work registered"));
            return;
        };

        match catch_unwind(AssertUnwindSafe(|| work())) {
            Ok(Ok(())) => self.succeed(task),
            Ok(Err(err)) => self.fail(task, err),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.fail(task, anyhow!("task panicked: {message}"));
            }
        }
    }

    fn succeed(self: &Arc<Self>, task: TaskIndex) {
        // Report before recording: recording the last task wakes the waiter.
        self.observer.completed(self.graph.id(task));
        let completion = self.context.on_task_completed(task, &self.graph);

        if completion.aborted {
            trace!(task = %self.graph.id(task), "run already failed; not scheduling dependents");
            return;
        }

        for (dependent, missing) in completion.deferred {
            self.observer
                .deferred(self.graph.id(dependent), self.graph.id(missing));
        }

        for dependent in completion.eligible {
            self.submit(dependent);
        }
    }

    fn fail(&self, task: TaskIndex, error: anyhow::Error) {
        let id = self.graph.id(task);

        // Claim first, report, then move the error into the failure slot.
        let first = self.context.abort();
        self.observer.failed(id, &error, first);

        if first {
            self.context
                .record_failure(TaskFailure::new(id.to_string(), error));
        }
    }
}

const SUBMITTING: u8 = 0;
const ACCEPTED: u8 = 1;
const DROPPED: u8 = 2;

/// Owned by a submitted job; fails the task if the job is dropped unrun.
///
/// While `submit` is still inside the pool call the submitter reports the
/// drop itself, so a rejected job is reported once, as a rejection.
struct JobGuard<T: TaskKey> {
    dispatcher: Option<Arc<Dispatcher<T>>>,
    task: TaskIndex,
    state: Arc<AtomicU8>,
}

impl<T: TaskKey> JobGuard<T> {
    fn run(mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.execute(self.task);
        }
    }
}

impl<T: TaskKey> Drop for JobGuard<T> {
    fn drop(&mut self) {
        let Some(dispatcher) = self.dispatcher.take() else {
            return;
        };

        if self.state.swap(DROPPED, Ordering::AcqRel) == ACCEPTED {
            dispatcher.fail(self.task, anyhow!("worker pool dropped task before it ran"));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
