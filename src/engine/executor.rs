// src/engine/executor.rs

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ExecutorConfig;
use crate::dag::{DependencyGraph, validate_graph};
use crate::engine::dispatcher::Dispatcher;
use crate::engine::observer::{RunObserver, TracingObserver};
use crate::engine::state::RunContext;
use crate::errors::Result;
use crate::exec::{TokioWorkerPool, WorkerPool};
use crate::types::TaskKey;

/// Runs registered tasks in dependency order on a worker pool.
///
/// Build the graph with [`register`](Self::register), then call
/// [`run`](Self::run). `run` blocks the calling thread until every task has
/// completed or the first task failure aborts the run, and can be called
/// again on the same executor.
///
/// ```no_run
/// use rundag::{ExecutorConfig, TaskExecutor};
///
/// let mut executor = TaskExecutor::new(ExecutorConfig::default())?;
/// executor
///     .register("fetch", [], || Ok(()))
///     .register("build", ["fetch"], || Ok(()))
///     .register("test", ["build"], || Ok(()));
///
/// let report = executor.run()?;
/// assert_eq!(report.len(), 3);
/// # Ok::<(), rundag::RundagError>(())
/// ```
pub struct TaskExecutor<T: TaskKey> {
    graph: Arc<DependencyGraph<T>>,
    pool: Arc<dyn WorkerPool>,
    observer: Arc<dyn RunObserver<T>>,
    config: ExecutorConfig,
}

impl<T: TaskKey> TaskExecutor<T> {
    /// Executor backed by a [`TokioWorkerPool`] sized from `config.workers`.
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        let pool = TokioWorkerPool::from_config(&config)?;
        Ok(Self::with_pool(Arc::new(pool), config))
    }

    /// Executor submitting to an arbitrary pool.
    pub fn with_pool(pool: Arc<dyn WorkerPool>, config: ExecutorConfig) -> Self {
        Self {
            graph: Arc::new(DependencyGraph::new()),
            pool,
            observer: Arc::new(TracingObserver),
            config,
        }
    }

    /// Replace the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver<T>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn graph(&self) -> &DependencyGraph<T> {
        &self.graph
    }

    /// Register `id` to run `work` once every task in `depends_on` completed.
    ///
    /// Registering an id again replaces its work and adds to its
    /// dependencies; it never removes a dependency declared earlier.
    pub fn register<I, F>(&mut self, id: T, depends_on: I, work: F) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let deps: Vec<T> = depends_on.into_iter().collect();
        self.observer.registered(&id, &deps);

        // Jobs left over from an aborted run may still hold the previous
        // graph; they keep it and we get a private copy.
        Arc::make_mut(&mut self.graph).register(id, deps, Arc::new(work));
        self
    }

    /// Check the graph the way a validated run would, without running it.
    pub fn validate(&self) -> Result<()> {
        validate_graph(&self.graph, self.config.strict_validation)
    }

    /// Run every registered task, validating first if `config.validate` is set.
    pub fn run(&self) -> Result<RunReport<T>> {
        self.run_with_validation(self.config.validate)
    }

    /// Run every registered task.
    ///
    /// With `validate = false` nothing checks that every task can become
    /// eligible, and a graph with an unsatisfiable task blocks forever.
    ///
    /// On a task failure this returns as soon as the failure is recorded.
    /// Tasks already submitted keep running in the background; nothing else
    /// is submitted for this run.
    pub fn run_with_validation(&self, validate: bool) -> Result<RunReport<T>> {
        let started = Instant::now();

        if self.graph.is_empty() {
            debug!("no registered tasks; nothing to run");
            return Ok(RunReport::new(Vec::new(), started.elapsed()));
        }

        if validate {
            self.validate()?;
        }

        let context = Arc::new(RunContext::new(self.graph.registered_indices()));
        debug!(capacity = ?self.pool.capacity(), "dispatching onto worker pool");
        self.observer.run_started(self.graph.len(), validate);

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.graph),
            Arc::clone(&self.pool),
            Arc::clone(&self.observer),
            Arc::clone(&context),
        );
        let roots = dispatcher.schedule_roots();
        drop(dispatcher);

        let settled = context.wait_for_completion();
        debug!(?settled, roots, pending = context.pending_count(), "run settled");

        let completed: Vec<T> = context
            .completion_order()
            .into_iter()
            .map(|idx| self.graph.id(idx).clone())
            .collect();
        let elapsed = started.elapsed();

        let failure = context.take_failure();
        self.observer
            .run_finished(completed.len(), failure.is_some(), elapsed);

        match failure {
            Some(failure) => Err(failure.into()),
            None => Ok(RunReport::new(completed, elapsed)),
        }
    }
}

impl<T: TaskKey> fmt::Debug for TaskExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("graph", &self.graph)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport<T> {
    completed: Vec<T>,
    elapsed: Duration,
}

impl<T: PartialEq> RunReport<T> {
    fn new(completed: Vec<T>, elapsed: Duration) -> Self {
        Self { completed, elapsed }
    }

    /// Completed tasks in the order their completion was recorded.
    pub fn completed(&self) -> &[T] {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn contains(&self, task: &T) -> bool {
        self.completed.contains(task)
    }

    /// Position of `task` in completion order.
    pub fn position_of(&self, task: &T) -> Option<usize> {
        self.completed.iter().position(|t| t == task)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn into_completed(self) -> Vec<T> {
        self.completed
    }
}
