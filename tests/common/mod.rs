#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rundag::{ExecutorConfig, TaskExecutor, TokioWorkerPool, Work};
use rundag_test_utils::pools::InlinePool;
use rundag_test_utils::recording::RecordingObserver;

#[allow(unused_imports)]
pub use rundag_test_utils::{TEST_DEADLINE, init_tracing, run_with_deadline};

pub type Key = &'static str;

/// Executor on an [`InlinePool`], with a recording observer attached.
pub fn inline_executor() -> (
    TaskExecutor<Key>,
    Arc<InlinePool>,
    Arc<RecordingObserver<Key>>,
) {
    init_tracing();
    let pool = Arc::new(InlinePool::new());
    let observer = Arc::new(RecordingObserver::new());
    let executor = TaskExecutor::with_pool(pool.clone(), ExecutorConfig::default())
        .with_observer(observer.clone());
    (executor, pool, observer)
}

/// Executor on a real [`TokioWorkerPool`] with `workers` slots.
pub fn tokio_executor(workers: usize) -> (TaskExecutor<Key>, Arc<RecordingObserver<Key>>) {
    init_tracing();
    let config = ExecutorConfig::default().with_workers(workers);
    let pool = TokioWorkerPool::from_config(&config).unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let executor = TaskExecutor::with_pool(Arc::new(pool), config).with_observer(observer.clone());
    (executor, observer)
}

/// Work that does nothing.
pub fn noop() -> Work {
    Arc::new(|| -> anyhow::Result<()> { Ok(()) })
}

/// Shared counter plus a closure that bumps it.
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn bump(counter: &Arc<AtomicUsize>) -> impl Fn() -> anyhow::Result<()> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
