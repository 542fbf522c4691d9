// tests/worker_pool.rs

mod common;
use crate::common::{TEST_DEADLINE, init_tracing, run_with_deadline};

use std::sync::Arc;
use std::sync::mpsc;

use rundag::{ExecutorConfig, NoopObserver, TaskExecutor, TokioWorkerPool, WorkerPool};
use rundag_test_utils::pools::DroppingPool;
use rundag_test_utils::recording::{Event, RecordingObserver};

#[test]
fn test_owned_pool_reports_capacity() {
    let pool = TokioWorkerPool::new(3).unwrap();
    assert_eq!(pool.capacity(), Some(3));
}

#[test]
fn test_owned_pool_runs_submitted_jobs() {
    let pool = TokioWorkerPool::new(2).unwrap();
    let (tx, rx) = mpsc::channel();

    for i in 0..4 {
        let tx = tx.clone();
        pool.submit(Box::new(move || {
            tx.send(i).unwrap();
        }))
        .unwrap();
    }

    let mut seen: Vec<i32> = (0..4).map(|_| rx.recv_timeout(TEST_DEADLINE).unwrap()).collect();
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[test]
fn test_pool_on_borrowed_runtime() {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();
    let pool = TokioWorkerPool::from_handle(runtime.handle().clone());
    assert_eq!(pool.capacity(), None);

    let mut executor: TaskExecutor<&str> =
        TaskExecutor::with_pool(Arc::new(pool), ExecutorConfig::default())
            .with_observer(Arc::new(NoopObserver));
    executor
        .register("a", [], || Ok(()))
        .register("b", ["a"], || Ok(()));

    let report = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run did not finish in time")
        .unwrap();
    assert_eq!(report.completed(), &["a", "b"]);

    drop(runtime);
}

#[test]
fn test_job_dropped_by_pool_fails_the_run() {
    init_tracing();
    let observer: Arc<RecordingObserver<&str>> = Arc::new(RecordingObserver::new());
    let mut executor = TaskExecutor::with_pool(Arc::new(DroppingPool), ExecutorConfig::default())
        .with_observer(observer.clone());
    executor
        .register("a", [], || Ok(()))
        .register("b", ["a"], || Ok(()));

    let err = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run blocked on a dropped job")
        .unwrap_err();
    let failure = err.as_task_failure().unwrap();

    assert_eq!(failure.task, "a");
    assert!(failure.source.to_string().contains("dropped task before it ran"));
    assert!(observer.started_at(&"a").is_none());
    assert_eq!(observer.failures().len(), 1);
}

#[test]
fn test_runtime_shut_down_under_borrowed_pool_fails_the_run() {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();
    let pool = TokioWorkerPool::from_handle(runtime.handle().clone());
    drop(runtime);

    let mut executor: TaskExecutor<&str> =
        TaskExecutor::with_pool(Arc::new(pool), ExecutorConfig::default());
    executor.register("a", [], || Ok(()));

    let result = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run blocked after the runtime shut down");

    let err = result.unwrap_err();
    assert_eq!(err.as_task_failure().map(|f| f.task.as_str()), Some("a"));
}

#[test]
fn test_last_completion_is_reported_before_run_finishes() {
    init_tracing();
    let observer: Arc<RecordingObserver<&str>> = Arc::new(RecordingObserver::new());
    let pool = TokioWorkerPool::new(2).unwrap();
    let mut executor = TaskExecutor::with_pool(Arc::new(pool), ExecutorConfig::default())
        .with_observer(observer.clone());
    executor
        .register("a", [], || Ok(()))
        .register("b", ["a"], || Ok(()));

    for _ in 0..20 {
        executor.run().unwrap();
    }

    let events = observer.events();
    let mut last_completed = None;
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Completed(_) => last_completed = Some(i),
            Event::RunFinished { completed, failed } => {
                assert_eq!(*completed, 2);
                assert!(!failed);
                assert!(last_completed.is_some_and(|c| c < i));
                last_completed = None;
            }
            _ => {}
        }
    }
}
