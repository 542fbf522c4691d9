// tests/executor_runs.rs

mod common;
use crate::common::{
    TEST_DEADLINE, bump, count, counter, init_tracing, inline_executor, run_with_deadline,
    tokio_executor,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rundag::{ExecutorConfig, TaskExecutor};
use rundag_test_utils::recording::Event;

fn diamond(executor: &mut TaskExecutor<&'static str>) {
    executor
        .register("a", [], || Ok(()))
        .register("b", ["a"], || Ok(()))
        .register("c", ["a"], || Ok(()))
        .register("d", ["b", "c"], || Ok(()));
}

#[test]
fn test_diamond_respects_dependencies_on_worker_pool() {
    let (mut executor, observer) = tokio_executor(4);
    diamond(&mut executor);

    let report = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run did not finish in time")
        .unwrap();

    assert_eq!(report.len(), 4);
    for task in ["a", "b", "c", "d"] {
        assert!(report.contains(&task), "{task} missing from report");
        assert_eq!(observer.scheduled_count(&task), 1, "{task} scheduled twice");
    }

    let a_done = observer.completed_at(&"a").unwrap();
    assert!(a_done < observer.started_at(&"b").unwrap());
    assert!(a_done < observer.started_at(&"c").unwrap());

    let d_started = observer.started_at(&"d").unwrap();
    assert!(observer.completed_at(&"b").unwrap() < d_started);
    assert!(observer.completed_at(&"c").unwrap() < d_started);

    assert_eq!(report.position_of(&"a"), Some(0));
    assert_eq!(report.position_of(&"d"), Some(3));
}

#[test]
fn test_inline_pool_gives_deterministic_order() {
    let (mut executor, pool, observer) = inline_executor();
    diamond(&mut executor);

    let report = executor.run().unwrap();

    assert_eq!(report.completed(), &["a", "b", "c", "d"]);
    assert_eq!(pool.submitted(), 4);

    // "b" finished first and found "d" still waiting on "c".
    assert!(observer.events().contains(&Event::Deferred {
        task: "d",
        waiting_on: "c",
    }));
}

#[test]
fn test_independent_roots_run_in_parallel() {
    let (mut executor, _observer) = tokio_executor(2);
    let barrier = Arc::new(Barrier::new(2));

    for name in ["left", "right"] {
        let barrier = Arc::clone(&barrier);
        executor.register(name, [], move || {
            // Only returns once both roots are running at the same time.
            barrier.wait();
            Ok(())
        });
    }

    let result = run_with_deadline(TEST_DEADLINE, move || executor.run());
    let report = result.expect("roots did not run concurrently").unwrap();
    assert_eq!(report.len(), 2);
}

#[test]
fn test_concurrency_is_bounded_by_worker_count() {
    let (mut executor, _observer) = tokio_executor(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for name in ["t0", "t1", "t2", "t3", "t4", "t5"] {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        executor.register(name, [], move || {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        });
    }

    let report = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run did not finish in time")
        .unwrap();

    assert_eq!(report.len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2, "more than 2 tasks ran at once");
}

#[test]
fn test_empty_executor_returns_immediately() {
    let (executor, pool, observer) = inline_executor();

    let report = executor.run().unwrap();

    assert!(report.is_empty());
    assert_eq!(pool.submitted(), 0);
    assert!(observer.events().is_empty());
}

#[test]
fn test_executor_can_run_again() {
    let (mut executor, _pool, _observer) = inline_executor();
    let a = counter();
    let b = counter();
    executor.register("a", [], bump(&a)).register("b", ["a"], bump(&b));

    executor.run().unwrap();
    executor.run().unwrap();

    assert_eq!(count(&a), 2);
    assert_eq!(count(&b), 2);
}

#[test]
fn test_registration_between_runs_is_picked_up() {
    let (mut executor, _pool, _observer) = inline_executor();
    executor.register("a", [], || Ok(()));
    assert_eq!(executor.run().unwrap().len(), 1);

    executor.register("b", ["a"], || Ok(()));
    let report = executor.run().unwrap();
    assert_eq!(report.completed(), &["a", "b"]);
}

#[test]
fn test_default_constructor_with_owned_keys() {
    init_tracing();
    let config = ExecutorConfig::default().with_workers(2);
    let mut executor: TaskExecutor<String> = TaskExecutor::new(config).unwrap();

    executor
        .register("fetch".to_string(), [], || Ok(()))
        .register("build".to_string(), ["fetch".to_string()], || Ok(()))
        .register("test".to_string(), ["build".to_string()], || Ok(()));

    let report = run_with_deadline(TEST_DEADLINE, move || executor.run())
        .expect("run did not finish in time")
        .unwrap();

    assert_eq!(
        report.into_completed(),
        vec!["fetch".to_string(), "build".to_string(), "test".to_string()]
    );
}

#[test]
fn test_zero_workers_is_rejected() {
    let config = ExecutorConfig::default().with_workers(0);
    assert!(TaskExecutor::<&str>::new(config).is_err());
}
