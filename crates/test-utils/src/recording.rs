use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use rundag::engine::RunObserver;
use rundag::types::TaskKey;

/// One observed lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Registered(T),
    Scheduled(T),
    Deferred { task: T, waiting_on: T },
    Started(T),
    Completed(T),
    Failed { task: T, message: String, first: bool },
    RunFinished { completed: usize, failed: bool },
}

/// Observer that records every event in a single ordered log.
///
/// Events from different worker threads are appended under one mutex, so
/// the log order is consistent with happens-before between threads: a
/// `Completed(dep)` is always logged before the `Started(task)` of a task
/// that was submitted because of it.
#[derive(Debug, Default)]
pub struct RecordingObserver<T> {
    events: Mutex<Vec<Event<T>>>,
}

impl<T: TaskKey> RecordingObserver<T> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, event: Event<T>) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event<T>> {
        self.events.lock().unwrap().clone()
    }

    fn position(&self, wanted: &Event<T>) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == wanted)
    }

    pub fn started_at(&self, task: &T) -> Option<usize> {
        self.position(&Event::Started(task.clone()))
    }

    pub fn completed_at(&self, task: &T) -> Option<usize> {
        self.position(&Event::Completed(task.clone()))
    }

    pub fn has_completed(&self, task: &T) -> bool {
        self.completed_at(task).is_some()
    }

    pub fn started(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Completed(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn scheduled_count(&self, task: &T) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Scheduled(t) if t == task))
            .count()
    }

    /// `(task, message, first)` for every reported failure.
    pub fn failures(&self) -> Vec<(T, String, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Failed {
                    task,
                    message,
                    first,
                } => Some((task, message, first)),
                _ => None,
            })
            .collect()
    }

    /// Poll until `pred` holds for the event log or `timeout` elapses.
    pub fn wait_until<F>(&self, timeout: Duration, pred: F) -> bool
    where
        F: Fn(&[Event<T>]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if pred(&self.events.lock().unwrap()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl<T: TaskKey> RunObserver<T> for RecordingObserver<T> {
    fn registered(&self, task: &T, _depends_on: &[T]) {
        self.push(Event::Registered(task.clone()));
    }

    fn scheduled(&self, task: &T) {
        self.push(Event::Scheduled(task.clone()));
    }

    fn deferred(&self, task: &T, waiting_on: &T) {
        self.push(Event::Deferred {
            task: task.clone(),
            waiting_on: waiting_on.clone(),
        });
    }

    fn started(&self, task: &T) {
        self.push(Event::Started(task.clone()));
    }

    fn completed(&self, task: &T) {
        self.push(Event::Completed(task.clone()));
    }

    fn failed(&self, task: &T, error: &anyhow::Error, first: bool) {
        self.push(Event::Failed {
            task: task.clone(),
            message: error.to_string(),
            first,
        });
    }

    fn run_finished(&self, completed: usize, failed: bool, _elapsed: Duration) {
        self.push(Event::RunFinished { completed, failed });
    }
}
