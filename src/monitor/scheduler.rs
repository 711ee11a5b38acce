//! Task scheduler
//!
//! A priority queue of `(next due time, task)` pairs. The loop sleeps until
//! the earliest task is due (capped at the poll interval so wall-clock jumps
//! are noticed), runs it to completion, and re-queues it at its next
//! occurrence. Tasks never overlap. A `watch` channel carrying `true` stops
//! the loop between tasks.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime};
use tokio::sync::watch;

/// When a task runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval, first run one interval after start
    Every(Duration),
    /// Once a day at a local wall-clock time
    DailyAt(NaiveTime),
}

impl Schedule {
    /// First occurrence strictly after `now`
    pub fn next_after(&self, now: DateTime<Local>) -> DateTime<Local> {
        let one_day = chrono::Duration::days(1);
        match self {
            Schedule::Every(interval) => chrono::Duration::from_std(*interval)
                .ok()
                .and_then(|step| now.checked_add_signed(step))
                .unwrap_or(now + one_day),
            Schedule::DailyAt(at) => (0..=2)
                .filter_map(|offset| now.date_naive().checked_add_days(Days::new(offset)))
                .filter_map(|date| date.and_time(*at).and_local_timezone(Local).earliest())
                .find(|candidate| *candidate > now)
                .unwrap_or(now + one_day),
        }
    }
}

type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type TaskFn = Box<dyn Fn() -> TaskFuture + Send + Sync>;

struct ScheduledTask {
    name: &'static str,
    schedule: Schedule,
    run: TaskFn,
}

/// Runs registered tasks at their scheduled times until shut down
pub struct Scheduler {
    poll_interval: Duration,
    tasks: Vec<ScheduledTask>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tasks: Vec<(&str, Schedule)> = self.tasks.iter().map(|t| (t.name, t.schedule)).collect();
        f.debug_struct("Scheduler").field("poll_interval", &self.poll_interval).field("tasks", &tasks).finish()
    }
}

impl Scheduler {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval, tasks: Vec::new() }
    }

    /// Register a task
    pub fn task<F, Fut>(mut self, name: &'static str, schedule: Schedule, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(ScheduledTask { name, schedule, run: Box::new(move || Box::pin(f())) });
        self
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name).collect()
    }

    /// Run until `shutdown` becomes `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut queue = BinaryHeap::new();
        let start = Local::now();
        for (idx, task) in self.tasks.iter().enumerate() {
            let due = task.schedule.next_after(start);
            tracing::info!(task = task.name, next_run = %due, "Task scheduled");
            queue.push(Reverse((due, idx)));
        }

        while let Some(&Reverse((due, idx))) = queue.peek() {
            if *shutdown.borrow() {
                break;
            }
            let wait = (due - Local::now()).to_std().unwrap_or(Duration::ZERO);
            if !wait.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(wait.min(self.poll_interval)) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                continue;
            }

            queue.pop();
            let task = &self.tasks[idx];
            tracing::info!(task = task.name, "Running scheduled task");
            (task.run)().await;
            let next = task.schedule.next_after(Local::now());
            tracing::debug!(task = task.name, next_run = %next, "Task rescheduled");
            queue.push(Reverse((next, idx)));
        }
        tracing::info!("Scheduler stopped");
    }
}

/// A shutdown channel that flips to `true` on Ctrl-C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Interrupt received, shutting down");
        let _ = tx.send(true);
    });
    rx
}
