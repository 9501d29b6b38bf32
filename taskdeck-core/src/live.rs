//! Live queries: push channels that re-deliver the full result after every
//! store write.
//!
//! Deliveries are whole snapshots. Consumers replace what they hold with
//! each one; there is nothing to merge. Built on `tokio::sync::watch`, so a
//! slow consumer only ever sees the latest snapshot, never a backlog.

use std::sync::Arc;

use tokio::sync::watch;

use crate::stats::Stats;
use crate::task::Task;

/// One full task list as of a completed write.
pub type Snapshot = Arc<[Task]>;

/// Subscription to "list all tasks".
#[derive(Debug, Clone)]
pub struct TaskSubscription {
    rx: watch::Receiver<Snapshot>,
}

impl TaskSubscription {
    pub(crate) fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// Latest snapshot, without marking it as seen.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Returns a snapshot only if a write landed since the last observation.
    /// Never blocks; meant for frame-driven loops.
    pub fn poll_update(&mut self) -> Option<Snapshot> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Waits for the next delivery. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Subscription to the dashboard aggregation. Recomputed per delivery.
#[derive(Debug, Clone)]
pub struct StatsSubscription {
    inner: TaskSubscription,
}

impl StatsSubscription {
    pub(crate) fn new(inner: TaskSubscription) -> Self {
        Self { inner }
    }

    pub fn current(&self) -> Stats {
        Stats::from_tasks(&self.inner.current())
    }

    pub fn poll_update(&mut self) -> Option<Stats> {
        self.inner.poll_update().map(|s| Stats::from_tasks(&s))
    }

    pub async fn changed(&mut self) -> Option<Stats> {
        self.inner.changed().await.map(|s| Stats::from_tasks(&s))
    }
}
