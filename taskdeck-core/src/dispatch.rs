//! Mutation dispatch: fire-and-forget writes against the task store.
//!
//! Callers never see a write's result. The UI refreshes only when the live
//! query delivers the next snapshot; until then it keeps showing the old
//! data. Failed writes are logged and reported as [`Notice`]s so they can be
//! shown to the user. Nothing is retried or rolled back.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::deadline::Extension;
use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{NewTask, Priority, Task, TaskId, TaskPatch};

/// One user action, mapped to exactly one store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(NewTask),
    Update { id: TaskId, patch: TaskPatch },
    SetCompletion { id: TaskId, completed: bool },
    Delete { id: TaskId },
}

impl Mutation {
    pub fn reprioritize(id: TaskId, priority: Priority) -> Self {
        Mutation::Update {
            id,
            patch: TaskPatch::priority(priority),
        }
    }

    pub fn complete(id: TaskId) -> Self {
        Mutation::SetCompletion {
            id,
            completed: true,
        }
    }

    pub fn extend_deadline(task: &Task, extension: Extension, now_ms: i64) -> Self {
        Mutation::Update {
            id: task.id().clone(),
            patch: TaskPatch::deadline(extension.extend(task.deadline(), now_ms)),
        }
    }

    pub fn apply(self, store: &TaskStore) -> Result<()> {
        match self {
            Mutation::Create(new) => store.create(new).map(|_| ()),
            Mutation::Update { id, patch } => store.patch(&id, patch),
            Mutation::SetCompletion { id, completed } => store.set_completion(&id, completed),
            Mutation::Delete { id } => store.delete(&id),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create(new) => write!(f, "create '{}'", new.text),
            Mutation::Update { id, .. } => write!(f, "update {id}"),
            Mutation::SetCompletion { id, completed: true } => write!(f, "complete {id}"),
            Mutation::SetCompletion { id, completed: false } => write!(f, "reopen {id}"),
            Mutation::Delete { id } => write!(f, "delete {id}"),
        }
    }
}

/// A failed write, for the UI banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// Cheap handle for issuing writes. Clone freely.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Mutation>,
}

impl Dispatcher {
    /// Starts the write worker on the current tokio runtime. The returned
    /// receiver yields a [`Notice`] per failed write and can be drained from
    /// synchronous code.
    pub fn spawn(store: Arc<TaskStore>) -> (Self, std::sync::mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = std::sync::mpsc::channel();
        tokio::spawn(run_worker(rx, store, notice_tx));
        (Self { tx }, notice_rx)
    }

    /// Queues `mutation` and returns immediately.
    pub fn dispatch(&self, mutation: Mutation) {
        if let Err(e) = self.tx.send(mutation) {
            warn!(mutation = %e.0, "write worker is gone; dropping mutation");
        }
    }
}

/// Applies mutations in arrival order until every [`Dispatcher`] is dropped.
async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Mutation>,
    store: Arc<TaskStore>,
    notices: std::sync::mpsc::Sender<Notice>,
) {
    while let Some(mutation) = rx.recv().await {
        let what = mutation.to_string();
        let store = store.clone();
        let res = tokio::task::spawn_blocking(move || mutation.apply(&store)).await;

        let message = match res {
            Ok(Ok(())) => {
                debug!(mutation = %what, "write applied");
                continue;
            }
            Ok(Err(e)) => {
                warn!(mutation = %what, error = %e, "write failed");
                format!("Could not {what}: {e}")
            }
            Err(e) => {
                warn!(mutation = %what, error = %e, "write task aborted");
                format!("Could not {what}: {e}")
            }
        };
        let _ = notices.send(Notice { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::deadline::DAY_MS;
    use crate::task::ProjectId;

    #[test]
    fn each_mutation_is_one_write() {
        let store = TaskStore::in_memory();
        Mutation::Create(NewTask::new("a", ProjectId::Skool, Priority::Low))
            .apply(&store)
            .unwrap();
        let id = store.list_all()[0].id().clone();

        Mutation::reprioritize(id.clone(), Priority::High).apply(&store).unwrap();
        Mutation::complete(id.clone()).apply(&store).unwrap();
        let t = store.get(&id).unwrap();
        assert_eq!(t.priority(), Priority::High);
        assert!(t.is_completed());

        Mutation::Delete { id: id.clone() }.apply(&store).unwrap();
        assert!(Mutation::Delete { id }.apply(&store).unwrap_err().is_not_found());
    }

    #[test]
    fn extend_without_deadline_starts_from_now() {
        let t = Task::new("x", "x", ProjectId::Personal, Priority::Low);
        match Mutation::extend_deadline(&t, Extension::Day, 1_000) {
            Mutation::Update { patch, .. } => assert_eq!(patch.deadline, Some(1_000 + DAY_MS)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn worker_applies_and_subscribers_see_it() {
        let store = Arc::new(TaskStore::in_memory());
        let mut sub = store.subscribe();
        let (dispatcher, _notices) = Dispatcher::spawn(store.clone());

        dispatcher.dispatch(Mutation::Create(NewTask::new(
            "from the worker",
            ProjectId::Skool,
            Priority::Medium,
        )));

        let snapshot = tokio::time::timeout(Duration::from_secs(2), sub.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text(), "from the worker");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_write_becomes_a_notice() {
        let store = Arc::new(TaskStore::in_memory());
        let (dispatcher, notices) = Dispatcher::spawn(store.clone());

        dispatcher.dispatch(Mutation::Delete {
            id: TaskId::new("ghost"),
        });

        let notice = tokio::task::spawn_blocking(move || notices.recv_timeout(Duration::from_secs(2)))
            .await
            .unwrap()
            .unwrap();
        assert!(notice.message.contains("delete ghost"));
        assert!(notice.message.contains("not found"));
        assert!(store.list_all().is_empty());
    }
}
