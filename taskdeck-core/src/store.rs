//! TaskStore: the authoritative task collection.
//!
//! Keeps tasks in insertion order, serialises writes behind one lock, and
//! optionally mirrors every successful write to a JSON file. Each completed
//! write publishes a fresh snapshot to live subscribers; a failed write
//! publishes nothing and leaves both memory and file untouched.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Result, TaskError};
use crate::live::{Snapshot, StatsSubscription, TaskSubscription};
use crate::stats::Stats;
use crate::task::{NewTask, Task, TaskId, TaskPatch};

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub struct TaskStore {
    tasks: Mutex<Vec<Task>>,
    path: Option<PathBuf>,
    clock: Clock,
    tx: watch::Sender<Snapshot>,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("path", &self.path)
            .field("len", &self.tasks.lock().len())
            .finish()
    }
}

impl TaskStore {
    pub fn in_memory() -> Self {
        Self::from_tasks(Vec::new(), None)
    }

    /// Opens the store file at `path`. A missing file is an empty store; the
    /// file is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tasks = if path.exists() {
            load(&path)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), tasks = tasks.len(), "opened task store");
        Ok(Self::from_tasks(tasks, Some(path)))
    }

    /// Seeds an in-memory store. Ids must be unique.
    pub fn with_tasks(tasks: Vec<Task>) -> Result<Self> {
        check_unique_ids(&tasks)?;
        Ok(Self::from_tasks(tasks, None))
    }

    /// Replaces the wall clock used to stamp `order` on new tasks.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn from_tasks(tasks: Vec<Task>, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::from(tasks.clone()));
        Self {
            tasks: Mutex::new(tasks),
            path,
            clock: Arc::new(|| Utc::now().timestamp_millis()),
            tx,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Every task, in insertion order.
    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.lock().iter().find(|t| &t.id == id).cloned()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks.lock())
    }

    pub fn subscribe(&self) -> TaskSubscription {
        TaskSubscription::new(self.tx.subscribe())
    }

    pub fn subscribe_stats(&self) -> StatsSubscription {
        StatsSubscription::new(self.subscribe())
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Inserts a new open task and returns its id.
    pub fn create(&self, new: NewTask) -> Result<TaskId> {
        new.validate()?;
        let task = Task {
            id: TaskId::generate(),
            text: new.text,
            description: None,
            project: new.project,
            priority: new.priority,
            is_completed: false,
            deadline: new.deadline,
            order: Some(self.now()),
        };
        let id = task.id.clone();
        self.write(|tasks| {
            tasks.push(task);
            Ok(())
        })?;
        info!(task = %id, "created task");
        Ok(id)
    }

    /// Merges `patch` into the task. Unspecified fields are left alone.
    pub fn patch(&self, id: &TaskId, patch: TaskPatch) -> Result<()> {
        patch.validate()?;
        self.write(|tasks| {
            let slot = find_mut(tasks, id)?;
            *slot = patch.apply_to(slot);
            Ok(())
        })?;
        debug!(task = %id, ?patch, "patched task");
        Ok(())
    }

    /// Sets completion; the derived status follows in the same write.
    pub fn set_completion(&self, id: &TaskId, is_completed: bool) -> Result<()> {
        self.write(|tasks| {
            let slot = find_mut(tasks, id)?;
            slot.is_completed = is_completed;
            Ok(())
        })?;
        debug!(task = %id, is_completed, "set completion");
        Ok(())
    }

    /// Removes the task. Deleting the same id twice fails the second time.
    pub fn delete(&self, id: &TaskId) -> Result<()> {
        self.write(|tasks| {
            let pos = tasks
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| TaskError::NotFound(id.clone()))?;
            tasks.remove(pos);
            Ok(())
        })?;
        info!(task = %id, "deleted task");
        Ok(())
    }

    /// Applies `f` to a copy of the task list; commits, persists and
    /// publishes only if `f` and the file write both succeed.
    fn write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<()>,
    {
        let mut guard = self.tasks.lock();
        let mut next = guard.clone();
        f(&mut next)?;
        if let Some(path) = &self.path {
            persist(path, &next)?;
        }
        *guard = next;
        self.tx.send_replace(Snapshot::from(guard.clone()));
        Ok(())
    }
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))
}

fn check_unique_ids(tasks: &[Task]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for t in tasks {
        if !seen.insert(&t.id) {
            return Err(TaskError::validation(format!("duplicate task id {}", t.id)));
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Vec<Task>> {
    let raw = fs::read_to_string(path).map_err(|source| TaskError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tasks: Vec<Task> = serde_json::from_str(&raw)?;
    check_unique_ids(&tasks)?;
    Ok(tasks)
}

fn persist(path: &Path, tasks: &[Task]) -> Result<()> {
    let io_err = |source: std::io::Error| TaskError::Persistence {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(tasks)?;
    // write-then-rename
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
