//! Task model: the one record the board, dashboard and store agree on.
//!
//! Completion is held once, as `is_completed`. The `Todo`/`Done` status that
//! the wire format also carries is derived from it on the way out and checked
//! against it on the way in, so the two can never drift apart inside the
//! process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Store-assigned identifier. Opaque to everything but the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of projects a task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectId {
    #[serde(rename = "System Pros Ai")]
    SystemProsAi,
    Skool,
    #[serde(rename = "Social Media")]
    SocialMedia,
    Personal,
}

impl ProjectId {
    pub const ALL: [ProjectId; 4] = [
        ProjectId::SystemProsAi,
        ProjectId::Skool,
        ProjectId::SocialMedia,
        ProjectId::Personal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectId::SystemProsAi => "System Pros Ai",
            ProjectId::Skool => "Skool",
            ProjectId::SocialMedia => "Social Media",
            ProjectId::Personal => "Personal",
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectId {
    type Err = TaskError;

    /// Accepts the project labels, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ProjectId::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskError::validation(format!("unknown project '{s}'")))
    }
}

/// Column a task lives in on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Board column order, left to right.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Next priority in column order, wrapping around. Used by the edit dialog.
    pub fn cycle(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskError::validation(format!("unknown priority '{s}'")))
    }
}

/// Wire-level lifecycle label. Always derived from `is_completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Todo,
    Done,
}

impl Status {
    pub fn from_completed(is_completed: bool) -> Self {
        if is_completed { Status::Done } else { Status::Todo }
    }
}

/// A stored task. Immutable once built; the store replaces records wholesale
/// when it applies a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) text: String,
    pub(crate) description: Option<String>,
    pub(crate) project: ProjectId,
    pub(crate) priority: Priority,
    pub(crate) is_completed: bool,
    /// Milliseconds since the Unix epoch.
    pub(crate) deadline: Option<i64>,
    pub(crate) order: Option<i64>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        project: ProjectId,
        priority: Priority,
    ) -> Self {
        Self {
            id: TaskId::new(id),
            text: text.into(),
            description: None,
            project,
            priority,
            is_completed: false,
            deadline: None,
            order: None,
        }
    }

    pub fn with_deadline(mut self, deadline_ms: i64) -> Self {
        self.deadline = Some(deadline_ms);
        self
    }

    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn status(&self) -> Status {
        Status::from_completed(self.is_completed)
    }

    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    pub fn order(&self) -> Option<i64> {
        self.order
    }
}

/// Persisted shape of a task. Field names match the document store's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskRecord {
    pub id: TaskId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub priority: Priority,
    pub status: Status,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskError;

    fn try_from(r: TaskRecord) -> Result<Self, Self::Error> {
        if r.text.trim().is_empty() {
            return Err(TaskError::validation(format!("task {} has empty text", r.id)));
        }
        if r.status != Status::from_completed(r.is_completed) {
            return Err(TaskError::validation(format!(
                "task {}: status {:?} disagrees with isCompleted={}",
                r.id, r.status, r.is_completed
            )));
        }
        Ok(Task {
            id: r.id,
            text: r.text,
            description: r.description,
            project: r.project_id,
            priority: r.priority,
            is_completed: r.is_completed,
            deadline: r.deadline,
            order: r.order,
        })
    }
}

impl From<Task> for TaskRecord {
    fn from(t: Task) -> Self {
        TaskRecord {
            status: t.status(),
            id: t.id,
            text: t.text,
            description: t.description,
            project_id: t.project,
            priority: t.priority,
            is_completed: t.is_completed,
            deadline: t.deadline,
            order: t.order,
        }
    }
}

/// Arguments for `TaskStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub project: ProjectId,
    pub priority: Priority,
    pub deadline: Option<i64>,
}

impl NewTask {
    pub fn new(text: impl Into<String>, project: ProjectId, priority: Priority) -> Self {
        Self {
            text: text.into(),
            project,
            priority,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline_ms: i64) -> Self {
        self.deadline = Some(deadline_ms);
        self
    }

    pub fn validate(&self) -> Result<(), TaskError> {
        if self.text.trim().is_empty() {
            return Err(TaskError::validation("task text must not be empty"));
        }
        Ok(())
    }
}

/// Partial update. Fields left `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<i64>,
}

impl TaskPatch {
    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn deadline(deadline_ms: i64) -> Self {
        Self {
            deadline: Some(deadline_ms),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none() && self.deadline.is_none()
    }

    pub fn validate(&self) -> Result<(), TaskError> {
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(TaskError::validation("task text must not be empty"));
            }
        }
        Ok(())
    }

    pub(crate) fn apply_to(&self, task: &Task) -> Task {
        let mut next = task.clone();
        if let Some(text) = &self.text {
            next.text = text.clone();
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            next.deadline = Some(deadline);
        }
        next
    }
}
