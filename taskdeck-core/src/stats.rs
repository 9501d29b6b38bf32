//! Dashboard aggregation over the full task list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::task::{Priority, ProjectId, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Open tasks with `High` priority.
    pub high_priority: usize,
    /// Open tasks per project. Every project is present, zero-filled.
    pub by_project: BTreeMap<ProjectId, usize>,
    /// Whole percent, 0 for an empty store.
    pub completion_rate: u32,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        let high_priority = tasks
            .iter()
            .filter(|t| t.priority() == Priority::High && !t.is_completed())
            .count();

        let mut by_project: BTreeMap<ProjectId, usize> =
            ProjectId::ALL.into_iter().map(|p| (p, 0)).collect();
        for t in tasks.iter().filter(|t| !t.is_completed()) {
            *by_project.entry(t.project()).or_default() += 1;
        }

        Self {
            total,
            completed,
            pending: total - completed,
            high_priority,
            by_project,
            completion_rate: completion_rate(completed, total),
        }
    }

    pub fn open_in(&self, project: ProjectId) -> usize {
        self.by_project.get(&project).copied().unwrap_or(0)
    }
}

/// `round(100 * completed / total)` with halves rounding up, in integers.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * completed + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, project: ProjectId, priority: Priority, done: bool) -> Task {
        Task::new(id, id, project, priority).with_completed(done)
    }

    #[test]
    fn empty_store_has_zero_rate() {
        let s = Stats::from_tasks(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.completion_rate, 0);
        assert_eq!(s.by_project.len(), 4);
        assert!(s.by_project.values().all(|&n| n == 0));
    }

    #[test]
    fn rate_rounds_like_math_round() {
        assert_eq!(completion_rate(3, 7), 43);
        assert_eq!(completion_rate(1, 8), 13); // 12.5 rounds up
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(5, 5), 100);
    }

    #[test]
    fn counts_only_open_tasks_per_project_and_priority() {
        let tasks = vec![
            task("a", ProjectId::Skool, Priority::High, false),
            task("b", ProjectId::Skool, Priority::High, true),
            task("c", ProjectId::Personal, Priority::Low, false),
            task("d", ProjectId::SocialMedia, Priority::Medium, true),
        ];
        let s = Stats::from_tasks(&tasks);
        assert_eq!(s.total, 4);
        assert_eq!(s.completed, 2);
        assert_eq!(s.pending, s.total - s.completed);
        assert_eq!(s.high_priority, 1);
        assert_eq!(s.open_in(ProjectId::Skool), 1);
        assert_eq!(s.open_in(ProjectId::Personal), 1);
        assert_eq!(s.open_in(ProjectId::SocialMedia), 0);
        assert_eq!(s.completion_rate, 50);
    }
}
