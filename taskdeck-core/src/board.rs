//! Board projection: one project's open tasks split into priority columns.

use crate::task::{Priority, ProjectId, Task, TaskId};

/// Three columns derived from a task snapshot. Rebuilt on every delivery;
/// never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    high: Vec<Task>,
    medium: Vec<Task>,
    low: Vec<Task>,
}

impl Board {
    /// Filters to `project`'s open tasks and partitions by priority, keeping
    /// the snapshot's order within each column.
    pub fn project(tasks: &[Task], project: ProjectId) -> Self {
        let mut board = Board::default();
        for t in tasks
            .iter()
            .filter(|t| t.project() == project && !t.is_completed())
        {
            board.column_mut(t.priority()).push(t.clone());
        }
        board
    }

    pub fn column(&self, priority: Priority) -> &[Task] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    fn column_mut(&mut self, priority: Priority) -> &mut Vec<Task> {
        match priority {
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }

    /// Columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = (Priority, &[Task])> {
        Priority::ALL.into_iter().map(move |p| (p, self.column(p)))
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.columns()
            .flat_map(|(_, tasks)| tasks.iter())
            .find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
