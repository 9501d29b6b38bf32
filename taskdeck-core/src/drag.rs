//! Drag interaction controller.
//!
//! `Idle -> Armed -> Dragging -> Idle`. A press on a card arms the controller;
//! the gesture only becomes a drag once the pointer has travelled the
//! activation distance, so a plain click is never read as a drag. Releasing
//! always returns to `Idle` and yields a [`DragEnd`] describing what, if
//! anything, should be written.
//!
//! A drop only ever reassigns priority. Nothing here reorders tasks inside a
//! column; where a card ends up is decided by re-projecting the next store
//! snapshot.

use tracing::debug;

use crate::board::Board;
use crate::collision::{closest_corners, DropTarget, Point, Rect, Region};
use crate::dispatch::Mutation;
use crate::task::{Priority, TaskId};

/// Pointer travel needed before a press turns into a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer is down on a card but has not moved far enough yet.
    Armed {
        task: TaskId,
        origin: Point,
        card: Rect,
    },
    Dragging(ActiveDrag),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub task: TaskId,
    pub origin: Point,
    /// Where the card sat when the press started.
    pub card: Rect,
    /// The card's rectangle following the pointer.
    pub overlay: Rect,
    /// Current collision result, refreshed on every move.
    pub over: Option<DropTarget>,
}

impl ActiveDrag {
    fn track(&mut self, at: Point, regions: &[Region]) {
        self.overlay = self.card.translate(at.x - self.origin.x, at.y - self.origin.y);
        self.over = closest_corners(&self.overlay, regions);
    }
}

/// Outcome of releasing the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEnd {
    /// Released before the activation distance: treat as a click on the card.
    Click(TaskId),
    /// Dropped on another priority: exactly one priority patch is due.
    Reprioritize { id: TaskId, priority: Priority },
    /// Dropped somewhere that resolves to the task's own priority, or the
    /// task vanished from the board mid-drag.
    NoChange,
    /// Released outside every tracked region, or cancelled explicitly.
    Cancelled,
}

impl DragEnd {
    /// The single write this outcome calls for, if any.
    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            DragEnd::Reprioritize { id, priority } => {
                Some(Mutation::reprioritize(id.clone(), *priority))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    activation_distance: f32,
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl DragController {
    pub fn new(activation_distance: f32) -> Self {
        Self {
            activation_distance: activation_distance.max(0.0),
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// Task being dragged. `None` while idle or merely armed.
    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Dragging(d) => Some(&d.task),
            _ => None,
        }
    }

    pub fn overlay(&self) -> Option<Rect> {
        match &self.state {
            DragState::Dragging(d) => Some(d.overlay),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging(d) => d.over.as_ref(),
            _ => None,
        }
    }

    /// Press on a card. Starts a new gesture; anything unfinished (a press
    /// whose release never arrived) is dropped without a write.
    pub fn pointer_down(&mut self, task: TaskId, at: Point, card: Rect) {
        if let DragState::Dragging(stale) = &self.state {
            debug!(task = %stale.task, "unfinished drag discarded");
        }
        self.state = DragState::Armed {
            task,
            origin: at,
            card,
        };
    }

    pub fn pointer_move(&mut self, at: Point, regions: &[Region]) {
        match &mut self.state {
            DragState::Idle => {}
            DragState::Armed { task, origin, card } => {
                // Travel must exceed the threshold, not merely reach it.
                if origin.distance(at) <= self.activation_distance {
                    return;
                }
                let mut drag = ActiveDrag {
                    task: task.clone(),
                    origin: *origin,
                    card: *card,
                    overlay: *card,
                    over: None,
                };
                drag.track(at, regions);
                debug!(task = %drag.task, "drag started");
                self.state = DragState::Dragging(drag);
            }
            DragState::Dragging(drag) => drag.track(at, regions),
        }
    }

    /// Release. Always leaves the controller idle.
    pub fn pointer_up(&mut self, at: Point, regions: &[Region], board: &Board) -> DragEnd {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragEnd::NoChange,
            DragState::Armed { task, .. } => DragEnd::Click(task),
            DragState::Dragging(mut drag) => {
                drag.track(at, regions);
                let Some(over) = drag.over else {
                    debug!(task = %drag.task, "drop outside any region");
                    return DragEnd::Cancelled;
                };
                let end = match resolve_drop(board, &drag.task, &over) {
                    Some(priority) => DragEnd::Reprioritize {
                        id: drag.task,
                        priority,
                    },
                    None => DragEnd::NoChange,
                };
                debug!(?over, ?end, "drop resolved");
                end
            }
        }
    }

    /// Abandons any gesture in progress. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        !matches!(
            std::mem::replace(&mut self.state, DragState::Idle),
            DragState::Idle
        )
    }
}

/// Priority a drop on `over` asks for, or `None` when nothing should change:
/// the dragged task is no longer on the board, the target card is unknown,
/// or the target priority equals the task's current one.
pub fn resolve_drop(board: &Board, active: &TaskId, over: &DropTarget) -> Option<Priority> {
    let task = board.find(active)?;
    let target = match over {
        DropTarget::Column(priority) => *priority,
        DropTarget::Card(id) => board.find(id)?.priority(),
    };
    (target != task.priority()).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ProjectId, Task, TaskPatch};

    fn board() -> Board {
        let tasks = vec![
            Task::new("hi", "urgent", ProjectId::Skool, Priority::High),
            Task::new("lo", "someday", ProjectId::Skool, Priority::Low),
        ];
        Board::project(&tasks, ProjectId::Skool)
    }

    // Three 30x40 columns; card "hi" in High, card "lo" in Low.
    fn regions() -> Vec<Region> {
        vec![
            Region::column(Priority::High, Rect::new(0.0, 0.0, 30.0, 40.0)),
            Region::column(Priority::Medium, Rect::new(30.0, 0.0, 30.0, 40.0)),
            Region::column(Priority::Low, Rect::new(60.0, 0.0, 30.0, 40.0)),
            Region::card(TaskId::new("hi"), Rect::new(1.0, 2.0, 28.0, 4.0)),
            Region::card(TaskId::new("lo"), Rect::new(61.0, 2.0, 28.0, 4.0)),
        ]
    }

    fn lo_card() -> Rect {
        Rect::new(61.0, 2.0, 28.0, 4.0)
    }

    #[test]
    fn short_press_is_a_click() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(72.0, 3.0), &regions());
        assert!(matches!(c.state(), DragState::Armed { .. }));
        assert!(c.active_task().is_none());

        let end = c.pointer_up(Point::new(72.0, 3.0), &regions(), &board());
        assert_eq!(end, DragEnd::Click(TaskId::new("lo")));
        assert!(c.is_idle());
    }

    #[test]
    fn low_dropped_on_high_column_patches_priority_only() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(40.0, 20.0), &regions());
        assert_eq!(c.active_task(), Some(&TaskId::new("lo")));

        let end = c.pointer_up(Point::new(10.0, 30.0), &regions(), &board());
        assert_eq!(
            end,
            DragEnd::Reprioritize {
                id: TaskId::new("lo"),
                priority: Priority::High
            }
        );
        match end.mutation() {
            Some(Mutation::Update { id, patch }) => {
                assert_eq!(id, TaskId::new("lo"));
                assert_eq!(patch, TaskPatch::priority(Priority::High));
            }
            other => panic!("unexpected mutation {other:?}"),
        }
        assert!(c.is_idle());
    }

    #[test]
    fn dropping_on_a_card_takes_that_cards_priority() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        // Move the overlay exactly on top of "hi".
        c.pointer_move(Point::new(10.0, 3.0), &regions());
        assert_eq!(c.over(), Some(&DropTarget::Card(TaskId::new("hi"))));
        let end = c.pointer_up(Point::new(10.0, 3.0), &regions(), &board());
        assert_eq!(
            end,
            DragEnd::Reprioritize {
                id: TaskId::new("lo"),
                priority: Priority::High
            }
        );
    }

    #[test]
    fn drop_in_own_column_is_a_no_op() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(70.0, 25.0), &regions());
        let end = c.pointer_up(Point::new(70.0, 25.0), &regions(), &board());
        assert_eq!(end, DragEnd::NoChange);
        assert!(end.mutation().is_none());
    }

    #[test]
    fn release_outside_cancels() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(70.0, 30.0), &regions());
        let end = c.pointer_up(Point::new(300.0, 300.0), &regions(), &board());
        assert_eq!(end, DragEnd::Cancelled);
        assert!(c.is_idle());
    }

    #[test]
    fn explicit_cancel_discards_the_gesture() {
        let mut c = DragController::default();
        assert!(!c.cancel());
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(10.0, 30.0), &regions());
        assert!(c.cancel());
        assert!(c.is_idle());
        // A late release after cancel writes nothing.
        assert_eq!(
            c.pointer_up(Point::new(10.0, 30.0), &regions(), &board()),
            DragEnd::NoChange
        );
    }

    #[test]
    fn task_gone_from_board_mid_drag_writes_nothing() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(10.0, 30.0), &regions());
        let without_lo = Board::project(
            &[Task::new("hi", "urgent", ProjectId::Skool, Priority::High)],
            ProjectId::Skool,
        );
        let end = c.pointer_up(Point::new(10.0, 30.0), &regions(), &without_lo);
        assert_eq!(end, DragEnd::NoChange);
    }

    #[test]
    fn new_press_restarts_the_gesture() {
        let mut c = DragController::default();
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(50.0, 20.0), &regions());
        assert_eq!(c.active_task(), Some(&TaskId::new("lo")));

        // The release for "lo" never arrived; a plain click on "hi" follows.
        let hi_card = Rect::new(1.0, 2.0, 28.0, 4.0);
        c.pointer_down(TaskId::new("hi"), Point::new(50.0, 20.0), hi_card);
        assert!(matches!(c.state(), DragState::Armed { task, .. } if task.as_str() == "hi"));
        let end = c.pointer_up(Point::new(50.0, 20.0), &regions(), &board());
        assert_eq!(end, DragEnd::Click(TaskId::new("hi")));
        assert!(end.mutation().is_none());
    }

    #[test]
    fn drag_starts_only_past_the_activation_distance() {
        let mut c = DragController::new(8.0);
        c.pointer_down(TaskId::new("lo"), Point::new(70.0, 3.0), lo_card());
        c.pointer_move(Point::new(62.0, 3.0), &regions());
        assert!(matches!(c.state(), DragState::Armed { .. }));

        c.pointer_move(Point::new(61.99, 3.0), &regions());
        assert_eq!(c.active_task(), Some(&TaskId::new("lo")));
    }
}
