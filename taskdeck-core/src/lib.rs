//! taskdeck-core: task store, live queries and the kanban board logic.

pub mod auth;
pub mod board;
pub mod collision;
pub mod deadline;
pub mod dispatch;
pub mod drag;
pub mod error;
pub mod live;
pub mod stats;
pub mod store;
pub mod task;

pub use auth::{
    AuthFlagStore, AuthGate, AuthState, CredentialCheck, LoginError, MemoryFlagStore,
    PasscodeCheck, AUTH_KEY, AUTH_VALUE,
};
pub use board::Board;
pub use collision::{closest_corners, DropTarget, Point, Rect, Region};
pub use deadline::{format_deadline, DueIn, Extension};
pub use dispatch::{Dispatcher, Mutation, Notice};
pub use drag::{resolve_drop, DragController, DragEnd, DragState};
pub use error::TaskError;
pub use live::{Snapshot, StatsSubscription, TaskSubscription};
pub use stats::Stats;
pub use store::TaskStore;
pub use task::{NewTask, Priority, ProjectId, Status, Task, TaskId, TaskPatch, TaskRecord};
