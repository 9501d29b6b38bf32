use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use taskdeck_core::{
    Board, Dispatcher, DragController, DragEnd, DueIn, Mutation, NewTask, Point, Priority,
    ProjectId, Rect, Region, Status, Task, TaskId, TaskPatch, TaskStore,
};

fn seeded() -> TaskStore {
    TaskStore::with_tasks(vec![
        Task::new("A", "plan launch", ProjectId::Skool, Priority::High),
        Task::new("B", "record lesson", ProjectId::Skool, Priority::Medium),
        Task::new("C", "post reel", ProjectId::SocialMedia, Priority::High),
    ])
    .unwrap()
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id().as_str()).collect()
}

/// Lays the board out as three 30-wide columns with 4-high cards stacked
/// from the top, the way the terminal UI does.
fn layout(board: &Board) -> Vec<Region> {
    let mut regions = Vec::new();
    for (i, (priority, tasks)) in board.columns().enumerate() {
        let x = i as f32 * 30.0;
        regions.push(Region::column(priority, Rect::new(x, 0.0, 30.0, 40.0)));
        for (j, t) in tasks.iter().enumerate() {
            regions.push(Region::card(
                t.id().clone(),
                Rect::new(x + 1.0, 1.0 + j as f32 * 4.0, 28.0, 4.0),
            ));
        }
    }
    regions
}

#[test]
fn projection_scenario_excludes_other_projects() {
    let store = seeded();
    let board = Board::project(&store.subscribe().current(), ProjectId::Skool);
    assert_eq!(ids(board.column(Priority::High)), vec!["A"]);
    assert_eq!(ids(board.column(Priority::Medium)), vec!["B"]);
    assert!(board.column(Priority::Low).is_empty());
    assert!(board.find(&TaskId::new("C")).is_none());
}

#[test]
fn drag_round_trip_moves_card_after_next_delivery() {
    let store = seeded();
    let mut sub = store.subscribe();
    let board = Board::project(&sub.current(), ProjectId::Skool);
    let regions = layout(&board);

    // Drag B (Medium, column 2) into the empty Low column.
    let mut drag = DragController::new(2.0);
    let b_card = Rect::new(31.0, 1.0, 28.0, 4.0);
    drag.pointer_down(TaskId::new("B"), Point::new(40.0, 2.0), b_card);
    drag.pointer_move(Point::new(55.0, 10.0), &regions);
    let end = drag.pointer_up(Point::new(70.0, 20.0), &regions, &board);
    assert_eq!(
        end,
        DragEnd::Reprioritize {
            id: TaskId::new("B"),
            priority: Priority::Low
        }
    );

    // Before the write the UI still holds the stale board.
    assert_eq!(ids(board.column(Priority::Medium)), vec!["B"]);

    end.mutation().unwrap().apply(&store).unwrap();
    let next = Board::project(&sub.poll_update().unwrap(), ProjectId::Skool);
    assert!(next.column(Priority::Medium).is_empty());
    assert_eq!(ids(next.column(Priority::Low)), vec!["B"]);

    let b = store.get(&TaskId::new("B")).unwrap();
    assert_eq!(b.text(), "record lesson");
    assert_eq!(b.deadline(), None);
}

#[test]
fn drop_on_own_column_writes_nothing() {
    let store = seeded();
    let mut sub = store.subscribe();
    let board = Board::project(&sub.current(), ProjectId::Skool);
    let regions = layout(&board);

    let mut drag = DragController::new(2.0);
    drag.pointer_down(TaskId::new("A"), Point::new(10.0, 2.0), Rect::new(1.0, 1.0, 28.0, 4.0));
    drag.pointer_move(Point::new(10.0, 20.0), &regions);
    let end = drag.pointer_up(Point::new(12.0, 25.0), &regions, &board);
    assert_eq!(end, DragEnd::NoChange);
    assert!(end.mutation().is_none());
    assert!(sub.poll_update().is_none());
}

#[test]
fn status_and_completion_stay_in_lockstep() {
    let store = TaskStore::in_memory();
    let a = store.create(NewTask::new("a", ProjectId::Personal, Priority::Low)).unwrap();
    let b = store.create(NewTask::new("b", ProjectId::Personal, Priority::High)).unwrap();

    let steps = vec![
        Mutation::complete(a.clone()),
        Mutation::Update {
            id: a.clone(),
            patch: TaskPatch::text("a, renamed"),
        },
        Mutation::SetCompletion {
            id: a.clone(),
            completed: false,
        },
        Mutation::complete(b.clone()),
        Mutation::reprioritize(b.clone(), Priority::Medium),
    ];
    for m in steps {
        m.apply(&store).unwrap();
        for t in store.list_all() {
            assert_eq!(t.status() == Status::Done, t.is_completed());
            let v = serde_json::to_value(&t).unwrap();
            assert_eq!(v["status"] == "Done", v["isCompleted"] == true);
        }
        let s = store.stats();
        assert_eq!(s.pending, s.total - s.completed);
    }
}

#[test]
fn one_day_deadline_is_a_day_from_creation() {
    let store = TaskStore::in_memory();
    let before = Utc::now().timestamp_millis();
    let deadline = DueIn::OneDay.deadline_from(store.now());
    let id = store
        .create(NewTask::new("renew domain", ProjectId::Personal, Priority::Medium).with_deadline(deadline))
        .unwrap();
    let after = Utc::now().timestamp_millis();

    let t = store.get(&id).unwrap();
    let created = t.order().unwrap();
    assert!(created >= before && created <= after);
    let drift = (t.deadline().unwrap() - (created + 86_400_000)).abs();
    assert!(drift < 1_000, "deadline drifted {drift}ms");
}

#[test]
fn three_of_seven_completed_rounds_to_43_percent() {
    let mut tasks = Vec::new();
    for i in 0..7 {
        tasks.push(
            Task::new(format!("t{i}"), "x", ProjectId::Skool, Priority::Low).with_completed(i < 3),
        );
    }
    let store = TaskStore::with_tasks(tasks).unwrap();
    let stats = store.subscribe_stats().current();
    assert_eq!(stats.total, 7);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.completion_rate, 43);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispatched_drop_reaches_subscribers() {
    let store = Arc::new(seeded());
    let mut sub = store.subscribe();
    let (dispatcher, notices) = Dispatcher::spawn(store.clone());

    dispatcher.dispatch(Mutation::reprioritize(TaskId::new("A"), Priority::Low));
    dispatcher.dispatch(Mutation::Delete {
        id: TaskId::new("missing"),
    });

    let snapshot = tokio::time::timeout(Duration::from_secs(2), sub.changed())
        .await
        .unwrap()
        .unwrap();
    let board = Board::project(&snapshot, ProjectId::Skool);
    assert_eq!(ids(board.column(Priority::Low)), vec!["A"]);

    let notice = tokio::task::spawn_blocking(move || notices.recv_timeout(Duration::from_secs(2)))
        .await
        .unwrap()
        .unwrap();
    assert!(notice.message.contains("missing"));
    assert_eq!(store.list_all().len(), 3);
}
