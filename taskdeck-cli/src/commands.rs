//! One-shot commands: each performs at most one store write and prints.

use anyhow::{bail, Result};
use taskdeck_core::{
    format_deadline, DueIn, Extension, Mutation, NewTask, Priority, ProjectId, Stats, Task,
    TaskId, TaskPatch, TaskStore,
};

/// Exact id, or a unique prefix of one. Unknown ids pass through so the
/// store reports them as not found.
pub fn resolve_id(store: &TaskStore, raw: &str) -> Result<TaskId> {
    let tasks = store.list_all();
    if let Some(t) = tasks.iter().find(|t| t.id().as_str() == raw) {
        return Ok(t.id().clone());
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id().as_str().starts_with(raw))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id().clone()),
        [] => Ok(TaskId::new(raw)),
        _ => bail!("id prefix '{raw}' matches {} tasks", matches.len()),
    }
}

pub fn add(
    store: &TaskStore,
    text: String,
    project: ProjectId,
    priority: Priority,
    due: Option<DueIn>,
) -> Result<()> {
    let mut new = NewTask::new(text, project, priority);
    if let Some(due) = due {
        new = new.with_deadline(due.deadline_from(store.now()));
    }
    let id = store.create(new)?;
    println!("Created {id}");
    Ok(())
}

pub fn list(store: &TaskStore, project: Option<ProjectId>, all: bool) -> Result<()> {
    let tasks: Vec<Task> = store
        .list_all()
        .into_iter()
        .filter(|t| project.is_none_or(|p| t.project() == p))
        .filter(|t| all || !t.is_completed())
        .collect();

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for t in &tasks {
        println!("{}", task_line(t));
    }
    Ok(())
}

pub fn task_line(t: &Task) -> String {
    format!(
        "{}  [{:<6}] [{:?}] {:<14} {}  ({})",
        short_id(t.id()),
        t.priority(),
        t.status(),
        t.project(),
        t.text(),
        format_deadline(t.deadline())
    )
}

fn short_id(id: &TaskId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

pub fn print_stats(stats: &Stats) {
    println!("# Dashboard\n");
    println!("Pending tasks:    {}", stats.pending);
    println!("Needs attention:  {} (high priority)", stats.high_priority);
    println!("Completed:        {}", stats.completed);
    println!("Completion rate:  {}%", stats.completion_rate);
    println!("\n## Open tasks by project\n");
    for p in ProjectId::ALL {
        println!("- {:<15} {}", p.label(), stats.open_in(p));
    }
}

pub fn reprioritize(store: &TaskStore, id: &str, priority: Priority) -> Result<()> {
    let id = resolve_id(store, id)?;
    Mutation::reprioritize(id.clone(), priority).apply(store)?;
    println!("Moved {id} to {priority}");
    Ok(())
}

pub fn set_completion(store: &TaskStore, id: &str, completed: bool) -> Result<()> {
    let id = resolve_id(store, id)?;
    Mutation::SetCompletion {
        id: id.clone(),
        completed,
    }
    .apply(store)?;
    println!("{} {id}", if completed { "Completed" } else { "Reopened" });
    Ok(())
}

pub fn edit(
    store: &TaskStore,
    id: &str,
    text: Option<String>,
    priority: Option<Priority>,
    extend: Option<Extension>,
) -> Result<()> {
    let id = resolve_id(store, id)?;
    let deadline = match extend {
        Some(ext) => {
            let current = store.get(&id).and_then(|t| t.deadline());
            Some(ext.extend(current, store.now()))
        }
        None => None,
    };
    let patch = TaskPatch {
        text,
        priority,
        deadline,
    };
    if patch.is_empty() {
        bail!("nothing to change (pass --text, --priority or --extend)");
    }
    Mutation::Update {
        id: id.clone(),
        patch,
    }
    .apply(store)?;
    println!("Updated {id}");
    Ok(())
}

pub fn delete(store: &TaskStore, id: &str) -> Result<()> {
    let id = resolve_id(store, id)?;
    Mutation::Delete { id: id.clone() }.apply(store)?;
    println!("Deleted {id}");
    Ok(())
}
