use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Mutex;
use taskdeck_core::{DueIn, Extension, Priority, ProjectId, TaskStore};
use tracing_subscriber::EnvFilter;

mod app;
mod auth;
mod board_view;
mod commands;
mod config;
mod dashboard;
mod dialogs;
mod login;
mod state;
mod tui;

#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKDECK_BUILD_SHA"), ")"),
    about = "Personal kanban board for four fixed projects"
)]
struct Cli {
    /// Defaults to `board`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write ~/.taskdeck/config.toml with a local task store
    Init {
        /// Passcode required by `taskdeck login`
        #[arg(long)]
        passcode: Option<String>,
    },

    /// Open the interactive board (default)
    Board {
        /// Start on a project board instead of the dashboard
        #[arg(long)]
        project: Option<ProjectId>,
    },

    /// Create a task
    Add {
        #[arg(long)]
        text: String,

        #[arg(long)]
        project: ProjectId,

        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Deadline preset, e.g. "1 Hour", "1 Day" or "1 Month"
        #[arg(long)]
        due: Option<DueIn>,
    },

    /// List open tasks
    List {
        #[arg(long)]
        project: Option<ProjectId>,

        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },

    /// Print the dashboard numbers
    Stats,

    /// Move a task to another priority column
    Move {
        id: String,

        #[arg(long)]
        priority: Priority,
    },

    /// Mark a task as done
    Done { id: String },

    /// Mark a task as not done
    Reopen { id: String },

    /// Change text, priority or deadline
    Edit {
        id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Push the deadline out: "hour", "day" or "week"
        #[arg(long)]
        extend: Option<Extension>,
    },

    /// Delete a task
    Delete { id: String },

    /// Unlock taskdeck with the configured passcode
    Login,

    /// Lock taskdeck again
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let cfg = config::load_config()?;

    match cli.command.unwrap_or(Command::Board { project: None }) {
        Command::Init { passcode } => config::init_config(passcode)?,

        Command::Board { project } => tui::run_board(cfg, project)?,

        Command::Login => auth::login(&cfg)?,
        Command::Logout => auth::logout(&cfg)?,

        cmd => {
            auth::require_auth(&cfg)?;
            let store = open_store(&cfg)?;
            run_command(&store, cmd)?;
        }
    }

    Ok(())
}

fn run_command(store: &TaskStore, cmd: Command) -> Result<()> {
    match cmd {
        Command::Add {
            text,
            project,
            priority,
            due,
        } => commands::add(store, text, project, priority, due),
        Command::List { project, all } => commands::list(store, project, all),
        Command::Stats => {
            commands::print_stats(&store.subscribe_stats().current());
            Ok(())
        }
        Command::Move { id, priority } => commands::reprioritize(store, &id, priority),
        Command::Done { id } => commands::set_completion(store, &id, true),
        Command::Reopen { id } => commands::set_completion(store, &id, false),
        Command::Edit {
            id,
            text,
            priority,
            extend,
        } => commands::edit(store, &id, text, priority, extend),
        Command::Delete { id } => commands::delete(store, &id),
        Command::Init { .. } | Command::Board { .. } | Command::Login | Command::Logout => Ok(()),
    }
}

fn open_store(cfg: &config::Config) -> Result<TaskStore> {
    let path = config::store_endpoint(cfg)?;
    TaskStore::open(&path).with_context(|| format!("open task store {}", path.display()))
}

/// Logs go to ~/.taskdeck/taskdeck.log so they never draw over the TUI.
/// Filter: TASKDECK_LOG, then RUST_LOG, then `info`.
fn init_logging() -> Result<()> {
    let path = state::log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let filter = EnvFilter::try_from_env("TASKDECK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
