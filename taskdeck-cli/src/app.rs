//! Interactive session state and input handling for the board TUI.

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taskdeck_core::{
    Board, Dispatcher, DragController, DragEnd, Notice, Point, ProjectId, Snapshot, Stats,
    TaskStore, TaskSubscription,
};
use tracing::{info, warn};

use crate::auth::{open_gate, Gate};
use crate::board_view::{hit_rect, BoardLayout, ColumnScroll};
use crate::config::{store_endpoint, Config};
use crate::dialogs::{CreateForm, Dialog, EditForm, Outcome};
use crate::login::{LoginAction, LoginForm};

const BANNER_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Board(ProjectId),
}

impl View {
    /// Sidebar order.
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Board(ProjectId::SystemProsAi),
        View::Board(ProjectId::Skool),
        View::Board(ProjectId::SocialMedia),
        View::Board(ProjectId::Personal),
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Board(p) => p.label(),
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn offset(self, by: isize) -> View {
        let len = View::ALL.len() as isize;
        View::ALL[(self.index() as isize + by).rem_euclid(len) as usize]
    }

    /// "dashboard" or a project label. Unknown values fall back to the
    /// dashboard.
    pub fn from_config(s: &str) -> View {
        if s.trim().eq_ignore_ascii_case("dashboard") {
            return View::Dashboard;
        }
        match s.parse::<ProjectId>() {
            Ok(p) => View::Board(p),
            Err(e) => {
                warn!(view = s, error = %e, "unknown default_view");
                View::Dashboard
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Banner {
    pub message: String,
    shown_at: Instant,
}

pub struct App {
    store: Arc<TaskStore>,
    sub: TaskSubscription,
    dispatcher: Dispatcher,
    notices: Receiver<Notice>,
    gate: Gate,
    pub login: LoginForm,
    snapshot: Snapshot,
    pub stats: Stats,
    pub view: View,
    pub board: Board,
    pub drag: DragController,
    pub dialog: Option<Dialog>,
    pub banner: Option<Banner>,
    /// Filled in by the last draw; used for hit testing.
    pub board_layout: BoardLayout,
    pub scroll: ColumnScroll,
    pub sidebar: Rect,
    quit: bool,
}

impl App {
    pub fn open(cfg: &Config, start: View) -> Result<Self> {
        let path = store_endpoint(cfg)?;
        let store = Arc::new(
            TaskStore::open(&path).with_context(|| format!("open task store {}", path.display()))?,
        );
        let sub = store.subscribe();
        let (dispatcher, notices) = Dispatcher::spawn(store.clone());
        let snapshot = sub.current();
        info!(store = %path.display(), tasks = snapshot.len(), "board session started");

        let mut app = Self {
            gate: open_gate(cfg)?,
            login: LoginForm::default(),
            stats: Stats::from_tasks(&snapshot),
            view: start,
            board: Board::default(),
            drag: DragController::new(cfg.board.activation_distance),
            dialog: None,
            banner: None,
            board_layout: BoardLayout::default(),
            scroll: ColumnScroll::default(),
            sidebar: Rect::default(),
            quit: false,
            store,
            sub,
            dispatcher,
            notices,
            snapshot,
        };
        app.reproject();
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_locked(&self) -> bool {
        !self.gate.is_authenticated()
    }

    /// Picks up the latest snapshot and any failed-write notices.
    pub fn tick(&mut self) {
        if let Some(snapshot) = self.sub.poll_update() {
            self.stats = Stats::from_tasks(&snapshot);
            self.snapshot = snapshot;
            self.reproject();
        }
        while let Ok(notice) = self.notices.try_recv() {
            self.show_banner(notice.message);
        }
        if self
            .banner
            .as_ref()
            .is_some_and(|b| b.shown_at.elapsed() >= BANNER_TTL)
        {
            self.banner = None;
        }
    }

    fn reproject(&mut self) {
        self.board = match self.view {
            View::Board(p) => Board::project(&self.snapshot, p),
            View::Dashboard => Board::default(),
        };
    }

    fn show_banner(&mut self, message: String) {
        self.banner = Some(Banner {
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn set_view(&mut self, view: View) {
        self.drag.cancel();
        self.view = view;
        self.scroll = ColumnScroll::default();
        self.reproject();
    }

    pub fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(m) if !self.is_locked() && self.dialog.is_none() => self.handle_mouse(m),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        if self.is_locked() {
            match self.login.handle_key(key) {
                LoginAction::Submit(attempt) => {
                    if self.gate.login(&attempt).is_err() {
                        self.login.reject(Instant::now());
                    }
                }
                LoginAction::Quit => self.quit = true,
                LoginAction::None => {}
            }
            return;
        }

        if let Some(dialog) = self.dialog.as_mut() {
            match dialog.handle_key(key, self.store.now()) {
                Outcome::Pending => {}
                Outcome::Close => self.dialog = None,
                Outcome::Submit(m) => {
                    self.dispatcher.dispatch(m);
                    self.dialog = None;
                }
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Esc => {
                if !self.drag.cancel() {
                    self.banner = None;
                }
            }
            KeyCode::Tab => self.set_view(self.view.offset(1)),
            KeyCode::BackTab => self.set_view(self.view.offset(-1)),
            KeyCode::Char(c @ '0'..='4') => {
                self.set_view(View::ALL[c as usize - '0' as usize]);
            }
            KeyCode::Char('n') => {
                let project = match self.view {
                    View::Board(p) => p,
                    View::Dashboard => ProjectId::ALL[0],
                };
                self.drag.cancel();
                self.dialog = Some(Dialog::Create(CreateForm::new(project)));
            }
            KeyCode::Char('L') => {
                self.drag.cancel();
                if let Err(e) = self.gate.logout() {
                    self.show_banner(format!("Could not log out: {e}"));
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, m: MouseEvent) {
        let at = Point::new(m.column as f32, m.row as f32);
        match m.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(view) = self.sidebar_hit(m.column, m.row) {
                    self.set_view(view);
                } else if let Some(slot) = self.board_layout.card_at(m.column, m.row) {
                    self.drag.pointer_down(slot.id.clone(), at, hit_rect(slot.rect));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag.pointer_move(at, self.board_layout.regions());
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let end = self
                    .drag
                    .pointer_up(at, self.board_layout.regions(), &self.board);
                self.finish_drag(end);
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let by = if m.kind == MouseEventKind::ScrollDown { 1 } else { -1 };
                if let Some(p) = self.board_layout.column_at(m.column, m.row) {
                    self.scroll.scroll(p, by);
                }
            }
            _ => {}
        }
    }

    fn finish_drag(&mut self, end: DragEnd) {
        if let Some(m) = end.mutation() {
            self.dispatcher.dispatch(m);
            return;
        }
        if let DragEnd::Click(id) = end {
            if let Some(task) = self.board.find(&id) {
                self.dialog = Some(Dialog::Edit(EditForm::new(task.clone())));
            }
        }
    }

    /// Sidebar rows sit just inside its border, one per view.
    fn sidebar_hit(&self, column: u16, row: u16) -> Option<View> {
        let s = self.sidebar;
        if column <= s.x || column + 1 >= s.right() || row <= s.y {
            return None;
        }
        View::ALL.get((row - s.y - 1) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_cycle_in_sidebar_order() {
        assert_eq!(View::Dashboard.offset(1), View::Board(ProjectId::SystemProsAi));
        assert_eq!(View::Dashboard.offset(-1), View::Board(ProjectId::Personal));
    }

    #[test]
    fn default_view_accepts_project_labels() {
        assert_eq!(View::from_config("dashboard"), View::Dashboard);
        assert_eq!(View::from_config("skool"), View::Board(ProjectId::Skool));
        assert_eq!(View::from_config("nowhere"), View::Dashboard);
    }
}
