//! Create and edit dialogs. Key handling is pure: a dialog turns key
//! presses into at most one [`Mutation`] and never touches the store.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use taskdeck_core::{
    format_deadline, DueIn, Extension, Mutation, NewTask, Priority, ProjectId, Task, TaskPatch,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Close,
    Submit(Mutation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Create(CreateForm),
    Edit(EditForm),
}

impl Dialog {
    pub fn handle_key(&mut self, key: KeyEvent, now_ms: i64) -> Outcome {
        match self {
            Dialog::Create(form) => form.handle_key(key, now_ms),
            Dialog::Edit(form) => form.handle_key(key, now_ms),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (title, lines) = match self {
            Dialog::Create(form) => ("New task", form.lines()),
            Dialog::Edit(form) => ("Edit task", form.lines()),
        };
        let height = lines.len() as u16 + 2;
        let rect = centered(area, 56, height);
        f.render_widget(Clear, rect);
        let body = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(body, rect);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Text,
    Project,
    Priority,
    Due,
    Submit,
}

impl CreateField {
    const ORDER: [CreateField; 5] = [
        CreateField::Text,
        CreateField::Project,
        CreateField::Priority,
        CreateField::Due,
        CreateField::Submit,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub text: String,
    pub project: ProjectId,
    pub priority: Priority,
    pub due: Option<DueIn>,
    pub focus: CreateField,
    error: Option<String>,
}

impl CreateForm {
    pub fn new(project: ProjectId) -> Self {
        Self {
            text: String::new(),
            project,
            priority: Priority::Medium,
            due: None,
            focus: CreateField::Text,
            error: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now_ms: i64) -> Outcome {
        match key.code {
            KeyCode::Esc => return Outcome::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = step(&CreateField::ORDER, self.focus, 1),
            KeyCode::BackTab | KeyCode::Up => self.focus = step(&CreateField::ORDER, self.focus, -1),
            KeyCode::Enter => return self.submit(now_ms),
            code => match self.focus {
                CreateField::Text => edit_text(&mut self.text, code),
                CreateField::Project => {
                    if let Some(d) = direction(code) {
                        self.project = step(&ProjectId::ALL, self.project, d);
                    }
                }
                CreateField::Priority => {
                    if let Some(d) = direction(code) {
                        self.priority = step(&Priority::ALL, self.priority, d);
                    }
                }
                CreateField::Due => {
                    if let Some(d) = direction(code) {
                        self.due = step_optional(&DueIn::ALL, self.due, d);
                    }
                }
                CreateField::Submit => {}
            },
        }
        Outcome::Pending
    }

    fn submit(&mut self, now_ms: i64) -> Outcome {
        let mut new = NewTask::new(self.text.trim(), self.project, self.priority);
        if let Some(due) = self.due {
            new = new.with_deadline(due.deadline_from(now_ms));
        }
        if let Err(e) = new.validate() {
            self.error = Some(e.to_string());
            self.focus = CreateField::Text;
            return Outcome::Pending;
        }
        Outcome::Submit(Mutation::Create(new))
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let due = self.due.map(|d| d.label()).unwrap_or("No deadline");
        let mut lines = vec![
            field("Task", format!("{}_", self.text), self.focus == CreateField::Text),
            field("Project", format!("< {} >", self.project), self.focus == CreateField::Project),
            field("Priority", format!("< {} >", self.priority), self.focus == CreateField::Priority),
            field("Due", format!("< {due} >"), self.focus == CreateField::Due),
            Line::raw(""),
            button("Create", self.focus == CreateField::Submit),
        ];
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
        }
        lines.push(hint());
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Text,
    Priority,
    Extend,
    Complete,
    Delete,
    Save,
}

impl EditField {
    const ORDER: [EditField; 6] = [
        EditField::Text,
        EditField::Priority,
        EditField::Extend,
        EditField::Complete,
        EditField::Delete,
        EditField::Save,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    task: Task,
    pub text: String,
    pub priority: Priority,
    pub extend: Option<Extension>,
    pub focus: EditField,
    confirm_delete: bool,
    error: Option<String>,
}

impl EditForm {
    pub fn new(task: Task) -> Self {
        Self {
            text: task.text().to_string(),
            priority: task.priority(),
            extend: None,
            focus: EditField::Text,
            confirm_delete: false,
            error: None,
            task,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now_ms: i64) -> Outcome {
        if key.code != KeyCode::Enter {
            self.confirm_delete = false;
        }
        match key.code {
            KeyCode::Esc => return Outcome::Close,
            KeyCode::Tab | KeyCode::Down => self.focus = step(&EditField::ORDER, self.focus, 1),
            KeyCode::BackTab | KeyCode::Up => self.focus = step(&EditField::ORDER, self.focus, -1),
            KeyCode::Enter => return self.activate(now_ms),
            code => match self.focus {
                EditField::Text => edit_text(&mut self.text, code),
                EditField::Priority => {
                    if let Some(d) = direction(code) {
                        self.priority = step(&Priority::ALL, self.priority, d);
                    }
                }
                EditField::Extend => {
                    if let Some(d) = direction(code) {
                        self.extend = step_optional(&Extension::ALL, self.extend, d);
                    }
                }
                _ => {}
            },
        }
        Outcome::Pending
    }

    fn activate(&mut self, now_ms: i64) -> Outcome {
        let id = self.task.id().clone();
        match self.focus {
            EditField::Complete => Outcome::Submit(Mutation::complete(id)),
            EditField::Delete if self.confirm_delete => Outcome::Submit(Mutation::Delete { id }),
            EditField::Delete => {
                self.confirm_delete = true;
                Outcome::Pending
            }
            _ => self.save(now_ms),
        }
    }

    fn save(&mut self, now_ms: i64) -> Outcome {
        let text = self.text.trim();
        let patch = TaskPatch {
            text: (text != self.task.text()).then(|| text.to_string()),
            priority: (self.priority != self.task.priority()).then_some(self.priority),
            deadline: self
                .extend
                .map(|ext| ext.extend(self.task.deadline(), now_ms)),
        };
        if let Err(e) = patch.validate() {
            self.error = Some(e.to_string());
            self.focus = EditField::Text;
            return Outcome::Pending;
        }
        if patch.is_empty() {
            return Outcome::Close;
        }
        Outcome::Submit(Mutation::Update {
            id: self.task.id().clone(),
            patch,
        })
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let extend = self.extend.map(|e| e.label()).unwrap_or("Keep");
        let delete_label = if self.confirm_delete {
            "Delete? Enter again to confirm"
        } else {
            "Delete"
        };
        let mut lines = vec![
            field("Task", format!("{}_", self.text), self.focus == EditField::Text),
            field("Priority", format!("< {} >", self.priority), self.focus == EditField::Priority),
            Line::from(vec![
                Span::styled("Deadline  ", Style::default().fg(Color::Gray)),
                Span::raw(format_deadline(self.task.deadline())),
            ]),
            field("Extend", format!("< {extend} >"), self.focus == EditField::Extend),
            Line::raw(""),
            button("Complete", self.focus == EditField::Complete),
            button(delete_label, self.focus == EditField::Delete),
            button("Save", self.focus == EditField::Save),
        ];
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
        }
        lines.push(hint());
        lines
    }
}

fn edit_text(text: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

fn direction(code: KeyCode) -> Option<isize> {
    match code {
        KeyCode::Right | KeyCode::Char(' ') => Some(1),
        KeyCode::Left => Some(-1),
        _ => None,
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, by: isize) -> T {
    let len = all.len() as isize;
    let i = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[(i + by).rem_euclid(len) as usize]
}

/// Cycles through `None` followed by every value in `all`.
fn step_optional<T: Copy + PartialEq>(all: &[T], current: Option<T>, by: isize) -> Option<T> {
    let len = all.len() as isize + 1;
    let i = current
        .and_then(|c| all.iter().position(|v| *v == c))
        .map_or(0, |p| p as isize + 1);
    match (i + by).rem_euclid(len) {
        0 => None,
        n => Some(all[n as usize - 1]),
    }
}

fn field(label: &str, value: String, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ])
}

fn button(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Line::from(Span::styled(format!("[ {label} ]"), style))
}

fn hint() -> Line<'static> {
    Line::from(Span::styled(
        "Tab: next  Left/Right: change  Enter: confirm  Esc: close",
        Style::default().fg(Color::DarkGray),
    ))
}

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(rows[1]);
    cols[1]
}
