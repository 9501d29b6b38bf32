//! Passcode screen shown until the auth flag is set.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::dialogs::centered;

/// How long a wrong passcode keeps the field highlighted.
pub const ERROR_HIGHLIGHT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Submit(String),
    Quit,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    input: String,
    error_since: Option<Instant>,
}

impl LoginForm {
    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        match key.code {
            KeyCode::Esc => LoginAction::Quit,
            KeyCode::Enter => LoginAction::Submit(std::mem::take(&mut self.input)),
            KeyCode::Backspace => {
                self.input.pop();
                LoginAction::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                LoginAction::None
            }
            _ => LoginAction::None,
        }
    }

    pub fn reject(&mut self, now: Instant) {
        self.input.clear();
        self.error_since = Some(now);
    }

    pub fn has_error(&self, now: Instant) -> bool {
        self.error_since
            .is_some_and(|at| now.saturating_duration_since(at) < ERROR_HIGHLIGHT)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let error = self.has_error(Instant::now());
        let border = if error { Color::Red } else { Color::Cyan };
        let masked = "*".repeat(self.input.chars().count());

        let mut lines = vec![
            Line::from(Span::styled(
                "taskdeck",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Passcode: ", Style::default().fg(Color::Gray)),
                Span::raw(format!("{masked}_")),
            ]),
            Line::raw(""),
        ];
        if error {
            lines.push(Line::from(Span::styled(
                "Wrong passcode",
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter: unlock  Esc: quit",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let rect = centered(area, 40, lines.len() as u16 + 2);
        let body = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Locked")
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(body, rect);
    }
}
