use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::any::Any;
use std::io::{self, Stdout};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use taskdeck_core::ProjectId;
use tracing::error;

use crate::app::{App, View};
use crate::board_view::{self, BoardLayout};
use crate::config::{Config, ConfigError};
use crate::dashboard;

const SIDEBAR_WIDTH: u16 = 22;

/// What the loop is showing: the board, or a full-screen error.
enum Screen {
    Running(Box<App>),
    /// Startup configuration is unusable. Only quitting is offered.
    Fatal(String),
    /// Something blew up while drawing; `r` rebuilds the session.
    Fault(String),
}

pub fn run_board(cfg: Config, project: Option<ProjectId>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Panics surface as the fault screen; keep them off the alternate screen.
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        error!(panic = %info, "panic in board session");
    }));

    let start = project.map_or_else(|| View::from_config(&cfg.board.default_view), View::Board);
    let res = board_loop(&mut terminal, &cfg, start);

    panic::set_hook(previous_hook);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn open_screen(cfg: &Config, start: View) -> Screen {
    startup_screen(App::open(cfg, start))
}

/// Config problems are fatal; anything else can be retried with a reload.
fn startup_screen(opened: Result<App>) -> Screen {
    match opened {
        Ok(app) => Screen::Running(Box::new(app)),
        Err(e) if e.downcast_ref::<ConfigError>().is_some() => {
            error!(error = %e, "configuration error");
            Screen::Fatal(e.to_string())
        }
        Err(e) => {
            error!(error = ?e, "could not start board session");
            Screen::Fault(format!("{e:#}"))
        }
    }
}

fn board_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, cfg: &Config, start: View) -> Result<()> {
    let mut screen = open_screen(cfg, start);

    loop {
        let mut fault = None;
        match &mut screen {
            Screen::Running(app) => {
                app.tick();
                if app.should_quit() {
                    break;
                }
                let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
                    terminal.draw(|f| draw(f, app)).map(|_| ())
                }));
                match drawn {
                    Ok(res) => res?,
                    Err(payload) => fault = Some(fault_screen(payload.as_ref())),
                }
            }
            Screen::Fatal(msg) => {
                terminal.draw(|f| draw_error(f, "Configuration error", msg, false))?;
            }
            Screen::Fault(msg) => {
                terminal.draw(|f| draw_error(f, "Something went wrong", msg, true))?;
            }
        }
        if let Some(next) = fault {
            screen = next;
            continue;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let ev = event::read()?;
        if let Screen::Running(app) = &mut screen {
            app.handle_event(ev);
            continue;
        }
        let Event::Key(key) = ev else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('r') if matches!(screen, Screen::Fault(_)) => {
                screen = open_screen(cfg, start);
            }
            _ => {}
        }
    }

    Ok(())
}

fn fault_screen(payload: &(dyn Any + Send)) -> Screen {
    let msg = panic_message(payload);
    error!(error = %msg, "render fault");
    Screen::Fault(msg)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown error".to_string())
}

fn draw(f: &mut Frame, app: &mut App) {
    if app.is_locked() {
        let area = f.area();
        app.login.render(f, area);
        return;
    }

    let [body, status] = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).areas(f.area());
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)]).areas(body);

    app.sidebar = sidebar;
    draw_sidebar(f, sidebar, app.view);

    match app.view {
        View::Dashboard => {
            app.board_layout = BoardLayout::default();
            dashboard::render(f, main, &app.stats);
        }
        View::Board(_) => {
            app.board_layout = BoardLayout::compute(main, &app.board, app.scroll);
            app.scroll = app.board_layout.scroll();
            board_view::render(f, &app.board, &app.board_layout, &app.drag);
        }
    }

    draw_status(f, status, app);

    if let Some(dialog) = &app.dialog {
        dialog.render(f, main);
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, current: View) {
    let lines: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let text = format!("{i} {}", v.label());
            if *v == current {
                Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::raw(text)
            }
        })
        .collect();
    let sidebar = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" taskdeck "));
    f.render_widget(sidebar, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.banner {
        Some(b) => Line::from(Span::styled(
            format!(" {} ", b.message),
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "n: new  drag: move  click: edit  wheel: scroll  Tab/0-4: views  Esc: cancel  L: lock  q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_error(f: &mut Frame, title: &str, message: &str, reloadable: bool) {
    let keys = if reloadable { "r: reload  q: quit" } else { "q: quit" };
    let text = Text::from(vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::from(Span::styled(keys, Style::default().fg(Color::Gray))),
    ]);
    let body = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_store_is_fatal_other_startup_errors_are_reloadable() {
        let missing = ConfigError::MissingStoreEndpoint("config.toml".into());
        match startup_screen(Err(missing.into())) {
            Screen::Fatal(msg) => assert!(msg.contains("TASKDECK_STORE")),
            _ => panic!("expected the fatal screen"),
        }

        let broken = anyhow::anyhow!("malformed store file").context("open task store /tmp/x");
        match startup_screen(Err(broken)) {
            Screen::Fault(msg) => assert!(msg.contains("malformed store file")),
            _ => panic!("expected the fault screen"),
        }
    }

    #[test]
    fn panic_while_drawing_becomes_a_fault_screen() {
        let caught = panic::catch_unwind(|| panic!("layout exploded")).unwrap_err();
        match fault_screen(caught.as_ref()) {
            Screen::Fault(msg) => assert_eq!(msg, "layout exploded"),
            _ => panic!("expected the fault screen"),
        }

        let formatted = panic::catch_unwind(|| panic!("bad row {}", 3)).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "bad row 3");
    }
}
