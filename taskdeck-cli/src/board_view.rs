//! Board pane: column/card geometry for hit testing, and rendering.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use taskdeck_core::{
    format_deadline, Board, DragController, DropTarget, Priority, Region, Task, TaskId,
};

/// Rows per card, borders included.
pub const CARD_HEIGHT: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    pub id: TaskId,
    pub rect: Rect,
}

/// Cards scrolled off the top of each column, in column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnScroll([usize; 3]);

impl ColumnScroll {
    fn slot(p: Priority) -> usize {
        Priority::ALL.iter().position(|q| *q == p).unwrap_or(0)
    }

    pub fn get(&self, p: Priority) -> usize {
        self.0[Self::slot(p)]
    }

    /// Clamped to the column's length at the next layout.
    pub fn scroll(&mut self, p: Priority, by: isize) {
        let v = &mut self.0[Self::slot(p)];
        *v = v.saturating_add_signed(by);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnSlot {
    priority: Priority,
    rect: Rect,
    above: usize,
    below: usize,
}

/// Where every column and visible card sits on screen for one frame.
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    columns: Vec<ColumnSlot>,
    cards: Vec<CardSlot>,
    regions: Vec<Region>,
    scroll: ColumnScroll,
}

impl BoardLayout {
    /// Splits `area` into three equal columns and stacks cards from the top
    /// of each, starting `scroll` cards down. Only visible cards get a slot.
    pub fn compute(area: Rect, board: &Board, scroll: ColumnScroll) -> Self {
        let split = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
        let mut layout = BoardLayout::default();

        for ((priority, tasks), col) in board.columns().zip(split.iter().copied()) {
            layout.regions.push(Region::column(priority, hit_rect(col)));

            let inner = col.inner(Margin::new(1, 1));
            let fit = (inner.height / CARD_HEIGHT) as usize;
            let offset = scroll.get(priority).min(tasks.len().saturating_sub(fit));
            let shown = tasks.len().saturating_sub(offset).min(fit);
            layout.scroll.0[ColumnScroll::slot(priority)] = offset;
            layout.columns.push(ColumnSlot {
                priority,
                rect: col,
                above: offset,
                below: tasks.len() - offset - shown,
            });

            for (j, t) in tasks.iter().skip(offset).take(fit).enumerate() {
                let rect = Rect::new(
                    inner.x,
                    inner.y + j as u16 * CARD_HEIGHT,
                    inner.width,
                    CARD_HEIGHT,
                );
                layout.regions.push(Region::card(t.id().clone(), hit_rect(rect)));
                layout.cards.push(CardSlot {
                    id: t.id().clone(),
                    rect,
                });
            }
        }
        layout
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn card_at(&self, column: u16, row: u16) -> Option<&CardSlot> {
        self.cards.iter().find(|c| within(c.rect, column, row))
    }

    pub fn column_at(&self, column: u16, row: u16) -> Option<Priority> {
        self.columns
            .iter()
            .find(|c| within(c.rect, column, row))
            .map(|c| c.priority)
    }

    /// Offsets actually used, after clamping.
    pub fn scroll(&self) -> ColumnScroll {
        self.scroll
    }
}

pub fn hit_rect(r: Rect) -> taskdeck_core::Rect {
    taskdeck_core::Rect::new(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
}

fn within(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.right() && row >= r.y && row < r.bottom()
}

/// Snaps a floating overlay to whole cells, clipped to `bounds`.
fn to_cells(r: taskdeck_core::Rect, bounds: Rect) -> Option<Rect> {
    let x = r.x.round().max(0.0) as u16;
    let y = r.y.round().max(0.0) as u16;
    let cells = Rect::new(x, y, r.width.round() as u16, r.height.round() as u16).intersection(bounds);
    (cells.area() > 0).then_some(cells)
}

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub fn render(f: &mut Frame, board: &Board, layout: &BoardLayout, drag: &DragController) {
    let target = match drag.over() {
        Some(DropTarget::Column(p)) => Some(*p),
        Some(DropTarget::Card(id)) => board.find(id).map(|t| t.priority()),
        None => None,
    };

    for slot in &layout.columns {
        let (priority, rect) = (&slot.priority, &slot.rect);
        let count = board.column(*priority).len();
        let highlighted = target == Some(*priority);
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({count}) ", priority.label()))
            .border_style(Style::default().fg(priority_color(*priority)));
        if let Some(more) = more_label(slot.above, slot.below) {
            block = block.title_bottom(Line::from(more).right_aligned());
        }
        if highlighted {
            block = block
                .border_type(BorderType::Thick)
                .title_style(Style::default().add_modifier(Modifier::BOLD));
        }
        f.render_widget(block, *rect);

        if count == 0 {
            let inner = rect.inner(Margin::new(1, 1));
            let mid = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1.min(inner.height));
            let placeholder = Paragraph::new(Span::styled(
                "Drop here",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center);
            f.render_widget(placeholder, mid);
        }
    }

    for slot in &layout.cards {
        if let Some(task) = board.find(&slot.id) {
            let dimmed = drag.active_task() == Some(&slot.id);
            render_card(f, slot.rect, task, dimmed, false);
        }
    }

    if let (Some(overlay), Some(id)) = (drag.overlay(), drag.active_task()) {
        if let (Some(rect), Some(task)) = (to_cells(overlay, f.area()), board.find(id)) {
            f.render_widget(Clear, rect);
            render_card(f, rect, task, false, true);
        }
    }
}

fn more_label(above: usize, below: usize) -> Option<String> {
    match (above, below) {
        (0, 0) => None,
        (0, b) => Some(format!(" {b} more below ")),
        (a, 0) => Some(format!(" {a} more above ")),
        (a, b) => Some(format!(" {a} above, {b} below ")),
    }
}

fn render_card(f: &mut Frame, rect: Rect, task: &Task, dimmed: bool, lifted: bool) {
    let (border, text) = if dimmed {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
    } else {
        (
            Style::default().fg(priority_color(task.priority())),
            Style::default().fg(Color::White),
        )
    };
    let mut block = Block::default().borders(Borders::ALL).border_style(border);
    if lifted {
        block = block.border_type(BorderType::Double);
    }
    let body = Paragraph::new(vec![
        Line::from(Span::styled(task.text().to_string(), text.add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            format!("Due: {}", format_deadline(task.deadline())),
            if dimmed { text } else { Style::default().fg(Color::Gray) },
        )),
    ])
    .block(block);
    f.render_widget(body, rect);
}
