use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
    Frame,
};
use taskdeck_core::{ProjectId, Stats};

pub fn render(f: &mut Frame, area: Rect, stats: &Stats) {
    let [cards, rate, chart] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Min(6),
    ])
    .areas(area);

    let [pending, urgent, done] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(cards);
    stat_card(f, pending, "Pending", stats.pending, Color::Cyan);
    stat_card(f, urgent, "Needs attention", stats.high_priority, Color::Red);
    stat_card(f, done, "Completed", stats.completed, Color::Green);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Completion rate "))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(stats.completion_rate.min(100) as u16);
    f.render_widget(gauge, rate);

    let bars: Vec<Bar> = ProjectId::ALL
        .into_iter()
        .map(|p| {
            Bar::default()
                .value(stats.open_in(p) as u64)
                .label(Line::from(p.label()))
        })
        .collect();
    let width = (chart.width.saturating_sub(2) / ProjectId::ALL.len() as u16)
        .saturating_sub(2)
        .clamp(3, 16);
    let chart_widget = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Open tasks by project "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(chart_widget, chart);
}

fn stat_card(f: &mut Frame, area: Rect, title: &str, value: usize, color: Color) {
    let body = Paragraph::new(vec![
        Line::raw(""),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(body, area);
}
