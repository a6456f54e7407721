use mathrush::{
    aggregator::SessionSummary,
    analytics::overall_qpm,
    chart::Ink,
    config::Difficulty,
    time_class::{format_duration, TimeClass},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use super::charting::{format_label, ink_color};
use crate::History;

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

/// One table row per stored session
pub fn present_row(summary: &SessionSummary) -> Row<'static> {
    let qpm = overall_qpm(summary.total_problems, summary.duration_secs as f64);
    Row::new(vec![
        Cell::from(summary.timestamp.format("%b %d %H:%M").to_string()),
        Cell::from(summary.difficulty.to_string().to_uppercase())
            .style(Style::default().fg(difficulty_color(summary.difficulty))),
        Cell::from(format_duration(summary.duration_secs)),
        Cell::from(TimeClass::of(summary.duration_secs).to_string().to_uppercase()),
        Cell::from(format!("{}%", format_label(summary.accuracy))),
        Cell::from(format_label(qpm)).style(
            Style::default()
                .fg(ink_color(Ink::Cumulative))
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

pub fn render_history(history: &History, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // totals
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let totals = &history.totals;
    Paragraph::new(format!(
        "{} games   avg {} qpm   best {} qpm   {} questions",
        totals.sessions,
        format_label(totals.average_qpm),
        format_label(totals.best_qpm),
        totals.problems
    ))
    .block(Block::default().borders(Borders::ALL).title("History"))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    if history.sessions.is_empty() {
        let message = if history.available {
            "No sessions recorded yet. Finish one to see it here."
        } else {
            "Session history is off for this run."
        };
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(chunks[1], buf);
    } else {
        let header = Row::new(vec!["Date", "Difficulty", "Time", "Class", "Acc", "Score"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let widths = [
            Constraint::Length(13),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Min(5),
        ];
        let table = Table::new(history.sessions.iter().map(present_row), widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Recent sessions"),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ")
            .column_spacing(2);
        let mut state = TableState::default().with_selected(Some(history.selected));
        StatefulWidget::render(table, chunks[1], buf, &mut state);
    }

    Paragraph::new("(↑/↓) select  (enter) open  (b)ack  (n)ew  (esc)ape")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}
