pub mod charting;
pub mod history;
pub mod screen;

use itertools::Itertools;
use mathrush::{
    chart::{paint_chart, ChartProjector, Ink, PointDetails},
    problem::Operator,
    time_class::{format_clock, format_duration, TimeClass},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{canvas::Canvas, Paragraph, Widget, Wrap},
    Frame,
};
use std::rc::Rc;

use crate::{App, Results};
use charting::{extents_for, format_label, ink_color, CanvasSurface};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Timer turns red from here on
const LOW_TIME_SECS: u64 = 10;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

/// Results screen rows: chart, hover details, stats, session line, settings,
/// padding, legend
pub fn results_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area)
}

pub fn chart_area(area: Rect) -> Rect {
    results_layout(area)[0]
}

fn operator_list(operators: &[Operator]) -> String {
    operators.iter().map(|o| o.symbol()).join(" ")
}

pub fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let body_lines = 5;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(body_lines) / 2),
            Constraint::Length(1), // timer
            Constraint::Length(1), // score
            Constraint::Length(1),
            Constraint::Length(1), // problem
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let remaining = session.remaining_secs();
    let timer_style = if remaining <= LOW_TIME_SECS {
        bold_style.fg(ink_color(Ink::ErrorMark))
    } else {
        bold_style
    };
    Paragraph::new(Span::styled(format_clock(remaining), timer_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "#{}   {} qpm   {}/{} first try",
            session.total_problems() + 1,
            format_label(session.live_score()),
            session.first_try_correct(),
            session.total_problems()
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    if let Some(problem) = session.current_problem() {
        let field = session.field();
        let answer = if field.is_empty() {
            Span::styled("_", dim_bold_style)
        } else {
            Span::styled(field.to_string(), bold_style.fg(ink_color(Ink::Cumulative)))
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} = ", problem.display), bold_style),
            answer,
        ]))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(tab) finish / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

pub fn render_results(app: &App, results: &Results, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let chunks = results_layout(area);

    let chart = ChartProjector::new(&results.series, extents_for(chunks[0]));
    let (width, height) = (chart.extents.width, chart.extents.height);
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            let mut surface = CanvasSurface::new(ctx, width, height);
            paint_chart(&mut surface, &chart, results.hovered);
        })
        .render(chunks[0], buf);

    let details = results.hovered.and_then(|i| {
        PointDetails::for_index(&results.series, &results.summary.problem_history, i)
    });
    let hover_line = match details {
        Some(d) => Line::from(Span::styled(
            format!(
                "Q{}  {} = {}   {:.1}s   cumulative {:.1}   burst {:.1}   attempts {}",
                d.question,
                d.display,
                results.summary.problem_history[d.question - 1].answer,
                d.secs,
                d.cumulative,
                d.burst,
                d.attempts
            ),
            bold_style,
        )),
        None => Line::from(vec![
            Span::styled("━ cumulative  ", Style::default().fg(ink_color(Ink::Cumulative))),
            Span::styled("━ burst  ", Style::default().fg(ink_color(Ink::Burst))),
            Span::styled("█ time  ", Style::default().fg(ink_color(Ink::TimeBar))),
            Span::styled("▀ retried  ", Style::default().fg(ink_color(Ink::ErrorMark))),
            Span::styled("┄ average", Style::default().fg(ink_color(Ink::Average))),
        ]),
    };
    Paragraph::new(hover_line)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let summary = &results.summary;
    Paragraph::new(Span::styled(
        format!(
            "{} qpm   {}% acc   {:.2} sd",
            format_label(results.qpm),
            format_label(summary.accuracy),
            results.series.std_dev_secs
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let peak = results.series.smoothed.iter().copied().fold(0.0, f64::max);
    Paragraph::new(Span::styled(
        format!(
            "{} solved   {} first try   peak {:.1} qpm   {} {}   {}   {}",
            summary.total_problems,
            summary.first_try_correct,
            peak,
            TimeClass::of(summary.duration_secs),
            format_duration(summary.duration_secs),
            summary.difficulty,
            operator_list(&summary.operators)
        ),
        italic_style.fg(ink_color(Ink::Burst)),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    let prefs = &app.prefs;
    let settings_text = format!(
        "Next: {} {} | {} | {}\n(t) time (d) difficulty (+ - * /) operators",
        format_duration(prefs.duration_secs),
        TimeClass::of(prefs.duration_secs),
        prefs.difficulty,
        operator_list(&prefs.operators)
    );
    Paragraph::new(settings_text)
        .style(italic_style.fg(ink_color(Ink::Label)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (h)istory / (esc)ape", italic_style))
        .render(chunks[6], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use mathrush::config::{Difficulty, Preferences};
    use ratatui::{backend::TestBackend, Terminal};

    fn create_test_app(secs: u64) -> App {
        let prefs = Preferences {
            duration_secs: secs,
            difficulty: Difficulty::Easy,
            operators: vec![Operator::Add, Operator::Mul],
            smoothing_window: 5,
        };
        App::new(prefs, Some(5), None).unwrap()
    }

    fn solve(app: &mut App, n: usize) {
        for _ in 0..n {
            let answer = app.session.current_problem().unwrap().answer.to_string();
            for c in answer.chars() {
                app.type_char(c);
            }
        }
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_game_screen_shows_timer_and_problem() {
        let mut app = create_test_app(90);
        app.type_char('1');
        let content = rendered(&app, 80, 24);

        let display = app.session.current_problem().unwrap().display.clone();
        assert!(content.contains("1:30"));
        assert!(content.contains(&format!("{display} = 1")));
        assert!(content.contains("#1"));
        assert!(content.contains("(tab) finish"));
    }

    #[test]
    fn test_game_screen_counts_solved() {
        let mut app = create_test_app(60);
        solve(&mut app, 2);
        let content = rendered(&app, 80, 24);
        assert!(content.contains("#3"));
        assert!(content.contains("2/2 first try"));
    }

    #[test]
    fn test_results_screen_stats() {
        let mut app = create_test_app(60);
        solve(&mut app, 5);
        app.end_early();
        assert_eq!(app.state, AppState::Results);

        let content = rendered(&app, 100, 40);
        assert!(content.contains("5 qpm"));
        assert!(content.contains("100% acc"));
        assert!(content.contains("5 solved"));
        assert!(content.contains("bullet 1m"));
        assert!(content.contains("easy"));
        assert!(content.contains("+ ×"));
        assert!(content.contains("(r)etry"));
        assert!(content.contains("cumulative"));
    }

    #[test]
    fn test_results_screen_hover_details() {
        let mut app = create_test_app(60);
        solve(&mut app, 3);
        app.end_early();
        app.results.as_mut().unwrap().hovered = Some(2);
        let content = rendered(&app, 100, 40);
        assert!(content.contains("Q3"));
        assert!(content.contains("attempts 1"));
    }

    #[test]
    fn test_results_screen_with_no_problems() {
        let mut app = create_test_app(30);
        app.end_early();
        let content = rendered(&app, 80, 24);
        assert!(content.contains("0 qpm"));
        assert!(content.contains("0 solved"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut app = create_test_app(30);
        rendered(&app, 10, 4);
        solve(&mut app, 1);
        app.end_early();
        rendered(&app, 10, 4);
        rendered(&app, 1, 1);
    }

    #[test]
    fn test_results_layout_leaves_room_for_chart() {
        let area = Rect::new(0, 0, 100, 40);
        let chunks = results_layout(area);
        assert_eq!(chunks.len(), 7);
        assert_eq!(chart_area(area), chunks[0]);
        assert_eq!(chunks[0].width, 100 - HORIZONTAL_MARGIN * 2);
        assert!(chunks[0].height > 20);
    }

    #[test]
    fn test_operator_list() {
        assert_eq!(operator_list(&Operator::ALL), "+ − × ÷");
    }
}
