use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use time_humanize::HumanTime;

use crate::format::{format_ms, format_solve};
use crate::solve::{Solve, SolveStatus};
use crate::App;

/// Pure presenter for a solve list row. `number` counts from the oldest.
pub fn present_solve_row(number: usize, solve: &Solve, dp: u8) -> Row<'static> {
    let badge_style = match solve.status {
        SolveStatus::Ok => Style::default(),
        SolveStatus::Plus2 => Style::default().fg(Color::Yellow),
        SolveStatus::Dnf => Style::default().fg(Color::Red),
    };
    let badge = match solve.status {
        SolveStatus::Ok => String::new(),
        status => status.badge().to_string(),
    };

    Row::new(vec![
        Cell::from(format!("{number}.")).style(Style::default().add_modifier(Modifier::DIM)),
        Cell::from(format_solve(solve, dp)).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(badge).style(badge_style),
    ])
}

/// "3 minutes ago" style age of a solve
pub fn relative_time(created_at: i64, now_ms: i64) -> String {
    let age_secs = ((now_ms - created_at) / 1000).max(0);
    HumanTime::from_seconds(-age_secs).to_string()
}

/// Detail lines: effective and raw time, status, splits, age, scramble
pub fn detail_lines(solve: &Solve, dp: u8, now_ms: i64) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format_solve(solve, dp), bold),
            Span::raw(format!("   raw {}", format_ms(solve.time_ms, dp))),
            Span::raw(format!("   {}", solve.status.badge())),
        ]),
        Line::from(Span::styled(
            relative_time(solve.created_at, now_ms),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    if !solve.splits.is_empty() {
        let segments = solve
            .segments()
            .iter()
            .enumerate()
            .map(|(i, ms)| format!("S{} {}", i + 1, format_ms(*ms, dp)))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(segments));
    }

    lines.push(Line::from(""));
    lines.extend(solve.scramble.lines().map(|l| Line::from(l.to_string())));
    lines
}

pub fn render_solves(app: &App, f: &mut Frame) {
    let area = f.area();
    let dp = app.effective().precision.at_least_2dp();
    let solves = &app.session().solves;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // list (+ detail)
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (list_area, detail_area) = if app.show_detail {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);
        (cols[0], Some(cols[1]))
    } else {
        (chunks[0], None)
    };

    let total = solves.len();
    let rows: Vec<Row> = solves
        .iter()
        .enumerate()
        .map(|(i, solve)| present_solve_row(total - i, solve, dp))
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(4),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Solves • {}", app.session().name)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected((total > 0).then_some(app.selected_solve));
    f.render_stateful_widget(table, list_area, &mut state);

    if let (Some(area), Some(solve)) = (detail_area, app.selected_solve()) {
        render_detail(solve, dp, area, f);
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "(↑↓) select / (enter) detail / (o)k / (2) +2 / (d)nf / (x) delete / (b)ack",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[1],
    );
}

fn render_detail(solve: &Solve, dp: u8, area: Rect, f: &mut Frame) {
    let now_ms = Local::now().timestamp_millis();
    let detail = Paragraph::new(detail_lines(solve, dp, now_ms))
        .block(Block::default().borders(Borders::ALL).title("Solve"))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}
