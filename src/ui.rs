pub mod charting;
pub mod screen;
pub mod sessions;
pub mod settings;
pub mod solves;
pub mod stats_panel;

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::Form;
use crate::format::format_ms;
use crate::time_series::graph_points;
use crate::timer::TimerState;
use crate::App;

pub use screen::draw;

const HORIZONTAL_MARGIN: u16 = 2;

/// Red while holding, green once armed, bold while running
pub fn readout_style(state: TimerState) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match state {
        TimerState::Holding => bold.fg(Color::Red),
        TimerState::Ready => bold.fg(Color::Green),
        TimerState::Running => bold.fg(Color::White),
        TimerState::Idle => bold,
    }
}

pub fn render_timer_screen(app: &App, now: Instant, f: &mut Frame) {
    let area = f.area();
    let eff = app.effective();
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(4), // scramble
            Constraint::Length(3), // readout
            Constraint::Length(1), // splits
            Constraint::Min(6),    // stats + graphs
            Constraint::Length(1), // legend
        ])
        .split(area);

    let header = format!(
        "{} • {} • {} phase{}",
        app.session().name,
        app.settings.event,
        eff.timer.phases,
        if eff.timer.phases == 1 { "" } else { "s" }
    );
    f.render_widget(
        Paragraph::new(Span::styled(header, dim_style)).alignment(Alignment::Center),
        chunks[0],
    );

    let scramble_alignment = if app.scramble.width() <= chunks[1].width as usize {
        Alignment::Center
    } else {
        Alignment::Left
    };
    f.render_widget(
        Paragraph::new(app.scramble.clone())
            .alignment(scramble_alignment)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    let state = app.timer.state();
    let readout = Paragraph::new(Line::from(Span::styled(
        app.readout(now),
        readout_style(state),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP | Borders::BOTTOM));
    f.render_widget(readout, chunks[2]);

    let dp = eff.precision.at_least_2dp();
    let splits = app
        .timer
        .splits()
        .iter()
        .enumerate()
        .map(|(i, ms)| format!("S{} {}", i + 1, format_ms(*ms, dp)))
        .collect::<Vec<_>>()
        .join("   ");
    f.render_widget(
        Paragraph::new(Span::styled(splits, dim_style)).alignment(Alignment::Center),
        chunks[3],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[4]);
    stats_panel::render_stats_panel(app, body[0], f);
    render_graph_column(app, body[1], f);

    let legend = app.notice.clone().unwrap_or_else(|| {
        "(space) start / (m)anual / (2) +2 / (d)nf / (n)ew scramble / (s)olves / s(e)ssions / (g)raph / (o)ptions / (q)uit".to_string()
    });
    f.render_widget(
        Paragraph::new(Span::styled(legend, italic_style)),
        chunks[5],
    );
}

/// Session graphs stacked beside the stats panel
fn render_graph_column(app: &App, area: Rect, f: &mut Frame) {
    let graphs = app.graphs();
    if graphs.is_empty() {
        return;
    }
    let dp = app.effective().precision.at_least_2dp();
    let constraints = vec![Constraint::Ratio(1, graphs.len() as u32); graphs.len()];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, (graph, rect)) in graphs.iter().zip(rows.iter()).enumerate() {
        let points = graph_points(&app.session().solves, *graph);
        charting::render_series_chart(
            &format!("Graph {}", i + 1),
            *graph,
            &points,
            dp,
            *rect,
            f.buffer_mut(),
        );
    }
}

pub fn render_graph_screen(app: &App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let graphs = app.graphs();
    let dp = app.effective().precision.at_least_2dp();
    if let Some(graph) = graphs.get(app.selected_graph) {
        let points = graph_points(&app.session().solves, *graph);
        let title = format!(
            "Graph {}/{} • {}",
            app.selected_graph + 1,
            graphs.len(),
            app.session().name
        );
        charting::render_series_chart(&title, *graph, &points, dp, chunks[0], f.buffer_mut());
    }

    let legend = app.notice.clone().unwrap_or_else(|| {
        "(←→) graph / (k)ind / (w)indow / (b)ack".to_string()
    });
    f.render_widget(
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[1],
    );
}

/// Centered rect of the given size inside `area`
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render_form(form: &Form, f: &mut Frame) {
    let area = centered(50, 5, f.area());
    f.render_widget(Clear, area);

    let mut lines = vec![Line::from(vec![
        Span::raw(form.input.clone()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])];
    match &form.error {
        Some(err) => lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from(Span::styled(
            "(enter) save / (esc) cancel",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(form.kind.title()))
            .wrap(Wrap { trim: false }),
        area,
    );
}
