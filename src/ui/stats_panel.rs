use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::format::{format_ms, format_stat, UNAVAILABLE};
use crate::predict::Ao5Prediction;
use crate::stats::{session_mean, session_std_dev, StatKey, StatLine};
use crate::App;

/// Pure presenter for one stats panel row: label, current, best
pub fn present_stat_row(line: &StatLine, dp: u8) -> Row<'static> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let (current, best) = match line.key {
        // best single has no "current" value
        StatKey::Best => (String::new(), format_stat(line.best, dp)),
        StatKey::Average(_) => (format_stat(line.current, dp), format_stat(line.best, dp)),
    };
    let style = if line.is_unavailable() {
        dim
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(line.key.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(current),
        Cell::from(best).style(Style::default().fg(Color::Green)),
    ])
    .style(style)
}

/// Lines for the AO5 prediction block
pub fn prediction_lines(prediction: Option<&Ao5Prediction>, dp: u8) -> Vec<Line<'static>> {
    let Some(p) = prediction else {
        return vec![Line::from(Span::styled(
            "Need 4 valid solves",
            Style::default().add_modifier(Modifier::DIM),
        ))];
    };

    let mut lines = vec![
        Line::from(format!(
            "next AO5 {} – {}",
            format_stat(Some(p.min_ms), dp),
            format_stat(Some(p.max_ms), dp)
        )),
        Line::from(format!(
            "equal {}: {}",
            format_stat(Some(p.min_ms), dp),
            format_ms(p.best_needed_ms, dp)
        )),
    ];
    lines.extend(p.targets.iter().map(|t| {
        let target = format_ms(t.target_ms, 1);
        match t.needed_ms {
            Some(needed) => Line::from(format!("sub {target}: {}", format_ms(needed, dp))),
            None => Line::from(Span::styled(
                format!("sub {target}: {UNAVAILABLE}"),
                Style::default().add_modifier(Modifier::DIM),
            )),
        }
    }));
    lines
}

pub fn render_stats_panel(app: &App, area: Rect, f: &mut Frame) {
    let eff = app.effective();
    let dp = eff.precision.at_least_2dp();
    let solves = &app.session().solves;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Stats • {} solves", solves.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prediction_height = if eff.data_shown.predict {
        (2 + crate::predict::TARGET_COUNT as u16).min(inner.height / 2)
    } else {
        0
    };
    let chunks = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(1), // mean / sd
            Constraint::Min(1),    // table
            Constraint::Length(prediction_height),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(format!(
            "mean {}   sd {}",
            format_stat(session_mean(solves), dp),
            format_stat(session_std_dev(solves), dp)
        )),
        chunks[0],
    );

    let rows: Vec<Row> = app
        .stat_lines()
        .iter()
        .map(|line| present_stat_row(line, dp))
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["", "current", "best"])
            .style(Style::default().add_modifier(Modifier::UNDERLINED)),
    );
    f.render_widget(table, chunks[1]);

    if eff.data_shown.predict {
        let prediction = app.prediction();
        f.render_widget(
            Paragraph::new(prediction_lines(prediction.as_ref(), dp))
                .style(Style::default().fg(Color::Cyan)),
            chunks[2],
        );
    }
}
