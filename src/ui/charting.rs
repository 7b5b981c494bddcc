use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::format::format_stat;
use crate::session::GraphConfig;
use crate::stats::SeriesKind;
use crate::time_series::SeriesPoint;

/// X bounds (solve numbers) and Y bounds (ms) for a series chart.
///
/// The y-range is the series min..max, widened to at least 1 ms so a flat
/// series still draws.
pub fn compute_chart_params(points: &[SeriesPoint]) -> ([f64; 2], [f64; 2]) {
    let x_max = points.last().map_or(1.0, |p| p.n).max(1.0);

    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.ms), hi.max(p.ms))
        });
    let y = if lo.is_finite() && hi.is_finite() {
        [lo, hi.max(lo + 1.0)]
    } else {
        [0.0, 1.0]
    };

    ([1.0, x_max], y)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// `mode: AO5 • points: 16 • last 20 solves`
pub fn meta_line(graph: GraphConfig, points: usize) -> String {
    format!(
        "mode: {} • points: {} • last {} solves",
        SeriesKind::from_type(graph.kind).label(),
        points,
        graph.last
    )
}

/// Bordered trend chart with its meta line underneath
pub fn render_series_chart(
    title: &str,
    graph: GraphConfig,
    points: &[SeriesPoint],
    dp: u8,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    if points.is_empty() {
        Paragraph::new(Span::styled(
            "no solves to plot",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .render(chunks[0], buf);
    } else {
        let ([x_lo, x_hi], [y_lo, y_hi]) = compute_chart_params(points);
        let tuples: Vec<(f64, f64)> = points.iter().map(|&p| p.into()).collect();
        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&tuples)];

        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .bounds([x_lo, x_hi])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(format_label(x_hi), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .bounds([y_lo, y_hi])
                    .labels(vec![
                        Span::styled(format_stat(Some(y_lo), dp), bold_style),
                        Span::styled(format_stat(Some(y_hi), dp), bold_style),
                    ]),
            )
            .render(chunks[0], buf);
    }

    Paragraph::new(Span::styled(
        meta_line(graph, points.len()),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, [1.0, 1.0]);
        assert_eq!(y, [0.0, 1.0]);
    }

    #[test]
    fn flat_series_gets_a_minimum_span() {
        let points = [SeriesPoint::new(1.0, 10_000.0), SeriesPoint::new(2.0, 10_000.0)];
        let (x, y) = compute_chart_params(&points);
        assert_eq!(x, [1.0, 2.0]);
        assert_eq!(y, [10_000.0, 10_001.0]);
    }

    #[test]
    fn bounds_follow_min_and_max() {
        let points = [
            SeriesPoint::new(1.0, 12_000.0),
            SeriesPoint::new(2.0, 9_500.0),
            SeriesPoint::new(3.0, 11_000.0),
        ];
        let (_, y) = compute_chart_params(&points);
        assert_eq!(y, [9_500.0, 12_000.0]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }

    #[test]
    fn meta_line_names_mode_and_window() {
        assert_eq!(
            meta_line(GraphConfig { last: 20, kind: 5 }, 16),
            "mode: AO5 • points: 16 • last 20 solves"
        );
        assert_eq!(
            meta_line(GraphConfig { last: 50, kind: 1 }, 3),
            "mode: Single • points: 3 • last 50 solves"
        );
    }
}
