use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::format::format_stat;
use crate::session::Session;
use crate::stats::session_mean;
use crate::App;

/// `Name  (12 solves, mean 11.42)`, marked when current
pub fn session_label(session: &Session, current: bool, dp: u8) -> Line<'static> {
    let marker = if current { "● " } else { "  " };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(
            session.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  ({} solves, mean {})",
                session.solves.len(),
                format_stat(session_mean(&session.solves), dp)
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

pub fn render_sessions(app: &App, f: &mut Frame) {
    let dp = app.effective().precision.at_least_2dp();
    let current_id = &app.session().id;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let items: Vec<ListItem> = app
        .store
        .sessions()
        .iter()
        .map(|s| ListItem::new(session_label(s, &s.id == current_id, dp)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Sessions"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.selected_session));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let legend = app.notice.clone().unwrap_or_else(|| {
        "(↑↓) select / (enter) switch / (a)dd / (r)ename / (x) delete / (b)ack".to_string()
    });
    f.render_widget(
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[1],
    );
}
