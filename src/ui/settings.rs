use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::SettingRow;
use crate::App;

pub fn row_label(row: SettingRow) -> String {
    match row {
        SettingRow::Precision => "Precision".to_string(),
        SettingRow::Hold => "Hold to start".to_string(),
        SettingRow::Phases => "Phases".to_string(),
        SettingRow::Event => "Event".to_string(),
        SettingRow::Data(field) => format!("Show {}", field.to_uppercase()),
        SettingRow::SessionTimer => "Session timer settings".to_string(),
        SettingRow::SessionData => "Session stats settings".to_string(),
    }
}

pub fn render_settings(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let rows: Vec<Row> = SettingRow::all()
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row_label(row)),
                Cell::from(app.setting_value(row))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let title = format!("Settings • {}", app.session().name);
    let table = Table::new(rows, [Constraint::Length(26), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default().with_selected(Some(app.selected_setting));
    f.render_stateful_widget(table, chunks[0], &mut state);

    let legend = app
        .notice
        .clone()
        .unwrap_or_else(|| "(↑↓) select / (←→) change / (b)ack".to_string());
    f.render_widget(
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(row_label(SettingRow::Data("ao12")), "Show AO12");
        assert_eq!(row_label(SettingRow::Hold), "Hold to start");
    }
}
