use std::time::Instant;

use ratatui::Frame;

use crate::app::View;
use crate::ui::{
    render_form, render_graph_screen, render_timer_screen, sessions::render_sessions,
    settings::render_settings, solves::render_solves,
};
use crate::App;

/// A UI Screen boundary: responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, now: Instant, f: &mut Frame);
}

pub struct TimerScreen;

impl Screen for TimerScreen {
    fn render(&self, app: &App, now: Instant, f: &mut Frame) {
        render_timer_screen(app, now, f);
    }
}

pub struct SolvesScreen;

impl Screen for SolvesScreen {
    fn render(&self, app: &App, _now: Instant, f: &mut Frame) {
        render_solves(app, f);
    }
}

pub struct SessionsScreen;

impl Screen for SessionsScreen {
    fn render(&self, app: &App, _now: Instant, f: &mut Frame) {
        render_sessions(app, f);
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, _now: Instant, f: &mut Frame) {
        render_settings(app, f);
    }
}

pub struct GraphScreen;

impl Screen for GraphScreen {
    fn render(&self, app: &App, _now: Instant, f: &mut Frame) {
        render_graph_screen(app, f);
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Timer => Box::new(TimerScreen),
        View::Solves => Box::new(SolvesScreen),
        View::Sessions => Box::new(SessionsScreen),
        View::Settings => Box::new(SettingsScreen),
        View::Graph => Box::new(GraphScreen),
    }
}

/// Renders the current view plus any open form on top
pub fn draw(app: &App, now: Instant, f: &mut Frame) {
    current_screen(app.view).render(app, now, f);
    if let Some(form) = &app.form {
        render_form(form, f);
    }
}
