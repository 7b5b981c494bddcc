//! Application state: screens, text forms, and the timer → solve → store
//! wiring. Rendering lives in `ui`.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use tracing::{info, warn};

use crate::config::{ConfigStore, DataShown, Effective, Settings};
use crate::error::Result;
use crate::format::{format_ms, format_stat, parse_time_input};
use crate::input::{Focus, InputArbiter, TimerSignal};
use crate::predict::{predict_next_ao5, Ao5Prediction};
use crate::scramble::ScrambleProvider;
use crate::session::{GraphConfig, Session, SessionTimer};
use crate::solve::{Solve, SolveStatus};
use crate::stats::{session_mean, session_std_dev, stat_line, StatLine};
use crate::store::{SessionPatch, SessionStore, SolvePatch};
use crate::timer::{CompletedTiming, Timer, TimerEvent, TimerState};

pub const MAX_PHASES: i64 = 10;
const HOLD_STEP_MS: i64 = 100;

/// Graph kinds cycled on the graph screen: singles, then averages
pub const GRAPH_KINDS: [usize; 7] = [1, 3, 5, 12, 25, 50, 100];
/// Window sizes cycled on the graph screen
pub const GRAPH_WINDOWS: [usize; 7] = [12, 20, 50, 100, 200, 500, 1000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timer,
    Solves,
    Sessions,
    Settings,
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    ManualEntry,
    NewSession,
    RenameSession,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::ManualEntry => "Add time (12.34, 1:02.50, 12.34+, DNF)",
            FormKind::NewSession => "New session name",
            FormKind::RenameSession => "Rename session",
        }
    }
}

/// A single-line text field that owns the keyboard while open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub input: String,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingRow {
    Precision,
    Hold,
    Phases,
    Event,
    Data(&'static str),
    SessionTimer,
    SessionData,
}

impl SettingRow {
    pub fn all() -> Vec<SettingRow> {
        let mut rows = vec![
            SettingRow::Precision,
            SettingRow::Hold,
            SettingRow::Phases,
            SettingRow::Event,
        ];
        rows.extend(DataShown::FIELDS.iter().map(|&f| SettingRow::Data(f)));
        rows.push(SettingRow::SessionTimer);
        rows.push(SettingRow::SessionData);
        rows
    }
}

/// What the event loop should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub settings: Settings,
    config_store: Box<dyn ConfigStore>,
    pub store: Box<dyn SessionStore>,
    pub timer: Timer,
    arbiter: InputArbiter,
    scrambler: Box<dyn ScrambleProvider>,
    pub scramble: String,
    pub view: View,
    pub form: Option<Form>,
    /// Index into the current session's solves, newest first
    pub selected_solve: usize,
    pub show_detail: bool,
    pub selected_session: usize,
    /// Session id awaiting a second `x` to delete
    pub confirm_delete: Option<String>,
    pub selected_setting: usize,
    pub selected_graph: usize,
    pub notice: Option<String>,
}

impl App {
    pub fn new(
        settings: Settings,
        config_store: Box<dyn ConfigStore>,
        store: Box<dyn SessionStore>,
        mut scrambler: Box<dyn ScrambleProvider>,
        releases_reported: bool,
    ) -> Self {
        let timer = Timer::new(settings.effective(store.current()).timer);
        let scramble = scrambler.generate(settings.event);
        Self {
            settings,
            config_store,
            store,
            timer,
            arbiter: InputArbiter::new(releases_reported),
            scrambler,
            scramble,
            view: View::Timer,
            form: None,
            selected_solve: 0,
            show_detail: false,
            selected_session: 0,
            confirm_delete: None,
            selected_setting: 0,
            selected_graph: 0,
            notice: None,
        }
    }

    pub fn session(&self) -> &Session {
        self.store.current()
    }

    pub fn effective(&self) -> Effective {
        self.settings.effective(self.store.current())
    }

    pub fn focus(&self) -> Focus {
        if self.form.is_none() && self.view == View::Timer {
            Focus::Timer
        } else {
            Focus::Form
        }
    }

    pub fn stat_lines(&self) -> Vec<StatLine> {
        let solves = &self.session().solves;
        self.effective()
            .stat_keys
            .into_iter()
            .map(|key| stat_line(solves, key))
            .collect()
    }

    pub fn prediction(&self) -> Option<Ao5Prediction> {
        predict_next_ao5(&self.session().solves)
    }

    /// Big timer text for the current state
    pub fn readout(&self, now: Instant) -> String {
        let precision = self.effective().precision;
        match self.timer.state() {
            TimerState::Running if !precision.shows_live() => "solve".to_string(),
            TimerState::Running => format_ms(self.timer.elapsed_ms(now), precision.dp()),
            TimerState::Holding | TimerState::Ready => format_ms(0, precision.at_least_2dp()),
            TimerState::Idle => format_ms(self.timer.elapsed_ms(now), precision.at_least_2dp()),
        }
    }

    /// How long the event loop may block
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        self.timer.wake_after(now)
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(event) = self.timer.poll(now) {
            self.on_timer_event(event);
        }
    }

    /// Teardown: a running timing is dropped, never recorded.
    pub fn shutdown(&mut self) {
        if self.timer.state() != TimerState::Idle {
            info!("discarding unfinished timing on exit");
        }
        self.timer.cancel();
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) {
        let focus = self.focus();
        let running = self.timer.is_running();
        if let Some(signal) = self.arbiter.classify_mouse(mouse, focus, running) {
            self.apply_signal(signal, now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.kind == KeyEventKind::Press
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            self.shutdown();
            return Control::Quit;
        }

        let focus = self.focus();
        let running = self.timer.is_running();
        let holding = matches!(self.timer.state(), TimerState::Holding | TimerState::Ready);
        if let Some(signal) = self.arbiter.classify_key(&key, focus, running, now) {
            self.apply_signal(signal, now);
            return Control::Continue;
        }
        if key.kind != KeyEventKind::Press || running || holding {
            return Control::Continue;
        }

        if self.form.is_some() {
            self.handle_form_key(key);
            return Control::Continue;
        }

        self.notice = None;
        match self.view {
            View::Timer => return self.handle_timer_view_key(key),
            View::Solves => self.handle_solves_key(key),
            View::Sessions => self.handle_sessions_key(key),
            View::Settings => self.handle_settings_key(key),
            View::Graph => self.handle_graph_key(key),
        }
        Control::Continue
    }

    fn apply_signal(&mut self, signal: TimerSignal, now: Instant) {
        if signal == TimerSignal::HoldStart || signal == TimerSignal::Tap {
            // picks up settings changed since the last timing
            let config = self.effective().timer;
            if !self.timer.is_running() {
                self.timer.set_config(config);
            }
        }
        let event = match signal {
            TimerSignal::HoldStart => self.timer.hold_start(now),
            TimerSignal::HoldEnd => self.timer.hold_end(now),
            TimerSignal::Stop => self.timer.stop_or_split(now),
            TimerSignal::Tap => self.timer.tap(now),
        };
        if let Some(event) = event {
            self.on_timer_event(event);
        }
    }

    fn on_timer_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Stopped(timing) => self.record_timing(timing),
            TimerEvent::Started => self.notice = None,
            TimerEvent::Armed | TimerEvent::Aborted | TimerEvent::Split { .. } => {}
        }
    }

    fn record_timing(&mut self, timing: CompletedTiming) {
        let solve = Solve::new(timing.total_ms, self.scramble.clone(), timing.splits);
        self.add_solve(solve);
    }

    fn add_solve(&mut self, solve: Solve) {
        match self.store.add_solve(solve) {
            Ok(()) => {
                self.selected_solve = 0;
                self.next_scramble();
            }
            Err(err) => self.report("saving solve failed", err),
        }
    }

    pub fn next_scramble(&mut self) {
        self.scramble = self.scrambler.generate(self.settings.event);
    }

    fn report(&mut self, what: &str, err: crate::error::CubikError) {
        warn!(%err, "{what}");
        self.notice = Some(format!("{what}: {err}"));
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Backspace => {
                form.input.pop();
                form.error = None;
            }
            KeyCode::Char(c) => {
                form.input.push(c);
                form.error = None;
            }
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let result = match form.kind {
            FormKind::ManualEntry => self.add_manual_time(&form.input),
            FormKind::NewSession => self.create_session(&form.input).map(|_| ()),
            FormKind::RenameSession => {
                let id = self.session_at(self.selected_session).id.clone();
                self.rename_session(&id, &form.input)
            }
        };
        if let Err(err) = result {
            self.form = Some(Form {
                error: Some(err.to_string()),
                ..form
            });
        }
    }

    /// Records a typed time against the current scramble
    pub fn add_manual_time(&mut self, input: &str) -> Result<()> {
        let (time_ms, status) = parse_time_input(input)?;
        let solve = Solve::new(time_ms, self.scramble.clone(), vec![]).with_status(status);
        self.store.add_solve(solve)?;
        self.selected_solve = 0;
        self.next_scramble();
        Ok(())
    }

    /// Creates a session with the default graphs from settings and switches to it
    pub fn create_session(&mut self, name: &str) -> Result<String> {
        let name = non_empty_name(name)?;
        let id = self.store.add_session(name)?;
        self.store.update_session(
            &id,
            SessionPatch {
                graphs: Some(self.settings.default_graphs.clone()),
                ..SessionPatch::default()
            },
        )?;
        self.after_session_change();
        Ok(id)
    }

    pub fn rename_session(&mut self, id: &str, name: &str) -> Result<()> {
        let name = non_empty_name(name)?;
        self.store.rename_session(id, name)
    }

    /// Switches to the session named `name`, creating it when missing
    pub fn select_session_by_name(&mut self, name: &str) -> Result<()> {
        let existing = self.store.find_by_name(name).map(|s| s.id.clone());
        match existing {
            Some(id) => {
                self.store.switch(&id)?;
                self.after_session_change();
            }
            None => {
                self.create_session(name)?;
            }
        }
        Ok(())
    }

    fn after_session_change(&mut self) {
        self.selected_solve = 0;
        self.show_detail = false;
        self.selected_graph = 0;
        self.selected_session = self
            .store
            .sessions()
            .iter()
            .position(|s| s.id == self.store.current().id)
            .unwrap_or(0);
        let config = self.effective().timer;
        self.timer.set_config(config);
    }

    fn session_at(&self, idx: usize) -> &Session {
        let sessions = self.store.sessions();
        &sessions[idx.min(sessions.len() - 1)]
    }

    fn open_form(&mut self, kind: FormKind, input: impl Into<String>) {
        self.form = Some(Form::new(kind, input));
    }

    fn handle_timer_view_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.shutdown();
                return Control::Quit;
            }
            KeyCode::Char('s') => self.view = View::Solves,
            KeyCode::Char('e') => {
                self.selected_session = self
                    .store
                    .sessions()
                    .iter()
                    .position(|s| s.id == self.store.current().id)
                    .unwrap_or(0);
                self.view = View::Sessions;
            }
            KeyCode::Char('o') => self.view = View::Settings,
            KeyCode::Char('g') => self.view = View::Graph,
            KeyCode::Char('m') => self.open_form(FormKind::ManualEntry, ""),
            KeyCode::Char('n') => self.next_scramble(),
            KeyCode::Char('2') => self.set_latest_status(SolveStatus::Plus2),
            KeyCode::Char('d') => self.set_latest_status(SolveStatus::Dnf),
            _ => {}
        }
        Control::Continue
    }

    fn set_latest_status(&mut self, status: SolveStatus) {
        let Some(latest) = self.session().solves.first() else {
            return;
        };
        // pressing the same penalty again clears it
        let status = if latest.status == status {
            SolveStatus::Ok
        } else {
            status
        };
        let id = latest.id.clone();
        if let Err(err) = self.store.update_solve(&id, SolvePatch::status(status)) {
            self.report("updating solve failed", err);
        }
    }

    pub fn selected_solve(&self) -> Option<&Solve> {
        self.session().solves.get(self.selected_solve)
    }

    fn handle_solves_key(&mut self, key: KeyEvent) {
        let count = self.session().solves.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => {
                if self.show_detail {
                    self.show_detail = false;
                } else {
                    self.view = View::Timer;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_solve = self.selected_solve.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_solve + 1 < count {
                    self.selected_solve += 1;
                }
            }
            KeyCode::PageUp => self.selected_solve = self.selected_solve.saturating_sub(10),
            KeyCode::PageDown => {
                self.selected_solve = (self.selected_solve + 10).min(count.saturating_sub(1));
            }
            KeyCode::Home => self.selected_solve = 0,
            KeyCode::Enter => self.show_detail = !self.show_detail && count > 0,
            KeyCode::Char('o') => self.set_selected_status(SolveStatus::Ok),
            KeyCode::Char('2') | KeyCode::Char('p') => self.set_selected_status(SolveStatus::Plus2),
            KeyCode::Char('d') => self.set_selected_status(SolveStatus::Dnf),
            KeyCode::Delete | KeyCode::Char('x') => self.delete_selected_solve(),
            _ => {}
        }
    }

    fn set_selected_status(&mut self, status: SolveStatus) {
        let Some(id) = self.selected_solve().map(|s| s.id.clone()) else {
            return;
        };
        if let Err(err) = self.store.update_solve(&id, SolvePatch::status(status)) {
            self.report("updating solve failed", err);
        }
    }

    fn delete_selected_solve(&mut self) {
        let Some(id) = self.selected_solve().map(|s| s.id.clone()) else {
            return;
        };
        match self.store.delete_solve(&id) {
            Ok(()) => {
                let count = self.session().solves.len();
                self.selected_solve = self.selected_solve.min(count.saturating_sub(1));
                if count == 0 {
                    self.show_detail = false;
                }
            }
            Err(err) => self.report("deleting solve failed", err),
        }
    }

    fn handle_sessions_key(&mut self, key: KeyEvent) {
        let count = self.store.sessions().len();
        if key.code != KeyCode::Char('x') {
            self.confirm_delete = None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Timer,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_session = self.selected_session.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_session + 1 < count {
                    self.selected_session += 1;
                }
            }
            KeyCode::Enter => {
                let id = self.session_at(self.selected_session).id.clone();
                match self.store.switch(&id) {
                    Ok(()) => {
                        self.after_session_change();
                        self.view = View::Timer;
                    }
                    Err(err) => self.report("switching session failed", err),
                }
            }
            KeyCode::Char('a') => self.open_form(FormKind::NewSession, ""),
            KeyCode::Char('r') => {
                let name = self.session_at(self.selected_session).name.clone();
                self.open_form(FormKind::RenameSession, name);
            }
            KeyCode::Char('x') => {
                let id = self.session_at(self.selected_session).id.clone();
                if self.confirm_delete.as_deref() == Some(id.as_str()) {
                    self.confirm_delete = None;
                    match self.store.delete_session(&id) {
                        Ok(()) => self.after_session_change(),
                        Err(err) => self.report("deleting session failed", err),
                    }
                } else {
                    self.notice = Some("press x again to delete this session".to_string());
                    self.confirm_delete = Some(id);
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let rows = SettingRow::all();
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Timer,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_setting = self.selected_setting.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_setting + 1 < rows.len() {
                    self.selected_setting += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('-') => self.adjust_selected_setting(-1),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Enter | KeyCode::Char(' ') => {
                self.adjust_selected_setting(1)
            }
            _ => {}
        }
    }

    fn adjust_selected_setting(&mut self, delta: i64) {
        let Some(row) = SettingRow::all().get(self.selected_setting).copied() else {
            return;
        };
        if let Err(err) = self.adjust_setting(row, delta) {
            self.report("saving settings failed", err);
        }
    }

    /// Changes one setting row. Timer and stats rows edit the session's own
    /// values while its override is switched on.
    pub fn adjust_setting(&mut self, row: SettingRow, delta: i64) -> Result<()> {
        let session_id = self.session().id.clone();
        let mut overrides = self.session().overrides.clone();
        let global_timer = SessionTimer {
            precision: self.settings.precision,
            hold_to_start_ms: self.settings.hold_to_start_ms,
            phases: self.settings.phases,
        };

        let mut settings_changed = false;
        let mut overrides_changed = false;
        match row {
            SettingRow::Precision | SettingRow::Hold | SettingRow::Phases => {
                let mut timer = match overrides.session_timer {
                    Some(t) if overrides.use_session_timer => t,
                    _ => global_timer,
                };
                match row {
                    SettingRow::Precision => timer.precision = timer.precision.next(),
                    SettingRow::Hold => {
                        timer.hold_to_start_ms = (timer.hold_to_start_ms + delta * HOLD_STEP_MS).max(0)
                    }
                    _ => timer.phases = (timer.phases + delta).clamp(1, MAX_PHASES),
                }
                if overrides.use_session_timer {
                    overrides.session_timer = Some(timer);
                    overrides_changed = true;
                } else {
                    self.settings.precision = timer.precision;
                    self.settings.hold_to_start_ms = timer.hold_to_start_ms;
                    self.settings.phases = timer.phases;
                    settings_changed = true;
                }
            }
            SettingRow::Event => {
                self.settings.event = self.settings.event.next();
                self.next_scramble();
                settings_changed = true;
            }
            SettingRow::Data(field) => {
                if overrides.use_session_data {
                    overrides
                        .data_shown
                        .get_or_insert(self.settings.data_shown)
                        .toggle(field);
                    overrides_changed = true;
                } else {
                    self.settings.data_shown.toggle(field);
                    settings_changed = true;
                }
            }
            SettingRow::SessionTimer => {
                overrides.use_session_timer = !overrides.use_session_timer;
                overrides.session_timer.get_or_insert(global_timer);
                overrides_changed = true;
            }
            SettingRow::SessionData => {
                overrides.use_session_data = !overrides.use_session_data;
                overrides.data_shown.get_or_insert(self.settings.data_shown);
                if overrides.data_order.is_none() {
                    overrides.data_order = Some(self.settings.data_order.clone());
                }
                overrides_changed = true;
            }
        }

        if settings_changed {
            self.config_store.save(&self.settings)?;
        }
        if overrides_changed {
            self.store.update_session(
                &session_id,
                SessionPatch {
                    overrides: Some(overrides),
                    ..SessionPatch::default()
                },
            )?;
        }
        let config = self.effective().timer;
        self.timer.set_config(config);
        Ok(())
    }

    /// Current value of a setting row, as shown on the settings screen
    pub fn setting_value(&self, row: SettingRow) -> String {
        let eff = self.effective();
        let overrides = &self.session().overrides;
        let on_off = |b: bool| (if b { "on" } else { "off" }).to_string();
        match row {
            SettingRow::Precision => eff.precision.label().to_string(),
            SettingRow::Hold => format!("{} ms", eff.timer.hold_to_start_ms),
            SettingRow::Phases => eff.timer.phases.to_string(),
            SettingRow::Event => format!("{} ({})", self.settings.event, self.settings.event.id()),
            SettingRow::Data(field) => on_off(eff.data_shown.get(field)),
            SettingRow::SessionTimer => on_off(overrides.use_session_timer),
            SettingRow::SessionData => on_off(overrides.use_session_data),
        }
    }

    pub fn graphs(&self) -> &[GraphConfig] {
        &self.session().graphs
    }

    fn handle_graph_key(&mut self, key: KeyEvent) {
        let count = self.graphs().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Timer,
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_graph = self.selected_graph.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected_graph + 1 < count {
                    self.selected_graph += 1;
                }
            }
            KeyCode::Char('k') => self.cycle_graph(|g| g.kind = cycle(&GRAPH_KINDS, g.kind)),
            KeyCode::Char('w') => self.cycle_graph(|g| g.last = cycle(&GRAPH_WINDOWS, g.last)),
            _ => {}
        }
    }

    fn cycle_graph(&mut self, change: impl FnOnce(&mut GraphConfig)) {
        let mut graphs = self.graphs().to_vec();
        let Some(graph) = graphs.get_mut(self.selected_graph) else {
            return;
        };
        change(graph);
        let id = self.session().id.clone();
        let patch = SessionPatch {
            graphs: Some(graphs),
            ..SessionPatch::default()
        };
        if let Err(err) = self.store.update_session(&id, patch) {
            self.report("saving graph failed", err);
        }
    }
}

/// Next value after `current` in `options`, wrapping; the first option when
/// `current` is not listed.
fn cycle(options: &[usize], current: usize) -> usize {
    options
        .iter()
        .position(|&o| o == current)
        .map(|i| options[(i + 1) % options.len()])
        .unwrap_or(options[0])
}

fn non_empty_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::error::CubikError::InvalidName);
    }
    Ok(name)
}

/// Plain-text statistics for `--summary`
pub fn session_summary(session: &Session, settings: &Settings) -> String {
    let eff = settings.effective(session);
    let dp = eff.precision.at_least_2dp();
    let solves = &session.solves;

    let mut out = format!("{} ({} solves)\n", session.name, solves.len());
    out.push_str(&format!(
        "mean {}  sd {}\n",
        format_stat(session_mean(solves), dp),
        format_stat(session_std_dev(solves), dp)
    ));
    for line in eff.stat_keys.iter().map(|&key| stat_line(solves, key)) {
        out.push_str(&format!(
            "{:<6} current {:>9}  best {:>9}\n",
            line.key.to_string(),
            format_stat(line.current, dp),
            format_stat(line.best, dp)
        ));
    }
    if eff.data_shown.predict {
        match predict_next_ao5(solves) {
            Some(p) => out.push_str(&format!(
                "next AO5 between {} and {}\n",
                format_stat(Some(p.min_ms), dp),
                format_stat(Some(p.max_ms), dp)
            )),
            None => out.push_str("next AO5: need 4 valid solves\n"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble::RandomMoveScrambler;
    use crate::store::{FirstRun, SqliteStore};
    use crossterm::event::{MouseButton, MouseEventKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryConfig(Rc<RefCell<Option<Settings>>>);

    impl ConfigStore for MemoryConfig {
        fn load(&self) -> Settings {
            self.0.borrow().clone().unwrap_or_default()
        }

        fn save(&self, settings: &Settings) -> Result<()> {
            *self.0.borrow_mut() = Some(settings.clone());
            Ok(())
        }
    }

    fn test_app(releases: bool) -> (App, MemoryConfig) {
        let config = MemoryConfig::default();
        let store = SqliteStore::open_in_memory(FirstRun::DefaultOnly).unwrap();
        let app = App::new(
            Settings::default(),
            Box::new(config.clone()),
            Box::new(store),
            Box::new(RandomMoveScrambler::seeded(1)),
            releases,
        );
        (app, config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_kind(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn hold_release_and_stop_records_a_solve() {
        let (mut app, _) = test_app(true);
        let t0 = Instant::now();
        let first_scramble = app.scramble.clone();

        app.handle_key(key_kind(KeyCode::Char(' '), KeyEventKind::Press), t0);
        app.on_tick(t0 + ms(600));
        assert_eq!(app.timer.state(), TimerState::Ready);
        app.handle_key(key_kind(KeyCode::Char(' '), KeyEventKind::Release), t0 + ms(600));
        assert!(app.timer.is_running());

        app.handle_key(key_kind(KeyCode::Char('a'), KeyEventKind::Press), t0 + ms(12_945));
        assert!(!app.timer.is_running());

        let solves = &app.session().solves;
        assert_eq!(solves.len(), 1);
        assert_eq!(solves[0].time_ms, 12_345);
        assert_eq!(solves[0].scramble, first_scramble);
        assert_ne!(app.scramble, first_scramble);
    }

    #[test]
    fn short_hold_records_nothing() {
        let (mut app, _) = test_app(true);
        let t0 = Instant::now();
        app.handle_key(key_kind(KeyCode::Char(' '), KeyEventKind::Press), t0);
        app.handle_key(key_kind(KeyCode::Char(' '), KeyEventKind::Release), t0 + ms(400));
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert!(app.session().solves.is_empty());
    }

    #[test]
    fn legacy_terminal_taps_to_start() {
        let (mut app, _) = test_app(false);
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char(' ')), t0);
        assert!(app.timer.is_running());
        app.handle_key(key(KeyCode::Char(' ')), t0 + ms(9_000));
        assert_eq!(app.session().solves[0].time_ms, 9_000);
    }

    #[test]
    fn mouse_hold_starts_timer() {
        let (mut app, _) = test_app(true);
        let t0 = Instant::now();
        let mouse = |kind| MouseEvent {
            kind,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left)), t0);
        app.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left)), t0 + ms(700));
        assert!(app.timer.is_running());
        app.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Right)), t0 + ms(5_700));
        assert_eq!(app.session().solves[0].time_ms, 5_000);
    }

    #[test]
    fn ctrl_c_quits_and_discards_running_timing() {
        let (mut app, _) = test_app(false);
        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Char(' ')), t0);
        let quit = app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            t0 + ms(1_000),
        );
        assert_eq!(quit, Control::Quit);
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert!(app.session().solves.is_empty());
    }

    #[test]
    fn manual_entry_form() {
        let (mut app, _) = test_app(true);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('m')), now);
        assert_eq!(app.focus(), Focus::Form);
        // space goes to the form, not the timer
        for c in "12.34+".chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
        app.handle_key(key(KeyCode::Enter), now);
        assert!(app.form.is_none());
        let solve = &app.session().solves[0];
        assert_eq!(solve.time_ms, 12_340);
        assert_eq!(solve.status, SolveStatus::Plus2);
    }

    #[test]
    fn invalid_manual_entry_keeps_form_open() {
        let (mut app, _) = test_app(true);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('m')), now);
        for c in "-1".chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
        app.handle_key(key(KeyCode::Enter), now);
        let form = app.form.as_ref().unwrap();
        assert!(form.error.is_some());
        assert!(app.session().solves.is_empty());
    }

    #[test]
    fn solves_screen_edits_status_and_deletes() {
        let (mut app, _) = test_app(true);
        app.add_manual_time("10.00").unwrap();
        app.add_manual_time("11.00").unwrap();
        let now = Instant::now();

        app.handle_key(key(KeyCode::Char('s')), now);
        assert_eq!(app.view, View::Solves);
        app.handle_key(key(KeyCode::Down), now);
        app.handle_key(key(KeyCode::Char('d')), now);
        assert_eq!(app.session().solves[1].status, SolveStatus::Dnf);

        app.handle_key(key(KeyCode::Char('x')), now);
        assert_eq!(app.session().solves.len(), 1);
        assert_eq!(app.selected_solve, 0);
        app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(app.view, View::Timer);
    }

    #[test]
    fn latest_penalty_toggles() {
        let (mut app, _) = test_app(true);
        app.add_manual_time("10.00").unwrap();
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('2')), now);
        assert_eq!(app.session().solves[0].status, SolveStatus::Plus2);
        app.handle_key(key(KeyCode::Char('2')), now);
        assert_eq!(app.session().solves[0].status, SolveStatus::Ok);
    }

    #[test]
    fn session_workflow() {
        let (mut app, _) = test_app(true);
        let id = app.create_session("OH").unwrap();
        assert_eq!(app.session().id, id);
        assert!(app.create_session("  ").is_err());

        app.select_session_by_name("default").unwrap();
        assert_eq!(app.session().name, "Default");
        app.select_session_by_name("Feet").unwrap();
        assert_eq!(app.session().name, "Feet");
        assert_eq!(app.store.sessions().len(), 3);

        app.select_session_by_name(" oh ").unwrap();
        assert_eq!(app.session().id, id);
        assert_eq!(app.store.sessions().len(), 3);
    }

    #[test]
    fn oversized_manual_time_is_rejected_in_form() {
        let (mut app, _) = test_app(true);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('m')), now);
        for c in "999999999999999999:00".chars() {
            app.handle_key(key(KeyCode::Char(c)), now);
        }
        app.handle_key(key(KeyCode::Enter), now);

        let form = app.form.as_ref().unwrap();
        assert!(form.error.as_deref().unwrap().starts_with("invalid time"));
        assert!(app.session().solves.is_empty());
    }

    #[test]
    fn session_delete_needs_confirmation() {
        let (mut app, _) = test_app(true);
        app.create_session("Temp").unwrap();
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('e')), now);
        assert_eq!(app.view, View::Sessions);
        app.handle_key(key(KeyCode::Char('x')), now);
        assert_eq!(app.store.sessions().len(), 2);
        app.handle_key(key(KeyCode::Char('x')), now);
        assert_eq!(app.store.sessions().len(), 1);
    }

    #[test]
    fn settings_are_saved_and_applied() {
        let (mut app, config) = test_app(true);
        app.adjust_setting(SettingRow::Hold, -1).unwrap();
        app.adjust_setting(SettingRow::Phases, 1).unwrap();
        assert_eq!(app.timer.config().hold_to_start_ms, 400);
        assert_eq!(app.timer.config().phases, 2);
        assert_eq!(config.load().hold_to_start_ms, 400);

        for _ in 0..10 {
            app.adjust_setting(SettingRow::Hold, -1).unwrap();
        }
        assert_eq!(app.settings.hold_to_start_ms, 0);
    }

    #[test]
    fn session_timer_override() {
        let (mut app, config) = test_app(true);
        app.adjust_setting(SettingRow::SessionTimer, 1).unwrap();
        app.adjust_setting(SettingRow::Phases, 1).unwrap();
        assert_eq!(app.effective().timer.phases, 2);
        // global settings untouched
        assert_eq!(config.load().phases, 1);
        assert_eq!(app.setting_value(SettingRow::SessionTimer), "on");
    }

    #[test]
    fn graph_cycling_persists() {
        let (mut app, _) = test_app(true);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('g')), now);
        app.handle_key(key(KeyCode::Char('k')), now);
        assert_eq!(app.graphs()[0].kind, 3);
        app.handle_key(key(KeyCode::Char('w')), now);
        assert_eq!(app.graphs()[0].last, 100);
    }

    #[test]
    fn cycle_wraps_and_recovers() {
        assert_eq!(cycle(&GRAPH_KINDS, 100), 1);
        assert_eq!(cycle(&GRAPH_KINDS, 7), 1);
    }

    #[test]
    fn readout_follows_precision() {
        let (mut app, _) = test_app(false);
        let t0 = Instant::now();
        assert_eq!(app.readout(t0), "0.00");
        app.handle_key(key(KeyCode::Char(' ')), t0);
        assert_eq!(app.readout(t0 + ms(1_234)), "1.23");
        app.settings.precision = crate::format::Precision::NoLive;
        assert_eq!(app.readout(t0 + ms(1_234)), "solve");
    }

    #[test]
    fn summary_lists_stats() {
        let mut session = Session::with_id("x", "Main");
        session.solves = [12_000, 11_000, 10_000, 13_000, 9_000]
            .into_iter()
            .map(|ms| Solve::new(ms, "", vec![]))
            .collect();
        let text = session_summary(&session, &Settings::default());
        assert!(text.starts_with("Main (5 solves)"));
        assert!(text.contains("mean 11.00"));
        assert!(text.contains("AO5"));
        assert!(text.contains("11.00"));
    }
}
