use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

/// Without release events a held Space arrives as a stream of presses.
/// Presses closer together than this are treated as auto-repeat.
pub const LEGACY_REPEAT_GUARD: Duration = Duration::from_millis(600);

/// Where keyboard input is going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Timer,
    /// A text field or dialog owns the keyboard
    Form,
}

/// Signals the timer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    HoldStart,
    HoldEnd,
    Stop,
    /// Press-to-start for terminals that never report key releases
    Tap,
}

/// Maps terminal key and mouse events onto timer signals.
///
/// Space and the left mouse button are the start controls. While running,
/// any key or button press stops. The input that stopped the timer is
/// swallowed until its release arrives so a held key cannot re-arm.
#[derive(Debug, Clone)]
pub struct InputArbiter {
    releases_reported: bool,
    swallow_key: bool,
    swallow_mouse: bool,
    last_space_press: Option<Instant>,
}

impl InputArbiter {
    pub fn new(releases_reported: bool) -> Self {
        Self {
            releases_reported,
            swallow_key: false,
            swallow_mouse: false,
            last_space_press: None,
        }
    }

    pub fn classify_key(
        &mut self,
        key: &KeyEvent,
        focus: Focus,
        running: bool,
        now: Instant,
    ) -> Option<TimerSignal> {
        if focus == Focus::Form {
            return None;
        }

        match key.kind {
            KeyEventKind::Release => {
                if self.swallow_key {
                    self.swallow_key = false;
                    return None;
                }
                (!running && key.code == KeyCode::Char(' ')).then_some(TimerSignal::HoldEnd)
            }
            KeyEventKind::Repeat => None,
            KeyEventKind::Press => {
                if self.releases_reported {
                    self.classify_press(key, running)
                } else {
                    self.classify_legacy_press(key, running, now)
                }
            }
        }
    }

    fn classify_press(&mut self, key: &KeyEvent, running: bool) -> Option<TimerSignal> {
        if running {
            self.swallow_key = true;
            return Some(TimerSignal::Stop);
        }
        if self.swallow_key {
            return None;
        }
        (key.code == KeyCode::Char(' ')).then_some(TimerSignal::HoldStart)
    }

    fn classify_legacy_press(
        &mut self,
        key: &KeyEvent,
        running: bool,
        now: Instant,
    ) -> Option<TimerSignal> {
        if key.code != KeyCode::Char(' ') {
            return running.then_some(TimerSignal::Stop);
        }

        let repeated = self
            .last_space_press
            .is_some_and(|last| now.saturating_duration_since(last) < LEGACY_REPEAT_GUARD);
        self.last_space_press = Some(now);
        if repeated {
            return None;
        }

        Some(if running {
            TimerSignal::Stop
        } else {
            TimerSignal::Tap
        })
    }

    pub fn classify_mouse(
        &mut self,
        mouse: &MouseEvent,
        focus: Focus,
        running: bool,
    ) -> Option<TimerSignal> {
        if focus == Focus::Form {
            return None;
        }

        match mouse.kind {
            MouseEventKind::Down(button) => {
                if running {
                    self.swallow_mouse = true;
                    Some(TimerSignal::Stop)
                } else if self.swallow_mouse {
                    None
                } else {
                    (button == MouseButton::Left).then_some(TimerSignal::HoldStart)
                }
            }
            MouseEventKind::Up(button) => {
                if self.swallow_mouse {
                    self.swallow_mouse = false;
                    None
                } else {
                    (!running && button == MouseButton::Left).then_some(TimerSignal::HoldEnd)
                }
            }
            _ => None,
        }
    }
}
