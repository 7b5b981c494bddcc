//! Hold-to-start solve timer.
//!
//! The timer is a wall-clock state machine without threads: every input
//! carries the `Instant` it happened at, and the host calls [`Timer::poll`]
//! while holding so the armed state can be shown before release.
//!
//! ```text
//! Idle -> Holding -> Ready -> Running -> Idle
//!            \-> Idle (released early)
//! ```

use std::time::{Duration, Instant};

/// How often the host should poll while holding, at most
pub const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Redraw cadence while running
pub const RUNNING_REFRESH_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub hold_to_start_ms: u64,
    pub phases: u32,
}

impl TimerConfig {
    /// Clamps user-adjustable values: negative hold becomes 0, phases below
    /// one become 1.
    pub fn sanitized(hold_to_start_ms: i64, phases: i64) -> Self {
        Self {
            hold_to_start_ms: hold_to_start_ms.max(0) as u64,
            phases: phases.clamp(1, u32::MAX as i64) as u32,
        }
    }

    fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_to_start_ms)
    }

    /// Number of splits recorded before a stop finalizes
    pub fn max_splits(&self) -> usize {
        self.phases.max(1) as usize - 1
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            hold_to_start_ms: 500,
            phases: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Holding,
    Ready,
    Running,
}

/// A finished timing, handed to the host exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTiming {
    pub total_ms: u64,
    pub splits: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Hold threshold reached; releasing now starts the timer
    Armed,
    /// Released before the threshold, nothing recorded
    Aborted,
    Started,
    Split { index: usize, at_ms: u64 },
    Stopped(CompletedTiming),
}

#[derive(Debug, Clone)]
pub struct Timer {
    config: TimerConfig,
    state: TimerState,
    hold_started_at: Option<Instant>,
    started_at: Option<Instant>,
    splits: Vec<u64>,
    /// Final time of the last completed timing, shown while idle
    last_elapsed_ms: u64,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: TimerState::Idle,
            hold_started_at: None,
            started_at: None,
            splits: Vec::new(),
            last_elapsed_ms: 0,
        }
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    /// Applies from the next signal on.
    pub fn set_config(&mut self, config: TimerConfig) {
        self.config = config;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn splits(&self) -> &[u64] {
        &self.splits
    }

    /// Live elapsed time while running, otherwise the last final time
    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        match self.started_at {
            Some(start) if self.is_running() => duration_ms(now.saturating_duration_since(start)),
            _ => self.last_elapsed_ms,
        }
    }

    /// When a hold in progress becomes ready
    pub fn ready_at(&self) -> Option<Instant> {
        match self.state {
            TimerState::Holding => self
                .hold_started_at
                .map(|start| start + self.config.hold_threshold()),
            _ => None,
        }
    }

    /// Begins a hold. Ignored while running or already holding.
    pub fn hold_start(&mut self, now: Instant) -> Option<TimerEvent> {
        if self.state != TimerState::Idle {
            return None;
        }
        self.state = TimerState::Holding;
        self.hold_started_at = Some(now);
        self.poll(now)
    }

    /// Promotes a hold to ready once the threshold has passed.
    pub fn poll(&mut self, now: Instant) -> Option<TimerEvent> {
        let ready_at = self.ready_at()?;
        if now >= ready_at {
            self.state = TimerState::Ready;
            Some(TimerEvent::Armed)
        } else {
            None
        }
    }

    /// Release of the start control.
    ///
    /// Starts the timer when ready, aborts a hold that is too short, and
    /// acts as a stop signal while running.
    pub fn hold_end(&mut self, now: Instant) -> Option<TimerEvent> {
        match self.state {
            TimerState::Running => self.stop_or_split(now),
            TimerState::Holding => {
                if self.poll(now).is_some() {
                    Some(self.start(now))
                } else {
                    self.reset_hold();
                    Some(TimerEvent::Aborted)
                }
            }
            TimerState::Ready => Some(self.start(now)),
            TimerState::Idle => None,
        }
    }

    fn start(&mut self, now: Instant) -> TimerEvent {
        self.reset_hold();
        self.state = TimerState::Running;
        self.started_at = Some(now);
        self.splits.clear();
        self.last_elapsed_ms = 0;
        TimerEvent::Started
    }

    /// Records a split while phases remain, otherwise finalizes.
    pub fn stop_or_split(&mut self, now: Instant) -> Option<TimerEvent> {
        let start = self.started_at.filter(|_| self.is_running())?;
        if self.splits.len() < self.config.max_splits() {
            let at_ms = duration_ms(now.saturating_duration_since(start));
            self.splits.push(at_ms);
            return Some(TimerEvent::Split {
                index: self.splits.len(),
                at_ms,
            });
        }
        self.finalize(now)
    }

    /// Stops the timer and emits the completed timing. A no-op without an
    /// active start.
    pub fn finalize(&mut self, now: Instant) -> Option<TimerEvent> {
        let start = self.started_at.take().filter(|_| self.is_running())?;
        let total_ms = duration_ms(now.saturating_duration_since(start));
        self.last_elapsed_ms = total_ms;
        self.state = TimerState::Idle;
        self.reset_hold();
        Some(TimerEvent::Stopped(CompletedTiming {
            total_ms,
            splits: std::mem::take(&mut self.splits),
        }))
    }

    /// Press-to-start for hosts that never see a release: starts at once
    /// from idle, otherwise behaves like a stop.
    pub fn tap(&mut self, now: Instant) -> Option<TimerEvent> {
        match self.state {
            TimerState::Idle => Some(self.start(now)),
            TimerState::Running => self.stop_or_split(now),
            TimerState::Holding | TimerState::Ready => self.hold_end(now),
        }
    }

    /// Teardown: drops any hold or running timing without emitting.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.started_at = None;
        self.splits.clear();
        self.reset_hold();
    }

    fn reset_hold(&mut self) {
        if self.state != TimerState::Running {
            self.state = TimerState::Idle;
        }
        self.hold_started_at = None;
    }

    /// How long the host may sleep before the timer needs attention.
    ///
    /// `None` means nothing is pending and the host may idle.
    pub fn wake_after(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Running => Some(RUNNING_REFRESH_INTERVAL),
            TimerState::Holding => Some(
                self.ready_at()
                    .map(|at| at.saturating_duration_since(now))
                    .unwrap_or_default()
                    .min(HOLD_POLL_INTERVAL),
            ),
            TimerState::Idle | TimerState::Ready => None,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis().min(u64::MAX as u128) as u64
}
