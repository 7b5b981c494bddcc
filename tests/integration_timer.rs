use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use cubik::input::{Focus, InputArbiter, TimerSignal};
use cubik::timer::{Timer, TimerConfig, TimerEvent, TimerState};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Feeds one key through the arbiter into the timer, as the app does
fn feed(
    arbiter: &mut InputArbiter,
    timer: &mut Timer,
    code: KeyCode,
    kind: KeyEventKind,
    now: Instant,
) -> Option<TimerEvent> {
    let key = KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind);
    match arbiter.classify_key(&key, Focus::Timer, timer.is_running(), now)? {
        TimerSignal::HoldStart => timer.hold_start(now),
        TimerSignal::HoldEnd => timer.hold_end(now),
        TimerSignal::Stop => timer.stop_or_split(now),
        TimerSignal::Tap => timer.tap(now),
    }
}

#[test]
fn held_stop_key_cannot_rearm() {
    let mut arbiter = InputArbiter::new(true);
    let mut timer = Timer::new(TimerConfig::sanitized(300, 1));
    let t0 = Instant::now();

    feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Press, t0);
    assert_matches!(timer.poll(t0 + ms(300)), Some(TimerEvent::Armed));
    assert_matches!(
        feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Release, t0 + ms(350)),
        Some(TimerEvent::Started)
    );

    // space stops, and its auto-repeat and release are swallowed
    assert_matches!(
        feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Press, t0 + ms(10_350)),
        Some(TimerEvent::Stopped(c)) if c.total_ms == 10_000
    );
    assert_eq!(
        feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Repeat, t0 + ms(10_400)),
        None
    );
    assert_eq!(
        feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Release, t0 + ms(10_900)),
        None
    );
    assert_eq!(timer.state(), TimerState::Idle);

    // a fresh press holds again
    feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Press, t0 + ms(12_000));
    assert_eq!(timer.state(), TimerState::Holding);
}

#[test]
fn phases_split_on_any_key() {
    let mut arbiter = InputArbiter::new(true);
    let mut timer = Timer::new(TimerConfig::sanitized(0, 2));
    let t0 = Instant::now();

    feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Press, t0);
    feed(&mut arbiter, &mut timer, KeyCode::Char(' '), KeyEventKind::Release, t0);
    assert!(timer.is_running());

    assert_matches!(
        feed(&mut arbiter, &mut timer, KeyCode::Enter, KeyEventKind::Press, t0 + ms(4_000)),
        Some(TimerEvent::Split { index: 1, at_ms: 4_000 })
    );
    feed(&mut arbiter, &mut timer, KeyCode::Enter, KeyEventKind::Release, t0 + ms(4_100));
    assert_matches!(
        feed(&mut arbiter, &mut timer, KeyCode::Char('j'), KeyEventKind::Press, t0 + ms(9_000)),
        Some(TimerEvent::Stopped(c)) if c.splits == vec![4_000] && c.total_ms == 9_000
    );
}

#[test]
fn form_focus_never_reaches_the_timer() {
    let mut arbiter = InputArbiter::new(true);
    let key = KeyEvent::new_with_kind(KeyCode::Char(' '), KeyModifiers::NONE, KeyEventKind::Press);
    assert_eq!(
        arbiter.classify_key(&key, Focus::Form, false, Instant::now()),
        None
    );
}

#[test]
fn wake_deadlines_follow_state() {
    let mut timer = Timer::new(TimerConfig::sanitized(500, 1));
    let t0 = Instant::now();
    assert_eq!(timer.wake_after(t0), None);

    timer.hold_start(t0);
    assert_matches!(timer.wake_after(t0), Some(d) if d <= ms(10));
    assert_matches!(timer.hold_end(t0 + ms(100)), Some(TimerEvent::Aborted));
    assert_eq!(timer.wake_after(t0 + ms(100)), None);
}
