//! What the next solve can do to the average of 5.
//!
//! Works on the four most recent resolved times. With those sorted as
//! `[a, b, c, d]` the next AO5 lies between `(a+b+c)/3` (new solve is the
//! best and gets dropped) and `(b+c+d)/3` (new solve is the worst).

use crate::solve::Solve;
use crate::stats::effective;

/// Number of targets listed under the min/max range
pub const TARGET_COUNT: usize = 5;

/// Cap on the 0.1s grid before targets are picked
const MAX_TICKS: usize = 12;

/// Time the next solve needs to reach one target average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetNeed {
    /// Target average in milliseconds, always a multiple of 100
    pub target_ms: u64,
    /// `None` when the required time is not faster than the current worst
    pub needed_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ao5Prediction {
    /// The four times used, ascending
    pub sorted: [u64; 4],
    pub min_ms: f64,
    pub max_ms: f64,
    /// Time needed to land exactly on `min_ms`
    pub best_needed_ms: u64,
    pub targets: Vec<TargetNeed>,
}

impl Ao5Prediction {
    pub fn from_times(last4: [u64; 4]) -> Self {
        let mut sorted = last4;
        sorted.sort_unstable();
        let [a, b, c, d] = sorted;

        let min_ms = (a as f64 + b as f64 + c as f64) / 3.0;
        let max_ms = (b as f64 + c as f64 + d as f64) / 3.0;

        let targets = pick_target_tenths(min_ms, max_ms)
            .into_iter()
            .map(|tenths| {
                let target_ms = tenths * 100;
                let needed = needed_for(target_ms as f64, b, c);
                TargetNeed {
                    target_ms,
                    needed_ms: (needed < d).then_some(needed),
                }
            })
            .collect();

        Self {
            sorted,
            min_ms,
            max_ms,
            best_needed_ms: needed_for(min_ms, b, c),
            targets,
        }
    }
}

/// Prediction from the four most recent resolved solves, newest first.
///
/// DNFs between them are skipped. `None` until four resolved times exist.
pub fn predict_next_ao5(solves: &[Solve]) -> Option<Ao5Prediction> {
    let last4 = solves.iter().filter_map(effective).take(4).collect::<Vec<u64>>();
    let last4: [u64; 4] = last4.try_into().ok()?;
    Some(Ao5Prediction::from_times(last4))
}

/// Next time that puts the average at `target`, if it lands between the
/// two middle values: `3*target - b - c`, floored at zero.
fn needed_for(target_ms: f64, b: u64, c: u64) -> u64 {
    let needed = (target_ms * 3.0 - b as f64 - c as f64).floor();
    if needed <= 0.0 {
        0
    } else {
        needed as u64
    }
}

/// Targets in tenths of a second.
///
/// Starts at the first 0.1s tick at or above `min_ms`, spans at least half
/// a second, keeps the next .5 and whole second when they fall in range, and
/// returns the lowest five.
fn pick_target_tenths(min_ms: f64, max_ms: f64) -> Vec<u64> {
    let start = (min_ms / 100.0).ceil().max(0.0) as u64;
    let end = ((max_ms / 100.0).ceil().max(0.0) as u64).max(start + 4);

    let mut ticks = (start..=end).take(MAX_TICKS).collect::<Vec<u64>>();

    let next_half = (start / 10) * 10 + 5;
    if (start..=end).contains(&next_half) {
        ticks.push(next_half);
    }
    let next_whole = start.div_ceil(10) * 10;
    if (start..=end).contains(&next_whole) {
        ticks.push(next_whole);
    }

    ticks.sort_unstable();
    ticks.dedup();
    ticks.truncate(TARGET_COUNT);

    while ticks.len() < TARGET_COUNT {
        let next = ticks.last().map_or(start, |last| last + 1);
        ticks.push(next);
    }
    ticks
}
