//! Statistics over a newest-first solve history.
//!
//! Everything here is a pure function of the history slice. Index 0 is the
//! most recent solve and "a window of n" always means n consecutive
//! positions, whatever their status. DNFs keep their position but never
//! contribute a value.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::CubikError;
use crate::solve::Solve;
use crate::util::{mean_ms, std_dev};

/// Effective time of a solve. The single place the DNF/+2 rule is applied.
pub fn effective(solve: &Solve) -> Option<u64> {
    solve.effective_ms()
}

/// Resolved effective times, DNFs removed, order preserved
pub fn resolved(solves: &[Solve]) -> Vec<u64> {
    solves.iter().filter_map(effective).collect()
}

pub fn best_single(solves: &[Solve]) -> Option<u64> {
    solves.iter().filter_map(effective).min()
}

/// Sort ascending, drop `drop` values from each end and average the rest.
///
/// The drop saturates at the midpoint, so a short list yields `None` rather
/// than a negative slice.
pub fn trimmed_mean(values: &[u64], drop: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = values.iter().copied().sorted_unstable().collect::<Vec<u64>>();
    let start = drop.min(sorted.len());
    let end = sorted.len().saturating_sub(drop).max(start);
    mean_ms(&sorted[start..end])
}

/// Window size and number of values trimmed from each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AverageSpec {
    pub n: usize,
    pub drop: usize,
    /// Labelled `MO<n>` rather than `AO<n>`. Only affects display, but keys
    /// with different labels stay distinct.
    pub mean: bool,
}

impl AverageSpec {
    pub const MO3: AverageSpec = AverageSpec { n: 3, drop: 0, mean: true };
    pub const AO5: AverageSpec = AverageSpec { n: 5, drop: 1, mean: false };
    pub const AO12: AverageSpec = AverageSpec { n: 12, drop: 1, mean: false };

    pub fn new(n: usize, drop: usize) -> Self {
        Self { n, drop, mean: false }
    }

    /// Drop rule: none for MO3, one each end for AO5/AO12, otherwise the
    /// floored 5% from each end. A window of 3 is the mean of 3.
    pub fn for_window(n: usize) -> Self {
        let drop = match n {
            3 => 0,
            5 | 12 => 1,
            _ => n / 20,
        };
        Self { n, drop, mean: n == 3 }
    }

    /// Fewest resolved values a window may hold and still produce an average
    pub fn min_resolved(&self) -> usize {
        self.n.saturating_sub(self.drop * 2)
    }

    pub fn label(&self) -> String {
        if self.mean {
            format!("MO{}", self.n)
        } else {
            format!("AO{}", self.n)
        }
    }
}

impl fmt::Display for AverageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for AverageSpec {
    type Err = CubikError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        if key == "MO3" {
            return Ok(AverageSpec::MO3);
        }
        key.strip_prefix("AO")
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .map(|n| AverageSpec {
                mean: false,
                ..AverageSpec::for_window(n)
            })
            .ok_or_else(|| CubikError::UnknownAverage(s.to_string()))
    }
}

/// One entry of the stats panel: best single or an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Best,
    Average(AverageSpec),
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKey::Best => f.write_str("BEST"),
            StatKey::Average(spec) => write!(f, "{spec}"),
        }
    }
}

impl FromStr for StatKey {
    type Err = CubikError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("BEST") {
            Ok(StatKey::Best)
        } else {
            s.parse().map(StatKey::Average)
        }
    }
}

/// Average of one window, or `None` when too many DNFs sit inside it.
///
/// DNFs are filtered out before trimming, so the drop count applies to the
/// resolved values only. Strict competition rules would count DNFs as the
/// worst results instead; this keeps the behaviour existing histories were
/// computed with.
pub fn window_average(window: &[Solve], spec: AverageSpec) -> Option<f64> {
    let values = resolved(window);
    if values.len() < spec.min_resolved() {
        return None;
    }
    trimmed_mean(&values, spec.drop)
}

/// Average of the `n` most recent solves
pub fn current_average(solves: &[Solve], spec: AverageSpec) -> Option<f64> {
    if spec.n == 0 || solves.len() < spec.n {
        return None;
    }
    window_average(&solves[..spec.n], spec)
}

/// Every contiguous window of the history, newest window first
pub fn window_averages(solves: &[Solve], spec: AverageSpec) -> Vec<Option<f64>> {
    if spec.n == 0 {
        return Vec::new();
    }
    solves
        .windows(spec.n)
        .map(|window| window_average(window, spec))
        .collect()
}

pub fn best_average(solves: &[Solve], spec: AverageSpec) -> Option<f64> {
    window_averages(solves, spec)
        .into_iter()
        .flatten()
        .reduce(f64::min)
}

/// Plain mean of every resolved solve in the session
pub fn session_mean(solves: &[Solve]) -> Option<f64> {
    mean_ms(&resolved(solves))
}

pub fn session_std_dev(solves: &[Solve]) -> Option<f64> {
    let values = resolved(solves)
        .into_iter()
        .map(|v| v as f64)
        .collect::<Vec<f64>>();
    std_dev(&values)
}

/// Current and best value for one stats panel entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatLine {
    pub key: StatKey,
    pub current: Option<f64>,
    pub best: Option<f64>,
}

impl StatLine {
    pub fn is_unavailable(&self) -> bool {
        self.current.is_none() && self.best.is_none()
    }
}

pub fn stat_line(solves: &[Solve], key: StatKey) -> StatLine {
    match key {
        StatKey::Best => StatLine {
            key,
            current: None,
            best: best_single(solves).map(|ms| ms as f64),
        },
        StatKey::Average(spec) => StatLine {
            key,
            current: current_average(solves, spec),
            best: best_average(solves, spec),
        },
    }
}

/// What a trend graph plots: raw singles or a rolling average of n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Singles,
    Rolling(usize),
}

impl SeriesKind {
    /// `1` selects singles, anything larger a rolling average of that size
    pub fn from_type(kind: usize) -> Self {
        if kind <= 1 {
            SeriesKind::Singles
        } else {
            SeriesKind::Rolling(kind)
        }
    }

    pub fn as_type(&self) -> usize {
        match self {
            SeriesKind::Singles => 1,
            SeriesKind::Rolling(n) => *n,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SeriesKind::Singles => "Single".to_string(),
            SeriesKind::Rolling(n) => AverageSpec::for_window(*n).label(),
        }
    }
}

/// Graph series over the `last` most recent solves, oldest point first.
///
/// Unlike the averages above, DNFs are removed from the sequence before
/// windowing, so a rolling window always holds `n` resolved values and the
/// series has no holes.
pub fn series(solves: &[Solve], kind: SeriesKind, last: usize) -> Vec<f64> {
    let take = last.min(solves.len());
    let mut oldest_first = resolved(&solves[..take]);
    oldest_first.reverse();

    match kind {
        SeriesKind::Singles => oldest_first.into_iter().map(|v| v as f64).collect(),
        SeriesKind::Rolling(n) => {
            let spec = AverageSpec::for_window(n);
            oldest_first
                .windows(n)
                .filter_map(|window| trimmed_mean(window, spec.drop))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::SolveStatus;

    fn history(times: &[u64]) -> Vec<Solve> {
        times.iter().map(|&t| Solve::new(t, "", vec![])).collect()
    }

    fn dnf(mut solves: Vec<Solve>, idx: usize) -> Vec<Solve> {
        solves[idx].status = SolveStatus::Dnf;
        solves
    }

    #[test]
    fn best_single_ignores_dnf_and_applies_plus2() {
        let mut solves = history(&[9_000, 12_000, 11_000]);
        solves[0].status = SolveStatus::Dnf;
        solves[2].status = SolveStatus::Plus2;
        assert_eq!(best_single(&solves), Some(12_000));
    }

    #[test]
    fn best_single_none_for_empty_or_all_dnf() {
        assert_eq!(best_single(&[]), None);
        let solves = dnf(dnf(history(&[1, 2]), 0), 1);
        assert_eq!(best_single(&solves), None);
    }

    #[test]
    fn trimmed_mean_drops_both_ends() {
        assert_eq!(trimmed_mean(&[5, 1, 3, 100, 4], 1), Some(4.0));
        assert_eq!(trimmed_mean(&[2, 4], 0), Some(3.0));
    }

    #[test]
    fn trimmed_mean_saturates_at_midpoint() {
        assert_eq!(trimmed_mean(&[1, 2, 3], 2), None);
        assert_eq!(trimmed_mean(&[], 0), None);
    }

    #[test]
    fn average_drop_rules() {
        assert_eq!(AverageSpec::for_window(3), AverageSpec::MO3);
        assert_eq!(AverageSpec::for_window(5), AverageSpec::new(5, 1));
        assert_eq!(AverageSpec::for_window(12), AverageSpec::new(12, 1));
        assert_eq!(AverageSpec::for_window(25), AverageSpec::new(25, 1));
        assert_eq!(AverageSpec::for_window(50), AverageSpec::new(50, 2));
        assert_eq!(AverageSpec::for_window(100), AverageSpec::new(100, 5));
        assert_eq!(AverageSpec::for_window(7), AverageSpec::new(7, 0));
    }

    #[test]
    fn average_parses_labels() {
        assert_eq!("MO3".parse::<AverageSpec>().unwrap(), AverageSpec::MO3);
        assert_eq!("ao12".parse::<AverageSpec>().unwrap(), AverageSpec::AO12);
        assert_eq!("AO100".parse::<AverageSpec>().unwrap().drop, 5);
        assert!("AO".parse::<AverageSpec>().is_err());
        assert!("AO0".parse::<AverageSpec>().is_err());
        assert!("XYZ".parse::<AverageSpec>().is_err());
        assert_eq!("BEST".parse::<StatKey>().unwrap(), StatKey::Best);
        assert_eq!(AverageSpec::AO5.to_string(), "AO5");
        assert_eq!(AverageSpec::MO3.to_string(), "MO3");
    }

    #[test]
    fn parsed_ao3_keeps_its_label() {
        let ao3 = "AO3".parse::<AverageSpec>().unwrap();
        assert_eq!(ao3.to_string(), "AO3");
        assert_eq!((ao3.n, ao3.drop), (3, 0));
        assert_ne!(ao3, AverageSpec::MO3);
        assert_eq!("ao3".parse::<StatKey>().unwrap().to_string(), "AO3");

        let solves = history(&[10_000, 11_000, 12_000]);
        assert_eq!(current_average(&solves, ao3), current_average(&solves, AverageSpec::MO3));
    }

    #[test]
    fn current_average_none_when_history_short() {
        let solves = history(&[10_000, 11_000, 12_000, 13_000]);
        assert_eq!(current_average(&solves, AverageSpec::AO5), None);
    }

    #[test]
    fn mo3_is_plain_mean() {
        let solves = history(&[10_000, 11_000, 15_000, 1_000]);
        assert_eq!(current_average(&solves, AverageSpec::MO3), Some(12_000.0));
    }

    #[test]
    fn mo3_with_dnf_is_none() {
        let solves = dnf(history(&[10_000, 11_000, 15_000, 1_000]), 1);
        assert_eq!(current_average(&solves, AverageSpec::MO3), None);
    }

    #[test]
    fn ao5_is_mean_of_middle_three() {
        let solves = history(&[12_000, 9_000, 30_000, 10_000, 11_000]);
        assert_eq!(current_average(&solves, AverageSpec::AO5), Some(11_000.0));
    }

    #[test]
    fn ao5_with_one_dnf_prefilters_before_trimming() {
        // resolved [12, 9, 10, 11] -> drop 9 and 12 -> mean(10, 11)
        let solves = dnf(history(&[12_000, 9_000, 30_000, 10_000, 11_000]), 2);
        assert_eq!(current_average(&solves, AverageSpec::AO5), Some(10_500.0));
    }

    #[test]
    fn ao5_with_three_dnfs_is_none() {
        let solves = dnf(dnf(dnf(history(&[1, 2, 3, 4, 5]), 0), 1), 2);
        assert_eq!(current_average(&solves, AverageSpec::AO5), None);
    }

    #[test]
    fn best_average_is_minimum_window() {
        let solves = history(&[20_000, 10_000, 11_000, 12_000, 30_000]);
        let averages = window_averages(&solves, AverageSpec::MO3);
        assert_eq!(
            averages,
            vec![Some(41_000.0 / 3.0), Some(11_000.0), Some(53_000.0 / 3.0)]
        );
        assert_eq!(best_average(&solves, AverageSpec::MO3), Some(11_000.0));
    }

    #[test]
    fn best_average_skips_disqualified_windows() {
        let solves = dnf(history(&[1_000, 10_000, 11_000, 12_000]), 0);
        assert_eq!(window_averages(&solves, AverageSpec::MO3)[0], None);
        assert_eq!(best_average(&solves, AverageSpec::MO3), Some(11_000.0));
    }

    #[test]
    fn best_average_none_without_windows() {
        assert_eq!(best_average(&history(&[1, 2]), AverageSpec::AO5), None);
    }

    #[test]
    fn session_mean_and_deviation() {
        let solves = dnf(history(&[10_000, 99_000, 12_000]), 1);
        assert_eq!(session_mean(&solves), Some(11_000.0));
        assert_eq!(session_std_dev(&solves), Some(1_000.0));
        assert_eq!(session_mean(&[]), None);
    }

    #[test]
    fn stat_line_reports_unavailable() {
        let line = stat_line(&history(&[1_000]), StatKey::Average(AverageSpec::AO5));
        assert!(line.is_unavailable());

        let best = stat_line(&history(&[1_000, 900]), StatKey::Best);
        assert_eq!(best.best, Some(900.0));
        assert_eq!(best.current, None);
    }

    #[test]
    fn singles_series_is_reversed_recent_slice() {
        let solves = history(&[5, 4, 3, 2, 1, 0]);
        assert_eq!(
            series(&solves, SeriesKind::Singles, 5),
            vec![1.0, 2.0, 3.0, 4.0, 5.0]
        );
    }

    #[test]
    fn series_strips_dnfs() {
        let solves = dnf(history(&[5, 4, 3]), 1);
        assert_eq!(series(&solves, SeriesKind::Singles, 10), vec![3.0, 5.0]);
    }

    #[test]
    fn rolling_series_starts_at_first_full_window() {
        // oldest first: 1 2 3 4 -> mo3 windows [1,2,3] and [2,3,4]
        let solves = history(&[4, 3, 2, 1]);
        assert_eq!(
            series(&solves, SeriesKind::Rolling(3), 10),
            vec![2.0, 3.0]
        );
    }

    #[test]
    fn rolling_series_applies_drop_rule() {
        let solves = history(&[1, 100, 10, 20, 30]);
        // oldest first: 30 20 10 100 1 -> ao5 keeps 10 20 30
        assert_eq!(series(&solves, SeriesKind::Rolling(5), 5), vec![20.0]);
    }

    #[test]
    fn series_kind_labels() {
        assert_eq!(SeriesKind::from_type(1), SeriesKind::Singles);
        assert_eq!(SeriesKind::from_type(12).label(), "AO12");
        assert_eq!(SeriesKind::Rolling(3).label(), "MO3");
        assert_eq!(SeriesKind::Singles.label(), "Single");
    }

    #[test]
    fn recomputation_is_stable() {
        let solves = history(&[12_345, 11_111, 13_579, 10_101, 14_141, 9_999]);
        let first = best_average(&solves, AverageSpec::AO5);
        let second = best_average(&solves, AverageSpec::AO5);
        assert_eq!(first.map(f64::to_bits), second.map(f64::to_bits));
    }
}
