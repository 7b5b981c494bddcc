use chrono::Local;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Two-second penalty added to `PLUS2` solves.
pub const PLUS2_PENALTY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolveStatus {
    #[default]
    Ok,
    Plus2,
    Dnf,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Ok => "OK",
            SolveStatus::Plus2 => "PLUS2",
            SolveStatus::Dnf => "DNF",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(SolveStatus::Ok),
            "PLUS2" => Some(SolveStatus::Plus2),
            "DNF" => Some(SolveStatus::Dnf),
            _ => None,
        }
    }

    /// Short label used in lists and detail views
    pub fn badge(&self) -> &'static str {
        match self {
            SolveStatus::Ok => "OK",
            SolveStatus::Plus2 => "+2",
            SolveStatus::Dnf => "DNF",
        }
    }
}

/// A single timed (or manually entered) attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub id: String,
    pub time_ms: u64,
    pub status: SolveStatus,
    pub scramble: String,
    /// Epoch milliseconds. Display only; history order is insertion order.
    pub created_at: i64,
    /// Cumulative split marks, strictly increasing and below `time_ms`.
    #[serde(default)]
    pub splits: Vec<u64>,
}

impl Solve {
    pub fn new(time_ms: u64, scramble: impl Into<String>, splits: Vec<u64>) -> Self {
        let splits = sanitize_splits(time_ms, splits);
        Self {
            id: new_solve_id(),
            time_ms,
            status: SolveStatus::Ok,
            scramble: scramble.into(),
            created_at: Local::now().timestamp_millis(),
            splits,
        }
    }

    pub fn with_status(mut self, status: SolveStatus) -> Self {
        self.status = status;
        self
    }

    /// Comparison-ready time: `None` for DNF, raw + 2s for PLUS2.
    ///
    /// Every statistic composes on top of this; see [`crate::stats::effective`].
    pub fn effective_ms(&self) -> Option<u64> {
        match self.status {
            SolveStatus::Dnf => None,
            SolveStatus::Plus2 => Some(self.time_ms.saturating_add(PLUS2_PENALTY_MS)),
            SolveStatus::Ok => Some(self.time_ms),
        }
    }

    /// Duration of each phase. The last segment runs from the final split to
    /// the end of the solve; a solve without splits has a single segment.
    pub fn segments(&self) -> Vec<u64> {
        if self.splits.is_empty() {
            return vec![self.time_ms];
        }

        let mut segments = Vec::with_capacity(self.splits.len() + 1);
        let mut previous = 0;
        for &mark in &self.splits {
            segments.push(mark.saturating_sub(previous));
            previous = mark;
        }
        segments.push(self.time_ms.saturating_sub(previous));
        segments
    }
}

/// Opaque 8 character id, same shape the session ids use.
pub fn new_solve_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Drops marks that would break the ordering invariant.
fn sanitize_splits(time_ms: u64, splits: Vec<u64>) -> Vec<u64> {
    let mut out: Vec<u64> = Vec::with_capacity(splits.len());
    for mark in splits {
        let increasing = out.last().map_or(true, |&last| mark > last);
        if increasing && mark < time_ms {
            out.push(mark);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_time_follows_status() {
        let solve = Solve::new(10_000, "R U", vec![]);
        assert_eq!(solve.effective_ms(), Some(10_000));

        let plus2 = solve.clone().with_status(SolveStatus::Plus2);
        assert_eq!(plus2.effective_ms(), Some(12_000));

        let dnf = solve.with_status(SolveStatus::Dnf);
        assert_eq!(dnf.effective_ms(), None);
    }

    #[test]
    fn new_solves_get_distinct_ids() {
        let a = Solve::new(1, "", vec![]);
        let b = Solve::new(1, "", vec![]);
        assert_eq!(a.id.len(), 8);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn splits_are_sanitized() {
        let solve = Solve::new(10_000, "", vec![3_000, 2_000, 5_000, 5_000, 12_000]);
        assert_eq!(solve.splits, vec![3_000, 5_000]);
    }

    #[test]
    fn segments_include_final_phase() {
        let solve = Solve::new(15_000, "", vec![4_000, 9_000]);
        assert_eq!(solve.segments(), vec![4_000, 5_000, 6_000]);
    }

    #[test]
    fn segments_without_splits_is_whole_solve() {
        let solve = Solve::new(8_765, "", vec![]);
        assert_eq!(solve.segments(), vec![8_765]);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [SolveStatus::Ok, SolveStatus::Plus2, SolveStatus::Dnf] {
            assert_eq!(SolveStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SolveStatus::parse("nope"), None);
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&SolveStatus::Plus2).unwrap();
        assert_eq!(json, "\"PLUS2\"");
    }
}
