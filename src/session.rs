use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DataShown;
use crate::format::Precision;
use crate::solve::{new_solve_id, Solve};

/// Timer settings a session can carry instead of the global ones
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTimer {
    pub precision: Precision,
    pub hold_to_start_ms: i64,
    pub phases: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionOverrides {
    pub use_session_timer: bool,
    pub session_timer: Option<SessionTimer>,
    pub use_session_data: bool,
    pub data_shown: Option<DataShown>,
    pub data_order: Option<Vec<String>>,
}

/// One trend graph: the `last` most recent solves, plotted as singles
/// (`kind == 1`) or a rolling average of `kind`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphConfig {
    pub last: usize,
    pub kind: usize,
}

impl GraphConfig {
    pub fn defaults() -> Vec<GraphConfig> {
        vec![
            GraphConfig { last: 50, kind: 1 },
            GraphConfig { last: 20, kind: 1 },
        ]
    }
}

/// A named solve history, newest solve first.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub solves: Vec<Solve>,
    pub overrides: SessionOverrides,
    pub graphs: Vec<GraphConfig>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(new_solve_id(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            solves: Vec::new(),
            overrides: SessionOverrides::default(),
            graphs: GraphConfig::defaults(),
        }
    }

    pub fn solve(&self, id: &str) -> Option<&Solve> {
        self.solves.iter().find(|s| s.id == id)
    }

    /// Seed data shown on first run: an 18s outlier as the newest solve,
    /// 45 solves between 10 and 13 seconds five minutes apart, and four
    /// older outliers.
    pub fn example<R: Rng>(now_ms: i64, rng: &mut R) -> Self {
        const STEP_MS: i64 = 300_000;
        let mut session = Session::with_id("example", "Example session");

        let mut push = |id: usize, time_ms: u64, scramble: &str, created_at: i64| {
            let mut solve = Solve::new(time_ms, scramble, vec![]);
            solve.id = format!("s{id:02}");
            solve.created_at = created_at;
            session.solves.push(solve);
        };

        push(1, 18_000, "R2 U2 L2 D2 F2 B2", now_ms);
        for i in 1..=45 {
            let ms = rng.gen_range(10_000..13_000);
            push(i + 1, ms, "R U R' U' F2 L U2", now_ms - i as i64 * STEP_MS);
        }
        for (j, ms) in [8_900, 15_000, 16_500, 21_000].into_iter().enumerate() {
            push(47 + j, ms, "R2 U2 L2 D2 F2 B2", now_ms - (46 + j as i64) * STEP_MS);
        }

        session
    }
}
