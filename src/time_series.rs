use crate::session::GraphConfig;
use crate::solve::Solve;
use crate::stats::{series, SeriesKind};

/// One plotted value: 1-based position in the series and its time in ms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub n: f64,
    pub ms: f64,
}

impl SeriesPoint {
    pub fn new(n: f64, ms: f64) -> Self {
        Self { n, ms }
    }
}

impl From<(f64, f64)> for SeriesPoint {
    fn from(v: (f64, f64)) -> Self {
        SeriesPoint { n: v.0, ms: v.1 }
    }
}

impl From<SeriesPoint> for (f64, f64) {
    fn from(p: SeriesPoint) -> Self {
        (p.n, p.ms)
    }
}

/// Chart points for a graph, oldest first
pub fn graph_points(solves: &[Solve], graph: GraphConfig) -> Vec<SeriesPoint> {
    series(solves, SeriesKind::from_type(graph.kind), graph.last)
        .into_iter()
        .enumerate()
        .map(|(i, ms)| SeriesPoint::new((i + 1) as f64, ms))
        .collect()
}
