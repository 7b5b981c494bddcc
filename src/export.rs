use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Local, TimeZone};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::session::Session;
use crate::solve::Solve;

#[derive(Debug, Serialize)]
struct SolveRow<'a> {
    index: usize,
    id: &'a str,
    time_ms: u64,
    status: &'static str,
    effective_ms: Option<u64>,
    scramble: &'a str,
    created_at: String,
    splits: String,
}

impl<'a> SolveRow<'a> {
    /// `index` counts from the oldest solve, matching the solves screen
    fn new(index: usize, solve: &'a Solve) -> Self {
        Self {
            index,
            id: &solve.id,
            time_ms: solve.time_ms,
            status: solve.status.as_str(),
            effective_ms: solve.effective_ms(),
            scramble: &solve.scramble,
            created_at: Local
                .timestamp_millis_opt(solve.created_at)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            splits: solve
                .splits
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Writes one row per solve, newest first. Returns the number of rows.
pub fn write_session<W: Write>(session: &Session, out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let total = session.solves.len();
    for (i, solve) in session.solves.iter().enumerate() {
        writer.serialize(SolveRow::new(total - i, solve))?;
    }
    writer.flush()?;
    Ok(total)
}

pub fn export_to_path(session: &Session, path: &Path) -> Result<usize> {
    let file = File::create(path)?;
    let rows = write_session(session, file)?;
    info!(path = %path.display(), rows, session = %session.name, "exported session");
    Ok(rows)
}
