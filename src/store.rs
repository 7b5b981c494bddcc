//! Session persistence.
//!
//! [`SessionStore`] is what the application talks to; [`SqliteStore`] keeps
//! every session in memory and writes each change through to SQLite.

use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::app_dirs::AppDirs;
use crate::error::{CubikError, Result};
use crate::format::MAX_TIME_MS;
use crate::session::{GraphConfig, Session, SessionOverrides};
use crate::solve::{new_solve_id, Solve, SolveStatus};

pub const DEFAULT_SESSION_ID: &str = "default";
const CURRENT_SESSION_KEY: &str = "current_session";

/// Partial update of a solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvePatch {
    pub status: Option<SolveStatus>,
    pub time_ms: Option<u64>,
}

impl SolvePatch {
    pub fn status(status: SolveStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Partial update of a session's settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub overrides: Option<SessionOverrides>,
    pub graphs: Option<Vec<GraphConfig>>,
}

pub trait SessionStore {
    /// All sessions in display order; never empty
    fn sessions(&self) -> &[Session];
    fn current(&self) -> &Session;
    fn switch(&mut self, id: &str) -> Result<()>;
    /// Creates a session and makes it current
    fn add_session(&mut self, name: &str) -> Result<String>;
    fn rename_session(&mut self, id: &str, name: &str) -> Result<()>;
    /// Removing the last session recreates an empty `Default` one
    fn delete_session(&mut self, id: &str) -> Result<()>;
    fn update_session(&mut self, id: &str, patch: SessionPatch) -> Result<()>;
    /// Prepends to the current session's history
    fn add_solve(&mut self, solve: Solve) -> Result<()>;
    fn update_solve(&mut self, id: &str, patch: SolvePatch) -> Result<()>;
    fn delete_solve(&mut self, id: &str) -> Result<()>;

    /// Finds a session by case-insensitive name
    fn find_by_name(&self, name: &str) -> Option<&Session> {
        self.sessions()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Column value for a solve time. Times are capped on the way in, so the
/// conversion only saturates for values that bypassed the cap.
fn stored_ms(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// What an empty database is filled with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRun {
    /// The example session plus an empty `Default`
    Example,
    DefaultOnly,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    sessions: Vec<Session>,
    current_id: String,
}

impl SqliteStore {
    /// Opens (or creates) the database at the default state path
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("cubik.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %path.display(), "opening session store");
        Self::init(Connection::open(path)?, FirstRun::Example)
    }

    pub fn open_in_memory(first_run: FirstRun) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, first_run)
    }

    fn init(conn: Connection, first_run: FirstRun) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                overrides TEXT NOT NULL DEFAULT '{}',
                graphs TEXT NOT NULL DEFAULT '[]'
            );
            CREATE TABLE IF NOT EXISTS solves (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                time_ms INTEGER NOT NULL,
                status TEXT NOT NULL,
                scramble TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                splits TEXT NOT NULL DEFAULT '[]',
                UNIQUE(session_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_solves_session ON solves(session_id, seq);
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        let mut store = Self {
            conn,
            sessions: Vec::new(),
            current_id: String::new(),
        };
        store.load()?;

        if store.sessions.is_empty() {
            store.seed(first_run)?;
        }

        let saved_current = store
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [CURRENT_SESSION_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        store.current_id = saved_current
            .filter(|id| store.index_of(id).is_some())
            .unwrap_or_else(|| store.sessions[0].id.clone());

        debug!(
            sessions = store.sessions.len(),
            current = %store.current_id,
            "session store ready"
        );
        Ok(store)
    }

    fn seed(&mut self, first_run: FirstRun) -> Result<()> {
        let mut seeded = Vec::new();
        if first_run == FirstRun::Example {
            let now = Local::now().timestamp_millis();
            seeded.push(Session::example(now, &mut rand::thread_rng()));
        }
        seeded.push(Session::with_id(DEFAULT_SESSION_ID, "Default"));

        for session in seeded {
            self.insert_session(&session)?;
            // stored oldest first so insertion order matches history order
            for solve in session.solves.iter().rev() {
                self.insert_solve(&session.id, solve)?;
            }
            self.sessions.push(session);
        }
        info!(?first_run, "seeded empty session store");
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, overrides, graphs FROM sessions ORDER BY position, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, name, overrides, graphs) = row?;
            let mut session = Session::with_id(id, name);
            session.overrides = serde_json::from_str(&overrides).unwrap_or_else(|err| {
                warn!(session = %session.id, %err, "ignoring unreadable session overrides");
                SessionOverrides::default()
            });
            session.graphs = serde_json::from_str(&graphs).unwrap_or_else(|_| GraphConfig::defaults());
            sessions.push(session);
        }
        drop(stmt);

        for session in &mut sessions {
            session.solves = self.load_solves(&session.id)?;
        }
        self.sessions = sessions;
        Ok(())
    }

    fn load_solves(&self, session_id: &str) -> Result<Vec<Solve>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, time_ms, status, scramble, created_at, splits
            FROM solves
            WHERE session_id = ?1
            ORDER BY seq DESC
            "#,
        )?;

        let solves = stmt
            .query_map([session_id], |row| {
                let status: String = row.get(2)?;
                let splits: String = row.get(5)?;
                Ok(Solve {
                    id: row.get(0)?,
                    time_ms: row.get::<_, i64>(1)?.max(0) as u64,
                    status: SolveStatus::parse(&status).unwrap_or_default(),
                    scramble: row.get(3)?,
                    created_at: row.get(4)?,
                    splits: serde_json::from_str(&splits).unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<Solve>>>()?;
        Ok(solves)
    }

    fn insert_session(&self, session: &Session) -> Result<()> {
        let position = self
            .conn
            .query_row("SELECT COALESCE(MAX(position), -1) + 1 FROM sessions", [], |row| {
                row.get::<_, i64>(0)
            })?;
        self.conn.execute(
            "INSERT INTO sessions (id, name, position, overrides, graphs) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id,
                session.name,
                position,
                serde_json::to_string(&session.overrides)?,
                serde_json::to_string(&session.graphs)?,
            ],
        )?;
        Ok(())
    }

    fn insert_solve(&self, session_id: &str, solve: &Solve) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO solves (id, session_id, time_ms, status, scramble, created_at, splits)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                solve.id,
                session_id,
                stored_ms(solve.time_ms),
                solve.status.as_str(),
                solve.scramble,
                solve.created_at,
                serde_json::to_string(&solve.splits)?,
            ],
        )?;
        Ok(())
    }

    fn save_current_id(&self) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![CURRENT_SESSION_KEY, self.current_id],
        )?;
        Ok(())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| CubikError::UnknownSession(id.to_string()))
    }

    fn current_index(&self) -> usize {
        self.index_of(&self.current_id).unwrap_or(0)
    }

}

impl SessionStore for SqliteStore {
    fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    fn current(&self) -> &Session {
        &self.sessions[self.current_index()]
    }

    fn switch(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        self.current_id = id.to_string();
        self.save_current_id()?;
        info!(session = %id, "switched session");
        Ok(())
    }

    fn add_session(&mut self, name: &str) -> Result<String> {
        let session = Session::new(name.trim());
        self.insert_session(&session)?;
        let id = session.id.clone();
        self.sessions.push(session);
        self.switch(&id)?;
        info!(session = %id, name, "added session");
        Ok(id)
    }

    fn rename_session(&mut self, id: &str, name: &str) -> Result<()> {
        let idx = self.require(id)?;
        let name = name.trim();
        self.conn.execute(
            "UPDATE sessions SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        self.sessions[idx].name = name.to_string();
        Ok(())
    }

    fn delete_session(&mut self, id: &str) -> Result<()> {
        let idx = self.require(id)?;
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM solves WHERE session_id = ?1", [id])?;
        tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        tx.commit()?;
        self.sessions.remove(idx);
        info!(session = %id, "deleted session");

        if self.sessions.is_empty() {
            let fallback = Session::with_id(DEFAULT_SESSION_ID, "Default");
            self.insert_session(&fallback)?;
            self.sessions.push(fallback);
        }
        if self.current_id == id {
            self.current_id = self.sessions[0].id.clone();
            self.save_current_id()?;
        }
        Ok(())
    }

    fn update_session(&mut self, id: &str, patch: SessionPatch) -> Result<()> {
        let idx = self.require(id)?;
        if let Some(overrides) = patch.overrides {
            self.conn.execute(
                "UPDATE sessions SET overrides = ?1 WHERE id = ?2",
                params![serde_json::to_string(&overrides)?, id],
            )?;
            self.sessions[idx].overrides = overrides;
        }
        if let Some(graphs) = patch.graphs {
            self.conn.execute(
                "UPDATE sessions SET graphs = ?1 WHERE id = ?2",
                params![serde_json::to_string(&graphs)?, id],
            )?;
            self.sessions[idx].graphs = graphs;
        }
        Ok(())
    }

    fn add_solve(&mut self, mut solve: Solve) -> Result<()> {
        let idx = self.current_index();
        if self.sessions[idx].solve(&solve.id).is_some() {
            solve.id = new_solve_id();
        }
        solve.time_ms = solve.time_ms.min(MAX_TIME_MS);
        self.insert_solve(&self.sessions[idx].id, &solve)?;
        debug!(
            session = %self.sessions[idx].id,
            solve = %solve.id,
            time_ms = solve.time_ms,
            status = solve.status.as_str(),
            "recorded solve"
        );
        self.sessions[idx].solves.insert(0, solve);
        Ok(())
    }

    fn update_solve(&mut self, id: &str, patch: SolvePatch) -> Result<()> {
        let idx = self.current_index();
        let session_id = self.sessions[idx].id.clone();
        let solve = self.sessions[idx]
            .solves
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CubikError::UnknownSolve(id.to_string()))?;

        if let Some(status) = patch.status {
            solve.status = status;
        }
        if let Some(time_ms) = patch.time_ms {
            let time_ms = time_ms.min(MAX_TIME_MS);
            solve.time_ms = time_ms;
            solve.splits.retain(|&mark| mark < time_ms);
        }
        self.conn.execute(
            "UPDATE solves SET status = ?1, time_ms = ?2, splits = ?3 WHERE session_id = ?4 AND id = ?5",
            params![
                solve.status.as_str(),
                stored_ms(solve.time_ms),
                serde_json::to_string(&solve.splits)?,
                session_id,
                id,
            ],
        )?;
        debug!(solve = %id, status = solve.status.as_str(), "updated solve");
        Ok(())
    }

    fn delete_solve(&mut self, id: &str) -> Result<()> {
        let idx = self.current_index();
        let pos = self.sessions[idx]
            .solves
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CubikError::UnknownSolve(id.to_string()))?;
        self.conn.execute(
            "DELETE FROM solves WHERE session_id = ?1 AND id = ?2",
            params![self.sessions[idx].id, id],
        )?;
        self.sessions[idx].solves.remove(pos);
        debug!(solve = %id, "deleted solve");
        Ok(())
    }
}
