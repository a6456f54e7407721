use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::aggregator::SessionSummary;
use crate::app_dirs::AppDirs;
use crate::error::PersistenceError;
use crate::util::{ratio_or_zero, round_to};

/// Something that accepts finished session summaries
pub trait SummarySink {
    fn save(&mut self, summary: &SessionSummary) -> Result<(), PersistenceError>;
}

/// Read side of the session log
pub trait SessionHistory {
    /// Most recent sessions first
    fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, PersistenceError>;
    fn totals(&self) -> Result<HistoryTotals, PersistenceError>;
}

/// A store the app can both write finished sessions to and browse
pub trait SessionStore: SummarySink + SessionHistory {}

impl<T: SummarySink + SessionHistory> SessionStore for T {}

/// Lifetime numbers across every stored session
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistoryTotals {
    pub sessions: usize,
    pub problems: usize,
    /// Mean of the per-session scores, one decimal
    pub average_qpm: f64,
    pub best_qpm: f64,
}

impl HistoryTotals {
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        let scores: Vec<f64> = summaries.iter().map(session_qpm).collect();
        Self {
            sessions: summaries.len(),
            problems: summaries.iter().map(|s| s.total_problems).sum(),
            average_qpm: round_to(
                ratio_or_zero(scores.iter().sum(), scores.len() as f64),
                1,
            ),
            best_qpm: round_to(scores.iter().copied().fold(0.0, f64::max), 1),
        }
    }
}

fn session_qpm(summary: &SessionSummary) -> f64 {
    ratio_or_zero(summary.total_problems as f64, summary.duration_secs as f64) * 60.0
}

/// Hand `summary` to `sink` without letting a failure reach the caller.
/// Returns whether the summary was stored.
pub fn persist_summary<S: SummarySink + ?Sized>(sink: &mut S, summary: &SessionSummary) -> bool {
    match sink.save(summary) {
        Ok(()) => {
            tracing::info!(total = summary.total_problems, "session summary saved");
            true
        }
        Err(e) => {
            tracing::warn!("failed to save session summary: {e}");
            false
        }
    }
}

const CREATE_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        duration_secs INTEGER NOT NULL,
        difficulty TEXT NOT NULL,
        operators TEXT NOT NULL,
        total_problems INTEGER NOT NULL,
        first_try_correct INTEGER NOT NULL,
        eventually_correct INTEGER NOT NULL,
        accuracy REAL NOT NULL,
        history TEXT NOT NULL
    )
"#;

/// Session summaries kept in SQLite, one row per session with the problem
/// history stored as JSON
#[derive(Debug)]
pub struct SqliteSummaryStore {
    conn: Connection,
}

impl SqliteSummaryStore {
    /// Open the store at the default location under the state directory
    pub fn new() -> Result<Self, PersistenceError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("mathrush_sessions.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute(CREATE_SESSIONS, [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp)",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, PersistenceError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl SessionHistory for SqliteSummaryStore {
    fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, duration_secs, difficulty, operators, total_problems,
                   first_try_correct, eventually_correct, accuracy, history
            FROM sessions
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(StoredRow {
                timestamp: row.get(0)?,
                duration_secs: row.get(1)?,
                difficulty: row.get(2)?,
                operators: row.get(3)?,
                total_problems: row.get(4)?,
                first_try_correct: row.get(5)?,
                eventually_correct: row.get(6)?,
                accuracy: row.get(7)?,
                history: row.get(8)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?.into_summary()?);
        }
        Ok(summaries)
    }

    fn totals(&self) -> Result<HistoryTotals, PersistenceError> {
        let (sessions, problems, average, best): (i64, i64, Option<f64>, Option<f64>) =
            self.conn.query_row(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(total_problems), 0),
                       AVG(CASE WHEN duration_secs > 0
                           THEN total_problems * 60.0 / duration_secs ELSE 0 END),
                       MAX(CASE WHEN duration_secs > 0
                           THEN total_problems * 60.0 / duration_secs ELSE 0 END)
                FROM sessions
                "#,
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
        Ok(HistoryTotals {
            sessions: sessions as usize,
            problems: problems as usize,
            average_qpm: round_to(average.unwrap_or(0.0), 1),
            best_qpm: round_to(best.unwrap_or(0.0), 1),
        })
    }
}

impl SummarySink for SqliteSummaryStore {
    fn save(&mut self, summary: &SessionSummary) -> Result<(), PersistenceError> {
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (timestamp, duration_secs, difficulty, operators, total_problems,
             first_try_correct, eventually_correct, accuracy, history)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                summary.timestamp.to_rfc3339(),
                summary.duration_secs as i64,
                serde_json::to_string(&summary.difficulty)?,
                serde_json::to_string(&summary.operators)?,
                summary.total_problems as i64,
                summary.first_try_correct as i64,
                summary.eventually_correct as i64,
                summary.accuracy,
                serde_json::to_string(&summary.problem_history)?,
            ],
        )?;
        Ok(())
    }
}

struct StoredRow {
    timestamp: String,
    duration_secs: i64,
    difficulty: String,
    operators: String,
    total_problems: i64,
    first_try_correct: i64,
    eventually_correct: i64,
    accuracy: f64,
    history: String,
}

impl StoredRow {
    fn into_summary(self) -> Result<SessionSummary, PersistenceError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| PersistenceError::Rejected(format!("bad timestamp {}: {e}", self.timestamp)))?
            .with_timezone(&Local);
        Ok(SessionSummary {
            total_problems: self.total_problems as usize,
            first_try_correct: self.first_try_correct as usize,
            eventually_correct: self.eventually_correct as usize,
            accuracy: self.accuracy,
            duration_secs: self.duration_secs as u64,
            difficulty: serde_json::from_str(&self.difficulty)?,
            operators: serde_json::from_str(&self.operators)?,
            timestamp,
            problem_history: serde_json::from_str(&self.history)?,
        })
    }
}
