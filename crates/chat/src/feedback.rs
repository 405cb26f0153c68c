//! Feedback-sink collaborator.
//!
//! The pipeline only reports ratings through the `FeedbackSink` trait;
//! the SQLite implementation below is the bundled backend so the CLI
//! works end to end. Sink failures are surfaced to the user as a notice
//! and never affect the answer already produced.

use mevzuat_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

/// User rating of one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Positive,
    Negative,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Positive => "positive",
            Rating::Negative => "negative",
        }
    }
}

/// One recorded rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub question: String,
    pub answer: String,
    pub rating: Rating,
}

/// Storage backend for answer ratings.
pub trait FeedbackSink: Send + Sync {
    fn record(&self, entry: &FeedbackEntry) -> AppResult<()>;
}

/// SQLite-backed feedback sink.
pub struct SqliteFeedbackSink {
    conn: Mutex<Connection>,
}

impl SqliteFeedbackSink {
    /// Open (or create) the feedback database at the given path.
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::Feedback(format!("Failed to open feedback db: {}", e)))?;
        Self::with_connection(conn)
    }

    /// In-memory sink, used by tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Feedback(format!("Failed to open feedback db: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                rating TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| AppError::Feedback(format!("Failed to create feedback table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored ratings.
    pub fn count(&self) -> AppResult<u64> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Feedback("Feedback db lock poisoned".to_string()))?;

        let count: u64 = conn
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
            .map_err(|e| AppError::Feedback(format!("Failed to count feedback: {}", e)))?;

        Ok(count)
    }
}

impl FeedbackSink for SqliteFeedbackSink {
    fn record(&self, entry: &FeedbackEntry) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Feedback("Feedback db lock poisoned".to_string()))?;

        conn.execute(
            "INSERT INTO feedback (question, answer, rating, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.question,
                entry.answer,
                entry.rating.as_str(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Feedback(format!("Failed to record feedback: {}", e)))?;

        tracing::debug!(rating = entry.rating.as_str(), "Feedback recorded");

        Ok(())
    }
}
