//! crates/speaking_master_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// Represents a user - created on first login, identified by an opaque
// external identifier.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub user_identifier: String,
    pub created_at: DateTime<Utc>,
}

// Represents one logged-in session (opaque bearer token).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    /// A session past its expiry is treated as absent and purged on next touch.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A phrase a user bookmarked for later review.
#[derive(Debug, Clone)]
pub struct SavedPhrase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phrase: String,
    pub context: String,
    pub category: String,
    pub is_mastered: bool,
    pub created_at: DateTime<Utc>,
}

/// The speaking-task format of a practice session. Stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Task1,
    Task2,
    Task3,
    Task4,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Task1 => "task1",
            TaskType::Task2 => "task2",
            TaskType::Task3 => "task3",
            TaskType::Task4 => "task4",
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = ParseTaskTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task1" => Ok(TaskType::Task1),
            "task2" => Ok(TaskType::Task2),
            "task3" => Ok(TaskType::Task3),
            "task4" => Ok(TaskType::Task4),
            other => Err(ParseTaskTypeError(other.to_string())),
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt at a speaking task. `user_id` is None for anonymous
/// attempts; scores stay None until scoring completes.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub task_type: TaskType,
    pub question: String,
    pub reading_text: Option<String>,
    pub lecture_script: Option<String>,
    pub user_transcript: Option<String>,
    pub overall_score: Option<i32>,
    pub delivery_score: Option<i32>,
    pub language_use_score: Option<i32>,
    pub topic_dev_score: Option<i32>,
    pub feedback_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl PracticeSession {
    /// Scoring happens exactly once; a populated overall score marks it done.
    pub fn is_scored(&self) -> bool {
        self.overall_score.is_some()
    }
}

/// Everything needed to persist a practice session at problem-generation
/// time. Scores and transcript are filled in later by scoring.
#[derive(Debug, Clone)]
pub struct NewPracticeSession {
    pub user_id: Option<Uuid>,
    pub task_type: TaskType,
    pub question: String,
    pub reading_text: Option<String>,
    pub lecture_script: Option<String>,
}

/// The scoring-completion payload: transcript, 0-4 scores per dimension,
/// and structured feedback.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub user_transcript: String,
    pub overall_score: i32,
    pub delivery_score: i32,
    pub language_use_score: i32,
    pub topic_dev_score: i32,
    pub feedback: serde_json::Value,
}

/// One page of archive results plus the total match count, so callers can
/// build pagination UI without a second query.
#[derive(Debug, Clone)]
pub struct ArchivePage {
    pub questions: Vec<PracticeSession>,
    pub total: i64,
}
