//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StoreService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use speaking_master_core::domain::{
    ArchivePage, AuthSession, NewPracticeSession, PracticeSession, SavedPhrase, ScoreReport,
    TaskType, User,
};
use speaking_master_core::ports::{PortError, PortResult, StoreService};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// The SELECT list shared by every practice-session query.
const PRACTICE_SESSION_COLUMNS: &str = "id, user_id, task_type, question, reading_text, \
     lecture_script, user_transcript, overall_score, delivery_score, language_use_score, \
     topic_dev_score, feedback_json, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StoreService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    user_identifier: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            user_identifier: self.user_identifier,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: Uuid,
    user_id: Uuid,
    session_token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            session_token: self.session_token,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SavedPhraseRecord {
    id: Uuid,
    user_id: Uuid,
    phrase: String,
    context: String,
    category: String,
    is_mastered: bool,
    created_at: DateTime<Utc>,
}
impl SavedPhraseRecord {
    fn to_domain(self) -> SavedPhrase {
        SavedPhrase {
            id: self.id,
            user_id: self.user_id,
            phrase: self.phrase,
            context: self.context,
            category: self.category,
            is_mastered: self.is_mastered,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct PracticeSessionRecord {
    id: Uuid,
    user_id: Option<Uuid>,
    task_type: String,
    question: String,
    reading_text: Option<String>,
    lecture_script: Option<String>,
    user_transcript: Option<String>,
    overall_score: Option<i32>,
    delivery_score: Option<i32>,
    language_use_score: Option<i32>,
    topic_dev_score: Option<i32>,
    feedback_json: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}
impl PracticeSessionRecord {
    /// A task_type outside the known set means the row predates the enum or
    /// was written by hand; surface it as an unexpected store error.
    fn to_domain(self) -> PortResult<PracticeSession> {
        let task_type = self
            .task_type
            .parse::<TaskType>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(PracticeSession {
            id: self.id,
            user_id: self.user_id,
            task_type,
            question: self.question,
            reading_text: self.reading_text,
            lecture_script: self.lecture_script,
            user_transcript: self.user_transcript,
            overall_score: self.overall_score,
            delivery_score: self.delivery_score,
            language_use_score: self.language_use_score,
            topic_dev_score: self.topic_dev_score,
            feedback_json: self.feedback_json,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `StoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoreService for DbAdapter {
    async fn create_or_get_user(&self, user_identifier: &str) -> PortResult<User> {
        // The UNIQUE constraint on user_identifier makes this safe under
        // concurrent first logins.
        sqlx::query(
            "INSERT INTO users (id, user_identifier) VALUES ($1, $2) \
             ON CONFLICT (user_identifier) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.get_user_by_identifier(user_identifier).await
    }

    async fn get_user_by_identifier(&self, user_identifier: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, user_identifier, created_at FROM users WHERE user_identifier = $1",
        )
        .bind(user_identifier)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User {} not found", user_identifier))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, user_identifier, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn insert_auth_session(
        &self,
        user_id: Uuid,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "INSERT INTO auth_sessions (id, user_id, session_token, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, session_token, expires_at, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(session_token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, session_token, expires_at, created_at \
             FROM auth_sessions WHERE session_token = $1",
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(AuthSessionRecord::to_domain))
    }

    async fn delete_auth_session(&self, session_token: &str) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE session_token = $1")
            .bind(session_token)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_phrase(
        &self,
        user_id: Uuid,
        phrase: &str,
        context: &str,
        category: &str,
    ) -> PortResult<SavedPhrase> {
        let record = sqlx::query_as::<_, SavedPhraseRecord>(
            "INSERT INTO saved_phrases (id, user_id, phrase, context, category, is_mastered) \
             VALUES ($1, $2, $3, $4, $5, FALSE) \
             RETURNING id, user_id, phrase, context, category, is_mastered, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(phrase)
        .bind(context)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<Option<SavedPhrase>> {
        let record = sqlx::query_as::<_, SavedPhraseRecord>(
            "SELECT id, user_id, phrase, context, category, is_mastered, created_at \
             FROM saved_phrases WHERE id = $1 AND user_id = $2",
        )
        .bind(phrase_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(SavedPhraseRecord::to_domain))
    }

    async fn list_phrases_by_user(&self, user_id: Uuid) -> PortResult<Vec<SavedPhrase>> {
        let records = sqlx::query_as::<_, SavedPhraseRecord>(
            "SELECT id, user_id, phrase, context, category, is_mastered, created_at \
             FROM saved_phrases WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(SavedPhraseRecord::to_domain).collect())
    }

    async fn delete_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM saved_phrases WHERE id = $1 AND user_id = $2")
            .bind(phrase_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_phrase_mastered(
        &self,
        phrase_id: Uuid,
        owner_id: Uuid,
        is_mastered: bool,
    ) -> PortResult<Option<SavedPhrase>> {
        let record = sqlx::query_as::<_, SavedPhraseRecord>(
            "UPDATE saved_phrases SET is_mastered = $3 WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, phrase, context, category, is_mastered, created_at",
        )
        .bind(phrase_id)
        .bind(owner_id)
        .bind(is_mastered)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(SavedPhraseRecord::to_domain))
    }

    async fn insert_practice_session(
        &self,
        new_session: NewPracticeSession,
    ) -> PortResult<PracticeSession> {
        let sql = format!(
            "INSERT INTO practice_sessions \
             (id, user_id, task_type, question, reading_text, lecture_script) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PRACTICE_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, PracticeSessionRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_session.user_id)
            .bind(new_session.task_type.as_str())
            .bind(&new_session.question)
            .bind(&new_session.reading_text)
            .bind(&new_session.lecture_script)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_practice_session(&self, session_id: Uuid) -> PortResult<Option<PracticeSession>> {
        let sql = format!(
            "SELECT {} FROM practice_sessions WHERE id = $1",
            PRACTICE_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, PracticeSessionRecord>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.map(PracticeSessionRecord::to_domain).transpose()
    }

    async fn get_practice_session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        task_type: TaskType,
    ) -> PortResult<Option<PracticeSession>> {
        let sql = format!(
            "SELECT {} FROM practice_sessions WHERE id = $1 AND user_id = $2 AND task_type = $3",
            PRACTICE_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, PracticeSessionRecord>(&sql)
            .bind(session_id)
            .bind(user_id)
            .bind(task_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.map(PracticeSessionRecord::to_domain).transpose()
    }

    async fn list_practice_sessions(
        &self,
        user_id: Uuid,
        task_type: TaskType,
        limit: i64,
        offset: i64,
    ) -> PortResult<ArchivePage> {
        // Total first, independent of the pagination window.
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM practice_sessions WHERE user_id = $1 AND task_type = $2",
        )
        .bind(user_id)
        .bind(task_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The id tie-break keeps the order stable when created_at collides.
        let sql = format!(
            "SELECT {} FROM practice_sessions WHERE user_id = $1 AND task_type = $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            PRACTICE_SESSION_COLUMNS
        );
        let records = sqlx::query_as::<_, PracticeSessionRecord>(&sql)
            .bind(user_id)
            .bind(task_type.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let questions = records
            .into_iter()
            .map(PracticeSessionRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(ArchivePage { questions, total })
    }

    async fn apply_score_report(
        &self,
        session_id: Uuid,
        report: &ScoreReport,
    ) -> PortResult<Option<PracticeSession>> {
        // The unscored predicate is re-checked here so the write happens at
        // most once even under racing scorers.
        let sql = format!(
            "UPDATE practice_sessions SET user_transcript = $2, overall_score = $3, \
             delivery_score = $4, language_use_score = $5, topic_dev_score = $6, \
             feedback_json = $7 \
             WHERE id = $1 AND overall_score IS NULL RETURNING {}",
            PRACTICE_SESSION_COLUMNS
        );
        let record = sqlx::query_as::<_, PracticeSessionRecord>(&sql)
            .bind(session_id)
            .bind(&report.user_transcript)
            .bind(report.overall_score)
            .bind(report.delivery_score)
            .bind(report.language_use_score)
            .bind(report.topic_dev_score)
            .bind(&report.feedback)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.map(PracticeSessionRecord::to_domain).transpose()
    }
}
