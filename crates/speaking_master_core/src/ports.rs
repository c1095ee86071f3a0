//! crates/speaking_master_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ArchivePage, AuthSession, NewPracticeSession, PracticeSession, SavedPhrase, ScoreReport,
    TaskType, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port (Trait)
//=========================================================================================

/// The persistence boundary. One implementation talks to PostgreSQL; tests
/// substitute an isolated in-memory store.
#[async_trait]
pub trait StoreService: Send + Sync {
    // --- Users ---

    /// Idempotent lookup-or-insert keyed on the external identifier. The
    /// store's uniqueness constraint on `user_identifier` is the
    /// authoritative guard against duplicate users under concurrent calls.
    async fn create_or_get_user(&self, user_identifier: &str) -> PortResult<User>;

    async fn get_user_by_identifier(&self, user_identifier: &str) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    // --- Auth Sessions ---

    async fn insert_auth_session(
        &self,
        user_id: Uuid,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession>;

    async fn get_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>>;

    /// Returns whether a row was actually deleted.
    async fn delete_auth_session(&self, session_token: &str) -> PortResult<bool>;

    // --- Saved Phrases ---

    async fn insert_phrase(
        &self,
        user_id: Uuid,
        phrase: &str,
        context: &str,
        category: &str,
    ) -> PortResult<SavedPhrase>;

    /// Read-by-id with the owner as a mandatory filter, so the call itself
    /// prevents accidental cross-user reads.
    async fn get_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<Option<SavedPhrase>>;

    async fn list_phrases_by_user(&self, user_id: Uuid) -> PortResult<Vec<SavedPhrase>>;

    async fn delete_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<bool>;

    async fn set_phrase_mastered(
        &self,
        phrase_id: Uuid,
        owner_id: Uuid,
        is_mastered: bool,
    ) -> PortResult<Option<SavedPhrase>>;

    // --- Practice Sessions ---

    async fn insert_practice_session(
        &self,
        new_session: NewPracticeSession,
    ) -> PortResult<PracticeSession>;

    async fn get_practice_session(&self, session_id: Uuid) -> PortResult<Option<PracticeSession>>;

    /// Lookup scoped by owner and task type; an ownership mismatch is
    /// indistinguishable from absence.
    async fn get_practice_session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        task_type: TaskType,
    ) -> PortResult<Option<PracticeSession>>;

    /// A page ordered by `created_at` descending (id descending as the
    /// tie-break) plus the total count independent of the window.
    async fn list_practice_sessions(
        &self,
        user_id: Uuid,
        task_type: TaskType,
        limit: i64,
        offset: i64,
    ) -> PortResult<ArchivePage>;

    /// Populates transcript, scores and feedback on an unscored session.
    /// Returns None if the session does not exist or was already scored.
    async fn apply_score_report(
        &self,
        session_id: Uuid,
        report: &ScoreReport,
    ) -> PortResult<Option<PracticeSession>>;
}
