//! crates/speaking_master_core/src/services/archive.rs
//!
//! Paginated, filtered read access to historical practice sessions, scoped
//! per user and task type.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ArchivePage, PracticeSession, TaskType};
use crate::ports::{PortError, PortResult, StoreService};

/// Pagination window bounds. Out-of-range values are rejected, not clamped.
pub const MIN_PAGE_LIMIT: i64 = 1;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub struct ArchiveService {
    store: Arc<dyn StoreService>,
}

impl ArchiveService {
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        Self { store }
    }

    /// One page of a user's attempts at the given task type, most recent
    /// first, plus the total match count independent of the window.
    pub async fn list_questions(
        &self,
        user_identifier: &str,
        task_type: TaskType,
        limit: i64,
        offset: i64,
    ) -> PortResult<ArchivePage> {
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(PortError::Validation(format!(
                "limit must be between {} and {}",
                MIN_PAGE_LIMIT, MAX_PAGE_LIMIT
            )));
        }
        if offset < 0 {
            return Err(PortError::Validation("offset must not be negative".to_string()));
        }

        let user = self.store.get_user_by_identifier(user_identifier).await?;
        self.store
            .list_practice_sessions(user.id, task_type, limit, offset)
            .await
    }

    /// A single attempt by id. A malformed id is a validation failure,
    /// distinct from NotFound; an attempt owned by another user is reported
    /// as absent so existence of other users' data never leaks.
    pub async fn get_question(
        &self,
        user_identifier: &str,
        task_type: TaskType,
        question_id: &str,
    ) -> PortResult<PracticeSession> {
        let question_id = Uuid::parse_str(question_id)
            .map_err(|_| PortError::Validation("Invalid question ID format".to_string()))?;

        let user = self.store.get_user_by_identifier(user_identifier).await?;
        self.store
            .get_practice_session_for_user(question_id, user.id, task_type)
            .await?
            .ok_or_else(|| {
                PortError::NotFound(format!("{} question {} not found", task_type, question_id))
            })
    }
}
