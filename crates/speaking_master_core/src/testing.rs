//! crates/speaking_master_core/src/testing.rs
//!
//! An in-memory `StoreService` used by the service unit tests in place of a
//! live database. Timestamps are strictly increasing in insertion order so
//! ordering assertions are deterministic.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    ArchivePage, AuthSession, NewPracticeSession, PracticeSession, SavedPhrase, ScoreReport,
    TaskType, User,
};
use crate::ports::{PortError, PortResult, StoreService};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    auth_sessions: Vec<AuthSession>,
    phrases: Vec<SavedPhrase>,
    practice_sessions: Vec<PracticeSession>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    base: DateTime<Utc>,
    clock: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            base: Utc::now(),
            clock: AtomicI64::new(0),
        }
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        self.base + Duration::seconds(tick)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl StoreService for MemoryStore {
    async fn create_or_get_user(&self, user_identifier: &str) -> PortResult<User> {
        let created_at = self.next_timestamp();
        let mut inner = self.lock();
        if let Some(user) = inner
            .users
            .iter()
            .find(|u| u.user_identifier == user_identifier)
        {
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            user_identifier: user_identifier.to_string(),
            created_at,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_identifier(&self, user_identifier: &str) -> PortResult<User> {
        self.lock()
            .users
            .iter()
            .find(|u| u.user_identifier == user_identifier)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_identifier)))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn insert_auth_session(
        &self,
        user_id: Uuid,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        let session = AuthSession {
            id: Uuid::new_v4(),
            user_id,
            session_token: session_token.to_string(),
            expires_at,
            created_at: self.next_timestamp(),
        };
        self.lock().auth_sessions.push(session.clone());
        Ok(session)
    }

    async fn get_auth_session(&self, session_token: &str) -> PortResult<Option<AuthSession>> {
        Ok(self
            .lock()
            .auth_sessions
            .iter()
            .find(|s| s.session_token == session_token)
            .cloned())
    }

    async fn delete_auth_session(&self, session_token: &str) -> PortResult<bool> {
        let mut inner = self.lock();
        let before = inner.auth_sessions.len();
        inner.auth_sessions.retain(|s| s.session_token != session_token);
        Ok(inner.auth_sessions.len() < before)
    }

    async fn insert_phrase(
        &self,
        user_id: Uuid,
        phrase: &str,
        context: &str,
        category: &str,
    ) -> PortResult<SavedPhrase> {
        let saved = SavedPhrase {
            id: Uuid::new_v4(),
            user_id,
            phrase: phrase.to_string(),
            context: context.to_string(),
            category: category.to_string(),
            is_mastered: false,
            created_at: self.next_timestamp(),
        };
        self.lock().phrases.push(saved.clone());
        Ok(saved)
    }

    async fn get_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<Option<SavedPhrase>> {
        Ok(self
            .lock()
            .phrases
            .iter()
            .find(|p| p.id == phrase_id && p.user_id == owner_id)
            .cloned())
    }

    async fn list_phrases_by_user(&self, user_id: Uuid) -> PortResult<Vec<SavedPhrase>> {
        let mut phrases: Vec<SavedPhrase> = self
            .lock()
            .phrases
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        phrases.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(phrases)
    }

    async fn delete_phrase(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<bool> {
        let mut inner = self.lock();
        let before = inner.phrases.len();
        inner
            .phrases
            .retain(|p| !(p.id == phrase_id && p.user_id == owner_id));
        Ok(inner.phrases.len() < before)
    }

    async fn set_phrase_mastered(
        &self,
        phrase_id: Uuid,
        owner_id: Uuid,
        is_mastered: bool,
    ) -> PortResult<Option<SavedPhrase>> {
        let mut inner = self.lock();
        let Some(phrase) = inner
            .phrases
            .iter_mut()
            .find(|p| p.id == phrase_id && p.user_id == owner_id)
        else {
            return Ok(None);
        };
        phrase.is_mastered = is_mastered;
        Ok(Some(phrase.clone()))
    }

    async fn insert_practice_session(
        &self,
        new_session: NewPracticeSession,
    ) -> PortResult<PracticeSession> {
        let session = PracticeSession {
            id: Uuid::new_v4(),
            user_id: new_session.user_id,
            task_type: new_session.task_type,
            question: new_session.question,
            reading_text: new_session.reading_text,
            lecture_script: new_session.lecture_script,
            user_transcript: None,
            overall_score: None,
            delivery_score: None,
            language_use_score: None,
            topic_dev_score: None,
            feedback_json: None,
            created_at: self.next_timestamp(),
        };
        self.lock().practice_sessions.push(session.clone());
        Ok(session)
    }

    async fn get_practice_session(&self, session_id: Uuid) -> PortResult<Option<PracticeSession>> {
        Ok(self
            .lock()
            .practice_sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned())
    }

    async fn get_practice_session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        task_type: TaskType,
    ) -> PortResult<Option<PracticeSession>> {
        Ok(self
            .lock()
            .practice_sessions
            .iter()
            .find(|s| {
                s.id == session_id && s.user_id == Some(user_id) && s.task_type == task_type
            })
            .cloned())
    }

    async fn list_practice_sessions(
        &self,
        user_id: Uuid,
        task_type: TaskType,
        limit: i64,
        offset: i64,
    ) -> PortResult<ArchivePage> {
        let mut matching: Vec<PracticeSession> = self
            .lock()
            .practice_sessions
            .iter()
            .filter(|s| s.user_id == Some(user_id) && s.task_type == task_type)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let questions = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(ArchivePage { questions, total })
    }

    async fn apply_score_report(
        &self,
        session_id: Uuid,
        report: &ScoreReport,
    ) -> PortResult<Option<PracticeSession>> {
        let mut inner = self.lock();
        let Some(session) = inner
            .practice_sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.overall_score.is_none())
        else {
            return Ok(None);
        };
        session.user_transcript = Some(report.user_transcript.clone());
        session.overall_score = Some(report.overall_score);
        session.delivery_score = Some(report.delivery_score);
        session.language_use_score = Some(report.language_use_score);
        session.topic_dev_score = Some(report.topic_dev_score);
        session.feedback_json = Some(report.feedback.clone());
        Ok(Some(session.clone()))
    }
}
