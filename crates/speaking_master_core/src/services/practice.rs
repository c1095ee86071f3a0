//! crates/speaking_master_core/src/services/practice.rs
//!
//! Practice-session lifecycle: a row is created at problem-generation time
//! with null scores, then updated exactly once when scoring completes.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPracticeSession, PracticeSession, ScoreReport};
use crate::ports::{PortError, PortResult, StoreService};

pub struct PracticeService {
    store: Arc<dyn StoreService>,
}

impl PracticeService {
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        Self { store }
    }

    /// Persists a freshly generated problem. `user_id` is None for
    /// anonymous attempts; task type is immutable from here on.
    pub async fn create(&self, new_session: NewPracticeSession) -> PortResult<PracticeSession> {
        if new_session.question.trim().is_empty() {
            return Err(PortError::Validation(
                "question must not be empty".to_string(),
            ));
        }
        self.store.insert_practice_session(new_session).await
    }

    /// Applies the scoring result to an unscored session. Scoring a session
    /// twice, or with a score outside the rubric scale, is a validation
    /// failure.
    pub async fn record_score(
        &self,
        session_id: Uuid,
        report: ScoreReport,
    ) -> PortResult<PracticeSession> {
        for (name, value) in [
            ("overall_score", report.overall_score),
            ("delivery_score", report.delivery_score),
            ("language_use_score", report.language_use_score),
            ("topic_dev_score", report.topic_dev_score),
        ] {
            // Scores are integers on the 0-4 rubric scale.
            if !(0..=4).contains(&value) {
                return Err(PortError::Validation(format!(
                    "{} must be between 0 and 4, got {}",
                    name, value
                )));
            }
        }

        let existing = self
            .store
            .get_practice_session(session_id)
            .await?
            .ok_or_else(|| {
                PortError::NotFound(format!("Practice session {} not found", session_id))
            })?;
        if existing.is_scored() {
            return Err(PortError::Validation(
                "practice session has already been scored".to_string(),
            ));
        }

        // The update itself re-checks the unscored predicate, so a racing
        // second scorer loses cleanly.
        self.store
            .apply_score_report(session_id, &report)
            .await?
            .ok_or_else(|| {
                PortError::Validation("practice session has already been scored".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskType;
    use crate::testing::MemoryStore;

    fn new_task3_session(user_id: Option<Uuid>) -> NewPracticeSession {
        NewPracticeSession {
            user_id,
            task_type: TaskType::Task3,
            question: "Summarize the lecture's objection to the reading.".to_string(),
            reading_text: Some("Reading passage about biology.".to_string()),
            lecture_script: Some("Lecture script challenging the passage.".to_string()),
        }
    }

    fn full_marks() -> ScoreReport {
        ScoreReport {
            user_transcript: "The lecturer disagrees with the reading because...".to_string(),
            overall_score: 3,
            delivery_score: 3,
            language_use_score: 4,
            topic_dev_score: 3,
            feedback: serde_json::json!({
                "delivery_feedback": "Good pacing",
                "improvement_tips": ["Use more examples"],
            }),
        }
    }

    #[tokio::test]
    async fn anonymous_sessions_are_created_unscored() {
        let store = Arc::new(MemoryStore::new());
        let practice = PracticeService::new(store.clone() as Arc<dyn StoreService>);

        let session = practice.create(new_task3_session(None)).await.unwrap();
        assert!(session.user_id.is_none());
        assert!(!session.is_scored());
        assert!(session.user_transcript.is_none());
    }

    #[tokio::test]
    async fn empty_question_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let practice = PracticeService::new(store.clone() as Arc<dyn StoreService>);

        let mut new_session = new_task3_session(None);
        new_session.question = " ".to_string();
        let err = practice.create(new_session).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn scoring_populates_the_session_once() {
        let store = Arc::new(MemoryStore::new());
        let practice = PracticeService::new(store.clone() as Arc<dyn StoreService>);

        let session = practice.create(new_task3_session(None)).await.unwrap();
        let scored = practice.record_score(session.id, full_marks()).await.unwrap();
        assert_eq!(scored.overall_score, Some(3));
        assert_eq!(scored.language_use_score, Some(4));
        assert!(scored.user_transcript.is_some());
        assert!(scored.feedback_json.is_some());

        let err = practice
            .record_score(session.id, full_marks())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let practice = PracticeService::new(store.clone() as Arc<dyn StoreService>);

        let session = practice.create(new_task3_session(None)).await.unwrap();
        let mut report = full_marks();
        report.delivery_score = 5;
        let err = practice.record_score(session.id, report).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        // The failed attempt must not have partially scored the session.
        let untouched = store.get_practice_session(session.id).await.unwrap().unwrap();
        assert!(!untouched.is_scored());
    }

    #[tokio::test]
    async fn scoring_an_unknown_session_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let practice = PracticeService::new(store.clone() as Arc<dyn StoreService>);

        let err = practice
            .record_score(Uuid::new_v4(), full_marks())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
