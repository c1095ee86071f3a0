//! crates/speaking_master_core/src/services/phrases.rs
//!
//! Owner-scoped CRUD over saved phrases. Every read and mutation takes the
//! owner id as a mandatory filter, so cross-user access is impossible by
//! construction rather than by caller discipline.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::SavedPhrase;
use crate::ports::{PortError, PortResult, StoreService};

pub struct PhraseRepository {
    store: Arc<dyn StoreService>,
}

impl PhraseRepository {
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        Self { store }
    }

    /// Persists a new phrase with `is_mastered` false and returns the
    /// stored entity including its generated id and timestamp.
    pub async fn save(
        &self,
        user_id: Uuid,
        phrase: &str,
        context: &str,
        category: &str,
    ) -> PortResult<SavedPhrase> {
        if phrase.trim().is_empty() {
            return Err(PortError::Validation("phrase must not be empty".to_string()));
        }
        self.store
            .insert_phrase(user_id, phrase, context, category)
            .await
    }

    pub async fn get(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<SavedPhrase> {
        self.store
            .get_phrase(phrase_id, owner_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Phrase {} not found", phrase_id)))
    }

    /// All phrases owned by the user, most recent first. Unbounded.
    pub async fn list_by_user(&self, user_id: Uuid) -> PortResult<Vec<SavedPhrase>> {
        self.store.list_phrases_by_user(user_id).await
    }

    /// Returns whether a deletion occurred; deleting an absent id is not an
    /// error.
    pub async fn delete(&self, phrase_id: Uuid, owner_id: Uuid) -> PortResult<bool> {
        self.store.delete_phrase(phrase_id, owner_id).await
    }

    pub async fn set_mastered(
        &self,
        phrase_id: Uuid,
        owner_id: Uuid,
        is_mastered: bool,
    ) -> PortResult<SavedPhrase> {
        self.store
            .set_phrase_mastered(phrase_id, owner_id, is_mastered)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Phrase {} not found", phrase_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    async fn user_id(store: &Arc<MemoryStore>, identifier: &str) -> Uuid {
        store.create_or_get_user(identifier).await.unwrap().id
    }

    #[tokio::test]
    async fn saved_phrase_appears_only_in_owners_list() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;
        let bob = user_id(&store, "bob").await;

        let saved = phrases
            .save(alice, "on the other hand", "contrasting two views", "transition")
            .await
            .unwrap();
        assert!(!saved.is_mastered);

        let alices = phrases.list_by_user(alice).await.unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].id, saved.id);

        let bobs = phrases.list_by_user(bob).await.unwrap();
        assert!(bobs.is_empty());
    }

    #[tokio::test]
    async fn list_is_most_recent_first() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;

        let first = phrases.save(alice, "for instance", "", "example").await.unwrap();
        let second = phrases.save(alice, "in conclusion", "", "conclusion").await.unwrap();

        let listed = phrases.list_by_user(alice).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn empty_phrase_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;

        let err = phrases.save(alice, "  ", "", "transition").await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn get_does_not_cross_owners() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;
        let bob = user_id(&store, "bob").await;

        let saved = phrases.save(alice, "to sum up", "", "conclusion").await.unwrap();

        let err = phrases.get(saved.id, bob).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        let owned = phrases.get(saved.id, alice).await.unwrap();
        assert_eq!(owned.id, saved.id);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;

        let saved = phrases.save(alice, "as a result", "", "transition").await.unwrap();
        assert!(phrases.delete(saved.id, alice).await.unwrap());
        // Second delete of the same id is a clean false, not an error.
        assert!(!phrases.delete(saved.id, alice).await.unwrap());
    }

    #[tokio::test]
    async fn set_mastered_on_deleted_phrase_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;

        let saved = phrases.save(alice, "that said", "", "transition").await.unwrap();
        phrases.delete(saved.id, alice).await.unwrap();

        let err = phrases.set_mastered(saved.id, alice, true).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn set_mastered_updates_the_flag() {
        let store = Arc::new(MemoryStore::new());
        let phrases = PhraseRepository::new(store.clone() as Arc<dyn StoreService>);
        let alice = user_id(&store, "alice").await;

        let saved = phrases.save(alice, "by contrast", "", "transition").await.unwrap();
        let updated = phrases.set_mastered(saved.id, alice, true).await.unwrap();
        assert!(updated.is_mastered);

        let fetched = phrases.get(saved.id, alice).await.unwrap();
        assert!(fetched.is_mastered);
    }
}
