//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use speaking_master_core::ports::StoreService;
use speaking_master_core::services::{
    ArchiveService, PhraseRepository, PracticeService, SessionService,
};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub sessions: SessionService,
    pub phrases: PhraseRepository,
    pub archive: ArchiveService,
    pub practice: PracticeService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every service to the same store handle. Tests substitute an
    /// isolated store by passing a different implementation here.
    pub fn new(store: Arc<dyn StoreService>, config: Arc<Config>) -> Self {
        Self {
            sessions: SessionService::new(store.clone(), config.session_ttl_days),
            phrases: PhraseRepository::new(store.clone()),
            archive: ArchiveService::new(store.clone()),
            practice: PracticeService::new(store),
            config,
        }
    }
}
