//! crates/speaking_master_core/src/services/session.rs
//!
//! Session lifecycle: opaque token issuance, token-to-user resolution with
//! lazy expiry cleanup, and logout.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::domain::User;
use crate::ports::{PortError, PortResult, StoreService};

/// Entropy of a freshly issued session token, before encoding.
const TOKEN_BYTES: usize = 32;

/// A successful login: the freshly issued token and the owning user.
#[derive(Debug, Clone)]
pub struct Login {
    pub session_token: String,
    pub user: User,
}

/// Issues and validates opaque session tokens with a fixed time-to-live.
pub struct SessionService {
    store: Arc<dyn StoreService>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn StoreService>, ttl_days: i64) -> Self {
        Self {
            store,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Looks up a user by external identifier, creating one on first login.
    /// Idempotent: the store's uniqueness constraint guards the
    /// check-then-act sequence under concurrent first logins.
    pub async fn create_or_get_user(&self, user_identifier: &str) -> PortResult<User> {
        if user_identifier.trim().is_empty() {
            return Err(PortError::Validation(
                "user identifier must not be empty".to_string(),
            ));
        }
        self.store.create_or_get_user(user_identifier).await
    }

    /// Resolves (or creates) the user and persists a new session row.
    /// Every call issues a fresh token; earlier sessions stay valid.
    pub async fn login(&self, user_identifier: &str) -> PortResult<Login> {
        let user = self.create_or_get_user(user_identifier).await?;

        let session_token = generate_session_token();
        let expires_at = Utc::now() + self.ttl;
        self.store
            .insert_auth_session(user.id, &session_token, expires_at)
            .await?;

        Ok(Login { session_token, user })
    }

    /// Resolves a token to its user. An absent, malformed, or expired token
    /// is `Unauthorized`; an expired row is deleted as a side effect of the
    /// lookup (lazy cleanup - there is no background sweep).
    pub async fn resolve_token(&self, session_token: &str) -> PortResult<User> {
        if session_token.is_empty() {
            return Err(PortError::Unauthorized);
        }

        let session = match self.store.get_auth_session(session_token).await? {
            Some(session) => session,
            None => return Err(PortError::Unauthorized),
        };

        if session.is_expired(Utc::now()) {
            self.store.delete_auth_session(session_token).await?;
            return Err(PortError::Unauthorized);
        }

        self.store.get_user_by_id(session.user_id).await
    }

    /// Deletes the session row if present. Logging out an unknown token is
    /// not an error.
    pub async fn logout(&self, session_token: &str) -> PortResult<()> {
        self.store.delete_auth_session(session_token).await?;
        Ok(())
    }
}

/// 32 bytes from the OS randomness source, URL-safe base64 encoded.
/// `OsRng` panics if the source fails; that is treated as unrecoverable.
fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
