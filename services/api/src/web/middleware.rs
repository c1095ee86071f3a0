//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::{error_response, state::AppState};

/// Middleware that resolves the `session_token` query parameter and injects
/// the authenticated user into request extensions for handlers to use.
///
/// A missing, invalid, or expired token is rejected with 401 before the
/// handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    // Tokens are URL-safe base64, so the raw query pair needs no decoding.
    let session_token = req
        .uri()
        .query()
        .and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("session_token="))
        })
        .unwrap_or_default()
        .to_string();

    let user = state
        .sessions
        .resolve_token(&session_token)
        .await
        .map_err(|e| error_response("authenticate request", e))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
