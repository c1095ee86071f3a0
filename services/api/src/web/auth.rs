//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for simple login, session verification, and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{error_response, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SimpleLoginRequest {
    /// The opaque external identifier of the user.
    pub user_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct SimpleLoginResponse {
    pub session_token: String,
    pub user_id: Uuid,
}

/// The `session_token` query parameter shared by verify and logout.
#[derive(Deserialize)]
pub struct SessionTokenParams {
    pub session_token: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub user_identifier: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/simple-login - Create or retrieve the user and issue a session token
#[utoipa::path(
    post,
    path = "/api/auth/simple-login",
    request_body = SimpleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SimpleLoginResponse),
        (status = 400, description = "Empty user identifier"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn simple_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimpleLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let login = state
        .sessions
        .login(&req.user_id)
        .await
        .map_err(|e| error_response("create login session", e))?;

    Ok(Json(SimpleLoginResponse {
        session_token: login.session_token,
        user_id: login.user.id,
    }))
}

/// GET /api/auth/verify - Check whether a session token is still valid
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    params(
        ("session_token" = Option<String>, Query, description = "The session token to verify")
    ),
    responses(
        (status = 200, description = "Session is valid", body = VerifyResponse),
        (status = 401, description = "Missing, invalid, or expired session token")
    )
)]
pub async fn verify_session_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionTokenParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = params.session_token.unwrap_or_default();
    let user = state
        .sessions
        .resolve_token(&token)
        .await
        .map_err(|e| error_response("verify session", e))?;

    Ok(Json(VerifyResponse {
        valid: true,
        user_id: user.id,
        user_identifier: user.user_identifier,
    }))
}

/// POST /api/auth/logout - Delete the session row; idempotent
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    params(
        ("session_token" = Option<String>, Query, description = "The session token to invalidate")
    ),
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionTokenParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(token) = params.session_token {
        state
            .sessions
            .logout(&token)
            .await
            .map_err(|e| error_response("log out", e))?;
    }

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
