//! services/api/src/web/phrases.rs
//!
//! Saved-phrase CRUD for the authenticated user. Every route here sits
//! behind the `require_auth` middleware, which injects the resolved `User`
//! into request extensions; ownership is enforced by the repository calls
//! themselves, which all take the owner id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use speaking_master_core::domain::{SavedPhrase, User};

use crate::web::{error_response, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SavePhraseRequest {
    pub phrase: String,
    /// Usage example or surrounding context.
    #[serde(default)]
    pub context: String,
    /// Free-form tag, e.g. "transition", "example", "conclusion".
    #[serde(default)]
    pub category: String,
}

#[derive(Serialize, ToSchema)]
pub struct PhraseResponse {
    pub id: Uuid,
    pub phrase: String,
    pub context: String,
    pub category: String,
    pub is_mastered: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SavedPhrase> for PhraseResponse {
    fn from(phrase: SavedPhrase) -> Self {
        Self {
            id: phrase.id,
            phrase: phrase.phrase,
            context: phrase.context,
            category: phrase.category,
            is_mastered: phrase.is_mastered,
            created_at: phrase.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PhraseListResponse {
    pub phrases: Vec<PhraseResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct DeletePhraseResponse {
    pub deleted: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct SetMasteredRequest {
    pub is_mastered: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/phrases - Save a new phrase for the authenticated user
#[utoipa::path(
    post,
    path = "/api/phrases",
    request_body = SavePhraseRequest,
    params(
        ("session_token" = String, Query, description = "Session token")
    ),
    responses(
        (status = 201, description = "Phrase saved", body = PhraseResponse),
        (status = 400, description = "Empty phrase"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_phrase_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<SavePhraseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let saved = state
        .phrases
        .save(user.id, &req.phrase, &req.context, &req.category)
        .await
        .map_err(|e| error_response("save phrase", e))?;

    Ok((StatusCode::CREATED, Json(PhraseResponse::from(saved))))
}

/// GET /api/phrases - All phrases of the authenticated user, most recent first
#[utoipa::path(
    get,
    path = "/api/phrases",
    params(
        ("session_token" = String, Query, description = "Session token")
    ),
    responses(
        (status = 200, description = "The user's saved phrases", body = PhraseListResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_phrases_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let phrases = state
        .phrases
        .list_by_user(user.id)
        .await
        .map_err(|e| error_response("list phrases", e))?;

    Ok(Json(PhraseListResponse {
        phrases: phrases.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /api/phrases/{phrase_id} - Delete one of the user's phrases
#[utoipa::path(
    delete,
    path = "/api/phrases/{phrase_id}",
    params(
        ("phrase_id" = Uuid, Path, description = "Phrase id"),
        ("session_token" = String, Query, description = "Session token")
    ),
    responses(
        (status = 200, description = "Phrase deleted", body = DeletePhraseResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 404, description = "Phrase not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_phrase_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(phrase_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let deleted = state
        .phrases
        .delete(phrase_id, user.id)
        .await
        .map_err(|e| error_response("delete phrase", e))?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Phrase not found".to_string()));
    }
    Ok(Json(DeletePhraseResponse { deleted: true }))
}

/// PATCH /api/phrases/{phrase_id}/mastered - Toggle the mastered flag
#[utoipa::path(
    patch,
    path = "/api/phrases/{phrase_id}/mastered",
    request_body = SetMasteredRequest,
    params(
        ("phrase_id" = Uuid, Path, description = "Phrase id"),
        ("session_token" = String, Query, description = "Session token")
    ),
    responses(
        (status = 200, description = "Phrase updated", body = PhraseResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 404, description = "Phrase not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn set_phrase_mastered_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(phrase_id): Path<Uuid>,
    Json(req): Json<SetMasteredRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let updated = state
        .phrases
        .set_mastered(phrase_id, user.id, req.is_mastered)
        .await
        .map_err(|e| error_response("update phrase", e))?;

    Ok(Json(PhraseResponse::from(updated)))
}
