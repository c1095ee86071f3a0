//! services/api/src/web/practice.rs
//!
//! Practice-session endpoints: one row is persisted when a problem is
//! generated and updated once when scoring completes. The generation and
//! scoring engines themselves live elsewhere; these routes only own the
//! storage lifecycle.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use speaking_master_core::domain::{NewPracticeSession, PracticeSession, ScoreReport, TaskType};
use speaking_master_core::ports::PortError;

use crate::web::{auth::SessionTokenParams, error_response, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePracticeSessionRequest {
    /// One of "task1" through "task4".
    pub task_type: String,
    pub question: String,
    pub reading_text: Option<String>,
    pub lecture_script: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PracticeSessionResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub task_type: String,
    pub question: String,
    pub user_transcript: Option<String>,
    pub overall_score: Option<i32>,
    pub delivery_score: Option<i32>,
    pub language_use_score: Option<i32>,
    pub topic_dev_score: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub feedback_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<PracticeSession> for PracticeSessionResponse {
    fn from(session: PracticeSession) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            task_type: session.task_type.to_string(),
            question: session.question,
            user_transcript: session.user_transcript,
            overall_score: session.overall_score,
            delivery_score: session.delivery_score,
            language_use_score: session.language_use_score,
            topic_dev_score: session.topic_dev_score,
            feedback_json: session.feedback_json,
            created_at: session.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ScoreRequest {
    pub user_transcript: String,
    pub overall_score: i32,
    pub delivery_score: i32,
    pub language_use_score: i32,
    pub topic_dev_score: i32,
    #[schema(value_type = Object)]
    pub feedback: serde_json::Value,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/practice/sessions - Persist a freshly generated problem
#[utoipa::path(
    post,
    path = "/api/practice/sessions",
    request_body = CreatePracticeSessionRequest,
    params(
        ("session_token" = Option<String>, Query, description = "Optional session token; absent or expired tokens record the attempt anonymously")
    ),
    responses(
        (status = 201, description = "Practice session created", body = PracticeSessionResponse),
        (status = 400, description = "Unknown task type or empty question"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_practice_session_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionTokenParams>,
    Json(req): Json<CreatePracticeSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let task_type = req
        .task_type
        .parse::<TaskType>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // Anonymous practice is valid: a missing or rejected token just leaves
    // user_id empty rather than failing the request.
    let user_id = match params.session_token.as_deref() {
        Some(token) => match state.sessions.resolve_token(token).await {
            Ok(user) => Some(user.id),
            Err(PortError::Unauthorized) => None,
            Err(e) => return Err(error_response("create practice session", e)),
        },
        None => None,
    };

    let session = state
        .practice
        .create(NewPracticeSession {
            user_id,
            task_type,
            question: req.question,
            reading_text: req.reading_text,
            lecture_script: req.lecture_script,
        })
        .await
        .map_err(|e| error_response("create practice session", e))?;

    Ok((
        StatusCode::CREATED,
        Json(PracticeSessionResponse::from(session)),
    ))
}

/// POST /api/practice/sessions/{session_id}/score - Record the scoring result
#[utoipa::path(
    post,
    path = "/api/practice/sessions/{session_id}/score",
    request_body = ScoreRequest,
    params(
        ("session_id" = Uuid, Path, description = "Practice session id")
    ),
    responses(
        (status = 200, description = "Scores recorded", body = PracticeSessionResponse),
        (status = 400, description = "Score out of range or session already scored"),
        (status = 404, description = "Practice session not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn score_practice_session_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ScoreRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scored = state
        .practice
        .record_score(
            session_id,
            ScoreReport {
                user_transcript: req.user_transcript,
                overall_score: req.overall_score,
                delivery_score: req.delivery_score,
                language_use_score: req.language_use_score,
                topic_dev_score: req.topic_dev_score,
                feedback: req.feedback,
            },
        )
        .await
        .map_err(|e| error_response("score practice session", e))?;

    Ok(Json(PracticeSessionResponse::from(scored)))
}
