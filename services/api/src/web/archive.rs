//! services/api/src/web/archive.rs
//!
//! Read-only archive of past Task1 practice attempts, paginated per user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use speaking_master_core::domain::{PracticeSession, TaskType};

use crate::web::{error_response, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
pub struct ArchiveListParams {
    /// User identifier (the external one, not the row id).
    pub user_id: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct ArchiveItemParams {
    pub user_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct Task1QuestionResponse {
    pub id: Uuid,
    pub question: String,
    pub user_transcript: Option<String>,
    pub overall_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<PracticeSession> for Task1QuestionResponse {
    fn from(session: PracticeSession) -> Self {
        Self {
            id: session.id,
            question: session.question,
            user_transcript: session.user_transcript,
            overall_score: session.overall_score,
            created_at: session.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct Task1ArchiveResponse {
    pub questions: Vec<Task1QuestionResponse>,
    /// Total matching attempts, independent of the pagination window.
    pub total: i64,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/task1-archive/questions - One page of a user's Task1 attempts
#[utoipa::path(
    get,
    path = "/api/task1-archive/questions",
    params(
        ("user_id" = String, Query, description = "User identifier"),
        ("limit" = Option<i64>, Query, description = "Maximum number of questions to return (1-100)"),
        ("offset" = Option<i64>, Query, description = "Number of questions to skip")
    ),
    responses(
        (status = 200, description = "Page of Task1 questions", body = Task1ArchiveResponse),
        (status = 400, description = "Out-of-range pagination parameters"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_task1_questions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArchiveListParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    info!("Fetching task1 questions for user: {}", params.user_id);

    let page = state
        .archive
        .list_questions(
            &params.user_id,
            TaskType::Task1,
            params.limit.unwrap_or(50),
            params.offset.unwrap_or(0),
        )
        .await
        .map_err(|e| error_response("fetch task1 questions", e))?;

    Ok(Json(Task1ArchiveResponse {
        total: page.total,
        questions: page.questions.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/task1-archive/questions/{question_id} - A single Task1 attempt
#[utoipa::path(
    get,
    path = "/api/task1-archive/questions/{question_id}",
    params(
        ("question_id" = String, Path, description = "Practice session id"),
        ("user_id" = String, Query, description = "User identifier")
    ),
    responses(
        (status = 200, description = "The requested question", body = Task1QuestionResponse),
        (status = 400, description = "Malformed question id"),
        (status = 404, description = "User or question not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_task1_question_handler(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
    Query(params): Query<ArchiveItemParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    info!(
        "Fetching task1 question {} for user {}",
        question_id, params.user_id
    );

    let session = state
        .archive
        .get_question(&params.user_id, TaskType::Task1, &question_id)
        .await
        .map_err(|e| error_response("fetch task1 question", e))?;

    Ok(Json(Task1QuestionResponse::from(session)))
}
