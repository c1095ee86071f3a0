//! services/api/src/web/mod.rs
//!
//! Axum handlers, shared state, auth middleware, and the master OpenAPI
//! definition for the REST API.

pub mod archive;
pub mod auth;
pub mod middleware;
pub mod phrases;
pub mod practice;
pub mod state;

pub use middleware::require_auth;

use axum::http::StatusCode;
use speaking_master_core::ports::PortError;
use tracing::error;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::simple_login_handler,
        auth::verify_session_handler,
        auth::logout_handler,
        archive::list_task1_questions_handler,
        archive::get_task1_question_handler,
        phrases::save_phrase_handler,
        phrases::list_phrases_handler,
        phrases::delete_phrase_handler,
        phrases::set_phrase_mastered_handler,
        practice::create_practice_session_handler,
        practice::score_practice_session_handler,
    ),
    components(schemas(
        auth::SimpleLoginRequest,
        auth::SimpleLoginResponse,
        auth::VerifyResponse,
        auth::LogoutResponse,
        archive::Task1QuestionResponse,
        archive::Task1ArchiveResponse,
        phrases::SavePhraseRequest,
        phrases::PhraseResponse,
        phrases::PhraseListResponse,
        phrases::DeletePhraseResponse,
        phrases::SetMasteredRequest,
        practice::CreatePracticeSessionRequest,
        practice::PracticeSessionResponse,
        practice::ScoreRequest,
    )),
    tags(
        (name = "Speaking Master API", description = "Practice and scoring backend for spoken-language test preparation.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port error onto the HTTP boundary. Domain failures (NotFound,
/// Validation, Unauthorized) pass through with their message; unexpected
/// store errors are logged server-side and collapsed to an opaque 500.
pub(crate) fn error_response(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "Invalid or expired session".to_string(),
        ),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", context, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", context),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_their_status_codes() {
        let (status, body) = error_response("x", PortError::NotFound("missing thing".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "missing thing");

        let (status, _) = error_response("x", PortError::Validation("bad limit".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response("x", PortError::Unauthorized);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unexpected_errors_do_not_leak_internal_detail() {
        let (status, body) = error_response(
            "fetch task1 questions",
            PortError::Unexpected("connection refused at 10.0.0.5:5432".to_string()),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("10.0.0.5"));
        assert_eq!(body, "Failed to fetch task1 questions");
    }
}
