//! Lathi — API error types.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lathi_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// A content pack could not be imported.
    #[error("import error: {0}")]
    Import(#[from] DomainError),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(DomainError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::ChapterNotFound(_) => (StatusCode::NOT_FOUND, "chapter_not_found"),
            DomainError::SlideNotFound(_) => (StatusCode::NOT_FOUND, "slide_not_found"),
            DomainError::SessionNotStarted(_) => (StatusCode::NOT_FOUND, "session_not_started"),
            DomainError::SessionEnded(_) => (StatusCode::CONFLICT, "session_ended"),
            DomainError::SlideMismatch { .. } => (StatusCode::CONFLICT, "slide_mismatch"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::InvalidAction(_) => (StatusCode::BAD_REQUEST, "invalid_action"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        // Storage details stay in the logs.
        let message = if self.0.is_caller_error() {
            self.0.to_string()
        } else {
            "internal server error, please retry".to_owned()
        };

        (status, Json(ErrorBody { error: error_code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_not_found_variants_map_to_404() {
        let id = Uuid::new_v4();
        for err in [
            DomainError::ChapterNotFound(id),
            DomainError::SlideNotFound(id),
            DomainError::SessionNotStarted(id),
        ] {
            assert_eq!(status_of(err), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_state_conflicts_map_to_409() {
        let id = Uuid::new_v4();
        for err in [
            DomainError::SessionEnded(id),
            DomainError::SlideMismatch {
                submitted: id,
                current: Uuid::new_v4(),
            },
            DomainError::ConcurrencyConflict {
                aggregate_id: id,
                expected: 1,
            },
        ] {
            assert_eq!(status_of(err), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn test_bad_requests_map_to_400() {
        assert_eq!(
            status_of(DomainError::InvalidAction("choice 5 out of range".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_infrastructure_maps_to_500_without_details() {
        // Arrange
        let err = DomainError::Infrastructure("relation \"slides\" does not exist".into());

        // Act
        let response = ApiError(err).into_response();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(json["error"], "infrastructure_error");
        assert!(!json["message"].as_str().unwrap().contains("slides"));
    }
}
