//! # API Error Types
//!
//! Everything a handler can fail with, and how it reaches the client.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError::NotFound                          → 404                      │
//! │  DbError::Validation / UniqueViolation      → 400                      │
//! │  DbError::ForeignKeyViolation               → 400                      │
//! │  DbError::InvalidMaterial                   → 400                      │
//! │  ValidationError, malformed JSON/path/query → 400                      │
//! │  empty report window                        → 404                      │
//! │  any other DbError, RenderError             → 500 (logged, not shown)  │
//! │                                                                         │
//! │  Body: { "message": "..." }                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use veta_core::ValidationError;
use veta_db::DbError;
use veta_report::RenderError;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(DbError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) | ApiError::Render(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Validation(_)
            | DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::InvalidMaterial { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Persistence(other),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_client_statuses() {
        let not_found: ApiError = DbError::not_found("Withdrawal", "9").into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let duplicate: ApiError = DbError::duplicate("name", "Cobre").into();
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

        let invalid: ApiError = DbError::InvalidMaterial { material_id: 4 }.into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Persistence(_)));
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err: ApiError = ValidationError::Required {
            field: "level".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "level is required");
    }
}
