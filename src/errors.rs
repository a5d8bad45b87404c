use crate::{db::DbError, storage::StorageError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Failures a handler can end in. Duplicate emails and bad credentials are
/// not here: those re-render their form instead of erroring.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    ValidationError(String),
    StorageFailure(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::StorageFailure(msg) => {
                error!("Profile upload failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Profile image upload failed".to_string())
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::InternalError(format!("database: {err}"))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::StorageFailure(err.to_string())
    }
}
