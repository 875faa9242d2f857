use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use pointboard_shared::name::NameError;
use pointboard_shared::types::UserId;
use pointboard_store::StoreError;

/// Errors surfaced by the service layer.
///
/// Validation errors are raised before any mutation; store failures during a
/// claim leave the committed increment as the source of truth.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidName(#[from] NameError),

    #[error("User with this name already exists")]
    DuplicateName,

    #[error("User not found")]
    UserNotFound,

    #[error("User is deactivated")]
    InactiveUser,

    /// A point source produced a value outside `[1, 10]`.  Rejected before
    /// any mutation.
    #[error("Award of {0} points is outside the allowed range")]
    AwardOutOfRange(i64),

    /// Points were incremented but the audit record could not be written.
    /// The increment is retained; this error exists so operators can
    /// reconcile the log against live totals.
    #[error("Awarded {points_awarded} points to user {user_id} but failed to record history: {source}")]
    HistoryAppendFailed {
        user_id: UserId,
        points_awarded: i64,
        source: StoreError,
    },

    #[error("Store unavailable: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServiceError::UserNotFound,
            StoreError::DuplicateName => ServiceError::DuplicateName,
            other => ServiceError::Store(other),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::InvalidName(_) | ServiceError::DuplicateName => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServiceError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServiceError::InactiveUser => (StatusCode::CONFLICT, self.to_string()),
            ServiceError::AwardOutOfRange(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ServiceError::HistoryAppendFailed { .. } => {
                // Surfaced verbatim: the caller must learn the increment
                // committed without its audit record.
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ServiceError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
