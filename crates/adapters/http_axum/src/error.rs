//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use coredata_domain::error::CoreDataError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`CoreDataError`] to an HTTP response with appropriate status code.
pub enum ApiError {
    Core(CoreDataError),
    /// An unbounded listing holds more records than a single response may carry.
    LimitExceeded { limit: usize },
}

impl From<CoreDataError> for ApiError {
    fn from(err: CoreDataError) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Core(err @ CoreDataError::NotFound(_)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Core(err @ (CoreDataError::NotUnique(_) | CoreDataError::Integrity(_))) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            Self::Core(err @ CoreDataError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Core(CoreDataError::Unavailable(err)) => {
                tracing::error!(error = %err, "collaborator unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service unavailable".to_string(),
                )
            }
            Self::LimitExceeded { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("result exceeds the read limit of {limit}"),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
