pub mod analyze;
pub mod health;
pub mod jobs;
pub mod metrics;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::analysis::ErrorResponse;
use crate::services::orchestrator::AnalysisError;

/// Maps pipeline errors onto HTTP responses. Inference failures surface as
/// 502 after the job has already been recorded as `failed`, so the caller
/// can still inspect the stored error via the job endpoints.
pub struct ApiError(pub AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        Self(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self(AnalysisError::Database(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AnalysisError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AnalysisError::NotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            AnalysisError::Inference(_) => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            AnalysisError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
