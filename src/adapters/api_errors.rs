use crate::domain::error::PipelineError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype over the domain error so the HTTP mapping lives in the adapter
/// layer. 400 is reserved for signature failures (retrying is unproductive);
/// everything else is a 500 so the provider redelivers — safe because the
/// write step is idempotent.
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            PipelineError::WebhookSignature(msg) => {
                tracing::warn!("webhook signature rejected: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "webhook_error",
                    "invalid webhook signature".to_string(),
                )
            }
            PipelineError::Normalization(msg) => {
                tracing::error!("normalization error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "normalization_error",
                    msg.clone(),
                )
            }
            PipelineError::Validation(msg) => {
                tracing::error!("validation error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "validation_error",
                    msg.clone(),
                )
            }
            PipelineError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            PipelineError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
