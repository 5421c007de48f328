use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::ProviderError;
use crate::tailoring::tailor::TailorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tailoring error: {0}")]
    Tailor(#[from] TailorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Tailor(TailorError::Provider(ProviderError::MissingCredential(provider))) => {
                tracing::error!("Tailoring provider {provider} has no API key configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The tailoring service is not configured".to_string(),
                )
            }
            AppError::Tailor(TailorError::Provider(ProviderError::Backend(e))) => {
                tracing::error!("LLM backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Tailor(e @ TailorError::Provider(ProviderError::EmptyResponse))
            | AppError::Tailor(e @ TailorError::Parse(_)) => {
                tracing::warn!("Tailoring produced no usable result: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TAILORING_FAILED",
                    "Tailoring failed, please retry".to_string(),
                )
            }
            AppError::Tailor(TailorError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CANCELLED",
                "The request was cancelled before tailoring finished".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
