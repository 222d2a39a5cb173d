use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI service payment required. Please contact support.")]
    QuotaExceeded,

    #[error("AI analysis failed")]
    Llm(String),

    #[error("Invalid analysis format from AI")]
    AnalysisFormat(String),

    #[error("Failed to save analysis")]
    Persistence(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    S3(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            AppError::QuotaExceeded => (
                StatusCode::PAYMENT_REQUIRED,
                "AI service payment required. Please contact support.".to_string(),
            ),
            AppError::Llm(detail) => {
                tracing::error!("LLM error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI analysis failed".to_string(),
                )
            }
            AppError::AnalysisFormat(detail) => {
                tracing::error!("Unusable analysis output: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Invalid analysis format from AI".to_string(),
                )
            }
            AppError::Persistence(detail) => {
                tracing::error!("Persistence error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save analysis".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::S3(detail) => {
                tracing::error!("S3 error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Rate-limit and quota signals from the generation service keep their
/// distinct status codes; everything else collapses to a generic failure.
impl From<LlmError> for AppError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::RateLimited => AppError::RateLimited,
            LlmError::QuotaExceeded => AppError::QuotaExceeded,
            other => AppError::Llm(other.to_string()),
        }
    }
}
