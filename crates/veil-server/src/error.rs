use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use veil_core::error::CoreError;

use crate::pipeline::PipelineError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    UnsupportedMediaType(String),
    PayloadTooLarge(String),
    DetectionFailed(String),
    GenerationFailed(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            ApiError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "invalid_input", msg)
            }
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "invalid_input", msg),
            ApiError::DetectionFailed(msg) => (StatusCode::BAD_GATEWAY, "detection_failed", msg),
            ApiError::GenerationFailed(msg) => (StatusCode::BAD_GATEWAY, "generation_failed", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidInput(core) => core.into(),
            e @ PipelineError::TooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            e @ PipelineError::Detection(_) => ApiError::DetectionFailed(e.to_string()),
            e @ PipelineError::Generation(_) => ApiError::GenerationFailed(e.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType(e.to_string()),
            CoreError::InvalidDataUri(_)
            | CoreError::MediaTypeMismatch { .. }
            | CoreError::InvalidImage(_)
            | CoreError::InvalidSetting { .. } => ApiError::InvalidInput(e.to_string()),
            CoreError::SchemaViolation(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidInput(rejection.body_text())
        }
    }
}

impl From<veil_bedrock::error::BedrockError> for ApiError {
    fn from(e: veil_bedrock::error::BedrockError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
