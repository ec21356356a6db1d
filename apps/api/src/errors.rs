use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the extraction and matching engine itself.
/// Transport-agnostic: the HTTP layer wraps these in `AppError`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Document contains no readable text")]
    EmptyDocument,

    #[error("Job corpus could not be loaded: {0}")]
    CorpusLoad(String),

    #[error("Invalid match request: {0}")]
    InvalidRequest(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document decoding failed: {0}")]
    Decoding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::Decoding(msg) => {
                tracing::error!("Decoding error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DECODING_ERROR",
                    "The document could not be read".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Engine(EngineError::EmptyDocument) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DOCUMENT",
                self.to_string(),
            ),
            AppError::Engine(EngineError::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            AppError::Engine(EngineError::CorpusLoad(msg)) => {
                tracing::error!("Corpus error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CORPUS_UNAVAILABLE",
                    self.to_string(),
                )
            }
            AppError::Engine(EngineError::Vocabulary(msg)) => {
                tracing::error!("Vocabulary error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "VOCABULARY_ERROR",
                    "Term vocabulary is unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        // `error` stays a plain string: the upload client reads `data.error` directly.
        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}
