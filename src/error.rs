//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or empty `url` on a request.
    #[error("URL is required")]
    MissingUrl,

    /// Missing field on the dataset-update request.
    #[error("URL and prediction are required")]
    MissingFeedbackFields,

    /// URL the splitter cannot decompose.
    #[error("failed to parse URL: {0}")]
    Parse(String),

    /// Entropy over an empty string. Extraction guards against this; seeing
    /// it surface means a bug, not bad user input.
    #[error("entropy of an empty string is undefined")]
    EmptyInput,

    /// Feature schema drift between a vector and the dataset or model.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Dataset artifact missing; it must be seeded externally.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// Dataset artifact present but unreadable.
    #[error("dataset corrupt: {0}")]
    DatasetCorrupt(String),

    /// Degenerate dataset at retrain time. Never surfaced to callers; the
    /// pipeline logs it and keeps the previous model in service.
    #[error("training failed: {0}")]
    Training(String),

    /// Model artifact load or prediction failure.
    #[error("model error: {0}")]
    Model(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingUrl => (StatusCode::BAD_REQUEST, "URL is required".to_string()),
            AppError::MissingFeedbackFields => (
                StatusCode::BAD_REQUEST,
                "URL and prediction are required".to_string(),
            ),
            AppError::Parse(msg) => (
                StatusCode::BAD_REQUEST,
                format!("failed to parse URL: {msg}"),
            ),
            AppError::SchemaMismatch(msg) => {
                tracing::error!("schema mismatch: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Feature schema mismatch".to_string(),
                )
            }
            AppError::EmptyInput
            | AppError::DatasetNotFound(_)
            | AppError::DatasetCorrupt(_)
            | AppError::Training(_)
            | AppError::Model(_)
            | AppError::Io(_) => {
                tracing::error!("internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
