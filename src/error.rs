//! Error taxonomy for the document Q&A service.
//!
//! Library modules keep their own error enums; [`AppError`] aggregates them at
//! the request boundary and maps each variant to an HTTP status.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::embedder::EmbedderError;
use crate::indexer::extract::ExtractError;
use crate::llm::GenerationError;
use crate::store::IndexError;

/// Result type alias for request-level operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedderError),

    #[error("No documents uploaded.")]
    NoIndexAvailable,

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Index error: {0}")]
    Index(String),
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Empty => AppError::NoIndexAvailable,
            other => AppError::Index(other.to_string()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Extraction(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::InvalidRequest(err.body_text())
        }
    }
}

impl AppError {
    /// Client-caused failures are 400, upstream model failures 502.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFileType(_)
            | AppError::Extraction(_)
            | AppError::NoIndexAvailable
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Embedding(_) | AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
