//! Error types for big5-pi
//!
//! - [`FatalConfigError`]: the pipeline cannot produce valid predictions
//!   (bad artifact, wrong feature width, embedding model init failure).
//!   Never retried; blocks startup.
//! - [`ExtractionError`]: recoverable topic-estimation failure, absorbed into
//!   a zero vector inside the extractor and only visible in logs.
//! - [`PredictionError`]: any unrecoverable failure while scoring a batch.
//!   The whole batch fails; no partial profile.
//! - [`ApiError`]: HTTP boundary errors (request validation included).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error that prevents the service from serving predictions
#[derive(Debug, Error)]
pub enum FatalConfigError {
    /// A feature segment has the wrong width
    #[error("Feature segment '{segment}' has length {actual}, expected {expected}")]
    SegmentLength {
        segment: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Required artifact file does not exist
    #[error("Model artifact not found: {0}")]
    MissingArtifact(PathBuf),

    /// Artifact exists but cannot be used
    #[error("Invalid model artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },

    /// Sentence embedding model failed to initialize
    #[error("Embedding model failed to initialize: {0}")]
    EmbeddingInit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FatalConfigError {
    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FatalConfigError::InvalidArtifact {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Recoverable topic-estimation failure
#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    /// Vocabulary or topic artifact was not loaded
    #[error("Topic artifact unavailable: {0}")]
    ArtifactUnavailable(&'static str),

    /// Vocabulary width and topic model width disagree
    #[error("Vocabulary has {vocabulary} terms but topic model expects {topic_model}")]
    VocabularyMismatch { vocabulary: usize, topic_model: usize },

    /// Projection produced a non-finite or degenerate distribution
    #[error("Topic projection failed: {0}")]
    Projection(String),
}

/// Failure while scoring a batch of comments
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Empty batch (must be rejected by the caller)
    #[error("No comments provided")]
    EmptyBatch,

    #[error(transparent)]
    Config(#[from] FatalConfigError),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Regressor invocation failed: {0}")]
    Regressor(String),

    /// Worker thread or task failed
    #[error("Prediction worker failed: {0}")]
    Worker(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Prediction failed and no fallback is configured (500)
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// big5-common error
    #[error("Common error: {0}")]
    Common(#[from] big5_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Prediction(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PREDICTION_ERROR",
                err.to_string(),
            ),
            ApiError::Common(big5_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
