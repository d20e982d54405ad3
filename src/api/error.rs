//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

use crate::service::{ExportError, OrchestratorError};

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Analysis or image not found (404)
    #[error("Analysis not found: {0}")]
    AnalysisNotFound(String),

    /// Request superseded by a newer one (409)
    #[error("Request superseded by a newer analysis")]
    Superseded,

    /// Invalid snapshot (422)
    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AnalysisNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Superseded => StatusCode::CONFLICT,
            ApiError::InvalidSnapshot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::AnalysisNotFound(_) => "analysis_not_found",
            ApiError::Superseded => "superseded",
            ApiError::InvalidSnapshot(_) => "invalid_snapshot",
            ApiError::Internal(_) => "internal_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::MissingImages => ApiError::BadRequest(err.to_string()),
            OrchestratorError::Superseded => ApiError::Superseded,
            OrchestratorError::Exhausted => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::HashMismatch => ApiError::InvalidSnapshot(err.to_string()),
            ExportError::Serialization(e) => ApiError::Internal(e.to_string()),
        }
    }
}
