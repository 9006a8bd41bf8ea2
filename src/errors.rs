//! Structured error types with machine-readable codes
//! Every API error carries a code, an HTTP status, and a client-safe message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation Errors (400)
    InvalidInput { field: String, reason: String },
    MissingField(String),
    ExternalLinkRejected { field: String },
    InvalidRevalidateType(String),
    InvalidSitemapChunk(String),

    // Auth Errors (401)
    InvalidSecret,

    // Not Found Errors (404)
    NotFound(String),

    // Upstream Errors (502)
    UpstreamError(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::ExternalLinkRejected { .. } => "EXTERNAL_LINK_REJECTED",
            Self::InvalidRevalidateType(_) => "INVALID_REVALIDATE_TYPE",
            Self::InvalidSitemapChunk(_) => "INVALID_SITEMAP_CHUNK",
            Self::InvalidSecret => "INVALID_SECRET",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UpstreamError(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. }
            | Self::MissingField(_)
            | Self::ExternalLinkRejected { .. }
            | Self::InvalidRevalidateType(_)
            | Self::InvalidSitemapChunk(_) => StatusCode::BAD_REQUEST,

            Self::InvalidSecret => StatusCode::UNAUTHORIZED,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::MissingField(field) => format!("Missing required field: {field}"),
            Self::ExternalLinkRejected { field } => {
                format!("Field '{field}' contains an external URL; outbound links are not allowed")
            }
            Self::InvalidRevalidateType(t) => {
                format!("Invalid revalidation type '{t}' (expected: question, category, or cluster)")
            }
            Self::InvalidSitemapChunk(name) => format!("Invalid sitemap chunk: {name}"),
            Self::InvalidSecret => "Invalid secret".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::UpstreamError(msg) => format!("Upstream database error: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
            details: None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Convert from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Axum IntoResponse implementation for proper HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.code()])
            .inc();

        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Helper trait to convert validation errors
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
