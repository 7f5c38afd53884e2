//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from murima-core, murima-state, murima-listing, and
//! murima-media to HTTP status codes. Returns JSON error bodies with a
//! machine-readable code, message, and optional details. Never exposes
//! internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface. The
/// `details` field carries navigational context for 401/403 responses and
/// is omitted everywhere else.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, present only where the client can act on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422). Normalized with `Validation`:
    /// the client sent syntactically valid HTTP but semantically invalid
    /// content. Only malformed HTTP framing is 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid session token (401).
    /// The response body carries the sign-in redirect target.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authorization failure — the caller's role does not satisfy the
    /// route's requirement (403). The body names the requirement.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state, e.g. an illegal lifecycle
    /// transition (409). The message lists the legal next states.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),

    /// Role resolution still in flight or a dependency not ready (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    /// Navigational details for the response body.
    ///
    /// 401 carries the sign-in route so clients can redirect while
    /// preserving their current location; 403 carries the admin portal
    /// path so denied users know where access is managed.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Unauthenticated(_) => Some(serde_json::json!({ "redirect": "/auth" })),
            Self::Forbidden(_) => Some(serde_json::json!({ "admin_portal": "/admin" })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert murima-core validation errors to API errors.
impl From<murima_core::ValidationError> for AppError {
    fn from(err: murima_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert lifecycle errors to API errors. Illegal transitions are state
/// conflicts (409); a missing or negative quote amount is a request
/// problem (422).
impl From<murima_state::LifecycleError> for AppError {
    fn from(err: murima_state::LifecycleError) -> Self {
        match &err {
            murima_state::LifecycleError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            murima_state::LifecycleError::MissingAmount
            | murima_state::LifecycleError::InvalidAmount(_) => Self::Validation(err.to_string()),
        }
    }
}

/// Convert media store errors to API errors. Upload failures and bad file
/// names are client-visible (the batch names the failing file); a missing
/// object during rollback is an internal inconsistency.
impl From<murima_media::MediaError> for AppError {
    fn from(err: murima_media::MediaError) -> Self {
        match &err {
            murima_media::MediaError::UploadFailed { .. }
            | murima_media::MediaError::MissingExtension(_) => Self::Validation(err.to_string()),
            murima_media::MediaError::NotFound(_) => Self::Internal(err.to_string()),
        }
    }
}
