//! # API Error Types
//!
//! The single translation point from failures to HTTP responses. Handlers
//! return `Result<_, AppError>` and tag store failures with the
//! [`Operation`] that was running; the `IntoResponse` impl picks the status
//! code, the client-facing message, and whether the body carries a
//! `success: false` flag. Store error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homenest_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON error body.
///
/// Property list/create/delete and review routes include `success: false`;
/// the get-by-id, update, auth and validation responses carry only
/// `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
}

impl ErrorBody {
    /// Body with only a `message` field.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: None,
            message: message.into(),
        }
    }

    /// Body with `success: false` and a `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: message.into(),
        }
    }
}

/// The handler operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddProperty,
    ListProperties,
    GetProperty,
    UpdateProperty,
    DeleteProperty,
    AddReview,
    ListReviews,
}

impl Operation {
    /// Client-facing message for a 500.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AddProperty => "Failed to add property",
            Self::ListProperties => "Failed to fetch properties",
            Self::GetProperty => "Failed to fetch property",
            Self::UpdateProperty => "Internal server error",
            Self::DeleteProperty => "Failed to delete property",
            Self::AddReview => "Failed to add review",
            Self::ListReviews => "Failed to fetch reviews",
        }
    }

    /// Client-facing message for a 404.
    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::UpdateProperty => "Property not found or no changes made.",
            Self::GetProperty | Self::DeleteProperty => "Property not found",
            _ => "Not found",
        }
    }

    /// Whether this operation's responses carry a `success` flag.
    pub fn reports_success(self) -> bool {
        !matches!(self, Self::GetProperty | Self::UpdateProperty)
    }

    /// Adapter for `map_err`: tag a store failure with this operation.
    pub fn failed(self) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store {
            operation: self,
            source,
        }
    }

    fn body(self, message: &str) -> ErrorBody {
        if self.reports_success() {
            ErrorBody::failure(message)
        } else {
            ErrorBody::message(message)
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The access guard denied the request (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Body or query string could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Required fields missing (400). Detected before any store call.
    #[error("validation error: {0}")]
    Validation(&'static str),

    /// The operation matched no document (404).
    #[error("not found: {}", .0.not_found_message())]
    NotFound(Operation),

    /// The document store failed (500).
    #[error("{operation:?} failed: {source}")]
    Store {
        operation: Operation,
        source: StoreError,
    },
}

impl AppError {
    /// HTTP status and JSON body for this error.
    pub fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, ErrorBody::message("Unauthorized")),
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, ErrorBody::message(detail.clone())),
            Self::Validation(message) => (StatusCode::BAD_REQUEST, ErrorBody::message(*message)),
            Self::NotFound(operation) => (
                StatusCode::NOT_FOUND,
                operation.body(operation.not_found_message()),
            ),
            Self::Store { operation, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                operation.body(operation.failure_message()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store { operation, source } => {
                tracing::error!(operation = ?operation, error = %source, "store operation failed");
            }
            Self::Unauthorized(reason) => tracing::warn!(%reason, "request denied by access guard"),
            Self::BadRequest(detail) => tracing::debug!(%detail, "rejected malformed request"),
            _ => {}
        }

        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
