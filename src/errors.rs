use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use sea_orm::error::DbErr;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::order::OrderStatus;

/// Error type shared by every service and handler in the API.
///
/// Services return `ServiceError` directly; handlers rely on the
/// `IntoResponse` impl below, so the HTTP mapping lives in exactly one
/// place ([`ServiceError::status_code`]).
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Sign-up was rejected by the identity store (duplicate email,
    /// unusable password). Nothing has been persisted when this is
    /// returned.
    #[error("Identity error: {0}")]
    IdentityError(String),

    /// The order status graph forbids this edge. Also returned to the
    /// loser of two racing transitions on the same order.
    #[error("Cannot transition order from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The profile row for a freshly created identity never showed up
    /// within the reconciliation wait bound. Provisioning recovers from
    /// this internally; it only escapes if the fallback write fails too.
    #[error("Profile for identity {0} was not reconciled in time")]
    ReconciliationTimeout(Uuid),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// HTTP status category, e.g. "Not Found".
    pub error: String,
    /// Human-readable description safe to show to clients.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp of when the error occurred.
    pub timestamp: String,
}

impl ServiceError {
    /// Single source of truth for the HTTP status of each variant.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthError(_) => StatusCode::UNAUTHORIZED,
            Self::IdentityError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::ReconciliationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to clients. Internal failures collapse to a
    /// generic string; the full error is logged server-side instead.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}
