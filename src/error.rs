// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent callback responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
///
/// Token decode failures are deliberately absent: they degrade to a missing
/// user id instead of failing the login.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Callback without a code, or with a state that does not match the nonce.
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Fitness API failure. `status` is `None` for transport errors and timeouts.
    #[error("API error ({}): {message}", status_label(.status))]
    Api { status: Option<u16>, message: String },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the API answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Api { status: Some(404), .. })
    }

    /// HTTP status of an API failure, if the server answered at all.
    pub fn api_status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no response".to_string())
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::InvalidCallback(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_callback",
                Some(msg.clone()),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::TokenExchange(_) => {
                (StatusCode::BAD_GATEWAY, "token_exchange_failed", None)
            }
            AppError::Api { status, .. } => (
                StatusCode::BAD_GATEWAY,
                "api_error",
                status.map(|s| format!("upstream status {s}")),
            ),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Session storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
