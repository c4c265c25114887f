// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// None of these are fatal: each leaves the tracker in a usable,
/// possibly reduced, state.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Could not get your position: {0}")]
    GeolocationDenied(String),

    #[error("Timed out waiting for your position")]
    GeolocationTimeout,

    #[error("Please enter a positive number ({0})")]
    InvalidEntryInput(String),

    #[error("Map is not available")]
    MapUnavailable,

    #[error("Click on the map to choose a location first")]
    NoPendingLocation,

    #[error("Saved workouts are corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Failed to save workouts: {0}")]
    StorageWrite(String),

    #[error("Failed to read saved workouts: {0}")]
    StorageRead(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the message is meant to be shown to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::GeolocationDenied(_)
                | AppError::GeolocationTimeout
                | AppError::InvalidEntryInput(_)
                | AppError::NoPendingLocation
        )
    }
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
        let (status, error) = match &self {
            AppError::InvalidEntryInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            AppError::MapUnavailable => (StatusCode::CONFLICT, "map_unavailable"),
            AppError::NoPendingLocation => (StatusCode::CONFLICT, "no_pending_location"),
            AppError::GeolocationDenied(_) | AppError::GeolocationTimeout => {
                (StatusCode::SERVICE_UNAVAILABLE, "geolocation_unavailable")
            }
            AppError::StorageCorrupt(msg)
            | AppError::StorageWrite(msg)
            | AppError::StorageRead(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        // Only user-facing messages leave the server
        let body = ErrorResponse {
            error: error.to_string(),
            details: self.is_user_facing().then(|| self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
