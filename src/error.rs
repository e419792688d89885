// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error and response envelopes.
//!
//! Every JSON body produced by the service is wrapped in one of two shapes:
//!
//! ```text
//! { "success": false, "error": "...", "timestamp": "2026-01-01T00:00:00Z" }
//! { "success": true,  "data": { ... }, "timestamp": "2026-01-01T00:00:00Z" }
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Failure envelope shared by every stage and handler.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Success envelope. `data` is omitted for bodiless results.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            timestamp: Utc::now(),
        })
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            timestamp: Utc::now(),
        })
    }
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Request payload failed validation. Rendered as 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.0)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(entity) => Self::not_found(format!("{entity} not found")),
            StorageError::AlreadyExists(entity) => {
                Self::new(StatusCode::CONFLICT, format!("{entity} already exists"))
            }
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                Self::internal("Internal storage error")
            }
        }
    }
}

/// Unparseable or mistyped JSON bodies are all reported as 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let denied = ApiError::forbidden("no");
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        let nf: ApiError = StorageError::NotFound("Bot bot_1".to_string()).into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "Bot bot_1 not found");

        let dup: ApiError = StorageError::AlreadyExists("Bot bot_1".to_string()).into();
        assert_eq!(dup.status, StatusCode::CONFLICT);

        let other: ApiError = StorageError::NotInitialized.into();
        assert_eq!(other.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.message, "Internal storage error");
    }

    #[tokio::test]
    async fn into_response_returns_error_envelope() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "bad data");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn success_envelope_skips_missing_data() {
        let Json(empty) = ApiResponse::empty();
        let value = serde_json::to_value(&empty).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("data").is_none());

        let Json(full) = ApiResponse::ok(42);
        let value = serde_json::to_value(&full).unwrap();
        assert_eq!(value["data"], 42);
    }
}
