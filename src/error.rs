// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unified API error envelope.
//!
//! Every failure, whatever layer produced it, is rendered as:
//!
//! ```json
//! { "error": "Session not found", "error_code": "not_found" }
//! ```
//!
//! Validation failures add a `details` array listing each violated
//! constraint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::HashError;
use crate::storage::StoreError;
use crate::validation::FieldViolation;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Vec<FieldViolation>>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable message.
    pub error: String,
    /// Stable machine readable code.
    pub error_code: String,
    /// Violated constraints (validation failures only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(details: Vec<FieldViolation>) -> Self {
        Self {
            details: Some(details),
            ..Self::new(
                StatusCode::BAD_REQUEST,
                "validation_failed",
                "Request payload is invalid",
            )
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Wrong role or not the owner of the resource.
    ///
    /// Reported with 401 to keep the public contract of the API.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "forbidden", message)
    }

    /// Uniqueness violation (email already used, attendance already recorded).
    ///
    /// Reported with 401 to keep the public contract of the API.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(code = self.code, error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, code = self.code, "Request rejected");
        }

        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken(_) => {
                ApiError::conflict("email_taken", "Email already used")
            }
            StoreError::AlreadyRegistered { .. } => ApiError::conflict(
                "already_registered",
                "Attendance already recorded for this session",
            ),
            StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            other => {
                tracing::warn!(error = %other, "Store operation failed");
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        tracing::warn!(error = %err, "Password hashing failed");
        ApiError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_code() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.code, "not_found");
        assert_eq!(nf.message, "missing");

        let forbidden = ApiError::forbidden("nope");
        assert_eq!(forbidden.status, StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.code, "forbidden");

        let conflict = ApiError::conflict("email_taken", "taken");
        assert_eq!(conflict.status, StatusCode::UNAUTHORIZED);
        assert_eq!(conflict.code, "email_taken");

        let internal = ApiError::internal("db down");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::not_found("Session not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"Session not found","error_code":"not_found"}"#);
    }

    #[tokio::test]
    async fn validation_error_lists_details() {
        let response = ApiError::validation(vec![FieldViolation {
            field: "email".into(),
            code: "email".into(),
            message: "must be a valid email address".into(),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "validation_failed");
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[test]
    fn store_errors_map_to_envelope_kinds() {
        let taken: ApiError = StoreError::EmailTaken("a@b.fr".into()).into();
        assert_eq!(taken.status, StatusCode::UNAUTHORIZED);
        assert_eq!(taken.code, "email_taken");

        let duplicate: ApiError = StoreError::AlreadyRegistered {
            session_id: 1,
            etudiant_id: 2,
        }
        .into();
        assert_eq!(duplicate.code, "already_registered");

        let missing: ApiError = StoreError::NotFound("Session".into()).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "Session not found");

        let io: ApiError = StoreError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(io.message.contains("disk full"));
    }
}
