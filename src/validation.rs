// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Validation
//!
//! Payload shapes are declared as structs deriving [`Validate`] (see
//! `models.rs`). The [`validate_json`] middleware runs *before* the
//! authentication guard: it parses the body, checks it against the declared
//! shape and either short-circuits with a 400 listing every violated
//! constraint, or stores the typed payload in the request extensions where
//! handlers pick it up through the [`Valid`] extractor.
//!
//! ```rust,ignore
//! post(create_session)
//!     .route_layer(from_fn_with_state(state, authenticate))
//!     .route_layer(from_fn(validate_json::<SessionPayload>))
//! ```
//!
//! Validation is pure: it never touches the store.

use std::borrow::Cow;

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Maximum accepted JSON body size (64 KiB).
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Calendar date wire format (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Offending field, or `body` when the payload could not be parsed.
    pub field: String,
    /// Constraint identifier (`length`, `email`, `calendar_date`, ...).
    pub code: String,
    pub message: String,
}

/// Payload rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload violates {} constraint(s)", violations.len())]
pub struct InvalidPayload {
    pub violations: Vec<FieldViolation>,
}

impl From<InvalidPayload> for ApiError {
    fn from(err: InvalidPayload) -> Self {
        ApiError::validation(err.violations)
    }
}

/// Check `payload` against the shape declared by `T`.
///
/// Returns the typed payload, or every violated constraint sorted by field.
pub fn validate<T>(payload: serde_json::Value) -> Result<T, InvalidPayload>
where
    T: DeserializeOwned + Validate,
{
    let typed: T = serde_json::from_value(payload).map_err(|e| InvalidPayload {
        violations: vec![FieldViolation {
            field: "body".to_string(),
            code: "invalid_type".to_string(),
            message: e.to_string(),
        }],
    })?;

    typed.validate().map_err(|errors| InvalidPayload {
        violations: collect_violations(&errors),
    })?;

    Ok(typed)
}

/// Parse raw body bytes and validate them against `T`.
pub fn validate_bytes<T>(bytes: &[u8]) -> Result<T, InvalidPayload>
where
    T: DeserializeOwned + Validate,
{
    let payload: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| InvalidPayload {
        violations: vec![FieldViolation {
            field: "body".to_string(),
            code: "malformed_json".to_string(),
            message: e.to_string(),
        }],
    })?;
    validate(payload)
}

fn collect_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldViolation {
                field: field.clone(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed `{}` constraint", err.code)),
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    violations
}

/// Custom validator: value must be a calendar date in `YYYY-MM-DD` form.
pub fn validate_calendar_date(value: &str) -> Result<(), ValidationError> {
    parse_calendar_date(value).map(|_| ())
}

pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, ValidationError> {
    // chrono accepts unpadded fields, the wire format does not
    if value.len() != 10 {
        return Err(date_error());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| date_error())
}

fn date_error() -> ValidationError {
    let mut err = ValidationError::new("calendar_date");
    err.message = Some(Cow::Borrowed("must be a calendar date (YYYY-MM-DD)"));
    err
}

/// Validation middleware for a declared payload shape `T`.
pub async fn validate_json<T>(request: Request, next: Next) -> Response
where
    T: DeserializeOwned + Validate + Clone + Send + Sync + 'static,
{
    let (mut parts, body) = request.into_parts();

    // Reading stops with an error once the body outgrows the limit
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = %parts.uri.path(), error = %e, "Request body rejected");
            return ApiError::payload_too_large(format!(
                "Request body exceeds {MAX_BODY_BYTES} bytes"
            ))
            .into_response();
        }
    };

    match validate_bytes::<T>(&bytes) {
        Ok(payload) => {
            parts.extensions.insert(Valid(payload));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(invalid) => {
            tracing::debug!(
                path = %parts.uri.path(),
                violations = invalid.violations.len(),
                "Payload rejected by validator"
            );
            ApiError::from(invalid).into_response()
        }
    }
}

/// Extractor for a payload already checked by [`validate_json`].
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequestParts<S> for Valid<T>
where
    T: Clone + Send + Sync + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<Valid<T>>()
            .ok_or_else(|| ApiError::internal("Route is missing its validation layer"))
    }
}
