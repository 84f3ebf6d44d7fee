// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Store readable ("ok" or "unavailable").
    pub store: String,
}

/// Liveness and store check.
///
/// Returns 200 when a read transaction can be opened, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Store is unavailable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = match state.store.ping() {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed to read the store");
            false
        }
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if store_ok { "ok" } else { "degraded" }.to_string(),
            store: if store_ok { "ok" } else { "unavailable" }.to_string(),
        }),
    )
}
