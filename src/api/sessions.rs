// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::NaiveDate;

use crate::{
    auth::{authorize, authorize_resource, Auth, Endpoint},
    error::{ApiError, ErrorBody},
    models::{Session, SessionPayload},
    state::AppState,
    storage::SessionRepository,
    validation::{parse_calendar_date, FieldViolation, Valid},
};

/// Numeric `{id}` path segment of the session routes.
///
/// Anything else is answered as an unknown route.
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub u64);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<u64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(SessionId(id)),
            Err(_) => Err(ApiError::not_found(format!(
                "No route for {}",
                parts.uri.path()
            ))),
        }
    }
}

/// Route layer rejecting non-numeric ids before any other check runs.
pub async fn require_session_id(_: SessionId, request: Request, next: Next) -> Response {
    next.run(request).await
}

fn session_date(payload: &SessionPayload) -> Result<NaiveDate, ApiError> {
    parse_calendar_date(&payload.date).map_err(|err| {
        ApiError::validation(vec![FieldViolation {
            field: "date".to_string(),
            code: err.code.to_string(),
            message: err
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "must be a calendar date".to_string()),
        }])
    })
}

/// Create a session owned by the calling formateur.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Sessions",
    request_body = SessionPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session created", body = Session),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing token or not a formateur", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Auth(user): Auth,
    Valid(payload): Valid<SessionPayload>,
) -> Result<Json<Session>, ApiError> {
    authorize(Endpoint::CreateSession, Some(&user))?;
    let date = session_date(&payload)?;

    let session = SessionRepository::new(&state.store).create(payload.title, date, user.user_id)?;

    tracing::info!(session_id = session.id, formateur_id = user.user_id, "Session created");
    Ok(Json(session.into()))
}

/// List every session.
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "All sessions", body = [Session]),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = SessionRepository::new(&state.store).list_all()?;
    Ok(Json(sessions.into_iter().map(Session::from).collect()))
}

/// Fetch one session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "Sessions",
    params(("id" = u64, Path, description = "Session ID")),
    responses(
        (status = 200, description = "The session", body = Session),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
) -> Result<Json<Session>, ApiError> {
    let repo = SessionRepository::new(&state.store);
    let session = authorize_resource(Endpoint::GetSession, None, || repo.get(id))?;
    Ok(Json(session.into()))
}

/// Replace a session's title and date. Owner only.
#[utoipa::path(
    put,
    path = "/sessions/{id}",
    tag = "Sessions",
    params(("id" = u64, Path, description = "Session ID")),
    request_body = SessionPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session updated"),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing token, wrong role or not the owner", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn update_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    Auth(user): Auth,
    Valid(payload): Valid<SessionPayload>,
) -> Result<StatusCode, ApiError> {
    let repo = SessionRepository::new(&state.store);
    authorize_resource(Endpoint::UpdateSession, Some(&user), || repo.get(id))?;

    let date = session_date(&payload)?;
    repo.update(id, payload.title, date)?;

    tracing::info!(session_id = id, "Session updated");
    Ok(StatusCode::OK)
}

/// Delete a session and its attendance records. Owner only.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "Sessions",
    params(("id" = u64, Path, description = "Session ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session deleted"),
        (status = 401, description = "Missing token, wrong role or not the owner", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    Auth(user): Auth,
) -> Result<StatusCode, ApiError> {
    let repo = SessionRepository::new(&state.store);
    authorize_resource(Endpoint::DeleteSession, Some(&user), || repo.get(id))?;

    let removed = repo.delete(id)?;

    tracing::info!(session_id = id, emargements_removed = removed, "Session deleted");
    Ok(StatusCode::OK)
}
