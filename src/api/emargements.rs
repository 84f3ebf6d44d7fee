// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::{authorize_resource, Auth, Endpoint},
    error::{ApiError, ErrorBody},
    models::{AttendanceEntry, AttendancePayload, Emargement},
    state::AppState,
    storage::{EmargementRepository, SessionRepository, StoreError},
    validation::Valid,
};

use super::sessions::SessionId;

/// Record the calling student's attendance at a session.
#[utoipa::path(
    post,
    path = "/sessions/{id}/emargement",
    tag = "Emargements",
    params(("id" = u64, Path, description = "Session ID")),
    request_body = AttendancePayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance recorded", body = Emargement),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing token, not a student, or already recorded", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn register_attendance(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Auth(user): Auth,
    Valid(payload): Valid<AttendancePayload>,
) -> Result<Json<Emargement>, ApiError> {
    let sessions = SessionRepository::new(&state.store);
    authorize_resource(Endpoint::RegisterAttendance, Some(&user), || {
        sessions.get(session_id)
    })?;

    let emargements = EmargementRepository::new(&state.store);

    // Checked again inside the insert transaction
    if emargements.find(session_id, user.user_id)?.is_some() {
        return Err(StoreError::AlreadyRegistered {
            session_id,
            etudiant_id: user.user_id,
        }
        .into());
    }

    let record = emargements.create(session_id, user.user_id, payload.presence)?;

    tracing::info!(
        session_id,
        etudiant_id = user.user_id,
        presence = record.presence,
        "Attendance recorded"
    );
    Ok(Json(record.into()))
}

/// Attendance sheet of a session. Owner only.
#[utoipa::path(
    get,
    path = "/sessions/{id}/emargement",
    tag = "Emargements",
    params(("id" = u64, Path, description = "Session ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Students with their attendance", body = [AttendanceEntry]),
        (status = 401, description = "Missing token, wrong role or not the owner", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Auth(user): Auth,
) -> Result<Json<Vec<AttendanceEntry>>, ApiError> {
    let sessions = SessionRepository::new(&state.store);
    authorize_resource(Endpoint::ListAttendance, Some(&user), || sessions.get(session_id))?;

    let rows = EmargementRepository::new(&state.store).list_with_students(session_id)?;
    let entries = rows
        .into_iter()
        .map(|(record, student)| AttendanceEntry {
            id: student.id,
            name: student.name,
            email: student.email,
            role: student.role,
            session_id: record.session_id,
            presence: record.presence,
        })
        .collect();

    Ok(Json(entries))
}
