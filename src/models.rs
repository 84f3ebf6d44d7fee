// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. Request types double as the declared validation shapes
//! (see `validation.rs`); all types derive `ToSchema` for the OpenAPI docs.
//!
//! ## Model Categories
//!
//! - **Auth**: signup, login and token payloads
//! - **Sessions**: training session create/modify payload
//! - **Emargements**: attendance registration and listing

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Role;
use crate::storage::{StoredEmargement, StoredSession, StoredUser};

// =============================================================================
// Auth Models
// =============================================================================

/// Signup payload.
///
/// `role` is only shape-checked here; membership in the role enum is
/// checked by the handler so that it yields a dedicated error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub role: String,
}

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Public view of a user, returned by signup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<StoredUser> for UserSummary {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

// =============================================================================
// Session Models
// =============================================================================

/// Create/modify session payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SessionPayload {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[validate(custom(function = "crate::validation::validate_calendar_date"))]
    pub date: String,
}

/// A training session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Session {
    pub id: u64,
    pub title: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Owning formateur.
    pub formateur_id: u64,
}

impl From<StoredSession> for Session {
    fn from(session: StoredSession) -> Self {
        Self {
            id: session.id,
            title: session.title,
            date: session.date,
            formateur_id: session.formateur_id,
        }
    }
}

// =============================================================================
// Emargement Models
// =============================================================================

/// Attendance registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AttendancePayload {
    pub presence: bool,
}

/// Attendance record returned after registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Emargement {
    pub id: u64,
    pub session_id: u64,
    pub etudiant_id: u64,
    pub presence: bool,
}

impl From<StoredEmargement> for Emargement {
    fn from(record: StoredEmargement) -> Self {
        Self {
            id: record.id,
            session_id: record.session_id,
            etudiant_id: record.etudiant_id,
            presence: record.presence,
        }
    }
}

/// One row of a session's attendance sheet: the student joined with their
/// attendance record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttendanceEntry {
    /// Student user ID.
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub session_id: u64,
    pub presence: bool,
}
