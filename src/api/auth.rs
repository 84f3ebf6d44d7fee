// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{authorize, Auth, AuthError, Endpoint, Role},
    error::{ApiError, ErrorBody},
    models::{LoginRequest, SignupRequest, TokenResponse, UserSummary},
    state::AppState,
    storage::{NewUser, StoreError, UserRepository},
    validation::Valid,
};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = UserSummary),
        (status = 400, description = "Invalid payload or unknown role", body = ErrorBody),
        (status = 401, description = "Email already used", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Valid(request): Valid<SignupRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let role = Role::parse(&request.role).ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_role",
            format!(
                "Invalid role '{}', expected '{}' or '{}'",
                request.role,
                Role::Formateur,
                Role::Etudiant
            ),
        )
    })?;

    let users = UserRepository::new(&state.store);

    // Checked again inside the insert transaction
    if users.find_by_email(&request.email)?.is_some() {
        return Err(StoreError::EmailTaken(request.email).into());
    }

    let password_hash = state.hasher.hash(request.password).await?;
    let user = users.create(NewUser {
        name: request.name,
        email: request.email,
        password_hash,
        role,
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok(Json(user.into()))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token", body = TokenResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Valid(request): Valid<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = UserRepository::new(&state.store).find_by_email(&request.email)?;

    // Unknown emails are verified against a dummy hash
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = state.hasher.verify(request.password, stored_hash).await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!("Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.tokens.issue(user.id, user.role)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { token }))
}

/// Token check: succeeds for any valid token.
#[utoipa::path(
    get,
    path = "/protected",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn protected(Auth(user): Auth) -> Result<StatusCode, ApiError> {
    authorize(Endpoint::Protected, Some(&user))?;
    Ok(StatusCode::OK)
}
