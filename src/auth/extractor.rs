// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{middleware::bearer_token, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Uses the identity attached by the [`authenticate`](super::authenticate)
/// middleware when present, and otherwise verifies the `Authorization`
/// header itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers)?;
        let user = state.tokens.verify(token)?;
        Ok(Auth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::AppState;
    use axum::http::Request;

    fn parts(auth_header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = auth_header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = AppState::for_tests();
        let mut parts = parts(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_verifies_header() {
        let (state, _temp_dir) = AppState::for_tests();
        let token = state.tokens.issue(42, Role::Etudiant).unwrap();
        let mut parts = parts(Some(format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Etudiant);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_bad_token() {
        let (state, _temp_dir) = AppState::for_tests();
        let mut parts = parts(Some("Bearer not.a.token".into()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = AppState::for_tests();
        let mut parts = parts(None);
        parts.extensions.insert(AuthenticatedUser {
            user_id: 7,
            role: Role::Formateur,
            expires_at: None,
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, 7);
    }
}
