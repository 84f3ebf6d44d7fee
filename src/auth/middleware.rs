// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied per route with `from_fn_with_state`:
//!
//! ```rust,ignore
//! let route = post(create_session)
//!     .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));
//! ```
//!
//! On success the verified [`AuthenticatedUser`] is stored in the request
//! extensions, where the [`Auth`](super::Auth) extractor picks it up.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AuthError;
use crate::state::AppState;

/// Verify the bearer token and attach the caller's identity to the request.
///
/// Missing or malformed headers and invalid tokens halt the chain with 401.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let verified = bearer_token(request.headers()).and_then(|token| state.tokens.verify(token));

    match verified {
        Ok(user) => {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                error_code = e.error_code(),
                "Authentication failed"
            );
            e.into_response()
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer  padded ")), Ok("padded"));
    }

    #[test]
    fn missing_header_is_reported() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingAuthHeader));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), Err(AuthError::InvalidAuthHeader));
        assert_eq!(bearer_token(&headers("abc.def.ghi")), Err(AuthError::InvalidAuthHeader));
        assert_eq!(bearer_token(&headers("Bearer ")), Err(AuthError::InvalidAuthHeader));
    }
}
