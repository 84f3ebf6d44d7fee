// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret loaded at
//! startup. They carry the user id and role; validity is "signature verifies
//! and, when present, `exp` has not passed".

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedUser, Role, TokenClaims};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Signs and verifies identity tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: Option<u64>,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// - `secret`: HMAC signing secret
    /// - `ttl_seconds`: token lifetime, `None` for tokens without expiry
    pub fn new(secret: &[u8], ttl_seconds: Option<u64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        if ttl_seconds.is_none() {
            // `exp` is still checked when a token carries one
            validation.required_spec_claims.clear();
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    /// Issue a signed token for `user_id` with `role`.
    pub fn issue(&self, user_id: u64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = match self.ttl_seconds {
            Some(ttl) => Some(
                i64::try_from(ttl)
                    .ok()
                    .and_then(|ttl| now.checked_add(ttl))
                    .ok_or_else(|| {
                        AuthError::InternalError(format!("token lifetime {ttl}s is out of range"))
                    })?,
            ),
            None => None,
        };
        let claims = TokenClaims {
            id: user_id,
            role,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    /// Verify a token and return the identity it asserts.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn verify_returns_issued_identity() {
        let tokens = TokenService::new(SECRET, Some(3600));
        for (id, role) in [(1, Role::Formateur), (2, Role::Etudiant), (9000, Role::Etudiant)] {
            let token = tokens.issue(id, role).unwrap();
            let user = tokens.verify(&token).unwrap();
            assert_eq!(user.user_id, id);
            assert_eq!(user.role, role);
            assert!(user.expires_at.is_some());
        }
    }

    #[test]
    fn permanent_tokens_have_no_expiry() {
        let tokens = TokenService::new(SECRET, None);
        let token = tokens.issue(5, Role::Etudiant).unwrap();
        let user = tokens.verify(&token).unwrap();
        assert_eq!(user.user_id, 5);
        assert_eq!(user.expires_at, None);
    }

    #[test]
    fn bounded_service_rejects_tokens_without_expiry() {
        let permanent = TokenService::new(SECRET, None).issue(5, Role::Etudiant).unwrap();
        let bounded = TokenService::new(SECRET, Some(3600));
        assert!(bounded.verify(&permanent).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(SECRET, Some(3600));
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            id: 1,
            role: Role::Formateur,
            iat: now - 7200,
            exp: Some(now - 3600),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_fails_signature() {
        let token = TokenService::new(b"other-secret", Some(3600))
            .issue(1, Role::Formateur)
            .unwrap();
        let tokens = TokenService::new(SECRET, Some(3600));
        assert_eq!(tokens.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let tokens = TokenService::new(SECRET, Some(3600));
        let token = tokens.issue(1, Role::Etudiant).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Claim to be user 2 as a formateur, keeping the original signature
        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["id"] = 2.into();
        claims["role"] = "formateur".into();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(tokens.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        for ttl in [i64::MAX as u64, u64::MAX] {
            let tokens = TokenService::new(SECRET, Some(ttl));
            assert!(matches!(
                tokens.issue(1, Role::Etudiant),
                Err(AuthError::InternalError(_))
            ));
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = TokenService::new(SECRET, Some(3600));
        assert_eq!(tokens.verify("not-a-token"), Err(AuthError::MalformedToken));
        assert_eq!(tokens.verify(""), Err(AuthError::MalformedToken));
    }
}
