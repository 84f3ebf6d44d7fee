// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Claims carried by an identity token.
///
/// `exp` is absent when the service runs with permanent tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    pub id: u64,
    /// User's role at issuance
    pub role: Role,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the identity context attached to a request by the guard and
/// consumed by the policy layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User ID (`id` claim)
    pub user_id: u64,

    /// User's role
    pub role: Role,

    /// Token expiration (Unix timestamp), `None` for permanent tokens
    #[serde(skip)]
    pub expires_at: Option<i64>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.id,
            role: claims.role,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_copies_identity() {
        let user = AuthenticatedUser::from_claims(TokenClaims {
            id: 12,
            role: Role::Formateur,
            iat: 1700000000,
            exp: Some(1700003600),
        });
        assert_eq!(user.user_id, 12);
        assert_eq!(user.role, Role::Formateur);
        assert_eq!(user.expires_at, Some(1700003600));
        assert!(user.has_role(Role::Formateur));
        assert!(!user.has_role(Role::Etudiant));
    }

    #[test]
    fn permanent_claims_omit_exp() {
        let claims = TokenClaims {
            id: 1,
            role: Role::Etudiant,
            iat: 1700000000,
            exp: None,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("exp").is_none());
        assert_eq!(json["role"], "etudiant");
    }
}
