// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role and ownership policy.
//!
//! Every endpoint has one entry in [`Policy::for_endpoint`]: who may call it
//! and which existing resource it targets. [`authorize`] and
//! [`authorize_resource`] apply an entry in a fixed order:
//!
//! 1. identity present (set by the guard)
//! 2. role matches the endpoint's required role
//! 3. target resource exists
//! 4. caller owns the target resource
//!
//! The role check runs before any store lookup, and a missing resource is
//! reported before an ownership mismatch.

use crate::error::ApiError;
use crate::storage::{OwnedResource, OwnershipCheck, StoreResult};

use super::{AuthenticatedUser, Role};

/// Every routed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Signup,
    Login,
    Protected,
    CreateSession,
    ListSessions,
    GetSession,
    UpdateSession,
    DeleteSession,
    RegisterAttendance,
    ListAttendance,
}

/// Who may call an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any valid token
    Authenticated,
    /// Valid token with exactly this role
    Role(Role),
}

/// Existing resource an endpoint operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    /// Must exist
    Existing,
    /// Must exist and belong to the caller
    Owned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub access: Access,
    pub target: Target,
}

impl Policy {
    const fn new(access: Access, target: Target) -> Self {
        Self { access, target }
    }

    /// The policy table.
    pub const fn for_endpoint(endpoint: Endpoint) -> Policy {
        const FORMATEUR: Access = Access::Role(Role::Formateur);
        const ETUDIANT: Access = Access::Role(Role::Etudiant);

        match endpoint {
            Endpoint::Signup | Endpoint::Login => Policy::new(Access::Public, Target::None),
            Endpoint::Protected => Policy::new(Access::Authenticated, Target::None),
            Endpoint::CreateSession => Policy::new(FORMATEUR, Target::None),
            Endpoint::ListSessions => Policy::new(Access::Public, Target::None),
            Endpoint::GetSession => Policy::new(Access::Public, Target::Existing),
            Endpoint::UpdateSession | Endpoint::DeleteSession | Endpoint::ListAttendance => {
                Policy::new(FORMATEUR, Target::Owned)
            }
            Endpoint::RegisterAttendance => Policy::new(ETUDIANT, Target::Existing),
        }
    }

    pub fn requires_token(&self) -> bool {
        !matches!(self.access, Access::Public)
    }

    /// Steps 1 and 2: identity and role.
    pub fn check_access(&self, user: Option<&AuthenticatedUser>) -> Result<(), PolicyError> {
        match self.access {
            Access::Public => Ok(()),
            Access::Authenticated => user.map(|_| ()).ok_or(PolicyError::Unauthenticated),
            Access::Role(required) => {
                let user = user.ok_or(PolicyError::Unauthenticated)?;
                if user.has_role(required) {
                    Ok(())
                } else {
                    Err(PolicyError::WrongRole {
                        required,
                        actual: user.role,
                    })
                }
            }
        }
    }
}

/// Policy decision failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unauthorized, requires role '{required}'")]
    WrongRole { required: Role, actual: Role },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not authorized, {owner_id} owns this resource")]
    NotOwner { user_id: u64, owner_id: u64 },
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match &err {
            PolicyError::Unauthenticated => {
                ApiError::new(axum::http::StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
            }
            PolicyError::WrongRole { .. } => ApiError::forbidden(err.to_string()),
            PolicyError::NotFound(_) => ApiError::not_found(err.to_string()),
            PolicyError::NotOwner { .. } => ApiError::forbidden("Not authorized, not the owner of this resource"),
        }
    }
}

/// Apply an endpoint's policy when it targets no existing resource.
pub fn authorize(endpoint: Endpoint, user: Option<&AuthenticatedUser>) -> Result<(), ApiError> {
    let policy = Policy::for_endpoint(endpoint);
    if policy.target != Target::None {
        return Err(ApiError::internal(format!(
            "{endpoint:?} targets a resource and needs a lookup"
        )));
    }
    policy.check_access(user).map_err(|e| deny(endpoint, user, e))
}

/// Apply an endpoint's policy to the resource returned by `lookup`.
///
/// `lookup` only runs once the role check has passed.
pub fn authorize_resource<R, F>(
    endpoint: Endpoint,
    user: Option<&AuthenticatedUser>,
    lookup: F,
) -> Result<R, ApiError>
where
    R: OwnedResource,
    F: FnOnce() -> StoreResult<Option<R>>,
{
    let policy = Policy::for_endpoint(endpoint);
    policy
        .check_access(user)
        .map_err(|e| deny(endpoint, user, e))?;

    let resource = lookup()?;

    let decision = match policy.target {
        Target::None => {
            return Err(ApiError::internal(format!(
                "{endpoint:?} targets no resource"
            )))
        }
        Target::Existing => resource.ok_or(PolicyError::NotFound(R::KIND)),
        Target::Owned => match user {
            Some(user) => resource.verify_owner(user),
            None => Err(PolicyError::Unauthenticated),
        },
    };

    decision.map_err(|e| deny(endpoint, user, e))
}

fn deny(endpoint: Endpoint, user: Option<&AuthenticatedUser>, err: PolicyError) -> ApiError {
    tracing::debug!(
        ?endpoint,
        user_id = user.map(|u| u.user_id),
        reason = %err,
        "Policy denied request"
    );
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;
    use axum::http::StatusCode;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Owned(u64);

    impl OwnedResource for Owned {
        const KIND: &'static str = "Session";

        fn owner_id(&self) -> u64 {
            self.0
        }
    }

    fn user(user_id: u64, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            role,
            expires_at: None,
        }
    }

    #[test]
    fn policy_table_matches_endpoints() {
        assert_eq!(
            Policy::for_endpoint(Endpoint::CreateSession).access,
            Access::Role(Role::Formateur)
        );
        assert_eq!(
            Policy::for_endpoint(Endpoint::RegisterAttendance),
            Policy {
                access: Access::Role(Role::Etudiant),
                target: Target::Existing
            }
        );
        for endpoint in [Endpoint::UpdateSession, Endpoint::DeleteSession, Endpoint::ListAttendance] {
            assert_eq!(Policy::for_endpoint(endpoint).target, Target::Owned);
        }
        for endpoint in [Endpoint::Signup, Endpoint::Login, Endpoint::ListSessions, Endpoint::GetSession] {
            assert!(!Policy::for_endpoint(endpoint).requires_token());
        }
        assert!(Policy::for_endpoint(Endpoint::Protected).requires_token());
    }

    #[test]
    fn protected_accepts_any_role() {
        assert!(authorize(Endpoint::Protected, Some(&user(1, Role::Etudiant))).is_ok());
        assert!(authorize(Endpoint::Protected, Some(&user(1, Role::Formateur))).is_ok());

        let err = authorize(Endpoint::Protected, None).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "unauthenticated");
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let err = authorize(Endpoint::CreateSession, Some(&user(1, Role::Etudiant))).unwrap_err();
        assert_eq!(err.code, "forbidden");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.message.contains("formateur"));
    }

    #[test]
    fn role_is_checked_before_lookup() {
        let looked_up = Cell::new(false);
        let err = authorize_resource(Endpoint::UpdateSession, Some(&user(1, Role::Etudiant)), || {
            looked_up.set(true);
            Ok(None::<Owned>)
        })
        .unwrap_err();

        assert_eq!(err.code, "forbidden");
        assert!(!looked_up.get());
    }

    #[test]
    fn not_found_precedes_ownership() {
        let err = authorize_resource(Endpoint::DeleteSession, Some(&user(1, Role::Formateur)), || {
            Ok(None::<Owned>)
        })
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Session not found");
    }

    #[test]
    fn owner_passes_and_others_are_forbidden() {
        let owner = user(1, Role::Formateur);
        let other = user(2, Role::Formateur);

        let resource =
            authorize_resource(Endpoint::UpdateSession, Some(&owner), || Ok(Some(Owned(1)))).unwrap();
        assert_eq!(resource.0, 1);

        let err = authorize_resource(Endpoint::UpdateSession, Some(&other), || Ok(Some(Owned(1))))
            .unwrap_err();
        assert_eq!(err.code, "forbidden");
    }

    #[test]
    fn existing_target_skips_ownership() {
        let student = user(7, Role::Etudiant);
        let resource =
            authorize_resource(Endpoint::RegisterAttendance, Some(&student), || Ok(Some(Owned(1))))
                .unwrap();
        assert_eq!(resource.0, 1);

        // Public lookups need no identity
        assert!(authorize_resource(Endpoint::GetSession, None, || Ok(Some(Owned(1)))).is_ok());
    }

    #[test]
    fn lookup_failure_is_internal() {
        let err = authorize_resource(Endpoint::GetSession, None, || {
            Err::<Option<Owned>, _>(StoreError::Io(std::io::Error::other("disk gone")))
        })
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
