// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for stored resources.
//!
//! Resources that belong to a user implement [`OwnedResource`]; the policy
//! layer checks them through [`OwnershipCheck`], which reports a missing
//! resource before it compares owners.

use crate::auth::{AuthenticatedUser, PolicyError};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Resource name used in "not found" messages.
    const KIND: &'static str;

    /// Get the owner's user ID.
    fn owner_id(&self) -> u64;
}

/// Trait for enforcing ownership on a loaded resource.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `PolicyError::NotOwner` if the user doesn't own the resource.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> Result<(), PolicyError>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> Result<(), PolicyError> {
        if self.owner_id() == user.user_id {
            Ok(())
        } else {
            Err(PolicyError::NotOwner {
                user_id: user.user_id,
                owner_id: self.owner_id(),
            })
        }
    }
}

/// Ownership verification on the result of a lookup.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, PolicyError>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, PolicyError> {
        match self {
            Some(resource) => {
                resource.verify_ownership(user)?;
                Ok(resource)
            }
            None => Err(PolicyError::NotFound(T::KIND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    struct TestResource {
        owner: u64,
    }

    impl OwnedResource for TestResource {
        const KIND: &'static str = "Test resource";

        fn owner_id(&self) -> u64 {
            self.owner
        }
    }

    fn make_user(user_id: u64, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            role,
            expires_at: None,
        }
    }

    #[test]
    fn ownership_verification_passes_for_owner() {
        let resource = TestResource { owner: 1 };
        let user = make_user(1, Role::Formateur);

        assert!(resource.verify_ownership(&user).is_ok());
    }

    #[test]
    fn ownership_verification_fails_for_non_owner() {
        let resource = TestResource { owner: 1 };
        let user = make_user(2, Role::Formateur);

        let result = resource.verify_ownership(&user);
        assert_eq!(
            result,
            Err(PolicyError::NotOwner {
                user_id: 2,
                owner_id: 1
            })
        );
    }

    #[test]
    fn ownership_check_on_option_some() {
        let user = make_user(1, Role::Formateur);

        let option = Some(TestResource { owner: 1 });
        assert!(option.verify_owner(&user).is_ok());
    }

    #[test]
    fn missing_resource_wins_over_ownership() {
        let user = make_user(1, Role::Formateur);

        let option: Option<TestResource> = None;
        let result = option.verify_owner(&user);
        assert!(matches!(result, Err(PolicyError::NotFound("Test resource"))));
    }
}
