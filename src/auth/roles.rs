// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Roles
///
/// - `Formateur` - Instructor, creates and manages their own sessions
/// - `Etudiant` - Student, registers attendance to sessions
///
/// There is no hierarchy: an endpoint requiring one role rejects the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructor (owns sessions)
    Formateur,
    /// Student (registers attendance)
    Etudiant,
}

impl Role {
    /// Check if this role satisfies the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        *self == required
    }

    /// Parse role from its wire name.
    ///
    /// Matching is exact: `"Formateur"` is not a valid role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "formateur" => Some(Role::Formateur),
            "etudiant" => Some(Role::Etudiant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Formateur => "formateur",
            Role::Etudiant => "etudiant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_only_satisfy_themselves() {
        assert!(Role::Formateur.has_privilege(Role::Formateur));
        assert!(!Role::Formateur.has_privilege(Role::Etudiant));
        assert!(Role::Etudiant.has_privilege(Role::Etudiant));
        assert!(!Role::Etudiant.has_privilege(Role::Formateur));
    }

    #[test]
    fn parse_is_exact() {
        assert_eq!(Role::parse("formateur"), Some(Role::Formateur));
        assert_eq!(Role::parse("etudiant"), Some(Role::Etudiant));
        assert_eq!(Role::parse("Etudiant"), None);
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Etudiant).unwrap(), r#""etudiant""#);
        assert_eq!(Role::Formateur.to_string(), "formateur");
    }
}
