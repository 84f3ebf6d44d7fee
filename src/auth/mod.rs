// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity and access control for the émargement API.
//!
//! ## Auth Flow
//!
//! 1. `POST /auth/signup` stores an Argon2id hash of the password
//! 2. `POST /auth/login` verifies the password and issues an HS256 token
//!    carrying `{id, role}`
//! 3. Protected routes:
//!    - [`authenticate`] middleware verifies `Authorization: Bearer <token>`
//!    - the handler reads the identity through [`Auth`]
//!    - [`policy`] applies the endpoint's role and ownership rules
//!
//! ## Security
//!
//! - The signing secret is loaded once at startup
//! - Tokens expire after the configured lifetime (permanent when set to 0)
//! - Clock skew tolerance is 60 seconds
//! - Unknown emails cost one dummy password verification

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::authenticate;
pub use password::{HashError, PasswordHasher};
pub use policy::{authorize, authorize_resource, Endpoint, Policy, PolicyError};
pub use roles::Role;
pub use token::TokenService;
