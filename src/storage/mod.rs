// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in an embedded redb database. Business logic reaches
//! it only through the typed repositories, and only after the policy layer
//! has passed.
//!
//! ## Entities
//!
//! - users (credential store, unique email)
//! - sessions (owned by a formateur)
//! - emargements (one per session and student)

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{Store, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use repository::{
    EmargementRepository, NewUser, SessionRepository, StoredEmargement, StoredSession, StoredUser,
    UserRepository,
};
