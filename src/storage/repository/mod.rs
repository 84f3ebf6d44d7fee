// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the store.
//!
//! Each repository provides the operations for one entity type, using the
//! shared [`Store`](super::Store) handle for all transactions.

pub mod emargements;
pub mod sessions;
pub mod users;

pub use emargements::{EmargementRepository, StoredEmargement};
pub use sessions::{SessionRepository, StoredSession};
pub use users::{NewUser, StoredUser, UserRepository};
