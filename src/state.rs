// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::storage::Store;

/// Shared handles injected into every handler and middleware.
///
/// Everything here is read-only after startup; the store serializes its own
/// write transactions.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            hasher,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a throwaway database, with the cheapest hashing parameters.
    pub(crate) fn for_tests() -> (Self, tempfile::TempDir) {
        let (store, dir) = crate::storage::database::tests::temp_store();
        let tokens = TokenService::new(b"test-secret", Some(3600));
        let hasher = PasswordHasher::new(Some(1)).expect("valid hashing parameters");
        (Self::new(store, tokens, hasher), dir)
    }
}
