// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification (Argon2id, PHC string format).
//!
//! Hashing is CPU bound, so both operations run on tokio's blocking pool.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Password hashing errors. All of them are internal failures.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is unreadable: {0}")]
    StoredHash(String),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted one-way password hasher with a configurable work factor.
///
/// Cheap to clone; clones share the lazily computed dummy hash.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash verified against when the user does not exist, so unknown emails
    /// cost as much as wrong passwords.
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Create a hasher.
    ///
    /// `iterations` overrides the Argon2 time cost; memory and parallelism
    /// keep the Argon2 defaults.
    pub fn new(iterations: Option<u32>) -> Result<Self, HashError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            iterations.unwrap_or(Params::DEFAULT_T_COST),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| HashError::Params(e.to_string()))?;

        Ok(Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash `password` with a fresh random salt.
    pub async fn hash(&self, password: String) -> Result<String, HashError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || hash_blocking(params, &password)).await?
    }

    /// Verify `password` against a stored hash.
    ///
    /// With `stored_hash = None` the password is checked against a dummy
    /// hash and the result is always `false`.
    pub async fn verify(&self, password: String, stored_hash: Option<String>) -> Result<bool, HashError> {
        let params = self.params.clone();
        let dummy_hash = Arc::clone(&self.dummy_hash);

        tokio::task::spawn_blocking(move || {
            let (hash, is_real) = match stored_hash {
                Some(hash) => (hash, true),
                None => {
                    let dummy = match dummy_hash.get() {
                        Some(dummy) => dummy.clone(),
                        None => {
                            let computed = hash_blocking(params, "")?;
                            dummy_hash.get_or_init(|| computed).clone()
                        }
                    };
                    (dummy, false)
                }
            };

            let parsed =
                PasswordHash::new(&hash).map_err(|e| HashError::StoredHash(e.to_string()))?;

            // Parameters are read from the PHC string, not from `self.params`
            let matches = Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok();

            Ok(matches && is_real)
        })
        .await?
    }
}

fn hash_blocking(params: Params, password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    PasswordHasher::argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::Hash(e.to_string()))
}
