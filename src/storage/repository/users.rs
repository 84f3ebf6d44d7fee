// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store.
//!
//! Users are created on signup and never modified afterwards. Email
//! uniqueness is enforced by `user_email_index`, checked inside the write
//! transaction that inserts the user.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::storage::database::{email_key, next_id, USERS, USER_EMAIL_INDEX};
use crate::storage::{Store, StoreError, StoreResult};

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Store-assigned identifier
    pub id: u64,
    pub name: String,
    /// Email as given at signup
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.store.db().begin_read()?;
        let index = read_txn.open_table(USER_EMAIL_INDEX)?;
        let user_id = match index.get(email_key(email).as_str())? {
            Some(v) => v.value(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Err(StoreError::NotFound(format!(
                "User {user_id} referenced by email index"
            ))),
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    /// `StoreError::EmailTaken` if the email is already registered.
    pub fn create(&self, new_user: NewUser) -> StoreResult<StoredUser> {
        let key = email_key(&new_user.email);

        let write_txn = self.store.db().begin_write()?;
        let user = {
            let mut index = write_txn.open_table(USER_EMAIL_INDEX)?;
            if index.get(key.as_str())?.is_some() {
                return Err(StoreError::EmailTaken(new_user.email));
            }

            let id = next_id(&write_txn, "users")?;
            let user = StoredUser {
                id,
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                role: new_user.role,
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&user)?;
            let mut table = write_txn.open_table(USERS)?;
            table.insert(id, json.as_slice())?;
            index.insert(key.as_str(), id)?;
            user
        };
        write_txn.commit()?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_store;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
        }
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let (store, _dir) = temp_store();
        let repo = UserRepository::new(&store);

        let first = repo.create(new_user("a@x.com", Role::Etudiant)).unwrap();
        let second = repo.create(new_user("b@x.com", Role::Formateur)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let loaded = repo.find_by_email("b@x.com").unwrap().unwrap();
        assert_eq!(loaded, second);
        assert!(repo.find_by_email("c@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (store, _dir) = temp_store();
        let repo = UserRepository::new(&store);

        repo.create(new_user("a@x.com", Role::Etudiant)).unwrap();
        let result = repo.create(new_user("A@X.com", Role::Formateur));
        assert!(matches!(result, Err(StoreError::EmailTaken(_))));

        // Failed insert must not consume an id or leave a record
        let next = repo.create(new_user("c@x.com", Role::Etudiant)).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn find_by_email_ignores_case() {
        let (store, _dir) = temp_store();
        let repo = UserRepository::new(&store);

        let created = repo.create(new_user("Ana@X.com", Role::Etudiant)).unwrap();
        let found = repo.find_by_email("ana@x.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "Ana@X.com");

        assert!(repo.find_by_email("nobody@x.com").unwrap().is_none());
    }
}
