// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Training session repository.

use chrono::{DateTime, NaiveDate, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::storage::database::{next_id, EMARGEMENTS, EMARGEMENT_INDEX, SESSIONS};
use crate::storage::{OwnedResource, Store, StoreError, StoreResult};

/// Session record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub id: u64,
    pub title: String,
    pub date: NaiveDate,
    /// Owning formateur's user ID
    pub formateur_id: u64,
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredSession {
    const KIND: &'static str = "Session";

    fn owner_id(&self) -> u64 {
        self.formateur_id
    }
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    store: &'a Store,
}

impl<'a> SessionRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get a session by ID.
    pub fn get(&self, session_id: u64) -> StoreResult<Option<StoredSession>> {
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// List every session, ordered by ID.
    pub fn list_all(&self) -> StoreResult<Vec<StoredSession>> {
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        let mut sessions = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            sessions.push(serde_json::from_slice(value.value())?);
        }
        Ok(sessions)
    }

    /// Create a session owned by `formateur_id`.
    pub fn create(
        &self,
        title: String,
        date: NaiveDate,
        formateur_id: u64,
    ) -> StoreResult<StoredSession> {
        let write_txn = self.store.db().begin_write()?;
        let session = {
            let id = next_id(&write_txn, "sessions")?;
            let session = StoredSession {
                id,
                title,
                date,
                formateur_id,
                created_at: Utc::now(),
            };
            let json = serde_json::to_vec(&session)?;
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(id, json.as_slice())?;
            session
        };
        write_txn.commit()?;

        Ok(session)
    }

    /// Replace a session's title and date.
    pub fn update(&self, session_id: u64, title: String, date: NaiveDate) -> StoreResult<StoredSession> {
        let write_txn = self.store.db().begin_write()?;
        let session = {
            let mut table = write_txn.open_table(SESSIONS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(session_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Session {session_id}")))?;
                existing.value().to_vec()
            };

            let mut session: StoredSession = serde_json::from_slice(&existing_bytes)?;
            session.title = title;
            session.date = date;

            let json = serde_json::to_vec(&session)?;
            table.insert(session_id, json.as_slice())?;
            session
        };
        write_txn.commit()?;

        Ok(session)
    }

    /// Delete a session together with its attendance records.
    ///
    /// Returns the number of attendance records removed.
    pub fn delete(&self, session_id: u64) -> StoreResult<usize> {
        let write_txn = self.store.db().begin_write()?;
        let removed = {
            let mut sessions = write_txn.open_table(SESSIONS)?;
            if sessions.remove(session_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Session {session_id}")));
            }

            let mut index = write_txn.open_table(EMARGEMENT_INDEX)?;
            let mut records = write_txn.open_table(EMARGEMENTS)?;

            let mut entries = Vec::new();
            for entry in index.range((session_id, 0u64)..=(session_id, u64::MAX))? {
                let (key, value) = entry?;
                entries.push((key.value(), value.value()));
            }

            for (key, emargement_id) in &entries {
                index.remove(key)?;
                records.remove(emargement_id)?;
            }
            entries.len()
        };
        write_txn.commit()?;

        Ok(removed)
    }
}
