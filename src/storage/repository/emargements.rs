// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attendance (émargement) repository.
//!
//! At most one record exists per `(session_id, etudiant_id)`; the pair is the
//! key of `emargement_index` and is checked in the inserting transaction.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::storage::database::{next_id, EMARGEMENTS, EMARGEMENT_INDEX, SESSIONS, USERS};
use crate::storage::{Store, StoreError, StoreResult, StoredUser};

/// Attendance record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredEmargement {
    pub id: u64,
    pub session_id: u64,
    pub etudiant_id: u64,
    pub presence: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Repository for attendance operations.
pub struct EmargementRepository<'a> {
    store: &'a Store,
}

impl<'a> EmargementRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Find the record of `etudiant_id` for `session_id`, if any.
    pub fn find(&self, session_id: u64, etudiant_id: u64) -> StoreResult<Option<StoredEmargement>> {
        let read_txn = self.store.db().begin_read()?;
        let index = read_txn.open_table(EMARGEMENT_INDEX)?;
        let emargement_id = match index.get((session_id, etudiant_id))? {
            Some(v) => v.value(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(EMARGEMENTS)?;
        match table.get(emargement_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Err(StoreError::NotFound(format!(
                "Emargement {emargement_id} referenced by index"
            ))),
        }
    }

    /// Record attendance of `etudiant_id` at `session_id`.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the session does not exist
    /// - `StoreError::AlreadyRegistered` if a record already exists for the pair
    pub fn create(
        &self,
        session_id: u64,
        etudiant_id: u64,
        presence: bool,
    ) -> StoreResult<StoredEmargement> {
        let write_txn = self.store.db().begin_write()?;
        let record = {
            let sessions = write_txn.open_table(SESSIONS)?;
            if sessions.get(session_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Session {session_id}")));
            }

            let mut index = write_txn.open_table(EMARGEMENT_INDEX)?;
            if index.get((session_id, etudiant_id))?.is_some() {
                return Err(StoreError::AlreadyRegistered {
                    session_id,
                    etudiant_id,
                });
            }

            let id = next_id(&write_txn, "emargements")?;
            let record = StoredEmargement {
                id,
                session_id,
                etudiant_id,
                presence,
                recorded_at: Utc::now(),
            };

            let json = serde_json::to_vec(&record)?;
            let mut table = write_txn.open_table(EMARGEMENTS)?;
            table.insert(id, json.as_slice())?;
            index.insert((session_id, etudiant_id), id)?;
            record
        };
        write_txn.commit()?;

        Ok(record)
    }

    /// List a session's attendance records joined with the student's user
    /// record, ordered by student ID.
    ///
    /// Records whose student no longer exists are skipped.
    pub fn list_with_students(
        &self,
        session_id: u64,
    ) -> StoreResult<Vec<(StoredEmargement, StoredUser)>> {
        let read_txn = self.store.db().begin_read()?;
        let index = read_txn.open_table(EMARGEMENT_INDEX)?;
        let records = read_txn.open_table(EMARGEMENTS)?;
        let users = read_txn.open_table(USERS)?;

        let mut rows = Vec::new();
        for entry in index.range((session_id, 0u64)..=(session_id, u64::MAX))? {
            let (_, emargement_id) = entry?;
            let Some(record) = records.get(emargement_id.value())? else {
                continue;
            };
            let record: StoredEmargement = serde_json::from_slice(record.value())?;

            match users.get(record.etudiant_id)? {
                Some(user) => {
                    let user: StoredUser = serde_json::from_slice(user.value())?;
                    rows.push((record, user));
                }
                None => {
                    tracing::warn!(
                        session_id,
                        etudiant_id = record.etudiant_id,
                        "Skipping attendance record of unknown student"
                    );
                }
            }
        }

        Ok(rows)
    }
}
