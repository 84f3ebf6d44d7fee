// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded relational store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized StoredUser
//! - `user_email_index`: lowercase email → user id (uniqueness)
//! - `sessions`: session id → serialized StoredSession
//! - `emargements`: emargement id → serialized StoredEmargement
//! - `emargement_index`: (session id, etudiant id) → emargement id (uniqueness)
//! - `sequences`: table name → last assigned id
//!
//! redb runs one write transaction at a time, so a uniqueness check and the
//! insert it guards are atomic when done in the same write transaction.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

pub(crate) const USER_EMAIL_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("user_email_index");

pub(crate) const SESSIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("sessions");

pub(crate) const EMARGEMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("emargements");

/// Key: `(session_id, etudiant_id)`, so a session's records are one range scan.
pub(crate) const EMARGEMENT_INDEX: TableDefinition<(u64, u64), u64> =
    TableDefinition::new("emargement_index");

pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("etudiant {etudiant_id} already registered to session {session_id}")]
    AlreadyRegistered { session_id: u64, etudiant_id: u64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store
// =============================================================================

/// Handle on the embedded database, shared by all repositories.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
            let _ = write_txn.open_table(SESSIONS)?;
            let _ = write_txn.open_table(EMARGEMENTS)?;
            let _ = write_txn.open_table(EMARGEMENT_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Store opened");
        Ok(Self { db })
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    /// Check that a read transaction can be opened.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}

/// Allocate the next id for `sequence` inside an open write transaction.
///
/// Ids start at 1 and are never reused.
pub(crate) fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

/// Normalized key for the email uniqueness index.
pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn temp_store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("db.redb");
        Store::open(&path).unwrap().ping().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn sequences_are_independent_and_monotonic() {
        let (store, _dir) = temp_store();
        let write_txn = store.db().begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "users").unwrap(), 1);
        assert_eq!(next_id(&write_txn, "users").unwrap(), 2);
        assert_eq!(next_id(&write_txn, "sessions").unwrap(), 1);
        write_txn.commit().unwrap();

        let write_txn = store.db().begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "users").unwrap(), 3);
        write_txn.commit().unwrap();
    }

    #[test]
    fn email_key_is_case_insensitive() {
        assert_eq!(email_key(" Ana@X.com "), "ana@x.com");
    }
}
