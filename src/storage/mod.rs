// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for staff identities and patient records.
//!
//! Services talk to storage only through the repository traits
//! ([`IdentityRepository`], [`PatientRepository`]); [`HospitalDb`] is the
//! redb-backed implementation used by the server.
//!
//! ## Conventions
//!
//! - A missing record is always [`StorageError::NotFound`], distinct from
//!   every other failure
//! - A taken email is [`StorageError::EmailTaken`]; any other duplicate key
//!   is [`StorageError::AlreadyExists`]
//! - Identifiers are generated by the services before calling `create_*`
//! - Repository calls block on disk I/O; async callers go through
//!   [`run_blocking`]

pub mod database;
pub mod repository;

pub use database::HospitalDb;
pub use repository::{Identity, IdentityRepository, PatientRecord, PatientRepository};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
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

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Run a repository call on tokio's blocking pool.
pub async fn run_blocking<T, F>(f: F) -> StorageResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}
