// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded staff and patient database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `identities`: identity_id → serialized Identity
//! - `identity_emails`: email → identity_id (unique index)
//! - `patients`: patient_id → serialized PatientRecord
//!
//! Every repository call runs in its own redb transaction.

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableDatabase, TableDefinition, WriteTransaction};

use super::StorageResult;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: identity_id → serialized Identity (JSON bytes).
pub(crate) const IDENTITIES: TableDefinition<&str, &[u8]> = TableDefinition::new("identities");

/// Unique index: email → identity_id.
pub(crate) const IDENTITY_EMAILS: TableDefinition<&str, &str> =
    TableDefinition::new("identity_emails");

/// Primary table: patient_id → serialized PatientRecord (JSON bytes).
pub(crate) const PATIENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("patients");

// =============================================================================
// HospitalDb
// =============================================================================

/// Embedded ACID database holding identities and patient records.
pub struct HospitalDb {
    db: Database,
}

impl HospitalDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(IDENTITIES)?;
            let _ = write_txn.open_table(IDENTITY_EMAILS)?;
            let _ = write_txn.open_table(PATIENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Readiness probe: open a read transaction and touch every table.
    pub fn check(&self) -> StorageResult<()> {
        let read_txn = self.begin_read()?;
        read_txn.open_table(IDENTITIES)?;
        read_txn.open_table(IDENTITY_EMAILS)?;
        read_txn.open_table(PATIENTS)?;
        Ok(())
    }
}
