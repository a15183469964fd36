// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity repository.
//!
//! Staff accounts are stored as JSON under their ID, with a separate unique
//! index from email to ID. The index is checked and written in the same
//! write transaction as the record, so two accounts can never share an email.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::database::{HospitalDb, IDENTITIES, IDENTITY_EMAILS};
use super::super::{StorageError, StorageResult};
use crate::auth::Role;

/// Registered staff account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Unique identity identifier (UUID v4, generated by the service)
    pub id: Uuid,
    /// Display name
    pub full_name: String,
    /// Normalized email (unique)
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Role, fixed at registration
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Storage operations on staff identities.
pub trait IdentityRepository: Send + Sync {
    /// Persist a new identity.
    ///
    /// Fails with [`StorageError::EmailTaken`] if the email is already
    /// registered, and with [`StorageError::AlreadyExists`] if the ID is.
    fn create_identity(&self, identity: &Identity) -> StorageResult<()>;

    /// Look up an identity by its (normalized) email.
    ///
    /// Fails with [`StorageError::NotFound`] if no identity has this email.
    fn find_identity_by_email(&self, email: &str) -> StorageResult<Identity>;
}

impl IdentityRepository for HospitalDb {
    fn create_identity(&self, identity: &Identity) -> StorageResult<()> {
        let id = identity.id.to_string();
        let json = serde_json::to_vec(identity)?;

        let write_txn = self.begin_write()?;
        {
            let mut emails = write_txn.open_table(IDENTITY_EMAILS)?;
            if emails.get(identity.email.as_str())?.is_some() {
                return Err(StorageError::EmailTaken(identity.email.clone()));
            }

            let mut identities = write_txn.open_table(IDENTITIES)?;
            if identities.get(id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Identity {id}")));
            }

            identities.insert(id.as_str(), json.as_slice())?;
            emails.insert(identity.email.as_str(), id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find_identity_by_email(&self, email: &str) -> StorageResult<Identity> {
        let read_txn = self.begin_read()?;
        let emails = read_txn.open_table(IDENTITY_EMAILS)?;
        let id = match emails.get(email)? {
            Some(value) => value.value().to_string(),
            None => return Err(StorageError::NotFound(format!("Identity with email {email}"))),
        };

        let identities = read_txn.open_table(IDENTITIES)?;
        match identities.get(id.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Identity {id}"))),
        }
    }
}
