// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Patient record repository.

use chrono::{DateTime, NaiveDate, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{HospitalDb, PATIENTS};
use super::super::{StorageError, StorageResult};

/// Patient record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PatientRecord {
    /// Unique patient identifier (UUID v4)
    pub id: Uuid,
    /// Patient's full name
    pub full_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: NaiveDate,
    /// Postal address
    pub address: String,
    /// Phone number
    pub contact_number: String,
    /// Free-form medical history notes
    pub medical_history: String,
    /// Identity that registered the patient
    pub registered_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage operations on patient records.
pub trait PatientRepository: Send + Sync {
    /// Persist a new patient record.
    fn create_patient(&self, patient: &PatientRecord) -> StorageResult<()>;

    /// All patient records, oldest first.
    fn list_patients(&self) -> StorageResult<Vec<PatientRecord>>;

    /// Get a patient record by ID.
    fn find_patient(&self, id: Uuid) -> StorageResult<PatientRecord>;

    /// Replace an existing patient record.
    fn update_patient(&self, patient: &PatientRecord) -> StorageResult<()>;

    /// Delete a patient record.
    fn delete_patient(&self, id: Uuid) -> StorageResult<()>;
}

impl PatientRepository for HospitalDb {
    fn create_patient(&self, patient: &PatientRecord) -> StorageResult<()> {
        let id = patient.id.to_string();
        let json = serde_json::to_vec(patient)?;

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PATIENTS)?;
            if table.get(id.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Patient {id}")));
            }
            table.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn list_patients(&self) -> StorageResult<Vec<PatientRecord>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PATIENTS)?;

        let mut patients = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let patient: PatientRecord = serde_json::from_slice(value.value())?;
            patients.push(patient);
        }

        patients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(patients)
    }

    fn find_patient(&self, id: Uuid) -> StorageResult<PatientRecord> {
        let id = id.to_string();
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PATIENTS)?;
        match table.get(id.as_str())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Patient {id}"))),
        }
    }

    fn update_patient(&self, patient: &PatientRecord) -> StorageResult<()> {
        let id = patient.id.to_string();
        let json = serde_json::to_vec(patient)?;

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PATIENTS)?;
            if table.get(id.as_str())?.is_none() {
                return Err(StorageError::NotFound(format!("Patient {id}")));
            }
            table.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_patient(&self, id: Uuid) -> StorageResult<()> {
        let id = id.to_string();

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PATIENTS)?;
            let removed = table.remove(id.as_str())?.is_some();
            if !removed {
                return Err(StorageError::NotFound(format!("Patient {id}")));
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
