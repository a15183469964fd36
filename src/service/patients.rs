// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Patient record management.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::credentials::MAX_FIELD_LENGTH;
use crate::storage::{run_blocking, PatientRecord, PatientRepository, StorageError};

/// Maximum length of a contact number, in characters.
pub const MAX_CONTACT_NUMBER_LENGTH: usize = 20;

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("patient not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for PatientError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => PatientError::NotFound,
            other => PatientError::Storage(other),
        }
    }
}

/// Caller-supplied patient fields, used for both create and full update.
#[derive(Debug, Clone)]
pub struct PatientInput {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub contact_number: String,
    pub medical_history: String,
}

impl PatientInput {
    fn validate(&self) -> Result<(), PatientError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(PatientError::Validation("full_name is required".to_string()));
        }
        if full_name.chars().count() > MAX_FIELD_LENGTH {
            return Err(PatientError::Validation(format!(
                "full_name must be at most {MAX_FIELD_LENGTH} characters"
            )));
        }
        if self.contact_number.chars().count() > MAX_CONTACT_NUMBER_LENGTH {
            return Err(PatientError::Validation(format!(
                "contact_number must be at most {MAX_CONTACT_NUMBER_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientRepository>) -> Self {
        Self { patients }
    }

    /// Create a patient record attributed to `registered_by`.
    pub async fn create(
        &self,
        input: PatientInput,
        registered_by: Uuid,
    ) -> Result<PatientRecord, PatientError> {
        input.validate()?;

        let now = Utc::now();
        let patient = PatientRecord {
            id: Uuid::new_v4(),
            full_name: input.full_name.trim().to_string(),
            date_of_birth: input.date_of_birth,
            address: input.address,
            contact_number: input.contact_number,
            medical_history: input.medical_history,
            registered_by_id: registered_by,
            created_at: now,
            updated_at: now,
        };

        let patients = self.patients.clone();
        let record = patient.clone();
        run_blocking(move || patients.create_patient(&record)).await?;

        tracing::info!(
            patient_id = %patient.id,
            registered_by = %registered_by,
            "Created patient record"
        );
        Ok(patient)
    }

    pub async fn list(&self) -> Result<Vec<PatientRecord>, PatientError> {
        let patients = self.patients.clone();
        Ok(run_blocking(move || patients.list_patients()).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<PatientRecord, PatientError> {
        let patients = self.patients.clone();
        Ok(run_blocking(move || patients.find_patient(id)).await?)
    }

    /// Replace the caller-editable fields of an existing record.
    ///
    /// `id`, `registered_by_id` and `created_at` are preserved.
    pub async fn update(
        &self,
        id: Uuid,
        input: PatientInput,
    ) -> Result<PatientRecord, PatientError> {
        input.validate()?;

        let patients = self.patients.clone();
        let patient = run_blocking(move || {
            let mut patient = patients.find_patient(id)?;
            patient.full_name = input.full_name.trim().to_string();
            patient.date_of_birth = input.date_of_birth;
            patient.address = input.address;
            patient.contact_number = input.contact_number;
            patient.medical_history = input.medical_history;
            patient.updated_at = Utc::now();

            patients.update_patient(&patient)?;
            Ok(patient)
        })
        .await?;

        tracing::info!(patient_id = %patient.id, "Updated patient record");
        Ok(patient)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PatientError> {
        let patients = self.patients.clone();
        run_blocking(move || patients.delete_patient(id)).await?;
        tracing::info!(patient_id = %id, "Deleted patient record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HospitalDb;

    fn service() -> (PatientService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(HospitalDb::open(&dir.path().join("test.redb")).unwrap());
        (PatientService::new(db), dir)
    }

    fn input(name: &str) -> PatientInput {
        PatientInput {
            full_name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
            address: "4 Elm Street".to_string(),
            contact_number: "555-0100".to_string(),
            medical_history: "None recorded".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_registrar() {
        let (service, _dir) = service();
        let registrar = Uuid::new_v4();

        let patient = service.create(input("Jo Bloggs"), registrar).await.unwrap();
        assert_eq!(patient.registered_by_id, registrar);
        assert_eq!(patient.full_name, "Jo Bloggs");
        assert_eq!(service.get(patient.id).await.unwrap(), patient);
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let (service, _dir) = service();

        let mut long_phone = input("Jo");
        long_phone.contact_number = "0".repeat(MAX_CONTACT_NUMBER_LENGTH + 1);

        for bad in [input(""), input("   "), long_phone] {
            let result = service.create(bad, Uuid::new_v4()).await;
            assert!(matches!(result, Err(PatientError::Validation(_))));
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_preserves_identity_fields() {
        let (service, _dir) = service();
        let registrar = Uuid::new_v4();
        let created = service.create(input("Before"), registrar).await.unwrap();

        let mut change = input("After");
        change.medical_history = "Fractured wrist".to_string();
        let updated = service.update(created.id, change).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.registered_by_id, registrar);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            service.get(created.id).await.unwrap().medical_history,
            "Fractured wrist"
        );
    }

    #[tokio::test]
    async fn missing_patient_is_not_found() {
        let (service, _dir) = service();
        let id = Uuid::new_v4();

        assert!(matches!(service.get(id).await, Err(PatientError::NotFound)));
        assert!(matches!(service.update(id, input("X")).await, Err(PatientError::NotFound)));
        assert!(matches!(service.delete(id).await, Err(PatientError::NotFound)));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (service, _dir) = service();
        let patient = service.create(input("Gone"), Uuid::new_v4()).await.unwrap();

        service.delete(patient.id).await.unwrap();
        assert!(matches!(service.get(patient.id).await, Err(PatientError::NotFound)));
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let (service, _dir) = service();
        service.create(input("One"), Uuid::new_v4()).await.unwrap();
        service.create(input("Two"), Uuid::new_v4()).await.unwrap();

        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
