// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::service::{CredentialService, PatientService};
use crate::storage::HospitalDb;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub patients: Arc<PatientService>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub db: Arc<HospitalDb>,
}

impl AppState {
    pub fn new(db: Arc<HospitalDb>, hasher: PasswordHasher, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            credentials: Arc::new(CredentialService::new(db.clone(), hasher, tokens.clone())),
            patients: Arc::new(PatientService::new(db.clone())),
            tokens,
            db,
        }
    }
}
