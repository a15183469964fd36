// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business logic between the HTTP handlers and storage.

pub mod credentials;
pub mod patients;

pub use credentials::{CredentialService, LoginError, NewIdentity, RegistrationError};
pub use patients::{PatientError, PatientInput, PatientService};
