// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the database.
//!
//! Each module defines the stored entity, the repository trait the services
//! depend on, and its implementation for [`HospitalDb`](super::HospitalDb).

pub mod identities;
pub mod patients;

pub use identities::{Identity, IdentityRepository};
pub use patients::{PatientRecord, PatientRepository};
