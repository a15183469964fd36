// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Request types are deliberately loose (`role` is a plain string) so the
//! handlers can turn bad values into a 400 with a useful message instead of
//! a generic deserialization rejection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::service::PatientInput;
use crate::storage::Identity;

// =============================================================================
// Registration and Login
// =============================================================================

/// Request to register a staff account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    /// At least 8 characters.
    pub password: String,
    /// `receptionist` or `doctor`.
    pub role: String,
}

/// Public view of a registered identity. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            full_name: identity.full_name,
            email: identity.email,
            role: identity.role,
            created_at: identity.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

// =============================================================================
// Patients
// =============================================================================

/// Body for creating or fully updating a patient record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PatientRequest {
    pub full_name: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp; only the UTC date is kept.
    #[serde(deserialize_with = "date_or_timestamp")]
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub medical_history: String,
}

fn date_or_timestamp<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            serde::de::Error::custom(format!(
                "date_of_birth must be YYYY-MM-DD or an RFC 3339 timestamp, got {raw:?}"
            ))
        })
}

impl From<PatientRequest> for PatientInput {
    fn from(request: PatientRequest) -> Self {
        Self {
            full_name: request.full_name,
            date_of_birth: request.date_of_birth,
            address: request.address,
            contact_number: request.contact_number,
            medical_history: request.medical_history,
        }
    }
}

// =============================================================================
// Misc
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
