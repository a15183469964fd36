// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Patient endpoints.
//!
//! Receptionists have full CRUD under `/receptionist/patients`. Doctors can
//! list, read and update under `/doctor/patients`. Role checks happen in the
//! route layers; the handlers here assume the caller is already gated.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    models::PatientRequest,
    state::AppState,
    storage::PatientRecord,
};

fn patient_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("patient_id must be a valid UUID"))
}

fn patient_body(body: Result<Json<PatientRequest>, JsonRejection>) -> Result<PatientRequest, ApiError> {
    body.map(|Json(request)| request)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

// =============================================================================
// Receptionist
// =============================================================================

/// Register a new patient. The caller is recorded as the registrar.
#[utoipa::path(
    post,
    path = "/receptionist/patients",
    tag = "Receptionist",
    security(("bearer_auth" = [])),
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientRecord),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - receptionist role required"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_patient(
    Auth(user): Auth,
    State(state): State<AppState>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    let request = patient_body(body)?;
    let patient = state.patients.create(request.into(), user.user_id).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/receptionist/patients",
    tag = "Receptionist",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All patients", body = Vec<PatientRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - receptionist role required")
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    Ok(Json(state.patients.list().await?))
}

#[utoipa::path(
    get,
    path = "/receptionist/patients/{patient_id}",
    tag = "Receptionist",
    security(("bearer_auth" = [])),
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient details", body = PatientRecord),
        (status = 400, description = "Invalid patient ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - receptionist role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id = patient_id(path)?;
    Ok(Json(state.patients.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/receptionist/patients/{patient_id}",
    tag = "Receptionist",
    security(("bearer_auth" = [])),
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID")
    ),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientRecord),
        (status = 400, description = "Invalid input or patient ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - receptionist role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id = patient_id(path)?;
    let request = patient_body(body)?;
    Ok(Json(state.patients.update(id, request.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/receptionist/patients/{patient_id}",
    tag = "Receptionist",
    security(("bearer_auth" = [])),
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID to delete")
    ),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 400, description = "Invalid patient ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - receptionist role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = patient_id(path)?;
    state.patients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Doctor
// =============================================================================

#[utoipa::path(
    get,
    path = "/doctor/patients",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All patients", body = Vec<PatientRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - doctor role required")
    )
)]
pub async fn doctor_list_patients(
    state: State<AppState>,
) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    list_patients(state).await
}

#[utoipa::path(
    get,
    path = "/doctor/patients/{patient_id}",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient details", body = PatientRecord),
        (status = 400, description = "Invalid patient ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - doctor role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn doctor_get_patient(
    state: State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PatientRecord>, ApiError> {
    get_patient(state, path).await
}

/// Doctors update the same fields as receptionists, typically the medical
/// history.
#[utoipa::path(
    put,
    path = "/doctor/patients/{patient_id}",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID")
    ),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientRecord),
        (status = 400, description = "Invalid input or patient ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - doctor role required"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn doctor_update_patient(
    state: State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<Json<PatientRecord>, ApiError> {
    update_patient(state, path, body).await
}
