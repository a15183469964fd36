// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login endpoints. Both are public.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::{
    auth::Role,
    error::ApiError,
    models::{IdentityResponse, LoginRequest, LoginResponse, RegisterRequest},
    service::{
        credentials::{is_valid_email, normalize_email},
        NewIdentity,
    },
    state::AppState,
};

/// Register a staff account.
///
/// The role is fixed at registration and embedded in every token issued
/// for the account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = IdentityResponse),
        (status = 400, description = "Invalid input or role"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IdentityResponse>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let role = Role::parse(&request.role)
        .ok_or_else(|| ApiError::bad_request("role must be one of: receptionist, doctor"))?;

    let identity = state
        .credentials
        .register(NewIdentity {
            full_name: request.full_name,
            email: request.email,
            password: request.password,
            role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// Exchange email and password for a session token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }
    if !is_valid_email(&normalize_email(&request.email)) {
        return Err(ApiError::bad_request("email is not a valid address"));
    }

    let token = state
        .credentials
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}
