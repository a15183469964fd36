// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, require_role, Role},
    models::{IdentityResponse, LoginRequest, LoginResponse, MessageResponse, PatientRequest},
    state::AppState,
    storage::PatientRecord,
};

pub mod auth;
pub mod health;
pub mod patients;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let receptionist_routes = Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/{patient_id}",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route_layer(from_fn_with_state(Role::Receptionist, require_role))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let doctor_routes = Router::new()
        .route("/patients", get(patients::doctor_list_patients))
        .route(
            "/patients/{patient_id}",
            get(patients::doctor_get_patient).put(patients::doctor_update_patient),
        )
        .route_layer(from_fn_with_state(Role::Doctor, require_role))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .nest("/receptionist", receptionist_routes)
        .nest("/doctor", doctor_routes)
        .with_state(state);

    let http_layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive());

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(http_layers)
}

/// Registers the `bearer_auth` scheme referenced by the gated endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        health::ping,
        health::health,
        patients::create_patient,
        patients::list_patients,
        patients::get_patient,
        patients::update_patient,
        patients::delete_patient,
        patients::doctor_list_patients,
        patients::doctor_get_patient,
        patients::doctor_update_patient
    ),
    components(
        schemas(
            Role,
            IdentityResponse,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            PatientRecord,
            PatientRequest,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Staff registration and login"),
        (name = "Receptionist", description = "Patient management for receptionists"),
        (name = "Doctor", description = "Patient access for doctors"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;
