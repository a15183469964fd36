// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control gate for Axum.
//!
//! Two composable steps, applied as route layers:
//!
//! 1. [`authenticate`] verifies `Authorization: Bearer <token>` and attaches
//!    an [`AuthenticatedUser`] to the request extensions.
//! 2. [`require_role`] checks the attached role against the role the route
//!    was registered with.
//!
//! Both fail closed: on error the response is produced here and the handler
//! never runs.
//!
//! ```rust,ignore
//! let doctor_routes = Router::new()
//!     .route("/patients", get(list_patients))
//!     .route_layer(middleware::from_fn_with_state(Role::Doctor, require_role))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));
//! ```
//!
//! Layers added last run first, so `authenticate` must be the outer one.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::{AuthError, AuthenticatedUser, Role, TokenIssuer};
use crate::state::AppState;

/// Scheme literal expected in the authorization header.
const BEARER_SCHEME: &str = "Bearer";

/// Authentication step.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match authenticate_headers(request.headers(), state.tokens.as_ref()) {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!(
                path = %request.uri().path(),
                error_code = err.error_code(),
                "Rejected unauthenticated request"
            );
            return Err(err);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Authorization step, parameterized by the role bound at route registration.
pub async fn require_role(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AuthError::RoleNotFound)?;

    if !user.has_role(required) {
        tracing::debug!(
            user_id = %user.user_id,
            role = %user.role,
            required = %required,
            "Rejected request for role-scoped route"
        );
        return Err(AuthError::RoleMismatch);
    }

    Ok(next.run(request).await)
}

/// Verify the request's authorization header and build the authenticated user.
pub fn authenticate_headers(
    headers: &HeaderMap,
    tokens: &dyn TokenIssuer,
) -> Result<AuthenticatedUser, AuthError> {
    let mut values = headers.get_all(AUTHORIZATION).iter();
    let header = match (values.next(), values.next()) {
        (None, _) => return Err(AuthError::MissingCredentials),
        (Some(_), Some(_)) => return Err(AuthError::MalformedCredentials),
        (Some(header), None) => header,
    };

    if header.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let header = header
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)?;
    let token = parse_bearer(header)?;

    let claims = tokens.verify(token)?;
    Ok(AuthenticatedUser::from_claims(claims))
}

/// Split `Bearer <token>` on single spaces; exactly two parts are accepted.
fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedCredentials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtIssuer, TokenError};
    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn issuer() -> JwtIssuer {
        JwtIssuer::new(b"middleware-test-secret", Duration::hours(24))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parse_bearer_accepts_exact_form() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
    }

    #[test]
    fn parse_bearer_rejects_other_shapes() {
        for header in [
            "bearer abc",
            "Basic abc",
            "Bearer",
            "Bearer  abc",
            "Bearer abc def",
            "abc",
            " Bearer abc",
        ] {
            assert_eq!(
                parse_bearer(header),
                Err(AuthError::MalformedCredentials),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn missing_header_is_missing_credentials() {
        let result = authenticate_headers(&HeaderMap::new(), &issuer());
        assert_eq!(result, Err(AuthError::MissingCredentials));

        let result = authenticate_headers(&headers_with(""), &issuer());
        assert_eq!(result, Err(AuthError::MissingCredentials));
    }

    #[test]
    fn repeated_header_is_malformed() {
        let mut headers = headers_with("Bearer one");
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer two"));

        let result = authenticate_headers(&headers, &issuer());
        assert_eq!(result, Err(AuthError::MalformedCredentials));
    }

    #[test]
    fn valid_token_yields_user() {
        let issuer = issuer();
        let id = Uuid::new_v4();
        let token = issuer.issue(id, Role::Doctor).unwrap();

        let user = authenticate_headers(&headers_with(&format!("Bearer {token}")), &issuer).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, Role::Doctor);
    }

    #[test]
    fn expired_token_is_credentials_expired() {
        let issuer = issuer();
        let token = issuer
            .issue_at(Uuid::new_v4(), Role::Doctor, Utc::now() - Duration::hours(25))
            .unwrap();

        let result = authenticate_headers(&headers_with(&format!("Bearer {token}")), &issuer);
        assert_eq!(result, Err(AuthError::CredentialsExpired));
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid_credentials() {
        let issuer = issuer();
        let foreign = JwtIssuer::new(b"someone-else", Duration::hours(24))
            .issue(Uuid::new_v4(), Role::Doctor)
            .unwrap();
        let future = issuer
            .issue_at(Uuid::new_v4(), Role::Doctor, Utc::now() + Duration::hours(1))
            .unwrap();

        for token in ["garbage".to_string(), foreign, future] {
            let result = authenticate_headers(&headers_with(&format!("Bearer {token}")), &issuer);
            assert_eq!(result, Err(AuthError::InvalidCredentials));
        }
    }

    /// Token backend that rejects everything with a fixed error.
    struct RejectingIssuer(TokenError);

    impl TokenIssuer for RejectingIssuer {
        fn issue(&self, _: Uuid, _: Role) -> Result<String, TokenError> {
            Err(self.0.clone())
        }

        fn verify(&self, _: &str) -> Result<crate::auth::SessionClaims, TokenError> {
            Err(self.0.clone())
        }
    }

    #[test]
    fn verifier_failures_map_through_gate() {
        let headers = headers_with("Bearer whatever");

        let expired = authenticate_headers(&headers, &RejectingIssuer(TokenError::Expired));
        assert_eq!(expired, Err(AuthError::CredentialsExpired));

        let immature = authenticate_headers(&headers, &RejectingIssuer(TokenError::NotYetValid));
        assert_eq!(immature, Err(AuthError::InvalidCredentials));
    }

    fn role_router(required: Role, user: Option<AuthenticatedUser>) -> Router {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(required, require_role));

        match user {
            Some(user) => router.layer(Extension(user)),
            None => router,
        }
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role,
            expires_at: 0,
        }
    }

    async fn call(router: Router) -> StatusCode {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn require_role_admits_exact_role() {
        let status = call(role_router(Role::Receptionist, Some(user(Role::Receptionist)))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn require_role_rejects_other_role() {
        let status = call(role_router(Role::Receptionist, Some(user(Role::Doctor)))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn require_role_without_identity_fails_closed() {
        let status = call(role_router(Role::Doctor, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
