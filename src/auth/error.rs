// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::token::TokenError;

/// Failure raised by the access control gate.
///
/// Authentication failures map to 401, authorization failures to 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingCredentials,
    /// Authorization header is not `Bearer <token>`
    MalformedCredentials,
    /// Token failed verification (bad signature, garbage, not yet valid)
    InvalidCredentials,
    /// Token has expired
    CredentialsExpired,
    /// No authenticated identity attached to the request
    RoleNotFound,
    /// Authenticated identity has a different role than the route requires
    RoleMismatch,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::MalformedCredentials => "malformed_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::CredentialsExpired => "credentials_expired",
            AuthError::RoleNotFound => "role_not_found",
            AuthError::RoleMismatch => "role_mismatch",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidCredentials
            | AuthError::CredentialsExpired => StatusCode::UNAUTHORIZED,
            AuthError::RoleNotFound | AuthError::RoleMismatch => StatusCode::FORBIDDEN,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::CredentialsExpired,
            _ => AuthError::InvalidCredentials,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "authorization header is required"),
            AuthError::MalformedCredentials => {
                write!(f, "authorization header format must be Bearer {{token}}")
            }
            AuthError::InvalidCredentials => write!(f, "invalid token"),
            AuthError::CredentialsExpired => write!(f, "token has expired"),
            AuthError::RoleNotFound => write!(f, "user role not found in token"),
            AuthError::RoleMismatch => {
                write!(f, "you are not authorized to perform this action")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_credentials_returns_401() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_credentials");
        assert_eq!(body["error"], "authorization header is required");
    }

    #[tokio::test]
    async fn role_mismatch_returns_403() {
        let response = AuthError::RoleMismatch.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn authentication_failures_are_401_and_authorization_failures_403() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::MalformedCredentials,
            AuthError::InvalidCredentials,
            AuthError::CredentialsExpired,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err:?}");
        }
        for err in [AuthError::RoleNotFound, AuthError::RoleMismatch] {
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN, "{err:?}");
        }
    }

    #[test]
    fn only_expiry_maps_to_credentials_expired() {
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::CredentialsExpired);
        for err in [
            TokenError::Malformed,
            TokenError::SignatureMismatch,
            TokenError::NotYetValid,
        ] {
            assert_eq!(AuthError::from(err), AuthError::InvalidCredentials);
        }
    }
}
