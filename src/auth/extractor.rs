// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated staff.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{middleware::authenticate_headers, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for the authenticated identity.
///
/// Behind the [`authenticate`](super::middleware::authenticate) layer this
/// reads the identity the gate attached. On a route without that layer it
/// verifies the authorization header itself, with the same failure modes.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let user = authenticate_headers(&parts.headers, state.tokens.as_ref())?;
        Ok(Auth(user))
    }
}
