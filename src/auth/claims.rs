// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

/// Claims carried inside a signed session token.
///
/// Timestamps are Unix seconds. Nothing here is persisted server-side; the
/// claims are rebuilt from the token on every protected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the identity's unique ID
    pub sub: Uuid,

    /// The identity's role at login time
    pub role: Role,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration
    pub exp: i64,
}

/// Authenticated staff member extracted from a verified session token.
///
/// This is what the authentication step attaches to the request for
/// downstream consumers (the role step and handlers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity ID (token `sub` claim)
    pub user_id: Uuid,

    /// Identity role
    pub role: Role,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }

    /// Exact role match; there is no role hierarchy.
    pub fn has_role(&self, required: Role) -> bool {
        self.role == required
    }
}
