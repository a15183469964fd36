// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential primitives and the access control gate for the staff API.
//!
//! ## Auth Flow
//!
//! 1. Staff member logs in with email and password
//! 2. Server verifies the bcrypt hash and issues an HS256 session token
//!    carrying `sub` (identity ID), `role`, `iat`, `nbf` and `exp`
//! 3. Client sends `Authorization: Bearer <token>` on every protected request
//! 4. The gate verifies the token, attaches the identity, then checks the
//!    route's required role
//!
//! ## Security
//!
//! - Sessions are stateless; there is no revocation list
//! - The signing secret is loaded once at startup and never rotated
//! - No clock skew leeway: issuer and verifier share one clock
//! - Unknown-email logins pay for a bcrypt verification like real ones

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::{authenticate, require_role};
pub use password::{PasswordError, PasswordHasher};
pub use roles::Role;
pub use token::{JwtIssuer, TokenError, TokenIssuer};
