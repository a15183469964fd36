// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification (HS256 JWT).
//!
//! The signing secret is loaded once at startup and never rotated. Time
//! checks are done here rather than by `jsonwebtoken` so that expiry and
//! not-before are evaluated against an explicit clock with zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use uuid::Uuid;

use super::{claims::SessionClaims, roles::Role};

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Longest session lifetime accepted from configuration (one year).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Token verification and issuance failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies session tokens.
///
/// Kept as a trait so the gate and the credential service can be exercised
/// with a different token backend.
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for an identity, valid from now until now + TTL.
    fn issue(&self, identity_id: Uuid, role: Role) -> Result<String, TokenError>;

    /// Verify a token and return its claims.
    fn verify(&self, token: &str) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 JWT issuer backed by a process-wide secret.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token as of `now`.
    pub fn issue_at(
        &self,
        identity_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime overflows the clock".to_string()))?;
        let claims = SessionClaims {
            sub: identity_id,
            role,
            iat: issued_at,
            nbf: issued_at,
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token as of `now`.
    ///
    /// The signature is checked first; a token with a bad MAC is never
    /// reported as expired.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
                _ => TokenError::Malformed,
            },
        )?;

        let claims = data.claims;
        let now = now.timestamp();

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if now < claims.nbf {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, identity_id: Uuid, role: Role) -> Result<String, TokenError> {
        self.issue_at(identity_id, role, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }
}
