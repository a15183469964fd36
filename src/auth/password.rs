// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification using bcrypt.
//!
//! The stored hash is the standard `$2b$<cost>$<salt+digest>` string, so a
//! verifier needs nothing but the hash itself.

use std::sync::Arc;

use thiserror::Error;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Error types for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The cost factor is outside bcrypt's supported range
    #[error("bcrypt cost must be between {min} and {max}, got {0}", min = MIN_COST, max = MAX_COST)]
    InvalidCost(u32),

    /// Failed to hash password
    #[error("failed to hash password: {0}")]
    HashingFailed(String),
}

/// bcrypt password hasher with a fixed cost factor.
///
/// Holds a precomputed hash of a throwaway secret so that login attempts
/// against unknown accounts can pay for one verification just like attempts
/// against real ones.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher using the given bcrypt cost.
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }

        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A stored hash that cannot be parsed verifies as `false`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }

    /// Hash that matches no real password; same cost as real hashes.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}
